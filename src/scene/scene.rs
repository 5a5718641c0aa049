use glam::Vec3;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value, json};

use crate::animation::stack::{AnimLayer, AnimStack};
use crate::animation::time::TimeMode;
use crate::config::PoseSettings;
use crate::errors::{PoseError, Result};
use crate::scene::attribute::Attribute;
use crate::scene::graph::NodeGraph;
use crate::scene::mesh::Mesh;
use crate::scene::node::Node;
use crate::scene::transform::LocalTransform;
use crate::scene::unit::SystemUnit;
use crate::scene::{AttributeIndex, NodeIndex};

/// A fully materialized scene: node hierarchy, node attributes and
/// animation stacks.
///
/// Produced once by a loader and treated as immutable input by the pose
/// evaluators, apart from the unit normalization in [`Scene::prepare`].
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: Option<String>,
    pub system_unit: SystemUnit,
    pub time_mode: TimeMode,

    pub graph: NodeGraph,
    pub attributes: Vec<Attribute>,
    pub anim_stacks: Vec<AnimStack>,
}

impl Scene {
    #[must_use]
    pub fn new(graph: NodeGraph) -> Self {
        Self {
            name: None,
            system_unit: SystemUnit::default(),
            time_mode: TimeMode::default(),
            graph,
            attributes: Vec::new(),
            anim_stacks: Vec::new(),
        }
    }

    /// Attaches `attribute` to `node`, linking both directions.
    pub fn add_attribute(&mut self, node: NodeIndex, mut attribute: Attribute) -> Result<AttributeIndex> {
        let index = self.attributes.len();
        let target = self
            .graph
            .node_mut(node)
            .ok_or(PoseError::NodeIndexOutOfBounds {
                context: "attribute owner",
                index: node,
            })?;
        target.attributes.push(index);
        attribute.nodes.push(node);
        self.attributes.push(attribute);
        Ok(index)
    }

    #[must_use]
    pub fn attribute(&self, index: AttributeIndex) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    #[must_use]
    pub fn mesh(&self, index: AttributeIndex) -> Option<&Mesh> {
        self.attributes.get(index).and_then(Attribute::as_mesh)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (AttributeIndex, &Mesh)> {
        self.attributes
            .iter()
            .enumerate()
            .filter_map(|(i, attr)| attr.as_mesh().map(|mesh| (i, mesh)))
    }

    pub fn anim_layers(&self) -> impl Iterator<Item = &AnimLayer> {
        self.anim_stacks.iter().flat_map(|stack| stack.layers.iter())
    }

    #[must_use]
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeIndex> {
        self.graph.find_by_name(name)
    }

    #[must_use]
    pub fn name_map(&self) -> FxHashMap<&str, NodeIndex> {
        self.graph.name_map()
    }

    // ========================================================================
    // Units
    // ========================================================================

    /// Applies load-time settings (currently unit normalization).
    pub fn prepare(&mut self, settings: &PoseSettings) -> Result<()> {
        if settings.convert_units {
            self.convert_to_meters()?;
        }
        Ok(())
    }

    /// Normalizes a centimetre scene to metres. Metre scenes are left alone;
    /// any other unit is rejected.
    pub fn convert_to_meters(&mut self) -> Result<()> {
        if self.system_unit == SystemUnit::M {
            return Ok(());
        }
        if self.system_unit != SystemUnit::CM {
            return Err(PoseError::UnsupportedUnit {
                scale_factor: self.system_unit.scale_factor,
                multiplier: self.system_unit.multiplier,
            });
        }

        log::debug!("Converting scene {:?} from centimetres to metres", self.name);
        self.scale_lengths(0.01);
        self.system_unit = SystemUnit::M;
        Ok(())
    }

    /// Multiplies every length in the scene by `factor`: node translations,
    /// offsets and pivots, mesh positions, cluster bind translations and
    /// translation curves.
    pub fn scale_lengths(&mut self, factor: f32) {
        self.system_unit = self.system_unit.rescaled(factor);

        for node in self.graph.nodes_mut() {
            node.scale_lengths(factor);
        }
        for attribute in &mut self.attributes {
            if let Some(mesh) = attribute.as_mesh_mut() {
                mesh.scale_lengths(factor);
            }
        }
        for stack in &mut self.anim_stacks {
            stack.scale_lengths(factor);
        }
    }

    // ========================================================================
    // Debug dump
    // ========================================================================

    /// Summary of the scene as JSON: name, unit, time mode and the node tree
    /// under `rootNode`. Node vectors are written only when they differ from
    /// their defaults.
    pub fn to_json(&self) -> Result<Value> {
        let order: Vec<NodeIndex> = self.graph.traversal_order()?.iter().collect();

        // Children before parents, so every subtree is finished when its
        // parent is built.
        let mut built: Vec<Option<Value>> = vec![None; self.graph.len()];
        for &index in order.iter().rev() {
            let node = self.graph.get(index)?;
            let mut object = self.node_json(node);
            if !node.children().is_empty() {
                let children: Vec<Value> = node
                    .children()
                    .iter()
                    .filter_map(|&child| built.get_mut(child).and_then(Option::take))
                    .collect();
                object.insert("children".into(), Value::Array(children));
            }
            built[index] = Some(Value::Object(object));
        }

        let mut json = Map::new();
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            json.insert("name".into(), json!(name));
        }
        json.insert(
            "systemUnit".into(),
            json!({
                "scaleFactor": self.system_unit.scale_factor,
                "multiplier": self.system_unit.multiplier,
            }),
        );
        json.insert("timeMode".into(), json!(format!("{:?}", self.time_mode)));
        let root = built
            .get_mut(self.graph.root())
            .and_then(Option::take)
            .unwrap_or(Value::Null);
        json.insert("rootNode".into(), root);
        Ok(Value::Object(json))
    }

    fn node_json(&self, node: &Node) -> Map<String, Value> {
        let mut object = Map::new();
        object.insert("name".into(), json!(node.name));

        let mut vector = |key: &str, v: Vec3, default: Vec3| {
            if v != default {
                object.insert(key.into(), json!([v.x, v.y, v.z]));
            }
        };
        let local = &node.local;
        let identity = LocalTransform::IDENTITY;
        vector("translation", local.translation, identity.translation);
        vector("rotation", local.rotation, identity.rotation);
        vector("scaling", local.scaling, identity.scaling);
        vector("preRotation", local.pre_rotation, identity.pre_rotation);
        vector("postRotation", local.post_rotation, identity.post_rotation);
        vector("rotationOffset", local.rotation_offset, identity.rotation_offset);
        vector("rotationPivot", local.rotation_pivot, identity.rotation_pivot);
        vector("scalingOffset", local.scaling_offset, identity.scaling_offset);
        vector("scalingPivot", local.scaling_pivot, identity.scaling_pivot);
        vector("geometricScaling", node.geometric_scaling, Vec3::ONE);
        vector("geometricRotation", node.geometric_rotation, Vec3::ZERO);
        vector("geometricTranslation", node.geometric_translation, Vec3::ZERO);

        if local.rotation_order != identity.rotation_order {
            object.insert("rotationOrder".into(), json!(format!("{:?}", local.rotation_order)));
        }

        let attributes: Vec<Value> = node
            .attributes
            .iter()
            .filter_map(|&i| self.attributes.get(i))
            .map(|attr| {
                json!({
                    "type": format!("{:?}", attr.attribute_type()),
                    "name": attr.name,
                })
            })
            .collect();
        if !attributes.is_empty() {
            object.insert("attributes".into(), Value::Array(attributes));
        }
        object
    }
}
