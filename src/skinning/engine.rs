//! Linear blend skinning.
//!
//! A [`SkinningEngine`] is the evaluation context for one skinned mesh. It is
//! built once (all data checks happen here), then posed and deformed any
//! number of times:
//!
//! ```rust,ignore
//! let mut engine = SkinningEngine::new(&scene, mesh_index, scene.anim_layers().next())?;
//! for t in stack.sample_times(TimeMode::Frames30)? {
//!     engine.pose_at(t)?;
//!     let (positions, normals) = engine.deform()?;
//! }
//! ```
//!
//! Posing recomputes every node's global matrix and each bone's skinning
//! matrix. Deformation reads them and never mutates the engine.

use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::stack::AnimLayer;
use crate::animation::time::{Ticks, seconds_to_ticks};
use crate::bounds::{BoundingBox, BoundingSphere};
use crate::errors::{PoseError, Result};
use crate::scene::mesh::Mesh;
use crate::scene::node::Node;
use crate::scene::scene::Scene;
use crate::scene::transform_system::{self, LevelOrderBatches};
use crate::scene::{AttributeIndex, NodeIndex};
use crate::skinning::skin::LinkMode;
use crate::skinning::weights::{VertexInfluences, build_vertex_influences};

#[derive(Debug, Clone, Copy)]
struct BoneInfo {
    link: NodeIndex,
    /// Mesh space to bone space at bind time.
    bind: Mat4,
    /// `global(link) * bind` for the current pose.
    skinning: Mat4,
}

/// Caller-owned pose and deform context for one skinned mesh.
pub struct SkinningEngine<'a> {
    scene: &'a Scene,
    mesh: &'a Mesh,
    mesh_node: NodeIndex,
    order: &'a LevelOrderBatches,

    layer: Option<&'a AnimLayer>,
    layer_map: FxHashMap<NodeIndex, usize>,

    influences: Vec<VertexInfluences>,
    bones: Vec<BoneInfo>,
    globals: Vec<Mat4>,
}

impl<'a> SkinningEngine<'a> {
    /// Binds the mesh attribute at `mesh_attribute` and poses it at rest.
    ///
    /// Fails if the mesh has no skin, the skinning type is not rigid or
    /// linear, a cluster has no link node or uneven arrays, a control point
    /// lies outside the mesh, or the node hierarchy is malformed.
    pub fn new(scene: &'a Scene, mesh_attribute: AttributeIndex, animation: Option<&'a AnimLayer>) -> Result<Self> {
        let attribute = scene
            .attribute(mesh_attribute)
            .ok_or(PoseError::AttributeIndexOutOfBounds {
                index: mesh_attribute,
                count: scene.attributes.len(),
            })?;
        let missing_skin = || PoseError::MissingSkin {
            mesh: attribute.name.clone(),
        };
        let mesh = attribute.as_mesh().ok_or_else(missing_skin)?;
        let skin = mesh.skin().ok_or_else(missing_skin)?;
        if !skin.skinning_type.is_linear_blend() {
            return Err(PoseError::UnsupportedSkinningType(skin.skinning_type));
        }

        let mesh_node = scene.graph.get(attribute.single_node()?)?;
        scene.graph.validate()?;
        let order = scene.graph.traversal_order()?;

        let mut bones = Vec::with_capacity(skin.clusters.len());
        for (i, cluster) in skin.clusters.iter().enumerate() {
            let link = cluster.link.ok_or(PoseError::MissingLinkNode { cluster: i })?;
            scene.graph.get(link)?;
            if cluster.link_mode != LinkMode::Normalize {
                log::warn!(
                    "Cluster {i} uses {:?} link mode; weights are normalized regardless",
                    cluster.link_mode
                );
            }
            bones.push(BoneInfo {
                link,
                bind: cluster.bind_matrix(mesh_node),
                skinning: Mat4::IDENTITY,
            });
        }

        let influences = build_vertex_influences(mesh.vertex_count(), skin)?;

        let layer_map = animation.map(AnimLayer::node_map).unwrap_or_default();

        log::debug!(
            "Skinning engine for {:?}: {} vertices, {} bones, {} nodes, animated: {}",
            attribute.name,
            mesh.vertex_count(),
            bones.len(),
            scene.graph.len(),
            animation.is_some()
        );

        let mut engine = Self {
            scene,
            mesh,
            mesh_node: mesh_node.index(),
            order,
            layer: animation,
            layer_map,
            influences,
            bones,
            globals: vec![Mat4::IDENTITY; scene.graph.len()],
        };
        engine.pose_rest();
        Ok(engine)
    }

    // ========================================================================
    // Posing
    // ========================================================================

    /// Poses every node with its static local transform.
    pub fn pose_rest(&mut self) {
        transform_system::update_hierarchy_batched(
            self.scene.graph.nodes(),
            self.order,
            Node::local_matrix,
            &mut self.globals,
        );
        self.update_bones();
    }

    /// Poses nodes animated by the bound layer at `time`; the rest keep
    /// their static local transforms.
    pub fn pose_at(&mut self, time: Ticks) -> Result<()> {
        let layer = self.layer.ok_or(PoseError::NoAnimationLayer)?;
        let layer_map = &self.layer_map;

        transform_system::update_hierarchy_batched(
            self.scene.graph.nodes(),
            self.order,
            |node: &Node| match layer_map.get(&node.index()) {
                Some(&i) => layer.node_animations[i]
                    .evaluate_local_transform(node, time)
                    .to_matrix(),
                None => node.local_matrix(),
            },
            &mut self.globals,
        );
        self.update_bones();
        log::trace!("Posed {} nodes at tick {time}", self.globals.len());
        Ok(())
    }

    pub fn pose_at_seconds(&mut self, seconds: f64) -> Result<()> {
        self.pose_at(seconds_to_ticks(seconds))
    }

    fn update_bones(&mut self) {
        for bone in &mut self.bones {
            bone.skinning = self.globals[bone.link] * bone.bind;
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn mesh(&self) -> &Mesh {
        self.mesh
    }

    #[must_use]
    pub fn mesh_node(&self) -> NodeIndex {
        self.mesh_node
    }

    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Global matrix of `node` in the current pose.
    #[must_use]
    pub fn global_transform(&self, node: NodeIndex) -> Option<Mat4> {
        self.globals.get(node).copied()
    }

    /// Skinning matrix of cluster `bone` in the current pose.
    #[must_use]
    pub fn bone_matrix(&self, bone: usize) -> Option<Mat4> {
        self.bones.get(bone).map(|b| b.skinning)
    }

    #[must_use]
    pub fn vertex_influences(&self) -> &[VertexInfluences] {
        &self.influences
    }

    // ========================================================================
    // Deformation
    // ========================================================================

    /// Deformed positions, and normals when the mesh has them.
    pub fn deform(&self) -> Result<(Vec<Vec3>, Option<Vec<Vec3>>)> {
        let count = self.mesh.vertex_count();
        let mut positions = vec![Vec3::ZERO; count];
        let mut normals = self.mesh.normals.as_ref().map(|_| vec![Vec3::ZERO; count]);
        self.deform_into(&mut positions, normals.as_deref_mut())?;
        Ok((positions, normals))
    }

    /// Writes the deformed mesh into caller buffers sized to the vertex
    /// count. `normals` is left untouched when the mesh has no normals.
    ///
    /// Unbound vertices get their rest position and normal.
    pub fn deform_into(&self, positions: &mut [Vec3], normals: Option<&mut [Vec3]>) -> Result<()> {
        let count = self.mesh.vertex_count();
        check_len("positions", count, positions.len())?;

        let normal_io = match (self.mesh.normals.as_deref(), normals) {
            (Some(source), Some(target)) => {
                check_len("mesh normals", count, source.len())?;
                check_len("normals", count, target.len())?;
                Some((source, target))
            }
            _ => None,
        };

        let rest = &self.mesh.positions;
        for (i, info) in self.influences.iter().enumerate() {
            if info.is_unbound() {
                positions[i] = rest[i];
                continue;
            }
            let mut p = Vec3::ZERO;
            for (bone, w) in info.normalized() {
                p += self.bones[bone].skinning.transform_point3(rest[i]) * w;
            }
            positions[i] = p;
        }

        if let Some((source, target)) = normal_io {
            for (i, info) in self.influences.iter().enumerate() {
                if info.is_unbound() {
                    target[i] = source[i];
                    continue;
                }
                let mut n = Vec3::ZERO;
                for (bone, w) in info.normalized() {
                    n += self.bones[bone]
                        .skinning
                        .transform_vector3(source[i])
                        .normalize_or_zero()
                        * w;
                }
                target[i] = n;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Skeleton bounds
    // ========================================================================

    /// World position of each bone's link node, in cluster order.
    #[must_use]
    pub fn bone_positions(&self) -> Vec<Vec3> {
        self.bones
            .iter()
            .map(|b| self.globals[b.link].w_axis.truncate())
            .collect()
    }

    #[must_use]
    pub fn skeleton_bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.bone_positions())
    }

    #[must_use]
    pub fn skeleton_bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::ritter(&self.bone_positions())
    }
}

fn check_len(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(PoseError::BufferLengthMismatch {
            context,
            expected,
            actual,
        })
    }
}
