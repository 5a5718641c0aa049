use crate::errors::{PoseError, Result};
use crate::scene::NodeIndex;
use crate::scene::mesh::Mesh;

/// Node attribute type tags, in the source container's numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Unknown,
    Null,
    Marker,
    Skeleton,
    Mesh,
    Nurbs,
    Patch,
    Camera,
    CameraStereo,
    CameraSwitcher,
    Light,
    OpticalReference,
    OpticalMarker,
    NurbsCurve,
    TrimNurbsSurface,
    Boundary,
    NurbsSurface,
    Shape,
    LodGroup,
    SubDiv,
    CachedEffect,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SkeletonType {
    /// First element of a chain.
    #[default]
    Root,
    Limb,
    LimbNode,
    /// Last element of a chain.
    Effector,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletonAttribute {
    pub skeleton_type: SkeletonType,
    pub size: f32,
    pub limb_length: f32,
}

impl Default for SkeletonAttribute {
    fn default() -> Self {
        Self {
            skeleton_type: SkeletonType::Root,
            size: 100.0,
            limb_length: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NullLook {
    None,
    #[default]
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullAttribute {
    pub size: f32,
    pub look: NullLook,
}

impl NullAttribute {
    pub const DEFAULT_SIZE: f32 = 100.0;
}

impl Default for NullAttribute {
    fn default() -> Self {
        Self {
            size: Self::DEFAULT_SIZE,
            look: NullLook::Cross,
        }
    }
}

/// Per-kind attribute payload. Kinds the core does not evaluate keep only
/// their type tag.
#[derive(Debug, Clone)]
pub enum AttributeKind {
    Mesh(Mesh),
    Skeleton(SkeletonAttribute),
    Null(NullAttribute),
    Unsupported(AttributeType),
}

/// Data attached to one or more nodes.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: Option<String>,
    /// Nodes using this attribute.
    pub nodes: Vec<NodeIndex>,
    pub kind: AttributeKind,
}

impl Attribute {
    #[must_use]
    pub fn new(name: Option<String>, kind: AttributeKind) -> Self {
        Self {
            name,
            nodes: Vec::new(),
            kind,
        }
    }

    #[must_use]
    pub fn attribute_type(&self) -> AttributeType {
        match &self.kind {
            AttributeKind::Mesh(_) => AttributeType::Mesh,
            AttributeKind::Skeleton(_) => AttributeType::Skeleton,
            AttributeKind::Null(_) => AttributeType::Null,
            AttributeKind::Unsupported(ty) => *ty,
        }
    }

    #[must_use]
    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            AttributeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            AttributeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// The only node using this attribute.
    pub fn single_node(&self) -> Result<NodeIndex> {
        match self.nodes.as_slice() {
            [node] => Ok(*node),
            nodes => Err(PoseError::AttributeNodeCount {
                name: self.name.clone(),
                count: nodes.len(),
            }),
        }
    }
}
