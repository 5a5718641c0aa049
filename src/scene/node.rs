use glam::{Mat4, Vec3};

use crate::scene::transform::{LocalTransform, RotationOrder, TrsTransform, euler_degrees_to_quat};
use crate::scene::{AttributeIndex, NodeIndex};

/// A scene node stored in the [`NodeGraph`](crate::scene::NodeGraph) arena.
///
/// # Hierarchy
///
/// - `parent`: index of the parent node (None for the root)
/// - `children`: indices of child nodes, in file order
///
/// Both are indices into the same arena; the parent link is non-owning.
///
/// # Transform
///
/// `local` holds the static pivot parameters. The geometric transform
/// offsets attached geometry only and is not inherited by children.
#[derive(Debug, Clone)]
pub struct Node {
    // === Identity ===
    pub(crate) index: NodeIndex,
    pub name: Option<String>,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) children: Vec<NodeIndex>,

    // === Spatial Data ===
    pub local: LocalTransform,

    pub geometric_translation: Vec3,
    /// Euler XYZ in degrees.
    pub geometric_rotation: Vec3,
    pub geometric_scaling: Vec3,

    // === Attached Data ===
    pub attributes: Vec<AttributeIndex>,
}

impl Node {
    /// Creates a detached node with identity transforms.
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: 0,
            name: None,
            parent: None,
            children: Vec::new(),
            local: LocalTransform::IDENTITY,
            geometric_translation: Vec3::ZERO,
            geometric_rotation: Vec3::ZERO,
            geometric_scaling: Vec3::ONE,
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }

    /// Builder-style helper for tests and loaders.
    #[must_use]
    pub fn with_local(mut self, local: LocalTransform) -> Self {
        self.local = local;
        self
    }

    /// Position of this node in the scene's node array.
    #[inline]
    #[must_use]
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn rotation_order(&self) -> RotationOrder {
        self.local.rotation_order
    }

    /// False when every local parameter is exactly at its default, meaning
    /// the node contributes nothing to its subtree's transform.
    #[inline]
    #[must_use]
    pub fn has_transform(&self) -> bool {
        !self.local.is_identity()
    }

    /// The node's static local transform.
    #[inline]
    #[must_use]
    pub fn local_transform(&self) -> LocalTransform {
        self.local
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        self.local.to_matrix()
    }

    #[must_use]
    pub fn geometric_transform(&self) -> TrsTransform {
        TrsTransform {
            translation: self.geometric_translation,
            rotation: euler_degrees_to_quat(self.geometric_rotation),
            scaling: self.geometric_scaling,
        }
    }

    pub fn scale_lengths(&mut self, factor: f32) {
        self.local.scale_lengths(factor);
        self.geometric_translation *= factor;
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
