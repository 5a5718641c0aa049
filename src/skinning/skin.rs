use glam::{Mat4, Vec4};

use crate::scene::NodeIndex;
use crate::scene::node::Node;

/// How a cluster's weights relate to the other clusters on a control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkMode {
    /// Weights on a control point are normalized to 1.
    #[default]
    Normalize,
    /// Weights are used as given.
    Additive,
    /// Weights are expected to already sum to 1.
    TotalOne,
}

/// One bone binding of a skin.
///
/// `transform_matrix` is the mesh's global matrix at bind time and
/// `transform_link_matrix` the bone's.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub link_mode: LinkMode,
    pub link: Option<NodeIndex>,
    /// Parallel to `control_point_weights`.
    pub control_point_indices: Vec<i32>,
    pub control_point_weights: Vec<f32>,
    pub transform_matrix: Mat4,
    pub transform_link_matrix: Mat4,
}

impl Default for Cluster {
    fn default() -> Self {
        Self {
            link_mode: LinkMode::Normalize,
            link: None,
            control_point_indices: Vec::new(),
            control_point_weights: Vec::new(),
            transform_matrix: Mat4::IDENTITY,
            transform_link_matrix: Mat4::IDENTITY,
        }
    }
}

impl Cluster {
    /// A normalized cluster driven by `link` with identity bind matrices.
    #[must_use]
    pub fn new(link: NodeIndex, control_point_indices: Vec<i32>, control_point_weights: Vec<f32>) -> Self {
        Self {
            link: Some(link),
            control_point_indices,
            control_point_weights,
            ..Self::default()
        }
    }

    /// Mesh space to bone space at bind time, including the mesh node's
    /// geometric offset.
    ///
    /// Premultiplied by the bone's current global matrix this gives the
    /// skinning matrix of the bone.
    #[must_use]
    pub fn bind_matrix(&self, mesh_node: &Node) -> Mat4 {
        let geometry = mesh_node.geometric_transform().to_matrix();
        self.transform_link_matrix.inverse() * self.transform_matrix * geometry
    }

    /// `(control point, weight)` pairs; the shorter array bounds the walk.
    pub fn influences(&self) -> impl Iterator<Item = (i32, f32)> + '_ {
        self.control_point_indices
            .iter()
            .copied()
            .zip(self.control_point_weights.iter().copied())
    }

    pub fn scale_lengths(&mut self, factor: f32) {
        scale_translation(&mut self.transform_matrix, factor);
        scale_translation(&mut self.transform_link_matrix, factor);
    }
}

fn scale_translation(matrix: &mut Mat4, factor: f32) {
    let w = matrix.w_axis;
    matrix.w_axis = Vec4::new(w.x * factor, w.y * factor, w.z * factor, w.w);
}

/// Skinning method requested by the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkinningType {
    /// One joint per control point.
    #[default]
    Rigid,
    /// Classic linear blend skinning.
    Linear,
    DualQuaternion,
    Blend,
}

impl SkinningType {
    /// Whether the weighted-average deformer can evaluate this type.
    #[must_use]
    pub fn is_linear_blend(self) -> bool {
        matches!(self, SkinningType::Rigid | SkinningType::Linear)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    pub skinning_type: SkinningType,
    pub clusters: Vec<Cluster>,
    /// Carried for export, not evaluated.
    pub deform_accuracy: f32,
}

impl Default for Skin {
    fn default() -> Self {
        Self {
            skinning_type: SkinningType::Rigid,
            clusters: Vec::new(),
            deform_accuracy: 1.0,
        }
    }
}

impl Skin {
    #[must_use]
    pub fn new(clusters: Vec<Cluster>) -> Self {
        Self {
            clusters,
            ..Self::default()
        }
    }

    pub fn scale_lengths(&mut self, factor: f32) {
        for cluster in &mut self.clusters {
            cluster.scale_lengths(factor);
        }
    }
}

/// Type tag of a deformer kind without an evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeformerType {
    Unknown,
    Skin,
    BlendShape,
    VertexCache,
}

/// A mesh deformer.
#[derive(Debug, Clone, PartialEq)]
pub enum Deformer {
    Skin(Skin),
    /// Kept so the deformer list round-trips; never evaluated.
    Unsupported(DeformerType),
}

impl Deformer {
    #[must_use]
    pub fn deformer_type(&self) -> DeformerType {
        match self {
            Deformer::Skin(_) => DeformerType::Skin,
            Deformer::Unsupported(kind) => *kind,
        }
    }

    pub fn scale_lengths(&mut self, factor: f32) {
        match self {
            Deformer::Skin(skin) => skin.scale_lengths(factor),
            Deformer::Unsupported(_) => {}
        }
    }
}
