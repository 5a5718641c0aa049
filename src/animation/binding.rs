use crate::animation::curve::AnimCurve3;
use crate::animation::time::{Ticks, seconds_to_ticks};
use crate::scene::NodeIndex;
use crate::scene::node::Node;
use crate::scene::transform::LocalTransform;

/// Animation of one node: per-axis curves for each TRS component.
///
/// Only scale, rotation and translation are animated. Pivots, offsets,
/// pre/post rotation and the rotation order always come from the node.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimNode {
    pub node: NodeIndex,
    pub scaling: AnimCurve3,
    /// Euler degrees in the node's rotation order.
    pub rotation: AnimCurve3,
    pub translation: AnimCurve3,
}

impl AnimNode {
    #[must_use]
    pub fn new(node: NodeIndex, scaling: AnimCurve3, rotation: AnimCurve3, translation: AnimCurve3) -> Self {
        Self {
            node,
            scaling,
            rotation,
            translation,
        }
    }

    /// The node's local transform with TRS sampled at `time`.
    ///
    /// `node` must be the node this animation targets.
    #[must_use]
    pub fn evaluate_local_transform(&self, node: &Node, time: Ticks) -> LocalTransform {
        debug_assert_eq!(node.index(), self.node);
        LocalTransform {
            translation: self.translation.sample(time),
            rotation: self.rotation.sample(time),
            scaling: self.scaling.sample(time),
            ..node.local
        }
    }

    #[must_use]
    pub fn evaluate_local_transform_seconds(&self, node: &Node, seconds: f64) -> LocalTransform {
        self.evaluate_local_transform(node, seconds_to_ticks(seconds))
    }

    // ========================================================================
    // Static channel detection
    // ========================================================================
    //
    // A channel is "default" when its keys never leave the identity value and
    // the node has no pivots that would make the identity non-trivial.
    // Comparisons are exact.

    #[must_use]
    pub fn is_default_scaling(&self, node: &Node) -> bool {
        node.local.has_default_pivots() && self.scaling.is_constant_at(1.0)
    }

    #[must_use]
    pub fn is_default_rotation(&self, node: &Node) -> bool {
        node.local.has_default_pivots() && self.rotation.is_constant_at(0.0)
    }

    #[must_use]
    pub fn is_default_translation(&self, node: &Node) -> bool {
        node.local.has_default_pivots() && self.translation.is_constant_at(0.0)
    }

    /// Rescales the translation curves. Scale and rotation are unitless.
    pub fn scale_lengths(&mut self, factor: f32) {
        self.translation.scale_values(factor);
    }
}
