//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`PoseError`] covers:
//! - Malformed input (cluster arrays, hierarchy, keyframe order)
//! - Contract misuse (posing without a skin or an animation layer)
//! - Configuration and unit errors
//!
//! Numeric edge cases (zero influence weight, degenerate sphere growth,
//! sampling outside a curve's key range) are handled in place and never
//! surface here.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, PoseError>`.
//!
//! ```rust,ignore
//! use slimfbx::errors::{PoseError, Result};
//!
//! fn build() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::animation::time::{TimeMode, Ticks};
use crate::scene::{AttributeIndex, NodeIndex};
use crate::skinning::skin::SkinningType;

/// The main error type for scene evaluation.
#[derive(Error, Debug)]
pub enum PoseError {
    // ========================================================================
    // Skin Binding Errors
    // ========================================================================
    /// A cluster's control-point index and weight arrays differ in length.
    #[error("Cluster {cluster}: {indices} control point indices but {weights} weights")]
    ClusterLengthMismatch {
        cluster: usize,
        indices: usize,
        weights: usize,
    },

    /// More clusters than a 16-bit bone index can address.
    #[error("Too many bone clusters: {count} (max {max})")]
    TooManyClusters { count: usize, max: usize },

    /// A cluster has no link node to drive it.
    #[error("Cluster {cluster} has no link node")]
    MissingLinkNode { cluster: usize },

    /// A cluster references a control point outside the mesh.
    #[error("Cluster {cluster}: control point {vertex} out of range (vertex count {vertex_count})")]
    ControlPointOutOfRange {
        cluster: usize,
        vertex: i64,
        vertex_count: usize,
    },

    /// Deformation was requested on a mesh that carries no skin deformer.
    #[error("Mesh {mesh:?} has no skin deformer")]
    MissingSkin { mesh: Option<String> },

    /// Only rigid and linear skinning are evaluated.
    #[error("Unsupported skinning type: {0:?}")]
    UnsupportedSkinningType(SkinningType),

    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// Animated evaluation was requested from an engine built without a layer.
    #[error("No animation layer bound to this evaluation context")]
    NoAnimationLayer,

    /// Keyframe times must be strictly increasing.
    #[error("Keyframe {index} at tick {current} does not follow tick {previous}")]
    UnsortedKeyframes {
        index: usize,
        previous: Ticks,
        current: Ticks,
    },

    /// A curve needs at least one key to be sampled.
    #[error("Animation curve has no keyframes")]
    EmptyCurve,

    /// The time mode has no fixed frame length (`Frames30Drop`).
    #[error("Time mode {0:?} has no fixed frame length")]
    NoFixedFrameRate(TimeMode),

    // ========================================================================
    // Scene Graph Errors
    // ========================================================================
    /// Node index out of bounds.
    #[error("Node index out of bounds: {context} (index: {index})")]
    NodeIndexOutOfBounds {
        /// Description of what was being accessed
        context: &'static str,
        /// The invalid index
        index: NodeIndex,
    },

    /// Parent/child links are inconsistent or cyclic.
    #[error("Invalid hierarchy at node {node}: {reason}")]
    InvalidHierarchy { node: NodeIndex, reason: &'static str },

    /// No attribute at this index.
    #[error("Attribute index out of bounds: {index} (count: {count})")]
    AttributeIndexOutOfBounds { index: AttributeIndex, count: usize },

    /// An attribute was expected to be used by exactly one node.
    #[error("Attribute {name:?} is used by {count} nodes, expected exactly one")]
    AttributeNodeCount { name: Option<String>, count: usize },

    /// A caller-provided buffer does not match the mesh vertex count.
    #[error("{context}: buffer length {actual} does not match vertex count {expected}")]
    BufferLengthMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Only centimetre and metre scenes can be normalized.
    #[error("Unsupported system unit: scale factor {scale_factor}, multiplier {multiplier}")]
    UnsupportedUnit { scale_factor: f32, multiplier: f32 },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings could not be parsed.
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Alias for `Result<T, PoseError>`.
pub type Result<T> = std::result::Result<T, PoseError>;
