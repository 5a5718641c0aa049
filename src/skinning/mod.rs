//! Skin binding and deformation
//!
//! - Skin: clusters binding bones to control points
//! - Weights: per-vertex bone tables
//! - Engine: posing and linear blend skinning

pub mod skin;
pub mod weights;
pub mod engine;

pub use skin::{Cluster, Deformer, DeformerType, LinkMode, Skin, SkinningType};
pub use weights::{BoneWeight, VertexBones, VertexInfluences, build_vertex_bones};
pub use engine::SkinningEngine;
