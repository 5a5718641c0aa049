//! Pose evaluation for FBX-style scenes.
//!
//! Takes a materialized [`Scene`] (node hierarchy with pivot transforms,
//! keyframed animation, skin clusters) and produces posed geometry:
//! - global node matrices at rest or at any tick
//! - linear blend skinned vertex positions and normals
//! - bounding boxes and Ritter bounding spheres
//!
//! Loading the container format and exporting results live elsewhere.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod bounds;
pub mod config;
pub mod errors;
pub mod scene;
pub mod skinning;

pub use animation::{AnimCurve, AnimCurve3, AnimCurveKey, AnimLayer, AnimNode, AnimStack, KeyFlags, Ticks, TimeMode, TimeSpan};
pub use bounds::{BoundingBox, BoundingSphere};
pub use config::PoseSettings;
pub use errors::{PoseError, Result};
pub use scene::{Attribute, AttributeKind, LocalTransform, Mesh, Node, NodeGraph, Scene, SystemUnit, TrsTransform};
pub use skinning::{Cluster, Deformer, Skin, SkinningEngine, build_vertex_bones};
