//! Scene graph module
//!
//! Holds the node hierarchy and the data attached to it:
//! - Node: scene node (pivot parameters and parent/child links)
//! - NodeGraph: index arena with cached traversal order
//! - Transform: pivot-based local transforms and TRS triples
//! - TransformSystem: global matrix evaluation without recursion
//! - Scene: graph plus attributes, animation stacks and units

pub mod attribute;
pub mod graph;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod transform;
pub mod transform_system;
pub mod unit;

pub use attribute::{Attribute, AttributeKind, AttributeType};
pub use graph::NodeGraph;
pub use mesh::{Mesh, Polygon};
pub use node::Node;
pub use scene::Scene;
pub use transform::{LocalTransform, RotationOrder, TrsTransform};
pub use unit::SystemUnit;

/// Stable position of a node in its scene's node array.
pub type NodeIndex = usize;

/// Position of an attribute in [`Scene::attributes`].
pub type AttributeIndex = usize;
