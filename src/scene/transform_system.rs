//! Transform System
//!
//! Computes global (world) matrices for every node of a [`NodeGraph`] arena.
//! Decoupled from the scene so that callers can feed any local-matrix source:
//! the static node parameters, or an animation layer sampled at some time.
//!
//! # Traversal
//!
//! Scene hierarchies can be arbitrarily deep, so nothing here recurses:
//! - [`build_level_order_batches`] precomputes a BFS (parent-before-child)
//!   order once per graph
//! - [`update_hierarchy_batched`] walks that order
//! - [`update_hierarchy_iterative`] uses an explicit work stack instead
//!
//! Nodes within one batch never depend on each other.

use glam::Mat4;

use crate::errors::{PoseError, Result};
use crate::scene::NodeIndex;
use crate::scene::node::Node;

/// Level-order batches of node indices.
#[derive(Debug, Default, Clone)]
pub struct LevelOrderBatches {
    /// `batches[0]` holds the root, `batches[1]` its children, and so on.
    pub batches: Vec<Vec<NodeIndex>>,
}

impl LevelOrderBatches {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the batches while keeping their allocations.
    pub fn clear(&mut self) {
        for batch in &mut self.batches {
            batch.clear();
        }
    }

    #[must_use]
    pub fn total_nodes(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.batches.iter().filter(|b| !b.is_empty()).count()
    }

    /// Flattened parent-before-child order.
    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.batches.iter().flatten().copied()
    }
}

/// Builds BFS batches starting at `root`.
///
/// Fails when a node is reached twice (a cycle or a node with two parents),
/// when a child index is out of bounds, or when a child's parent link does
/// not point back at the node listing it.
pub fn build_level_order_batches(
    nodes: &[Node],
    root: NodeIndex,
    output: &mut LevelOrderBatches,
) -> Result<()> {
    output.clear();

    if nodes.is_empty() {
        return Ok(());
    }
    if root >= nodes.len() {
        return Err(PoseError::NodeIndexOutOfBounds {
            context: "hierarchy root",
            index: root,
        });
    }

    let mut visited = vec![false; nodes.len()];
    visited[root] = true;

    let mut current_level = vec![root];
    let mut level = 0;

    while !current_level.is_empty() {
        let mut next_level = Vec::new();

        for &node_index in &current_level {
            for &child in &nodes[node_index].children {
                let Some(child_node) = nodes.get(child) else {
                    return Err(PoseError::NodeIndexOutOfBounds {
                        context: "child link",
                        index: child,
                    });
                };
                if child_node.parent != Some(node_index) {
                    return Err(PoseError::InvalidHierarchy {
                        node: child,
                        reason: "parent link does not match child list",
                    });
                }
                if std::mem::replace(&mut visited[child], true) {
                    return Err(PoseError::InvalidHierarchy {
                        node: child,
                        reason: "node reached twice (cycle or multiple parents)",
                    });
                }
                next_level.push(child);
            }
        }

        if level < output.batches.len() {
            output.batches[level] = current_level;
        } else {
            output.batches.push(current_level);
        }

        current_level = next_level;
        level += 1;
    }

    output.batches.truncate(level);
    Ok(())
}

/// Computes global matrices in the precomputed batch order.
///
/// `out` must hold one matrix per node; nodes not reachable from the root
/// keep whatever value `out` already had.
pub fn update_hierarchy_batched<F>(
    nodes: &[Node],
    batches: &LevelOrderBatches,
    mut local_matrix: F,
    out: &mut [Mat4],
) where
    F: FnMut(&Node) -> Mat4,
{
    for batch in &batches.batches {
        for &node_index in batch {
            let node = &nodes[node_index];
            let local = local_matrix(node);
            out[node_index] = match node.parent {
                Some(parent) => out[parent] * local,
                None => local,
            };
        }
    }
}

/// Computes global matrices with an explicit depth-first work stack.
///
/// Equivalent to [`update_hierarchy_batched`] but needs no precomputed
/// order. Does not validate the hierarchy.
pub fn update_hierarchy_iterative<F>(
    nodes: &[Node],
    root: NodeIndex,
    mut local_matrix: F,
    out: &mut [Mat4],
) where
    F: FnMut(&Node) -> Mat4,
{
    // Work stack: (node index, parent world matrix)
    let mut stack: Vec<(NodeIndex, Mat4)> = Vec::with_capacity(64);
    if root < nodes.len() {
        stack.push((root, Mat4::IDENTITY));
    }

    while let Some((node_index, parent_world)) = stack.pop() {
        let node = &nodes[node_index];
        let world = parent_world * local_matrix(node);
        out[node_index] = world;

        // Reverse so children are visited in file order
        for &child in node.children.iter().rev() {
            if child < nodes.len() {
                stack.push((child, world));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::transform::LocalTransform;
    use glam::Vec3;

    fn chain(length: usize) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(length);
        for i in 0..length {
            let mut node = Node::new().with_local(LocalTransform::from_trs(
                Vec3::X,
                Vec3::ZERO,
                Vec3::ONE,
            ));
            node.index = i;
            if i > 0 {
                node.parent = Some(i - 1);
            }
            if i + 1 < length {
                node.children.push(i + 1);
            }
            nodes.push(node);
        }
        nodes
    }

    #[test]
    fn test_hierarchy_update() {
        let nodes = chain(3);
        let mut batches = LevelOrderBatches::new();
        build_level_order_batches(&nodes, 0, &mut batches).unwrap();
        assert_eq!(batches.depth(), 3);

        let mut out = vec![Mat4::IDENTITY; nodes.len()];
        update_hierarchy_batched(&nodes, &batches, Node::local_matrix, &mut out);

        let tail = out[2].w_axis.truncate();
        assert!((tail - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let nodes = chain(100_000);
        let mut out = vec![Mat4::IDENTITY; nodes.len()];
        update_hierarchy_iterative(&nodes, 0, Node::local_matrix, &mut out);
        assert!((out[99_999].w_axis.x - 100_000.0).abs() < 1.0);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut nodes = chain(3);
        nodes[2].children.push(0);
        nodes[0].parent = Some(2);
        let mut batches = LevelOrderBatches::new();
        assert!(build_level_order_batches(&nodes, 0, &mut batches).is_err());
    }
}
