use std::sync::OnceLock;

use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::errors::{PoseError, Result};
use crate::scene::NodeIndex;
use crate::scene::node::Node;
use crate::scene::transform_system::{self, LevelOrderBatches};

/// Arena of scene nodes with index-based parent/child links.
///
/// Node indices are positions in the arena and never change once a node is
/// added. The parent-before-child traversal order is computed on first use
/// and cached until the hierarchy is modified.
#[derive(Debug, Default)]
pub struct NodeGraph {
    nodes: Vec<Node>,
    root: NodeIndex,
    order: OnceLock<LevelOrderBatches>,
}

impl NodeGraph {
    /// Creates a graph holding only `root`, at index 0.
    #[must_use]
    pub fn new(root: Node) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            root: 0,
            order: OnceLock::new(),
        };
        graph.add_node(root);
        graph
    }

    /// Adopts a loader-produced node array whose parent/child links are
    /// already set. Each node's index is reassigned to its array position
    /// and the hierarchy is validated.
    pub fn from_nodes(mut nodes: Vec<Node>, root: NodeIndex) -> Result<Self> {
        for (i, node) in nodes.iter_mut().enumerate() {
            node.index = i;
        }
        let graph = Self {
            nodes,
            root,
            order: OnceLock::new(),
        };
        graph.validate()?;
        Ok(graph)
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Appends a detached node and returns its index.
    pub fn add_node(&mut self, mut node: Node) -> NodeIndex {
        let index = self.nodes.len();
        node.index = index;
        node.parent = None;
        node.children.clear();
        self.nodes.push(node);
        self.order = OnceLock::new();
        index
    }

    /// Links `child` under `parent`. The child must not already have a parent.
    pub fn attach(&mut self, child: NodeIndex, parent: NodeIndex) -> Result<()> {
        self.get(parent)?;
        let child_node = self.get(child)?;
        if child == self.root || child == parent {
            return Err(PoseError::InvalidHierarchy {
                node: child,
                reason: "cannot attach the root or a node to itself",
            });
        }
        if child_node.parent.is_some() {
            return Err(PoseError::InvalidHierarchy {
                node: child,
                reason: "node already has a parent",
            });
        }
        if self.is_ancestor(child, parent) {
            return Err(PoseError::InvalidHierarchy {
                node: child,
                reason: "attachment would create a cycle",
            });
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        self.order = OnceLock::new();
        Ok(())
    }

    /// Adds `node` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, node: Node) -> Result<NodeIndex> {
        self.get(parent)?;
        let index = self.add_node(node);
        self.attach(index, parent)?;
        Ok(index)
    }

    fn is_ancestor(&self, ancestor: NodeIndex, mut node: NodeIndex) -> bool {
        // Bounded by node count in case the links are already corrupted
        for _ in 0..=self.nodes.len() {
            if node == ancestor {
                return true;
            }
            match self.nodes[node].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
        true
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Mutable access to a node's parameters. Hierarchy links stay private.
    #[inline]
    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    pub fn get(&self, index: NodeIndex) -> Result<&Node> {
        self.nodes.get(index).ok_or(PoseError::NodeIndexOutOfBounds {
            context: "node graph",
            index,
        })
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// Depth-first search from the root, children in file order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeIndex> {
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            let node = self.nodes.get(index)?;
            if node.name.as_deref() == Some(name) {
                return Some(index);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Name lookup table; the first node carrying a name wins.
    #[must_use]
    pub fn name_map(&self) -> FxHashMap<&str, NodeIndex> {
        let mut map = FxHashMap::default();
        for node in &self.nodes {
            if let Some(name) = node.name.as_deref().filter(|n| !n.is_empty()) {
                map.entry(name).or_insert(node.index);
            }
        }
        map
    }

    // ========================================================================
    // Validation & traversal order
    // ========================================================================

    /// Checks that every node is reachable from the root exactly once and
    /// that parent and child links agree.
    pub fn validate(&self) -> Result<()> {
        let order = self.traversal_order()?;
        if order.total_nodes() != self.nodes.len() {
            let orphan = (0..self.nodes.len())
                .find(|&i| i != self.root && self.nodes[i].parent.is_none())
                .unwrap_or(self.root);
            return Err(PoseError::InvalidHierarchy {
                node: orphan,
                reason: "node not reachable from the root",
            });
        }
        if self.nodes.get(self.root).is_some_and(|n| n.parent.is_some()) {
            return Err(PoseError::InvalidHierarchy {
                node: self.root,
                reason: "root has a parent",
            });
        }
        Ok(())
    }

    /// Parent-before-child order, computed once and cached.
    pub fn traversal_order(&self) -> Result<&LevelOrderBatches> {
        if let Some(order) = self.order.get() {
            return Ok(order);
        }
        let mut batches = LevelOrderBatches::new();
        transform_system::build_level_order_batches(&self.nodes, self.root, &mut batches)?;
        Ok(self.order.get_or_init(|| batches))
    }

    // ========================================================================
    // Static pose
    // ========================================================================

    /// Global transform of one node in the static pose, walking the parent
    /// chain toward the root.
    pub fn global_transform(&self, index: NodeIndex) -> Result<Mat4> {
        let mut result = self.get(index)?.local_matrix();
        let mut current = self.nodes[index].parent;
        let mut steps = 0;
        while let Some(parent) = current {
            steps += 1;
            if steps > self.nodes.len() {
                return Err(PoseError::InvalidHierarchy {
                    node: index,
                    reason: "parent chain does not terminate",
                });
            }
            let parent_node = self.get(parent)?;
            result = parent_node.local_matrix() * result;
            current = parent_node.parent;
        }
        Ok(result)
    }

    /// Global transforms of every node in the static pose.
    pub fn global_transforms(&self) -> Result<Vec<Mat4>> {
        let order = self.traversal_order()?;
        let mut out = vec![Mat4::IDENTITY; self.nodes.len()];
        transform_system::update_hierarchy_batched(&self.nodes, order, Node::local_matrix, &mut out);
        Ok(out)
    }
}

impl Clone for NodeGraph {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            order: OnceLock::new(),
        }
    }
}
