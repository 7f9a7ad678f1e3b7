//! Arena-backed mutation-annotated tree.
//!
//! # Overview
//! Nodes live in a flat `Vec` addressed by [`NodeId`] indices. Children are
//! owned index sequences and the parent link is a plain back-reference
//! index, so there is no cyclic ownership to manage. A side index maps node
//! identifiers to their slots for sample lookup.
//!
//! The statistics layer consumes this module read-only; the single write
//! accessor, [`MutationTree::set_mutations`], exists for the strand
//! reverser, which relabels mutation annotations in place.

use std::collections::HashMap;

use crate::AnalysisError;
use crate::mutation::Mutation;

/// Index of a node inside the arena.
pub type NodeId = usize;

/// A tree node: identifier, the mutations on the edge from its parent, and
/// its direct children.
#[derive(Debug, Clone)]
pub struct Node {
    identifier: String,
    mutations: Vec<Mutation>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Identifier, unique within the tree.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Mutations on the edge from the parent to this node, in edge order.
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Parent slot; `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children, in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// A node is a leaf iff it has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A rooted tree whose edges carry mutation annotations.
#[derive(Debug, Clone)]
pub struct MutationTree {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
}

impl MutationTree {
    /// Create a tree holding only its root.
    ///
    /// The root carries no parent edge, so its mutation list starts empty.
    pub fn new(root_identifier: impl Into<String>) -> Self {
        let identifier = root_identifier.into();
        let mut index = HashMap::new();
        index.insert(identifier.clone(), 0);
        Self {
            nodes: vec![Node {
                identifier,
                mutations: Vec::new(),
                parent: None,
                children: Vec::new(),
            }],
            index,
        }
    }

    /// Slot of the root node.
    pub fn root(&self) -> NodeId {
        0
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Attach a new child under `parent` and return its slot.
    ///
    /// Identifiers must be unique within the tree; that is the caller's
    /// contract, checked in debug builds only.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        identifier: impl Into<String>,
        mutations: Vec<Mutation>,
    ) -> NodeId {
        let identifier = identifier.into();
        debug_assert!(
            !self.index.contains_key(&identifier),
            "duplicate node identifier '{identifier}'"
        );
        let id = self.nodes.len();
        self.nodes.push(Node {
            identifier: identifier.clone(),
            mutations,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        self.index.insert(identifier, id);
        id
    }

    /// Read access to a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Resolve an identifier to its slot.
    pub fn find(&self, identifier: &str) -> Option<NodeId> {
        self.index.get(identifier).copied()
    }

    /// Path from a named sample up to the root, **sample→root order**,
    /// both endpoints included.
    ///
    /// This matches the rootward search the statistics layer consumes; the
    /// diff engine reverses it to walk root→sample.
    pub fn rootward_path(&self, sample: &str) -> Result<Vec<NodeId>, AnalysisError> {
        let id = self.find(sample).ok_or_else(|| AnalysisError::UnknownSample {
            id: sample.to_string(),
        })?;
        Ok(self.rootward_path_of(id))
    }

    /// Rootward path starting from a known slot, sample→root order.
    pub fn rootward_path_of(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = vec![node];
        let mut current = node;
        while let Some(parent) = self.nodes[current].parent {
            path.push(parent);
            current = parent;
        }
        path
    }

    /// All nodes in pre-order (parent before children, children in
    /// insertion order).
    ///
    /// Iterative on an explicit stack: pathogen trees can be long chains,
    /// deep enough to overflow the call stack under recursion.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            // Push right-to-left so the leftmost child is visited first.
            for &child in self.nodes[id].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Slots of every leaf, in pre-order.
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|&id| self.nodes[id].is_leaf())
            .collect()
    }

    /// Replace a node's mutation list.
    ///
    /// Write access reserved for the strand reverser; topology is not
    /// touched.
    pub fn set_mutations(&mut self, id: NodeId, mutations: Vec<Mutation>) {
        self.nodes[id].mutations = mutations;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ```text
    ///        root
    ///       /    \
    ///     n1      n2
    ///    /  \       \
    ///   s1   s2      s3
    /// ```
    fn sample_tree() -> MutationTree {
        let mut tree = MutationTree::new("root");
        let n1 = tree.add_child(tree.root(), "n1", vec![]);
        let n2 = tree.add_child(tree.root(), "n2", vec![]);
        tree.add_child(n1, "s1", vec![]);
        tree.add_child(n1, "s2", vec![]);
        tree.add_child(n2, "s3", vec![]);
        tree
    }

    fn identifiers(tree: &MutationTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| tree.node(id).identifier().to_string())
            .collect()
    }

    #[test]
    fn preorder_visits_parent_before_children() {
        let tree = sample_tree();
        assert_eq!(
            identifiers(&tree, &tree.preorder()),
            ["root", "n1", "s1", "s2", "n2", "s3"]
        );
    }

    #[test]
    fn rootward_path_is_sample_to_root() {
        let tree = sample_tree();
        let path = tree.rootward_path("s2").unwrap();
        assert_eq!(identifiers(&tree, &path), ["s2", "n1", "root"]);
    }

    #[test]
    fn rootward_path_of_root_is_singleton() {
        let tree = sample_tree();
        let path = tree.rootward_path("root").unwrap();
        assert_eq!(identifiers(&tree, &path), ["root"]);
    }

    #[test]
    fn unknown_sample_is_an_error() {
        let tree = sample_tree();
        assert_eq!(
            tree.rootward_path("missing").unwrap_err(),
            AnalysisError::UnknownSample {
                id: "missing".to_string()
            }
        );
    }

    #[test]
    fn leaves_are_the_childless_nodes() {
        let tree = sample_tree();
        assert_eq!(identifiers(&tree, &tree.leaf_ids()), ["s1", "s2", "s3"]);
        assert!(!tree.node(tree.root()).is_leaf());
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn single_node_tree_root_is_a_leaf() {
        let tree = MutationTree::new("only");
        assert!(tree.node(tree.root()).is_leaf());
        assert_eq!(tree.leaf_ids(), vec![tree.root()]);
    }
}
