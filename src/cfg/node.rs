//! Node types for the direct control flow graph.
//!
//! This module provides [`DirectNodeId`], a strongly-typed handle for nodes within a
//! [`DirectGraph`](crate::cfg::DirectGraph), together with [`DirectNode`] itself: a basic
//! block of ordered expression statements tagged with a [`NodeKind`].

use std::fmt;

use crate::expr::Expr;

/// A strongly-typed identifier for nodes within a [`DirectGraph`](crate::cfg::DirectGraph).
///
/// `DirectNodeId` wraps a `usize` index, providing type safety to prevent accidental
/// mixing of node handles with other integer values. Ids are assigned sequentially
/// starting from 0 when nodes are added to a graph, and all edges, path wrappers and
/// analysis tables reference nodes through these handles rather than through owned
/// pointers, which sidesteps cyclic-ownership issues in looping graphs.
///
/// # Usage
///
/// Node ids are created by [`DirectGraph::add_node`](crate::cfg::DirectGraph::add_node)
/// and should not typically be constructed manually. They are used to:
///
/// - Reference nodes when adding regular and exception edges
/// - Attach finally path wrappers and negative-branch markers
/// - Key the per-node state maps of the SSA construction pass
///
/// # Thread Safety
///
/// `DirectNodeId` is [`Copy`], [`Send`], and [`Sync`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DirectNodeId(pub(crate) usize);

impl DirectNodeId {
    /// Creates a new `DirectNodeId` from a raw index value.
    ///
    /// This constructor is primarily intended for internal use and testing. Normal usage
    /// should obtain ids from [`DirectGraph::add_node`](crate::cfg::DirectGraph::add_node).
    ///
    /// # Arguments
    ///
    /// * `index` - The raw node index (0-based)
    ///
    /// # Returns
    ///
    /// A new `DirectNodeId` wrapping the provided index.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        DirectNodeId(index)
    }

    /// Returns the raw index value of this node identifier.
    ///
    /// The index is a 0-based position that can be used to index into vectors that store
    /// per-node data.
    ///
    /// # Returns
    ///
    /// The underlying index value.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for DirectNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirectNodeId({})", self.0)
    }
}

impl fmt::Display for DirectNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<usize> for DirectNodeId {
    #[inline]
    fn from(index: usize) -> Self {
        DirectNodeId(index)
    }
}

impl From<DirectNodeId> for usize {
    #[inline]
    fn from(node: DirectNodeId) -> Self {
        node.0
    }
}

/// The kind of a direct node.
///
/// Most nodes are [`Regular`](Self::Regular) basic blocks. The other kinds mark nodes
/// synthesized by the upstream flattening step whose entry state needs special seeding
/// (see [`DirectGraph::add_seed_var`](crate::cfg::DirectGraph::add_seed_var)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An ordinary basic block of flattened statements.
    Regular,
    /// The synthetic definition point of a `foreach` loop variable.
    ForeachVarDef,
    /// Any other synthetic node (catch handler entries, finally representatives, ...).
    Synthetic,
}

/// A basic block in the direct control flow graph.
///
/// Each node carries its stable [`DirectNodeId`], a [`NodeKind`] tag, and the ordered
/// list of expression statements the flattening step placed into it. The SSA pass
/// rewrites the version fields of the variable occurrences inside these statements
/// in place.
#[derive(Debug, Clone)]
pub struct DirectNode {
    /// The stable handle of this node.
    id: DirectNodeId,
    /// The kind tag of this node.
    kind: NodeKind,
    /// The ordered expression statements of this block.
    statements: Vec<Expr>,
}

impl DirectNode {
    /// Creates a new node.
    ///
    /// # Arguments
    ///
    /// * `id` - The handle assigned by the owning graph
    /// * `kind` - The node kind tag
    /// * `statements` - The ordered statements of the block
    #[must_use]
    pub(crate) fn new(id: DirectNodeId, kind: NodeKind, statements: Vec<Expr>) -> Self {
        Self {
            id,
            kind,
            statements,
        }
    }

    /// Returns the stable handle of this node.
    #[must_use]
    pub const fn id(&self) -> DirectNodeId {
        self.id
    }

    /// Returns the kind tag of this node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns the ordered statements of this block.
    #[must_use]
    pub fn statements(&self) -> &[Expr] {
        &self.statements
    }

    /// Returns mutable access to the ordered statements of this block.
    ///
    /// The SSA pass uses this to write versions into variable occurrences; the flattening
    /// post-pass uses it to rewrite multi-version occurrences to fresh variable indices.
    pub fn statements_mut(&mut self) -> &mut [Expr] {
        &mut self.statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_node_id_new() {
        let node = DirectNodeId::new(42);
        assert_eq!(node.index(), 42);
    }

    #[test]
    fn test_node_id_equality() {
        let node1 = DirectNodeId::new(5);
        let node2 = DirectNodeId::new(5);
        let node3 = DirectNodeId::new(10);

        assert_eq!(node1, node2);
        assert_ne!(node1, node3);
    }

    #[test]
    fn test_node_id_ordering() {
        let node1 = DirectNodeId::new(1);
        let node2 = DirectNodeId::new(2);
        let node3 = DirectNodeId::new(3);

        let mut nodes = vec![node3, node1, node2];
        nodes.sort();
        assert_eq!(nodes, vec![node1, node2, node3]);
    }

    #[test]
    fn test_node_id_hash() {
        let mut set: HashSet<DirectNodeId> = HashSet::new();
        set.insert(DirectNodeId::new(1));
        set.insert(DirectNodeId::new(2));
        set.insert(DirectNodeId::new(1));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_node_id_as_map_key() {
        let mut map: HashMap<DirectNodeId, &str> = HashMap::new();
        map.insert(DirectNodeId::new(1), "first");
        map.insert(DirectNodeId::new(2), "second");

        assert_eq!(map.get(&DirectNodeId::new(1)), Some(&"first"));
        assert_eq!(map.get(&DirectNodeId::new(3)), None);
    }

    #[test]
    fn test_node_id_conversions() {
        let node: DirectNodeId = 123usize.into();
        assert_eq!(node.index(), 123);

        let value: usize = DirectNodeId::new(789).into();
        assert_eq!(value, 789);
    }

    #[test]
    fn test_node_id_debug_format() {
        let node = DirectNodeId::new(42);
        assert_eq!(format!("{node:?}"), "DirectNodeId(42)");
    }

    #[test]
    fn test_node_id_display_format() {
        let node = DirectNodeId::new(42);
        assert_eq!(format!("{node}"), "n42");
    }

    #[test]
    fn test_node_accessors() {
        let node = DirectNode::new(DirectNodeId::new(3), NodeKind::Regular, Vec::new());
        assert_eq!(node.id(), DirectNodeId::new(3));
        assert_eq!(node.kind(), NodeKind::Regular);
        assert!(node.statements().is_empty());
    }
}
