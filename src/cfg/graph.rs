//! The direct control flow graph consumed by the SSA construction pass.
//!
//! [`DirectGraph`] is an arena of [`DirectNode`]s addressed by stable [`DirectNodeId`]
//! handles, with regular and exception adjacency stored as handle lists. On top of the
//! plain edges it carries the metadata the SSA pass needs: negative-branch markers for
//! conditional exits, finally path wrappers (short and long range), monitor exception
//! exit markers, and per-node extra seed variables for catch parameters and `foreach`
//! loop variables.
//!
//! The graph is populated by an upstream statement-flattening collaborator; this crate
//! only defines the contract and validates it on insertion.

use std::collections::{BTreeMap, HashMap};

use crate::{
    cfg::{DirectNode, DirectNodeId, FinallyPath, NodeKind},
    expr::Expr,
    ssa::VarId,
    Result,
};

/// A flattened control flow graph of direct nodes.
///
/// The first node added is the entry node of the method. Edges are split into regular
/// and exception adjacency; both are kept in insertion order so that analysis passes
/// over the graph are deterministic.
///
/// # Examples
///
/// ```rust
/// use ssaflow::{DirectGraph, Expr, NodeKind, VarId};
///
/// let mut graph = DirectGraph::new();
/// let a = graph.add_node(NodeKind::Regular, vec![
///     Expr::assign_local(VarId::new(0), Expr::Const),
/// ]);
/// let b = graph.add_node(NodeKind::Regular, vec![Expr::local(VarId::new(0))]);
/// graph.add_edge(a, b)?;
///
/// assert_eq!(graph.entry(), Some(a));
/// assert!(graph.successors(b).is_empty());
/// # Ok::<(), ssaflow::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DirectGraph {
    /// The node arena, in insertion order.
    nodes: Vec<DirectNode>,
    /// Regular successors per node.
    succs: Vec<Vec<DirectNodeId>>,
    /// Regular predecessors per node.
    preds: Vec<Vec<DirectNodeId>>,
    /// Exception successors per node.
    ex_succs: Vec<Vec<DirectNodeId>>,
    /// Exception predecessors per node.
    ex_preds: Vec<Vec<DirectNodeId>>,
    /// For a node ending in a conditional branch, the successor taking the false map.
    neg_branch: HashMap<DirectNodeId, DirectNodeId>,
    /// Short-range finally path wrappers, keyed by the finally exit node.
    short_paths: HashMap<DirectNodeId, Vec<FinallyPath>>,
    /// Long-range finally path wrappers, keyed by the finally exit node.
    long_paths: HashMap<DirectNodeId, Vec<FinallyPath>>,
    /// Monitor exception exit markers, keyed by the finally exit node.
    monitor_exits: HashMap<DirectNodeId, DirectNodeId>,
    /// Extra entry-state variables per node (catch parameters, foreach variables).
    ///
    /// Ordered map: the SSA pass allocates versions for these in iteration order, and
    /// version allocation must be deterministic.
    seed_vars: BTreeMap<DirectNodeId, Vec<VarId>>,
}

impl DirectGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the graph and returns its handle.
    ///
    /// The first node added becomes the entry node.
    ///
    /// # Arguments
    ///
    /// * `kind` - The node kind tag
    /// * `statements` - The ordered statements of the block
    ///
    /// # Returns
    ///
    /// The handle assigned to the new node.
    pub fn add_node(&mut self, kind: NodeKind, statements: Vec<Expr>) -> DirectNodeId {
        let id = DirectNodeId::new(self.nodes.len());
        self.nodes.push(DirectNode::new(id, kind, statements));
        self.succs.push(Vec::new());
        self.preds.push(Vec::new());
        self.ex_succs.push(Vec::new());
        self.ex_preds.push(Vec::new());
        id
    }

    /// Adds a regular control flow edge.
    ///
    /// # Arguments
    ///
    /// * `from` - The source node
    /// * `to` - The target node
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`](crate::Error::Malformed) if either handle does not
    /// name a node of this graph.
    pub fn add_edge(&mut self, from: DirectNodeId, to: DirectNodeId) -> Result<()> {
        self.check_id(from)?;
        self.check_id(to)?;
        if !self.succs[from.index()].contains(&to) {
            self.succs[from.index()].push(to);
            self.preds[to.index()].push(from);
        }
        Ok(())
    }

    /// Adds an exception control flow edge (from a protected node to a handler entry).
    ///
    /// # Arguments
    ///
    /// * `from` - The protected source node
    /// * `to` - The handler entry node
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`](crate::Error::Malformed) if either handle does not
    /// name a node of this graph.
    pub fn add_exception_edge(&mut self, from: DirectNodeId, to: DirectNodeId) -> Result<()> {
        self.check_id(from)?;
        self.check_id(to)?;
        if !self.ex_succs[from.index()].contains(&to) {
            self.ex_succs[from.index()].push(to);
            self.ex_preds[to.index()].push(from);
        }
        Ok(())
    }

    /// Marks `target` as the negative-branch (condition false) successor of `node`.
    ///
    /// A node with a negative branch records a split out-state: the true map flows to
    /// every other regular successor, the false map flows to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`](crate::Error::Malformed) if either handle does not
    /// name a node of this graph.
    pub fn set_negative_branch(&mut self, node: DirectNodeId, target: DirectNodeId) -> Result<()> {
        self.check_id(node)?;
        self.check_id(target)?;
        self.neg_branch.insert(node, target);
        Ok(())
    }

    /// Attaches a short-range finally path wrapper to the finally exit node `exit`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`](crate::Error::Malformed) if `exit` or any node
    /// referenced by the wrapper does not name a node of this graph.
    pub fn add_short_range_path(&mut self, exit: DirectNodeId, path: FinallyPath) -> Result<()> {
        self.check_id(exit)?;
        self.check_path(&path)?;
        self.short_paths.entry(exit).or_default().push(path);
        Ok(())
    }

    /// Attaches a long-range finally path wrapper to the finally exit node `exit`.
    ///
    /// Long-range wrappers describe paths that leave the finally towards a distant
    /// destination (a `return` or an outer `break`), and are consulted when path
    /// classification recurses through nested finally blocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`](crate::Error::Malformed) if `exit` or any node
    /// referenced by the wrapper does not name a node of this graph.
    pub fn add_long_range_path(&mut self, exit: DirectNodeId, path: FinallyPath) -> Result<()> {
        self.check_id(exit)?;
        self.check_path(&path)?;
        self.long_paths.entry(exit).or_default().push(path);
        Ok(())
    }

    /// Marks the exception continuation of a monitor-guarded finally exit.
    ///
    /// When set for `exit`, every path out of `exit` other than the one reaching
    /// `destination` is an exception monitor path and sees only the true-classified
    /// source state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`](crate::Error::Malformed) if either handle does not
    /// name a node of this graph.
    pub fn set_monitor_exit(&mut self, exit: DirectNodeId, destination: DirectNodeId) -> Result<()> {
        self.check_id(exit)?;
        self.check_id(destination)?;
        self.monitor_exits.insert(exit, destination);
        Ok(())
    }

    /// Seeds an extra entry-state variable for `node`.
    ///
    /// Used for catch-block parameters and `foreach` loop variables, which are defined
    /// by the runtime rather than by a statement the analysis can observe. Each seeded
    /// variable receives a fresh version in the node's entry state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`](crate::Error::Malformed) if `node` does not name a
    /// node of this graph.
    pub fn add_seed_var(&mut self, node: DirectNodeId, var: VarId) -> Result<()> {
        self.check_id(node)?;
        self.seed_vars.entry(node).or_default().push(var);
        Ok(())
    }

    /// Returns the entry node of the graph, if any node has been added.
    #[must_use]
    pub fn entry(&self) -> Option<DirectNodeId> {
        self.nodes.first().map(DirectNode::id)
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the node with the given handle, if it exists.
    #[must_use]
    pub fn node(&self, id: DirectNodeId) -> Option<&DirectNode> {
        self.nodes.get(id.index())
    }

    /// Returns mutable access to the node with the given handle, if it exists.
    pub fn node_mut(&mut self, id: DirectNodeId) -> Option<&mut DirectNode> {
        self.nodes.get_mut(id.index())
    }

    /// Returns the node handles in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = DirectNodeId> + '_ {
        self.nodes.iter().map(DirectNode::id)
    }

    /// Returns the nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &DirectNode> {
        self.nodes.iter()
    }

    /// Returns mutable access to the nodes in insertion order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut DirectNode> {
        self.nodes.iter_mut()
    }

    /// Returns the regular successors of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a node of this graph.
    #[must_use]
    pub fn successors(&self, id: DirectNodeId) -> &[DirectNodeId] {
        &self.succs[id.index()]
    }

    /// Returns the regular predecessors of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a node of this graph.
    #[must_use]
    pub fn predecessors(&self, id: DirectNodeId) -> &[DirectNodeId] {
        &self.preds[id.index()]
    }

    /// Returns the exception successors of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a node of this graph.
    #[must_use]
    pub fn exception_successors(&self, id: DirectNodeId) -> &[DirectNodeId] {
        &self.ex_succs[id.index()]
    }

    /// Returns the exception predecessors of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a node of this graph.
    #[must_use]
    pub fn exception_predecessors(&self, id: DirectNodeId) -> &[DirectNodeId] {
        &self.ex_preds[id.index()]
    }

    /// Returns the negative-branch successor of `node`, if one was recorded.
    #[must_use]
    pub fn negative_branch(&self, node: DirectNodeId) -> Option<DirectNodeId> {
        self.neg_branch.get(&node).copied()
    }

    /// Returns the short-range finally path wrappers attached to `node`.
    #[must_use]
    pub fn short_range_paths(&self, node: DirectNodeId) -> &[FinallyPath] {
        self.short_paths.get(&node).map_or(&[], Vec::as_slice)
    }

    /// Returns the long-range finally path wrappers attached to `node`.
    #[must_use]
    pub fn long_range_paths(&self, node: DirectNodeId) -> &[FinallyPath] {
        self.long_paths.get(&node).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if `node` is the exit of a replicated finally block.
    #[must_use]
    pub fn is_finally_exit(&self, node: DirectNodeId) -> bool {
        self.short_paths.contains_key(&node)
    }

    /// Returns the monitor exception exit marker of `node`, if one was recorded.
    #[must_use]
    pub fn monitor_exit(&self, node: DirectNodeId) -> Option<DirectNodeId> {
        self.monitor_exits.get(&node).copied()
    }

    /// Returns the extra seed variables per node, in node order.
    pub(crate) fn seeded_vars(&self) -> impl Iterator<Item = (DirectNodeId, &[VarId])> {
        self.seed_vars.iter().map(|(id, vars)| (*id, vars.as_slice()))
    }

    fn check_id(&self, id: DirectNodeId) -> Result<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(malformed_error!(
                "node handle {} references no node (graph has {} nodes)",
                id,
                self.nodes.len()
            ))
        }
    }

    fn check_path(&self, path: &FinallyPath) -> Result<()> {
        self.check_id(path.source())?;
        self.check_id(path.destination())?;
        self.check_id(path.entry())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn empty_node(graph: &mut DirectGraph) -> DirectNodeId {
        graph.add_node(NodeKind::Regular, Vec::new())
    }

    #[test]
    fn test_entry_is_first_node() {
        let mut graph = DirectGraph::new();
        assert_eq!(graph.entry(), None);
        let a = empty_node(&mut graph);
        let _b = empty_node(&mut graph);
        assert_eq!(graph.entry(), Some(a));
    }

    #[test]
    fn test_add_edge_updates_both_directions() -> crate::Result<()> {
        let mut graph = DirectGraph::new();
        let a = empty_node(&mut graph);
        let b = empty_node(&mut graph);
        graph.add_edge(a, b)?;

        assert_eq!(graph.successors(a), &[b]);
        assert_eq!(graph.predecessors(b), &[a]);
        assert!(graph.successors(b).is_empty());

        // duplicate edges are ignored
        graph.add_edge(a, b)?;
        assert_eq!(graph.successors(a), &[b]);
        Ok(())
    }

    #[test]
    fn test_exception_edges_are_separate() -> crate::Result<()> {
        let mut graph = DirectGraph::new();
        let a = empty_node(&mut graph);
        let h = empty_node(&mut graph);
        graph.add_exception_edge(a, h)?;

        assert!(graph.successors(a).is_empty());
        assert_eq!(graph.exception_successors(a), &[h]);
        assert_eq!(graph.exception_predecessors(h), &[a]);
        Ok(())
    }

    #[test]
    fn test_unknown_handle_is_malformed() {
        let mut graph = DirectGraph::new();
        let a = empty_node(&mut graph);
        let bogus = DirectNodeId::new(7);

        let err = graph.add_edge(a, bogus).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));

        let err = graph.set_negative_branch(bogus, a).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_negative_branch_lookup() -> crate::Result<()> {
        let mut graph = DirectGraph::new();
        let cond = empty_node(&mut graph);
        let then = empty_node(&mut graph);
        let els = empty_node(&mut graph);
        graph.add_edge(cond, then)?;
        graph.add_edge(cond, els)?;
        graph.set_negative_branch(cond, els)?;

        assert_eq!(graph.negative_branch(cond), Some(els));
        assert_eq!(graph.negative_branch(then), None);
        Ok(())
    }

    #[test]
    fn test_finally_path_tables() -> crate::Result<()> {
        let mut graph = DirectGraph::new();
        let src = empty_node(&mut graph);
        let fin = empty_node(&mut graph);
        let dst = empty_node(&mut graph);
        let path = FinallyPath::new(src, dst, fin);

        assert!(!graph.is_finally_exit(fin));
        graph.add_short_range_path(fin, path)?;
        assert!(graph.is_finally_exit(fin));
        assert_eq!(graph.short_range_paths(fin), &[path]);
        assert!(graph.long_range_paths(fin).is_empty());

        graph.add_long_range_path(fin, path)?;
        assert_eq!(graph.long_range_paths(fin), &[path]);
        Ok(())
    }

    #[test]
    fn test_monitor_exit_marker() -> crate::Result<()> {
        let mut graph = DirectGraph::new();
        let fin = empty_node(&mut graph);
        let rethrow = empty_node(&mut graph);
        graph.set_monitor_exit(fin, rethrow)?;

        assert_eq!(graph.monitor_exit(fin), Some(rethrow));
        assert_eq!(graph.monitor_exit(rethrow), None);
        Ok(())
    }

    #[test]
    fn test_seed_vars_in_node_order() -> crate::Result<()> {
        let mut graph = DirectGraph::new();
        let a = empty_node(&mut graph);
        let b = empty_node(&mut graph);
        graph.add_seed_var(b, VarId::new(4))?;
        graph.add_seed_var(a, VarId::new(2))?;

        let seeded: Vec<_> = graph.seeded_vars().collect();
        assert_eq!(seeded, vec![(a, &[VarId::new(2)][..]), (b, &[VarId::new(4)][..])]);
        Ok(())
    }
}
