//! Path-sensitive filtering of out-states at replicated `finally` exits.
//!
//! After flattening, a `finally` block exists once but is entered from several
//! protected ranges, and its exit node fans out to the continuation of every one of
//! them. Propagating the raw out-state of such an exit would leak versions between
//! ranges that never execute together. The filter reconstructs, per outgoing edge,
//! which entry paths can actually reach that edge and intersects the exit state down
//! to the versions those paths produce.

use crate::{
    cfg::{DirectGraph, DirectNodeId},
    ssa::{SsaConstructor, VersionMap},
    Result,
};

/// Recursion bound for chains of nested `finally` exits.
const MAX_FINALLY_DEPTH: usize = 32;

impl SsaConstructor {
    /// Returns the out-state `pred` contributes along its edge to `node`.
    ///
    /// For an ordinary predecessor this is the recorded out-state (the negative-branch
    /// state when `node` is the negative successor). For a `finally` exit the state is
    /// filtered: entry paths whose continuation is `node` (or, through a long-range
    /// path, `dest`) are classified as true paths, all others as false paths, and the
    /// raw out-state is reduced to the versions reachable on true paths.
    ///
    /// `dest` is the node the top-level propagation targets; it stays fixed through
    /// recursive calls so long-range paths of inner exits are resolved against the
    /// outermost continuation.
    pub(super) fn filtered_out_map(
        &self,
        dgraph: &DirectGraph,
        node: DirectNodeId,
        pred: DirectNodeId,
        dest: DirectNodeId,
        depth: usize,
    ) -> Result<VersionMap> {
        if depth > MAX_FINALLY_DEPTH {
            return Err(malformed_error!(
                "finally exit chain deeper than {} at {}",
                MAX_FINALLY_DEPTH,
                pred
            ));
        }

        let raw = self.out_map_for_edge(dgraph, node, pred);
        if !dgraph.is_finally_exit(pred) {
            return Ok(raw);
        }

        let long_paths = dgraph.long_range_paths(pred);
        let mut map_true_source = VersionMap::new();
        let mut map_new_temp = raw.clone();

        for wrapper in dgraph.short_range_paths(pred) {
            let source_map = if dgraph.is_finally_exit(wrapper.source()) {
                self.filtered_out_map(dgraph, wrapper.entry(), wrapper.source(), dest, depth + 1)?
            } else {
                self.out_maps
                    .get(&wrapper.source())
                    .cloned()
                    .unwrap_or_default()
            };

            let is_true_path = wrapper.destination() == node
                || long_paths
                    .iter()
                    .any(|lw| lw.source() == wrapper.source() && lw.destination() == dest);
            if is_true_path {
                map_true_source.union(&source_map);
            } else {
                // versions produced only on paths that exit elsewhere
                map_new_temp.complement(&source_map);
            }
        }

        // a monitor-exit successor sees only what entered through true paths
        if dgraph.monitor_exit(pred).is_some_and(|m| m != node) {
            return Ok(map_true_source);
        }

        let mut merged = map_new_temp;
        merged.union(&map_true_source);
        if let Some(in_map) = self.in_maps.get(&node) {
            merged.union(in_map);
        }

        let mut result = raw;
        result.intersect(&merged);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::cfg::{DirectGraph, FinallyPath, NodeKind};
    use crate::expr::Expr;
    use crate::method::MethodDescriptor;
    use crate::ssa::{SsaConstructor, SsaOptions, VarId};
    use crate::Result;

    fn versions_of(
        graph: &DirectGraph,
        node: crate::cfg::DirectNodeId,
        var: VarId,
    ) -> Vec<u32> {
        let mut versions = Vec::new();
        for stmt in graph.node(node).unwrap().statements() {
            stmt.for_each_var(&mut |access| {
                if access.var == var {
                    versions.push(access.version);
                }
            });
        }
        versions
    }

    /// Two protected ranges funnel through one replicated finally exit; each
    /// continuation must only see the versions written on its own entry path.
    #[test]
    fn test_finally_exit_separates_entry_paths() -> Result<()> {
        let x = VarId::new(0);
        let y = VarId::new(1);

        let mut graph = DirectGraph::new();
        // normal path defines x, exceptional path defines y
        let start = graph.add_node(NodeKind::Regular, vec![]);
        let normal = graph.add_node(NodeKind::Regular, vec![Expr::assign_local(x, Expr::Const)]);
        let thrown = graph.add_node(NodeKind::Regular, vec![Expr::assign_local(y, Expr::Const)]);
        let finally = graph.add_node(NodeKind::Regular, vec![]);
        let cont = graph.add_node(NodeKind::Regular, vec![Expr::local(x)]);
        let rethrow = graph.add_node(NodeKind::Regular, vec![Expr::local(y)]);

        graph.add_edge(start, normal)?;
        graph.add_edge(start, thrown)?;
        graph.add_edge(normal, finally)?;
        graph.add_edge(thrown, finally)?;
        graph.add_edge(finally, cont)?;
        graph.add_edge(finally, rethrow)?;
        graph.add_short_range_path(finally, FinallyPath::new(normal, cont, finally))?;
        graph.add_short_range_path(finally, FinallyPath::new(thrown, rethrow, finally))?;

        let method = MethodDescriptor::new(false, &[]);
        SsaConstructor::new(SsaOptions::empty()).split_variables(&mut graph, &method)?;

        // each continuation read resolves to the single version of its own path,
        // without a spurious merge
        let x_at_cont = versions_of(&graph, cont, x);
        let y_at_rethrow = versions_of(&graph, rethrow, y);
        assert_eq!(x_at_cont, versions_of(&graph, normal, x));
        assert_eq!(y_at_rethrow, versions_of(&graph, thrown, y));
        Ok(())
    }

    /// A `return` routed through a finally block records a long-range path: the
    /// short wrapper ends at the generic continuation, and only the long wrapper
    /// names the return target. The return node must still resolve against the
    /// state of the returning entry path.
    #[test]
    fn test_long_range_path_resolves_return_continuation() -> Result<()> {
        let x = VarId::new(0);
        let y = VarId::new(1);

        let mut graph = DirectGraph::new();
        let start = graph.add_node(NodeKind::Regular, vec![]);
        let returning = graph.add_node(NodeKind::Regular, vec![Expr::assign_local(x, Expr::Const)]);
        let falling = graph.add_node(NodeKind::Regular, vec![Expr::assign_local(y, Expr::Const)]);
        let finally = graph.add_node(NodeKind::Regular, vec![]);
        let cont = graph.add_node(NodeKind::Regular, vec![]);
        let ret = graph.add_node(NodeKind::Regular, vec![Expr::local(x), Expr::local(y)]);

        graph.add_edge(start, returning)?;
        graph.add_edge(start, falling)?;
        graph.add_edge(returning, finally)?;
        graph.add_edge(falling, finally)?;
        graph.add_edge(finally, cont)?;
        graph.add_edge(finally, ret)?;
        graph.add_short_range_path(finally, FinallyPath::new(returning, cont, finally))?;
        graph.add_short_range_path(finally, FinallyPath::new(falling, cont, finally))?;
        graph.add_long_range_path(finally, FinallyPath::new(returning, ret, finally))?;

        let method = MethodDescriptor::new(false, &[]);
        SsaConstructor::new(SsaOptions::empty()).split_variables(&mut graph, &method)?;

        // x flows from the returning path; y was written on the other entry path
        // only and must not leak into the return node
        let at_ret = versions_of(&graph, ret, x);
        assert_eq!(at_ret, versions_of(&graph, returning, x));
        assert_ne!(versions_of(&graph, ret, y), versions_of(&graph, falling, y));
        Ok(())
    }

    /// An exit registered as a monitor exit contributes nothing of its raw state to
    /// other successors, only the true-path entry state.
    #[test]
    fn test_monitor_exit_restricts_other_successors() -> Result<()> {
        let x = VarId::new(0);

        let mut graph = DirectGraph::new();
        let enter = graph.add_node(NodeKind::Regular, vec![Expr::assign_local(x, Expr::Const)]);
        let exit = graph.add_node(NodeKind::Regular, vec![]);
        let unlock = graph.add_node(NodeKind::Regular, vec![]);
        let other = graph.add_node(NodeKind::Regular, vec![Expr::local(x)]);

        graph.add_edge(enter, exit)?;
        graph.add_edge(exit, unlock)?;
        graph.add_edge(exit, other)?;
        graph.add_short_range_path(exit, FinallyPath::new(enter, unlock, exit))?;
        graph.set_monitor_exit(exit, unlock)?;

        let method = MethodDescriptor::new(false, &[]);
        SsaConstructor::new(SsaOptions::empty()).split_variables(&mut graph, &method)?;

        // the read at `other` cannot resolve against the exit state, so it becomes
        // its own definition rather than reusing the version written before the exit
        assert_ne!(versions_of(&graph, other, x), versions_of(&graph, enter, x));
        Ok(())
    }
}
