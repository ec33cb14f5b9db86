//! Flattening of SSA versions back into plain variable indices.
//!
//! Once versioned occurrences have served their purpose, downstream passes want
//! ordinary variables again: every `(variable, version)` pair with a version greater
//! than one becomes a brand-new variable index, and all surviving occurrences are
//! reset to version one. Stack-slot and field pseudo-variables are left untouched.

use std::collections::HashMap;

use crate::{
    cfg::DirectGraph,
    expr::InstructionId,
    ssa::{VarId, VarVersion},
};

/// The renaming produced by [`flatten_versions`].
#[derive(Debug, Clone, Default)]
pub struct FlattenResult {
    versions: HashMap<VarVersion, VarId>,
    instructions: HashMap<InstructionId, VarId>,
}

impl FlattenResult {
    /// Returns the new variable index assigned to each renamed `(variable, version)` pair.
    #[must_use]
    pub const fn versions(&self) -> &HashMap<VarVersion, VarId> {
        &self.versions
    }

    /// Returns the new variable index per originating instruction, for occurrences
    /// that carried an origin.
    #[must_use]
    pub const fn instructions(&self) -> &HashMap<InstructionId, VarId> {
        &self.instructions
    }
}

/// Rewrites all versioned occurrences in `dgraph` into distinct plain variables.
///
/// Occurrences of version one keep their variable index; every higher version gets a
/// fresh index above the current maximum local index, allocated once per
/// `(variable, version)` pair so occurrences of the same version stay unified. All
/// rewritten occurrences end up at version one, which makes the pass idempotent.
///
/// Stack-slot variables and field pseudo-variables are not renamed.
pub fn flatten_versions(dgraph: &mut DirectGraph) -> FlattenResult {
    let mut max_index: i32 = -1;
    for node in dgraph.nodes() {
        for stmt in node.statements() {
            stmt.for_each_var(&mut |access| {
                if access.var.is_local() {
                    max_index = max_index.max(access.var.index());
                }
            });
        }
    }

    let mut next_index = max_index + 1;
    let mut result = FlattenResult::default();

    for node in dgraph.nodes_mut() {
        for stmt in node.statements_mut() {
            stmt.for_each_var_mut(&mut |access| {
                if !access.var.is_local() || access.version <= 1 {
                    return;
                }
                let key = VarVersion::new(access.var, access.version);
                let new_var = *result.versions.entry(key).or_insert_with(|| {
                    let var = VarId::new(next_index);
                    next_index += 1;
                    var
                });
                if let Some(origin) = access.origin {
                    result.instructions.insert(origin, new_var);
                }
                access.var = new_var;
                access.version = 1;
            });
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::NodeKind;
    use crate::expr::{Expr, VarAccess};
    use crate::ssa::STACK_SLOT_BASE;

    fn occurrence(var: i32, version: u32) -> Expr {
        let mut access = VarAccess::new(VarId::new(var));
        access.version = version;
        Expr::Var(access)
    }

    fn collect(graph: &DirectGraph) -> Vec<(i32, u32)> {
        let mut out = Vec::new();
        for node in graph.nodes() {
            for stmt in node.statements() {
                stmt.for_each_var(&mut |access| out.push((access.var.index(), access.version)));
            }
        }
        out
    }

    #[test]
    fn test_version_one_keeps_index() {
        let mut graph = DirectGraph::new();
        graph.add_node(NodeKind::Regular, vec![occurrence(0, 1), occurrence(1, 1)]);

        let result = flatten_versions(&mut graph);
        assert!(result.versions().is_empty());
        assert_eq!(collect(&graph), vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn test_higher_versions_get_fresh_indices() {
        let mut graph = DirectGraph::new();
        graph.add_node(
            NodeKind::Regular,
            vec![
                occurrence(0, 1),
                occurrence(0, 2),
                occurrence(0, 2),
                occurrence(0, 3),
            ],
        );

        let result = flatten_versions(&mut graph);
        // same version unifies, distinct versions diverge
        assert_eq!(collect(&graph), vec![(0, 1), (1, 1), (1, 1), (2, 1)]);
        assert_eq!(result.versions().len(), 2);
        assert_eq!(
            result.versions().get(&VarVersion::new(VarId::new(0), 2)),
            Some(&VarId::new(1))
        );
    }

    #[test]
    fn test_fresh_indices_start_above_maximum() {
        let mut graph = DirectGraph::new();
        graph.add_node(
            NodeKind::Regular,
            vec![occurrence(7, 1), occurrence(0, 2)],
        );

        flatten_versions(&mut graph);
        assert_eq!(collect(&graph), vec![(7, 1), (8, 1)]);
    }

    #[test]
    fn test_stack_and_field_vars_untouched() {
        let mut graph = DirectGraph::new();
        graph.add_node(
            NodeKind::Regular,
            vec![occurrence(STACK_SLOT_BASE, 4), occurrence(-1, 4)],
        );

        let result = flatten_versions(&mut graph);
        assert!(result.versions().is_empty());
        assert_eq!(collect(&graph), vec![(STACK_SLOT_BASE, 4), (-1, 4)]);
    }

    #[test]
    fn test_origin_instructions_are_recorded() {
        let mut graph = DirectGraph::new();
        let mut access = VarAccess::with_origin(VarId::new(0), InstructionId::new(17));
        access.version = 2;
        graph.add_node(NodeKind::Regular, vec![Expr::Var(access)]);

        let result = flatten_versions(&mut graph);
        assert_eq!(
            result.instructions().get(&InstructionId::new(17)),
            Some(&VarId::new(1))
        );
    }

    #[test]
    fn test_flattening_is_idempotent() {
        let mut graph = DirectGraph::new();
        graph.add_node(
            NodeKind::Regular,
            vec![occurrence(0, 1), occurrence(0, 2), occurrence(1, 3)],
        );

        flatten_versions(&mut graph);
        let first = collect(&graph);
        let second_run = flatten_versions(&mut graph);

        assert!(second_run.versions().is_empty());
        assert_eq!(collect(&graph), first);
    }
}
