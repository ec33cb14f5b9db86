//! The SSA def-use graph over version pairs.
//!
//! Nodes are [`VarVersion`]s; an edge connects a definition to a version it flows
//! into, including the temporary bridge versions inserted between a source and its
//! phi and the phantom versions synthesized for increment/decrement operators.
//! After the fixed-point loop has stabilized the graph supports an iterative
//! dominator computation, which gates the optional liveness pass that snapshots a
//! [`VersionMap`] onto each node.

use std::collections::{BTreeMap, BTreeSet};

use crate::ssa::{VarVersion, VersionMap};

/// The kind of a def-use edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionEdgeKind {
    /// An ordinary dataflow edge: assignment, use version, phi bridge.
    General,
    /// A phantom edge linking the read version of `++`/`--` to its synthesized
    /// post-operation version.
    Phantom,
}

#[derive(Debug, Clone, Default)]
struct NodeData {
    preds: Vec<(VarVersion, VersionEdgeKind)>,
    succs: Vec<(VarVersion, VersionEdgeKind)>,
    live: Option<VersionMap>,
}

/// The def-use graph produced by SSA construction.
///
/// Nodes and edges are added incrementally while the fixed-point loop runs; stale
/// phi bridges are removed again when a merge point loses a candidate. Iteration
/// order over nodes is ascending [`VarVersion`] order, keeping downstream passes
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct VersionGraph {
    nodes: BTreeMap<VarVersion, NodeData>,
    has_live: bool,
    dominators: Option<BTreeMap<VarVersion, BTreeSet<VarVersion>>>,
}

impl VersionGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.succs.len()).sum()
    }

    /// Returns `true` if `node` is in the graph.
    #[must_use]
    pub fn contains(&self, node: VarVersion) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Adds a node; adding an existing node is a no-op.
    pub fn add_node(&mut self, node: VarVersion) {
        self.nodes.entry(node).or_default();
    }

    /// Adds an edge from `src` to `dst`, creating missing nodes.
    ///
    /// A duplicate edge with the same kind is ignored.
    pub fn add_edge(&mut self, src: VarVersion, dst: VarVersion, kind: VersionEdgeKind) {
        self.add_node(src);
        self.add_node(dst);
        let src_data = self.nodes.get_mut(&src).expect("source node just added");
        if src_data.succs.contains(&(dst, kind)) {
            return;
        }
        src_data.succs.push((dst, kind));
        self.nodes
            .get_mut(&dst)
            .expect("target node just added")
            .preds
            .push((src, kind));
        self.dominators = None;
    }

    /// Removes the edge from `src` to `dst` regardless of kind, if present.
    pub fn remove_edge(&mut self, src: VarVersion, dst: VarVersion) {
        let mut removed = false;
        if let Some(src_data) = self.nodes.get_mut(&src) {
            let before = src_data.succs.len();
            src_data.succs.retain(|(t, _)| *t != dst);
            removed = src_data.succs.len() != before;
        }
        if let Some(dst_data) = self.nodes.get_mut(&dst) {
            dst_data.preds.retain(|(s, _)| *s != src);
        }
        if removed {
            self.dominators = None;
        }
    }

    /// Returns `true` if an edge from `src` to `dst` exists, regardless of kind.
    #[must_use]
    pub fn has_edge(&self, src: VarVersion, dst: VarVersion) -> bool {
        self.nodes
            .get(&src)
            .is_some_and(|n| n.succs.iter().any(|(t, _)| *t == dst))
    }

    /// Returns the predecessor edges of `node`, in insertion order.
    #[must_use]
    pub fn predecessors(&self, node: VarVersion) -> &[(VarVersion, VersionEdgeKind)] {
        self.nodes.get(&node).map_or(&[], |n| n.preds.as_slice())
    }

    /// Returns the successor edges of `node`, in insertion order.
    #[must_use]
    pub fn successors(&self, node: VarVersion) -> &[(VarVersion, VersionEdgeKind)] {
        self.nodes.get(&node).map_or(&[], |n| n.succs.as_slice())
    }

    /// Iterates the nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = VarVersion> + '_ {
        self.nodes.keys().copied()
    }

    /// Stores the liveness snapshot of `node`, creating the node if missing.
    ///
    /// The first snapshot taken for a node wins; the liveness pass re-runs the already
    /// stabilized fixpoint, so later visits would store the identical map.
    pub fn set_live(&mut self, node: VarVersion, map: VersionMap) {
        self.has_live = true;
        let data = self.nodes.entry(node).or_default();
        if data.live.is_none() {
            data.live = Some(map);
        }
    }

    /// Returns the liveness snapshot of `node`, if one was recorded for it.
    ///
    /// # Panics
    ///
    /// Panics if no liveness pass ever ran on this graph; querying liveness without
    /// having enabled it is a programming error, not an absent-data situation.
    #[must_use]
    pub fn live(&self, node: VarVersion) -> Option<&VersionMap> {
        assert!(
            self.has_live,
            "liveness snapshots were never computed for this graph"
        );
        self.nodes.get(&node).and_then(|n| n.live.as_ref())
    }

    /// Returns `true` if a liveness pass has stored snapshots on this graph.
    #[must_use]
    pub const fn has_liveness(&self) -> bool {
        self.has_live
    }

    /// Computes dominator sets over the current graph.
    ///
    /// Roots are the nodes without predecessors (entry definitions). The computation
    /// is the standard iterative one: the dominators of a node are the node itself
    /// plus the intersection of its predecessors' dominators, refined to a fixpoint.
    /// Any edge mutation invalidates the result.
    pub fn init_dominators(&mut self) {
        let order: Vec<VarVersion> = self.nodes.keys().copied().collect();

        // None means "all nodes", the top element of the lattice.
        let mut doms: BTreeMap<VarVersion, Option<BTreeSet<VarVersion>>> = BTreeMap::new();
        for &n in &order {
            if self.nodes[&n].preds.is_empty() {
                doms.insert(n, Some(BTreeSet::from([n])));
            } else {
                doms.insert(n, None);
            }
        }

        let mut changed = true;
        while changed {
            changed = false;
            for &n in &order {
                if self.nodes[&n].preds.is_empty() {
                    continue;
                }
                let mut new_set: Option<BTreeSet<VarVersion>> = None;
                for (p, _) in &self.nodes[&n].preds {
                    match &doms[p] {
                        None => {}
                        Some(pset) => {
                            new_set = Some(match new_set {
                                None => pset.clone(),
                                Some(cur) => cur.intersection(pset).copied().collect(),
                            });
                        }
                    }
                }
                let mut new_set = match new_set {
                    Some(s) => s,
                    // all predecessors still at top
                    None => continue,
                };
                new_set.insert(n);
                if doms[&n].as_ref() != Some(&new_set) {
                    doms.insert(n, Some(new_set));
                    changed = true;
                }
            }
        }

        self.dominators = Some(
            doms.into_iter()
                .map(|(n, set)| (n, set.unwrap_or_else(|| BTreeSet::from([n]))))
                .collect(),
        );
    }

    /// Returns `true` if dominator sets are available.
    #[must_use]
    pub const fn dominators_initialized(&self) -> bool {
        self.dominators.is_some()
    }

    /// Returns `true` if `a` dominates `b`.
    ///
    /// # Panics
    ///
    /// Panics if [`init_dominators`](Self::init_dominators) has not run since the last
    /// edge mutation.
    #[must_use]
    pub fn dominates(&self, a: VarVersion, b: VarVersion) -> bool {
        let doms = self
            .dominators
            .as_ref()
            .expect("dominators were not initialized");
        doms.get(&b).is_some_and(|set| set.contains(&a))
    }
}
