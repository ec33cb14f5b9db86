//! The fixed-point SSA construction engine.
//!
//! [`SsaConstructor`] drives a worklist iteration over the direct graph: each visit
//! recomputes a node's entry state from the (finally-filtered) out-states of its
//! predecessors, runs the per-expression dataflow rules over the node's statements,
//! and requeues the successors whenever the recorded out-state changed. Version sets
//! only grow within one pass, so the iteration terminates; a visit budget guards
//! against map-merge bugs.
//!
//! The versioning rules live here as well: definitions allocate fresh versions,
//! reads with one candidate reuse or promote it, reads with several candidates
//! commit a phi, short-circuit and ternary operators fork the state into true/false
//! maps, increment operators synthesize phantom versions, and field pseudo-variables
//! approximate field freshness between dirtying events.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    cfg::{DirectGraph, DirectNodeId},
    expr::{Expr, FieldSiteId, FunctionKind, VarAccess},
    method::MethodDescriptor,
    ssa::{
        PhiTable, SsaOptions, VarId, VarMapHolder, VarVersion, VersionEdgeKind, VersionGraph,
        VersionMap, VersionSet,
    },
    Error, Result,
};

/// Visit budget per node before the iteration is declared divergent.
const MAX_VISITS_PER_NODE: usize = 128;

/// Lower bound of the total visit budget, so tiny graphs still get slack.
const MIN_VISIT_BUDGET: usize = 1024;

/// The result of one SSA construction run.
///
/// Everything downstream consumers need: the phi table, the def-use graph (with
/// liveness snapshots when [`SsaOptions::LIVENESS`] was set), the field
/// pseudo-variable allocation, and the direct-assignment map used by
/// effectively-final analysis. The versions themselves were written into the
/// variable occurrences of the analyzed graph.
#[derive(Debug)]
pub struct SsaForm {
    phi: PhiTable,
    graph: VersionGraph,
    field_vars: HashMap<FieldSiteId, VarId>,
    assignments: HashMap<VarVersion, VarVersion>,
}

impl SsaForm {
    /// Returns the phi table.
    #[must_use]
    pub const fn phi(&self) -> &PhiTable {
        &self.phi
    }

    /// Returns the def-use version graph.
    #[must_use]
    pub const fn graph(&self) -> &VersionGraph {
        &self.graph
    }

    /// Returns mutable access to the def-use version graph.
    pub fn graph_mut(&mut self) -> &mut VersionGraph {
        &mut self.graph
    }

    /// Returns the field pseudo-variable allocated per field-access site.
    #[must_use]
    pub const fn field_vars(&self) -> &HashMap<FieldSiteId, VarId> {
        &self.field_vars
    }

    /// Returns the direct-assignment map (destination version to source version).
    #[must_use]
    pub const fn assignments(&self) -> &HashMap<VarVersion, VarVersion> {
        &self.assignments
    }
}

/// The per-method SSA construction engine.
///
/// One constructor analyzes one method and is consumed by
/// [`split_variables`](Self::split_variables); concurrent method analyses use fully
/// independent instances. All counters and scratch maps are owned by the instance,
/// nothing is retained between runs.
///
/// # Examples
///
/// ```rust
/// use ssaflow::{
///     DirectGraph, Expr, MethodDescriptor, NodeKind, SsaConstructor, SsaOptions, VarId,
/// };
///
/// let mut graph = DirectGraph::new();
/// let a = graph.add_node(NodeKind::Regular, vec![
///     Expr::assign_local(VarId::new(0), Expr::Const),
///     Expr::local(VarId::new(0)),
/// ]);
/// # let _ = a;
/// let method = MethodDescriptor::new(false, &[]);
///
/// let form = SsaConstructor::new(SsaOptions::empty()).split_variables(&mut graph, &method)?;
/// assert!(form.phi().is_empty());
/// # Ok::<(), ssaflow::Error>(())
/// ```
#[derive(Debug)]
pub struct SsaConstructor {
    options: SsaOptions,
    /// Last allocated version per variable.
    last_version: HashMap<VarId, u32>,
    /// Entry state per node, as recorded by the latest visit.
    pub(super) in_maps: HashMap<DirectNodeId, VersionMap>,
    /// Out state per node.
    pub(super) out_maps: HashMap<DirectNodeId, VersionMap>,
    /// Out state of the negative branch, for nodes ending in a conditional.
    pub(super) out_neg_maps: HashMap<DirectNodeId, VersionMap>,
    /// Exception-visible state per node with exception successors.
    catchable_maps: HashMap<DirectNodeId, VersionMap>,
    /// Pre-seeded extra entry state (parameters, catch variables, foreach variables).
    extra_maps: HashMap<DirectNodeId, VersionMap>,
    phi: PhiTable,
    graph: VersionGraph,
    field_vars: HashMap<FieldSiteId, VarId>,
    /// Next synthetic field pseudo-variable index, counting downwards from -1.
    next_field_index: i32,
    assignments: HashMap<VarVersion, VarVersion>,
    /// Phantom post-operation version per `(variable, read version)` pair.
    inc_phantoms: HashMap<VarVersion, u32>,
    /// All synthesized post-operation versions, protected from phi-source removal.
    phantom_versions: HashSet<VarVersion>,
    /// Temporary bridge version per `(phi, source version)` pair.
    phi_temps: HashMap<(VarVersion, u32), u32>,
    /// Set during the second pass: snapshot liveness maps at each read.
    calc_live: bool,
}

impl SsaConstructor {
    /// Creates an engine with the given options.
    #[must_use]
    pub fn new(options: SsaOptions) -> Self {
        Self {
            options,
            last_version: HashMap::new(),
            in_maps: HashMap::new(),
            out_maps: HashMap::new(),
            out_neg_maps: HashMap::new(),
            catchable_maps: HashMap::new(),
            extra_maps: HashMap::new(),
            phi: PhiTable::new(),
            graph: VersionGraph::new(),
            field_vars: HashMap::new(),
            next_field_index: -1,
            assignments: HashMap::new(),
            inc_phantoms: HashMap::new(),
            phantom_versions: HashSet::new(),
            phi_temps: HashMap::new(),
            calc_live: false,
        }
    }

    /// Runs SSA construction over `dgraph`, writing versions into its variable
    /// occurrences, and returns the produced [`SsaForm`].
    ///
    /// The entry node is seeded with version 1 for every parameter slot of `method`;
    /// extra seed variables registered on the graph (catch parameters, `foreach`
    /// variables) receive fresh versions at their nodes. The fixed-point loop then
    /// runs to stability, followed by the optional liveness pass when
    /// [`SsaOptions::LIVENESS`] is set.
    ///
    /// # Arguments
    ///
    /// * `dgraph` - The flattened control flow graph; statements are mutated in place
    /// * `method` - The method signature seeding the entry state
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the graph is empty or internally inconsistent,
    /// and [`Error::FixpointDiverged`] if the iteration exceeds its visit budget.
    ///
    /// # Panics
    ///
    /// Panics if the liveness pass settles on a different fixed point than the main
    /// pass; that indicates a bug in the map algebra, and continuing would hand
    /// corrupted SSA form to downstream passes.
    pub fn split_variables(
        mut self,
        dgraph: &mut DirectGraph,
        method: &MethodDescriptor,
    ) -> Result<SsaForm> {
        if dgraph.node_count() == 0 {
            return Err(malformed_error!("graph has no nodes"));
        }

        self.seed_entry_state(dgraph, method);
        self.fixpoint(dgraph, false)?;

        if self.options.contains(SsaOptions::LIVENESS) {
            self.graph.init_dominators();
            let stabilized = self.out_maps.clone();
            self.calc_live = true;
            self.fixpoint(dgraph, true)?;
            assert!(
                stabilized == self.out_maps,
                "liveness pass settled on a different fixed point than the main pass"
            );
        }

        Ok(SsaForm {
            phi: self.phi,
            graph: self.graph,
            field_vars: self.field_vars,
            assignments: self.assignments,
        })
    }

    fn seed_entry_state(&mut self, dgraph: &DirectGraph, method: &MethodDescriptor) {
        let entry = dgraph.entry().expect("graph checked non-empty");
        let mut entry_map = VersionMap::new();
        for var in method.entry_vars() {
            let version = self.next_version(var);
            entry_map.set_current(var, version);
            self.graph.add_node(VarVersion::new(var, version));
        }
        self.extra_maps.insert(entry, entry_map);

        let seeds: Vec<(DirectNodeId, Vec<VarId>)> = dgraph
            .seeded_vars()
            .map(|(node, vars)| (node, vars.to_vec()))
            .collect();
        for (node, vars) in seeds {
            let mut map = self.extra_maps.remove(&node).unwrap_or_default();
            for var in vars {
                let version = self.next_version(var);
                map.set_current(var, version);
                self.graph.add_node(VarVersion::new(var, version));
            }
            self.extra_maps.insert(node, map);
        }
    }

    fn fixpoint(&mut self, dgraph: &mut DirectGraph, seed_all: bool) -> Result<()> {
        let node_count = dgraph.node_count();
        let limit = node_count
            .saturating_mul(MAX_VISITS_PER_NODE)
            .max(MIN_VISIT_BUDGET);

        let mut worklist: VecDeque<DirectNodeId> = VecDeque::new();
        let mut queued = vec![false; node_count];
        if seed_all {
            for id in dgraph.node_ids() {
                queued[id.index()] = true;
            }
            worklist.extend(dgraph.node_ids());
        } else if let Some(entry) = dgraph.entry() {
            queued[entry.index()] = true;
            worklist.push_back(entry);
        }

        let mut visits = 0usize;
        while let Some(node) = worklist.pop_front() {
            queued[node.index()] = false;
            visits += 1;
            if visits > limit {
                return Err(Error::FixpointDiverged { visits, limit });
            }

            if self.process_node(dgraph, node)? {
                let mut affected: Vec<DirectNodeId> = Vec::new();
                affected.extend_from_slice(dgraph.successors(node));
                affected.extend_from_slice(dgraph.exception_successors(node));
                for succ in affected {
                    if !queued[succ.index()] {
                        queued[succ.index()] = true;
                        worklist.push_back(succ);
                    }
                }
            }
        }
        Ok(())
    }

    fn process_node(&mut self, dgraph: &mut DirectGraph, node: DirectNodeId) -> Result<bool> {
        // entry state: finally-filtered regular predecessors, catchable state of
        // exception predecessors, plus any pre-seeded extra state
        let mut in_map = VersionMap::new();
        for pred in dgraph.predecessors(node).to_vec() {
            if self.out_maps.contains_key(&pred) {
                let filtered = self.filtered_out_map(dgraph, node, pred, node, 0)?;
                in_map.union(&filtered);
            }
        }
        for pred in dgraph.exception_predecessors(node) {
            if let Some(catchable) = self.catchable_maps.get(pred) {
                in_map.union(catchable);
            }
        }
        if let Some(extra) = self.extra_maps.get(&node) {
            in_map.union(extra);
        }

        let mut changed = false;
        if !dgraph.exception_successors(node).is_empty() {
            let mut catchable = in_map.clone();
            catchable.remove_stack_slots();
            catchable.remove_field_vars();
            if self.catchable_maps.get(&node) != Some(&catchable) {
                self.catchable_maps.insert(node, catchable);
                changed = true;
            }
        }

        self.in_maps.insert(node, in_map.clone());

        let mut holder = VarMapHolder::normal(in_map);
        {
            let statements = dgraph
                .node_mut(node)
                .expect("node handle validated at insertion")
                .statements_mut();
            let count = statements.len();
            for (i, stmt) in statements.iter_mut().enumerate() {
                self.process_expr(stmt, &mut holder)?;
                if i + 1 < count {
                    holder.to_normal();
                }
            }
        }

        let (mut out, mut out_neg) = if dgraph.negative_branch(node).is_some() {
            let (if_true, if_false) = holder.into_split();
            (if_true, Some(if_false))
        } else {
            (holder.into_normal(), None)
        };

        // field state does not cross block borders at control flow splits and merges
        let successors = dgraph.successors(node);
        let border = successors.len() > 1
            || (successors.len() == 1 && dgraph.predecessors(successors[0]).len() > 1);
        if border {
            out.remove_field_vars();
            if let Some(neg) = &mut out_neg {
                neg.remove_field_vars();
            }
        }

        if self.out_maps.get(&node) != Some(&out) {
            self.out_maps.insert(node, out);
            changed = true;
        }
        if let Some(neg) = out_neg {
            if self.out_neg_maps.get(&node) != Some(&neg) {
                self.out_neg_maps.insert(node, neg);
                changed = true;
            }
        }
        Ok(changed)
    }

    fn process_expr(&mut self, expr: &mut Expr, holder: &mut VarMapHolder) -> Result<()> {
        match expr {
            Expr::Const => Ok(()),
            Expr::Var(access) => {
                holder.to_normal();
                self.process_var_read(access, holder.map_mut());
                Ok(())
            }
            Expr::Assignment { dest, src } => self.process_assignment(dest, src, holder),
            Expr::Function { kind, operands } => match *kind {
                FunctionKind::BoolAnd => self.process_bool_and(operands, holder),
                FunctionKind::BoolOr => self.process_bool_or(operands, holder),
                FunctionKind::Ternary => self.process_ternary(operands, holder),
                FunctionKind::InstanceOf => self.process_instance_of(operands, holder),
                kind if kind.is_increment() => self.process_increment(operands, holder),
                _ => {
                    for op in operands {
                        self.process_expr(op, holder)?;
                        holder.to_normal();
                    }
                    Ok(())
                }
            },
            Expr::Field(field) => {
                if let Some(instance) = &mut field.instance {
                    self.process_expr(instance, holder)?;
                }
                holder.to_normal();
                self.process_field_read(field.site, holder.map_mut());
                Ok(())
            }
            Expr::Invocation { args } => {
                for arg in args {
                    self.process_expr(arg, holder)?;
                    holder.to_normal();
                }
                self.clear_field_state(holder);
                Ok(())
            }
            Expr::New { primitive, args } => {
                let primitive = *primitive;
                for arg in args {
                    self.process_expr(arg, holder)?;
                    holder.to_normal();
                }
                if !primitive {
                    self.clear_field_state(holder);
                }
                Ok(())
            }
        }
    }

    fn process_assignment(
        &mut self,
        dest: &mut Expr,
        src: &mut Expr,
        holder: &mut VarMapHolder,
    ) -> Result<()> {
        match dest {
            Expr::Var(access) => {
                self.process_expr(src, holder)?;
                holder.to_normal();

                let var = access.var;
                let version = if access.version != 0 {
                    access.version
                } else {
                    self.next_version(var)
                };
                access.version = version;
                let dest_vv = VarVersion::new(var, version);
                self.graph.add_node(dest_vv);
                holder.map_mut().set_current(var, version);
                if self.calc_live {
                    self.graph.set_live(dest_vv, holder.map().clone());
                }

                if let Expr::Var(src_access) = src {
                    let src_vv = VarVersion::new(src_access.var, src_access.version);
                    self.assignments.insert(dest_vv, src_vv);
                    self.graph.add_edge(src_vv, dest_vv, VersionEdgeKind::General);
                }
                Ok(())
            }
            Expr::Field(field) => {
                if let Some(instance) = &mut field.instance {
                    self.process_expr(instance, holder)?;
                }
                self.process_expr(src, holder)?;
                // writing any field invalidates all cached field reads
                self.clear_field_state(holder);
                Ok(())
            }
            other => Err(malformed_error!(
                "unsupported assignment target {:?}",
                other
            )),
        }
    }

    fn process_bool_and(&mut self, operands: &mut [Expr], holder: &mut VarMapHolder) -> Result<()> {
        let (first, rest) = operands
            .split_first_mut()
            .ok_or_else(|| malformed_error!("short-circuit operator without operands"))?;
        self.process_expr(first, holder)?;
        for rhs in rest {
            holder.make_split();
            let short_circuit_false = holder.if_false().clone();

            // the right operand only executes when the left was true
            let mut rhs_holder = VarMapHolder::normal(holder.if_true().clone());
            self.process_expr(rhs, &mut rhs_holder)?;

            let (if_true, mut if_false) = rhs_holder.into_split();
            if_false.union(&short_circuit_false);
            *holder = VarMapHolder::Split { if_true, if_false };
        }
        Ok(())
    }

    fn process_bool_or(&mut self, operands: &mut [Expr], holder: &mut VarMapHolder) -> Result<()> {
        let (first, rest) = operands
            .split_first_mut()
            .ok_or_else(|| malformed_error!("short-circuit operator without operands"))?;
        self.process_expr(first, holder)?;
        for rhs in rest {
            holder.make_split();
            let short_circuit_true = holder.if_true().clone();

            // the right operand only executes when the left was false
            let mut rhs_holder = VarMapHolder::normal(holder.if_false().clone());
            self.process_expr(rhs, &mut rhs_holder)?;

            let (mut if_true, if_false) = rhs_holder.into_split();
            if_true.union(&short_circuit_true);
            *holder = VarMapHolder::Split { if_true, if_false };
        }
        Ok(())
    }

    fn process_ternary(&mut self, operands: &mut [Expr], holder: &mut VarMapHolder) -> Result<()> {
        let [condition, then_branch, else_branch] = operands else {
            return Err(malformed_error!(
                "ternary requires three operands, got {}",
                operands.len()
            ));
        };
        self.process_expr(condition, holder)?;
        holder.make_split();

        let mut then_holder = VarMapHolder::normal(holder.if_true().clone());
        self.process_expr(then_branch, &mut then_holder)?;
        let mut else_holder = VarMapHolder::normal(holder.if_false().clone());
        self.process_expr(else_branch, &mut else_holder)?;

        if then_holder.is_split() || else_holder.is_split() {
            let (then_true, then_false) = then_holder.into_split();
            let (else_true, else_false) = else_holder.into_split();
            let mut if_true = then_true;
            if_true.union(&else_true);
            let mut if_false = then_false;
            if_false.union(&else_false);
            *holder = VarMapHolder::Split { if_true, if_false };
        } else {
            let mut map = then_holder.into_normal();
            map.union(&else_holder.into_normal());
            *holder = VarMapHolder::Normal(map);
        }
        Ok(())
    }

    fn process_instance_of(
        &mut self,
        operands: &mut [Expr],
        holder: &mut VarMapHolder,
    ) -> Result<()> {
        match operands {
            [subject] => self.process_expr(subject, holder),
            [subject, pattern] => {
                self.process_expr(subject, holder)?;
                holder.to_normal();
                holder.make_split();

                let Expr::Var(access) = pattern else {
                    return Err(malformed_error!(
                        "instanceof pattern binding must be a variable, got {:?}",
                        pattern
                    ));
                };
                // the binding exists on the true path only
                if let VarMapHolder::Split { if_true, .. } = holder {
                    self.process_var_read(access, if_true);
                }
                Ok(())
            }
            _ => Err(malformed_error!(
                "instanceof requires one or two operands, got {}",
                operands.len()
            )),
        }
    }

    fn process_increment(
        &mut self,
        operands: &mut [Expr],
        holder: &mut VarMapHolder,
    ) -> Result<()> {
        let [target] = operands else {
            return Err(malformed_error!(
                "increment requires one operand, got {}",
                operands.len()
            ));
        };
        match target {
            Expr::Var(access) => {
                holder.to_normal();
                self.process_var_read(access, holder.map_mut());

                let var = access.var;
                let pre = VarVersion::new(var, access.version);
                let post = match self.inc_phantoms.get(&pre) {
                    Some(&post) => post,
                    None => {
                        let post = self.next_version(var);
                        self.inc_phantoms.insert(pre, post);
                        post
                    }
                };
                let post_vv = VarVersion::new(var, post);
                if self.options.contains(SsaOptions::TRACK_PHANTOM_INCREMENTS) {
                    self.phantom_versions.insert(post_vv);
                    self.graph.add_edge(pre, post_vv, VersionEdgeKind::Phantom);
                } else {
                    self.graph.add_edge(pre, post_vv, VersionEdgeKind::General);
                }
                holder.map_mut().set_current(var, post);
                if self.calc_live {
                    self.graph.set_live(post_vv, holder.map().clone());
                }
                Ok(())
            }
            Expr::Field(field) => {
                if let Some(instance) = &mut field.instance {
                    self.process_expr(instance, holder)?;
                }
                self.clear_field_state(holder);
                Ok(())
            }
            other => {
                // array element or similar: no variable version involved
                self.process_expr(other, holder)?;
                self.clear_field_state(holder);
                Ok(())
            }
        }
    }

    fn process_var_read(&mut self, access: &mut VarAccess, map: &mut VersionMap) {
        let var = access.var;
        let candidates: Vec<u32> = map
            .get(var)
            .map(|set| set.versions().to_vec())
            .unwrap_or_default();

        match candidates.len() {
            // first observation on this path: the read is the definition, keeping
            // the version a previous pass already assigned to this occurrence
            0 => {
                let version = if access.version != 0 {
                    access.version
                } else {
                    self.next_version(var)
                };
                access.version = version;
                map.set_current(var, version);
                self.graph.add_node(VarVersion::new(var, version));
            }
            1 => {
                let current = candidates[0];
                if access.version == current {
                    map.set_current(var, current);
                } else {
                    // this occurrence committed a merge earlier but only one
                    // candidate survived: the merge point is gone
                    if access.version != 0
                        && self.phi.contains(VarVersion::new(var, access.version))
                    {
                        self.retire_phi(var, access.version);
                    }
                    if self.options.contains(SsaOptions::INCREMENT_ON_USAGE) && !var.is_field() {
                        let current_vv = VarVersion::new(var, current);
                        let reusable = access.version != 0
                            && self
                                .graph
                                .has_edge(current_vv, VarVersion::new(var, access.version));
                        let use_version = if reusable {
                            access.version
                        } else {
                            let version = self.next_version(var);
                            self.graph.add_edge(
                                current_vv,
                                VarVersion::new(var, version),
                                VersionEdgeKind::General,
                            );
                            version
                        };
                        access.version = use_version;
                        map.set_current(var, use_version);
                    } else {
                        access.version = current;
                        map.set_current(var, current);
                    }
                }
            }
            // a genuine merge point
            _ => {
                let candidate_set: VersionSet = candidates.iter().copied().collect();
                let phi_version =
                    if access.version != 0 && self.phi.contains(VarVersion::new(var, access.version)) {
                        access.version
                    } else {
                        self.next_version(var)
                    };
                self.update_phi_node(var, phi_version, &candidate_set);
                access.version = phi_version;
                map.set_current(var, phi_version);
            }
        }

        if self.calc_live {
            self.graph
                .set_live(VarVersion::new(access.var, access.version), map.clone());
        }
    }

    /// Idempotent phi maintenance: safe to call on every fixpoint revisit.
    fn update_phi_node(&mut self, var: VarId, phi_version: u32, candidates: &VersionSet) {
        let phi_vv = VarVersion::new(var, phi_version);
        if !self.phi.contains(phi_vv) && candidates.len() < 2 {
            return;
        }
        self.graph.add_node(phi_vv);

        let existing: Vec<u32> = self
            .phi
            .sources(phi_vv)
            .map(|set| set.versions().to_vec())
            .unwrap_or_default();
        for source in existing {
            if candidates.contains(source)
                || self.phantom_versions.contains(&VarVersion::new(var, source))
            {
                continue;
            }
            if let Some(temp) = self.phi_temps.remove(&(phi_vv, source)) {
                self.graph
                    .remove_edge(VarVersion::new(var, source), VarVersion::new(var, temp));
                self.graph.remove_edge(VarVersion::new(var, temp), phi_vv);
            }
            self.phi.remove_source(phi_vv, source);
        }

        for source in candidates.iter() {
            if source == phi_version {
                continue;
            }
            if self
                .phi
                .sources(phi_vv)
                .is_some_and(|set| set.contains(source))
            {
                continue;
            }
            // fresh temporary version bridging source -> phi
            let temp = self.next_version(var);
            self.phi_temps.insert((phi_vv, source), temp);
            self.graph.add_edge(
                VarVersion::new(var, source),
                VarVersion::new(var, temp),
                VersionEdgeKind::General,
            );
            self.graph
                .add_edge(VarVersion::new(var, temp), phi_vv, VersionEdgeKind::General);
            self.phi.add_source(phi_vv, source);
        }
    }

    /// Drops a merge point whose occurrence walked away from it, together with
    /// the bridge versions its sources reached it through.
    fn retire_phi(&mut self, var: VarId, version: u32) {
        let phi_vv = VarVersion::new(var, version);
        let Some(sources) = self.phi.remove(phi_vv) else {
            return;
        };
        for source in sources.iter() {
            if let Some(temp) = self.phi_temps.remove(&(phi_vv, source)) {
                self.graph
                    .remove_edge(VarVersion::new(var, source), VarVersion::new(var, temp));
                self.graph.remove_edge(VarVersion::new(var, temp), phi_vv);
            }
        }
    }

    fn process_field_read(&mut self, site: FieldSiteId, map: &mut VersionMap) {
        if !self.options.contains(SsaOptions::TRACK_FIELDS) {
            return;
        }
        let var = match self.field_vars.get(&site) {
            Some(&var) => var,
            None => {
                let var = VarId::new(self.next_field_index);
                self.next_field_index -= 1;
                self.field_vars.insert(site, var);
                var
            }
        };
        // field pseudo-variables are never re-versioned
        map.set_current(var, 1);
        self.graph.add_node(VarVersion::new(var, 1));
    }

    fn clear_field_state(&self, holder: &mut VarMapHolder) {
        if !self.options.contains(SsaOptions::TRACK_FIELDS) {
            return;
        }
        match holder {
            VarMapHolder::Normal(map) => map.remove_field_vars(),
            VarMapHolder::Split { if_true, if_false } => {
                if_true.remove_field_vars();
                if_false.remove_field_vars();
            }
        }
    }

    pub(super) fn out_map_for_edge(
        &self,
        dgraph: &DirectGraph,
        node: DirectNodeId,
        pred: DirectNodeId,
    ) -> VersionMap {
        if dgraph.negative_branch(pred) == Some(node) {
            self.out_neg_maps.get(&pred).cloned().unwrap_or_default()
        } else {
            self.out_maps.get(&pred).cloned().unwrap_or_default()
        }
    }

    fn next_version(&mut self, var: VarId) -> u32 {
        let counter = self.last_version.entry(var).or_insert(0);
        *counter += 1;
        *counter
    }
}
