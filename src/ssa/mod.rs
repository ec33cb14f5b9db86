//! SSA construction over the flattened control flow graph.
//!
//! The entry point is [`SsaConstructor::split_variables`], which rewrites every
//! variable occurrence of a [`DirectGraph`](crate::cfg::DirectGraph) into a
//! `(variable, version)` pair by fixed-point dataflow iteration, producing a phi
//! table and a def-use [`VersionGraph`] on the side. [`flatten_versions`] is the
//! optional post-pass turning versioned occurrences back into plain variables.
//!
//! The submodules split along data-structure lines:
//!
//! - `version` - variable identity and version pairs
//! - `varmap` - version sets and the per-point version maps
//! - `holder` - the normal/split state holder of the expression walk
//! - `phi` - the merge-point table
//! - `graph` - the def-use graph, dominators and liveness snapshots
//! - `config` - the [`SsaOptions`] feature flags
//! - `engine` - the fixed-point driver and expression rules
//! - `reassign` - version flattening

mod config;
mod engine;
mod finallypath;
mod graph;
mod holder;
mod phi;
mod reassign;
mod varmap;
mod version;

pub use config::SsaOptions;
pub use engine::{SsaConstructor, SsaForm};
pub use graph::{VersionEdgeKind, VersionGraph};
pub use holder::VarMapHolder;
pub use phi::PhiTable;
pub use reassign::{flatten_versions, FlattenResult};
pub use varmap::{VersionMap, VersionSet};
pub use version::{VarId, VarVersion, STACK_SLOT_BASE};
