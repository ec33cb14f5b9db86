//! The direct control flow graph model.
//!
//! This module defines the input contract of the SSA construction pass: a flattened
//! graph of basic blocks ([`DirectNode`]) addressed by stable handles ([`DirectNodeId`]),
//! with regular and exception adjacency plus the path metadata needed to reason about
//! replicated `finally` blocks ([`FinallyPath`]).
//!
//! The graph is produced by an upstream statement-flattening step; this crate owns the
//! types so that the contract is checked at insertion time.

mod edge;
mod graph;
mod node;

pub use edge::FinallyPath;
pub use graph::DirectGraph;
pub use node::{DirectNode, DirectNodeId, NodeKind};
