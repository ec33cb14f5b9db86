//! # ssaflow Prelude
//!
//! This module provides a convenient prelude for the most commonly used types of the
//! ssaflow library. Import this module to get quick access to everything needed to
//! build a direct graph and run SSA construction over it.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all ssaflow operations
pub use crate::Error;

/// The result type used throughout ssaflow
pub use crate::Result;

// ================================================================================================
// Graph Model
// ================================================================================================

/// The flattened control flow graph and its building blocks
pub use crate::cfg::{DirectGraph, DirectNode, DirectNodeId, FinallyPath, NodeKind};

/// The expression statements of the flattened representation
pub use crate::expr::{Expr, FieldAccess, FieldSiteId, FunctionKind, InstructionId, VarAccess};

/// Method signature descriptors seeding the entry state
pub use crate::method::MethodDescriptor;

// ================================================================================================
// SSA Construction
// ================================================================================================

/// The construction engine and its result
pub use crate::ssa::{SsaConstructor, SsaForm, SsaOptions};

/// Variable identity and version pairs
pub use crate::ssa::{VarId, VarVersion, STACK_SLOT_BASE};

/// The dataflow state types
pub use crate::ssa::{VarMapHolder, VersionMap, VersionSet};

/// The analysis outputs consumed by later decompilation stages
pub use crate::ssa::{PhiTable, VersionEdgeKind, VersionGraph};

/// The version flattening post-pass
pub use crate::ssa::{flatten_versions, FlattenResult};
