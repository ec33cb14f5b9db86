// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # ssaflow
//!
//! [![Crates.io](https://img.shields.io/crates/v/ssaflow.svg)](https://crates.io/crates/ssaflow)
//! [![Documentation](https://docs.rs/ssaflow/badge.svg)](https://docs.rs/ssaflow)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/ssaflow/blob/main/LICENSE-APACHE)
//!
//! SSA variable splitting for bytecode decompilation, built in pure Rust. `ssaflow`
//! takes the flattened control flow graph of one decompiled method and rewrites every
//! variable occurrence into a `(variable, version)` pair by fixed-point dataflow
//! iteration, producing the phi table and def-use graph that later decompilation
//! stages (type inference, variable merging, effectively-final analysis) consume.
//!
//! ## Features
//!
//! - **🔁 Fixed-point construction** - Worklist iteration over regular and exception
//!   edges, tolerant of irreducible control flow
//! - **🧵 Finally-aware propagation** - Path-sensitive filtering at replicated
//!   `finally` exits keeps versions of unrelated protected ranges apart
//! - **🔀 Expression-level splits** - Short-circuit booleans, ternaries and pattern
//!   `instanceof` fork the dataflow state inside a single statement
//! - **📈 Def-use graph** - Version-level dataflow edges with dominators, phantom
//!   increment tracking and optional liveness snapshots
//! - **🧹 Version flattening** - Post-pass turning multi-version variables back into
//!   distinct plain variables
//!
//! ## Quick Start
//!
//! Add `ssaflow` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! ssaflow = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use ssaflow::prelude::*;
//!
//! // x = const; if (..) { x = const; } use(x)
//! let x = VarId::new(0);
//! let mut graph = DirectGraph::new();
//! let head = graph.add_node(NodeKind::Regular, vec![Expr::assign_local(x, Expr::Const)]);
//! let then = graph.add_node(NodeKind::Regular, vec![Expr::assign_local(x, Expr::Const)]);
//! let join = graph.add_node(NodeKind::Regular, vec![Expr::local(x)]);
//! graph.add_edge(head, then)?;
//! graph.add_edge(head, join)?;
//! graph.add_edge(then, join)?;
//!
//! let method = MethodDescriptor::new(false, &[]);
//! let form = SsaConstructor::new(SsaOptions::empty()).split_variables(&mut graph, &method)?;
//!
//! // the two reaching definitions meet in a single phi
//! assert_eq!(form.phi().len(), 1);
//! # Ok::<(), ssaflow::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `ssaflow` is organized into a small set of modules:
//!
//! - [`prelude`] - Convenient re-exports of the commonly used types
//! - [`cfg`] - The direct control flow graph model: nodes, edges, finally paths
//! - [`expr`] - The flattened expression statements the analysis walks
//! - [`method`] - Method signature descriptors seeding the entry state
//! - [`ssa`] - The construction engine, phi table, def-use graph and flattening
//! - [`Error`] and [`Result`] - Error handling
//!
//! The analysis is strictly per method: one [`SsaConstructor`] is created per run and
//! consumed by it, so independent methods can be processed on independent threads
//! without shared state.

#[macro_use]
pub(crate) mod error;

pub mod cfg;
pub mod expr;
pub mod method;
pub mod prelude;
pub mod ssa;

pub use crate::cfg::{DirectGraph, DirectNode, DirectNodeId, FinallyPath, NodeKind};
pub use crate::error::Error;
pub use crate::expr::{Expr, FieldAccess, FieldSiteId, FunctionKind, InstructionId, VarAccess};
pub use crate::method::MethodDescriptor;
pub use crate::ssa::{
    flatten_versions, FlattenResult, PhiTable, SsaConstructor, SsaForm, SsaOptions, VarId,
    VarMapHolder, VarVersion, VersionEdgeKind, VersionGraph, VersionMap, VersionSet,
    STACK_SLOT_BASE,
};

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
