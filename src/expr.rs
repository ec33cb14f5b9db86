//! Expression statements of the flattened intermediate representation.
//!
//! The SSA pass operates on a closed set of expression kinds: constants, variable
//! occurrences, assignments, a small family of composite functions (short-circuit
//! booleans, ternary, pattern `instanceof`, increment/decrement, everything else),
//! field accesses, invocations and allocations. [`Expr`] models this set as an enum
//! so the per-kind dataflow rules can be matched exhaustively; adding a kind forces
//! every rule site to be revisited.

use std::fmt;

use strum::{EnumCount, EnumIter};

use crate::ssa::VarId;

/// Identifier of a bytecode-level instruction backing a variable occurrence.
///
/// Carried through the analysis untouched; the flattening post-pass reports, for every
/// occurrence it rewrites, which instruction now refers to which fresh variable index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstructionId(pub(crate) usize);

impl InstructionId {
    /// Creates a new instruction identifier from a raw value.
    #[must_use]
    #[inline]
    pub const fn new(value: usize) -> Self {
        InstructionId(value)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    #[inline]
    pub const fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// Identifier of a physical field-access expression site.
///
/// Each distinct field access in the source tree gets its own site id from the upstream
/// tree builder. The SSA pass allocates one synthetic field pseudo-variable per site,
/// reported back through [`SsaForm::field_vars`](crate::ssa::SsaForm::field_vars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldSiteId(pub(crate) usize);

impl FieldSiteId {
    /// Creates a new field site identifier from a raw value.
    #[must_use]
    #[inline]
    pub const fn new(value: usize) -> Self {
        FieldSiteId(value)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    #[inline]
    pub const fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for FieldSiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// One occurrence of a variable in the tree.
///
/// `version` starts at 0 ("no version assigned") and is written by the SSA pass; the
/// flattening post-pass later rewrites `var` and resets `version` to 1 for occurrences
/// of multi-version variables. `origin` optionally ties the occurrence to the bytecode
/// instruction it was decompiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarAccess {
    /// The variable this occurrence refers to.
    pub var: VarId,
    /// The SSA version of this occurrence; 0 until assigned by the analysis.
    pub version: u32,
    /// The bytecode instruction backing this occurrence, if known.
    pub origin: Option<InstructionId>,
}

impl VarAccess {
    /// Creates an unversioned occurrence of `var`.
    #[must_use]
    pub const fn new(var: VarId) -> Self {
        Self {
            var,
            version: 0,
            origin: None,
        }
    }

    /// Creates an unversioned occurrence of `var` backed by the given instruction.
    #[must_use]
    pub const fn with_origin(var: VarId, origin: InstructionId) -> Self {
        Self {
            var,
            version: 0,
            origin: Some(origin),
        }
    }
}

impl fmt::Display for VarAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.var, self.version)
    }
}

/// A field access expression.
///
/// The SSA pass does not model fields as real variables; it allocates one pseudo
/// variable per `site` and uses it as a "clean since last dirtying event" marker.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccess {
    /// The physical expression site of this access.
    pub site: FieldSiteId,
    /// The instance expression the field is read from, if the field is not static.
    pub instance: Option<Box<Expr>>,
}

impl FieldAccess {
    /// Creates a static field access for the given site.
    #[must_use]
    pub const fn without_instance(site: FieldSiteId) -> Self {
        Self {
            site,
            instance: None,
        }
    }
}

/// The kind of a composite function expression.
///
/// Only the kinds with dedicated dataflow rules are distinguished; every remaining
/// operator falls under [`Other`](Self::Other), whose operands are simply processed
/// left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum FunctionKind {
    /// Short-circuit boolean and (`&&`): the right operand executes on the true path only.
    BoolAnd,
    /// Short-circuit boolean or (`||`): the right operand executes on the false path only.
    BoolOr,
    /// Ternary conditional (`?:`): operands are condition, then-branch, else-branch.
    Ternary,
    /// `instanceof`, optionally binding a pattern variable on the true path.
    InstanceOf,
    /// Pre-increment (`++x`): a combined read and write of the operand.
    PreIncrement,
    /// Pre-decrement (`--x`).
    PreDecrement,
    /// Post-increment (`x++`).
    PostIncrement,
    /// Post-decrement (`x--`).
    PostDecrement,
    /// Any other operator without dedicated dataflow behavior.
    Other,
}

impl FunctionKind {
    /// Returns `true` for the four increment/decrement kinds.
    #[must_use]
    pub const fn is_increment(&self) -> bool {
        matches!(
            self,
            Self::PreIncrement | Self::PreDecrement | Self::PostIncrement | Self::PostDecrement
        )
    }
}

/// An expression statement of the flattened tree.
///
/// This is the closed set of shapes the dataflow processor understands. Structure
/// irrelevant to variable versioning (operator identity, constant values, call targets)
/// is deliberately erased; the upstream tree keeps it and only mirrors the versioning
/// relevant skeleton into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant or any other leaf without dataflow effect.
    Const,
    /// A variable occurrence (read position).
    Var(VarAccess),
    /// An assignment; `dest` is either a [`Expr::Var`] or a [`Expr::Field`].
    Assignment {
        /// The assignment target.
        dest: Box<Expr>,
        /// The assigned value.
        src: Box<Expr>,
    },
    /// A composite function expression.
    Function {
        /// The function kind selecting the dataflow rule.
        kind: FunctionKind,
        /// The ordered operands.
        operands: Vec<Expr>,
    },
    /// A field access (read position).
    Field(FieldAccess),
    /// A method invocation; any invocation may dirty field state.
    Invocation {
        /// The ordered argument expressions, including the receiver if present.
        args: Vec<Expr>,
    },
    /// An object or primitive-array allocation.
    New {
        /// `true` for primitive allocations, which cannot run field-dirtying code.
        primitive: bool,
        /// The ordered constructor arguments or array dimensions.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Creates an unversioned occurrence of a local variable.
    #[must_use]
    pub const fn local(var: VarId) -> Self {
        Expr::Var(VarAccess::new(var))
    }

    /// Creates an assignment of `src` to the local variable `var`.
    #[must_use]
    pub fn assign_local(var: VarId, src: Expr) -> Self {
        Expr::Assignment {
            dest: Box::new(Expr::local(var)),
            src: Box::new(src),
        }
    }

    /// Creates a composite function expression.
    #[must_use]
    pub fn function(kind: FunctionKind, operands: Vec<Expr>) -> Self {
        Expr::Function { kind, operands }
    }

    /// Visits every variable occurrence in this expression, in evaluation order,
    /// with mutable access.
    ///
    /// Used by the flattening post-pass to rewrite occurrences, and by tests to
    /// inspect the versions the analysis assigned.
    pub fn for_each_var_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut VarAccess),
    {
        match self {
            Expr::Const => {}
            Expr::Var(access) => f(access),
            Expr::Assignment { dest, src } => {
                src.for_each_var_mut(f);
                dest.for_each_var_mut(f);
            }
            Expr::Function { operands, .. } => {
                for op in operands {
                    op.for_each_var_mut(f);
                }
            }
            Expr::Field(field) => {
                if let Some(instance) = &mut field.instance {
                    instance.for_each_var_mut(f);
                }
            }
            Expr::Invocation { args } | Expr::New { args, .. } => {
                for arg in args {
                    arg.for_each_var_mut(f);
                }
            }
        }
    }

    /// Visits every variable occurrence in this expression, in evaluation order.
    pub fn for_each_var<F>(&self, f: &mut F)
    where
        F: FnMut(&VarAccess),
    {
        match self {
            Expr::Const => {}
            Expr::Var(access) => f(access),
            Expr::Assignment { dest, src } => {
                src.for_each_var(f);
                dest.for_each_var(f);
            }
            Expr::Function { operands, .. } => {
                for op in operands {
                    op.for_each_var(f);
                }
            }
            Expr::Field(field) => {
                if let Some(instance) = &field.instance {
                    instance.for_each_var(f);
                }
            }
            Expr::Invocation { args } | Expr::New { args, .. } => {
                for arg in args {
                    arg.for_each_var(f);
                }
            }
        }
    }
}
