//! Method metadata used to seed the SSA entry state.

use crate::ssa::VarId;

/// Signature metadata of the method under analysis.
///
/// The analysis only needs to know which local-variable slots are occupied by
/// parameters on entry: each of those receives version 1 before the fixed-point
/// iteration starts. Wide parameters (`long`/`double` in the source bytecode)
/// occupy two slots; only the first slot carries the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Whether an implicit receiver occupies slot 0.
    has_this: bool,
    /// Slot width (1 or 2) of each declared parameter, in declaration order.
    param_widths: Vec<u8>,
}

impl MethodDescriptor {
    /// Creates a descriptor from the receiver flag and the parameter slot widths.
    ///
    /// # Arguments
    ///
    /// * `has_this` - `true` if an implicit receiver occupies slot 0
    /// * `param_widths` - slot width (1 or 2) per declared parameter, in order
    #[must_use]
    pub fn new(has_this: bool, param_widths: &[u8]) -> Self {
        Self {
            has_this,
            param_widths: param_widths.to_vec(),
        }
    }

    /// Returns `true` if an implicit receiver occupies slot 0.
    #[must_use]
    pub const fn has_this(&self) -> bool {
        self.has_this
    }

    /// Returns the number of declared parameters.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.param_widths.len()
    }

    /// Returns the variable slots holding defined values on method entry.
    ///
    /// Slot 0 is the receiver when present; each parameter then occupies the next
    /// slot, skipping the second half of wide parameters.
    #[must_use]
    pub fn entry_vars(&self) -> Vec<VarId> {
        let mut vars = Vec::with_capacity(self.param_widths.len() + 1);
        let mut slot: i32 = 0;
        if self.has_this {
            vars.push(VarId::new(0));
            slot = 1;
        }
        for &width in &self.param_widths {
            vars.push(VarId::new(slot));
            slot += i32::from(width.max(1));
        }
        vars
    }
}
