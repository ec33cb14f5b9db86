//! Variable identity and SSA version pairs.

use std::fmt;

/// First variable index reserved for evaluation-stack slots.
///
/// Local-variable slots live below this value, stack slots at or above it. The
/// flattening post-pass never renames stack slots, and exception entry states drop
/// them wholesale (a handler cannot trust partially evaluated stack state).
pub const STACK_SLOT_BASE: i32 = 10_000;

/// A strongly-typed variable index.
///
/// Three disjoint ranges share the index space:
///
/// - non-negative indices below [`STACK_SLOT_BASE`] are real local-variable slots,
/// - indices at or above [`STACK_SLOT_BASE`] are evaluation-stack slots,
/// - negative indices are synthetic field pseudo-variables allocated by the analysis,
///   one per distinct field-access site.
///
/// # Examples
///
/// ```rust
/// use ssaflow::{VarId, STACK_SLOT_BASE};
///
/// assert!(VarId::new(3).is_local());
/// assert!(VarId::new(STACK_SLOT_BASE + 1).is_stack_slot());
/// assert!(VarId::new(-1).is_field());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub(crate) i32);

impl VarId {
    /// Creates a new `VarId` from a raw index value.
    #[must_use]
    #[inline]
    pub const fn new(index: i32) -> Self {
        VarId(index)
    }

    /// Returns the raw index value.
    #[must_use]
    #[inline]
    pub const fn index(self) -> i32 {
        self.0
    }

    /// Returns `true` if this is an evaluation-stack slot.
    #[must_use]
    #[inline]
    pub const fn is_stack_slot(self) -> bool {
        self.0 >= STACK_SLOT_BASE
    }

    /// Returns `true` if this is a synthetic field pseudo-variable.
    #[must_use]
    #[inline]
    pub const fn is_field(self) -> bool {
        self.0 < 0
    }

    /// Returns `true` if this is a real local-variable slot.
    #[must_use]
    #[inline]
    pub const fn is_local(self) -> bool {
        self.0 >= 0 && self.0 < STACK_SLOT_BASE
    }
}

impl fmt::Debug for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarId({})", self.0)
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<i32> for VarId {
    #[inline]
    fn from(index: i32) -> Self {
        VarId(index)
    }
}

impl From<VarId> for i32 {
    #[inline]
    fn from(var: VarId) -> Self {
        var.0
    }
}

/// The atomic SSA value identity: a variable paired with one of its versions.
///
/// Version 0 is reserved and means "no definition observed". Equality is structural
/// and the pair is immutable once created; it is the node type of the
/// [`VersionGraph`](crate::ssa::VersionGraph) and the key type of the
/// [`PhiTable`](crate::ssa::PhiTable).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarVersion {
    /// The variable index.
    pub var: VarId,
    /// The version, positive for observed definitions.
    pub version: u32,
}

impl VarVersion {
    /// Creates a new version pair.
    #[must_use]
    #[inline]
    pub const fn new(var: VarId, version: u32) -> Self {
        Self { var, version }
    }
}

impl fmt::Debug for VarVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarVersion({}, {})", self.var.0, self.version)
    }
}

impl fmt::Display for VarVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.var, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_var_id_ranges() {
        assert!(VarId::new(0).is_local());
        assert!(VarId::new(STACK_SLOT_BASE - 1).is_local());
        assert!(!VarId::new(STACK_SLOT_BASE - 1).is_stack_slot());
        assert!(VarId::new(STACK_SLOT_BASE).is_stack_slot());
        assert!(VarId::new(-1).is_field());
        assert!(!VarId::new(-1).is_local());
    }

    #[test]
    fn test_var_id_ordering_and_conversions() {
        let mut vars = vec![VarId::new(5), VarId::new(-2), VarId::new(0)];
        vars.sort();
        assert_eq!(vars, vec![VarId::new(-2), VarId::new(0), VarId::new(5)]);

        let var: VarId = 7i32.into();
        assert_eq!(i32::from(var), 7);
    }

    #[test]
    fn test_var_id_formats() {
        assert_eq!(format!("{:?}", VarId::new(4)), "VarId(4)");
        assert_eq!(format!("{}", VarId::new(-3)), "v-3");
    }

    #[test]
    fn test_var_version_identity() {
        let a = VarVersion::new(VarId::new(1), 2);
        let b = VarVersion::new(VarId::new(1), 2);
        let c = VarVersion::new(VarId::new(1), 3);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        set.insert(c);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_var_version_formats() {
        let vv = VarVersion::new(VarId::new(5), 2);
        assert_eq!(format!("{vv}"), "v5_2");
        assert_eq!(format!("{vv:?}"), "VarVersion(5, 2)");
    }
}
