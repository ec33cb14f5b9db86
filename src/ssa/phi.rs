//! The phi table: merge points and the source versions they combine.
//!
//! The table is updated incrementally while the fixed-point loop runs; a merge point
//! may be revisited many times with growing or shrinking candidate sets, so entries
//! are widened and narrowed in place instead of being rebuilt.

use std::collections::BTreeMap;
use std::fmt;

use crate::ssa::{VarVersion, VersionSet};

/// Mapping from a merge-point version to the set of source versions it merges.
///
/// # Examples
///
/// ```rust
/// use ssaflow::{PhiTable, VarId, VarVersion};
///
/// let mut phi = PhiTable::new();
/// let merge = VarVersion::new(VarId::new(0), 3);
/// phi.add_source(merge, 1);
/// phi.add_source(merge, 2);
///
/// assert_eq!(phi.sources(merge).unwrap().versions(), &[1, 2]);
/// assert_eq!(format!("{phi}"), "v0_3 = phi(1,2)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhiTable {
    entries: BTreeMap<VarVersion, VersionSet>,
}

impl PhiTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no merge points are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of merge points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if `merge` is a recorded merge point.
    #[must_use]
    pub fn contains(&self, merge: VarVersion) -> bool {
        self.entries.contains_key(&merge)
    }

    /// Returns the source versions of `merge`, if it is a merge point.
    #[must_use]
    pub fn sources(&self, merge: VarVersion) -> Option<&VersionSet> {
        self.entries.get(&merge)
    }

    /// Adds `source` to the sources of `merge`, creating the entry if needed.
    pub fn add_source(&mut self, merge: VarVersion, source: u32) {
        self.entries.entry(merge).or_default().insert(source);
    }

    /// Removes `source` from the sources of `merge`.
    ///
    /// The entry stays registered even when its source set becomes empty: the merge
    /// point exists, the fixed-point loop just has not rediscovered its inputs yet.
    pub fn remove_source(&mut self, merge: VarVersion, source: u32) {
        if let Some(set) = self.entries.get_mut(&merge) {
            set.remove(source);
        }
    }

    /// Removes `merge` entirely, returning its sources if it was recorded.
    ///
    /// Used when a shrinking candidate set turns a former merge point back into a
    /// plain read: keeping the entry would leave a merge no occurrence references.
    pub fn remove(&mut self, merge: VarVersion) -> Option<VersionSet> {
        self.entries.remove(&merge)
    }

    /// Iterates the merge points in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (VarVersion, &VersionSet)> {
        self.entries.iter().map(|(merge, set)| (*merge, set))
    }
}

impl fmt::Display for PhiTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (merge, set)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{merge} = phi(")?;
            for (j, v) in set.iter().enumerate() {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{v}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssa::VarId;

    fn merge(var: i32, version: u32) -> VarVersion {
        VarVersion::new(VarId::new(var), version)
    }

    #[test]
    fn test_add_source_is_incremental() {
        let mut phi = PhiTable::new();
        phi.add_source(merge(0, 5), 1);
        phi.add_source(merge(0, 5), 2);
        phi.add_source(merge(0, 5), 1);

        assert_eq!(phi.len(), 1);
        assert_eq!(phi.sources(merge(0, 5)).unwrap().versions(), &[1, 2]);
    }

    #[test]
    fn test_remove_source_keeps_entry() {
        let mut phi = PhiTable::new();
        phi.add_source(merge(0, 5), 1);
        phi.remove_source(merge(0, 5), 1);

        assert!(phi.contains(merge(0, 5)));
        assert!(phi.sources(merge(0, 5)).unwrap().is_empty());
    }

    #[test]
    fn test_remove_drops_entry() {
        let mut phi = PhiTable::new();
        phi.add_source(merge(0, 5), 1);
        phi.add_source(merge(0, 5), 2);

        let sources = phi.remove(merge(0, 5)).unwrap();
        assert_eq!(sources.versions(), &[1, 2]);
        assert!(!phi.contains(merge(0, 5)));
        assert!(phi.remove(merge(0, 5)).is_none());
    }

    #[test]
    fn test_distinct_merge_points() {
        let mut phi = PhiTable::new();
        phi.add_source(merge(0, 5), 1);
        phi.add_source(merge(1, 5), 2);

        assert_eq!(phi.len(), 2);
        assert!(!phi.contains(merge(2, 5)));
    }

    #[test]
    fn test_display_lists_entries_in_order() {
        let mut phi = PhiTable::new();
        phi.add_source(merge(1, 4), 3);
        phi.add_source(merge(0, 3), 1);
        phi.add_source(merge(0, 3), 2);

        assert_eq!(format!("{phi}"), "v0_3 = phi(1,2)\nv1_4 = phi(3)");
    }
}
