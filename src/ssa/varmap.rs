//! Version-set-per-variable maps, the lattice values of the fixed-point iteration.
//!
//! A [`VersionMap`] records, per variable, the set of candidate versions reachable at
//! one program point. Maps support the algebra the analysis needs: union at control
//! flow merges, intersection and complement inside the finally-path filter, and bulk
//! removal of stack slots and field pseudo-variables at exception and block borders.
//!
//! All binary operations mutate only the receiver and take their argument by shared
//! reference.

use std::collections::BTreeMap;
use std::fmt;

use crate::ssa::VarId;

/// A small sorted set of versions of one variable.
///
/// Version sets are tiny in practice (one element until a merge point is reached),
/// so they are stored as a sorted vector rather than a bit or hash set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSet(Vec<u32>);

impl VersionSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        VersionSet(Vec::new())
    }

    /// Creates a set holding a single version.
    #[must_use]
    pub fn singleton(version: u32) -> Self {
        VersionSet(vec![version])
    }

    /// Returns the number of versions in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if `version` is in the set.
    #[must_use]
    pub fn contains(&self, version: u32) -> bool {
        self.0.binary_search(&version).is_ok()
    }

    /// Inserts `version` into the set; duplicates are ignored.
    pub fn insert(&mut self, version: u32) {
        if let Err(pos) = self.0.binary_search(&version) {
            self.0.insert(pos, version);
        }
    }

    /// Removes `version` from the set if present.
    pub fn remove(&mut self, version: u32) {
        if let Ok(pos) = self.0.binary_search(&version) {
            self.0.remove(pos);
        }
    }

    /// Adds every version of `other` to this set.
    pub fn union_with(&mut self, other: &VersionSet) {
        for &v in &other.0 {
            self.insert(v);
        }
    }

    /// Keeps only the versions also present in `other`.
    pub fn intersect_with(&mut self, other: &VersionSet) {
        self.0.retain(|v| other.contains(*v));
    }

    /// Removes every version present in `other`.
    pub fn complement_with(&mut self, other: &VersionSet) {
        self.0.retain(|v| !other.contains(*v));
    }

    /// Returns the versions in ascending order.
    #[must_use]
    pub fn versions(&self) -> &[u32] {
        &self.0
    }

    /// Iterates the versions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<u32> for VersionSet {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        let mut set = VersionSet::new();
        for v in iter {
            set.insert(v);
        }
        set
    }
}

impl fmt::Display for VersionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "}}")
    }
}

/// An ordered map from variable to the set of its candidate versions.
///
/// Invariant: an empty set is never stored. Absence of a key means "no information",
/// not "empty set"; every mutating operation drops entries that become empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionMap {
    entries: BTreeMap<VarId, VersionSet>,
}

impl VersionMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of variables with recorded versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the version set of `var`, if any versions are recorded.
    #[must_use]
    pub fn get(&self, var: VarId) -> Option<&VersionSet> {
        self.entries.get(&var)
    }

    /// Returns `true` if `version` is recorded for `var`.
    #[must_use]
    pub fn contains_version(&self, var: VarId, version: u32) -> bool {
        self.entries.get(&var).is_some_and(|s| s.contains(version))
    }

    /// Replaces the versions of `var` with the single `version`.
    ///
    /// This is the write operation of the analysis: after a definition, exactly one
    /// version of the variable is current.
    pub fn set_current(&mut self, var: VarId, version: u32) {
        self.entries.insert(var, VersionSet::singleton(version));
    }

    /// Adds `version` to the versions of `var`.
    pub fn insert_version(&mut self, var: VarId, version: u32) {
        self.entries.entry(var).or_default().insert(version);
    }

    /// Removes every version of `var`.
    pub fn remove(&mut self, var: VarId) {
        self.entries.remove(&var);
    }

    /// Adds every version of `other`, per variable.
    ///
    /// This is *set* union, not overwrite: at a control flow merge all candidates must
    /// survive until a phi commits to a merged version.
    pub fn union(&mut self, other: &VersionMap) {
        for (var, set) in &other.entries {
            self.entries.entry(*var).or_default().union_with(set);
        }
    }

    /// Keeps only the variables and versions also present in `other`.
    pub fn intersect(&mut self, other: &VersionMap) {
        self.entries.retain(|var, set| {
            match other.entries.get(var) {
                Some(other_set) => {
                    set.intersect_with(other_set);
                    !set.is_empty()
                }
                None => false,
            }
        });
    }

    /// Removes every version present in `other`, per variable.
    ///
    /// Computes "the part of this map not coming from the paths summarized by `other`".
    pub fn complement(&mut self, other: &VersionMap) {
        self.entries.retain(|var, set| {
            if let Some(other_set) = other.entries.get(var) {
                set.complement_with(other_set);
            }
            !set.is_empty()
        });
    }

    /// Removes every evaluation-stack slot entry.
    pub fn remove_stack_slots(&mut self) {
        self.entries.retain(|var, _| !var.is_stack_slot());
    }

    /// Removes every field pseudo-variable entry.
    pub fn remove_field_vars(&mut self) {
        self.entries.retain(|var, _| !var.is_field());
    }

    /// Iterates the entries in ascending variable order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &VersionSet)> {
        self.entries.iter().map(|(var, set)| (*var, set))
    }
}

impl fmt::Display for VersionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (var, set)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{var}:{set}")?;
        }
        write!(f, "]")
    }
}
