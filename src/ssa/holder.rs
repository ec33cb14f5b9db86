//! The current-state holder of the expression processor.
//!
//! While walking one statement the processor carries either a single [`VersionMap`]
//! or, after a condition has been evaluated, an independent true/false pair. The two
//! representations are modelled as explicit variants so a holder can never alias the
//! same backing map from both sides of a split.

use crate::ssa::VersionMap;

/// The mutable dataflow state at one point inside a statement.
///
/// `Normal` carries one map; `Split` carries fully independent maps for the true and
/// false outcome of the most recent condition. Conversions always produce owned maps,
/// never shared ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarMapHolder {
    /// A single current map.
    Normal(VersionMap),
    /// Independent maps for the true and false paths.
    Split {
        /// The state on the true path.
        if_true: VersionMap,
        /// The state on the false path.
        if_false: VersionMap,
    },
}

impl VarMapHolder {
    /// Creates a holder in normal mode.
    #[must_use]
    pub const fn normal(map: VersionMap) -> Self {
        VarMapHolder::Normal(map)
    }

    /// Returns `true` if the holder is in split mode.
    #[must_use]
    pub const fn is_split(&self) -> bool {
        matches!(self, VarMapHolder::Split { .. })
    }

    /// Returns the single current map.
    ///
    /// # Panics
    ///
    /// Panics if the holder is in split mode; the caller must merge with
    /// [`to_normal`](Self::to_normal) first. Using the wrong representation here would
    /// silently produce unsound SSA form, so this is a hard programming error.
    #[must_use]
    pub fn map(&self) -> &VersionMap {
        match self {
            VarMapHolder::Normal(map) => map,
            VarMapHolder::Split { .. } => panic!("map holder is split, normal state required"),
        }
    }

    /// Returns mutable access to the single current map.
    ///
    /// # Panics
    ///
    /// Panics if the holder is in split mode, like [`map`](Self::map).
    pub fn map_mut(&mut self) -> &mut VersionMap {
        match self {
            VarMapHolder::Normal(map) => map,
            VarMapHolder::Split { .. } => panic!("map holder is split, normal state required"),
        }
    }

    /// Returns the map of the true path (the single map in normal mode).
    #[must_use]
    pub fn if_true(&self) -> &VersionMap {
        match self {
            VarMapHolder::Normal(map) => map,
            VarMapHolder::Split { if_true, .. } => if_true,
        }
    }

    /// Returns the map of the false path (the single map in normal mode).
    #[must_use]
    pub fn if_false(&self) -> &VersionMap {
        match self {
            VarMapHolder::Normal(map) => map,
            VarMapHolder::Split { if_false, .. } => if_false,
        }
    }

    /// Converts to split mode by cloning the single map into both paths.
    ///
    /// A holder already in split mode is left unchanged.
    pub fn make_split(&mut self) {
        if let VarMapHolder::Normal(map) = self {
            let if_false = map.clone();
            let if_true = std::mem::take(map);
            *self = VarMapHolder::Split { if_true, if_false };
        }
    }

    /// Converts to normal mode by unioning the false map into the true map.
    ///
    /// A holder already in normal mode is left unchanged.
    pub fn to_normal(&mut self) {
        if let VarMapHolder::Split { if_true, if_false } = self {
            if_true.union(if_false);
            let map = std::mem::take(if_true);
            *self = VarMapHolder::Normal(map);
        }
    }

    /// Consumes the holder, returning independent true and false maps.
    pub fn into_split(mut self) -> (VersionMap, VersionMap) {
        self.make_split();
        match self {
            VarMapHolder::Split { if_true, if_false } => (if_true, if_false),
            VarMapHolder::Normal(_) => unreachable!("holder was just split"),
        }
    }

    /// Consumes the holder, returning the merged single map.
    #[must_use]
    pub fn into_normal(mut self) -> VersionMap {
        self.to_normal();
        match self {
            VarMapHolder::Normal(map) => map,
            VarMapHolder::Split { .. } => unreachable!("holder was just normalized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssa::VarId;

    fn single(var: i32, version: u32) -> VersionMap {
        let mut m = VersionMap::new();
        m.set_current(VarId::new(var), version);
        m
    }

    #[test]
    fn test_normal_accessors() {
        let holder = VarMapHolder::normal(single(0, 1));
        assert!(!holder.is_split());
        assert_eq!(holder.map(), &single(0, 1));
        assert_eq!(holder.if_true(), &single(0, 1));
        assert_eq!(holder.if_false(), &single(0, 1));
    }

    #[test]
    fn test_make_split_produces_independent_maps() {
        let mut holder = VarMapHolder::normal(single(0, 1));
        holder.make_split();
        assert!(holder.is_split());

        if let VarMapHolder::Split { if_true, .. } = &mut holder {
            if_true.set_current(VarId::new(0), 2);
        }
        assert_eq!(holder.if_true(), &single(0, 2));
        assert_eq!(holder.if_false(), &single(0, 1));
    }

    #[test]
    fn test_to_normal_unions_both_paths() {
        let mut holder = VarMapHolder::Split {
            if_true: single(0, 1),
            if_false: single(0, 2),
        };
        holder.to_normal();

        assert!(!holder.is_split());
        assert_eq!(holder.map().get(VarId::new(0)).unwrap().versions(), &[1, 2]);
    }

    #[test]
    fn test_into_split_from_normal() {
        let (t, f) = VarMapHolder::normal(single(1, 3)).into_split();
        assert_eq!(t, f);
        assert_eq!(t, single(1, 3));
    }

    #[test]
    #[should_panic(expected = "normal state required")]
    fn test_map_panics_when_split() {
        let mut holder = VarMapHolder::normal(single(0, 1));
        holder.make_split();
        let _ = holder.map();
    }
}
