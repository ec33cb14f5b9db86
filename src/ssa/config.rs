//! Configuration flags of the SSA construction pass.

use bitflags::bitflags;

bitflags! {
    /// Feature flags of one analysis run.
    ///
    /// One immutable value is handed to [`SsaConstructor::new`](crate::ssa::SsaConstructor::new)
    /// and consulted wherever behavior is optional, instead of threading boolean
    /// parameters through every function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ssaflow::SsaOptions;
    ///
    /// let opts = SsaOptions::TRACK_FIELDS | SsaOptions::LIVENESS;
    /// assert!(opts.contains(SsaOptions::TRACK_FIELDS));
    /// assert!(!opts.contains(SsaOptions::INCREMENT_ON_USAGE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SsaOptions: u8 {
        /// Track field reads through synthetic pseudo-variables, conservatively
        /// invalidated by field assignments, calls and non-primitive allocations.
        const TRACK_FIELDS = 1;

        /// Give every single-candidate variable read its own use version, linked to
        /// the last write by a def-use edge, so liveness can tell reads apart from
        /// the write that produced them.
        const INCREMENT_ON_USAGE = 1 << 1;

        /// Synthesize phantom versions for `++`/`--`, one per `(variable, read
        /// version)` pair, connecting the read and the write through a phantom edge.
        const TRACK_PHANTOM_INCREMENTS = 1 << 2;

        /// After the fixpoint stabilizes, compute def-use dominators and re-run the
        /// iteration once more to snapshot liveness maps onto graph nodes.
        const LIVENESS = 1 << 3;

        /// Replace ambiguous exit versions at finally joins with dedicated phantom
        /// versions.
        ///
        /// Reserved extension point: accepted but currently without behavior. The
        /// finally-path filter is correct without it; the flag would only improve
        /// downstream liveness precision.
        const PHANTOM_FINALLY_EXITS = 1 << 4;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_compose() {
        let opts = SsaOptions::TRACK_FIELDS | SsaOptions::TRACK_PHANTOM_INCREMENTS;
        assert!(opts.contains(SsaOptions::TRACK_FIELDS));
        assert!(opts.contains(SsaOptions::TRACK_PHANTOM_INCREMENTS));
        assert!(!opts.contains(SsaOptions::LIVENESS));
    }

    #[test]
    fn test_empty_disables_everything() {
        let opts = SsaOptions::empty();
        assert!(!opts.contains(SsaOptions::TRACK_FIELDS));
        assert!(!opts.contains(SsaOptions::PHANTOM_FINALLY_EXITS));
    }
}
