//! Finally path metadata for the direct control flow graph.
//!
//! A `finally` block is a single physical basic block that is logically replicated
//! along every path able to reach it: the normal fall-through, every `return`, `break`
//! or `continue` routed through it, and the implicit exception rethrow. The flattening
//! step records this replication as path wrappers attached to the finally's exit node;
//! the SSA pass consumes them to filter merged state per logical path.

use crate::cfg::DirectNodeId;

/// One logical path through a replicated `finally` block.
///
/// A wrapper describes a single replica: control entered the finally from `source`,
/// flowed through the block starting at `entry`, and continues at `destination` once
/// the block completes. Several wrappers share the same physical exit node; the
/// finally-path filter classifies them as leading to the requested destination or
/// elsewhere when it reconstructs the out-state of one specific replica.
///
/// # Examples
///
/// ```rust
/// use ssaflow::{DirectNodeId, FinallyPath};
///
/// let path = FinallyPath::new(
///     DirectNodeId::new(0),
///     DirectNodeId::new(3),
///     DirectNodeId::new(1),
/// );
/// assert_eq!(path.source(), DirectNodeId::new(0));
/// assert_eq!(path.destination(), DirectNodeId::new(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinallyPath {
    /// The node from which control entered the finally block.
    source: DirectNodeId,
    /// The node at which this logical path continues after the finally block.
    destination: DirectNodeId,
    /// The entry node of the finally block body.
    entry: DirectNodeId,
}

impl FinallyPath {
    /// Creates a new finally path wrapper.
    ///
    /// # Arguments
    ///
    /// * `source` - The node from which control entered the finally block
    /// * `destination` - The node where this logical path continues afterwards
    /// * `entry` - The entry node of the finally block body
    #[must_use]
    pub const fn new(
        source: DirectNodeId,
        destination: DirectNodeId,
        entry: DirectNodeId,
    ) -> Self {
        Self {
            source,
            destination,
            entry,
        }
    }

    /// Returns the node from which control entered the finally block.
    #[must_use]
    pub const fn source(&self) -> DirectNodeId {
        self.source
    }

    /// Returns the node where this logical path continues after the finally block.
    #[must_use]
    pub const fn destination(&self) -> DirectNodeId {
        self.destination
    }

    /// Returns the entry node of the finally block body.
    #[must_use]
    pub const fn entry(&self) -> DirectNodeId {
        self.entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finally_path_accessors() {
        let path = FinallyPath::new(
            DirectNodeId::new(1),
            DirectNodeId::new(2),
            DirectNodeId::new(3),
        );
        assert_eq!(path.source(), DirectNodeId::new(1));
        assert_eq!(path.destination(), DirectNodeId::new(2));
        assert_eq!(path.entry(), DirectNodeId::new(3));
    }

    #[test]
    fn test_finally_path_equality() {
        let a = FinallyPath::new(
            DirectNodeId::new(1),
            DirectNodeId::new(2),
            DirectNodeId::new(3),
        );
        let b = FinallyPath::new(
            DirectNodeId::new(1),
            DirectNodeId::new(2),
            DirectNodeId::new(3),
        );
        let c = FinallyPath::new(
            DirectNodeId::new(1),
            DirectNodeId::new(4),
            DirectNodeId::new(3),
        );
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
