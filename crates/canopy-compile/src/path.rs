//! # Path Accumulator
//!
//! The traversal-time stack of path segments. Grouping nodes push their
//! segments on entry and pop them when their subtree is fully left; a
//! handler leaf's route template is the snapshot of the stack at that
//! moment. Two handlers under the same group legitimately snapshot the
//! same template.

use canopy_core::{PathSegment, RouteTemplate};

/// Stack of path segments mirroring the active root-to-node group chain.
#[derive(Debug, Default)]
pub struct PathAccumulator {
    stack: Vec<PathSegment>,
}

impl PathAccumulator {
    /// Empty accumulator, positioned at the service root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a group's segments; returns the count to pop on leave.
    pub fn push_segments(&mut self, segments: &[PathSegment]) -> usize {
        self.stack.extend(segments.iter().cloned());
        segments.len()
    }

    /// Pop `count` segments pushed by the group being left.
    pub fn pop_segments(&mut self, count: usize) {
        let remaining = self.stack.len().saturating_sub(count);
        self.stack.truncate(remaining);
    }

    /// Snapshot the current stack as a handler's route template.
    pub fn snapshot(&self) -> RouteTemplate {
        RouteTemplate(self.stack.clone())
    }

    /// Current stack depth in segments.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_snapshot_pop() {
        let mut acc = PathAccumulator::new();
        let outer = acc.push_segments(&[PathSegment::literal("v1")]);
        let inner = acc.push_segments(&[
            PathSegment::literal("users"),
            PathSegment::parameter("id"),
        ]);
        assert_eq!(acc.snapshot().render(), "/v1/users/{id}");

        acc.pop_segments(inner);
        assert_eq!(acc.snapshot().render(), "/v1");
        acc.pop_segments(outer);
        assert!(acc.snapshot().is_root());
    }

    #[test]
    fn test_sibling_snapshots_are_identical() {
        let mut acc = PathAccumulator::new();
        acc.push_segments(&[PathSegment::literal("users")]);
        let first = acc.snapshot();
        let second = acc.snapshot();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_group_pushes_nothing() {
        let mut acc = PathAccumulator::new();
        let count = acc.push_segments(&[]);
        assert_eq!(count, 0);
        assert_eq!(acc.depth(), 0);
    }
}
