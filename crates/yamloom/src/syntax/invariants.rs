//! Parser invariant checks, kept out of coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use super::core::Parser;
use super::cst::SyntaxKind;

/// Lookaheads allowed between two consumed tokens before the parser is considered stuck.
pub(super) const STALL_LIMIT: u32 = 256;

impl Parser<'_, '_> {
    #[inline]
    pub(super) fn ensure_progress(&self) {
        let left = self.debug_fuel.get();
        assert!(
            left != 0,
            "parser stalled at token {}: {STALL_LIMIT} lookaheads without consuming input",
            self.pos
        );
        self.debug_fuel.set(left - 1);
    }

    #[inline]
    pub(super) fn assert_current(&mut self, expected: SyntaxKind) {
        let found = self.current();
        assert_eq!(
            found, expected,
            "grammar expected {expected:?} at token {} but found {found:?}",
            self.pos
        );
    }

    /// Every flow collection the grammar opens is closed on the way out, even on error.
    #[inline]
    pub(super) fn assert_flow_balanced(&self) {
        debug_assert_eq!(self.flow_depth, 0, "flow nesting leaked past its collection");
    }
}
