#![forbid(unsafe_code)]

//! Fixed-size trailing window for log-style feeds.
//!
//! Instead of observing intersections, the policy shows the last
//! `min_visible` children and hides the rest. Hidden children stay attached.
//! No anchoring happens in this mode, so it only suits containers that show a
//! fixed trailing window rather than partial scrollback.

use std::ops::Range;

use feedview_core::ItemId;

/// Shows only the last `min_visible` children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowedTailPolicy {
    min_visible: usize,
}

impl WindowedTailPolicy {
    #[must_use]
    pub const fn new(min_visible: usize) -> Self {
        Self { min_visible }
    }

    #[must_use]
    pub const fn min_visible(&self) -> usize {
        self.min_visible
    }

    pub fn set_min_visible(&mut self, min_visible: usize) {
        self.min_visible = min_visible;
    }

    /// Indices of the shown children among `len`.
    #[must_use]
    pub fn shown_range(&self, len: usize) -> Range<usize> {
        len.saturating_sub(self.min_visible)..len
    }

    /// Whether the child at `index` is shown.
    #[must_use]
    pub fn is_shown(&self, index: usize, len: usize) -> bool {
        self.shown_range(len).contains(&index)
    }

    /// Hidden flag for every child, in display order.
    pub fn hidden_flags<'a>(
        &self,
        order: &'a [ItemId],
    ) -> impl Iterator<Item = (ItemId, bool)> + use<'a> {
        let shown = self.shown_range(order.len());
        order
            .iter()
            .enumerate()
            .map(move |(index, id)| (*id, !shown.contains(&index)))
    }

    /// Ids of the shown children, in display order.
    #[must_use]
    pub fn shown<'a>(&self, order: &'a [ItemId]) -> &'a [ItemId] {
        &order[self.shown_range(order.len())]
    }
}
