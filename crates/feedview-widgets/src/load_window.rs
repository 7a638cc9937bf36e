#![forbid(unsafe_code)]

//! Rendered-item window around the visible range.
//!
//! Long feeds keep only a slice of their items rendered: the visible range
//! plus a buffer on each side. The feed reports the visible range as display
//! indices; the application expands it with [`LoadWindow::expand`] and passes
//! the resulting slice of its full model back as the next item sequence.

use std::ops::Range;

/// Buffer of items kept rendered on each side of the visible range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadWindow {
    buffer: usize,
}

impl LoadWindow {
    #[must_use]
    pub const fn new(buffer: usize) -> Self {
        Self { buffer }
    }

    #[must_use]
    pub const fn buffer(&self) -> usize {
        self.buffer
    }

    /// Expand `visible` by the buffer, clamped to `0..total`.
    #[must_use]
    pub fn expand(&self, visible: Range<usize>, total: usize) -> Range<usize> {
        let start = visible.start.saturating_sub(self.buffer).min(total);
        let end = visible.end.saturating_add(self.buffer).min(total);
        start..end.max(start)
    }

    /// Whether `visible` has come within half a buffer of an edge of the
    /// `loaded` slice that still has unloaded model items beyond it.
    #[must_use]
    pub fn needs_reload(&self, visible: &Range<usize>, loaded: &Range<usize>, total: usize) -> bool {
        let margin = self.buffer / 2;
        let near_head = loaded.start > 0 && visible.start < loaded.start.saturating_add(margin);
        let near_tail = loaded.end < total && visible.end.saturating_add(margin) > loaded.end;
        near_head || near_tail
    }
}
