#![forbid(unsafe_code)]

//! Scroll anchoring across changes above the viewport.
//!
//! Content inserted above the viewport pushes everything below it down, and
//! content evicted from the head pulls it up. To keep the user looking at the
//! same thing, the anchor records the topmost visible surviving child and its
//! offset before the change, then after layout has settled moves the scroll
//! offset by however far that child moved.

use feedview_core::{ItemId, Px, ScrollBehavior};

use crate::host::ViewportHost;
use crate::scroll_state::ScrollState;
use crate::visibility::VisibilityTracker;

/// Reference point captured right before the head of the list changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// Topmost visible child at capture time.
    pub reference: ItemId,
    /// Offset of the reference node from the top of the content.
    pub offset_before: Px,
    /// Container scroll offset at capture time.
    pub scroll_top_before: Px,
}

/// Holds at most one pending anchor between capture and restore.
#[derive(Debug, Clone, Default)]
pub struct ScrollAnchor {
    pending: Option<Anchor>,
}

impl ScrollAnchor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The anchor waiting to be restored, if any.
    #[must_use]
    pub fn pending(&self) -> Option<Anchor> {
        self.pending
    }

    /// Record the topmost visible child and the current offsets.
    ///
    /// Replaces any earlier pending anchor. With nothing visible (or the
    /// reference not measurable) there is nothing to anchor against and the
    /// pending anchor is cleared.
    pub fn capture(
        &mut self,
        tracker: &VisibilityTracker,
        order: &[ItemId],
        host: &impl ViewportHost,
    ) -> Option<Anchor> {
        self.pending = tracker.topmost_visible(order).and_then(|reference| {
            let node = host.node_box(reference)?;
            Some(Anchor {
                reference,
                offset_before: node.offset_top,
                scroll_top_before: host.viewport().scroll_top,
            })
        });
        #[cfg(feature = "tracing")]
        if let Some(anchor) = &self.pending {
            tracing::debug!(
                reference = anchor.reference.get(),
                offset_before = anchor.offset_before,
                scroll_top_before = anchor.scroll_top_before,
                "anchor captured"
            );
        }
        self.pending
    }

    /// Move the scroll offset so the reference child stays where it was.
    ///
    /// Must run after the inserted nodes have been laid out. If the reference
    /// is no longer attached the anchor is dropped and nothing is written.
    /// Returns the requested scroll target.
    pub fn restore(
        &mut self,
        host: &impl ViewportHost,
        scroll: &mut ScrollState,
        behavior: ScrollBehavior,
    ) -> Option<Px> {
        let anchor = self.pending.take()?;
        let Some(node) = host.node_box(anchor.reference) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(reference = anchor.reference.get(), "anchor reference gone");
            return None;
        };
        let delta = node.offset_top - anchor.offset_before;
        let target = anchor.scroll_top_before + delta;
        #[cfg(feature = "tracing")]
        tracing::debug!(reference = anchor.reference.get(), delta, target, "anchor restored");
        scroll.set_scroll_position(target, behavior);
        Some(target)
    }

    /// Drop the pending anchor.
    pub fn clear(&mut self) {
        self.pending = None;
    }
}
