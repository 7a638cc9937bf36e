#![forbid(unsafe_code)]

//! Inbound observation entries and outbound feed events.

use std::ops::Range;

use crate::geometry::Px;
use crate::item::ItemId;

/// One entry of an intersection batch reported by the observation service.
///
/// Batches are delivered on the host's own schedule. Entries for nodes the
/// feed no longer observes are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionEntry {
    /// Item whose root node was observed.
    pub id: ItemId,
    /// Whether the node currently overlaps the visible region.
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// An entry reporting the node as visible.
    #[inline]
    pub const fn visible(id: ItemId) -> Self {
        Self {
            id,
            is_intersecting: true,
        }
    }

    /// An entry reporting the node as hidden.
    #[inline]
    pub const fn hidden(id: ItemId) -> Self {
        Self {
            id,
            is_intersecting: false,
        }
    }
}

/// Notifications a feed emits toward the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// The visible set changed; ids are in display order.
    VisibleItemsChanged(Vec<ItemId>),
    /// Display indices of the first through last visible child.
    VisibleRangeChanged(Range<usize>),
    /// The canonical scroll position changed (user- or program-driven).
    ScrollPositionChanged(Px),
    /// The "jump to latest" affordance should be shown or hidden.
    ScrollButtonVisibility(bool),
    /// The user actuated the "jump to latest" affordance.
    JumpToLatest,
}
