#![forbid(unsafe_code)]

//! Deterministic test host and driver for scroll feeds.
//!
//! [`FakeDom`] stands in for a real container: it lays children out, keeps
//! a scroll offset, schedules frames, and reports intersections. [`settle`]
//! plays the role of the event loop, delivering frames, native scroll
//! signals, and intersection batches until nothing is left to do.
//!
//! # Quick Start
//!
//! ```ignore
//! use feedview_harness::{FakeDom, items, settle};
//!
//! let mut feed = ScrollFeed::new(FakeDom::new(200), FeedConfig::default())?;
//! feed.set_items(items(0..50))?;
//! settle(&mut feed);
//! assert_eq!(feed.host().attached().len(), 50);
//! ```

pub mod dom;

pub use dom::{DEFAULT_ROW_HEIGHT, FakeDom, HostCounters, Mutation};

use feedview_core::{FeedEvent, Item, ItemId, Px};
use feedview_widgets::ScrollFeed;

/// Upper bound on loop turns in one [`settle`] call.
pub const MAX_SETTLE_TURNS: usize = 512;

/// A feed driven by the fake host.
pub type TestFeed<T> = ScrollFeed<T, FakeDom>;

/// Run frames, scroll signals, and intersection batches until quiescent.
///
/// Each turn advances any smooth scroll by one step, runs the pending frame,
/// delivers the pending native scroll signal, then delivers the intersection
/// changes. Returns the number of frames run.
pub fn settle<T>(feed: &mut TestFeed<T>) -> usize {
    let mut frames = 0;
    for _ in 0..MAX_SETTLE_TURNS {
        let mut progressed = false;

        if feed.host_mut().tick_layout() {
            feed.host_mut().take_scroll_signal();
            feed.on_native_scroll();
            progressed = true;
        }
        if feed.host_mut().take_frame() {
            feed.on_frame();
            frames += 1;
            progressed = true;
        }
        if feed.host_mut().take_scroll_signal() {
            feed.on_native_scroll();
            progressed = true;
        }
        let batch = feed.host_mut().take_intersections();
        if !batch.is_empty() {
            feed.on_intersections(&batch);
            progressed = true;
        }

        if !progressed {
            break;
        }
    }
    frames
}

/// The user scrolls to `px`; the signal is delivered right away.
pub fn user_scroll<T>(feed: &mut TestFeed<T>, px: Px) {
    feed.host_mut().user_scroll_to(px);
    feed.host_mut().take_scroll_signal();
    feed.on_native_scroll();
}

/// Unit-payload items with the given raw ids, in order.
pub fn items(raw: impl IntoIterator<Item = u64>) -> Vec<Item<()>> {
    raw.into_iter().map(|id| Item::new(id, ())).collect()
}

/// Raw ids as [`ItemId`]s, in order.
pub fn ids(raw: impl IntoIterator<Item = u64>) -> Vec<ItemId> {
    raw.into_iter().map(ItemId).collect()
}

/// Every event drained from the feed, oldest first.
pub fn drain<T>(feed: &mut TestFeed<T>) -> Vec<FeedEvent> {
    feed.drain_events().collect()
}

/// The last published visible set among `events`, if any.
#[must_use]
pub fn last_visible(events: &[FeedEvent]) -> Option<&[ItemId]> {
    events.iter().rev().find_map(|event| match event {
        FeedEvent::VisibleItemsChanged(ids) => Some(ids.as_slice()),
        _ => None,
    })
}
