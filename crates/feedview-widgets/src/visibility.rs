#![forbid(unsafe_code)]

//! Visible-set tracking fed by intersection batches.
//!
//! The tracker is the only component that subscribes or unsubscribes nodes
//! with the [`ObservationService`]. Subscriptions are idempotent in both
//! directions, so create/destroy races during reconciliation never leak or
//! double-release a subscription.
//!
//! Publication is suppressed while the `synchronizing` flag is raised (from
//! the start of a reconciliation pass to attach completion), so detach/attach
//! churn never escapes as a transient visibility snapshot.

use std::collections::HashSet;
use std::ops::Range;

use feedview_core::{IntersectionEntry, ItemId};

use crate::host::ObservationService;

/// Current visible set and observation subscriptions of one container.
#[derive(Debug, Clone, Default)]
pub struct VisibilityTracker {
    observed: HashSet<ItemId>,
    visible: HashSet<ItemId>,
    /// Last set handed out by [`publish`](Self::publish).
    published: HashSet<ItemId>,
    synchronizing: bool,
}

impl VisibilityTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing an item's node. Returns `false` if it was already observed.
    pub fn observe(&mut self, id: ItemId, service: &mut impl ObservationService) -> bool {
        if !self.observed.insert(id) {
            return false;
        }
        service.observe(id);
        true
    }

    /// Stop observing an item's node and drop it from the visible set.
    ///
    /// Must be called before the view is destroyed. Returns `false` if the
    /// node was not observed.
    pub fn unobserve(&mut self, id: ItemId, service: &mut impl ObservationService) -> bool {
        self.visible.remove(&id);
        if !self.observed.remove(&id) {
            return false;
        }
        service.unobserve(id);
        true
    }

    /// Release every subscription.
    pub fn unobserve_all(&mut self, service: &mut impl ObservationService) {
        for id in self.observed.drain() {
            service.unobserve(id);
        }
        self.visible.clear();
    }

    /// Apply a whole intersection batch.
    ///
    /// Entries for nodes that are not observed (e.g. torn down while the batch
    /// was in transit) are ignored. Returns whether the visible set changed.
    pub fn on_intersection_batch(&mut self, entries: &[IntersectionEntry]) -> bool {
        let mut changed = false;
        for entry in entries {
            if !self.observed.contains(&entry.id) {
                #[cfg(feature = "tracing")]
                tracing::trace!(id = entry.id.get(), "ignoring intersection entry for unobserved node");
                continue;
            }
            changed |= if entry.is_intersecting {
                self.visible.insert(entry.id)
            } else {
                self.visible.remove(&entry.id)
            };
        }
        changed
    }

    /// Replace the visible set wholesale, bypassing observation.
    ///
    /// Used by modes that decide visibility themselves.
    pub fn assign_visible(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.visible = ids.into_iter().collect();
    }

    /// Raise or lower the synchronizing flag.
    pub fn set_synchronizing(&mut self, synchronizing: bool) {
        self.synchronizing = synchronizing;
    }

    /// Whether publication is currently suppressed.
    #[must_use]
    pub fn is_synchronizing(&self) -> bool {
        self.synchronizing
    }

    /// Hand out the visible set, in display order, if it changed since the
    /// last publication and no reconciliation is in progress.
    pub fn publish(&mut self, order: &[ItemId]) -> Option<Vec<ItemId>> {
        if self.synchronizing || self.visible == self.published {
            return None;
        }
        self.published.clone_from(&self.visible);
        Some(self.in_display_order(order))
    }

    /// Visible ids in display order.
    #[must_use]
    pub fn in_display_order(&self, order: &[ItemId]) -> Vec<ItemId> {
        order
            .iter()
            .filter(|id| self.visible.contains(id))
            .copied()
            .collect()
    }

    /// The visible item that comes first in display order.
    #[must_use]
    pub fn topmost_visible(&self, order: &[ItemId]) -> Option<ItemId> {
        order.iter().find(|id| self.visible.contains(id)).copied()
    }

    /// Display indices spanning the first through last visible item.
    #[must_use]
    pub fn visible_range(&self, order: &[ItemId]) -> Option<Range<usize>> {
        let first = order.iter().position(|id| self.visible.contains(id))?;
        let last = order.iter().rposition(|id| self.visible.contains(id))?;
        Some(first..last + 1)
    }

    #[must_use]
    pub fn is_visible(&self, id: ItemId) -> bool {
        self.visible.contains(&id)
    }

    #[must_use]
    pub fn is_observed(&self, id: ItemId) -> bool {
        self.observed.contains(&id)
    }

    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    #[must_use]
    pub fn observed_len(&self) -> usize {
        self.observed.len()
    }
}
