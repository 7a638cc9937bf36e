#![forbid(unsafe_code)]

//! Per-item view bookkeeping held by the feed.

use feedview_core::{Item, ItemId};

/// The feed's record of one item's view.
///
/// Bound to exactly one item for its whole life. When an id leaves the
/// sequence the view is destroyed; if it comes back, a fresh view is built.
#[derive(Debug, Clone)]
pub struct ChildView<T> {
    item: Item<T>,
    attached: bool,
    hidden: bool,
}

impl<T> ChildView<T> {
    /// A freshly built, detached, shown view.
    #[must_use]
    pub fn new(item: Item<T>) -> Self {
        Self {
            item,
            attached: false,
            hidden: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> ItemId {
        self.item.id
    }

    #[must_use]
    pub fn item(&self) -> &Item<T> {
        &self.item
    }

    #[must_use]
    pub fn payload(&self) -> &T {
        &self.item.payload
    }

    /// Swap in the latest payload for the same id.
    pub fn set_payload(&mut self, payload: T) {
        self.item.payload = payload;
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}
