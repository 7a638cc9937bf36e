#![forbid(unsafe_code)]

//! Item identity.

use std::fmt;

/// Stable identifier of an item in a feed.
///
/// Identity is what binds a rendered child view to its item: two items with
/// the same id are the same item, regardless of payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ItemId(pub u64);

impl ItemId {
    /// Create a new item id.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A content entry displayed as one child of a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<T> {
    /// Identity of the item.
    pub id: ItemId,
    /// Arbitrary payload handed to the render host when the view is built.
    pub payload: T,
}

impl<T> Item<T> {
    /// Create a new item.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, payload: T) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }
}
