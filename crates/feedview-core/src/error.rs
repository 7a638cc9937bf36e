#![forbid(unsafe_code)]

//! Error types.
//!
//! Most inconsistencies a feed meets at runtime (missing geometry, stale
//! anchors, observation races) are not errors: they degrade to "do nothing
//! this cycle". The types here cover caller mistakes only.

use std::fmt;

use crate::item::ItemId;

/// Error returned by feed operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The same id appears twice in one item sequence.
    DuplicateItem {
        id: ItemId,
        first: usize,
        second: usize,
    },
    /// The id is not part of the current item sequence.
    UnknownItem { id: ItemId },
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateItem { id, first, second } => {
                write!(
                    f,
                    "item {id} appears twice in sequence (indices {first} and {second})"
                )
            }
            Self::UnknownItem { id } => write!(f, "item {id} is not in the feed"),
        }
    }
}

impl std::error::Error for FeedError {}

/// Error returned by [`FeedConfig::validate`](crate::config::FeedConfig::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds a value outside its accepted range.
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "invalid feed config `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
