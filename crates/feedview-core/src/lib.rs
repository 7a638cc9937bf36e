#![forbid(unsafe_code)]

//! Core: item identity, viewport geometry, feed events, and configuration.

pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod item;

pub use config::{FeedConfig, FeedMode};
pub use error::{ConfigError, FeedError};
pub use event::{FeedEvent, IntersectionEntry};
pub use geometry::{NodeBox, Px, ScrollBehavior, ViewportMetrics};
pub use item::{Item, ItemId};
