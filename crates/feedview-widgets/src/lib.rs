#![forbid(unsafe_code)]

//! Scroll feed container and its components.
//!
//! [`ScrollFeed`] keeps one view per item in display order and coordinates
//! scroll anchoring, auto-follow, and visibility tracking on top of a
//! [`FeedHost`]. The components it is built from are usable on their own.

pub mod anchor;
pub mod feed;
pub mod follow;
pub mod host;
pub mod load_window;
pub mod reconcile;
pub mod scroll_state;
pub mod tail_window;
pub mod view;
pub mod visibility;

pub use anchor::{Anchor, ScrollAnchor};
pub use feed::{ApplyOutcome, ScrollFeed};
pub use follow::{AutoFollowController, ExplicitJump, FollowDecision, JumpDecision};
pub use host::{FeedHost, FrameScheduler, ObservationService, RenderHost, ViewportHost};
pub use load_window::LoadWindow;
pub use reconcile::{
    MutationStep, ReconcilePlan, ReconcileStats, Transition, check_unique, classify, reconcile,
};
pub use scroll_state::{SMOOTH_START_FRAMES, ScrollState};
pub use tail_window::WindowedTailPolicy;
pub use view::ChildView;
pub use visibility::VisibilityTracker;
