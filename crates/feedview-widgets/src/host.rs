#![forbid(unsafe_code)]

//! Collaborator traits implemented by the embedding environment.
//!
//! A feed never touches nodes, layout, or observers directly. It drives four
//! collaborators:
//!
//! - [`ViewportHost`] measures the container and its children and applies
//!   scroll writes.
//! - [`RenderHost`] builds, destroys, attaches, detaches, and hides the
//!   per-item views.
//! - [`FrameScheduler`] defers work until after the next layout pass.
//! - [`ObservationService`] watches child nodes for viewport intersection.
//!
//! [`FeedHost`] bundles all of them so a container can own a single value.

use feedview_core::{Item, ItemId, NodeBox, Px, ScrollBehavior, ViewportMetrics};

/// Geometry queries and the single scroll-offset write.
pub trait ViewportHost {
    /// Current container metrics. Never cached by callers across frames.
    fn viewport(&self) -> ViewportMetrics;

    /// Box of an attached child node, or `None` when the node is not attached.
    ///
    /// Doubles as the liveness test for deferred work.
    fn node_box(&self, id: ItemId) -> Option<NodeBox>;

    /// Write the container's scroll offset.
    ///
    /// Only [`ScrollState`](crate::scroll_state::ScrollState) calls this.
    fn scroll_to(&mut self, px: Px, behavior: ScrollBehavior);
}

/// Builds and places per-item views.
pub trait RenderHost<T>: ViewportHost {
    /// Create the view for an item. The view starts detached.
    fn build(&mut self, item: &Item<T>);

    /// Release the view of an item. The node is detached first if needed.
    fn destroy(&mut self, id: ItemId);

    /// Attach the view's root node so that it becomes the `index`-th child.
    fn insert(&mut self, id: ItemId, index: usize);

    /// Detach the view's root node from the container.
    fn detach(&mut self, id: ItemId);

    /// Hide or show an attached node without detaching it.
    fn set_hidden(&mut self, id: ItemId, hidden: bool);
}

/// Defers work until just after the next layout pass.
pub trait FrameScheduler {
    /// Ask the host to call the feed's `on_frame` after the next layout pass.
    ///
    /// Repeated requests before the frame runs may be coalesced.
    fn request_frame(&mut self);
}

/// Viewport-intersection watcher.
///
/// Hosts report results asynchronously as batches of
/// [`IntersectionEntry`](feedview_core::IntersectionEntry).
pub trait ObservationService {
    /// Start observing the root node of an item's view.
    fn observe(&mut self, id: ItemId);

    /// Stop observing the root node of an item's view.
    fn unobserve(&mut self, id: ItemId);
}

/// Everything a [`ScrollFeed`](crate::feed::ScrollFeed) needs from its host.
pub trait FeedHost<T>: RenderHost<T> + FrameScheduler + ObservationService {}

impl<T, H> FeedHost<T> for H where H: RenderHost<T> + FrameScheduler + ObservationService {}
