#![forbid(unsafe_code)]

//! Canonical scroll position with a re-entrancy guard.
//!
//! `ScrollState` is the single writer of the container's scroll offset. Every
//! programmatic move goes through [`ScrollState::set_scroll_position`], which
//! queues the write for the next frame; [`ScrollState::flush`] applies it from
//! inside the frame callback, after pending layout.
//!
//! # Guard lifecycle
//!
//! The `applying` flag is set when a write is queued and cleared when the
//! write completes:
//!
//! - instant writes complete inside `flush`;
//! - smooth writes complete when the host reports the target offset, or when
//!   the offset stops moving between two frames after it has moved at least
//!   once (animation interrupted). A host that has not started animating
//!   gets [`SMOOTH_START_FRAMES`] frames before the write is abandoned.
//!
//! While the flag is set, native scroll signals are attributed to the write
//! and never republished as user-driven positions.

use feedview_core::{Px, ScrollBehavior, ViewportMetrics};

use crate::host::ViewportHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingWrite {
    target: Px,
    behavior: ScrollBehavior,
}

/// Frames a smooth write may wait for the host's first animation step.
pub const SMOOTH_START_FRAMES: u32 = 4;

/// A smooth write the host is still animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    target: Px,
    last_top: Px,
    /// Whether the offset changed in any frame since the write was issued.
    moved: bool,
    /// Frames seen without movement before the first step.
    idle_frames: u32,
}

/// Scroll offset bookkeeping for one container.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    /// Canonical scroll position, as last published.
    position: Px,
    /// Set while a programmatic write is queued or being applied.
    applying: bool,
    /// Write waiting for the next frame. Later writes replace earlier ones.
    pending: Option<PendingWrite>,
    in_flight: Option<InFlight>,
}

impl ScrollState {
    /// Create a new state at offset 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical scroll position.
    #[must_use]
    pub fn position(&self) -> Px {
        self.position
    }

    /// Whether a programmatic write is queued or still being applied.
    #[must_use]
    pub fn is_applying(&self) -> bool {
        self.applying
    }

    /// Whether the state needs another frame callback to make progress.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        self.pending.is_some() || self.in_flight.is_some()
    }

    /// Distance from the bottom of the content, `None` while geometry is
    /// indeterminate.
    #[must_use]
    pub fn distance_from_bottom(&self, host: &impl ViewportHost) -> Option<Px> {
        host.viewport().distance_from_bottom()
    }

    /// Queue a programmatic scroll to `px` and raise the guard.
    ///
    /// The write is applied by the next [`flush`](Self::flush).
    pub fn set_scroll_position(&mut self, px: Px, behavior: ScrollBehavior) {
        self.applying = true;
        self.in_flight = None;
        self.pending = Some(PendingWrite {
            target: px,
            behavior,
        });
    }

    /// Handle a native scroll signal.
    ///
    /// Returns the new canonical position when it changed. Signals that arrive
    /// while a programmatic write is in progress are not republished, except
    /// the one reporting that a smooth write reached its target.
    pub fn record_user_scroll(&mut self, host: &impl ViewportHost) -> Option<Px> {
        let top = host.viewport().scroll_top;
        if self.applying {
            if let Some(flight) = self.in_flight
                && top == flight.target
            {
                self.in_flight = None;
                return self.complete(top);
            }
            return None;
        }
        self.publish(top)
    }

    /// Apply the queued write, or advance an in-flight smooth write.
    ///
    /// Call from inside the frame callback. Returns the new canonical
    /// position when it changed.
    pub fn flush(&mut self, host: &mut impl ViewportHost) -> Option<Px> {
        if let Some(write) = self.pending.take() {
            host.scroll_to(write.target, write.behavior);
            let metrics = host.viewport();
            return match write.behavior {
                ScrollBehavior::Instant => self.complete(metrics.scroll_top),
                ScrollBehavior::Smooth => {
                    let target = clamp_target(write.target, &metrics);
                    if metrics.scroll_top == target {
                        self.complete(metrics.scroll_top)
                    } else {
                        self.in_flight = Some(InFlight {
                            target,
                            last_top: metrics.scroll_top,
                            moved: false,
                            idle_frames: 0,
                        });
                        None
                    }
                }
            };
        }

        let mut flight = self.in_flight?;
        let top = host.viewport().scroll_top;
        let stalled = if top != flight.last_top {
            flight.moved = true;
            false
        } else if flight.moved {
            true
        } else {
            flight.idle_frames += 1;
            flight.idle_frames >= SMOOTH_START_FRAMES
        };
        if top == flight.target || stalled {
            self.in_flight = None;
            return self.complete(top);
        }
        flight.last_top = top;
        self.in_flight = Some(flight);
        None
    }

    /// Finish a write: lower the guard and adopt the host's offset.
    fn complete(&mut self, top: Px) -> Option<Px> {
        self.applying = false;
        self.publish(top)
    }

    fn publish(&mut self, top: Px) -> Option<Px> {
        if top == self.position {
            return None;
        }
        self.position = top;
        Some(top)
    }
}

fn clamp_target(target: Px, metrics: &ViewportMetrics) -> Px {
    target.clamp(0, metrics.max_scroll_top())
}
