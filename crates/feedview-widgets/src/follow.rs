#![forbid(unsafe_code)]

//! Auto-follow policy and the "jump to latest" affordance.
//!
//! The controller only decides; the feed schedules the resulting scroll for
//! the next frame, once the new content has been laid out, and routes it
//! through [`ScrollState`](crate::scroll_state::ScrollState).
//!
//! Every distance-based decision is skipped while geometry is indeterminate
//! (container not laid out), rather than risking a wrong jump.

use feedview_core::{FeedConfig, Px, ViewportMetrics};

/// Outcome of a content change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowDecision {
    /// Leave the scroll offset alone.
    Skip,
    /// Scroll to the new bottom after layout.
    Follow,
}

/// A request from the "scroll to latest" surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExplicitJump {
    /// One-shot limit: only jump when within this many pixels of the bottom.
    pub limit: Option<Px>,
    /// Rebuild every view before jumping.
    pub rerender: bool,
}

impl ExplicitJump {
    /// Unconditional jump.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional jump after a full rebuild.
    #[must_use]
    pub fn rerender() -> Self {
        Self {
            limit: None,
            rerender: true,
        }
    }

    /// Only jump when within `limit` pixels of the bottom.
    #[must_use]
    pub fn within(mut self, limit: Px) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Outcome of an explicit jump request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpDecision {
    Skip,
    Jump { rerender: bool },
}

/// Decides when the view follows newly arrived content.
#[derive(Debug, Clone, Default)]
pub struct AutoFollowController {
    /// `None` disables auto-follow.
    auto_scroll_limit: Option<Px>,
    /// `None` never shows the affordance.
    button_threshold: Option<Px>,
    /// One-shot force-follow, consumed by the next non-empty content change.
    stick_to_latest: bool,
}

impl AutoFollowController {
    /// Build from feed configuration. `view_latest_on_load` arms the
    /// one-shot force-follow for the first render.
    #[must_use]
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            auto_scroll_limit: config.auto_scroll_limit_px(),
            button_threshold: config.scroll_button_threshold_px(),
            stick_to_latest: config.view_latest_on_load,
        }
    }

    /// Set the auto-follow limit; `None` disables it.
    pub fn set_auto_scroll_limit(&mut self, limit: Option<Px>) {
        self.auto_scroll_limit = limit;
    }

    /// Set the affordance threshold; `None` disables it.
    pub fn set_button_threshold(&mut self, threshold: Option<Px>) {
        self.button_threshold = threshold;
    }

    /// Force the next content change to follow regardless of distance.
    pub fn stick_to_latest(&mut self) {
        self.stick_to_latest = true;
    }

    #[must_use]
    pub fn is_sticking(&self) -> bool {
        self.stick_to_latest
    }

    /// Decide whether a content change should follow to the bottom.
    ///
    /// `before` are the metrics read before the new content was attached.
    pub fn on_content_changed(&mut self, before: ViewportMetrics, has_content: bool) -> FollowDecision {
        if self.stick_to_latest && has_content {
            self.stick_to_latest = false;
            return FollowDecision::Follow;
        }
        let Some(limit) = self.auto_scroll_limit else {
            return FollowDecision::Skip;
        };
        match before.distance_from_bottom() {
            Some(distance) if distance <= limit => FollowDecision::Follow,
            _ => FollowDecision::Skip,
        }
    }

    /// Decide an explicit "scroll to latest" request.
    ///
    /// Ignores the auto-follow limit. A one-shot limit in the request is
    /// honored like a distance decision.
    #[must_use]
    pub fn on_explicit_jump(&self, jump: ExplicitJump, now: ViewportMetrics) -> JumpDecision {
        if let Some(limit) = jump.limit {
            match now.distance_from_bottom() {
                Some(distance) if distance <= limit => {}
                _ => return JumpDecision::Skip,
            }
        }
        JumpDecision::Jump {
            rerender: jump.rerender,
        }
    }

    /// Whether the affordance should be shown, or `None` when the decision
    /// cannot be made (affordance disabled or geometry indeterminate).
    #[must_use]
    pub fn jump_button_visible(&self, now: ViewportMetrics) -> Option<bool> {
        let threshold = self.button_threshold?;
        let distance = now.distance_from_bottom()?;
        Some(distance >= threshold)
    }
}
