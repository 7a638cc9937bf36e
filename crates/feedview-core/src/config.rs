#![forbid(unsafe_code)]

//! Feed configuration.
//!
//! [`FeedConfig`] is a plain value with builder methods. Deployments can
//! override individual knobs through environment variables, read with
//! [`FeedConfig::from_env`] (or [`FeedConfig::from_env_with`] for tests).
//! Unparseable values leave the default in place.

use crate::error::ConfigError;
use crate::geometry::{Px, ScrollBehavior};

/// Environment variable overriding [`FeedConfig::mode`] (`tracked` or `tail`).
const ENV_MODE: &str = "FEEDVIEW_MODE";
/// Environment variable overriding [`FeedConfig::auto_scroll_limit`].
const ENV_AUTO_SCROLL_LIMIT: &str = "FEEDVIEW_AUTO_SCROLL_LIMIT";
/// Environment variable overriding [`FeedConfig::scroll_button_threshold`].
const ENV_SCROLL_BUTTON_THRESHOLD: &str = "FEEDVIEW_SCROLL_BUTTON_THRESHOLD";
/// Environment variable overriding [`FeedConfig::view_latest_on_load`] (`1/0/true/false`).
const ENV_VIEW_LATEST: &str = "FEEDVIEW_VIEW_LATEST";
/// Environment variable overriding [`FeedConfig::min_visible_tail`].
const ENV_MIN_VISIBLE_TAIL: &str = "FEEDVIEW_MIN_VISIBLE_TAIL";
/// Environment variable overriding [`FeedConfig::load_buffer`].
const ENV_LOAD_BUFFER: &str = "FEEDVIEW_LOAD_BUFFER";
/// Environment variable overriding [`FeedConfig::scroll_behavior`] (`instant` or `smooth`).
const ENV_SCROLL_BEHAVIOR: &str = "FEEDVIEW_SCROLL_BEHAVIOR";
/// Environment variable overriding [`FeedConfig::anchor_behavior`] (`instant` or `smooth`).
const ENV_ANCHOR_BEHAVIOR: &str = "FEEDVIEW_ANCHOR_BEHAVIOR";

/// How the feed decides which children are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedMode {
    /// Visibility comes from intersection observation; prepends are anchored.
    #[default]
    Tracked,
    /// Only the trailing [`FeedConfig::min_visible_tail`] children are shown.
    WindowedTail,
}

impl FeedMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tracked" | "feed" => Some(Self::Tracked),
            "tail" | "log" | "windowed-tail" => Some(Self::WindowedTail),
            _ => None,
        }
    }
}

/// Configuration for a scroll feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Container mode.
    /// Default: [`FeedMode::Tracked`]
    pub mode: FeedMode,

    /// Auto-follow new content when the viewport is within this many pixels
    /// of the bottom. 0 disables auto-follow.
    /// Default: 0
    pub auto_scroll_limit: u32,

    /// Show the "jump to latest" affordance once the viewport is at least
    /// this many pixels from the bottom. 0 never shows it.
    /// Default: 0
    pub scroll_button_threshold: u32,

    /// Jump to the newest item on the first non-empty render.
    /// Default: false
    pub view_latest_on_load: bool,

    /// Number of trailing children shown in [`FeedMode::WindowedTail`].
    /// Default: 10
    pub min_visible_tail: usize,

    /// Items kept rendered on each side of the visible range.
    /// Default: 50
    pub load_buffer: usize,

    /// Behavior of ordinary programmatic scrolls.
    /// Default: instant
    pub scroll_behavior: ScrollBehavior,

    /// Behavior of the prepend anchor correction.
    /// Default: instant
    pub anchor_behavior: ScrollBehavior,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            mode: FeedMode::Tracked,
            auto_scroll_limit: 0,
            scroll_button_threshold: 0,
            view_latest_on_load: false,
            min_visible_tail: 10,
            load_buffer: 50,
            scroll_behavior: ScrollBehavior::Instant,
            anchor_behavior: ScrollBehavior::Instant,
        }
    }
}

impl FeedConfig {
    /// Defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from a custom environment lookup.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(mode) = get_env(ENV_MODE).and_then(|v| FeedMode::parse(&v)) {
            config.mode = mode;
        }
        if let Some(limit) = env_number(&get_env, ENV_AUTO_SCROLL_LIMIT) {
            config.auto_scroll_limit = limit;
        }
        if let Some(threshold) = env_number(&get_env, ENV_SCROLL_BUTTON_THRESHOLD) {
            config.scroll_button_threshold = threshold;
        }
        if let Some(flag) = env_bool(&get_env, ENV_VIEW_LATEST) {
            config.view_latest_on_load = flag;
        }
        if let Some(tail) = env_number(&get_env, ENV_MIN_VISIBLE_TAIL) {
            config.min_visible_tail = tail;
        }
        if let Some(buffer) = env_number(&get_env, ENV_LOAD_BUFFER) {
            config.load_buffer = buffer;
        }
        if let Some(behavior) = get_env(ENV_SCROLL_BEHAVIOR).and_then(|v| ScrollBehavior::parse(&v))
        {
            config.scroll_behavior = behavior;
        }
        if let Some(behavior) = get_env(ENV_ANCHOR_BEHAVIOR).and_then(|v| ScrollBehavior::parse(&v))
        {
            config.anchor_behavior = behavior;
        }
        config
    }

    /// Set the container mode.
    #[must_use]
    pub fn with_mode(mut self, mode: FeedMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the auto-follow distance limit.
    #[must_use]
    pub fn with_auto_scroll_limit(mut self, limit: u32) -> Self {
        self.auto_scroll_limit = limit;
        self
    }

    /// Set the jump affordance threshold.
    #[must_use]
    pub fn with_scroll_button_threshold(mut self, threshold: u32) -> Self {
        self.scroll_button_threshold = threshold;
        self
    }

    /// Jump to the newest item on first render.
    #[must_use]
    pub fn with_view_latest_on_load(mut self, enabled: bool) -> Self {
        self.view_latest_on_load = enabled;
        self
    }

    /// Set the trailing window size for tail mode.
    #[must_use]
    pub fn with_min_visible_tail(mut self, count: usize) -> Self {
        self.min_visible_tail = count;
        self
    }

    /// Set the load buffer around the visible range.
    #[must_use]
    pub fn with_load_buffer(mut self, buffer: usize) -> Self {
        self.load_buffer = buffer;
        self
    }

    /// Set the behavior of ordinary programmatic scrolls.
    #[must_use]
    pub fn with_scroll_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.scroll_behavior = behavior;
        self
    }

    /// Set the behavior of the prepend anchor correction.
    #[must_use]
    pub fn with_anchor_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.anchor_behavior = behavior;
        self
    }

    /// Auto-follow limit in pixels, `None` when auto-follow is disabled.
    #[must_use]
    pub fn auto_scroll_limit_px(&self) -> Option<Px> {
        nonzero_px(self.auto_scroll_limit)
    }

    /// Jump affordance threshold in pixels, `None` when disabled.
    #[must_use]
    pub fn scroll_button_threshold_px(&self) -> Option<Px> {
        nonzero_px(self.scroll_button_threshold)
    }

    /// Check that every pixel distance fits the pixel type.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if Px::try_from(self.auto_scroll_limit).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "auto_scroll_limit",
                reason: "exceeds the largest pixel offset",
            });
        }
        if Px::try_from(self.scroll_button_threshold).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "scroll_button_threshold",
                reason: "exceeds the largest pixel offset",
            });
        }
        Ok(())
    }
}

fn nonzero_px(value: u32) -> Option<Px> {
    if value == 0 {
        None
    } else {
        Some(Px::try_from(value).unwrap_or(Px::MAX))
    }
}

fn env_number<F, N>(get_env: &F, key: &str) -> Option<N>
where
    F: Fn(&str) -> Option<String>,
    N: std::str::FromStr,
{
    let raw = get_env(key)?;
    let parsed = raw.trim().parse().ok();
    #[cfg(feature = "tracing")]
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "ignoring unparseable feed config override");
    }
    parsed
}

fn env_bool<F>(get_env: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = get_env(key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
