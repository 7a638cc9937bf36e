#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All values are integer pixels in container coordinates (origin at the top
//! of the scrollable content, y grows downward). Metrics are read from the
//! host at the moment of query and never cached across frames.

/// Pixel offset or extent.
pub type Px = i32;

/// Box metrics of the scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportMetrics {
    /// Current scroll offset of the container.
    pub scroll_top: Px,
    /// Total height of the scrollable content.
    pub scroll_height: Px,
    /// Height of the visible region.
    pub client_height: Px,
}

impl ViewportMetrics {
    /// Create new metrics.
    #[inline]
    pub const fn new(scroll_top: Px, scroll_height: Px, client_height: Px) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Whether the container has been laid out.
    ///
    /// A container with zero client height (not yet attached, or collapsed)
    /// gives no meaningful distances.
    #[inline]
    pub const fn is_laid_out(&self) -> bool {
        self.client_height > 0
    }

    /// Distance between the bottom of the viewport and the bottom of the
    /// content; 0 means fully scrolled to the bottom.
    ///
    /// Returns `None` when geometry is indeterminate (see [`is_laid_out`]).
    ///
    /// [`is_laid_out`]: Self::is_laid_out
    #[inline]
    pub const fn distance_from_bottom(&self) -> Option<Px> {
        if !self.is_laid_out() {
            return None;
        }
        Some(self.scroll_height - self.scroll_top - self.client_height)
    }

    /// Largest valid scroll offset.
    #[inline]
    pub const fn max_scroll_top(&self) -> Px {
        let max = self.scroll_height - self.client_height;
        if max > 0 { max } else { 0 }
    }
}

/// Box metrics of one attached child node, relative to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeBox {
    /// Offset of the node's top edge from the top of the content.
    pub offset_top: Px,
    /// Rendered height of the node.
    pub height: Px,
}

impl NodeBox {
    /// Create a new node box.
    #[inline]
    pub const fn new(offset_top: Px, height: Px) -> Self {
        Self { offset_top, height }
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> Px {
        self.offset_top.saturating_add(self.height)
    }

    /// Position of the node's top edge relative to the viewport top.
    #[inline]
    pub const fn on_screen_top(&self, scroll_top: Px) -> Px {
        self.offset_top - scroll_top
    }
}

/// How a programmatic scroll write is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Jump immediately.
    #[default]
    Instant,
    /// Let the host animate the transition.
    Smooth,
}

impl ScrollBehavior {
    /// Parse a behavior name (`instant`/`auto` or `smooth`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "instant" | "auto" => Some(Self::Instant),
            "smooth" => Some(Self::Smooth),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Smooth => "smooth",
        }
    }
}
