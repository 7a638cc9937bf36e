#![forbid(unsafe_code)]

//! Deterministic in-memory host.
//!
//! `FakeDom` lays children out as a vertical stack of boxes, keeps a scroll
//! offset clamped to the content, animates smooth scrolls in halving steps,
//! and reports intersection changes for subscribed nodes. Every mutation is
//! logged, and misuse (double build, destroying an observed node, inserting
//! an unbuilt view) is recorded as a violation instead of panicking, so tests
//! can assert on it.
//!
//! # JSONL schema
//!
//! ```json
//! {"seq":0,"op":"build","id":3}
//! {"seq":1,"op":"insert","id":3,"index":0}
//! {"seq":2,"op":"scroll_to","px":400,"smooth":false}
//! ```

use std::collections::{HashMap, HashSet};
use std::io::Write;

use feedview_core::{IntersectionEntry, Item, ItemId, NodeBox, Px, ScrollBehavior, ViewportMetrics};
use feedview_widgets::{FrameScheduler, ObservationService, RenderHost, ViewportHost};
use serde::Serialize;

/// Default height of a child box.
pub const DEFAULT_ROW_HEIGHT: Px = 20;

/// One host mutation, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    Build { id: u64 },
    Destroy { id: u64 },
    Insert { id: u64, index: usize },
    Detach { id: u64 },
    SetHidden { id: u64, hidden: bool },
    Observe { id: u64 },
    Unobserve { id: u64 },
    ScrollTo { px: Px, smooth: bool },
}

#[derive(Serialize)]
struct JsonlMutation {
    seq: usize,
    #[serde(flatten)]
    mutation: Mutation,
}

/// Call counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostCounters {
    pub builds: usize,
    pub destroys: usize,
    pub inserts: usize,
    pub detaches: usize,
    pub hides: usize,
    pub observes: usize,
    pub unobserves: usize,
    pub scroll_writes: usize,
    pub frames_requested: usize,
}

/// In-memory container host.
#[derive(Debug, Clone)]
pub struct FakeDom {
    client_height: Px,
    default_height: Px,
    heights: HashMap<ItemId, Px>,
    /// Unclamped stored offset; clamped whenever it is read or written.
    scroll_top: Px,
    smooth_target: Option<Px>,
    /// A native scroll signal is waiting to be delivered.
    scroll_signal: bool,
    built: HashSet<ItemId>,
    attached: Vec<ItemId>,
    hidden: HashSet<ItemId>,
    subscriptions: HashSet<ItemId>,
    /// Last intersection state reported per subscribed node.
    reported: HashMap<ItemId, bool>,
    frame_pending: bool,
    counters: HostCounters,
    log: Vec<Mutation>,
    violations: Vec<String>,
}

impl FakeDom {
    /// Empty container with the given viewport height.
    #[must_use]
    pub fn new(client_height: Px) -> Self {
        Self {
            client_height,
            default_height: DEFAULT_ROW_HEIGHT,
            heights: HashMap::new(),
            scroll_top: 0,
            smooth_target: None,
            scroll_signal: false,
            built: HashSet::new(),
            attached: Vec::new(),
            hidden: HashSet::new(),
            subscriptions: HashSet::new(),
            reported: HashMap::new(),
            frame_pending: false,
            counters: HostCounters::default(),
            log: Vec::new(),
            violations: Vec::new(),
        }
    }

    /// Container that has not been laid out yet (zero client height).
    #[must_use]
    pub fn unlaid() -> Self {
        Self::new(0)
    }

    #[must_use]
    pub fn with_default_height(mut self, height: Px) -> Self {
        self.default_height = height;
        self
    }

    pub fn set_client_height(&mut self, height: Px) {
        self.client_height = height;
    }

    /// Override the height of one child box.
    pub fn set_height(&mut self, id: ItemId, height: Px) {
        self.heights.insert(id, height);
    }

    fn height_of(&self, id: ItemId) -> Px {
        if self.hidden.contains(&id) {
            return 0;
        }
        self.heights.get(&id).copied().unwrap_or(self.default_height)
    }

    fn content_height(&self) -> Px {
        self.attached.iter().map(|id| self.height_of(*id)).sum()
    }

    fn max_scroll_top(&self) -> Px {
        (self.content_height() - self.client_height).max(0)
    }

    fn clamp(&self, px: Px) -> Px {
        px.clamp(0, self.max_scroll_top())
    }

    /// Current clamped scroll offset.
    #[must_use]
    pub fn scroll_top(&self) -> Px {
        self.clamp(self.scroll_top)
    }

    /// Where the node's top edge sits relative to the viewport top.
    #[must_use]
    pub fn on_screen_top(&self, id: ItemId) -> Option<Px> {
        self.node_box(id)
            .map(|node| node.on_screen_top(self.scroll_top()))
    }

    // ------------------------------------------------------------------
    // Simulated environment
    // ------------------------------------------------------------------

    /// The user drags the scrollbar. Cancels a running smooth scroll.
    pub fn user_scroll_to(&mut self, px: Px) {
        self.smooth_target = None;
        self.move_to(px);
    }

    fn move_to(&mut self, px: Px) {
        let before = self.scroll_top();
        self.scroll_top = self.clamp(px);
        if self.scroll_top != before {
            self.scroll_signal = true;
        }
    }

    /// Advance a running smooth scroll by one step and re-clamp the offset
    /// to the current content. Returns whether the offset moved.
    pub fn tick_layout(&mut self) -> bool {
        self.scroll_top = self.scroll_top();
        let Some(target) = self.smooth_target else {
            return false;
        };
        let target = self.clamp(target);
        let before = self.scroll_top;
        let mut next = before + (target - before) / 2;
        if (target - next).abs() <= 1 {
            next = target;
            self.smooth_target = None;
        }
        self.scroll_top = next;
        next != before
    }

    /// Whether a smooth scroll is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.smooth_target.is_some()
    }

    /// Consume the pending frame request.
    pub fn take_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_pending)
    }

    /// Consume the pending native scroll signal.
    pub fn take_scroll_signal(&mut self) -> bool {
        std::mem::take(&mut self.scroll_signal)
    }

    /// Intersection changes since the last call, one entry per node whose
    /// state changed. A node counts as intersecting when at least 1% of its
    /// box overlaps the viewport. New subscriptions always report once.
    pub fn take_intersections(&mut self) -> Vec<IntersectionEntry> {
        let top = self.scroll_top();
        let bottom = top + self.client_height;
        let mut entries = Vec::new();
        let mut offset = 0;
        for id in &self.attached {
            let height = self.height_of(*id);
            let node_top = offset;
            offset += height;
            if !self.subscriptions.contains(id) {
                continue;
            }
            let overlap = (node_top + height).min(bottom) - node_top.max(top);
            let intersecting = height > 0 && overlap > 0 && overlap * 100 >= height;
            if self.reported.get(id) != Some(&intersecting) {
                entries.push(IntersectionEntry {
                    id: *id,
                    is_intersecting: intersecting,
                });
            }
        }
        for entry in &entries {
            self.reported.insert(entry.id, entry.is_intersecting);
        }
        entries
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    #[must_use]
    pub fn attached(&self) -> &[ItemId] {
        &self.attached
    }

    #[must_use]
    pub fn is_built(&self, id: ItemId) -> bool {
        self.built.contains(&id)
    }

    #[must_use]
    pub fn is_hidden(&self, id: ItemId) -> bool {
        self.hidden.contains(&id)
    }

    #[must_use]
    pub fn is_observed(&self, id: ItemId) -> bool {
        self.subscriptions.contains(&id)
    }

    #[must_use]
    pub fn observed_len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn counters(&self) -> HostCounters {
        self.counters
    }

    #[must_use]
    pub fn log(&self) -> &[Mutation] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Misuse recorded so far.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// The mutation log as JSONL, one record per line.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for (seq, mutation) in self.log.iter().enumerate() {
            let row = JsonlMutation {
                seq,
                mutation: *mutation,
            };
            if let Ok(line) = serde_json::to_string(&row) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    /// Write the mutation log as JSONL.
    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(self.to_jsonl().as_bytes())
    }

    fn violation(&mut self, message: String) {
        self.violations.push(message);
    }
}

impl ViewportHost for FakeDom {
    fn viewport(&self) -> ViewportMetrics {
        ViewportMetrics::new(
            self.scroll_top(),
            self.content_height().max(self.client_height),
            self.client_height,
        )
    }

    fn node_box(&self, id: ItemId) -> Option<NodeBox> {
        let mut offset = 0;
        for attached in &self.attached {
            let height = self.height_of(*attached);
            if *attached == id {
                return Some(NodeBox::new(offset, height));
            }
            offset += height;
        }
        None
    }

    fn scroll_to(&mut self, px: Px, behavior: ScrollBehavior) {
        self.counters.scroll_writes += 1;
        self.log.push(Mutation::ScrollTo {
            px,
            smooth: behavior == ScrollBehavior::Smooth,
        });
        match behavior {
            ScrollBehavior::Instant => {
                self.smooth_target = None;
                self.move_to(px);
            }
            ScrollBehavior::Smooth => self.smooth_target = Some(self.clamp(px)),
        }
    }
}

impl<T> RenderHost<T> for FakeDom {
    fn build(&mut self, item: &Item<T>) {
        self.counters.builds += 1;
        self.log.push(Mutation::Build { id: item.id.get() });
        if !self.built.insert(item.id) {
            self.violation(format!("view {} built twice", item.id));
        }
    }

    fn destroy(&mut self, id: ItemId) {
        self.counters.destroys += 1;
        self.log.push(Mutation::Destroy { id: id.get() });
        if !self.built.remove(&id) {
            self.violation(format!("destroyed unknown view {id}"));
        }
        if self.subscriptions.contains(&id) {
            self.violation(format!("view {id} destroyed while observed"));
        }
        self.attached.retain(|attached| *attached != id);
        self.hidden.remove(&id);
    }

    fn insert(&mut self, id: ItemId, index: usize) {
        self.counters.inserts += 1;
        self.log.push(Mutation::Insert {
            id: id.get(),
            index,
        });
        if !self.built.contains(&id) {
            self.violation(format!("inserted unbuilt view {id}"));
        }
        if self.attached.contains(&id) {
            self.violation(format!("view {id} inserted while attached"));
            return;
        }
        if index > self.attached.len() {
            self.violation(format!(
                "view {id} inserted at {index} past {} children",
                self.attached.len()
            ));
        }
        let index = index.min(self.attached.len());
        self.attached.insert(index, id);
    }

    fn detach(&mut self, id: ItemId) {
        self.counters.detaches += 1;
        self.log.push(Mutation::Detach { id: id.get() });
        let before = self.attached.len();
        self.attached.retain(|attached| *attached != id);
        if self.attached.len() == before {
            self.violation(format!("detached view {id} that was not attached"));
        }
    }

    fn set_hidden(&mut self, id: ItemId, hidden: bool) {
        self.counters.hides += 1;
        self.log.push(Mutation::SetHidden {
            id: id.get(),
            hidden,
        });
        if hidden {
            self.hidden.insert(id);
        } else {
            self.hidden.remove(&id);
        }
    }
}

impl FrameScheduler for FakeDom {
    fn request_frame(&mut self) {
        self.counters.frames_requested += 1;
        self.frame_pending = true;
    }
}

impl ObservationService for FakeDom {
    fn observe(&mut self, id: ItemId) {
        self.counters.observes += 1;
        self.log.push(Mutation::Observe { id: id.get() });
        if !self.subscriptions.insert(id) {
            self.violation(format!("view {id} observed twice"));
        }
    }

    fn unobserve(&mut self, id: ItemId) {
        self.counters.unobserves += 1;
        self.log.push(Mutation::Unobserve { id: id.get() });
        if !self.subscriptions.remove(&id) {
            self.violation(format!("view {id} unobserved while not observed"));
        }
        self.reported.remove(&id);
    }
}
