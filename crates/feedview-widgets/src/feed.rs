#![forbid(unsafe_code)]

//! The scroll feed container.
//!
//! [`ScrollFeed`] owns one view per item, keeps their display order equal to
//! the item sequence, and coordinates scroll anchoring, auto-follow, and
//! visibility publication on top of a [`FeedHost`].
//!
//! # Lifecycle
//!
//! ```text
//! set_items ──► reconcile ──► host mutations ──► request_frame
//!                                                     │
//!      on_frame ◄─────────────────────────────────────┘
//!        ├─ observe created views (still attached only)
//!        ├─ restore the scroll anchor
//!        ├─ follow to the bottom
//!        ├─ flush the scroll write, recheck the jump affordance
//!        └─ apply the sequence queued meanwhile, if any
//! ```
//!
//! A sequence handed to [`ScrollFeed::set_items`] while an earlier pass is
//! still waiting for its frame is queued; only the latest queued sequence is
//! kept, and it is diffed once the frame work has run.
//!
//! Outbound notifications accumulate as [`FeedEvent`]s and are taken with
//! [`ScrollFeed::drain_events`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Range;

use bitflags::bitflags;
use feedview_core::{
    ConfigError, FeedConfig, FeedError, FeedEvent, FeedMode, IntersectionEntry, Item, ItemId, Px,
};

use crate::anchor::ScrollAnchor;
use crate::follow::{AutoFollowController, ExplicitJump, FollowDecision, JumpDecision};
use crate::host::FeedHost;
use crate::load_window::LoadWindow;
use crate::reconcile::{MutationStep, ReconcileStats, Transition, check_unique, reconcile};
use crate::scroll_state::ScrollState;
use crate::tail_window::WindowedTailPolicy;
use crate::view::ChildView;
use crate::visibility::VisibilityTracker;

bitflags! {
    /// Derived outbound state that must be recomputed before events flush.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    struct Dirty: u8 {
        const VISIBILITY    = 0b01;
        const SCROLL_BUTTON = 0b10;
    }
}

/// Work deferred to the next frame callback.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FrameTask {
    /// Subscribe newly attached views.
    Observe(Vec<ItemId>),
    RestoreAnchor,
    /// Scroll to the bottom of the content as laid out at frame time.
    Follow,
    ScrollToItem(ItemId),
}

/// Result of [`ScrollFeed::set_items`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The sequence was reconciled immediately.
    Applied(Transition),
    /// A pass is still settling; the sequence waits for the next frame.
    Deferred,
}

/// Scrollable container of item views.
pub struct ScrollFeed<T, H: FeedHost<T>> {
    host: H,
    config: FeedConfig,
    views: HashMap<ItemId, ChildView<T>>,
    /// Display order; always equal to the last applied item sequence.
    order: Vec<ItemId>,
    scroll: ScrollState,
    visibility: VisibilityTracker,
    anchor: ScrollAnchor,
    follow: AutoFollowController,
    tail: WindowedTailPolicy,
    load_window: LoadWindow,
    tasks: Vec<FrameTask>,
    /// Set from the end of a reconciliation pass until its frame work ran.
    settling: bool,
    queued: Option<Vec<Item<T>>>,
    dirty: Dirty,
    button_visible: bool,
    visible_range: Option<Range<usize>>,
    events: VecDeque<FeedEvent>,
    stats: ReconcileStats,
}

impl<T, H: FeedHost<T>> ScrollFeed<T, H> {
    /// Create an empty feed on top of `host`.
    pub fn new(host: H, config: FeedConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            follow: AutoFollowController::new(&config),
            tail: WindowedTailPolicy::new(config.min_visible_tail),
            load_window: LoadWindow::new(config.load_buffer),
            host,
            config,
            views: HashMap::new(),
            order: Vec::new(),
            scroll: ScrollState::new(),
            visibility: VisibilityTracker::new(),
            anchor: ScrollAnchor::new(),
            tasks: Vec::new(),
            settling: false,
            queued: None,
            dirty: Dirty::empty(),
            button_visible: false,
            visible_range: None,
            events: VecDeque::new(),
            stats: ReconcileStats::default(),
        })
    }

    // ------------------------------------------------------------------
    // Item sequence
    // ------------------------------------------------------------------

    /// Replace the item sequence.
    ///
    /// Rejects sequences containing an id twice before touching any state.
    /// While an earlier pass is settling the sequence is queued instead,
    /// replacing any sequence queued before it.
    pub fn set_items(&mut self, items: Vec<Item<T>>) -> Result<ApplyOutcome, FeedError> {
        let ids: Vec<ItemId> = items.iter().map(|item| item.id).collect();
        check_unique(&ids)?;

        if self.settling {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                len = ids.len(),
                replaced = self.queued.is_some(),
                "sequence deferred until frame"
            );
            self.queued = Some(items);
            self.stats.deferred += 1;
            return Ok(ApplyOutcome::Deferred);
        }

        self.apply_items(items, &ids).map(ApplyOutcome::Applied)
    }

    fn apply_items(&mut self, items: Vec<Item<T>>, ids: &[ItemId]) -> Result<Transition, FeedError> {
        let before = self.host.viewport();
        let plan = reconcile(&self.order, ids)?;
        let transition = plan.transition();
        self.stats.record(transition);

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "feed_reconcile",
            transition = transition.as_str(),
            created = plan.created().len(),
            removed = plan.removed().len(),
            len = ids.len()
        )
        .entered();

        let mut incoming: HashMap<ItemId, Item<T>> =
            items.into_iter().map(|item| (item.id, item)).collect();

        if transition == Transition::Unchanged {
            self.refresh_payloads(incoming);
            return Ok(transition);
        }

        self.visibility.set_synchronizing(true);
        let tracked = self.config.mode == FeedMode::Tracked;
        if tracked && plan.shifts_head() {
            let removed: HashSet<ItemId> = plan.removed().iter().copied().collect();
            let survivors: Vec<ItemId> = self
                .order
                .iter()
                .filter(|id| !removed.contains(id))
                .copied()
                .collect();
            self.anchor
                .capture(&self.visibility, &survivors, &self.host);
        }
        let decision = self.follow.on_content_changed(before, !ids.is_empty());
        #[cfg(feature = "tracing")]
        tracing::debug!(?decision, "follow decision");

        for step in plan.steps() {
            match *step {
                MutationStep::Detach(id) => {
                    self.host.detach(id);
                    if let Some(view) = self.views.get_mut(&id) {
                        view.set_attached(false);
                    }
                    self.stats.detached += 1;
                }
                MutationStep::Destroy(id) => {
                    self.visibility.unobserve(id, &mut self.host);
                    self.host.destroy(id);
                    self.views.remove(&id);
                    self.stats.destroyed += 1;
                }
                MutationStep::Build(id) => {
                    if let Some(item) = incoming.remove(&id) {
                        self.host.build(&item);
                        self.views.insert(id, ChildView::new(item));
                        self.stats.built += 1;
                    }
                }
                MutationStep::Insert { id, index } => {
                    self.host.insert(id, index);
                    if let Some(view) = self.views.get_mut(&id) {
                        view.set_attached(true);
                    }
                    self.stats.inserted += 1;
                }
            }
        }
        self.refresh_payloads(incoming);

        let created = plan.created().to_vec();
        self.order = plan.into_order();
        self.visibility.set_synchronizing(false);
        self.dirty |= Dirty::VISIBILITY;

        if tracked {
            if !created.is_empty() {
                self.tasks.push(FrameTask::Observe(created));
            }
            if self.anchor.pending().is_some() {
                self.tasks.push(FrameTask::RestoreAnchor);
            }
        } else {
            self.apply_tail();
        }
        if decision == FollowDecision::Follow {
            self.tasks.push(FrameTask::Follow);
        }

        // Geometry is only read back inside the frame, after layout.
        self.settling = true;
        self.host.request_frame();
        self.flush_events();
        Ok(transition)
    }

    /// Hand the latest payloads of surviving items to their views.
    fn refresh_payloads(&mut self, incoming: HashMap<ItemId, Item<T>>) {
        for (id, item) in incoming {
            if let Some(view) = self.views.get_mut(&id) {
                view.set_payload(item.payload);
            }
        }
    }

    /// Recompute hidden flags for the trailing window.
    fn apply_tail(&mut self) {
        for (id, hidden) in self.tail.hidden_flags(&self.order) {
            let Some(view) = self.views.get_mut(&id) else {
                continue;
            };
            if view.is_hidden() != hidden {
                self.host.set_hidden(id, hidden);
                view.set_hidden(hidden);
            }
        }
        self.visibility
            .assign_visible(self.tail.shown(&self.order).iter().copied());
        self.dirty |= Dirty::VISIBILITY;
    }

    /// Destroy and rebuild every view in display order.
    pub fn rebuild(&mut self) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("feed_rebuild", len = self.order.len()).entered();

        self.visibility.set_synchronizing(true);
        for id in &self.order {
            self.visibility.unobserve(*id, &mut self.host);
            self.host.destroy(*id);
            self.stats.destroyed += 1;
        }
        for (index, id) in self.order.iter().enumerate() {
            let Some(view) = self.views.get_mut(id) else {
                continue;
            };
            self.host.build(view.item());
            self.host.insert(*id, index);
            view.set_attached(true);
            view.set_hidden(false);
            self.stats.built += 1;
            self.stats.inserted += 1;
        }
        self.visibility.set_synchronizing(false);
        self.dirty |= Dirty::VISIBILITY;

        if self.config.mode == FeedMode::Tracked {
            if !self.order.is_empty() {
                self.tasks.push(FrameTask::Observe(self.order.clone()));
            }
        } else {
            self.apply_tail();
        }
        self.settling = true;
        self.host.request_frame();
        self.flush_events();
    }

    /// Release every subscription and destroy every view.
    ///
    /// The feed is left empty; pending frame work, the queued sequence and
    /// any captured anchor are dropped.
    pub fn teardown(&mut self) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("feed_teardown", len = self.order.len()).entered();

        self.visibility.unobserve_all(&mut self.host);
        self.anchor.clear();
        for id in std::mem::take(&mut self.order) {
            self.host.destroy(id);
            self.stats.destroyed += 1;
        }
        self.views.clear();
        self.tasks.clear();
        self.queued = None;
        self.settling = false;
        self.dirty |= Dirty::VISIBILITY;
        self.flush_events();
    }

    /// Tear the feed down and hand back its host.
    #[must_use]
    pub fn into_host(mut self) -> H {
        self.teardown();
        self.host
    }

    // ------------------------------------------------------------------
    // Host callbacks
    // ------------------------------------------------------------------

    /// Run the work deferred to this frame. Call after layout.
    pub fn on_frame(&mut self) {
        for task in std::mem::take(&mut self.tasks) {
            self.run_task(task);
        }
        if let Some(px) = self.scroll.flush(&mut self.host) {
            self.events.push_back(FeedEvent::ScrollPositionChanged(px));
        }
        self.dirty |= Dirty::SCROLL_BUTTON;
        self.settling = false;
        if self.scroll.needs_frame() || !self.tasks.is_empty() {
            self.host.request_frame();
        }
        self.flush_events();

        if let Some(items) = self.queued.take() {
            let ids: Vec<ItemId> = items.iter().map(|item| item.id).collect();
            if let Err(_err) = self.apply_items(items, &ids) {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %_err, "queued sequence rejected");
            }
        }
    }

    fn run_task(&mut self, task: FrameTask) {
        match task {
            FrameTask::Observe(ids) => {
                for id in ids {
                    let attached = self.views.get(&id).is_some_and(ChildView::is_attached);
                    if attached {
                        self.visibility.observe(id, &mut self.host);
                    }
                }
            }
            FrameTask::RestoreAnchor => {
                self.anchor.restore(
                    &self.host,
                    &mut self.scroll,
                    self.config.anchor_behavior,
                );
            }
            FrameTask::Follow => {
                let bottom = self.host.viewport().scroll_height;
                self.scroll
                    .set_scroll_position(bottom, self.config.scroll_behavior);
            }
            FrameTask::ScrollToItem(id) => {
                if let Some(node) = self.host.node_box(id) {
                    self.scroll
                        .set_scroll_position(node.offset_top, self.config.scroll_behavior);
                }
            }
        }
    }

    /// Handle a native scroll signal from the container.
    pub fn on_native_scroll(&mut self) {
        if let Some(px) = self.scroll.record_user_scroll(&self.host) {
            self.events.push_back(FeedEvent::ScrollPositionChanged(px));
        }
        self.dirty |= Dirty::SCROLL_BUTTON;
        self.flush_events();
    }

    /// Apply an intersection batch delivered by the observation service.
    ///
    /// Ignored in [`FeedMode::WindowedTail`], which decides visibility itself.
    pub fn on_intersections(&mut self, entries: &[IntersectionEntry]) {
        if self.config.mode == FeedMode::WindowedTail {
            return;
        }
        if self.visibility.on_intersection_batch(entries) {
            self.dirty |= Dirty::VISIBILITY;
        }
        self.flush_events();
    }

    fn flush_events(&mut self) {
        if self.dirty.contains(Dirty::VISIBILITY) && !self.visibility.is_synchronizing() {
            self.dirty.remove(Dirty::VISIBILITY);
            if let Some(visible) = self.visibility.publish(&self.order) {
                self.events.push_back(FeedEvent::VisibleItemsChanged(visible));
            }
            let range = self.visibility.visible_range(&self.order);
            if range != self.visible_range {
                self.visible_range.clone_from(&range);
                if let Some(range) = range {
                    self.events.push_back(FeedEvent::VisibleRangeChanged(range));
                }
            }
        }

        if self.dirty.contains(Dirty::SCROLL_BUTTON) {
            self.dirty.remove(Dirty::SCROLL_BUTTON);
            if let Some(visible) = self.follow.jump_button_visible(self.host.viewport())
                && visible != self.button_visible
            {
                self.button_visible = visible;
                self.events
                    .push_back(FeedEvent::ScrollButtonVisibility(visible));
            }
        }
    }

    // ------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------

    /// Canonical scroll position.
    #[must_use]
    pub fn scroll_position(&self) -> Px {
        self.scroll.position()
    }

    /// Scroll to `px` on the next frame.
    pub fn set_scroll_position(&mut self, px: Px) {
        self.scroll
            .set_scroll_position(px, self.config.scroll_behavior);
        self.host.request_frame();
    }

    /// Bring the top edge of an item's view to the top of the viewport on
    /// the next frame.
    pub fn scroll_to_item(&mut self, id: ItemId) -> Result<(), FeedError> {
        if !self.views.contains_key(&id) {
            return Err(FeedError::UnknownItem { id });
        }
        self.tasks.push(FrameTask::ScrollToItem(id));
        self.host.request_frame();
        Ok(())
    }

    /// Explicit "scroll to latest". Returns whether a jump was scheduled.
    pub fn scroll_to_latest(&mut self, jump: ExplicitJump) -> bool {
        let decision = self.follow.on_explicit_jump(jump, self.host.viewport());
        #[cfg(feature = "tracing")]
        tracing::debug!(?decision, "explicit jump");
        let JumpDecision::Jump { rerender } = decision else {
            return false;
        };
        if rerender {
            self.rebuild();
        }
        self.tasks.push(FrameTask::Follow);
        self.host.request_frame();
        true
    }

    /// The user pressed the "jump to latest" affordance.
    pub fn actuate_jump_button(&mut self) -> bool {
        self.events.push_back(FeedEvent::JumpToLatest);
        self.scroll_to_latest(ExplicitJump::new())
    }

    /// Force the next non-empty content change to follow to the bottom.
    pub fn stick_to_latest(&mut self) {
        self.follow.stick_to_latest();
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Change the auto-follow limit; 0 disables auto-follow.
    pub fn set_auto_scroll_limit(&mut self, limit: u32) -> Result<(), ConfigError> {
        let config = self.config.clone().with_auto_scroll_limit(limit);
        config.validate()?;
        self.config = config;
        self.follow
            .set_auto_scroll_limit(self.config.auto_scroll_limit_px());
        Ok(())
    }

    /// Change the affordance threshold; 0 never shows it.
    pub fn set_scroll_button_threshold(&mut self, threshold: u32) -> Result<(), ConfigError> {
        let config = self.config.clone().with_scroll_button_threshold(threshold);
        config.validate()?;
        self.config = config;
        self.follow
            .set_button_threshold(self.config.scroll_button_threshold_px());
        if self.config.scroll_button_threshold_px().is_none() && self.button_visible {
            self.button_visible = false;
            self.events
                .push_back(FeedEvent::ScrollButtonVisibility(false));
        }
        self.dirty |= Dirty::SCROLL_BUTTON;
        self.flush_events();
        Ok(())
    }

    /// Change the trailing window size of [`FeedMode::WindowedTail`].
    pub fn set_min_visible_tail(&mut self, count: usize) {
        self.config.min_visible_tail = count;
        self.tail.set_min_visible(count);
        if self.config.mode == FeedMode::WindowedTail {
            self.apply_tail();
            self.flush_events();
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Take every pending outbound event, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = FeedEvent> + '_ {
        self.events.drain(..)
    }

    #[must_use]
    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    /// Current visible set, in display order.
    #[must_use]
    pub fn visible_items(&self) -> Vec<ItemId> {
        self.visibility.in_display_order(&self.order)
    }

    /// Display indices of the first through last visible view.
    #[must_use]
    pub fn visible_range(&self) -> Option<Range<usize>> {
        self.visibility.visible_range(&self.order)
    }

    #[must_use]
    pub fn load_window(&self) -> LoadWindow {
        self.load_window
    }

    /// Whether the jump affordance is currently shown.
    #[must_use]
    pub fn is_jump_button_visible(&self) -> bool {
        self.button_visible
    }

    /// Ids in display order.
    #[must_use]
    pub fn ids(&self) -> &[ItemId] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn view(&self, id: ItemId) -> Option<&ChildView<T>> {
        self.views.get(&id)
    }

    #[must_use]
    pub fn payload(&self, id: ItemId) -> Option<&T> {
        self.views.get(&id).map(ChildView::payload)
    }

    /// Whether a pass is waiting for its frame work.
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.settling
    }

    /// Whether a sequence is queued behind the settling pass.
    #[must_use]
    pub fn has_queued(&self) -> bool {
        self.queued.is_some()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<T, H: FeedHost<T>> std::fmt::Debug for ScrollFeed<T, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollFeed")
            .field("mode", &self.config.mode)
            .field("len", &self.order.len())
            .field("scroll", &self.scroll)
            .field("settling", &self.settling)
            .field("queued", &self.queued.is_some())
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}
