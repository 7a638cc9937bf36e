#![forbid(unsafe_code)]

//! End-to-end behavior of `ScrollFeed` on the fake host.
//!
//! Geometry used throughout unless noted: rows are 20px tall and the
//! viewport is 200px, so ten rows fit on screen.

use feedview_core::{FeedConfig, FeedError, FeedEvent, FeedMode, ItemId, ScrollBehavior};
use feedview_harness::{FakeDom, TestFeed, drain, ids, items, last_visible, settle, user_scroll};
use feedview_widgets::{ApplyOutcome, ExplicitJump, LoadWindow, Transition};
use proptest::prelude::*;

fn feed_with(config: FeedConfig) -> TestFeed<()> {
    TestFeed::new(FakeDom::new(200), config).unwrap()
}

fn loaded(config: FeedConfig, count: u64) -> TestFeed<()> {
    let mut feed = feed_with(config);
    feed.set_items(items(0..count)).unwrap();
    settle(&mut feed);
    drain(&mut feed);
    feed
}

fn assert_clean(feed: &TestFeed<()>) {
    assert!(
        feed.host().violations().is_empty(),
        "host misuse: {:?}\n{}",
        feed.host().violations(),
        feed.host().to_jsonl()
    );
}

// ============================================================================
// Reconciliation
// ============================================================================

#[test]
fn append_never_detaches_survivors() {
    let mut feed = loaded(FeedConfig::default(), 30);
    let before = feed.host().counters();

    feed.set_items(items(0..35)).unwrap();
    settle(&mut feed);

    let after = feed.host().counters();
    assert_eq!(after.detaches, before.detaches);
    assert_eq!(after.builds - before.builds, 5);
    assert_eq!(after.inserts - before.inserts, 5);
    assert_eq!(feed.host().attached(), ids(0..35).as_slice());
    assert_clean(&feed);
}

#[test]
fn prepend_never_detaches_survivors() {
    let mut feed = loaded(FeedConfig::default(), 30);
    let mut next = items(30..40);
    next.extend(items(0..30));
    feed.set_items(next).unwrap();
    settle(&mut feed);

    let mut expected = ids(30..40);
    expected.extend(ids(0..30));
    assert_eq!(feed.ids(), expected.as_slice());
    assert_eq!(feed.host().counters().detaches, 0);
    assert_eq!(feed.stats().prepends, 1);
    assert_clean(&feed);
}

#[test]
fn reorder_rebuilds_order_and_releases_removed_views() {
    let mut feed = loaded(FeedConfig::default(), 10);
    let new = [9, 2, 11, 4, 0];

    let outcome = feed.set_items(items(new)).unwrap();
    assert_eq!(outcome, ApplyOutcome::Applied(Transition::Reorder));
    settle(&mut feed);

    assert_eq!(feed.host().attached(), ids(new).as_slice());
    for removed in [1, 3, 5, 6, 7, 8] {
        assert!(!feed.host().is_built(ItemId(removed)));
        assert!(!feed.host().is_observed(ItemId(removed)));
    }
    assert_eq!(feed.host().observed_len(), new.len());
    assert_clean(&feed);
}

#[test]
fn removed_then_readded_item_gets_a_fresh_view() {
    let mut feed = loaded(FeedConfig::default(), 5);
    feed.set_items(items([0, 1, 3, 4])).unwrap();
    settle(&mut feed);
    feed.set_items(items(0..5)).unwrap();
    settle(&mut feed);

    assert_eq!(feed.host().counters().builds, 6);
    assert_eq!(feed.host().counters().destroys, 1);
    assert!(feed.host().is_observed(ItemId(2)));
    assert_clean(&feed);
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut feed = loaded(FeedConfig::default(), 3);
    let err = feed.set_items(items([0, 1, 2, 1])).unwrap_err();
    assert!(matches!(err, FeedError::DuplicateItem { id: ItemId(1), .. }));
    assert_eq!(feed.ids(), ids(0..3).as_slice());
}

// ============================================================================
// Deferred sequences
// ============================================================================

#[test]
fn sequence_arriving_mid_settle_is_queued_latest_wins() {
    let mut feed = feed_with(FeedConfig::default());
    feed.set_items(items(0..10)).unwrap();
    assert!(feed.is_settling());

    assert_eq!(feed.set_items(items(0..5)).unwrap(), ApplyOutcome::Deferred);
    assert_eq!(feed.set_items(items(0..12)).unwrap(), ApplyOutcome::Deferred);
    assert!(feed.has_queued());

    settle(&mut feed);
    assert_eq!(feed.ids(), ids(0..12).as_slice());
    assert_eq!(feed.host().observed_len(), 12);
    assert_eq!(feed.stats().deferred, 2);
    assert_clean(&feed);
}

#[test]
fn queued_removal_unobserves_before_destroy() {
    let mut feed = feed_with(FeedConfig::default());
    feed.set_items(items(0..10)).unwrap();
    feed.set_items(items(0..4)).unwrap();
    settle(&mut feed);

    assert_eq!(feed.host().observed_len(), 4);
    assert_clean(&feed);
}

// ============================================================================
// Prepend anchoring
// ============================================================================

#[test]
fn prepend_keeps_topmost_visible_item_in_place() {
    let mut feed = loaded(FeedConfig::default(), 50);
    user_scroll(&mut feed, 800);
    settle(&mut feed);
    assert_eq!(feed.visible_items().first(), Some(&ItemId(40)));
    let screen_before = feed.host().on_screen_top(ItemId(40)).unwrap();

    let mut next = items(100..110);
    next.extend(items(0..50));
    feed.set_items(next).unwrap();
    settle(&mut feed);

    let screen_after = feed.host().on_screen_top(ItemId(40)).unwrap();
    assert!((screen_after - screen_before).abs() <= 1);
    assert_eq!(feed.scroll_position(), 800 + 10 * 20);
    assert_eq!(feed.visible_items().first(), Some(&ItemId(40)));
    assert_clean(&feed);
}

#[test]
fn prepend_with_varied_heights_shifts_by_inserted_height() {
    let mut feed = loaded(FeedConfig::default(), 50);
    user_scroll(&mut feed, 500);
    settle(&mut feed);
    let screen_before = feed.host().on_screen_top(ItemId(25)).unwrap();

    feed.host_mut().set_height(ItemId(200), 75);
    feed.host_mut().set_height(ItemId(201), 33);
    let mut next = items(200..202);
    next.extend(items(0..50));
    feed.set_items(next).unwrap();
    settle(&mut feed);

    assert_eq!(feed.scroll_position(), 500 + 75 + 33);
    assert_eq!(feed.host().on_screen_top(ItemId(25)), Some(screen_before));
}

#[test]
fn prepend_with_nothing_visible_does_not_scroll() {
    let mut feed = feed_with(FeedConfig::default());
    feed.set_items(items(10..20)).unwrap();
    // No frame yet: nothing is observed, nothing is visible.
    feed.host_mut().take_frame();
    feed.on_frame();
    let writes = feed.host().counters().scroll_writes;

    // Items arrive before any intersection batch was delivered.
    feed.set_items(items(0..20)).unwrap();
    settle(&mut feed);
    assert_eq!(feed.host().counters().scroll_writes, writes);
    assert_eq!(feed.scroll_position(), 0);
}

#[test]
fn smooth_anchor_correction_settles_on_target() {
    let config = FeedConfig::default().with_anchor_behavior(ScrollBehavior::Smooth);
    let mut feed = loaded(config, 50);
    user_scroll(&mut feed, 600);
    settle(&mut feed);
    drain(&mut feed);

    let mut next = items(100..105);
    next.extend(items(0..50));
    feed.set_items(next).unwrap();
    settle(&mut feed);

    assert_eq!(feed.scroll_position(), 700);
    let positions: Vec<_> = drain(&mut feed)
        .into_iter()
        .filter(|event| matches!(event, FeedEvent::ScrollPositionChanged(_)))
        .collect();
    assert_eq!(positions, vec![FeedEvent::ScrollPositionChanged(700)]);
}

// ============================================================================
// Auto-follow
// ============================================================================

#[test]
fn auto_follow_within_limit() {
    let mut feed = loaded(FeedConfig::default().with_auto_scroll_limit(50), 50);
    user_scroll(&mut feed, 770);

    feed.set_items(items(0..55)).unwrap();
    settle(&mut feed);
    assert_eq!(feed.scroll_position(), 55 * 20 - 200);
}

#[test]
fn auto_follow_skips_beyond_limit() {
    let mut feed = loaded(FeedConfig::default().with_auto_scroll_limit(50), 50);
    user_scroll(&mut feed, 600);

    feed.set_items(items(0..55)).unwrap();
    settle(&mut feed);
    assert_eq!(feed.scroll_position(), 600);
}

#[test]
fn auto_follow_disabled_by_zero_limit() {
    let mut feed = loaded(FeedConfig::default(), 50);
    user_scroll(&mut feed, 800);

    feed.set_items(items(0..55)).unwrap();
    settle(&mut feed);
    assert_eq!(feed.scroll_position(), 800);
}

#[test]
fn indeterminate_geometry_never_follows() {
    let config = FeedConfig::default()
        .with_auto_scroll_limit(50)
        .with_scroll_button_threshold(10);
    let mut feed = TestFeed::new(FakeDom::unlaid(), config).unwrap();
    feed.set_items(items(0..5)).unwrap();
    settle(&mut feed);
    feed.set_items(items(0..8)).unwrap();
    settle(&mut feed);

    assert_eq!(feed.host().counters().scroll_writes, 0);
    assert!(!drain(&mut feed)
        .iter()
        .any(|event| matches!(event, FeedEvent::ScrollButtonVisibility(_))));
}

#[test]
fn view_latest_on_load_jumps_on_first_content() {
    let config = FeedConfig::default().with_view_latest_on_load(true);
    let mut feed = feed_with(config);

    feed.set_items(Vec::new()).unwrap();
    settle(&mut feed);
    assert_eq!(feed.scroll_position(), 0);

    feed.set_items(items(0..50)).unwrap();
    settle(&mut feed);
    assert_eq!(feed.scroll_position(), 800);
    assert_eq!(feed.visible_items(), ids(40..50));

    // One-shot: a later change far from the bottom does not follow.
    user_scroll(&mut feed, 0);
    feed.set_items(items(0..60)).unwrap();
    settle(&mut feed);
    assert_eq!(feed.scroll_position(), 0);
}

#[test]
fn stick_to_latest_forces_next_change() {
    let mut feed = loaded(FeedConfig::default(), 50);
    feed.stick_to_latest();
    feed.set_items(items(0..51)).unwrap();
    settle(&mut feed);
    assert_eq!(feed.scroll_position(), 51 * 20 - 200);
}

// ============================================================================
// Explicit jump and the jump affordance
// ============================================================================

#[test]
fn explicit_jump_ignores_auto_limit() {
    let mut feed = loaded(FeedConfig::default(), 50);
    assert!(feed.scroll_to_latest(ExplicitJump::new()));
    settle(&mut feed);
    assert_eq!(feed.scroll_position(), 800);
}

#[test]
fn explicit_jump_override_limit() {
    let mut feed = loaded(FeedConfig::default(), 50);
    user_scroll(&mut feed, 100);
    assert!(!feed.scroll_to_latest(ExplicitJump::new().within(300)));

    user_scroll(&mut feed, 600);
    assert!(feed.scroll_to_latest(ExplicitJump::new().within(300)));
    settle(&mut feed);
    assert_eq!(feed.scroll_position(), 800);
}

#[test]
fn explicit_jump_with_rerender_rebuilds_all_views() {
    let mut feed = loaded(FeedConfig::default(), 20);
    assert!(feed.scroll_to_latest(ExplicitJump::rerender()));
    settle(&mut feed);

    let counters = feed.host().counters();
    assert_eq!(counters.builds, 40);
    assert_eq!(counters.destroys, 20);
    assert_eq!(feed.host().attached(), ids(0..20).as_slice());
    assert_eq!(feed.host().observed_len(), 20);
    assert_eq!(feed.scroll_position(), 200);
    assert_clean(&feed);
}

#[test]
fn jump_button_visibility_follows_distance() {
    let config = FeedConfig::default().with_scroll_button_threshold(100);
    let mut feed = feed_with(config);
    feed.set_items(items(0..50)).unwrap();
    settle(&mut feed);
    let events = drain(&mut feed);
    assert!(events.contains(&FeedEvent::ScrollButtonVisibility(true)));
    assert!(feed.is_jump_button_visible());

    assert!(feed.actuate_jump_button());
    settle(&mut feed);
    let events = drain(&mut feed);
    assert_eq!(events.first(), Some(&FeedEvent::JumpToLatest));
    assert!(events.contains(&FeedEvent::ScrollButtonVisibility(false)));
    assert!(!feed.is_jump_button_visible());

    // Within the threshold: no flip, no event.
    user_scroll(&mut feed, 750);
    assert!(!drain(&mut feed)
        .iter()
        .any(|event| matches!(event, FeedEvent::ScrollButtonVisibility(_))));

    user_scroll(&mut feed, 650);
    assert!(drain(&mut feed).contains(&FeedEvent::ScrollButtonVisibility(true)));

    // Disabling the affordance hides it.
    feed.set_scroll_button_threshold(0).unwrap();
    assert_eq!(drain(&mut feed), vec![FeedEvent::ScrollButtonVisibility(false)]);
    assert!(!feed.is_jump_button_visible());
}

#[test]
fn jump_button_is_rechecked_after_layout_of_a_removal() {
    let config = FeedConfig::default().with_scroll_button_threshold(100);
    let mut feed = loaded(config, 50);
    assert!(feed.is_jump_button_visible());

    feed.set_items(items(0..10)).unwrap();
    assert!(feed.is_settling());
    assert!(feed.is_jump_button_visible());
    assert!(!drain(&mut feed)
        .iter()
        .any(|event| matches!(event, FeedEvent::ScrollButtonVisibility(_))));

    settle(&mut feed);
    assert!(drain(&mut feed).contains(&FeedEvent::ScrollButtonVisibility(false)));
    assert!(!feed.is_jump_button_visible());
}

// ============================================================================
// Scroll position
// ============================================================================

#[test]
fn programmatic_write_survives_synchronous_native_scroll() {
    let mut feed = loaded(FeedConfig::default(), 50);

    feed.set_scroll_position(500);
    feed.host_mut().user_scroll_to(250);
    feed.on_native_scroll();
    assert_eq!(feed.scroll_position(), 0);

    settle(&mut feed);
    assert_eq!(feed.scroll_position(), 500);
    assert_eq!(feed.host().scroll_top(), 500);
    let events = drain(&mut feed);
    assert!(!events.contains(&FeedEvent::ScrollPositionChanged(250)));
}

#[test]
fn setting_current_position_is_silent() {
    let mut feed = loaded(FeedConfig::default(), 50);
    user_scroll(&mut feed, 300);
    drain(&mut feed);

    feed.set_scroll_position(300);
    settle(&mut feed);
    assert!(!drain(&mut feed)
        .iter()
        .any(|event| matches!(event, FeedEvent::ScrollPositionChanged(_))));
}

#[test]
fn out_of_range_write_publishes_clamped_offset() {
    let mut feed = loaded(FeedConfig::default(), 50);
    feed.set_scroll_position(10_000);
    settle(&mut feed);
    assert_eq!(feed.scroll_position(), 800);
}

#[test]
fn smooth_write_publishes_only_final_offset() {
    let config = FeedConfig::default().with_scroll_behavior(ScrollBehavior::Smooth);
    let mut feed = loaded(config, 50);

    feed.set_scroll_position(600);
    settle(&mut feed);

    assert_eq!(feed.scroll_position(), 600);
    let positions: Vec<_> = drain(&mut feed)
        .into_iter()
        .filter(|event| matches!(event, FeedEvent::ScrollPositionChanged(_)))
        .collect();
    assert_eq!(positions, vec![FeedEvent::ScrollPositionChanged(600)]);
}

#[test]
fn smooth_write_waits_for_the_host_to_start_animating() {
    let config = FeedConfig::default().with_scroll_behavior(ScrollBehavior::Smooth);
    let mut feed = loaded(config, 50);

    feed.set_scroll_position(600);
    // Two frames run before the host steps the animation once.
    assert!(feed.host_mut().take_frame());
    feed.on_frame();
    assert!(feed.host_mut().take_frame());
    feed.on_frame();
    settle(&mut feed);

    assert_eq!(feed.scroll_position(), 600);
    let positions: Vec<_> = drain(&mut feed)
        .into_iter()
        .filter(|event| matches!(event, FeedEvent::ScrollPositionChanged(_)))
        .collect();
    assert_eq!(positions, vec![FeedEvent::ScrollPositionChanged(600)]);
}

#[test]
fn scroll_to_item_brings_it_to_the_top() {
    let mut feed = loaded(FeedConfig::default(), 50);
    feed.scroll_to_item(ItemId(17)).unwrap();
    settle(&mut feed);
    assert_eq!(feed.host().on_screen_top(ItemId(17)), Some(0));
    assert_eq!(feed.visible_items().first(), Some(&ItemId(17)));

    assert_eq!(
        feed.scroll_to_item(ItemId(99)),
        Err(FeedError::UnknownItem { id: ItemId(99) })
    );
}

// ============================================================================
// Visibility
// ============================================================================

#[test]
fn visible_set_is_published_in_display_order() {
    let mut feed = feed_with(FeedConfig::default());
    feed.set_items(items(0..30)).unwrap();
    settle(&mut feed);
    let events = drain(&mut feed);
    assert_eq!(last_visible(&events), Some(ids(0..10).as_slice()));
    assert!(events.contains(&FeedEvent::VisibleRangeChanged(0..10)));

    user_scroll(&mut feed, 110);
    settle(&mut feed);
    let events = drain(&mut feed);
    // Rows 5 and 15 are partially on screen.
    assert_eq!(last_visible(&events), Some(ids(5..16).as_slice()));
}

#[test]
fn removed_items_leave_the_visible_set() {
    let mut feed = loaded(FeedConfig::default(), 30);
    feed.set_items(items(5..30)).unwrap();
    let events = drain(&mut feed);
    let published = last_visible(&events).unwrap_or_default();
    assert!(published.iter().all(|id| id.get() >= 5));

    settle(&mut feed);
    assert_eq!(feed.visible_items(), ids(5..15));
}

#[test]
fn no_transient_snapshot_during_reorder() {
    let mut feed = loaded(FeedConfig::default(), 10);
    let reversed: Vec<u64> = (0..10).rev().collect();
    feed.set_items(items(reversed)).unwrap();
    settle(&mut feed);

    // Same ids on screen, only their order changed.
    let events = drain(&mut feed);
    let published: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            FeedEvent::VisibleItemsChanged(ids) => Some(ids.clone()),
            _ => None,
        })
        .collect();
    assert!(published.is_empty(), "unexpected snapshots: {published:?}");
    assert_eq!(feed.visible_items(), ids((0..10).rev()));
}

#[test]
fn visible_range_feeds_the_load_window() {
    let config = FeedConfig::default().with_load_buffer(5);
    let mut feed = loaded(config, 100);
    user_scroll(&mut feed, 1000);
    settle(&mut feed);

    let range = feed.visible_range().unwrap();
    assert_eq!(range, 50..60);
    let window: LoadWindow = feed.load_window();
    assert_eq!(window.expand(range, feed.len()), 45..65);
}

#[test]
fn load_window_sliding_up_keeps_content_in_place() {
    let mut feed = feed_with(FeedConfig::default());
    feed.set_items(items(40..80)).unwrap();
    settle(&mut feed);
    user_scroll(&mut feed, 60);
    settle(&mut feed);
    assert_eq!(feed.visible_items().first(), Some(&ItemId(43)));
    assert_eq!(feed.host().on_screen_top(ItemId(43)), Some(0));
    let detaches = feed.host().counters().detaches;

    let outcome = feed.set_items(items(30..70)).unwrap();
    assert_eq!(outcome, ApplyOutcome::Applied(Transition::Slide));
    settle(&mut feed);

    assert_eq!(feed.host().on_screen_top(ItemId(43)), Some(0));
    assert_eq!(feed.scroll_position(), 60 + 10 * 20);
    assert_eq!(feed.visible_items().first(), Some(&ItemId(43)));
    assert_eq!(feed.host().counters().detaches, detaches);
    assert_eq!(feed.host().attached(), ids(30..70).as_slice());
    assert_clean(&feed);
}

#[test]
fn load_window_sliding_down_keeps_content_in_place() {
    let mut feed = feed_with(FeedConfig::default());
    feed.set_items(items(40..80)).unwrap();
    settle(&mut feed);
    user_scroll(&mut feed, 300);
    settle(&mut feed);
    assert_eq!(feed.visible_items().first(), Some(&ItemId(55)));

    feed.set_items(items(50..90)).unwrap();
    settle(&mut feed);

    assert_eq!(feed.host().on_screen_top(ItemId(55)), Some(0));
    assert_eq!(feed.scroll_position(), 300 - 10 * 20);
    assert_eq!(feed.host().counters().detaches, 0);
    assert_eq!(feed.stats().slides, 1);
    assert_clean(&feed);
}

// ============================================================================
// Windowed tail
// ============================================================================

#[test]
fn windowed_tail_shows_last_children() {
    let config = FeedConfig::default()
        .with_mode(FeedMode::WindowedTail)
        .with_min_visible_tail(3);
    let mut feed = feed_with(config);
    feed.set_items(items(0..10)).unwrap();
    settle(&mut feed);

    for raw in 0..10 {
        assert_eq!(feed.host().is_hidden(ItemId(raw)), raw < 7, "item {raw}");
    }
    assert_eq!(feed.host().attached().len(), 10);
    assert_eq!(feed.host().observed_len(), 0);
    assert_eq!(last_visible(&drain(&mut feed)), Some(ids(7..10).as_slice()));

    feed.set_items(items(0..12)).unwrap();
    settle(&mut feed);
    assert_eq!(feed.visible_items(), ids(9..12));
    assert!(feed.host().is_hidden(ItemId(8)));
}

#[test]
fn windowed_tail_zero_hides_everything() {
    let config = FeedConfig::default()
        .with_mode(FeedMode::WindowedTail)
        .with_min_visible_tail(0);
    let mut feed = feed_with(config);
    feed.set_items(items(0..10)).unwrap();
    settle(&mut feed);

    assert!((0..10).all(|raw| feed.host().is_hidden(ItemId(raw))));
    assert!(feed.visible_items().is_empty());
}

#[test]
fn windowed_tail_never_anchors() {
    let config = FeedConfig::default()
        .with_mode(FeedMode::WindowedTail)
        .with_min_visible_tail(15);
    let mut feed = feed_with(config);
    feed.set_items(items(10..30)).unwrap();
    settle(&mut feed);
    user_scroll(&mut feed, 50);

    feed.set_items(items(0..30)).unwrap();
    settle(&mut feed);
    assert_eq!(feed.scroll_position(), 50);
    assert_eq!(feed.visible_items(), ids(15..30));
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn stats_count_transitions_and_host_work() {
    let mut feed = loaded(FeedConfig::default(), 5);
    feed.set_items(items(0..5)).unwrap();
    feed.set_items(items([4, 3, 2, 1, 0])).unwrap();
    settle(&mut feed);

    let stats = feed.stats();
    assert_eq!(stats.appends, 1);
    assert_eq!(stats.unchanged, 1);
    assert_eq!(stats.reorders, 1);
    assert_eq!(stats.passes, 3);
    assert_eq!(stats.built, 5);
    assert_eq!(stats.detached, 5);
    assert_eq!(stats.inserted, 10);
}

#[test]
fn teardown_leaves_the_host_empty() {
    let mut feed = loaded(FeedConfig::default(), 30);
    user_scroll(&mut feed, 200);
    settle(&mut feed);
    let mut next = items(100..105);
    next.extend(items(0..30));
    feed.set_items(next).unwrap();

    let host = feed.into_host();
    assert!(host.violations().is_empty(), "{:?}", host.violations());
    assert_eq!(host.observed_len(), 0);
    assert!(host.attached().is_empty());
    let counters = host.counters();
    assert_eq!(counters.builds, counters.destroys);
    assert_eq!(counters.observes, counters.unobserves);
}

#[test]
fn mutation_log_dumps_as_jsonl() {
    let feed = loaded(FeedConfig::default(), 3);
    let jsonl = feed.host().to_jsonl();
    let ops: Vec<String> = jsonl
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["op"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        ops,
        ["build", "insert", "build", "insert", "build", "insert", "observe", "observe", "observe"]
    );
}

// ============================================================================
// Property tests
// ============================================================================

fn sequence() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::hash_set(0u64..40, 0..24)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    #[test]
    fn display_order_always_matches_last_sequence(
        steps in prop::collection::vec((sequence(), any::<bool>()), 1..10)
    ) {
        let mut feed = feed_with(FeedConfig::default());
        let mut last = Vec::new();
        for (seq, settle_now) in steps {
            feed.set_items(items(seq.iter().copied())).unwrap();
            last = seq;
            prop_assert_eq!(feed.host().attached(), feed.ids());
            if settle_now {
                settle(&mut feed);
                let expected = ids(last.iter().copied());
                prop_assert_eq!(feed.ids(), expected.as_slice());
            }
        }
        settle(&mut feed);

        let expected = ids(last.iter().copied());
        prop_assert_eq!(feed.ids(), expected.as_slice());
        prop_assert_eq!(feed.host().attached(), feed.ids());
        prop_assert_eq!(feed.host().observed_len(), feed.len());
        prop_assert!(feed.host().violations().is_empty(), "{:?}", feed.host().violations());
        for id in feed.visible_items() {
            prop_assert!(feed.ids().contains(&id));
        }
    }

    #[test]
    fn appends_and_prepends_never_detach(
        base in 1u64..30,
        grow in prop::collection::vec((1u64..5, any::<bool>()), 1..8)
    ) {
        let mut feed = loaded(FeedConfig::default(), base);
        let (mut low, mut high) = (1_000u64, 1_000 + base);
        feed.set_items(items(low..high)).unwrap();
        settle(&mut feed);
        let detaches = feed.host().counters().detaches;

        for (count, at_head) in grow {
            if at_head {
                low -= count;
            } else {
                high += count;
            }
            feed.set_items(items(low..high)).unwrap();
            settle(&mut feed);
        }
        prop_assert_eq!(feed.host().counters().detaches, detaches);
        let expected = ids(low..high);
        prop_assert_eq!(feed.ids(), expected.as_slice());
    }
}
