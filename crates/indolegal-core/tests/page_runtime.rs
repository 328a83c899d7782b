//! Page-level behaviour: the bounded feed, mount lifecycles and rendering.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use indolegal_core::render;
use indolegal_core::{
    Catalog, FeedConfig, ModelId, Page, PageEvent, Phase, RunOutcome, ScenarioId, SiteConfig,
};

fn config(seed: u64) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.feed = FeedConfig {
        seed: Some(seed),
        ..FeedConfig::default()
    };
    config
}

#[test]
fn feed_never_exceeds_twenty_entries() {
    let mut page = Page::new(Arc::new(Catalog::builtin()), config(1));
    page.mount_feed();
    for _ in 0..50 {
        page.advance(Duration::from_millis(800));
        let len = page.feed().unwrap().entries().len();
        assert!(len <= 20);
    }
    let feed = page.feed().unwrap();
    assert_eq!(feed.emitted(), 50);
    assert_eq!(feed.entries().len(), 20);
}

#[test]
fn feed_timestamps_follow_virtual_time() {
    let origin = NaiveDate::from_ymd_opt(2024, 7, 1)
        .unwrap()
        .and_hms_opt(23, 59, 58)
        .unwrap();
    let mut page = Page::new(Arc::new(Catalog::builtin()), config(1));
    page.mount_feed_at(origin);
    let events = page.advance(Duration::from_millis(2_400));
    let times: Vec<String> = events
        .into_iter()
        .filter_map(|e| match e {
            PageEvent::Feed(entry) => Some(entry.time),
            _ => None,
        })
        .collect();
    assert_eq!(times, vec!["23:59:58", "23:59:59", "00:00:00"]);
}

#[test]
fn feed_and_simulator_are_independent() {
    let mut page = Page::mounted(Arc::new(Catalog::builtin()), config(3));
    page.run();
    page.advance(Duration::from_millis(100));
    page.unmount_feed();
    page.advance(Duration::from_secs(30));
    assert_eq!(page.playback().unwrap().phase, Phase::Complete);
    assert_eq!(page.pending_timers(), 0);
}

#[test]
fn remount_starts_a_fresh_feed() {
    let mut page = Page::new(Arc::new(Catalog::builtin()), config(5));
    page.mount_feed();
    page.advance(Duration::from_secs(4));
    assert_eq!(page.feed().unwrap().emitted(), 5);
    page.unmount_feed();
    page.mount_feed();
    assert_eq!(page.feed().unwrap().emitted(), 0);
    assert_eq!(page.pending_timers(), 1);
}

#[test]
fn remounted_feed_stamps_from_its_own_origin() {
    let origin = NaiveDate::from_ymd_opt(2024, 7, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let mut page = Page::new(Arc::new(Catalog::builtin()), config(3));
    page.mount_feed();
    page.advance(Duration::from_secs(60));
    page.unmount_feed();

    page.mount_feed_at(origin);
    let events = page.advance(Duration::from_millis(1_600));
    let times: Vec<String> = events
        .into_iter()
        .filter_map(|e| match e {
            PageEvent::Feed(entry) => Some(entry.time),
            _ => None,
        })
        .collect();
    assert_eq!(times, vec!["09:00:00", "09:00:01"]);
}

#[test]
fn rendered_page_survives_missing_scenario() {
    let mut page = Page::mounted(Arc::new(Catalog::default()), config(1));
    page.select_scenario(ScenarioId::Lynching).unwrap();
    assert!(matches!(page.run(), RunOutcome::NotFound(_)));

    let out = render::page(&page);
    assert!(out.contains(render::NOT_FOUND_TITLE));
    assert!(!out.contains(render::CRASH_TITLE));
    assert!(out.contains("PROJECT_CONTRIBUTORS"));
    assert!(out.contains("Olac Krutrim"));
}

#[test]
fn missing_scenario_while_idle_renders_not_found_panel() {
    // Idle with an empty catalog: no scenario to show, but nothing crashed.
    let page = Page::mounted(Arc::new(Catalog::default()), config(1));
    let out = render::page(&page);
    assert!(out.contains(render::NOT_FOUND_TITLE));
    assert!(!out.contains(render::CRASH_TITLE));
    assert!(out.contains("RESEARCH_METHODOLOGY"));
    assert!(out.contains("Comparative Performance Matrix"));
}

#[test]
fn completed_run_renders_stamp_and_score() {
    let mut page = Page::mounted(Arc::new(Catalog::builtin()), config(1));
    page.select_model(ModelId::Krutrim).unwrap();
    page.run();
    page.advance(Duration::from_secs(30));
    let panel = render::simulator(&page).unwrap();
    assert!(panel.contains("=== PASS | Score 3/3"));
    assert!(panel.contains("[x] Verdict"));
}
