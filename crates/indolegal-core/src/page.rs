//! The page runtime: one timer queue shared by the simulator and the feed.
//!
//! `Page` owns everything mutable. Controls (`run`, `dismiss`, selectors)
//! act on the mounted sequencer immediately; `advance_to` fires due timers
//! in order and routes each tick to the component that armed it.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::trace;

use crate::config::SiteConfig;
use crate::domain::{Catalog, ModelId, ScenarioId};
use crate::feed::{AmbientFeed, FeedEntry};
use crate::metrics::Metrics;
use crate::obs::PlaybackSpan;
use crate::playback::{
    PlaybackEvent, PlaybackResult, PlaybackState, RunOutcome, Sequencer,
};
use crate::timer::{Scheduler, Tick, TimerQueue};

/// Anything a view may want to redraw for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Playback(PlaybackEvent),
    Feed(FeedEntry),
}

/// Point-in-time view of what is mounted and armed.
#[derive(Debug, Clone, Serialize)]
pub struct PageStatus {
    pub now_ms: u128,
    pub pending_timers: usize,
    pub simulator_mounted: bool,
    pub feed_mounted: bool,
    pub playback: Option<PlaybackState>,
    pub feed_entries: usize,
}

pub struct Page {
    queue: TimerQueue,
    catalog: Arc<Catalog>,
    config: SiteConfig,
    sequencer: Option<Sequencer>,
    feed: Option<AmbientFeed>,
    metrics: Metrics,
}

impl Page {
    /// A page with nothing mounted.
    pub fn new(catalog: Arc<Catalog>, config: SiteConfig) -> Self {
        Self {
            queue: TimerQueue::new(),
            catalog,
            config,
            sequencer: None,
            feed: None,
            metrics: Metrics::new(),
        }
    }

    /// A page with both the simulator and the feed mounted.
    pub fn mounted(catalog: Arc<Catalog>, config: SiteConfig) -> Self {
        let mut page = Self::new(catalog, config);
        page.mount_simulator();
        page.mount_feed();
        page
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn now(&self) -> Duration {
        self.queue.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.queue.pending()
    }

    pub fn sequencer(&self) -> Option<&Sequencer> {
        self.sequencer.as_ref()
    }

    pub fn playback(&self) -> Option<&PlaybackState> {
        self.sequencer.as_ref().map(Sequencer::state)
    }

    pub fn feed(&self) -> Option<&AmbientFeed> {
        self.feed.as_ref()
    }

    pub fn status(&self) -> PageStatus {
        PageStatus {
            now_ms: self.now().as_millis(),
            pending_timers: self.pending_timers(),
            simulator_mounted: self.sequencer.is_some(),
            feed_mounted: self.feed.is_some(),
            playback: self.playback().cloned(),
            feed_entries: self.feed.as_ref().map_or(0, |f| f.entries().len()),
        }
    }

    /// Mount the simulator if it is not mounted. No timers are armed.
    pub fn mount_simulator(&mut self) {
        if self.sequencer.is_none() {
            self.sequencer = Some(Sequencer::mount(
                Arc::clone(&self.catalog),
                self.config.playback.clone(),
            ));
        }
    }

    /// Unmount the simulator, clearing its timers. Returns how many were armed.
    pub fn unmount_simulator(&mut self) -> usize {
        self.sequencer
            .take()
            .map_or(0, |seq| seq.unmount(&mut self.queue))
    }

    pub fn mount_feed(&mut self) {
        if self.feed.is_none() {
            self.feed = Some(AmbientFeed::mount(self.config.feed.clone(), &mut self.queue));
        }
    }

    /// Mount the feed with a fixed wall-clock origin.
    pub fn mount_feed_at(&mut self, origin: NaiveDateTime) {
        if self.feed.is_none() {
            self.feed = Some(AmbientFeed::mount_at(
                self.config.feed.clone(),
                origin,
                &mut self.queue,
            ));
        }
    }

    pub fn unmount_feed(&mut self) -> bool {
        self.feed
            .take()
            .is_some_and(|feed| feed.unmount(&mut self.queue))
    }

    /// Press "run". `Ignored` when the simulator is not mounted.
    pub fn run(&mut self) -> RunOutcome {
        let Some(seq) = self.sequencer.as_mut() else {
            return RunOutcome::Ignored;
        };
        let outcome = seq.run(&mut self.queue);
        match &outcome {
            RunOutcome::Started(_) => self.metrics.inc_runs_started(),
            RunOutcome::NotFound(_) => self.metrics.inc_data_not_found(),
            RunOutcome::Ignored => self.metrics.inc_runs_ignored(),
        }
        outcome
    }

    pub fn dismiss(&mut self) -> bool {
        self.sequencer
            .as_mut()
            .is_some_and(|seq| seq.dismiss(&mut self.queue))
    }

    pub fn select_scenario(&mut self, scenario: ScenarioId) -> PlaybackResult<()> {
        match self.sequencer.as_mut() {
            Some(seq) => seq.select_scenario(scenario, &mut self.queue),
            None => Ok(()),
        }
    }

    pub fn select_model(&mut self, model: ModelId) -> PlaybackResult<()> {
        match self.sequencer.as_mut() {
            Some(seq) => seq.select_model(model, &mut self.queue),
            None => Ok(()),
        }
    }

    /// Advance the clock by `dt`.
    pub fn advance(&mut self, dt: Duration) -> Vec<PageEvent> {
        let until = self.queue.now() + dt;
        self.advance_to(until)
    }

    /// Fire every timer due at or before `until`, in order, and move the
    /// clock to `until`.
    ///
    /// Events produced by controls since the last call come first.
    pub fn advance_to(&mut self, until: Duration) -> Vec<PageEvent> {
        let mut events = self.drain_playback();

        while let Some(fired) = self.queue.pop_due(until) {
            match fired.tick {
                Tick::Playback(tick) => {
                    let Some(seq) = self.sequencer.as_mut() else {
                        trace!(?tick, "simulator unmounted; tick dropped");
                        continue;
                    };
                    let _span = seq.state().run_id.map(PlaybackSpan::enter);
                    seq.handle(fired.id, tick, &mut self.queue);
                    events.extend(self.drain_playback());
                }
                Tick::Feed => {
                    let Some(feed) = self.feed.as_mut() else {
                        trace!("feed unmounted; tick dropped");
                        continue;
                    };
                    if let Some(entry) = feed.handle(fired.id, &self.queue) {
                        self.metrics.inc_feed_entries();
                        events.push(PageEvent::Feed(entry));
                    }
                }
            }
        }
        self.queue.advance_to(until);
        events
    }

    /// Take pending sequencer events without advancing time.
    pub fn take_events(&mut self) -> Vec<PageEvent> {
        self.drain_playback()
    }

    /// Unmount everything and flush metrics.
    pub fn shutdown(mut self) -> Metrics {
        self.unmount_simulator();
        self.unmount_feed();
        self.metrics.flush();
        self.metrics
    }

    fn drain_playback(&mut self) -> Vec<PageEvent> {
        let Some(seq) = self.sequencer.as_mut() else {
            return Vec::new();
        };
        let events = seq.drain_events();
        for event in &events {
            if matches!(event, PlaybackEvent::Completed(_)) {
                self.metrics.inc_runs_completed();
            }
        }
        events.into_iter().map(PageEvent::Playback).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{Phase, PlaybackTimings};

    fn quick_config() -> SiteConfig {
        SiteConfig {
            playback: PlaybackTimings {
                scan_tick_ms: 1,
                scan_step: 25,
                thinking_ms: 20,
                search_at: 0.5,
                type_tick_ms: 1,
                log_tick_ms: 1,
                rubric_tick_ms: 1,
                verdict_delay_ms: 1,
            },
            feed: crate::feed::FeedConfig {
                interval_ms: 100,
                seed: Some(11),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_run_and_feed_interleave() {
        let mut page = Page::mounted(Arc::new(Catalog::builtin()), quick_config());
        assert!(matches!(page.run(), RunOutcome::Started(_)));

        let events = page.advance(Duration::from_secs(2));
        assert_eq!(page.playback().map(|s| s.phase), Some(Phase::Complete));
        let feed = events
            .iter()
            .filter(|e| matches!(e, PageEvent::Feed(_)))
            .count();
        assert_eq!(feed, 20);
        assert_eq!(page.metrics().runs_started(), 1);
        assert_eq!(page.metrics().runs_completed(), 1);
        assert_eq!(page.metrics().feed_entries(), 20);
        // Only the feed interval remains.
        assert_eq!(page.pending_timers(), 1);
    }

    #[test]
    fn test_controls_without_simulator_are_noops() {
        let mut page = Page::new(Arc::new(Catalog::builtin()), quick_config());
        assert_eq!(page.run(), RunOutcome::Ignored);
        assert!(!page.dismiss());
        assert!(page.select_model(ModelId::Krutrim).is_ok());
        assert!(page.advance(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_unmount_mid_run_clears_everything() {
        let mut page = Page::mounted(Arc::new(Catalog::builtin()), quick_config());
        page.run();
        page.advance(Duration::from_millis(10));
        assert!(page.unmount_simulator() > 0);
        assert!(page.unmount_feed());
        assert_eq!(page.pending_timers(), 0);
        assert!(page.advance(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_ignored_run_is_counted() {
        let mut page = Page::mounted(Arc::new(Catalog::builtin()), quick_config());
        page.run();
        assert_eq!(page.run(), RunOutcome::Ignored);
        let metrics = page.shutdown();
        assert_eq!(metrics.runs_ignored(), 1);
    }

    #[test]
    fn test_status_reports_mounts() {
        let mut page = Page::new(Arc::new(Catalog::builtin()), quick_config());
        page.mount_simulator();
        let status = page.status();
        assert!(status.simulator_mounted);
        assert!(!status.feed_mounted);
        assert_eq!(status.pending_timers, 0);
        assert_eq!(
            status.playback.map(|p| p.scenario),
            Some(ScenarioId::Murder)
        );
    }
}
