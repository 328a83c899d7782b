//! Real-time driver: sleeps on the tokio clock until the next virtual
//! deadline, then advances the page to it.

use std::time::Duration;

use tracing::debug;

use crate::page::{Page, PageEvent};

/// Playback speed relative to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pace {
    /// `2.0` runs twice as fast. Non-positive or non-finite means no sleeping.
    pub speed: f64,
}

impl Default for Pace {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

impl Pace {
    pub fn new(speed: f64) -> Self {
        Self { speed }
    }

    /// Advance through deadlines without sleeping.
    pub fn instant() -> Self {
        Self { speed: f64::INFINITY }
    }

    /// Wall-clock wait for a virtual delay.
    pub fn scale(&self, virtual_delay: Duration) -> Duration {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Duration::ZERO;
        }
        virtual_delay.div_f64(self.speed)
    }
}

/// What a `drive` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveSummary {
    /// Deadlines the driver advanced to.
    pub steps: u64,
    pub events: u64,
    /// Virtual time at which the driver stopped.
    pub stopped_at: Duration,
}

/// Drive `page` until `stop` returns `true` or no timer is armed.
///
/// `stop` is checked before every step, so a condition that already holds
/// returns immediately. Every event is handed to `on_event` in firing order.
pub async fn drive<S, E>(page: &mut Page, pace: Pace, mut stop: S, mut on_event: E) -> DriveSummary
where
    S: FnMut(&Page) -> bool,
    E: FnMut(&PageEvent),
{
    let mut summary = DriveSummary::default();
    for event in page.take_events() {
        on_event(&event);
        summary.events += 1;
    }

    while !stop(&*page) {
        let Some(deadline) = page.next_deadline() else {
            debug!("no timers armed; driver idle");
            break;
        };
        let wait = pace.scale(deadline.saturating_sub(page.now()));
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        for event in page.advance_to(deadline) {
            on_event(&event);
            summary.events += 1;
        }
        summary.steps += 1;
    }

    summary.stopped_at = page.now();
    summary
}
