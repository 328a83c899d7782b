//! Ambient adjudication feed.
//!
//! A decorative stream of batch results: every interval one question is
//! drawn from a fixed pool and stamped `VERIFIED` or `LEGACY_ERR` at random.
//! The feed shares nothing with playback except the scheduler.

use std::collections::VecDeque;
use std::fmt;

use chrono::{Local, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::ValidationError;
use crate::obs;
use crate::timer::{Scheduler, Tick, TimerId};

/// One entry of the question pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchQuestion {
    pub question: &'static str,
    pub source: &'static str,
}

const fn q(question: &'static str, source: &'static str) -> BatchQuestion {
    BatchQuestion { question, source }
}

/// Questions the feed draws from.
pub const BATCH_QUESTIONS: [BatchQuestion; 9] = [
    q("Punishment for Snatching?", "BNS Sec 304"),
    q("Def. of Organized Crime?", "BNS Sec 111"),
    q("Community Service rules?", "BNS Sec 4(f)"),
    q("Electronic Records?", "BSA Sec 61"),
    q("Mob Lynching penalty?", "BNS Sec 103(2)"),
    q("Sedition repealed?", "BNS (Absent)"),
    q("Hit & Run fine?", "BNS Sec 106(2)"),
    q("Fake News detection?", "IT Act + BNS"),
    q("Marriage by deceit?", "BNS Sec 69"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedOutcome {
    Verified,
    LegacyErr,
}

impl FeedOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            FeedOutcome::Verified => "VERIFIED",
            FeedOutcome::LegacyErr => "LEGACY_ERR",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FeedOutcome::LegacyErr)
    }
}

/// A single feed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Wall-clock time formatted `HH:MM:SS` (24h).
    pub time: String,
    pub question: String,
    pub source: String,
    pub outcome: FeedOutcome,
}

impl FeedEntry {
    /// The line without its timestamp.
    pub fn message(&self) -> String {
        format!(
            "Q: \"{}\" | Src: {} | {}",
            self.question,
            self.source,
            self.outcome.label()
        )
    }
}

impl fmt::Display for FeedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.time, self.message())
    }
}

/// Feed cadence and randomness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Interval between entries in milliseconds.
    pub interval_ms: u64,

    /// Maximum number of entries kept; the oldest is dropped first.
    pub capacity: usize,

    /// Probability that an entry is stamped `LEGACY_ERR`.
    pub error_rate: f64,

    /// Fixed RNG seed for a reproducible feed.
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval_ms: 800,
            capacity: 20,
            error_rate: 0.2,
            seed: None,
        }
    }
}

impl FeedConfig {
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_ms == 0 {
            return Err(ValidationError::ZeroTiming {
                field: "feed.interval_ms",
            });
        }
        if self.capacity == 0 {
            return Err(ValidationError::ZeroTiming {
                field: "feed.capacity",
            });
        }
        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err(ValidationError::OutOfBounds {
                field: "feed.error_rate",
                min: 0.0,
                max: 1.0,
                value: self.error_rate,
            });
        }
        Ok(())
    }
}

/// The mounted feed: one interval timer and a bounded FIFO of entries.
pub struct AmbientFeed {
    config: FeedConfig,
    rng: StdRng,
    entries: VecDeque<FeedEntry>,
    timer: Option<TimerId>,
    origin: NaiveDateTime,
    mounted_at: std::time::Duration,
    emitted: u64,
}

impl AmbientFeed {
    /// Arm the feed interval. Timestamps start at the local wall clock.
    pub fn mount(config: FeedConfig, sched: &mut dyn Scheduler) -> Self {
        Self::mount_at(config, Local::now().naive_local(), sched)
    }

    /// Arm the feed with an explicit wall-clock origin for the mount instant.
    pub fn mount_at(config: FeedConfig, origin: NaiveDateTime, sched: &mut dyn Scheduler) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let timer = sched.set_interval(config.interval(), Tick::Feed);
        obs::emit_feed_mounted(config.interval_ms, config.capacity);
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
            rng,
            timer: Some(timer),
            origin,
            mounted_at: sched.now(),
            emitted: 0,
        }
    }

    pub fn entries(&self) -> &VecDeque<FeedEntry> {
        &self.entries
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Total entries produced since mount, including dropped ones.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Append one entry for a fired feed tick.
    ///
    /// Returns `None` for a handle this feed does not own.
    pub fn handle(&mut self, id: TimerId, sched: &dyn Scheduler) -> Option<FeedEntry> {
        if self.timer != Some(id) {
            return None;
        }
        let pick = BATCH_QUESTIONS[self.rng.gen_range(0..BATCH_QUESTIONS.len())];
        let outcome = if self.rng.gen_bool(self.config.error_rate.clamp(0.0, 1.0)) {
            FeedOutcome::LegacyErr
        } else {
            FeedOutcome::Verified
        };
        let since_mount = sched.now().saturating_sub(self.mounted_at);
        let elapsed = chrono::Duration::from_std(since_mount)
            .unwrap_or_else(|_| chrono::Duration::zero());
        let entry = FeedEntry {
            time: (self.origin + elapsed).format("%H:%M:%S").to_string(),
            question: pick.question.to_string(),
            source: pick.source.to_string(),
            outcome,
        };

        while self.entries.len() >= self.config.capacity.max(1) {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.clone());
        self.emitted += 1;
        Some(entry)
    }

    /// Release the interval. Returns whether it was still armed.
    pub fn unmount(mut self, sched: &mut dyn Scheduler) -> bool {
        let cleared = self.timer.take().is_some_and(|id| sched.clear(id));
        obs::emit_feed_unmounted(self.emitted);
        cleared
    }
}
