//! Playback phases, timer payloads and timing configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{Response, ValidationError};

/// Phase of a scripted benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    /// Loading ground truth; a progress counter climbs to 100 %.
    Scanning,
    /// Simulated model latency.
    Thinking,
    /// Typewriter reveal of the response text.
    Typing,
    /// Judge log, then rubric items, revealed one at a time.
    Grading,
    Complete,
    /// The selected pair has no response in the catalog.
    DataNotFound,
}

impl Phase {
    /// `true` while timers are driving the run.
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            Phase::Scanning | Phase::Thinking | Phase::Typing | Phase::Grading
        )
    }

    /// `true` once a run has ended and can be dismissed.
    pub fn is_settled(&self) -> bool {
        matches!(self, Phase::Complete | Phase::DataNotFound)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Scanning => "scanning",
            Phase::Thinking => "thinking",
            Phase::Typing => "typing",
            Phase::Grading => "grading",
            Phase::Complete => "complete",
            Phase::DataNotFound => "data_not_found",
        }
    }

    /// Position on the four-step stepper (0 when no step is lit).
    pub fn step(&self) -> u8 {
        match self {
            Phase::Idle | Phase::DataNotFound => 0,
            Phase::Scanning => 1,
            Phase::Thinking | Phase::Typing => 2,
            Phase::Grading => 3,
            Phase::Complete => 4,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stepper labels, indexed by `Phase::step() - 1`.
pub const STEPS: [&str; 4] = ["Ground Truth", "AI Generation", "Judge Script", "Verdict"];

/// Timer payloads owned by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackTick {
    ScanStep,
    SearchIndicator,
    ThinkingElapsed,
    TypeChar,
    RevealLogLine,
    RevealRubric,
    VerdictReady,
}

/// Reveal cadence of a run. All durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackTimings {
    /// Interval between progress increments while scanning.
    pub scan_tick_ms: u64,

    /// Percentage points added per scan tick.
    pub scan_step: u8,

    /// Length of the thinking pause.
    pub thinking_ms: u64,

    /// Fraction of the thinking pause after which the web-search indicator
    /// appears (only for responses with `search_triggered`).
    pub search_at: f32,

    /// Interval between revealed characters.
    pub type_tick_ms: u64,

    /// Interval between revealed judge log lines.
    pub log_tick_ms: u64,

    /// Interval between revealed rubric items.
    pub rubric_tick_ms: u64,

    /// Pause between the last rubric item and the verdict stamp.
    pub verdict_delay_ms: u64,
}

impl Default for PlaybackTimings {
    fn default() -> Self {
        Self {
            scan_tick_ms: 15,
            scan_step: 1,
            thinking_ms: 1000,
            search_at: 0.5,
            type_tick_ms: 30,
            log_tick_ms: 300,
            rubric_tick_ms: 400,
            verdict_delay_ms: 500,
        }
    }
}

impl PlaybackTimings {
    pub fn scan_tick(&self) -> Duration {
        Duration::from_millis(self.scan_tick_ms)
    }

    pub fn thinking(&self) -> Duration {
        Duration::from_millis(self.thinking_ms)
    }

    /// Rounded to whole milliseconds.
    pub fn search_delay(&self) -> Duration {
        let fraction = f64::from(self.search_at.clamp(0.0, 1.0));
        Duration::from_millis((self.thinking_ms as f64 * fraction).round() as u64)
    }

    pub fn type_tick(&self) -> Duration {
        Duration::from_millis(self.type_tick_ms)
    }

    pub fn log_tick(&self) -> Duration {
        Duration::from_millis(self.log_tick_ms)
    }

    pub fn rubric_tick(&self) -> Duration {
        Duration::from_millis(self.rubric_tick_ms)
    }

    pub fn verdict_delay(&self) -> Duration {
        Duration::from_millis(self.verdict_delay_ms)
    }

    /// Number of scan ticks needed to reach 100 %.
    pub fn scan_ticks(&self) -> u32 {
        let step = u32::from(self.scan_step.max(1));
        100u32.div_ceil(step)
    }

    /// Exact virtual time from `run` to `Complete` for `response`.
    pub fn run_duration(&self, response: &Response) -> Duration {
        let chars = response.text.chars().count() as u32;
        self.scan_tick() * self.scan_ticks()
            + self.thinking()
            + self.type_tick() * chars
            + self.log_tick() * response.judge_log.len() as u32
            + self.rubric_tick() * response.rubric.len() as u32
            + self.verdict_delay()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let ticks = [
            ("scan_tick_ms", self.scan_tick_ms),
            ("type_tick_ms", self.type_tick_ms),
            ("log_tick_ms", self.log_tick_ms),
            ("rubric_tick_ms", self.rubric_tick_ms),
        ];
        for (field, value) in ticks {
            if value == 0 {
                return Err(ValidationError::ZeroTiming { field });
            }
        }
        if !(1..=100).contains(&self.scan_step) {
            return Err(ValidationError::OutOfBounds {
                field: "scan_step",
                min: 1.0,
                max: 100.0,
                value: f64::from(self.scan_step),
            });
        }
        if !(0.0..=1.0).contains(&self.search_at) {
            return Err(ValidationError::OutOfBounds {
                field: "search_at",
                min: 0.0,
                max: 1.0,
                value: f64::from(self.search_at),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Catalog, ModelId, ScenarioId};

    #[test]
    fn test_running_and_settled_are_disjoint() {
        let all = [
            Phase::Idle,
            Phase::Scanning,
            Phase::Thinking,
            Phase::Typing,
            Phase::Grading,
            Phase::Complete,
            Phase::DataNotFound,
        ];
        for phase in all {
            assert!(!(phase.is_running() && phase.is_settled()), "{phase}");
        }
        assert!(!Phase::Idle.is_running());
        assert!(!Phase::Idle.is_settled());
    }

    #[test]
    fn test_step_positions() {
        assert_eq!(Phase::Idle.step(), 0);
        assert_eq!(Phase::Scanning.step(), 1);
        assert_eq!(Phase::Typing.step(), 2);
        assert_eq!(Phase::Complete.step(), 4);
        assert_eq!(STEPS[usize::from(Phase::Grading.step()) - 1], "Judge Script");
    }

    #[test]
    fn test_default_timings_validate() {
        assert!(PlaybackTimings::default().validate().is_ok());
    }

    #[test]
    fn test_zero_tick_rejected() {
        let timings = PlaybackTimings {
            type_tick_ms: 0,
            ..PlaybackTimings::default()
        };
        assert_eq!(
            timings.validate(),
            Err(ValidationError::ZeroTiming {
                field: "type_tick_ms"
            })
        );
    }

    #[test]
    fn test_search_fraction_bounds() {
        let timings = PlaybackTimings {
            search_at: 1.5,
            ..PlaybackTimings::default()
        };
        assert!(timings.validate().is_err());
    }

    #[test]
    fn test_scan_ticks_rounds_up() {
        let timings = PlaybackTimings {
            scan_step: 30,
            ..PlaybackTimings::default()
        };
        assert_eq!(timings.scan_ticks(), 4);
        assert_eq!(PlaybackTimings::default().scan_ticks(), 100);
    }

    #[test]
    fn test_run_duration_counts_every_reveal() {
        let catalog = Catalog::builtin();
        let response = catalog
            .response(ScenarioId::Murder, ModelId::Gpt4o)
            .expect("pair present");
        let timings = PlaybackTimings::default();
        let chars = response.text.chars().count() as u64;
        let expected = 15 * 100
            + 1000
            + 30 * chars
            + 300 * response.judge_log.len() as u64
            + 400 * response.rubric.len() as u64
            + 500;
        assert_eq!(timings.run_duration(response), Duration::from_millis(expected));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let timings: PlaybackTimings =
            serde_json::from_str(r#"{"type_tick_ms": 5}"#).expect("deserialize");
        assert_eq!(timings.type_tick_ms, 5);
        assert_eq!(timings.thinking_ms, 1000);
    }
}
