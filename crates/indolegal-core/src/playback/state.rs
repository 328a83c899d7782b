//! Observable playback state and the events emitted while it changes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::phase::Phase;
use crate::domain::{JudgeLogLine, ModelId, Response, RubricItem, ScenarioId, Score, Verdict};

/// Final stamp of a run, copied verbatim from the played response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub verdict: Verdict,
    pub score: Score,
    pub summary: String,
}

impl From<&Response> for Outcome {
    fn from(response: &Response) -> Self {
        Self {
            verdict: response.verdict,
            score: response.score,
            summary: response.summary.clone(),
        }
    }
}

/// Everything a view needs to draw the simulator.
///
/// Owned by exactly one sequencer; reset at the start of every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub phase: Phase,
    pub scenario: ScenarioId,
    pub model: ModelId,
    pub run_id: Option<Uuid>,
    pub scan_progress: u8,
    pub search_indicator: bool,
    /// Prefix of the response text revealed so far.
    pub revealed_text: String,
    /// Prefix of the judge log revealed so far.
    pub revealed_log_lines: Vec<JudgeLogLine>,
    /// Prefix of the rubric revealed so far.
    pub revealed_rubric: Vec<RubricItem>,
    pub outcome: Option<Outcome>,
}

impl PlaybackState {
    pub fn new(scenario: ScenarioId, model: ModelId) -> Self {
        Self {
            phase: Phase::Idle,
            scenario,
            model,
            run_id: None,
            scan_progress: 0,
            search_indicator: false,
            revealed_text: String::new(),
            revealed_log_lines: Vec::new(),
            revealed_rubric: Vec::new(),
            outcome: None,
        }
    }

    /// Drop all output of the previous run; keeps the phase and selection.
    pub fn clear_output(&mut self) {
        self.run_id = None;
        self.scan_progress = 0;
        self.search_indicator = false;
        self.revealed_text.clear();
        self.revealed_log_lines.clear();
        self.revealed_rubric.clear();
        self.outcome = None;
    }

    /// `true` when no run output is visible.
    pub fn is_blank(&self) -> bool {
        self.scan_progress == 0
            && !self.search_indicator
            && self.revealed_text.is_empty()
            && self.revealed_log_lines.is_empty()
            && self.revealed_rubric.is_empty()
            && self.outcome.is_none()
    }
}

/// A single observable change made by the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Started {
        run_id: Uuid,
        scenario: ScenarioId,
        model: ModelId,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    Progress(u8),
    SearchIndicator,
    CharRevealed(char),
    LogLineRevealed(JudgeLogLine),
    RubricRevealed(RubricItem),
    Completed(Outcome),
    NotFound {
        scenario: ScenarioId,
        model: ModelId,
    },
    Dismissed,
    SelectionChanged {
        scenario: ScenarioId,
        model: ModelId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_output_keeps_selection_and_phase() {
        let mut state = PlaybackState::new(ScenarioId::Lynching, ModelId::Krutrim);
        state.phase = Phase::Complete;
        state.scan_progress = 100;
        state.revealed_text.push_str("Yes");
        state.search_indicator = true;
        assert!(!state.is_blank());

        state.clear_output();
        assert!(state.is_blank());
        assert_eq!(state.phase, Phase::Complete);
        assert_eq!(state.scenario, ScenarioId::Lynching);
        assert_eq!(state.model, ModelId::Krutrim);
    }
}
