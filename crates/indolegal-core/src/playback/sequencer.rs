//! The playback sequencer: an explicit state machine over timer ticks.
//!
//! All state lives in one [`PlaybackState`]; every transition goes through
//! [`Sequencer::handle`]. A phase arms its timers only when the previous
//! phase completes, and every reset first clears every tracked handle, so a
//! tick from an earlier run can never write into the current one.

use std::sync::Arc;

use tracing::trace;
use uuid::Uuid;

use super::error::{PlaybackError, PlaybackResult};
use super::phase::{Phase, PlaybackTick, PlaybackTimings};
use super::state::{Outcome, PlaybackEvent, PlaybackState};
use crate::domain::{Catalog, CatalogError, ModelId, Response, ScenarioId};
use crate::obs;
use crate::timer::{Scheduler, Tick, TimerId, TimerSet};

/// Result of pressing "run".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Started(Uuid),
    /// The pair is missing; the sequencer is now in `DataNotFound`.
    NotFound(CatalogError),
    /// A run is already in flight; nothing changed.
    Ignored,
}

/// Timed state machine that plays one canned response.
pub struct Sequencer {
    catalog: Arc<Catalog>,
    timings: PlaybackTimings,
    state: PlaybackState,
    /// Response being played; captured at run start.
    script: Option<Response>,
    /// Byte offset of the next character to reveal.
    text_cursor: usize,
    timers: TimerSet,
    outbox: Vec<PlaybackEvent>,
}

impl Sequencer {
    /// Mount a sequencer with the default selection (first scenario and
    /// model of the roster). No timers are armed until `run`.
    pub fn mount(catalog: Arc<Catalog>, timings: PlaybackTimings) -> Self {
        Self::with_selection(catalog, timings, ScenarioId::Murder, ModelId::Gpt4o)
    }

    pub fn with_selection(
        catalog: Arc<Catalog>,
        timings: PlaybackTimings,
        scenario: ScenarioId,
        model: ModelId,
    ) -> Self {
        Self {
            catalog,
            timings,
            state: PlaybackState::new(scenario, model),
            script: None,
            text_cursor: 0,
            timers: TimerSet::new(),
            outbox: Vec::new(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn timings(&self) -> &PlaybackTimings {
        &self.timings
    }

    /// Response of the current run, if one was found.
    pub fn script(&self) -> Option<&Response> {
        self.script.as_ref()
    }

    /// Number of handles this sequencer still tracks.
    pub fn tracked_timers(&self) -> usize {
        self.timers.len()
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Start a run for the current selection.
    ///
    /// Ignored while a run is in flight. Otherwise clears every pending timer
    /// and all previous output before anything new is armed.
    pub fn run(&mut self, sched: &mut dyn Scheduler) -> RunOutcome {
        if self.state.phase.is_running() {
            obs::emit_run_ignored(self.state.phase);
            return RunOutcome::Ignored;
        }

        self.reset(sched);
        let run_id = Uuid::new_v4();
        self.state.run_id = Some(run_id);
        let (scenario, model) = (self.state.scenario, self.state.model);

        match self.catalog.response(scenario, model) {
            Ok(response) => {
                self.script = Some(response.clone());
                self.outbox.push(PlaybackEvent::Started {
                    run_id,
                    scenario,
                    model,
                });
                obs::emit_playback_started(run_id, scenario, model);
                self.transition(Phase::Scanning, sched);
                let id = sched.set_interval(
                    self.timings.scan_tick(),
                    Tick::Playback(PlaybackTick::ScanStep),
                );
                self.timers.track(id);
                RunOutcome::Started(run_id)
            }
            Err(err) => {
                obs::emit_data_not_found(scenario, model);
                self.outbox
                    .push(PlaybackEvent::NotFound { scenario, model });
                self.transition(Phase::DataNotFound, sched);
                RunOutcome::NotFound(err)
            }
        }
    }

    /// Dispatch a fired timer.
    ///
    /// Ticks from handles this sequencer no longer tracks, or that do not
    /// belong to the current phase, are dropped.
    pub fn handle(&mut self, id: TimerId, tick: PlaybackTick, sched: &mut dyn Scheduler) {
        if !self.timers.contains(id) {
            trace!(?tick, timer = id.raw(), "dropping tick from untracked timer");
            return;
        }

        match (self.state.phase, tick) {
            (Phase::Scanning, PlaybackTick::ScanStep) => self.on_scan_step(sched),
            (Phase::Thinking, PlaybackTick::SearchIndicator) => {
                self.timers.release(id);
                self.state.search_indicator = true;
                self.outbox.push(PlaybackEvent::SearchIndicator);
            }
            (Phase::Thinking, PlaybackTick::ThinkingElapsed) => {
                self.timers.release(id);
                self.begin_typing(sched);
            }
            (Phase::Typing, PlaybackTick::TypeChar) => self.on_type_char(sched),
            (Phase::Grading, PlaybackTick::RevealLogLine) => self.on_log_line(id, sched),
            (Phase::Grading, PlaybackTick::RevealRubric) => self.on_rubric_item(id, sched),
            (Phase::Grading, PlaybackTick::VerdictReady) => {
                self.timers.release(id);
                self.complete(sched);
            }
            (phase, tick) => {
                trace!(%phase, ?tick, "ignoring out-of-phase tick");
            }
        }
    }

    /// Close the verdict or not-found panel and return to `Idle`.
    ///
    /// Returns `false` (and changes nothing) unless the run has settled.
    pub fn dismiss(&mut self, sched: &mut dyn Scheduler) -> bool {
        if !self.state.phase.is_settled() {
            return false;
        }
        self.reset(sched);
        self.outbox.push(PlaybackEvent::Dismissed);
        self.transition(Phase::Idle, sched);
        true
    }

    /// Change the scenario selector. Rejected while a run is in flight.
    pub fn select_scenario(
        &mut self,
        scenario: ScenarioId,
        sched: &mut dyn Scheduler,
    ) -> PlaybackResult<()> {
        self.select(scenario, self.state.model, sched)
    }

    /// Change the model selector. Rejected while a run is in flight.
    pub fn select_model(&mut self, model: ModelId, sched: &mut dyn Scheduler) -> PlaybackResult<()> {
        self.select(self.state.scenario, model, sched)
    }

    /// Tear down: release every pending timer. Returns how many were armed.
    pub fn unmount(mut self, sched: &mut dyn Scheduler) -> usize {
        let cancelled = self.timers.cancel_all(sched);
        obs::emit_timers_cancelled("sequencer", cancelled);
        cancelled
    }

    fn select(
        &mut self,
        scenario: ScenarioId,
        model: ModelId,
        sched: &mut dyn Scheduler,
    ) -> PlaybackResult<()> {
        let phase = self.state.phase;
        if phase.is_running() {
            obs::emit_selection_rejected(phase);
            return Err(PlaybackError::SelectionLocked { phase });
        }
        if (scenario, model) == (self.state.scenario, self.state.model) {
            return Ok(());
        }
        self.state.scenario = scenario;
        self.state.model = model;
        self.outbox
            .push(PlaybackEvent::SelectionChanged { scenario, model });
        // A settled panel belongs to the old selection.
        if phase.is_settled() {
            self.reset(sched);
            self.transition(Phase::Idle, sched);
        }
        Ok(())
    }

    fn reset(&mut self, sched: &mut dyn Scheduler) {
        let cancelled = self.timers.cancel_all(sched);
        obs::emit_timers_cancelled("sequencer", cancelled);
        self.state.clear_output();
        self.script = None;
        self.text_cursor = 0;
    }

    /// Move to `to`, releasing whatever the previous phase still had armed.
    fn transition(&mut self, to: Phase, sched: &mut dyn Scheduler) {
        let cancelled = self.timers.cancel_all(sched);
        obs::emit_timers_cancelled("sequencer", cancelled);
        let from = self.state.phase;
        self.state.phase = to;
        obs::emit_phase_changed(from, to);
        self.outbox.push(PlaybackEvent::PhaseChanged { from, to });
    }

    fn arm_timeout(&mut self, delay: std::time::Duration, tick: PlaybackTick, sched: &mut dyn Scheduler) {
        let id = sched.set_timeout(delay, Tick::Playback(tick));
        self.timers.track(id);
    }

    fn arm_interval(&mut self, period: std::time::Duration, tick: PlaybackTick, sched: &mut dyn Scheduler) {
        let id = sched.set_interval(period, Tick::Playback(tick));
        self.timers.track(id);
    }

    fn on_scan_step(&mut self, sched: &mut dyn Scheduler) {
        let progress = self
            .state
            .scan_progress
            .saturating_add(self.timings.scan_step.max(1))
            .min(100);
        self.state.scan_progress = progress;
        self.outbox.push(PlaybackEvent::Progress(progress));
        if progress == 100 {
            self.begin_thinking(sched);
        }
    }

    fn begin_thinking(&mut self, sched: &mut dyn Scheduler) {
        self.transition(Phase::Thinking, sched);
        let search = self.script.as_ref().is_some_and(|r| r.search_triggered);
        if search {
            self.arm_timeout(self.timings.search_delay(), PlaybackTick::SearchIndicator, sched);
        }
        self.arm_timeout(self.timings.thinking(), PlaybackTick::ThinkingElapsed, sched);
    }

    fn begin_typing(&mut self, sched: &mut dyn Scheduler) {
        self.transition(Phase::Typing, sched);
        if self.script.as_ref().is_some_and(|r| r.text.is_empty()) {
            self.begin_grading(sched);
            return;
        }
        self.arm_interval(self.timings.type_tick(), PlaybackTick::TypeChar, sched);
    }

    fn on_type_char(&mut self, sched: &mut dyn Scheduler) {
        let next = self
            .script
            .as_ref()
            .and_then(|r| r.text.get(self.text_cursor..))
            .and_then(|rest| rest.chars().next());
        if let Some(c) = next {
            self.text_cursor += c.len_utf8();
            self.state.revealed_text.push(c);
            self.outbox.push(PlaybackEvent::CharRevealed(c));
        }
        let remaining = self
            .script
            .as_ref()
            .map_or(0, |r| r.text.len().saturating_sub(self.text_cursor));
        if remaining == 0 {
            self.begin_grading(sched);
        }
    }

    fn begin_grading(&mut self, sched: &mut dyn Scheduler) {
        self.transition(Phase::Grading, sched);
        if self.script.as_ref().is_some_and(|r| !r.judge_log.is_empty()) {
            self.arm_interval(self.timings.log_tick(), PlaybackTick::RevealLogLine, sched);
        } else {
            self.begin_rubric(sched);
        }
    }

    fn on_log_line(&mut self, id: TimerId, sched: &mut dyn Scheduler) {
        let index = self.state.revealed_log_lines.len();
        let line = self
            .script
            .as_ref()
            .and_then(|r| r.judge_log.get(index))
            .cloned();
        if let Some(line) = line {
            self.state.revealed_log_lines.push(line.clone());
            self.outbox.push(PlaybackEvent::LogLineRevealed(line));
        }
        let total = self.script.as_ref().map_or(0, |r| r.judge_log.len());
        if self.state.revealed_log_lines.len() >= total {
            self.timers.cancel(id, sched);
            self.begin_rubric(sched);
        }
    }

    fn begin_rubric(&mut self, sched: &mut dyn Scheduler) {
        if self.script.as_ref().is_some_and(|r| !r.rubric.is_empty()) {
            self.arm_interval(self.timings.rubric_tick(), PlaybackTick::RevealRubric, sched);
        } else {
            self.arm_timeout(self.timings.verdict_delay(), PlaybackTick::VerdictReady, sched);
        }
    }

    fn on_rubric_item(&mut self, id: TimerId, sched: &mut dyn Scheduler) {
        let index = self.state.revealed_rubric.len();
        let item = self
            .script
            .as_ref()
            .and_then(|r| r.rubric.get(index))
            .cloned();
        if let Some(item) = item {
            self.state.revealed_rubric.push(item.clone());
            self.outbox.push(PlaybackEvent::RubricRevealed(item));
        }
        let total = self.script.as_ref().map_or(0, |r| r.rubric.len());
        if self.state.revealed_rubric.len() >= total {
            self.timers.cancel(id, sched);
            self.arm_timeout(self.timings.verdict_delay(), PlaybackTick::VerdictReady, sched);
        }
    }

    fn complete(&mut self, sched: &mut dyn Scheduler) {
        let Some(outcome) = self.script.as_ref().map(Outcome::from) else {
            return;
        };
        obs::emit_playback_completed(self.state.run_id, outcome.verdict, outcome.score);
        self.state.outcome = Some(outcome.clone());
        self.transition(Phase::Complete, sched);
        self.outbox.push(PlaybackEvent::Completed(outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LogLevel, Verdict};
    use crate::timer::TimerQueue;
    use std::time::Duration;

    fn fast() -> PlaybackTimings {
        PlaybackTimings {
            scan_tick_ms: 1,
            scan_step: 50,
            thinking_ms: 10,
            search_at: 0.5,
            type_tick_ms: 1,
            log_tick_ms: 2,
            rubric_tick_ms: 3,
            verdict_delay_ms: 5,
        }
    }

    fn pump(seq: &mut Sequencer, q: &mut TimerQueue, until: Duration) {
        while let Some(fired) = q.pop_due(until) {
            if let Tick::Playback(tick) = fired.tick {
                seq.handle(fired.id, tick, q);
            }
        }
        q.advance_to(until);
    }

    #[test]
    fn test_run_reaches_complete_with_table_verdict() {
        let catalog = Arc::new(Catalog::builtin());
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::mount(catalog.clone(), fast());

        assert!(matches!(seq.run(&mut q), RunOutcome::Started(_)));
        assert_eq!(seq.phase(), Phase::Scanning);

        let response = catalog
            .response(ScenarioId::Murder, ModelId::Gpt4o)
            .expect("pair present")
            .clone();
        pump(&mut seq, &mut q, fast().run_duration(&response));

        let state = seq.state();
        assert_eq!(state.phase, Phase::Complete);
        assert_eq!(state.revealed_text, response.text);
        assert_eq!(state.revealed_rubric, response.rubric);
        assert_eq!(state.revealed_log_lines, response.judge_log);
        let outcome = state.outcome.as_ref().expect("outcome set");
        assert_eq!(outcome.verdict, Verdict::LegacyError);
        assert_eq!(outcome.score.value(), 0);
        assert_eq!(q.pending(), 0);
        assert_eq!(seq.tracked_timers(), 0);
    }

    #[test]
    fn test_run_is_not_complete_one_millisecond_early() {
        let catalog = Arc::new(Catalog::builtin());
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::mount(catalog.clone(), fast());
        seq.run(&mut q);
        let response = catalog
            .response(ScenarioId::Murder, ModelId::Gpt4o)
            .expect("pair present")
            .clone();
        pump(
            &mut seq,
            &mut q,
            fast().run_duration(&response) - Duration::from_millis(1),
        );
        assert_eq!(seq.phase(), Phase::Grading);
        assert_eq!(seq.state().revealed_rubric.len(), response.rubric.len());
        assert!(seq.state().outcome.is_none());
    }

    #[test]
    fn test_second_run_while_active_is_ignored() {
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::mount(Arc::new(Catalog::builtin()), fast());
        seq.run(&mut q);
        pump(&mut seq, &mut q, Duration::from_millis(1));
        let before = seq.state().clone();
        let pending = q.pending_ids();
        seq.drain_events();

        assert_eq!(seq.run(&mut q), RunOutcome::Ignored);
        assert_eq!(seq.state(), &before);
        assert_eq!(q.pending_ids(), pending);
        assert!(seq.drain_events().is_empty());
    }

    #[test]
    fn test_search_indicator_only_for_search_responses() {
        let catalog = Arc::new(Catalog::builtin());
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::with_selection(
            catalog.clone(),
            fast(),
            ScenarioId::Suicide,
            ModelId::Llama3,
        );
        seq.run(&mut q);
        // Two scan ticks, then half of the thinking pause.
        pump(&mut seq, &mut q, Duration::from_millis(2 + 5));
        assert_eq!(seq.phase(), Phase::Thinking);
        assert!(seq.state().search_indicator);

        let mut q = TimerQueue::new();
        let mut seq =
            Sequencer::with_selection(catalog, fast(), ScenarioId::Murder, ModelId::Gpt4o);
        seq.run(&mut q);
        pump(&mut seq, &mut q, Duration::from_millis(2 + 9));
        assert_eq!(seq.phase(), Phase::Thinking);
        assert!(!seq.state().search_indicator);
    }

    #[test]
    fn test_typing_reveals_prefix_one_char_per_tick() {
        let catalog = Arc::new(Catalog::builtin());
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::mount(catalog.clone(), fast());
        seq.run(&mut q);
        pump(&mut seq, &mut q, Duration::from_millis(2 + 10 + 7));
        let response = catalog
            .response(ScenarioId::Murder, ModelId::Gpt4o)
            .expect("pair present");
        assert_eq!(seq.phase(), Phase::Typing);
        assert_eq!(seq.state().revealed_text.chars().count(), 7);
        assert!(response.text.starts_with(&seq.state().revealed_text));
    }

    #[test]
    fn test_missing_pair_enters_data_not_found() {
        let full = Catalog::builtin();
        let catalog = Catalog::new(full.scenarios().cloned().map(|mut s| {
            s.responses.remove(&ModelId::Krutrim);
            s
        }));
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::with_selection(
            Arc::new(catalog),
            fast(),
            ScenarioId::Murder,
            ModelId::Krutrim,
        );

        let outcome = seq.run(&mut q);
        let kept = outcome.clone();
        assert_eq!(kept, outcome);
        assert_eq!(
            outcome,
            RunOutcome::NotFound(CatalogError::ResponseNotFound {
                scenario: ScenarioId::Murder,
                model: ModelId::Krutrim,
            })
        );
        assert_eq!(seq.phase(), Phase::DataNotFound);
        assert!(seq.script().is_none());
        assert_eq!(q.pending(), 0);

        assert!(seq.dismiss(&mut q));
        assert_eq!(seq.phase(), Phase::Idle);
    }

    #[test]
    fn test_selection_locked_mid_run() {
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::mount(Arc::new(Catalog::builtin()), fast());
        seq.run(&mut q);
        assert_eq!(
            seq.select_model(ModelId::Krutrim, &mut q),
            Err(PlaybackError::SelectionLocked {
                phase: Phase::Scanning
            })
        );
        assert_eq!(seq.state().model, ModelId::Gpt4o);
        assert!(seq.select_scenario(ScenarioId::Lynching, &mut q).is_err());
        assert_eq!(seq.state().scenario, ScenarioId::Murder);
    }

    #[test]
    fn test_selecting_after_completion_returns_to_idle() {
        let catalog = Arc::new(Catalog::builtin());
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::mount(catalog, fast());
        seq.run(&mut q);
        pump(&mut seq, &mut q, Duration::from_secs(5));
        assert_eq!(seq.phase(), Phase::Complete);

        seq.select_scenario(ScenarioId::Lynching, &mut q)
            .expect("unlocked once settled");
        assert_eq!(seq.phase(), Phase::Idle);
        assert!(seq.state().is_blank());
    }

    #[test]
    fn test_dismiss_ignored_mid_run() {
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::mount(Arc::new(Catalog::builtin()), fast());
        assert!(!seq.dismiss(&mut q));
        seq.run(&mut q);
        assert!(!seq.dismiss(&mut q));
        assert_eq!(seq.phase(), Phase::Scanning);
    }

    #[test]
    fn test_rerun_after_complete_starts_blank() {
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::mount(Arc::new(Catalog::builtin()), fast());
        seq.run(&mut q);
        pump(&mut seq, &mut q, Duration::from_secs(5));
        assert_eq!(seq.phase(), Phase::Complete);
        let first = seq.state().run_id;

        assert!(matches!(seq.run(&mut q), RunOutcome::Started(_)));
        let state = seq.state();
        assert_eq!(state.phase, Phase::Scanning);
        assert!(state.revealed_text.is_empty());
        assert!(state.revealed_log_lines.is_empty());
        assert!(state.outcome.is_none());
        assert_ne!(state.run_id, first);
    }

    #[test]
    fn test_unmount_clears_every_handle() {
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::mount(Arc::new(Catalog::builtin()), fast());
        seq.run(&mut q);
        pump(&mut seq, &mut q, Duration::from_millis(4));
        assert!(q.pending() > 0);

        let cancelled = seq.unmount(&mut q);
        assert!(cancelled > 0);
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn test_untracked_tick_is_dropped() {
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::mount(Arc::new(Catalog::builtin()), fast());
        seq.run(&mut q);
        let foreign = q.set_timeout(Duration::ZERO, Tick::Playback(PlaybackTick::ScanStep));
        seq.handle(foreign, PlaybackTick::ScanStep, &mut q);
        assert_eq!(seq.state().scan_progress, 0);
    }

    #[test]
    fn test_events_trace_the_whole_run() {
        let mut q = TimerQueue::new();
        let mut seq = Sequencer::mount(Arc::new(Catalog::builtin()), fast());
        seq.run(&mut q);
        pump(&mut seq, &mut q, Duration::from_secs(5));
        let events = seq.drain_events();

        let phases: Vec<Phase> = events
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::PhaseChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                Phase::Scanning,
                Phase::Thinking,
                Phase::Typing,
                Phase::Grading,
                Phase::Complete
            ]
        );
        assert!(matches!(events.first(), Some(PlaybackEvent::Started { .. })));
        assert!(matches!(events.last(), Some(PlaybackEvent::Completed(_))));
        let fatal = events.iter().any(|e| {
            matches!(e, PlaybackEvent::LogLineRevealed(line) if line.level == LogLevel::Fatal)
        });
        assert!(fatal);
    }
}
