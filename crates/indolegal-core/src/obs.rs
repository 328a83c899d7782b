//! Structured observability hooks for playback and feed lifecycle events.
//!
//! This module provides:
//! - Run-scoped tracing spans via the `PlaybackSpan` RAII guard
//! - Emission functions for key lifecycle events: run start, phase change,
//!   ignored trigger, missing data, completion, feed mount/unmount
//!
//! Events are emitted at `info!` level unless noted; filter with `RUST_LOG`.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{ModelId, ScenarioId, Score, Verdict};
use crate::playback::Phase;

/// RAII guard that enters a run-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = PlaybackSpan::enter(run_id);
/// // all tracing calls are now tagged with run_id
/// ```
pub struct PlaybackSpan {
    _span: tracing::span::EnteredSpan,
}

impl PlaybackSpan {
    pub fn enter(run_id: Uuid) -> Self {
        let span = tracing::info_span!("indolegal.playback", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_playback_started(run_id: Uuid, scenario: ScenarioId, model: ModelId) {
    info!(
        event = "playback.started",
        run_id = %run_id,
        scenario = %scenario,
        model = %model,
    );
}

/// Phase transitions are chatty; emitted at `debug!`.
pub fn emit_phase_changed(from: Phase, to: Phase) {
    debug!(event = "playback.phase", from = %from, to = %to);
}

/// A run trigger arrived while a run was already in flight.
pub fn emit_run_ignored(phase: Phase) {
    debug!(event = "playback.ignored", phase = %phase);
}

pub fn emit_selection_rejected(phase: Phase) {
    debug!(event = "playback.selection_rejected", phase = %phase);
}

/// Emit event: the selected pair is missing from the catalog (warning level).
pub fn emit_data_not_found(scenario: ScenarioId, model: ModelId) {
    warn!(event = "playback.not_found", scenario = %scenario, model = %model);
}

pub fn emit_playback_completed(run_id: Option<Uuid>, verdict: Verdict, score: Score) {
    info!(
        event = "playback.completed",
        run_id = ?run_id,
        verdict = verdict.label(),
        stamp = verdict.stamp(),
        score = score.value(),
    );
}

/// Emit event: pending timers were released on reset or unmount.
pub fn emit_timers_cancelled(owner: &str, count: usize) {
    if count > 0 {
        debug!(event = "timers.cancelled", owner = owner, count = count);
    }
}

pub fn emit_feed_mounted(interval_ms: u64, capacity: usize) {
    info!(event = "feed.mounted", interval_ms = interval_ms, capacity = capacity);
}

pub fn emit_feed_unmounted(emitted: u64) {
    info!(event = "feed.unmounted", emitted = emitted);
}

/// Emit event: a render failed and the boundary drew a diagnostic instead.
pub fn emit_render_crashed(section: &str, error: &dyn std::fmt::Display) {
    warn!(event = "render.crashed", section = section, error = %error);
}
