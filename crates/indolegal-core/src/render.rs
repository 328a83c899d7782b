//! Plain-text rendering of the page.
//!
//! Every panel is a pure function of state. [`boundary`] wraps a fallible
//! panel so that an error or panic inside it is replaced by a short
//! "Simulator Crashed" diagnostic while the rest of the page still renders.

use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::analytics::{self, LeaderboardRow, Origin, INSIGHTS, LEADERBOARD};
use crate::domain::{CatalogError, JudgeLogLine, LogLevel, ModelId, RubricItem, Scenario};
use crate::feed::FeedEntry;
use crate::obs;
use crate::page::Page;
use crate::playback::{Outcome, Phase, PlaybackState, STEPS};
use crate::site::{self, Section};

pub const CRASH_TITLE: &str = "Simulator Crashed";
pub const NOT_FOUND_TITLE: &str = "Error: Scenario Data Not Found";
pub const CURSOR: char = '\u{258B}';
pub const WAITING_FOR_INPUT: &str = "[ Waiting for Input ]";

/// Errors raised by a panel renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("panel panicked: {0}")]
    Panicked(String),

    #[error("format error")]
    Fmt(#[from] std::fmt::Error),
}

pub type RenderResult = std::result::Result<String, RenderError>;

/// Run `panel`, substituting a crash diagnostic on error or panic.
pub fn boundary<F>(label: &str, panel: F) -> String
where
    F: FnOnce() -> RenderResult,
{
    let result = match panic::catch_unwind(AssertUnwindSafe(panel)) {
        Ok(result) => result,
        Err(payload) => Err(RenderError::Panicked(panic_message(payload.as_ref()))),
    };
    match result {
        Ok(text) => text,
        Err(err) => {
            obs::emit_render_crashed(label, &err);
            crash_panel(label, &err)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub fn crash_panel(label: &str, err: &RenderError) -> String {
    format!("!! {CRASH_TITLE}\n!! {label}: {err}\n")
}

/// Stepper line, e.g. `[x] Ground Truth  [>] AI Generation  [ ] ...`.
pub fn stepper(phase: Phase) -> String {
    let current = usize::from(phase.step());
    STEPS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let n = i + 1;
            let mark = if n < current || phase == Phase::Complete {
                "x"
            } else if n == current {
                ">"
            } else {
                " "
            };
            format!("[{mark}] {label}")
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Query and ground truth, with the scan progress bar while scanning.
pub fn evidence(scenario: &Scenario, state: &PlaybackState) -> RenderResult {
    let mut out = String::new();
    writeln!(out, "Scenario: {}", scenario.title)?;
    writeln!(out, "Query:    {}", scenario.query)?;
    if state.phase == Phase::Idle {
        writeln!(out, "{WAITING_FOR_INPUT}")?;
    } else if state.phase == Phase::Scanning {
        let filled = usize::from(state.scan_progress / 5);
        writeln!(
            out,
            "Loading ground truth [{}{}] {:>3}%",
            "#".repeat(filled),
            ".".repeat(20 - filled),
            state.scan_progress
        )?;
    } else {
        let gt = &scenario.ground_truth;
        writeln!(out, "Ground truth: {} ({})", gt.section, gt.source)?;
        writeln!(out, "  {}", gt.text)?;
    }
    Ok(out)
}

/// Model output panel: thinking indicator, then the typed prefix.
pub fn response(model: ModelId, state: &PlaybackState) -> RenderResult {
    let mut out = String::new();
    writeln!(out, "{} {}", model.glyph(), model.display_name())?;
    match state.phase {
        Phase::Idle | Phase::Scanning => writeln!(out, "./awaiting_model_generation...")?,
        Phase::Thinking => {
            writeln!(out, "Thinking...")?;
            if state.search_indicator {
                writeln!(out, "Searching the web...")?;
            }
        }
        Phase::Typing => writeln!(out, "\u{276F} {}{CURSOR}", state.revealed_text)?,
        _ => writeln!(out, "\u{276F} {}", state.revealed_text)?,
    }
    Ok(out)
}

fn level_tag(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => "INFO",
        LogLevel::Action => "ACTION",
        LogLevel::Success => "SUCCESS",
        LogLevel::Warn => "WARN",
        LogLevel::Error => "ERROR",
        LogLevel::Fatal => "FATAL",
    }
}

pub fn judge_log(lines: &[JudgeLogLine]) -> String {
    lines
        .iter()
        .map(|line| format!("[{}] {}\n", level_tag(line.level), line.text))
        .collect()
}

pub fn rubric(items: &[RubricItem]) -> String {
    items
        .iter()
        .map(|item| {
            let mark = if item.passed() { "[PASS]" } else { "[FAIL]" };
            format!("{mark} {} ({})\n", item.criteria, item.note)
        })
        .collect()
}

pub fn verdict(outcome: &Outcome) -> String {
    format!(
        "=== {} | Score {} | {} ===\n{}\n",
        outcome.verdict.stamp(),
        outcome.score,
        outcome.verdict.label(),
        outcome.summary
    )
}

pub fn not_found(state: &PlaybackState) -> String {
    format!(
        "{NOT_FOUND_TITLE}\nNo response for {} on scenario {}. Change the selection or press reset.\n",
        state.model, state.scenario
    )
}

/// The whole simulator subtree for the current state.
pub fn simulator(page: &Page) -> RenderResult {
    let Some(seq) = page.sequencer() else {
        return Ok(String::new());
    };
    let state = seq.state();
    let mut out = String::new();
    writeln!(out, "{}", stepper(state.phase))?;
    if state.phase == Phase::DataNotFound {
        out.push_str(&not_found(state));
        return Ok(out);
    }
    let scenario = match page.catalog().scenario(state.scenario) {
        Ok(scenario) => scenario,
        Err(CatalogError::ScenarioNotFound(_)) => {
            out.push_str(&not_found(state));
            return Ok(out);
        }
        Err(err) => return Err(err.into()),
    };
    out.push_str(&evidence(scenario, state)?);
    out.push('\n');
    out.push_str(&response(state.model, state)?);
    if !state.revealed_log_lines.is_empty() {
        out.push('\n');
        out.push_str(&judge_log(&state.revealed_log_lines));
    }
    if !state.revealed_rubric.is_empty() {
        out.push('\n');
        out.push_str(&rubric(&state.revealed_rubric));
    }
    if let Some(outcome) = &state.outcome {
        out.push('\n');
        out.push_str(&verdict(outcome));
    }
    Ok(out)
}

pub fn feed<'a>(entries: impl IntoIterator<Item = &'a FeedEntry>) -> String {
    let mut out = String::from("LIVE_ADJUDICATION_LOG\n");
    for entry in entries {
        let _ = writeln!(out, "{entry}");
    }
    out
}

pub fn leaderboard(rows: &[LeaderboardRow]) -> RenderResult {
    let mut out = String::new();
    writeln!(
        out,
        "Comparative Performance Matrix (N={})",
        format_thousands(analytics::TOTAL_BENCHMARKS)
    )?;
    writeln!(
        out,
        "{:<4} {:<14} {:>8} {:>12} {:>8} {:>6}",
        "Rank", "Model", "BNS Acc", "Legacy Bias", "Safety", "Logic"
    )?;
    for row in rows {
        let marker = if row.highlighted { "*" } else { " " };
        writeln!(
            out,
            "#{:<3} {:<14} {:>7}% {:>11}% {:>7}% {:>6.1}{marker}",
            row.rank, row.name, row.accuracy, row.legacy_bias, row.safety, row.logic
        )?;
    }
    Ok(out)
}

pub fn analytics_section() -> RenderResult {
    let mut out = leaderboard(&LEADERBOARD)?;
    writeln!(out)?;
    writeln!(
        out,
        "Key insight: {}% {}",
        analytics::KEY_INSIGHT_BIAS,
        analytics::KEY_INSIGHT_TEXT
    )?;
    for origin in [Origin::Global, Origin::Indic] {
        if let Some(summary) = analytics::summarize(&LEADERBOARD, origin) {
            writeln!(
                out,
                "  {:<6} models: mean accuracy {:.1}%, mean legacy bias {:.1}%",
                origin.label(),
                summary.mean_accuracy,
                summary.mean_legacy_bias
            )?;
        }
    }
    if let Some(gap) = analytics::accuracy_gap(&LEADERBOARD) {
        writeln!(out, "  Indic lead in BNS accuracy: {gap:.1} points")?;
    }
    writeln!(
        out,
        "Total benchmarks: {}",
        format_thousands(analytics::TOTAL_BENCHMARKS)
    )?;
    for card in INSIGHTS {
        writeln!(out, "\n## {}\n{}\nEvidence: {}", card.title, card.text, card.evidence)?;
    }
    Ok(out)
}

fn format_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn nav(active: Section) -> String {
    let links: Vec<String> = Section::ALL
        .iter()
        .map(|s| {
            if *s == active {
                format!("[{}]", s.label())
            } else {
                s.label().to_string()
            }
        })
        .collect();
    format!(
        "{}  |  {}  |  [GITHUB] {}\n",
        site::BRAND,
        links.join("  "),
        site::REPOSITORY_URL
    )
}

/// Static copy for one section. The simulator and analytics sections only
/// get their headings here; their bodies come from live state.
pub fn static_section(section: Section) -> RenderResult {
    let mut out = String::new();
    match section {
        Section::Home => {
            let hero = &site::HERO;
            writeln!(out, "{}\n{}\n", hero.headline, hero.tagline)?;
            writeln!(out, "{} | {}", hero.legacy.name, hero.legacy.status)?;
            writeln!(out, "{} | {}", hero.current.name, hero.current.status)?;
            writeln!(out, "\n> {}\n", hero.call_to_action)?;
            writeln!(out, "/// {}", site::FAILURES_HEADING)?;
            for card in site::PROBLEMS {
                writeln!(out, "- {}: {}", card.title, card.text)?;
            }
        }
        Section::Simulator => writeln!(out, "/// LIVE_BENCHMARK_SIMULATOR")?,
        Section::Methodology => {
            writeln!(out, "/// RESEARCH_METHODOLOGY")?;
            for step in site::METHODOLOGY {
                writeln!(
                    out,
                    "STEP {}: {}\n  {}\n  Example: \"{}\"",
                    step.number, step.title, step.description, step.example
                )?;
            }
            writeln!(out, "\nMETADATA_SCHEMA_DEFINITION")?;
            for col in site::SCHEMA {
                writeln!(
                    out,
                    "  {:<14} {:<26} {}  (e.g. {})",
                    col.column, col.description, col.rationale, col.example
                )?;
            }
        }
        Section::Analytics => writeln!(out, "/// SYSTEM_ANALYTICS & VISUALIZATION")?,
        Section::Team => {
            writeln!(out, "PROJECT_CONTRIBUTORS")?;
            for member in site::TEAM {
                writeln!(
                    out,
                    "  {} ({}) [{}]",
                    member.name,
                    member.role,
                    member.tags.join(", ")
                )?;
            }
            writeln!(out, "\n{}\n{}", site::FOOTER_CREDIT, site::FOOTER_COPYRIGHT)?;
        }
    }
    Ok(out)
}

/// The full page, each section behind its own boundary.
pub fn page(page: &Page) -> String {
    let mut out = nav(Section::Simulator);
    for section in Section::ALL {
        out.push('\n');
        out.push_str(&boundary(section.anchor(), || static_section(section)));
        match section {
            Section::Simulator => out.push_str(&boundary("simulator", || simulator(page))),
            Section::Analytics => {
                out.push_str(&boundary("analytics", analytics_section));
                if let Some(f) = page.feed() {
                    out.push('\n');
                    out.push_str(&feed(f.entries()));
                }
            }
            _ => {}
        }
    }
    out
}
