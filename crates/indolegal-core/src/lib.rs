//! IndoLegal Core Library
//!
//! Scripted playback of the IPC-to-BNS benchmark: the static scenario
//! catalog, a deterministic timer queue, the playback sequencer, the ambient
//! adjudication feed, and the page runtime that ties them together.

pub mod analytics;
pub mod config;
pub mod domain;
pub mod driver;
pub mod fakes;
pub mod feed;
pub mod metrics;
pub mod obs;
pub mod page;
pub mod playback;
pub mod render;
pub mod site;
pub mod telemetry;
pub mod timer;

pub use domain::{
    Catalog, CatalogError, GroundTruth, IndoLegalError, JudgeLogLine, LogLevel, ModelId, Response,
    Result, RubricItem, RubricStatus, Scenario, ScenarioId, Score, ValidationError, Verdict,
};

pub use config::SiteConfig;
pub use driver::{drive, DriveSummary, Pace};
pub use feed::{AmbientFeed, FeedConfig, FeedEntry, FeedOutcome};
pub use metrics::Metrics;
pub use page::{Page, PageEvent, PageStatus};
pub use playback::{
    Outcome, Phase, PlaybackError, PlaybackEvent, PlaybackState, PlaybackTick, PlaybackTimings,
    RunOutcome, Sequencer,
};
pub use render::RenderError;
pub use telemetry::init_tracing;
pub use timer::{Scheduler, Tick, TimerId, TimerQueue, TimerSet};

/// Crate version, for `--version` style output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
