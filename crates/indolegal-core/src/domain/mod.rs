//! Domain models for IndoLegal.
//!
//! Canonical definitions for the static benchmark table:
//! - `Scenario`: a legal query with its Official Gazette ground truth
//! - `Response`: a canned model answer with its precomputed grading
//! - `Catalog`: the `(scenario, model) -> Response` lookup

pub mod builtin;
pub mod catalog;
pub mod error;

// Re-export main types and errors
pub use catalog::{
    Catalog, GroundTruth, JudgeLogLine, LogLevel, ModelId, Response, RubricItem, RubricStatus,
    Scenario, ScenarioId, Score, Verdict,
};
pub use error::{CatalogError, IndoLegalError, Result, ValidationError};
