//! Scenario catalog: the static `(scenario, model) -> Response` table.
//!
//! Every "result" the simulator shows is authored here ahead of time. The
//! lookup is total: a pair that is absent from the table yields
//! [`CatalogError::ResponseNotFound`] instead of a panic.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::{CatalogError, Result, ValidationError};

/// Identifier of a benchmark scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioId {
    Murder,
    Suicide,
    Lynching,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 3] = [ScenarioId::Murder, ScenarioId::Suicide, ScenarioId::Lynching];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioId::Murder => "murder",
            ScenarioId::Suicide => "suicide",
            ScenarioId::Lynching => "lynching",
        }
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioId {
    type Err = CatalogError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "murder" => Ok(ScenarioId::Murder),
            "suicide" => Ok(ScenarioId::Suicide),
            "lynching" => Ok(ScenarioId::Lynching),
            _ => Err(CatalogError::UnknownScenario(s.to_string())),
        }
    }
}

/// The fixed model roster every scenario is played against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "llama-3")]
    Llama3,
    #[serde(rename = "krutrim")]
    Krutrim,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [ModelId::Gpt4o, ModelId::Llama3, ModelId::Krutrim];

    /// Stable identifier used on the command line and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gpt4o => "gpt-4o",
            ModelId::Llama3 => "llama-3",
            ModelId::Krutrim => "krutrim",
        }
    }

    /// Human-readable model name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelId::Gpt4o => "GPT-4o",
            ModelId::Llama3 => "Llama-3",
            ModelId::Krutrim => "Krutrim",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ModelId::Gpt4o => "🤖",
            ModelId::Llama3 => "🧠",
            ModelId::Krutrim => "🌐",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = CatalogError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gpt-4o" | "gpt4o" => Ok(ModelId::Gpt4o),
            "llama-3" | "llama3" => Ok(ModelId::Llama3),
            "krutrim" => Ok(ModelId::Krutrim),
            _ => Err(CatalogError::UnknownModel(s.to_string())),
        }
    }
}

/// Grading outcome of a canned response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Correct BNS provision cited.
    Verified,
    /// Cited a repealed IPC section.
    LegacyError,
    /// Cited a provision from the pre-enactment draft bill.
    DraftError,
    /// Right code, wrong section or punishment.
    Misattribution,
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Verified)
    }

    /// `PASS` or `FAIL`.
    pub fn stamp(&self) -> &'static str {
        if self.is_pass() {
            "PASS"
        } else {
            "FAIL"
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Verified => "VERIFIED",
            Verdict::LegacyError => "LEGACY ERROR",
            Verdict::DraftError => "DRAFT ERROR",
            Verdict::Misattribution => "MISATTRIBUTION",
        }
    }
}

/// Rubric score in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 3;

    pub fn new(value: u8) -> std::result::Result<Self, ValidationError> {
        if value > Self::MAX {
            return Err(ValidationError::ScoreOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Saturate at [`Score::MAX`]; used for authored constants.
    pub(crate) const fn clamped(value: u8) -> Self {
        if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = ValidationError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> u8 {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricStatus {
    Pass,
    Fail,
}

/// One line of the grading checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricItem {
    pub criteria: String,
    pub status: RubricStatus,
    pub note: String,
}

impl RubricItem {
    pub fn pass(criteria: &str, note: &str) -> Self {
        Self {
            criteria: criteria.to_string(),
            status: RubricStatus::Pass,
            note: note.to_string(),
        }
    }

    pub fn fail(criteria: &str, note: &str) -> Self {
        Self {
            criteria: criteria.to_string(),
            status: RubricStatus::Fail,
            note: note.to_string(),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == RubricStatus::Pass
    }
}

/// Severity tag of a judge script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Action,
    Success,
    Warn,
    Error,
    Fatal,
}

/// A line printed by the judge script while grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeLogLine {
    pub level: LogLevel,
    pub text: String,
}

impl JudgeLogLine {
    pub fn new(level: LogLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// The Official Gazette provision a response is graded against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub source: String,
    pub section: String,
    pub text: String,
}

/// A canned model answer together with its precomputed grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub text: String,
    pub verdict: Verdict,
    pub score: Score,
    #[serde(default)]
    pub search_triggered: bool,
    pub rubric: Vec<RubricItem>,
    #[serde(default)]
    pub judge_log: Vec<JudgeLogLine>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub title: String,
    pub query: String,
    pub ground_truth: GroundTruth,
    pub responses: BTreeMap<ModelId, Response>,
}

/// The full static table, keyed by scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    scenarios: BTreeMap<ScenarioId, Scenario>,
}

impl Catalog {
    pub fn new(scenarios: impl IntoIterator<Item = Scenario>) -> Self {
        Self {
            scenarios: scenarios.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    /// Parse and validate an authored catalog.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&raw)?;
        tracing::debug!(path = %path.display(), scenarios = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.values()
    }

    pub fn scenario(&self, id: ScenarioId) -> std::result::Result<&Scenario, CatalogError> {
        self.scenarios
            .get(&id)
            .ok_or(CatalogError::ScenarioNotFound(id))
    }

    /// Look up the canned response for a pair.
    ///
    /// A missing scenario is reported as a missing pair: from the simulator's
    /// point of view both mean there is nothing to play.
    pub fn response(
        &self,
        scenario: ScenarioId,
        model: ModelId,
    ) -> std::result::Result<&Response, CatalogError> {
        self.scenarios
            .get(&scenario)
            .and_then(|s| s.responses.get(&model))
            .ok_or(CatalogError::ResponseNotFound { scenario, model })
    }

    /// Every `(scenario, model)` pair that has a response, in table order.
    pub fn pairs(&self) -> Vec<(ScenarioId, ModelId)> {
        self.scenarios
            .values()
            .flat_map(|s| s.responses.keys().map(move |m| (s.id, *m)))
            .collect()
    }

    /// Check authored content for the invariants serde cannot express.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        for (key, scenario) in &self.scenarios {
            if *key != scenario.id {
                return Err(ValidationError::MismatchedScenarioKey {
                    key: *key,
                    id: scenario.id,
                });
            }
            let fields = [
                ("title", &scenario.title),
                ("query", &scenario.query),
                ("ground_truth.section", &scenario.ground_truth.section),
            ];
            for (field, value) in fields {
                if value.trim().is_empty() {
                    return Err(ValidationError::EmptyScenarioField {
                        scenario: scenario.id,
                        field,
                    });
                }
            }
            for (model, response) in &scenario.responses {
                if response.text.trim().is_empty() {
                    return Err(ValidationError::EmptyResponseText {
                        scenario: scenario.id,
                        model: *model,
                    });
                }
                if response.rubric.is_empty() {
                    return Err(ValidationError::EmptyRubric {
                        scenario: scenario.id,
                        model: *model,
                    });
                }
            }
        }
        Ok(())
    }

    /// SHA-256 hex digest of the canonical JSON form.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}
