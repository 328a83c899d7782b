//! Domain-level error taxonomy for IndoLegal.

use super::catalog::{ModelId, ScenarioId};

/// Errors produced while validating an authored catalog or configuration.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("score {value} is outside the 0-3 rubric range")]
    ScoreOutOfRange { value: u8 },

    #[error("scenario {scenario} has an empty {field}")]
    EmptyScenarioField {
        scenario: ScenarioId,
        field: &'static str,
    },

    #[error("response {scenario}/{model} has empty text")]
    EmptyResponseText { scenario: ScenarioId, model: ModelId },

    #[error("response {scenario}/{model} has no rubric items")]
    EmptyRubric { scenario: ScenarioId, model: ModelId },

    #[error("scenario key {key} does not match its id {id}")]
    MismatchedScenarioKey { key: ScenarioId, id: ScenarioId },

    #[error("config field {field} must be non-zero")]
    ZeroTiming { field: &'static str },

    #[error("config field {field} must be within {min}..={max}, got {value}")]
    OutOfBounds {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}

/// Errors produced by catalog lookups.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("scenario not found: {0}")]
    ScenarioNotFound(ScenarioId),

    #[error("no response recorded for {model} on scenario {scenario}")]
    ResponseNotFound { scenario: ScenarioId, model: ModelId },

    #[error("unknown scenario id: {0}")]
    UnknownScenario(String),

    #[error("unknown model id: {0}")]
    UnknownModel(String),
}

/// IndoLegal domain errors.
#[derive(Debug, thiserror::Error)]
pub enum IndoLegalError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid environment override {key}={value}")]
    InvalidEnv { key: String, value: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for IndoLegal domain operations.
pub type Result<T> = std::result::Result<T, IndoLegalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_not_found_names_pair() {
        let err = CatalogError::ResponseNotFound {
            scenario: ScenarioId::Murder,
            model: ModelId::Llama3,
        };
        let msg = err.to_string();
        assert!(msg.contains("murder"));
        assert!(msg.contains("llama-3"));
    }

    #[test]
    fn test_validation_wraps_into_domain_error() {
        let err: IndoLegalError = ValidationError::ScoreOutOfRange { value: 7 }.into();
        assert!(err.to_string().contains("validation error"));
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_invalid_env_error_display() {
        let err = IndoLegalError::InvalidEnv {
            key: "INDOLEGAL_TYPE_TICK_MS".to_string(),
            value: "fast".to_string(),
        };
        assert!(err.to_string().contains("INDOLEGAL_TYPE_TICK_MS=fast"));
    }
}
