//! Error types for playback control.

use thiserror::Error;

use super::phase::Phase;

/// Errors produced by the playback controls.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    /// Selectors are disabled while a run is in flight.
    #[error("selection is locked while the run is {phase}")]
    SelectionLocked { phase: Phase },
}

/// Convenience result alias.
pub type PlaybackResult<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_locked_names_phase() {
        let err = PlaybackError::SelectionLocked {
            phase: Phase::Typing,
        };
        assert!(err.to_string().contains("typing"));
    }
}
