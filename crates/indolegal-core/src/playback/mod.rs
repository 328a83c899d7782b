//! Scripted playback of one benchmark run.
//!
//! A run walks `Idle -> Scanning -> Thinking -> Typing -> Grading -> Complete`,
//! driven entirely by timers armed on a [`crate::timer::Scheduler`].

pub mod error;
pub mod phase;
pub mod sequencer;
pub mod state;

pub use error::{PlaybackError, PlaybackResult};
pub use phase::{Phase, PlaybackTick, PlaybackTimings, STEPS};
pub use sequencer::{RunOutcome, Sequencer};
pub use state::{Outcome, PlaybackEvent, PlaybackState};
