//! Data models for alignment runs

pub mod alignment_run;
pub mod word_timing;

pub use alignment_run::{AlignmentRun, RunOutcome, RunRequest, RunState, StateTransition};
pub use word_timing::{Association, TimedEvent, TimestampRecord, Token};
