//! Alignment run state machine
//!
//! PREPARING → FETCHING_ALIGNMENT → MATCHING → PERSISTING → DONE, with FAILED
//! reachable from any of the first four states.

use crate::error::RunFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Alignment run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// Association, audio URL, tokens
    Preparing,
    /// Waiting on the alignment service
    FetchingAlignment,
    /// Sequential matching of events to tokens
    Matching,
    /// Writing timestamp records
    Persisting,
    Done,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Preparing => "PREPARING",
            RunState::FetchingAlignment => "FETCHING_ALIGNMENT",
            RunState::Matching => "MATCHING",
            RunState::Persisting => "PERSISTING",
            RunState::Done => "DONE",
            RunState::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }

    /// Whether `self → next` is an edge of the state machine
    pub fn can_transition_to(&self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Preparing, FetchingAlignment)
                | (FetchingAlignment, Matching)
                | (Matching, Persisting)
                | (Persisting, Done)
                | (Preparing | FetchingAlignment | Matching | Persisting, Failed)
        )
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three inbound inputs of a run, plus the re-run guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub recitation_id: Uuid,
    pub surah_id: i64,
    pub file_id: Uuid,
    /// Delete the association's previous timestamps before writing new ones
    #[serde(default)]
    pub replace_existing: bool,
}

impl RunRequest {
    pub fn new(recitation_id: Uuid, surah_id: i64, file_id: Uuid) -> Self {
        Self {
            recitation_id,
            surah_id,
            file_id,
            replace_existing: false,
        }
    }
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub run_id: Uuid,
    pub old_state: RunState,
    pub new_state: RunState,
    pub transitioned_at: DateTime<Utc>,
}

/// Transient context of one run; discarded when the run ends
#[derive(Debug, Clone)]
pub struct AlignmentRun {
    pub run_id: Uuid,
    pub request: RunRequest,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl AlignmentRun {
    pub fn new(request: RunRequest) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            request,
            state: RunState::Preparing,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to new state
    pub fn transition_to(&mut self, new_state: RunState) -> StateTransition {
        debug_assert!(
            self.state.can_transition_to(new_state),
            "invalid transition {} -> {}",
            self.state,
            new_state
        );

        let transition = StateTransition {
            run_id: self.run_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        if new_state.is_terminal() {
            self.ended_at = Some(Utc::now());
        }

        transition
    }
}

/// Terminal result of a run, returned to the invoker
#[derive(Debug)]
pub enum RunOutcome {
    Completed {
        run_id: Uuid,
        /// Timestamp records written
        records: usize,
        message: String,
    },
    Failed {
        run_id: Uuid,
        /// State the run was in when the failure happened
        failed_in: RunState,
        cause: RunFailure,
        message: String,
    },
}

impl RunOutcome {
    pub fn run_id(&self) -> Uuid {
        match self {
            RunOutcome::Completed { run_id, .. } | RunOutcome::Failed { run_id, .. } => *run_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    /// Human-readable message, as sent to the recipient
    pub fn message(&self) -> &str {
        match self {
            RunOutcome::Completed { message, .. } | RunOutcome::Failed { message, .. } => message,
        }
    }

    /// Short descriptive result for the invoking scheduler
    pub fn summary(&self) -> String {
        match self {
            RunOutcome::Completed { .. } => "timestamps generated".to_string(),
            RunOutcome::Failed {
                cause: RunFailure::MissingInput(_),
                ..
            } => "Failed: missing audio_url or text".to_string(),
            RunOutcome::Failed { cause, .. } => format!("Failed to generate timestamps: {}", cause),
        }
    }
}
