//! Result sink
//!
//! Persists the records produced by matching and delivers the single terminal
//! notification of a run.

use crate::error::{PersistenceError, RunFailure};
use crate::models::{Association, RunOutcome, RunState, TimestampRecord};
use crate::services::ports::{NotificationKind, Notifier, OutcomeReport, TimestampStore};
use crate::services::sequential_matcher::WordMatch;
use std::sync::Arc;
use uuid::Uuid;

/// Controller and category reported on success
pub const SUCCESS_CATEGORY: &str = "recitations";

/// Controller for failures raised while fetching, matching or persisting
pub const ALIGNMENT_FAILURE_CONTROLLER: &str = "quran.generate_recitation_timestamps";

/// Controller for failures raised before the alignment request
pub const RUN_FAILURE_CONTROLLER: &str = "quran.tasks.generate_recitation_timestamps";

/// Notification controller for a run that failed in `failed_in`
pub fn failure_controller(failed_in: RunState) -> &'static str {
    match failed_in {
        RunState::Preparing => RUN_FAILURE_CONTROLLER,
        _ => ALIGNMENT_FAILURE_CONTROLLER,
    }
}

pub fn success_description() -> &'static str {
    "Recitation timestamps generated"
}

pub fn failure_description() -> &'static str {
    "Failed to generate recitation timestamps"
}

pub fn success_message(recitation_id: Uuid) -> String {
    format!(
        "Recitation timestamps generated for recitation {}.",
        recitation_id
    )
}

pub fn failure_message(recitation_id: Uuid, cause: &RunFailure) -> String {
    format!(
        "Failed to generate recitation timestamps for recitation {}: {}",
        recitation_id, cause
    )
}

/// Persistence and notification for one run
pub struct ResultSink {
    store: Arc<dyn TimestampStore>,
    notifier: Arc<dyn Notifier>,
}

impl ResultSink {
    pub fn new(store: Arc<dyn TimestampStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Build records from `matches` and write them one at a time
    ///
    /// Records written before a failing write stay committed.
    pub async fn persist_matches(
        &self,
        association: &Association,
        matches: &[WordMatch<'_>],
        replace_existing: bool,
    ) -> Result<usize, PersistenceError> {
        if replace_existing {
            let removed = self.store.clear_records(association.guid).await?;
            tracing::info!(
                association = %association.guid,
                removed,
                "Cleared previous timestamps"
            );
        }

        let mut written = 0;
        for word_match in matches {
            let record =
                TimestampRecord::from_match(association.guid, word_match.token, word_match.event)
                    .ok_or_else(|| {
                        PersistenceError::InvalidData(format!(
                            "event '{}' has an unrepresentable offset",
                            word_match.event.text
                        ))
                    })?;

            self.store.persist_record(&record).await?;
            written += 1;
        }

        Ok(written)
    }

    /// Send the run's outcome to `recipient`
    ///
    /// Returns whether a notification was delivered. A failed delivery is
    /// logged and does not alter the outcome.
    pub async fn report(
        &self,
        recipient: Option<Uuid>,
        recitation_id: Uuid,
        outcome: &RunOutcome,
    ) -> bool {
        let Some(recipient) = recipient else {
            tracing::debug!(run_id = %outcome.run_id(), "No recipient, skipping notification");
            return false;
        };

        let report = match outcome {
            RunOutcome::Completed { message, .. } => OutcomeReport {
                recipient,
                kind: NotificationKind::Success,
                controller: SUCCESS_CATEGORY.to_string(),
                category: SUCCESS_CATEGORY.to_string(),
                resource_uuid: recitation_id,
                description: success_description().to_string(),
                message: message.clone(),
            },
            RunOutcome::Failed {
                failed_in,
                cause,
                message,
                ..
            } => OutcomeReport {
                recipient,
                kind: NotificationKind::Failed,
                controller: failure_controller(*failed_in).to_string(),
                category: cause.category().to_string(),
                resource_uuid: recitation_id,
                description: failure_description().to_string(),
                message: message.clone(),
            },
        };

        match self.notifier.notify(&report).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    run_id = %outcome.run_id(),
                    recipient = %recipient,
                    error = %e,
                    "Failed to deliver outcome notification"
                );
                false
            }
        }
    }
}
