//! Alignment run orchestrator
//!
//! Drives one (recitation, surah) run through its states:
//! PREPARING → FETCHING_ALIGNMENT → MATCHING → PERSISTING → DONE
//!
//! Every failure, including a panic inside a collaborator, is absorbed at the
//! run boundary and converted into a [`RunOutcome::Failed`]. The recipient,
//! when one is resolvable, receives exactly one notification per run. A panic
//! in recipient lookup or delivery is logged and leaves the outcome unchanged.

use crate::error::{MissingInputError, RunFailure};
use crate::models::{AlignmentRun, RunOutcome, RunRequest, RunState};
use crate::services::ports::{
    AlignmentService, AudioUrlResolver, Notifier, TimestampStore, TokenSource,
};
use crate::services::result_sink::{failure_message, success_message, ResultSink};
use crate::services::sequential_matcher::match_sequences_with_stats;
use crate::services::token_builder::joined_text;
use futures::FutureExt;
use mushaf_common::events::{AlignmentEvent, EventBus};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Collaborators of a run
#[derive(Clone)]
pub struct AlignmentPorts {
    pub tokens: Arc<dyn TokenSource>,
    pub audio_urls: Arc<dyn AudioUrlResolver>,
    pub aligner: Arc<dyn AlignmentService>,
    pub store: Arc<dyn TimestampStore>,
    pub notifier: Arc<dyn Notifier>,
}

/// Alignment orchestrator service
///
/// Holds no per-run state, so one instance can drive many concurrent runs.
pub struct AlignmentOrchestrator {
    tokens: Arc<dyn TokenSource>,
    audio_urls: Arc<dyn AudioUrlResolver>,
    aligner: Arc<dyn AlignmentService>,
    store: Arc<dyn TimestampStore>,
    notifier: Arc<dyn Notifier>,
    sink: ResultSink,
    event_bus: Option<EventBus>,
}

impl AlignmentOrchestrator {
    pub fn new(ports: AlignmentPorts) -> Self {
        let sink = ResultSink::new(ports.store.clone(), ports.notifier.clone());
        Self {
            tokens: ports.tokens,
            audio_urls: ports.audio_urls,
            aligner: ports.aligner,
            store: ports.store,
            notifier: ports.notifier,
            sink,
            event_bus: None,
        }
    }

    /// Publish state transitions on `event_bus`
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Execute one alignment run to a terminal state
    pub async fn run(&self, request: RunRequest) -> RunOutcome {
        let mut run = AlignmentRun::new(request);
        let recitation_id = run.request.recitation_id;

        tracing::info!(
            run_id = %run.run_id,
            recitation_id = %recitation_id,
            surah_id = run.request.surah_id,
            file_id = %run.request.file_id,
            "Starting timestamp alignment"
        );

        let recipient = match AssertUnwindSafe(self.notifier.resolve_recipient(recitation_id))
            .catch_unwind()
            .await
        {
            Ok(Ok(recipient)) => recipient,
            Ok(Err(e)) => {
                tracing::warn!(
                    run_id = %run.run_id,
                    error = %e,
                    "Could not resolve notification recipient"
                );
                None
            }
            Err(panic) => {
                tracing::warn!(
                    run_id = %run.run_id,
                    panic = %panic_message(panic),
                    "Recipient lookup panicked, continuing without recipient"
                );
                None
            }
        };

        let result = AssertUnwindSafe(self.execute(&mut run))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(RunFailure::Unexpected(panic_message(panic))));

        let outcome = match result {
            Ok(records) => {
                self.transition(&mut run, RunState::Done);
                tracing::info!(
                    run_id = %run.run_id,
                    records,
                    "Timestamp alignment completed"
                );
                RunOutcome::Completed {
                    run_id: run.run_id,
                    records,
                    message: success_message(recitation_id),
                }
            }
            Err(cause) => {
                let failed_in = run.state;
                self.transition(&mut run, RunState::Failed);
                tracing::error!(
                    run_id = %run.run_id,
                    failed_in = %failed_in,
                    category = cause.category(),
                    error = %cause,
                    "Timestamp alignment failed"
                );
                RunOutcome::Failed {
                    run_id: run.run_id,
                    failed_in,
                    message: failure_message(recitation_id, &cause),
                    cause,
                }
            }
        };

        if let Err(panic) = AssertUnwindSafe(self.sink.report(recipient, recitation_id, &outcome))
            .catch_unwind()
            .await
        {
            tracing::error!(
                run_id = %run.run_id,
                panic = %panic_message(panic),
                "Outcome notification panicked"
            );
        }
        self.publish_outcome(&run, &outcome);

        outcome
    }

    async fn execute(&self, run: &mut AlignmentRun) -> Result<usize, RunFailure> {
        let request = run.request.clone();

        // PREPARING
        let association = self
            .store
            .ensure_association(request.recitation_id, request.surah_id, request.file_id)
            .await?;
        let audio_url = self.audio_urls.resolve_audio_url(request.file_id).await?;
        let tokens = self.tokens.tokens_for_surah(request.surah_id).await?;
        let text = joined_text(&tokens);

        tracing::debug!(
            run_id = %run.run_id,
            association = %association.guid,
            tokens = tokens.len(),
            "Run prepared"
        );

        if audio_url.is_empty() || text.is_empty() {
            return Err(MissingInputError {
                audio_url_missing: audio_url.is_empty(),
                text_missing: text.is_empty(),
            }
            .into());
        }

        self.transition(run, RunState::FetchingAlignment);
        let events = self.aligner.align(&audio_url, &text).await?;

        self.transition(run, RunState::Matching);
        let (matches, stats) = match_sequences_with_stats(&tokens, &events);
        tracing::info!(
            run_id = %run.run_id,
            tokens = stats.tokens,
            events = stats.events,
            matched = stats.matched,
            unexamined = stats.events_unexamined,
            "Matched alignment events to words"
        );

        self.transition(run, RunState::Persisting);
        let written = self
            .sink
            .persist_matches(&association, &matches, request.replace_existing)
            .await?;

        Ok(written)
    }

    fn transition(&self, run: &mut AlignmentRun, new_state: RunState) {
        let transition = run.transition_to(new_state);

        tracing::info!(
            run_id = %transition.run_id,
            from = %transition.old_state,
            to = %transition.new_state,
            "Run state changed"
        );

        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(AlignmentEvent::RunStateChanged {
                run_id: transition.run_id,
                recitation_id: run.request.recitation_id,
                surah_id: run.request.surah_id,
                old_state: transition.old_state.to_string(),
                new_state: transition.new_state.to_string(),
                timestamp: transition.transitioned_at,
            });
        }
    }

    fn publish_outcome(&self, run: &AlignmentRun, outcome: &RunOutcome) {
        let Some(bus) = &self.event_bus else {
            return;
        };

        let timestamp = run.ended_at.unwrap_or_else(mushaf_common::time::now);
        let event = match outcome {
            RunOutcome::Completed { records, .. } => AlignmentEvent::RunCompleted {
                run_id: run.run_id,
                recitation_id: run.request.recitation_id,
                surah_id: run.request.surah_id,
                records: *records,
                timestamp,
            },
            RunOutcome::Failed {
                failed_in,
                cause,
                message,
                ..
            } => AlignmentEvent::RunFailed {
                run_id: run.run_id,
                recitation_id: run.request.recitation_id,
                surah_id: run.request.surah_id,
                failed_in: failed_in.to_string(),
                category: cause.category().to_string(),
                message: message.clone(),
                timestamp,
            },
        };

        bus.emit_lossy(event);
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic during alignment run".to_string()
    }
}
