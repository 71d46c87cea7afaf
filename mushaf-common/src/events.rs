//! Event types and the in-process event bus
//!
//! Alignment runs publish their state transitions and terminal outcomes here.
//! Subscribers (log bridges, tests, future SSE streams) attach with
//! [`EventBus::subscribe`]; publishing never blocks and never fails a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Alignment run lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AlignmentEvent {
    /// Run moved from one state to the next
    RunStateChanged {
        run_id: Uuid,
        recitation_id: Uuid,
        surah_id: i64,
        /// State name before the transition (e.g. "PREPARING")
        old_state: String,
        /// State name after the transition
        new_state: String,
        timestamp: DateTime<Utc>,
    },

    /// Run reached DONE
    RunCompleted {
        run_id: Uuid,
        recitation_id: Uuid,
        surah_id: i64,
        /// Number of timestamp records written
        records: usize,
        timestamp: DateTime<Utc>,
    },

    /// Run reached FAILED
    RunFailed {
        run_id: Uuid,
        recitation_id: Uuid,
        surah_id: i64,
        /// State the run was in when it failed
        failed_in: String,
        /// Machine-readable failure category
        category: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl AlignmentEvent {
    pub fn run_id(&self) -> Uuid {
        match self {
            AlignmentEvent::RunStateChanged { run_id, .. }
            | AlignmentEvent::RunCompleted { run_id, .. }
            | AlignmentEvent::RunFailed { run_id, .. } => *run_id,
        }
    }
}

/// Broadcast bus for [`AlignmentEvent`]s
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AlignmentEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<AlignmentEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: AlignmentEvent,
    ) -> Result<usize, broadcast::error::SendError<AlignmentEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: AlignmentEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
