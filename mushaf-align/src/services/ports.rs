//! Capability interfaces consumed by the alignment runner
//!
//! Each collaborator of a run sits behind one of these traits so that the
//! runner can be driven by the SQLite/HTTP implementations in production and
//! by in-memory fakes in tests.

use crate::error::{AlignmentServiceError, PersistenceError};
use crate::models::{Association, TimedEvent, TimestampRecord, Token};
use uuid::Uuid;

/// Supplies the canonical word sequence of a surah
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    /// Words ordered by (ayah number, creation order), indexed from 0
    async fn tokens_for_surah(&self, surah_id: i64) -> Result<Vec<Token>, PersistenceError>;
}

/// Resolves an audio file reference to a publicly fetchable URL
#[async_trait::async_trait]
pub trait AudioUrlResolver: Send + Sync {
    /// May return an empty string when the file has no resolvable location
    async fn resolve_audio_url(&self, file_id: Uuid) -> Result<String, PersistenceError>;
}

/// External forced-alignment service
#[async_trait::async_trait]
pub trait AlignmentService: Send + Sync {
    /// One attempt, no retries
    async fn align(
        &self,
        audio_url: &str,
        text: &str,
    ) -> Result<Vec<TimedEvent>, AlignmentServiceError>;
}

/// Association and timestamp persistence
#[async_trait::async_trait]
pub trait TimestampStore: Send + Sync {
    /// Reuse the existing association for the pair, attaching `file_id` if it
    /// has none; create it otherwise. Never creates a second association.
    async fn ensure_association(
        &self,
        recitation_id: Uuid,
        surah_id: i64,
        file_id: Uuid,
    ) -> Result<Association, PersistenceError>;

    /// Delete every record of an association, returning how many were removed
    async fn clear_records(&self, association_id: Uuid) -> Result<u64, PersistenceError>;

    async fn persist_record(&self, record: &TimestampRecord) -> Result<(), PersistenceError>;
}

/// Success or failure of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failed,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Failed => "failed",
        }
    }
}

/// Terminal outcome report handed to the notification collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeReport {
    pub recipient: Uuid,
    pub kind: NotificationKind,
    /// Resource controller stored with the notification row
    pub controller: String,
    /// Machine-readable category: "recitations" on success, the failure
    /// category (e.g. "alignment_service") otherwise
    pub category: String,
    /// Recitation the report is about
    pub resource_uuid: Uuid,
    pub description: String,
    pub message: String,
}

/// Outcome notification delivery
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// User to notify about runs of this recitation, if any
    async fn resolve_recipient(&self, recitation_id: Uuid)
        -> Result<Option<Uuid>, PersistenceError>;

    async fn notify(&self, report: &OutcomeReport) -> Result<(), PersistenceError>;
}
