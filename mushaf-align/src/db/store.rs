//! SQLite implementation of the run's data-store ports

use crate::db::{files, notifications, recitation_surahs, recitations, timestamps, words};
use crate::error::PersistenceError;
use crate::models::{Association, TimestampRecord, Token};
use crate::services::ports::{
    AudioUrlResolver, Notifier, OutcomeReport, TimestampStore, TokenSource,
};
use crate::services::token_builder::build_tokens;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Token source, audio URL resolver, timestamp store and notifier backed by
/// one SQLite pool
#[derive(Clone)]
pub struct SqliteAlignmentStore {
    pool: SqlitePool,
    media_base_url: Option<String>,
}

impl SqliteAlignmentStore {
    pub fn new(pool: SqlitePool, media_base_url: Option<String>) -> Self {
        Self {
            pool,
            media_base_url,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl TokenSource for SqliteAlignmentStore {
    async fn tokens_for_surah(&self, surah_id: i64) -> Result<Vec<Token>, PersistenceError> {
        let rows = words::load_word_rows(&self.pool, surah_id).await?;
        Ok(build_tokens(rows))
    }
}

#[async_trait::async_trait]
impl AudioUrlResolver for SqliteAlignmentStore {
    async fn resolve_audio_url(&self, file_id: Uuid) -> Result<String, PersistenceError> {
        let file = files::load_file(&self.pool, file_id).await?;
        Ok(file.absolute_url(self.media_base_url.as_deref()))
    }
}

#[async_trait::async_trait]
impl TimestampStore for SqliteAlignmentStore {
    async fn ensure_association(
        &self,
        recitation_id: Uuid,
        surah_id: i64,
        file_id: Uuid,
    ) -> Result<Association, PersistenceError> {
        recitation_surahs::ensure_association(&self.pool, recitation_id, surah_id, file_id).await
    }

    async fn clear_records(&self, association_id: Uuid) -> Result<u64, PersistenceError> {
        timestamps::delete_for_association(&self.pool, association_id).await
    }

    async fn persist_record(&self, record: &TimestampRecord) -> Result<(), PersistenceError> {
        timestamps::insert_timestamp(&self.pool, record).await
    }
}

#[async_trait::async_trait]
impl Notifier for SqliteAlignmentStore {
    async fn resolve_recipient(
        &self,
        recitation_id: Uuid,
    ) -> Result<Option<Uuid>, PersistenceError> {
        recitations::load_creator(&self.pool, recitation_id).await
    }

    async fn notify(&self, report: &OutcomeReport) -> Result<(), PersistenceError> {
        notifications::insert_notification(&self.pool, report).await?;
        Ok(())
    }
}
