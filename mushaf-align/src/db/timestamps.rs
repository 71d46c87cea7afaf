//! Timestamp record persistence

use crate::db::parse_uuid;
use crate::error::PersistenceError;
use crate::models::TimestampRecord;
use chrono::NaiveTime;
use mushaf_common::time::{format_time_of_day, parse_time_of_day};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Stored timestamp joined with its word
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredTimestamp {
    pub guid: Uuid,
    pub word_id: i64,
    pub ayah_number: i64,
    pub word_text: String,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
}

pub async fn insert_timestamp(
    pool: &SqlitePool,
    record: &TimestampRecord,
) -> Result<(), PersistenceError> {
    sqlx::query(
        r#"
        INSERT INTO recitation_surah_timestamps (
            guid, recitation_surah_guid, word_id, start_time, end_time, created_at
        ) VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(record.guid.to_string())
    .bind(record.association_id.to_string())
    .bind(record.word_id)
    .bind(format_time_of_day(&record.start_time))
    .bind(record.end_time.as_ref().map(format_time_of_day))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_for_association(
    pool: &SqlitePool,
    association_id: Uuid,
) -> Result<u64, PersistenceError> {
    let result =
        sqlx::query("DELETE FROM recitation_surah_timestamps WHERE recitation_surah_guid = ?")
            .bind(association_id.to_string())
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

pub async fn count_for_association(
    pool: &SqlitePool,
    association_id: Uuid,
) -> Result<i64, PersistenceError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM recitation_surah_timestamps WHERE recitation_surah_guid = ?",
    )
    .bind(association_id.to_string())
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Timestamps of an association in word order
pub async fn list_for_association(
    pool: &SqlitePool,
    association_id: Uuid,
) -> Result<Vec<StoredTimestamp>, PersistenceError> {
    let rows = sqlx::query_as::<_, (String, i64, i64, String, String, Option<String>)>(
        r#"
        SELECT t.guid, t.word_id, a.number, w.text, t.start_time, t.end_time
        FROM recitation_surah_timestamps t
        JOIN words w ON w.id = t.word_id
        JOIN ayahs a ON a.id = w.ayah_id
        WHERE t.recitation_surah_guid = ?
        ORDER BY a.number, w.id, t.created_at
        "#,
    )
    .bind(association_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(guid, word_id, ayah_number, word_text, start, end)| {
            Ok(StoredTimestamp {
                guid: parse_uuid(&guid, "recitation_surah_timestamps.guid")?,
                word_id,
                ayah_number,
                word_text,
                start_time: parse_time(&start)?,
                end_time: end.as_deref().map(parse_time).transpose()?,
            })
        })
        .collect()
}

fn parse_time(value: &str) -> Result<NaiveTime, PersistenceError> {
    parse_time_of_day(value)
        .map_err(|e| PersistenceError::InvalidData(format!("time '{}': {}", value, e)))
}
