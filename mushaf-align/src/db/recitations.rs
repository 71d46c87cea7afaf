//! Recitation lookups

use crate::db::parse_uuid;
use crate::error::PersistenceError;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Creator of a recitation, the recipient of its run notifications
///
/// `Ok(None)` when the recitation exists without a creator.
pub async fn load_creator(
    pool: &SqlitePool,
    recitation_id: Uuid,
) -> Result<Option<Uuid>, PersistenceError> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT creator_guid FROM recitations WHERE guid = ?")
            .bind(recitation_id.to_string())
            .fetch_optional(pool)
            .await?;

    match row {
        None => Err(PersistenceError::NotFound(format!("recitation {}", recitation_id))),
        Some((None,)) => Ok(None),
        Some((Some(creator),)) => parse_uuid(&creator, "recitations.creator_guid").map(Some),
    }
}

pub async fn recitation_exists(
    pool: &SqlitePool,
    recitation_id: Uuid,
) -> Result<bool, PersistenceError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recitations WHERE guid = ?")
        .bind(recitation_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}
