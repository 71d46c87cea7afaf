//! Recitation-surah association records

use crate::db::parse_uuid;
use crate::error::PersistenceError;
use crate::models::Association;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Get or create the association for (recitation, surah)
///
/// An existing association is reused; if it has no file yet, `file_id` is
/// attached. The UNIQUE constraint keeps concurrent callers from creating a
/// second row.
pub async fn ensure_association(
    pool: &SqlitePool,
    recitation_id: Uuid,
    surah_id: i64,
    file_id: Uuid,
) -> Result<Association, PersistenceError> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO recitation_surahs (guid, recitation_guid, surah_id, file_guid)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(recitation_guid, surah_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(recitation_id.to_string())
    .bind(surah_id)
    .bind(file_id.to_string())
    .execute(pool)
    .await?
    .rows_affected();

    if inserted == 0 {
        let attached = sqlx::query(
            r#"
            UPDATE recitation_surahs SET file_guid = ?
            WHERE recitation_guid = ? AND surah_id = ? AND file_guid IS NULL
            "#,
        )
        .bind(file_id.to_string())
        .bind(recitation_id.to_string())
        .bind(surah_id)
        .execute(pool)
        .await?
        .rows_affected();

        if attached > 0 {
            tracing::info!(
                recitation_id = %recitation_id,
                surah_id,
                file_id = %file_id,
                "Attached audio file to existing association"
            );
        }
    }

    load_association(pool, recitation_id, surah_id)
        .await?
        .ok_or_else(|| {
            PersistenceError::NotFound(format!(
                "association for recitation {} surah {}",
                recitation_id, surah_id
            ))
        })
}

pub async fn load_association(
    pool: &SqlitePool,
    recitation_id: Uuid,
    surah_id: i64,
) -> Result<Option<Association>, PersistenceError> {
    let row = sqlx::query_as::<_, (String, Option<String>)>(
        "SELECT guid, file_guid FROM recitation_surahs WHERE recitation_guid = ? AND surah_id = ?",
    )
    .bind(recitation_id.to_string())
    .bind(surah_id)
    .fetch_optional(pool)
    .await?;

    let Some((guid, file_guid)) = row else {
        return Ok(None);
    };

    Ok(Some(Association {
        guid: parse_uuid(&guid, "recitation_surahs.guid")?,
        recitation_id,
        surah_id,
        file_id: file_guid
            .as_deref()
            .map(|f| parse_uuid(f, "recitation_surahs.file_guid"))
            .transpose()?,
    }))
}

pub async fn count_associations(
    pool: &SqlitePool,
    recitation_id: Uuid,
) -> Result<i64, PersistenceError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM recitation_surahs WHERE recitation_guid = ?")
            .bind(recitation_id.to_string())
            .fetch_one(pool)
            .await?;
    Ok(count)
}
