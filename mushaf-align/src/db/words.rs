//! Word reads for token sequence construction

use crate::error::PersistenceError;
use crate::services::token_builder::WordRow;
use sqlx::SqlitePool;

/// All words of a surah in playback order (ayah number, then creation order)
pub async fn load_word_rows(
    pool: &SqlitePool,
    surah_id: i64,
) -> Result<Vec<WordRow>, PersistenceError> {
    let rows = sqlx::query_as::<_, (i64, i64, i64, String)>(
        r#"
        SELECT w.id, w.ayah_id, a.number, w.text
        FROM words w
        JOIN ayahs a ON a.id = w.ayah_id
        WHERE a.surah_id = ?
        ORDER BY a.number, w.id
        "#,
    )
    .bind(surah_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(word_id, ayah_id, ayah_number, text)| WordRow {
            word_id,
            ayah_id,
            ayah_number,
            text,
        })
        .collect())
}
