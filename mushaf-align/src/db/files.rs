//! Audio file references

use crate::error::PersistenceError;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Stored audio file reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub guid: Uuid,
    pub storage_key: String,
    pub public_url: Option<String>,
}

impl AudioFile {
    /// Public URL of the file
    ///
    /// Explicit `public_url` wins; otherwise the storage key is appended to
    /// `media_base_url`. Empty when neither is available.
    pub fn absolute_url(&self, media_base_url: Option<&str>) -> String {
        if let Some(url) = self.public_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.to_string();
        }

        match media_base_url {
            Some(base) if !self.storage_key.is_empty() => {
                format!("{}/{}", base.trim_end_matches('/'), self.storage_key)
            }
            _ => String::new(),
        }
    }
}

pub async fn load_file(pool: &SqlitePool, guid: Uuid) -> Result<AudioFile, PersistenceError> {
    let row = sqlx::query_as::<_, (String, Option<String>)>(
        "SELECT storage_key, public_url FROM files WHERE guid = ?",
    )
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| PersistenceError::NotFound(format!("file {}", guid)))?;

    Ok(AudioFile {
        guid,
        storage_key: row.0,
        public_url: row.1,
    })
}

pub async fn save_file(pool: &SqlitePool, file: &AudioFile) -> Result<(), PersistenceError> {
    sqlx::query(
        r#"
        INSERT INTO files (guid, storage_key, public_url)
        VALUES (?, ?, ?)
        ON CONFLICT(guid) DO UPDATE SET
            storage_key = excluded.storage_key,
            public_url = excluded.public_url
        "#,
    )
    .bind(file.guid.to_string())
    .bind(&file.storage_key)
    .bind(&file.public_url)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(public_url: Option<&str>) -> AudioFile {
        AudioFile {
            guid: Uuid::new_v4(),
            storage_key: "abc-123.mp3".to_string(),
            public_url: public_url.map(str::to_string),
        }
    }

    #[test]
    fn test_explicit_url_wins() {
        let url = file(Some("https://files/x.mp3")).absolute_url(Some("https://cdn"));
        assert_eq!(url, "https://files/x.mp3");
    }

    #[test]
    fn test_storage_key_joined_to_base() {
        assert_eq!(
            file(None).absolute_url(Some("https://cdn/audio/")),
            "https://cdn/audio/abc-123.mp3"
        );
    }

    #[test]
    fn test_unresolvable_url_is_empty() {
        assert_eq!(file(None).absolute_url(None), "");
        assert_eq!(file(Some("  ")).absolute_url(None), "");
    }
}
