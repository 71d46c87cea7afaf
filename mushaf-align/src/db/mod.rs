//! Database access for mushaf-align
//!
//! Entity modules expose plain async functions over a `SqlitePool`;
//! [`store::SqliteAlignmentStore`] adapts them to the run's capability traits.

pub mod files;
pub mod notifications;
pub mod recitation_surahs;
pub mod recitations;
pub mod store;
pub mod timestamps;
pub mod words;

pub use store::SqliteAlignmentStore;

use crate::error::PersistenceError;
use uuid::Uuid;

/// Parse a TEXT uuid column
pub(crate) fn parse_uuid(value: &str, column: &str) -> Result<Uuid, PersistenceError> {
    Uuid::parse_str(value)
        .map_err(|e| PersistenceError::InvalidData(format!("{} '{}': {}", column, value, e)))
}
