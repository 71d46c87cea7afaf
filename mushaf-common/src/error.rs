//! Error type shared by the mushaf crates
//!
//! Covers the failures of root folder setup, TOML loading and schema
//! creation. Run-level failures live in `mushaf-align`.

use thiserror::Error;

/// Result alias for mushaf-common operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Connecting to or creating the schema of the SQLite database
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Creating the root folder or the database's parent directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable TOML file or a required setting that is missing
    #[error("Configuration error: {0}")]
    Config(String),
}
