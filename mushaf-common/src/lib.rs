//! # Mushaf Common Library
//!
//! Shared code for the mushaf services including:
//! - Database initialization and schema
//! - Event types (AlignmentEvent enum) and the in-process event bus
//! - Configuration loading and root folder resolution
//! - Time-of-day conversion for word offsets

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
