//! mushaf-align library interface
//!
//! Word-level timestamp alignment for recited surahs: fetches word timings
//! from a forced-alignment service, matches them to the canonical word
//! sequence and records the result.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use crate::config::AlignmentConfig;
use crate::error::AlignmentServiceError;
use crate::services::{AlignmentClient, AlignmentOrchestrator, AlignmentPorts};
use axum::Router;
use chrono::{DateTime, Utc};
use mushaf_common::events::EventBus;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for run lifecycle events
    pub event_bus: EventBus,
    /// Drives alignment runs
    pub orchestrator: Arc<AlignmentOrchestrator>,
    /// (recitation, surah) pairs with a run in flight in this process
    pub active_runs: Arc<RwLock<HashSet<(Uuid, i64)>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last run failure for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool, event_bus: EventBus, orchestrator: Arc<AlignmentOrchestrator>) -> Self {
        Self {
            db,
            event_bus,
            orchestrator,
            active_runs: Arc::new(RwLock::new(HashSet::new())),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Wire the production collaborators: SQLite for data, HTTP for alignment
pub fn build_orchestrator(
    db: SqlitePool,
    event_bus: EventBus,
    alignment: &AlignmentConfig,
    media_base_url: Option<String>,
) -> Result<AlignmentOrchestrator, AlignmentServiceError> {
    let store = Arc::new(db::SqliteAlignmentStore::new(db, media_base_url));
    let client = Arc::new(AlignmentClient::new(alignment)?);

    let ports = AlignmentPorts {
        tokens: store.clone(),
        audio_urls: store.clone(),
        aligner: client,
        store: store.clone(),
        notifier: store,
    };

    Ok(AlignmentOrchestrator::new(ports).with_event_bus(event_bus))
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::timestamp_routes())
        .merge(api::health_routes())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
