//! Timestamp alignment endpoints
//!
//! - `POST /recitations/:recitation_id/surahs/:surah_id/timestamps` starts a run
//!   in the background and returns 202
//! - `GET  /recitations/:recitation_id/surahs/:surah_id/timestamps` lists the
//!   recorded timestamps in word order

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{files, recitation_surahs, recitations, timestamps};
use crate::db::timestamps::StoredTimestamp;
use crate::models::RunRequest;
use crate::{ApiError, ApiResult, AppState};

/// POST body
#[derive(Debug, Deserialize)]
pub struct StartAlignmentRequest {
    pub file_id: Uuid,
    #[serde(default)]
    pub replace_existing: bool,
}

/// POST response
#[derive(Debug, Serialize)]
pub struct StartAlignmentResponse {
    pub status: String,
    pub recitation_id: Uuid,
    pub surah_id: i64,
}

/// GET response
#[derive(Debug, Serialize)]
pub struct TimestampListResponse {
    pub association_id: Uuid,
    pub file_id: Option<Uuid>,
    pub timestamps: Vec<StoredTimestamp>,
}

/// POST /recitations/:recitation_id/surahs/:surah_id/timestamps
pub async fn start_alignment(
    State(state): State<AppState>,
    Path((recitation_id, surah_id)): Path<(Uuid, i64)>,
    Json(body): Json<StartAlignmentRequest>,
) -> ApiResult<(StatusCode, Json<StartAlignmentResponse>)> {
    if !recitations::recitation_exists(&state.db, recitation_id).await? {
        return Err(ApiError::NotFound(format!("recitation {}", recitation_id)));
    }
    // Unknown file → 404 via PersistenceError::NotFound
    files::load_file(&state.db, body.file_id).await?;

    let key = (recitation_id, surah_id);
    {
        let mut active = state.active_runs.write().await;
        if !active.insert(key) {
            return Err(ApiError::Conflict(format!(
                "alignment already running for recitation {} surah {}",
                recitation_id, surah_id
            )));
        }
    }

    let request = RunRequest {
        recitation_id,
        surah_id,
        file_id: body.file_id,
        replace_existing: body.replace_existing,
    };

    // The run gets its own task so the pair is released even if it aborts
    let task_state = state.clone();
    tokio::spawn(async move {
        let orchestrator = task_state.orchestrator.clone();
        let failure = match tokio::spawn(async move { orchestrator.run(request).await }).await {
            Ok(outcome) if outcome.is_success() => None,
            Ok(outcome) => Some(outcome.message().to_string()),
            Err(e) => {
                tracing::error!(
                    recitation_id = %key.0,
                    surah_id = key.1,
                    error = %e,
                    "Alignment task aborted"
                );
                Some(format!("Alignment task aborted: {}", e))
            }
        };

        if let Some(message) = failure {
            *task_state.last_error.write().await = Some(message);
        }
        task_state.active_runs.write().await.remove(&key);
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(StartAlignmentResponse {
            status: "accepted".to_string(),
            recitation_id,
            surah_id,
        }),
    ))
}

/// GET /recitations/:recitation_id/surahs/:surah_id/timestamps
pub async fn list_timestamps(
    State(state): State<AppState>,
    Path((recitation_id, surah_id)): Path<(Uuid, i64)>,
) -> ApiResult<Json<TimestampListResponse>> {
    let association = recitation_surahs::load_association(&state.db, recitation_id, surah_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "no timestamps for recitation {} surah {}",
                recitation_id, surah_id
            ))
        })?;

    let timestamps = timestamps::list_for_association(&state.db, association.guid).await?;

    Ok(Json(TimestampListResponse {
        association_id: association.guid,
        file_id: association.file_id,
        timestamps,
    }))
}

/// Build timestamp routes
pub fn timestamp_routes() -> Router<AppState> {
    Router::new().route(
        "/recitations/:recitation_id/surahs/:surah_id/timestamps",
        post(start_alignment).get(list_timestamps),
    )
}
