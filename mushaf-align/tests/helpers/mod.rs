//! Shared test fixtures
//!
//! - in-memory fakes for every run port
//! - a throwaway HTTP server standing in for the alignment service
//! - SQLite seeding for a small surah

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use mushaf_align::error::{AlignmentServiceError, PersistenceError};
use mushaf_align::models::{Association, TimedEvent, TimestampRecord, Token};
use mushaf_align::services::{
    AlignmentOrchestrator, AlignmentPorts, AlignmentService, AudioUrlResolver, Notifier,
    OutcomeReport, TimestampStore, TokenSource,
};
use serde_json::Value;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// Port fakes
// ============================================================================

pub fn tokens(texts: &[&str]) -> Vec<Token> {
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| Token {
            index,
            word_id: 1 + index as i64,
            ayah_id: 1,
            text: text.to_string(),
        })
        .collect()
}

pub struct FakeTokenSource {
    pub tokens: Vec<Token>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl TokenSource for FakeTokenSource {
    async fn tokens_for_surah(&self, _surah_id: i64) -> Result<Vec<Token>, PersistenceError> {
        if self.fail {
            return Err(PersistenceError::InvalidData("token store offline".to_string()));
        }
        Ok(self.tokens.clone())
    }
}

pub struct FakeAudioUrls {
    pub url: String,
}

#[async_trait::async_trait]
impl AudioUrlResolver for FakeAudioUrls {
    async fn resolve_audio_url(&self, _file_id: Uuid) -> Result<String, PersistenceError> {
        Ok(self.url.clone())
    }
}

/// Scripted alignment service behavior
pub enum AlignerBehavior {
    Events(Vec<TimedEvent>),
    Status(u16),
    Panic,
}

pub struct FakeAligner {
    pub behavior: AlignerBehavior,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<(String, String)>>,
}

impl FakeAligner {
    pub fn new(behavior: AlignerBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AlignmentService for FakeAligner {
    async fn align(
        &self,
        audio_url: &str,
        text: &str,
    ) -> Result<Vec<TimedEvent>, AlignmentServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((audio_url.to_string(), text.to_string()));

        match &self.behavior {
            AlignerBehavior::Events(events) => Ok(events.clone()),
            AlignerBehavior::Status(status) => Err(AlignmentServiceError::Status {
                status: *status,
                body: "Internal Server Error".to_string(),
            }),
            AlignerBehavior::Panic => panic!("aligner exploded"),
        }
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub association: Mutex<Option<Association>>,
    pub records: Mutex<Vec<TimestampRecord>>,
    pub cleared: AtomicUsize,
    /// Fail the write after this many successful writes
    pub fail_after: Option<usize>,
}

impl FakeStore {
    pub fn failing_after(writes: usize) -> Self {
        Self {
            fail_after: Some(writes),
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<TimestampRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TimestampStore for FakeStore {
    async fn ensure_association(
        &self,
        recitation_id: Uuid,
        surah_id: i64,
        file_id: Uuid,
    ) -> Result<Association, PersistenceError> {
        let mut slot = self.association.lock().unwrap();
        let association = slot.get_or_insert_with(|| Association {
            guid: Uuid::new_v4(),
            recitation_id,
            surah_id,
            file_id: Some(file_id),
        });
        Ok(association.clone())
    }

    async fn clear_records(&self, _association_id: Uuid) -> Result<u64, PersistenceError> {
        self.cleared.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }

    async fn persist_record(&self, record: &TimestampRecord) -> Result<(), PersistenceError> {
        let mut records = self.records.lock().unwrap();
        if let Some(limit) = self.fail_after {
            if records.len() >= limit {
                return Err(PersistenceError::InvalidData("disk full".to_string()));
            }
        }
        records.push(record.clone());
        Ok(())
    }
}

pub struct FakeNotifier {
    pub recipient: Option<Uuid>,
    pub reports: Mutex<Vec<OutcomeReport>>,
    pub fail: bool,
    pub panic_on_resolve: bool,
    pub panic_on_notify: bool,
}

impl FakeNotifier {
    pub fn with_recipient(recipient: Option<Uuid>) -> Self {
        Self {
            recipient,
            reports: Mutex::new(Vec::new()),
            fail: false,
            panic_on_resolve: false,
            panic_on_notify: false,
        }
    }

    pub fn reports(&self) -> Vec<OutcomeReport> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for FakeNotifier {
    async fn resolve_recipient(
        &self,
        _recitation_id: Uuid,
    ) -> Result<Option<Uuid>, PersistenceError> {
        if self.panic_on_resolve {
            panic!("user table unavailable");
        }
        Ok(self.recipient)
    }

    async fn notify(&self, report: &OutcomeReport) -> Result<(), PersistenceError> {
        self.reports.lock().unwrap().push(report.clone());
        if self.panic_on_notify {
            panic!("notification sink crashed");
        }
        if self.fail {
            return Err(PersistenceError::InvalidData("notification table locked".to_string()));
        }
        Ok(())
    }
}

/// Orchestrator wired to fakes, with handles for inspection
pub struct Harness {
    pub aligner: Arc<FakeAligner>,
    pub store: Arc<FakeStore>,
    pub notifier: Arc<FakeNotifier>,
    pub orchestrator: AlignmentOrchestrator,
}

pub struct HarnessBuilder {
    pub tokens: Vec<Token>,
    pub tokens_fail: bool,
    pub audio_url: String,
    pub behavior: AlignerBehavior,
    pub store: FakeStore,
    pub notifier: FakeNotifier,
}

impl HarnessBuilder {
    pub fn new(tokens: Vec<Token>, behavior: AlignerBehavior) -> Self {
        Self {
            tokens,
            tokens_fail: false,
            audio_url: "https://cdn.example.org/audio/001.mp3".to_string(),
            behavior,
            store: FakeStore::default(),
            notifier: FakeNotifier::with_recipient(Some(Uuid::new_v4())),
        }
    }

    pub fn build(self) -> Harness {
        let aligner = Arc::new(FakeAligner::new(self.behavior));
        let store = Arc::new(self.store);
        let notifier = Arc::new(self.notifier);

        let ports = AlignmentPorts {
            tokens: Arc::new(FakeTokenSource {
                tokens: self.tokens,
                fail: self.tokens_fail,
            }),
            audio_urls: Arc::new(FakeAudioUrls { url: self.audio_url }),
            aligner: aligner.clone(),
            store: store.clone(),
            notifier: notifier.clone(),
        };

        Harness {
            aligner,
            store,
            notifier,
            orchestrator: AlignmentOrchestrator::new(ports),
        }
    }
}

// ============================================================================
// Mock alignment service over HTTP
// ============================================================================

/// Request as seen by the mock service
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

/// Scripted HTTP response
#[derive(Clone)]
pub enum MockResponse {
    Json(Value),
    Status(u16, String),
    Raw(String),
    Delay(Duration),
}

#[derive(Clone)]
struct MockState {
    response: MockResponse,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

pub struct MockAlignmentServer {
    pub addr: SocketAddr,
    pub captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockAlignmentServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }
}

async fn mock_align(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    state.captured.lock().unwrap().push(CapturedRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    match state.response {
        MockResponse::Json(value) => Json(value).into_response(),
        MockResponse::Status(code, text) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            text,
        )
            .into_response(),
        MockResponse::Raw(text) => (StatusCode::OK, text).into_response(),
        MockResponse::Delay(delay) => {
            tokio::time::sleep(delay).await;
            Json(Value::Array(Vec::new())).into_response()
        }
    }
}

/// Start a mock alignment service on an ephemeral port
pub async fn spawn_mock_aligner(response: MockResponse) -> MockAlignmentServer {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        response,
        captured: captured.clone(),
    };

    let app = Router::new()
        .route("/align", post(mock_align))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockAlignmentServer { addr, captured }
}

// ============================================================================
// SQLite seeding
// ============================================================================

/// Identifiers of a seeded recitation
pub struct SeededRecitation {
    pub user_id: Uuid,
    pub recitation_id: Uuid,
    pub file_id: Uuid,
    pub surah_id: i64,
}

/// Seed surah 1 with `ayahs` (each a list of words) plus a recitation,
/// its creator and an audio file
pub async fn seed_surah(pool: &SqlitePool, ayahs: &[&[&str]]) -> SeededRecitation {
    let user_id = Uuid::new_v4();
    let recitation_id = Uuid::new_v4();
    let file_id = Uuid::new_v4();
    let surah_id = 1;

    sqlx::query("INSERT INTO users (guid, username) VALUES (?, ?)")
        .bind(user_id.to_string())
        .bind(format!("qari-{}", user_id))
        .execute(pool)
        .await
        .unwrap();

    sqlx::query("INSERT INTO surahs (id, number, name) VALUES (?, 1, 'Al-Fatiha')")
        .bind(surah_id)
        .execute(pool)
        .await
        .unwrap();

    for (i, words) in ayahs.iter().enumerate() {
        let ayah_id = 100 + i as i64;
        sqlx::query("INSERT INTO ayahs (id, surah_id, number) VALUES (?, ?, ?)")
            .bind(ayah_id)
            .bind(surah_id)
            .bind(i as i64 + 1)
            .execute(pool)
            .await
            .unwrap();
        for word in words.iter() {
            sqlx::query("INSERT INTO words (ayah_id, text) VALUES (?, ?)")
                .bind(ayah_id)
                .bind(*word)
                .execute(pool)
                .await
                .unwrap();
        }
    }

    sqlx::query("INSERT INTO recitations (guid, creator_guid, name) VALUES (?, ?, 'Test Recitation')")
        .bind(recitation_id.to_string())
        .bind(user_id.to_string())
        .execute(pool)
        .await
        .unwrap();

    sqlx::query("INSERT INTO files (guid, storage_key) VALUES (?, '001.mp3')")
        .bind(file_id.to_string())
        .execute(pool)
        .await
        .unwrap();

    SeededRecitation {
        user_id,
        recitation_id,
        file_id,
        surah_id,
    }
}
