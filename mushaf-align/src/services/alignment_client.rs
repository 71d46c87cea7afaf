//! Forced-alignment service client
//!
//! `POST {api_url}/align` with `{"mp3_url", "text", "language"}` and decodes
//! the JSON array of `{"text", "start", "end"?}` word events. Exactly one
//! attempt per call; retry policy belongs to whoever schedules runs.

use crate::config::AlignmentConfig;
use crate::error::AlignmentServiceError;
use crate::models::TimedEvent;
use crate::services::ports::AlignmentService;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("mushaf-align/", env!("CARGO_PKG_VERSION"));

/// Request body
#[derive(Debug, Clone, Serialize)]
pub struct AlignRequest<'a> {
    pub mp3_url: &'a str,
    pub text: &'a str,
    pub language: &'a str,
}

/// One element of the response array
#[derive(Debug, Clone, Deserialize)]
struct WireEvent {
    text: String,
    start: f64,
    #[serde(default)]
    end: Option<f64>,
}

/// Alignment API client
pub struct AlignmentClient {
    http_client: reqwest::Client,
    endpoint: String,
    secret_key: Option<String>,
    language: String,
    timeout: Duration,
}

impl AlignmentClient {
    pub fn new(config: &AlignmentConfig) -> Result<Self, AlignmentServiceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AlignmentServiceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: config.align_endpoint(),
            secret_key: config
                .secret_key
                .clone()
                .filter(|k| crate::config::is_valid_key(k)),
            language: config.language.clone(),
            timeout: config.timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, err: reqwest::Error) -> AlignmentServiceError {
        if err.is_timeout() {
            AlignmentServiceError::Timeout(self.timeout)
        } else {
            AlignmentServiceError::Network(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl AlignmentService for AlignmentClient {
    async fn align(
        &self,
        audio_url: &str,
        text: &str,
    ) -> Result<Vec<TimedEvent>, AlignmentServiceError> {
        let body = AlignRequest {
            mp3_url: audio_url,
            text,
            language: &self.language,
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            text_len = text.len(),
            authenticated = self.secret_key.is_some(),
            "Requesting forced alignment"
        );

        let mut request = self.http_client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.secret_key {
            request = request.header(reqwest::header::AUTHORIZATION, key);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AlignmentServiceError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let raw = response.text().await.map_err(|e| self.map_send_error(e))?;
        let events = decode_events(&raw)?;

        tracing::info!(events = events.len(), "Forced alignment received");

        Ok(events)
    }
}

/// Decode and validate a response body
///
/// An `end` of exactly zero is treated as absent; negative or non-finite
/// offsets make the whole body malformed.
pub fn decode_events(raw: &str) -> Result<Vec<TimedEvent>, AlignmentServiceError> {
    let wire: Vec<WireEvent> = serde_json::from_str(raw)
        .map_err(|e| AlignmentServiceError::MalformedResponse(e.to_string()))?;

    wire.into_iter()
        .enumerate()
        .map(|(position, event)| {
            if !is_valid_offset(event.start) {
                return Err(AlignmentServiceError::MalformedResponse(format!(
                    "event {} has invalid start {}",
                    position, event.start
                )));
            }
            if let Some(end) = event.end {
                if !is_valid_offset(end) {
                    return Err(AlignmentServiceError::MalformedResponse(format!(
                        "event {} has invalid end {}",
                        position, end
                    )));
                }
            }

            Ok(TimedEvent {
                text: event.text,
                start: event.start,
                end: event.end.filter(|end| *end != 0.0),
            })
        })
        .collect()
}

fn is_valid_offset(seconds: f64) -> bool {
    seconds.is_finite() && seconds >= 0.0
}
