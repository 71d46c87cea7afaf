//! Configuration resolution for mushaf-align
//!
//! Provides tiered resolution of the alignment service settings with
//! ENV → TOML priority. The resolved [`AlignmentConfig`] is passed explicitly
//! to the client and runner; nothing reads process-wide state after startup.

use mushaf_common::config::TomlConfig;
use mushaf_common::{Error, Result};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding `[alignment] api_url`
pub const API_URL_ENV: &str = "MUSHAF_ALIGNMENT_API_URL";
/// Environment variable overriding `[alignment] secret_key`
pub const SECRET_KEY_ENV: &str = "MUSHAF_ALIGNMENT_SECRET_KEY";
/// Environment variable overriding `[media] public_base_url`
pub const MEDIA_BASE_URL_ENV: &str = "MUSHAF_MEDIA_BASE_URL";

/// Per-call timeout for the alignment request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
/// Language tag sent with every alignment request
pub const DEFAULT_LANGUAGE: &str = "ar";

/// Forced-alignment service settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentConfig {
    /// Base URL; requests go to `{api_url}/align`
    pub api_url: String,
    /// Sent verbatim as the `Authorization` header when present
    pub secret_key: Option<String>,
    pub timeout: Duration,
    pub language: String,
}

impl AlignmentConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            secret_key: None,
            timeout: DEFAULT_TIMEOUT,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_secret_key(mut self, secret_key: Option<String>) -> Self {
        self.secret_key = secret_key.filter(|k| is_valid_key(k));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{api_url}/align`, tolerating a trailing slash on the base URL
    pub fn align_endpoint(&self) -> String {
        format!("{}/align", self.api_url.trim_end_matches('/'))
    }
}

/// Resolve alignment settings from ENV and TOML
///
/// **Priority:** ENV → TOML. An API URL is required; the secret key is
/// optional and ignored when blank.
pub fn resolve_alignment_config(toml_config: &TomlConfig) -> Result<AlignmentConfig> {
    let section = &toml_config.alignment;

    let api_url = match pick(std::env::var(API_URL_ENV).ok(), section.api_url.clone()) {
        Some((url, source)) => {
            info!("Alignment API URL loaded from {}", source);
            url
        }
        None => {
            return Err(Error::Config(format!(
                "Alignment API URL not configured. Please configure using one of:\n\
                 1. Environment: {}=http://host:port\n\
                 2. TOML config: [alignment] api_url = \"http://host:port\"",
                API_URL_ENV
            )))
        }
    };

    let secret_key = match pick(std::env::var(SECRET_KEY_ENV).ok(), section.secret_key.clone()) {
        Some((key, source)) => {
            info!("Alignment secret key loaded from {}", source);
            Some(key)
        }
        None => {
            warn!("No alignment secret key configured, requests will be unauthenticated");
            None
        }
    };

    let timeout = section
        .timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    let language = section
        .language
        .clone()
        .filter(|l| is_valid_key(l))
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    Ok(AlignmentConfig {
        api_url,
        secret_key,
        timeout,
        language,
    })
}

/// Resolve the public base URL used for files without an explicit URL
pub fn resolve_media_base_url(toml_config: &TomlConfig) -> Option<String> {
    pick(
        std::env::var(MEDIA_BASE_URL_ENV).ok(),
        toml_config.media.public_base_url.clone(),
    )
    .map(|(url, _)| url)
}

/// Validate a setting value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn pick(env_value: Option<String>, toml_value: Option<String>) -> Option<(String, &'static str)> {
    if let Some(value) = env_value.filter(|v| is_valid_key(v)) {
        return Some((value, "environment"));
    }
    toml_value
        .filter(|v| is_valid_key(v))
        .map(|value| (value, "TOML"))
}
