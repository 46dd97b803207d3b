//! AcoustID API client
//!
//! Looks up a Chromaprint fingerprint and turns the first matching recording
//! into a [`LookupSuggestion`].
//!
//! API Documentation: https://acoustid.org/webservice
//!
//! [`AcoustIdClient::lookup`] surfaces errors for logging and tests;
//! [`AcoustIdClient::suggest`] is what the scan uses and only ever degrades
//! to `None`.

use crate::models::{FingerprintResult, LookupSuggestion};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;

/// Production lookup endpoint
pub const ACOUSTID_BASE_URL: &str = "https://api.acoustid.org/v2/lookup";

/// AcoustID asks clients to stay at or below 3 requests per second
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 3;

/// Metadata requested alongside each match
const LOOKUP_META: &str = "recordings releases releasegroups compress";

const USER_AGENT: &str = concat!("gpf-scan/", env!("CARGO_PKG_VERSION"));

/// AcoustID client errors
#[derive(Debug, Error)]
pub enum LookupError {
    /// No API key configured
    #[error("AcoustID lookup disabled (no API key)")]
    Disabled,

    /// Fingerprint input unusable
    #[error("Invalid fingerprint input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("No matches found for fingerprint")]
    NoMatches,
}

/// Remote lookup configuration
///
/// `api_key: None` is the explicit "lookup disabled" state.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub requests_per_second: u32,
}

impl LookupConfig {
    /// Lookup disabled
    pub fn disabled() -> Self {
        Self {
            api_key: None,
            ..Self::default()
        }
    }

    /// Production endpoint with the given key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key
            .as_deref()
            .map(gpf_common::config::is_valid_key)
            .unwrap_or(false)
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: ACOUSTID_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(5),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
        }
    }
}

/// AcoustID lookup response
#[derive(Debug, Clone, Deserialize)]
pub struct AcoustIdResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<AcoustIdResult>,
    pub error: Option<AcoustIdApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcoustIdApiError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcoustIdResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub recordings: Vec<AcoustIdRecording>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcoustIdRecording {
    #[serde(default)]
    pub id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Vec<AcoustIdArtist>,
    #[serde(default)]
    pub releases: Vec<AcoustIdRelease>,
    #[serde(default)]
    pub releasegroups: Vec<AcoustIdRelease>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcoustIdArtist {
    #[serde(default)]
    pub name: String,
}

/// Release or release group (both carry a title)
#[derive(Debug, Clone, Deserialize)]
pub struct AcoustIdRelease {
    pub title: Option<String>,
}

impl AcoustIdResponse {
    /// Suggestion from the first result's first recording
    pub fn first_suggestion(&self) -> Option<LookupSuggestion> {
        let recording = self.results.first()?.recordings.first()?;

        let album = recording
            .releases
            .first()
            .or_else(|| recording.releasegroups.first())
            .and_then(|r| r.title.clone())
            .unwrap_or_default();

        Some(LookupSuggestion {
            title: recording.title.clone().unwrap_or_default(),
            artist: recording
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            album,
        })
    }
}

type DirectRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// AcoustID API client
pub struct AcoustIdClient {
    client: Client,
    config: LookupConfig,
    rate_limiter: DirectRateLimiter,
}

impl AcoustIdClient {
    /// Build a client; succeeds for disabled configs as well
    pub fn new(config: LookupConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Query AcoustID for a fingerprint
    ///
    /// Fails with [`LookupError::NoMatches`] when the service knows no
    /// recording for the fingerprint.
    pub async fn lookup(
        &self,
        fingerprint: &FingerprintResult,
    ) -> Result<AcoustIdResponse, LookupError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if gpf_common::config::is_valid_key(key) => key,
            _ => return Err(LookupError::Disabled),
        };

        if fingerprint.fingerprint.is_empty() {
            return Err(LookupError::InvalidInput("empty fingerprint".to_string()));
        }
        if !fingerprint.duration.is_finite() || fingerprint.duration < 0.0 {
            return Err(LookupError::InvalidInput(format!(
                "invalid duration {}",
                fingerprint.duration
            )));
        }

        self.rate_limiter.until_ready().await;

        let duration_secs = (fingerprint.duration.round() as u64).to_string();
        let params = [
            ("client", api_key),
            ("meta", LOOKUP_META),
            ("fingerprint", fingerprint.fingerprint.as_str()),
            ("duration", duration_secs.as_str()),
        ];

        tracing::debug!(
            duration = %duration_secs,
            fingerprint_len = fingerprint.fingerprint.len(),
            "Querying AcoustID API"
        );

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::ApiError(status.as_u16(), error_text));
        }

        let body: AcoustIdResponse = response
            .json()
            .await
            .map_err(|e| LookupError::ParseError(e.to_string()))?;

        if body.status != "ok" {
            let message = body
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| body.status.clone());
            return Err(LookupError::ApiError(status.as_u16(), message));
        }

        if body.results.is_empty() {
            return Err(LookupError::NoMatches);
        }

        if let Some(top) = body.results.first() {
            tracing::debug!(
                acoustid = %top.id,
                score = top.score,
                recordings = top.recordings.len(),
                "AcoustID lookup successful"
            );
        }

        Ok(body)
    }

    /// Best-effort suggestion: every failure becomes `None`
    pub async fn suggest(&self, fingerprint: &FingerprintResult) -> Option<LookupSuggestion> {
        match self.lookup(fingerprint).await {
            Ok(response) => response.first_suggestion(),
            Err(LookupError::Disabled) => None,
            Err(LookupError::NoMatches) => {
                tracing::debug!("AcoustID returned no matches");
                None
            }
            Err(e) => {
                tracing::warn!("AcoustID lookup failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AcoustIdResponse {
        serde_json::from_str(json).unwrap()
    }

    fn fingerprint() -> FingerprintResult {
        FingerprintResult {
            fingerprint: "AQADtE".to_string(),
            duration: 201.6,
        }
    }

    #[test]
    fn test_first_suggestion_full() {
        let response = parse(
            r#"{
                "status": "ok",
                "results": [{
                    "id": "acoustid-1",
                    "score": 0.97,
                    "recordings": [{
                        "id": "mbid-1",
                        "title": "Strings of Life",
                        "artists": [{"id": "a1", "name": "Rhythim Is Rhythim"}, {"id": "a2", "name": "Derrick May"}],
                        "releases": [{"id": "r1", "title": "Innovator"}, {"id": "r2", "title": "Other"}]
                    }, {
                        "id": "mbid-2",
                        "title": "Ignored"
                    }]
                }, {
                    "id": "acoustid-2",
                    "score": 0.5,
                    "recordings": [{"id": "mbid-3", "title": "Also ignored"}]
                }]
            }"#,
        );

        assert_eq!(
            response.first_suggestion(),
            Some(LookupSuggestion {
                title: "Strings of Life".to_string(),
                artist: "Rhythim Is Rhythim, Derrick May".to_string(),
                album: "Innovator".to_string(),
            })
        );
    }

    #[test]
    fn test_first_suggestion_missing_fields_default_empty() {
        let response = parse(
            r#"{"status": "ok", "results": [{"id": "x", "score": 0.9, "recordings": [{"id": "m"}]}]}"#,
        );
        assert_eq!(response.first_suggestion(), Some(LookupSuggestion::default()));
    }

    #[test]
    fn test_release_group_fallback() {
        let response = parse(
            r#"{"status": "ok", "results": [{"id": "x", "score": 0.9, "recordings": [
                {"id": "m", "title": "T", "releasegroups": [{"id": "g", "title": "Group Title"}]}
            ]}]}"#,
        );
        assert_eq!(response.first_suggestion().unwrap().album, "Group Title");
    }

    #[test]
    fn test_no_recordings_no_suggestion() {
        let no_results = parse(r#"{"status": "ok", "results": []}"#);
        assert!(no_results.first_suggestion().is_none());

        let no_recordings = parse(r#"{"status": "ok", "results": [{"id": "x", "score": 0.4}]}"#);
        assert!(no_recordings.first_suggestion().is_none());
    }

    #[test]
    fn test_lookup_config_enabled() {
        assert!(!LookupConfig::disabled().is_enabled());
        assert!(!LookupConfig::with_api_key("  ").is_enabled());
        assert!(LookupConfig::with_api_key("key").is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_client_never_suggests() {
        let client = AcoustIdClient::new(LookupConfig::disabled()).unwrap();
        assert!(!client.is_enabled());
        assert!(matches!(
            client.lookup(&fingerprint()).await,
            Err(LookupError::Disabled)
        ));
        assert!(client.suggest(&fingerprint()).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_fingerprint_rejected() {
        let client = AcoustIdClient::new(LookupConfig::with_api_key("key")).unwrap();
        let empty = FingerprintResult {
            fingerprint: String::new(),
            duration: 100.0,
        };
        assert!(matches!(
            client.lookup(&empty).await,
            Err(LookupError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_degrades() {
        let config = LookupConfig {
            base_url: "http://127.0.0.1:9/v2/lookup".to_string(),
            timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(1),
            ..LookupConfig::with_api_key("key")
        };
        let client = AcoustIdClient::new(config).unwrap();
        assert!(client.suggest(&fingerprint()).await.is_none());
    }

    #[test]
    fn test_zero_rate_is_clamped() {
        let config = LookupConfig {
            requests_per_second: 0,
            ..LookupConfig::with_api_key("key")
        };
        assert!(AcoustIdClient::new(config).is_ok());
    }
}
