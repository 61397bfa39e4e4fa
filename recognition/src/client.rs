use std::time::Duration;

use async_trait::async_trait;
use common::config::AppConfig;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use services::error::{AttendanceError, Result};

/// What the recognition service says about a (reference, probe) pair.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchResult {
    pub verified: bool,
    pub confidence: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Seam over the external recognition service so the pipeline and the API
/// handlers can be exercised without a live deployment.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn verify_face(&self, reference: &[u8], probe: &[u8]) -> Result<MatchResult>;
    async fn verify_voice(&self, reference: &[u8], probe: &[u8]) -> Result<MatchResult>;
}

/// Talks to the deployed recognition service over HTTP multipart.
pub struct HttpRecognizer {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRecognizer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config() -> Self {
        let config = AppConfig::global();
        Self::new(
            config.recognition_service_url.clone(),
            Duration::from_secs(config.recognition_timeout_seconds),
        )
    }

    async fn post_pair(&self, path: &str, reference: &[u8], probe: &[u8]) -> Result<MatchResult> {
        let form = Form::new()
            .part(
                "reference",
                Part::bytes(reference.to_vec()).file_name("reference"),
            )
            .part("probe", Part::bytes(probe.to_vec()).file_name("probe"));

        let request = self
            .client
            .post(format!("{}{}", self.base_url.trim_end_matches('/'), path))
            .multipart(form)
            .send();

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| {
                AttendanceError::RecognitionUnavailable(format!(
                    "{} timed out after {}s",
                    path,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AttendanceError::RecognitionUnavailable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AttendanceError::RecognitionUnavailable(format!(
                "{path} returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(AttendanceError::Validation(format!(
                "recognition service rejected the request: {status}"
            )));
        }

        response
            .json::<MatchResult>()
            .await
            .map_err(|e| AttendanceError::RecognitionUnavailable(format!("bad response body: {e}")))
    }
}

#[async_trait]
impl Recognizer for HttpRecognizer {
    async fn verify_face(&self, reference: &[u8], probe: &[u8]) -> Result<MatchResult> {
        self.post_pair("/verify-face", reference, probe).await
    }

    async fn verify_voice(&self, reference: &[u8], probe: &[u8]) -> Result<MatchResult> {
        self.post_pair("/verify-voice", reference, probe).await
    }
}
