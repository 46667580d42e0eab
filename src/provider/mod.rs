use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use crate::normalize::preview;

/// Upper bound on the operational log record of an upstream payload.
const LOG_LIMIT: usize = 3000;

/// Upper bound on the error-body excerpt carried back to the caller.
const BODY_LIMIT: usize = 2000;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// The request could not be sent at all, or timed out.
    #[error("{0}")]
    Unavailable(String),
    /// The endpoint answered with a non-success status.
    #[error("completion endpoint returned status {status}")]
    Upstream { status: u16, body: String },
}

/// One fully-resolved upstream call. The caller guarantees url and api_key
/// are present before constructing this.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub url: String,
    pub api_key: String,
    pub model: String,
    pub instruction: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub payload: Value,
    pub elapsed: Duration,
}

/// Seam for the hosted completion API; tests swap in a mock.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, req: &CompletionRequest) -> Result<Completion, ProviderError>;
}

/// Real client: one bearer-authenticated POST with a fixed timeout, a single
/// attempt per request.
pub struct HttpCompletionClient {
    client: Client,
    timeout: Duration,
}

impl HttpCompletionClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, req: &CompletionRequest) -> Result<Completion, ProviderError> {
        let body = json!({
            "model": req.model,
            "prompt": req.instruction,
            "max_tokens": req.max_tokens,
        });

        let started = Instant::now();
        let resp = self
            .client
            .post(&req.url)
            .bearer_auth(&req.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        let elapsed = started.elapsed();

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body: preview(&text, BODY_LIMIT),
            });
        }

        // A non-JSON body is a legal plain-string payload; the normalizer
        // handles both.
        let payload: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) => Value::String(text),
        };

        tracing::debug!(
            status = status.as_u16(),
            took_ms = elapsed.as_millis() as u64,
            payload = %preview(&payload.to_string(), LOG_LIMIT),
            "upstream response"
        );

        Ok(Completion { payload, elapsed })
    }
}
