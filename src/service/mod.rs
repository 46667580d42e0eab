use std::sync::Arc;

use crate::config::Config;
use crate::errors::ApiError;
use crate::normalize::{self, Bundle};
use crate::prompt;
use crate::provider::{CompletionClient, CompletionRequest};

/// Orchestrates one generation: validate the prompt, make a single upstream
/// attempt, normalize the payload. No retries anywhere.
pub struct BundleService {
    config: Arc<Config>,
    client: Arc<dyn CompletionClient>,
}

impl BundleService {
    pub fn new(config: Arc<Config>, client: Arc<dyn CompletionClient>) -> Self {
        Self { config, client }
    }

    pub async fn generate(&self, prompt: &str) -> Result<Bundle, ApiError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ApiError::InvalidInput(
                "missing prompt string in request body".into(),
            ));
        }

        let (url, api_key) = match (&self.config.api_url, &self.config.api_key) {
            (Some(url), Some(key)) => (url.clone(), key.clone()),
            _ => {
                return Err(ApiError::Config(
                    "missing completion endpoint URL or API key".into(),
                ))
            }
        };

        let request = CompletionRequest {
            url,
            api_key,
            model: self.config.model.clone(),
            instruction: prompt::build_instruction(prompt),
            max_tokens: self.config.max_tokens,
        };

        let completion = self.client.complete(&request).await?;
        tracing::info!(
            took_ms = completion.elapsed.as_millis() as u64,
            "completion received"
        );

        Ok(normalize::normalize(&completion.payload)?)
    }
}
