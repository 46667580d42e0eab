use thiserror::Error;

use crate::archive::ArchiveError;
use crate::normalize::NormalizeError;
use crate::provider::ProviderError;

/// Caller-facing error taxonomy. Every variant maps to exactly one HTTP
/// response shape in `server`; nothing here is ever retried.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("server misconfigured: {0}")] Config(String),
    #[error("invalid input: {0}")] InvalidInput(String),
    #[error("upstream unavailable: {0}")] UpstreamUnavailable(String),
    #[error("upstream returned status {status}")] Upstream { status: u16, body: String },
    #[error("model response not valid JSON")] InvalidModelOutput { preview: String },
    #[error("generated bundle missing index.html")] MissingMarkup { keys: Vec<String> },
    #[error("archive construction failed: {0}")] Archive(String),
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unavailable(detail) => ApiError::UpstreamUnavailable(detail),
            ProviderError::Upstream { status, body } => ApiError::Upstream { status, body },
        }
    }
}

impl From<NormalizeError> for ApiError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::InvalidModelOutput { preview } => ApiError::InvalidModelOutput { preview },
            NormalizeError::MissingMarkup { keys } => ApiError::MissingMarkup { keys },
        }
    }
}

impl From<ArchiveError> for ApiError {
    fn from(err: ArchiveError) -> Self {
        ApiError::Archive(err.to_string())
    }
}
