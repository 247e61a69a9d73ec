//! Translation provider seam.
//!
//! The translator only needs single-string translation. Source and target
//! locales travel with every call, so a provider holds no per-language state.

use crate::locale::Locale;
use std::future::Future;
use thiserror::Error;

/// Machine translation of a single string.
pub trait TranslationProvider {
    /// Translate `text` from `source` to `target`.
    fn translate(
        &self,
        text: &str,
        source: &Locale,
        target: &Locale,
    ) -> impl Future<Output = Result<String, ProviderError>>;
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to send translation request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Translation API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode translation response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Unexpected translation response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Transient failures: network errors, 429 and 5xx responses.
    /// Other 4xx client errors and malformed payloads are not retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Request(_) | ProviderError::Decode(_) => true,
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Client(_) | ProviderError::MalformedResponse(_) => false,
        }
    }
}
