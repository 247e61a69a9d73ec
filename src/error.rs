//! Error types for a translation run.
//!
//! Every variant is fatal: the run stops at the first failure and leaves any
//! files already written in place.

use crate::format::ParseError;
use crate::provider::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("Invalid locale code '{code}': {reason}")]
    InvalidLocale { code: String, reason: &'static str },

    #[error("Invalid lang prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: &'static str },

    #[error("Lang folder '{locale}' does not exist ({})", .path.display())]
    MissingSourceDirectory { locale: String, path: PathBuf },

    #[error("No lang files found in '{locale}' folder ({})", .path.display())]
    NoSourceFiles { locale: String, path: PathBuf },

    #[error("Unsupported lang file format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to render {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to translate {}: {source}", .path.display())]
    Provider {
        path: PathBuf,
        #[source]
        source: ProviderError,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TranslatorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TranslatorError::Io {
            path: path.into(),
            source,
        }
    }
}
