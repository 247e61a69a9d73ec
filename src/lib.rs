//! Translate nested lang files from one locale directory to another.
//!
//! ```rust,ignore
//! use lang_files_translator::{GoogleTranslateProvider, LocaleTreeTranslator, TranslationJob};
//!
//! let provider = GoogleTranslateProvider::from_config(&config)?;
//! let job = TranslationJob::new("en", "fr").with_prefix("vendor/courier");
//! LocaleTreeTranslator::new(provider, job).translate().await?;
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod google;
pub mod locale;
pub mod provider;
pub mod retry;
pub mod storage;
pub mod translator;
pub mod tree;

pub use error::TranslatorError;
pub use format::{LocaleFormat, ParseError};
pub use google::GoogleTranslateProvider;
pub use locale::Locale;
pub use provider::{ProviderError, TranslationProvider};
pub use translator::{translate_tree, LocaleTreeTranslator, RunSummary, TranslationJob};
pub use tree::{TranslationTree, TranslationValue};
