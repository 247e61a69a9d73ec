//! Locale: validated locale directory code.
//!
//! A locale code names both a directory on disk (`lang/<prefix>/<code>`) and a
//! language for the translation provider, so it has to be safe as a single
//! path segment.

use crate::error::TranslatorError;
use std::fmt;

/// A validated locale code (e.g. "en", "fr", "pt_BR").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    code: String,
}

impl Locale {
    /// Create a Locale from a directory code.
    ///
    /// # Returns
    /// * `Ok(Locale)` if the code can be used as a single directory name
    /// * `Err(TranslatorError::InvalidLocale)` otherwise
    pub fn parse(code: &str) -> Result<Locale, TranslatorError> {
        let invalid = |reason| TranslatorError::InvalidLocale {
            code: code.to_string(),
            reason,
        };

        if code.is_empty() {
            return Err(invalid("locale code is empty"));
        }
        if code == "." || code == ".." {
            return Err(invalid("locale code cannot be a relative directory"));
        }
        if code.contains(['/', '\\']) {
            return Err(invalid("locale code cannot contain path separators"));
        }
        if code.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid("locale code cannot contain whitespace"));
        }

        Ok(Locale {
            code: code.to_string(),
        })
    }

    /// The code as it appears on disk.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The code in the form translation providers expect.
    ///
    /// Lang directories commonly use `pt_BR`, providers take `pt-BR`.
    pub fn provider_code(&self) -> String {
        self.code.replace('_', "-")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
