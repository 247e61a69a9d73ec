use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::google::DEFAULT_ENDPOINT;

#[derive(Debug, Clone)]
pub struct Config {
    // Locale directories
    pub lang_path: PathBuf,
    pub lang_prefix: String,

    // Locale pair (usually given on the command line)
    pub translate_from: Option<String>,
    pub translate_to: Option<String>,

    // Google Translate
    pub google_translate_url: String,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            // Locale directories
            lang_path: std::env::var("LANG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("lang")),
            lang_prefix: std::env::var("LANG_PREFIX").unwrap_or_default(),

            // Locale pair
            translate_from: std::env::var("TRANSLATE_FROM").ok(),
            translate_to: std::env::var("TRANSLATE_TO").ok(),

            // Google Translate
            google_translate_url: std::env::var("GOOGLE_TRANSLATE_URL")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            request_timeout_secs: std::env::var("TRANSLATE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            max_attempts: std::env::var("TRANSLATE_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        };

        if config.max_attempts == 0 {
            bail!("TRANSLATE_MAX_ATTEMPTS must be at least 1");
        }
        if config.request_timeout_secs == 0 {
            bail!("TRANSLATE_TIMEOUT_SECS must be at least 1");
        }

        Ok(config)
    }
}
