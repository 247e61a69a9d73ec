//! Translate a lang folder into another locale.
//!
//! Usage:
//!   lang-files-translator --from en --to fr
//!   lang-files-translator --from en --to pt_BR --prefix vendor/courier --lang-path resources/lang
//!
//! Flags fall back to environment variables (a `.env` file is loaded if present):
//! - TRANSLATE_FROM, TRANSLATE_TO
//! - LANG_PREFIX (defaults to none)
//! - LANG_PATH (defaults to lang)
//! - GOOGLE_TRANSLATE_URL, TRANSLATE_TIMEOUT_SECS (30), TRANSLATE_MAX_ATTEMPTS (1)

use anyhow::{bail, Context, Result};
use lang_files_translator::{
    config::Config, GoogleTranslateProvider, LocaleTreeTranslator, TranslationJob,
};
use std::path::PathBuf;
use tracing::info;

const USAGE: &str = "\
Usage: lang-files-translator --from <locale> --to <locale> [--prefix <path>] [--lang-path <dir>]

Options:
  --from <locale>     Source locale directory (env: TRANSLATE_FROM)
  --to <locale>       Target locale directory (env: TRANSLATE_TO)
  --prefix <path>     Path between the lang root and locale folders (env: LANG_PREFIX)
  --lang-path <dir>   Lang root directory, default 'lang' (env: LANG_PATH)
  -h, --help          Print this help";

/// Command line flags; each one overrides its environment variable.
struct CliArgs {
    from: Option<String>,
    to: Option<String>,
    prefix: Option<String>,
    lang_path: Option<PathBuf>,
}

impl CliArgs {
    /// Returns `None` when help was requested.
    fn parse(mut args: pico_args::Arguments) -> Result<Option<Self>> {
        if args.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let cli = Self {
            from: args.opt_value_from_str("--from")?,
            to: args.opt_value_from_str("--to")?,
            prefix: args.opt_value_from_str("--prefix")?,
            lang_path: args.opt_value_from_str("--lang-path")?,
        };

        let remaining = args.finish();
        if !remaining.is_empty() {
            bail!("Unexpected arguments: {:?}\n\n{}", remaining, USAGE);
        }

        Ok(Some(cli))
    }

    fn into_job(self, config: &Config) -> Result<TranslationJob> {
        let from = self
            .from
            .or_else(|| config.translate_from.clone())
            .context("Source locale not set (use --from or TRANSLATE_FROM)")?;
        let to = self
            .to
            .or_else(|| config.translate_to.clone())
            .context("Target locale not set (use --to or TRANSLATE_TO)")?;

        Ok(TranslationJob::new(from, to)
            .with_root(self.lang_path.unwrap_or_else(|| config.lang_path.clone()))
            .with_prefix(self.prefix.unwrap_or_else(|| config.lang_prefix.clone())))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lang_files_translator=info".parse()?),
        )
        .init();

    let Some(cli) = CliArgs::parse(pico_args::Arguments::from_env())? else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = Config::from_env()?;
    let job = cli.into_job(&config)?;
    let provider = GoogleTranslateProvider::from_config(&config)
        .context("Failed to set up Google Translate client")?;

    info!(
        "Translating {} -> {}",
        job.source_dir().display(),
        job.target_dir().display()
    );

    let summary = LocaleTreeTranslator::new(provider, job)
        .translate()
        .await
        .context("Translation run failed")?;

    info!(
        "✓ Wrote {} files ({} strings)",
        summary.files_written.len(),
        summary.strings_translated
    );
    Ok(())
}
