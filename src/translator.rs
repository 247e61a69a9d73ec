//! Locale tree translation: walk a source locale directory, translate every
//! string leaf of every lang file, and write the results under the target
//! locale.
//!
//! # Flow
//!
//! 1. Resolve `root/prefix/from` and list its lang files
//! 2. Parse each file into a [`TranslationTree`]
//! 3. Translate leaves one at a time, depth-first in key order
//! 4. Render the tree in the source file's format into `root/prefix/to`
//!
//! The run stops at the first error. Files written before it stay on disk.

use crate::error::TranslatorError;
use crate::locale::Locale;
use crate::provider::{ProviderError, TranslationProvider};
use crate::storage::{self, LocaleFile};
use crate::tree::{TranslationTree, TranslationValue};
use futures::future::{FutureExt, LocalBoxFuture};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// What to translate and where: an immutable description of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationJob {
    root: PathBuf,
    prefix: String,
    from: String,
    to: String,
}

impl TranslationJob {
    /// Translate from locale `from` to locale `to`, under the default `lang` root.
    ///
    /// Codes are validated when the run starts, not here.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            root: PathBuf::from("lang"),
            prefix: String::new(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Static path segment between the root and the locale directories,
    /// e.g. `vendor/courier`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn from_code(&self) -> &str {
        &self.from
    }

    pub fn to_code(&self) -> &str {
        &self.to
    }

    /// `root/prefix/<locale>`.
    ///
    /// The prefix always stays under the root: leading separators and `.`
    /// segments are dropped, so `/vendor/courier` and `vendor/courier` name
    /// the same directory.
    pub fn locale_dir(&self, locale: &str) -> PathBuf {
        let mut dir = self.root.clone();
        for component in Path::new(&self.prefix).components() {
            if let Component::Normal(segment) = component {
                dir.push(segment);
            }
        }
        dir.push(locale);
        dir
    }

    /// A prefix may not climb out of the root.
    fn check_prefix(&self) -> Result<(), TranslatorError> {
        let climbs = Path::new(&self.prefix)
            .components()
            .any(|component| matches!(component, Component::ParentDir));
        if climbs {
            return Err(TranslatorError::InvalidPrefix {
                prefix: self.prefix.clone(),
                reason: "must not contain '..' segments",
            });
        }
        Ok(())
    }

    pub fn source_dir(&self) -> PathBuf {
        self.locale_dir(&self.from)
    }

    pub fn target_dir(&self) -> PathBuf {
        self.locale_dir(&self.to)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Paths written, in processing order
    pub files_written: Vec<PathBuf>,
    /// Number of provider calls made (one per leaf)
    pub strings_translated: usize,
}

/// Translates every lang file of one locale into another.
#[derive(Debug)]
pub struct LocaleTreeTranslator<P> {
    provider: P,
    job: TranslationJob,
}

impl<P: TranslationProvider> LocaleTreeTranslator<P> {
    pub fn new(provider: P, job: TranslationJob) -> Self {
        Self { provider, job }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run the translation.
    ///
    /// Fails before touching the target directory if the source directory is
    /// missing, empty, or holds a file with an unsupported extension.
    pub async fn translate(&self) -> Result<RunSummary, TranslatorError> {
        let source = Locale::parse(self.job.from_code())?;
        let target = Locale::parse(self.job.to_code())?;
        self.job.check_prefix()?;

        let source_dir = self.job.source_dir();
        if !source_dir.is_dir() {
            return Err(TranslatorError::MissingSourceDirectory {
                locale: source.code().to_string(),
                path: source_dir,
            });
        }

        let files = storage::list_locale_files(&source_dir)?;
        if files.is_empty() {
            return Err(TranslatorError::NoSourceFiles {
                locale: source.code().to_string(),
                path: source_dir,
            });
        }

        info!(
            "Translating {} lang files from '{}' to '{}'",
            files.len(),
            source,
            target
        );

        let target_dir = self.job.target_dir();
        let mut summary = RunSummary::default();

        for file in &files {
            let (path, strings) = self
                .translate_file(file, &target_dir, &source, &target)
                .await?;
            summary.strings_translated += strings;
            summary.files_written.push(path);
        }

        info!(
            "Translated {} strings across {} files into {}",
            summary.strings_translated,
            summary.files_written.len(),
            target_dir.display()
        );
        Ok(summary)
    }

    async fn translate_file(
        &self,
        file: &LocaleFile,
        target_dir: &Path,
        source: &Locale,
        target: &Locale,
    ) -> Result<(PathBuf, usize), TranslatorError> {
        let contents = storage::read_locale_file(file)?;
        let tree = file
            .format
            .parse(&contents)
            .map_err(|err| TranslatorError::Parse {
                path: file.path.clone(),
                source: err,
            })?;

        let strings = tree.leaf_count();
        debug!("{}: {} strings", file.path.display(), strings);

        let translated = translate_tree(&self.provider, &tree, source, target)
            .await
            .map_err(|err| TranslatorError::Provider {
                path: file.path.clone(),
                source: err,
            })?;

        let rendered = file
            .format
            .render(&translated)
            .map_err(|err| TranslatorError::Render {
                path: file.path.clone(),
                source: err,
            })?;
        let written = storage::write_locale_file(target_dir, file.output_name(), &rendered)?;

        info!("Wrote {} ({} strings)", written.display(), strings);
        Ok((written, strings))
    }
}

/// Translate every leaf of `tree`, keeping its keys and nesting.
///
/// Leaves are translated one provider call at a time, depth-first in key
/// order. An empty tree makes no calls.
pub fn translate_tree<'a, P: TranslationProvider>(
    provider: &'a P,
    tree: &'a TranslationTree,
    source: &'a Locale,
    target: &'a Locale,
) -> LocalBoxFuture<'a, Result<TranslationTree, ProviderError>> {
    async move {
        let mut translated = TranslationTree::new();
        for (key, value) in tree.iter() {
            let value = match value {
                TranslationValue::Leaf(text) => {
                    TranslationValue::Leaf(provider.translate(text, source, target).await?)
                }
                TranslationValue::Node(node) => {
                    TranslationValue::Node(translate_tree(provider, node, source, target).await?)
                }
            };
            translated.insert(key.clone(), value);
        }
        Ok(translated)
    }
    .boxed_local()
}
