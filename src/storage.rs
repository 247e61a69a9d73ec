//! Locale directory access: listing source files and writing results.

use crate::error::TranslatorError;
use crate::format::LocaleFormat;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A lang file found in a source locale directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFile {
    pub path: PathBuf,
    /// File name as found on disk, e.g. "validation.php"
    pub file_name: String,
    pub format: LocaleFormat,
}

impl LocaleFile {
    /// Name of the translated file: the source name, unchanged.
    pub fn output_name(&self) -> &str {
        &self.file_name
    }
}

/// List the lang files directly inside `dir`.
///
/// Non-recursive, regular files only, dotfiles skipped, sorted by file name.
/// Every listed file must have a supported extension.
pub fn list_locale_files(dir: &Path) -> Result<Vec<LocaleFile>, TranslatorError> {
    let entries = fs::read_dir(dir).map_err(|e| TranslatorError::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| TranslatorError::io(dir, e))?.path();
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(true, |name| name.starts_with('.'));
        if hidden || !path.is_file() {
            debug!("Skipping {}", path.display());
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let format = LocaleFormat::from_path(&path);
            let file_name = path.file_name().and_then(|name| name.to_str());
            match (format, file_name) {
                (Some(format), Some(file_name)) => Ok(LocaleFile {
                    file_name: file_name.to_string(),
                    path,
                    format,
                }),
                _ => Err(TranslatorError::UnsupportedFormat { path }),
            }
        })
        .collect()
}

pub fn read_locale_file(file: &LocaleFile) -> Result<String, TranslatorError> {
    fs::read_to_string(&file.path).map_err(|e| TranslatorError::io(&file.path, e))
}

/// Write `contents` to `dir/file_name`, creating `dir` and its parents first.
///
/// Existing files are overwritten.
pub fn write_locale_file(
    dir: &Path,
    file_name: &str,
    contents: &str,
) -> Result<PathBuf, TranslatorError> {
    if !dir.is_dir() {
        debug!("Creating {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| TranslatorError::io(dir, e))?;
    }

    let path = dir.join(file_name);
    fs::write(&path, contents).map_err(|e| TranslatorError::io(&path, e))?;
    Ok(path)
}
