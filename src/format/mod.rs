//! Lang file formats.
//!
//! Each format turns file contents into a [`TranslationTree`] and back.
//! Parsing never evaluates file contents; PHP files are read by a literal
//! parser that only understands array and string expressions.
//!
//! - `php`: `<?php return [...];` files, as used by Laravel-style lang folders
//! - `json`: plain JSON objects

mod json;
mod php;

use crate::tree::TranslationTree;
use std::fmt;
use std::path::Path;

/// A supported lang file format, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleFormat {
    Php,
    Json,
}

impl LocaleFormat {
    /// Pick the format for a file path.
    ///
    /// Returns `None` for missing or unknown extensions.
    pub fn from_path(path: &Path) -> Option<LocaleFormat> {
        let extension = path.extension()?.to_str()?;
        match extension.to_ascii_lowercase().as_str() {
            "php" => Some(LocaleFormat::Php),
            "json" => Some(LocaleFormat::Json),
            _ => None,
        }
    }

    pub fn parse(self, source: &str) -> Result<TranslationTree, ParseError> {
        match self {
            LocaleFormat::Php => php::parse(source),
            LocaleFormat::Json => json::parse(source),
        }
    }

    /// Render a tree in this format.
    ///
    /// PHP rendering cannot fail; JSON rendering reports serializer errors.
    pub fn render(self, tree: &TranslationTree) -> serde_json::Result<String> {
        match self {
            LocaleFormat::Php => Ok(php::render(tree)),
            LocaleFormat::Json => json::render(tree),
        }
    }
}

/// Malformed lang file contents, with a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_php() {
        assert_eq!(
            LocaleFormat::from_path(Path::new("lang/en/validation.php")),
            Some(LocaleFormat::Php)
        );
    }

    #[test]
    fn test_from_path_json_uppercase() {
        assert_eq!(
            LocaleFormat::from_path(Path::new("lang/en/messages.JSON")),
            Some(LocaleFormat::Json)
        );
    }

    #[test]
    fn test_from_path_unknown() {
        assert_eq!(LocaleFormat::from_path(Path::new("lang/en/README.md")), None);
        assert_eq!(LocaleFormat::from_path(Path::new("lang/en/LICENSE")), None);
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(2, 14, "unterminated string");
        assert_eq!(err.to_string(), "line 2, column 14: unterminated string");
    }

    #[test]
    fn test_same_tree_from_both_formats() {
        let php = "<?php return ['required' => 'Required', 'nested' => ['min' => 'Short']];";
        let json = r#"{"required": "Required", "nested": {"min": "Short"}}"#;

        let from_php = LocaleFormat::Php.parse(php).expect("Should parse php");
        let from_json = LocaleFormat::Json.parse(json).expect("Should parse json");

        assert_eq!(from_php, from_json);
    }

    #[test]
    fn test_render_reports_success_for_both_formats() {
        let tree = TranslationTree::new().with("hello", "Bonjour");

        let php = LocaleFormat::Php.render(&tree).expect("Should render php");
        let json = LocaleFormat::Json.render(&tree).expect("Should render json");

        assert!(php.contains("'hello' => 'Bonjour'"));
        assert!(json.contains("\"hello\": \"Bonjour\""));
    }
}
