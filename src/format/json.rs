use super::ParseError;
use crate::tree::TranslationTree;
use serde::ser::Error as _;
use serde::Serialize;

pub(super) fn parse(source: &str) -> Result<TranslationTree, ParseError> {
    serde_json::from_str(source).map_err(|e| {
        ParseError::new(e.line(), e.column(), strip_position(&e.to_string()))
    })
}

/// Pretty-printed with 4-space indentation and a trailing newline.
pub(super) fn render(tree: &TranslationTree) -> serde_json::Result<String> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    tree.serialize(&mut serializer)?;

    let mut rendered = String::from_utf8(buffer).map_err(serde_json::Error::custom)?;
    rendered.push('\n');
    Ok(rendered)
}

/// serde_json appends " at line X column Y"; ParseError carries that already.
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(index) => message[..index].to_string(),
        None => message.to_string(),
    }
}
