//! PHP lang files: `<?php return [ 'key' => 'value', ... ];`
//!
//! Files are read by a literal parser, never executed. Accepted syntax covers
//! what lang files use in practice: short and long array literals, single and
//! double quoted strings (without interpolation), `.` concatenation of string
//! literals, integer keys, implicit keys, trailing commas, comments, an
//! optional `declare(...)` and an optional closing tag.

use super::ParseError;
use crate::tree::{TranslationTree, TranslationValue};

pub(super) fn parse(source: &str) -> Result<TranslationTree, ParseError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    Parser {
        src: source,
        pos: 0,
        depth: 0,
    }
    .file()
}

/// Render a tree as a PHP file returning a short array literal.
///
/// Strings are always single quoted so nothing in the output can be
/// interpolated. Keys that PHP would store as integers are written bare,
/// like `var_export` does.
pub(super) fn render(tree: &TranslationTree) -> String {
    let mut out = String::from("<?php\n\nreturn ");
    render_array(tree, 0, &mut out);
    out.push_str(";\n");
    out
}

fn render_array(tree: &TranslationTree, depth: usize, out: &mut String) {
    if tree.is_empty() {
        out.push_str("[]");
        return;
    }

    out.push_str("[\n");
    for (key, value) in tree.iter() {
        push_indent(depth + 1, out);
        if canonical_int(key).is_some() {
            out.push_str(key);
        } else {
            render_string(key, out);
        }
        out.push_str(" => ");
        match value {
            TranslationValue::Leaf(text) => render_string(text, out),
            TranslationValue::Node(node) => render_array(node, depth + 1, out),
        }
        out.push_str(",\n");
    }
    push_indent(depth, out);
    out.push(']');
}

fn render_string(text: &str, out: &mut String) {
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("    ");
    }
}

/// PHP stores decimal-integer string keys ("0", "-3") as integers.
fn canonical_int(key: &str) -> Option<i64> {
    key.parse::<i64>().ok().filter(|n| n.to_string() == key)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Deepest array nesting accepted before parsing gives up.
const MAX_NESTING: usize = 256;

/// A parsed expression, before it is known whether it is a key or a value.
enum Expr {
    Str(String),
    Int(i64),
    Array(TranslationTree),
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    /// Arrays currently open
    depth: usize,
}

impl<'a> Parser<'a> {
    // ==================== Statements ====================

    fn file(mut self) -> Result<TranslationTree, ParseError> {
        self.skip_whitespace();
        if !self.eat_keyword("<?php") {
            return Err(self.error("expected '<?php' open tag"));
        }
        self.skip_trivia()?;

        while self.eat_keyword("declare") {
            self.declare()?;
            self.skip_trivia()?;
        }

        if !self.eat_keyword("return") {
            return Err(self.error("expected a 'return' statement"));
        }
        self.skip_trivia()?;

        let start = self.pos;
        let tree = match self.expression()? {
            Expr::Array(tree) => tree,
            _ => return Err(self.error_at(start, "lang file must return an array")),
        };

        // A closing tag ends the statement on its own
        self.skip_trivia()?;
        if !self.rest().starts_with("?>") {
            self.expect(';')?;
            self.skip_trivia()?;
        }
        if self.rest().starts_with("?>") {
            self.pos += 2;
            self.skip_whitespace();
        }

        if self.peek().is_some() {
            return Err(self.error("unexpected content after return statement"));
        }
        Ok(tree)
    }

    fn declare(&mut self) -> Result<(), ParseError> {
        self.skip_trivia()?;
        self.expect('(')?;
        let start = self.pos;
        match self.rest().find(')') {
            Some(end) => self.pos += end + 1,
            None => return Err(self.error_at(start, "unterminated declare statement")),
        }
        self.skip_trivia()?;
        self.expect(';')
    }

    // ==================== Expressions ====================

    fn expression(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some('\'' | '"') => self.concatenation().map(Expr::Str),
            Some('[') => self.array().map(Expr::Array),
            Some(c) if c.is_ascii_digit() || c == '-' => self.integer().map(Expr::Int),
            _ if self.at_keyword("array") => self.array().map(Expr::Array),
            _ => Err(self.error("expected a string, an integer or an array")),
        }
    }

    fn array(&mut self) -> Result<TranslationTree, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(&format!(
                "arrays nested deeper than {} levels",
                MAX_NESTING
            )));
        }
        self.depth += 1;
        let tree = self.array_entries();
        self.depth -= 1;
        tree
    }

    fn array_entries(&mut self) -> Result<TranslationTree, ParseError> {
        let close = if self.eat('[') {
            ']'
        } else if self.eat_keyword("array") {
            self.skip_trivia()?;
            self.expect('(')?;
            ')'
        } else {
            return Err(self.error("expected an array literal"));
        };

        let mut tree = TranslationTree::new();
        let mut next_index: i64 = 0;

        loop {
            self.skip_trivia()?;
            if self.eat(close) {
                return Ok(tree);
            }

            let start = self.pos;
            let first = self.expression()?;
            self.skip_trivia()?;

            let (key, value) = if self.rest().starts_with("=>") {
                self.pos += 2;
                self.skip_trivia()?;
                let key = match first {
                    Expr::Str(key) => key,
                    Expr::Int(key) => key.to_string(),
                    Expr::Array(_) => {
                        return Err(self.error_at(start, "array keys must be strings or integers"))
                    }
                };
                let value_start = self.pos;
                let value = self.expression()?;
                (key, self.value(value, value_start)?)
            } else {
                (next_index.to_string(), self.value(first, start)?)
            };

            if let Some(index) = canonical_int(&key) {
                next_index = next_index.max(index.saturating_add(1));
            }
            tree.insert(key, value);

            self.skip_trivia()?;
            if self.eat(',') {
                continue;
            }
            if self.eat(close) {
                return Ok(tree);
            }
            return Err(self.error(&format!("expected ',' or '{}'", close)));
        }
    }

    fn value(&self, expr: Expr, start: usize) -> Result<TranslationValue, ParseError> {
        match expr {
            Expr::Str(text) => Ok(TranslationValue::Leaf(text)),
            Expr::Array(tree) => Ok(TranslationValue::Node(tree)),
            Expr::Int(_) => Err(self.error_at(
                start,
                "lang values must be strings or nested arrays",
            )),
        }
    }

    fn concatenation(&mut self) -> Result<String, ParseError> {
        let mut text = self.string()?;
        loop {
            let before = self.pos;
            self.skip_trivia()?;
            if self.peek() == Some('.') {
                self.bump();
                self.skip_trivia()?;
                text.push_str(&self.string()?);
            } else {
                self.pos = before;
                return Ok(text);
            }
        }
    }

    fn integer(&mut self) -> Result<i64, ParseError> {
        let start = self.pos;
        self.eat('-');
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        self.src[start..self.pos]
            .parse::<i64>()
            .map_err(|_| self.error_at(start, "invalid integer literal"))
    }

    // ==================== Strings ====================

    fn string(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        match self.bump() {
            Some('\'') => self.single_quoted(start),
            Some('"') => self.double_quoted(start),
            _ => Err(self.error_at(start, "expected a string literal")),
        }
    }

    fn single_quoted(&mut self, start: usize) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error_at(start, "unterminated string")),
                Some('\'') => return Ok(out),
                Some('\\') => match self.peek() {
                    Some(c @ ('\'' | '\\')) => {
                        self.bump();
                        out.push(c);
                    }
                    _ => out.push('\\'),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn double_quoted(&mut self, start: usize) -> Result<String, ParseError> {
        // Escapes like \xHH produce raw bytes, so collect bytes and validate once.
        let mut out: Vec<u8> = Vec::new();
        loop {
            let char_start = self.pos;
            match self.bump() {
                None => return Err(self.error_at(start, "unterminated string")),
                Some('"') => break,
                Some('$') if self.peek().is_some_and(|c| c == '{' || is_ident_start(c)) => {
                    return Err(self.error_at(char_start, "variable interpolation is not supported"))
                }
                Some('{') if self.peek() == Some('$') => {
                    return Err(self.error_at(char_start, "variable interpolation is not supported"))
                }
                Some('\\') => self.escape(char_start, &mut out)?,
                Some(c) => push_char(&mut out, c),
            }
        }

        String::from_utf8(out).map_err(|_| self.error_at(start, "string is not valid UTF-8"))
    }

    fn escape(&mut self, escape_start: usize, out: &mut Vec<u8>) -> Result<(), ParseError> {
        let simple = match self.peek() {
            Some('n') => Some('\n'),
            Some('t') => Some('\t'),
            Some('r') => Some('\r'),
            Some('v') => Some('\u{0B}'),
            Some('e') => Some('\u{1B}'),
            Some('f') => Some('\u{0C}'),
            Some('\\') => Some('\\'),
            Some('$') => Some('$'),
            Some('"') => Some('"'),
            _ => None,
        };
        if let Some(c) = simple {
            self.bump();
            push_char(out, c);
            return Ok(());
        }

        match self.peek() {
            Some('x') if self.peek_nth(1).is_some_and(|c| c.is_ascii_hexdigit()) => {
                self.bump();
                let digits = self.take_while_max(2, |c| c.is_ascii_hexdigit());
                let byte = u8::from_str_radix(digits, 16)
                    .map_err(|_| self.error_at(escape_start, "invalid hex escape"))?;
                out.push(byte);
            }
            Some('0'..='7') => {
                let digits = self.take_while_max(3, |c| ('0'..='7').contains(&c));
                let value = u32::from_str_radix(digits, 8)
                    .map_err(|_| self.error_at(escape_start, "invalid octal escape"))?;
                out.push((value & 0xFF) as u8);
            }
            Some('u') if self.peek_nth(1) == Some('{') => {
                self.bump();
                self.bump();
                let digits = self.take_while_max(6, |c| c.is_ascii_hexdigit());
                if !self.eat('}') {
                    return Err(self.error_at(escape_start, "unterminated unicode escape"));
                }
                let c = u32::from_str_radix(digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error_at(escape_start, "invalid unicode escape"))?;
                push_char(out, c);
            }
            // Unknown escapes are kept verbatim
            _ => out.push(b'\\'),
        }
        Ok(())
    }

    // ==================== Cursor ====================

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    /// Case-insensitive keyword at the cursor, not followed by an identifier character.
    fn at_keyword(&self, keyword: &str) -> bool {
        let rest = self.rest();
        rest.get(..keyword.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
            && !rest[keyword.len()..]
                .chars()
                .next()
                .is_some_and(is_ident_char)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let found = self.at_keyword(keyword);
        if found {
            self.pos += keyword.len();
        }
        found
    }

    fn take_while_max(&mut self, max: usize, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        let mut taken = 0;
        while taken < max && self.peek().is_some_and(&accept) {
            self.bump();
            taken += 1;
        }
        &self.src[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("//") || (rest.starts_with('#') && !rest.starts_with("#[")) {
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if rest.starts_with("/*") {
                let start = self.pos;
                match rest[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => return Err(self.error_at(start, "unterminated comment")),
                }
            } else {
                return Ok(());
            }
        }
    }

    // ==================== Errors ====================

    fn error(&self, message: &str) -> ParseError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, pos: usize, message: &str) -> ParseError {
        let before = &self.src[..pos];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |current| current.chars().count())
            + 1;
        ParseError::new(line, column, message)
    }
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buffer = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
}
