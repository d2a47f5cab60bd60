//! JSX tag lexer for MDX component tags.
//!
//! Only capitalized tags are components; lowercase tags are left to the
//! markdown parser as raw HTML.

use compact_str::CompactString;

use crate::attr::{AttrValue, Attrs, AttrsExt};
use crate::error::ConvertError;

/// Tag shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<Name ...>`
    Open,
    /// `<Name ... />`
    SelfClosing,
    /// `</Name>`
    Close,
}

/// One lexed component tag
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: CompactString,
    pub kind: TagKind,
    pub attrs: Attrs,
}

/// Check if `s` starts with a component tag (`<Name` or `</Name`).
pub fn is_tag_start(s: &str) -> bool {
    let rest = match s.strip_prefix('<') {
        Some(rest) => rest.strip_prefix('/').unwrap_or(rest),
        None => return false,
    };
    rest.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Byte offset of the run of `</Name>` closing tags that ends `line`, if any.
pub fn trailing_close_tags(line: &str) -> Option<usize> {
    let mut found = None;
    let mut rest = line.trim_end();
    while let Some(start) = last_close_tag(rest) {
        found = Some(start);
        rest = rest[..start].trim_end();
    }
    found
}

fn last_close_tag(s: &str) -> Option<usize> {
    let inner = s.strip_suffix('>')?;
    let start = inner.rfind("</")?;
    let name = inner[start + 2..].trim_end();
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(is_name_char);
    valid.then_some(start)
}

/// Lex one tag at the start of `src`.
///
/// Returns the tag and the number of bytes consumed. `line` is the source
/// line of the `<`, used for error messages.
pub fn parse_tag(src: &str, line: usize) -> Result<(Tag, usize), ConvertError> {
    let mut lexer = Lexer { src, pos: 0, line };
    let tag = lexer.tag()?;
    Ok((tag, lexer.pos))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn is_attr_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.')
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl Lexer<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn error(&self, message: impl Into<String>) -> ConvertError {
        ConvertError::malformed(self.line, message)
    }

    fn tag(&mut self) -> Result<Tag, ConvertError> {
        if !self.eat('<') {
            return Err(self.error("expected `<`"));
        }
        let closing = self.eat('/');
        let name = CompactString::from(self.take_while(is_name_char));
        if name.is_empty() {
            return Err(self.error("missing tag name"));
        }

        if closing {
            self.skip_ws();
            if !self.eat('>') {
                return Err(self.error(format!("expected `>` after </{name}")));
            }
            return Ok(Tag {
                name,
                kind: TagKind::Close,
                attrs: Attrs::new(),
            });
        }

        let mut attrs = Attrs::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(self.error(format!("<{name}> is not terminated"))),
                Some('>') => {
                    self.bump();
                    return Ok(Tag { name, kind: TagKind::Open, attrs });
                }
                Some('/') => {
                    self.bump();
                    if !self.eat('>') {
                        return Err(self.error(format!("expected `/>` in <{name}>")));
                    }
                    return Ok(Tag { name, kind: TagKind::SelfClosing, attrs });
                }
                Some('{') => {
                    return Err(
                        self.error(format!("spread attributes in <{name}> are not supported"))
                    );
                }
                Some(_) => {
                    let (key, value) = self.attribute(&name)?;
                    attrs.set_attr(key, value);
                }
            }
        }
    }

    fn attribute(&mut self, tag: &str) -> Result<(CompactString, AttrValue), ConvertError> {
        let key = CompactString::from(self.take_while(is_attr_name_char));
        if key.is_empty() {
            let found = self.peek().unwrap_or(' ');
            return Err(self.error(format!("unexpected {found:?} in <{tag}>")));
        }

        self.skip_ws();
        if !self.eat('=') {
            return Ok((key, AttrValue::Flag));
        }
        self.skip_ws();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some(c) if c == quote => break,
                        Some(_) => {}
                        None => return Err(self.error(format!("unterminated value for `{key}`"))),
                    }
                }
                AttrValue::Str(self.src[start..self.pos - 1].to_string())
            }
            Some('{') => expression_value(self.expression(&key)?),
            Some(_) => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c.is_whitespace() || c == '>' || self.src[self.pos..].starts_with("/>") {
                        break;
                    }
                    self.bump();
                }
                AttrValue::Str(self.src[start..self.pos].to_string())
            }
            None => return Err(self.error(format!("missing value for `{key}`"))),
        };
        Ok((key, value))
    }

    /// Brace-balanced `{...}` body, skipping braces inside string literals
    fn expression(&mut self, key: &str) -> Result<&str, ConvertError> {
        self.bump();
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.src[start..self.pos - 1].trim());
                    }
                }
                '"' | '\'' | '`' => self.skip_string(c),
                _ => {}
            }
        }
        Err(self.error(format!("unterminated expression for `{key}`")))
    }

    fn skip_string(&mut self, quote: char) {
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                c if c == quote => return,
                _ => {}
            }
        }
    }
}

/// `{3.5}` is a number, anything else stays an expression
fn expression_value(src: &str) -> AttrValue {
    match src.parse::<f64>() {
        Ok(n) if n.is_finite() && !src.starts_with('+') => AttrValue::Number(n),
        _ => AttrValue::Expr(src.to_string()),
    }
}
