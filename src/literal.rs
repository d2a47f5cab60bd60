//! Safe parser for embedded data literals
//!
//! MDX attributes such as `data={[{ t: 0, v: 0 }, { t: 1, v: 2.5 }]}` hold
//! source text of structured data. This parser accepts literals only and
//! produces a [`serde_json::Value`]:
//!
//! - numbers (decimal, optional sign, fraction, exponent)
//! - strings in single or double quotes with the usual escapes
//! - `true`, `false`, `null`
//! - arrays and objects, trailing commas allowed
//! - object keys as identifiers, strings or numbers
//! - `//` and `/* */` comments
//!
//! Identifiers in value position, calls, operators, template strings and
//! spreads are rejected. Nothing is ever evaluated.

use serde_json::{Map, Number, Value};

use crate::error::{LiteralError, LiteralErrorKind};

/// Maximum nesting of arrays and objects.
pub const MAX_DEPTH: usize = 64;

/// Parse a literal expression into a JSON value.
pub fn parse_literal(src: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser::new(src);
    parser.skip_trivia()?;
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if parser.peek().is_some() {
        return Err(parser.error(LiteralErrorKind::TrailingInput));
    }
    Ok(value)
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, depth: 0 }
    }

    fn error(&self, kind: LiteralErrorKind) -> LiteralError {
        LiteralError {
            offset: self.pos,
            kind,
        }
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(c) => self.error(LiteralErrorKind::UnexpectedChar(c)),
            None => self.error(LiteralErrorKind::UnexpectedEnd),
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    #[inline]
    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) -> Result<(), LiteralError> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    match self.src[start + 2..].find("*/") {
                        Some(end) => self.pos = start + 2 + end + 2,
                        None => {
                            self.pos = self.src.len();
                            return Err(self.error(LiteralErrorKind::UnexpectedEnd));
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            Some('{') => self.nested(Self::parse_object),
            Some('[') => self.nested(Self::parse_array),
            Some(q @ ('"' | '\'')) => self.parse_string(q).map(Value::String),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.parse_number(),
            Some(c) if is_ident_start(c) => {
                let start = self.pos;
                let ident = self.parse_ident();
                match ident {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    other => Err(LiteralError {
                        offset: start,
                        kind: LiteralErrorKind::NotALiteral(other.to_string()),
                    }),
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<Value, LiteralError>,
    ) -> Result<Value, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(LiteralErrorKind::TooDeep(MAX_DEPTH)));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_array(&mut self) -> Result<Value, LiteralError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Value::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn parse_object(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }
            let key = self.parse_key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => self.parse_string(q),
            Some(c) if is_ident_start(c) => Ok(self.parse_ident().to_string()),
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
                    self.bump();
                }
                Ok(self.src[start..self.pos].to_string())
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_ident(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn parse_string(&mut self, quote: char) -> Result<String, LiteralError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(LiteralError {
                    offset: start,
                    kind: LiteralErrorKind::UnterminatedString,
                });
            };
            match c {
                c if c == quote => return Ok(out),
                '\n' => {
                    return Err(LiteralError {
                        offset: start,
                        kind: LiteralErrorKind::UnterminatedString,
                    });
                }
                '\\' => out.push(self.parse_escape()?),
                c => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, LiteralError> {
        let at = self.pos;
        let invalid = LiteralError {
            offset: at,
            kind: LiteralErrorKind::InvalidEscape,
        };
        let c = self.bump().ok_or_else(|| self.error(LiteralErrorKind::UnexpectedEnd))?;
        let decoded = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' => '\0',
            '\\' | '\'' | '"' | '/' => c,
            'u' => {
                let hex = if self.peek() == Some('{') {
                    self.bump();
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                        self.bump();
                    }
                    let hex = &self.src[start..self.pos];
                    if self.bump() != Some('}') {
                        return Err(invalid);
                    }
                    hex
                } else {
                    let start = self.pos;
                    for _ in 0..4 {
                        if !self.bump().is_some_and(|c| c.is_ascii_hexdigit()) {
                            return Err(invalid);
                        }
                    }
                    &self.src[start..self.pos]
                };
                u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(invalid)?
            }
            _ => return Err(invalid),
        };
        Ok(decoded)
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.bump();
        }
        let mut is_integer = true;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {}
                '.' => is_integer = false,
                'e' | 'E' => {
                    is_integer = false;
                    if matches!(self.peek_second(), Some('-' | '+')) {
                        self.bump();
                    }
                }
                _ => break,
            }
            self.bump();
        }

        // `12px`, `0x1F`: swallow the suffix so the error shows the whole token
        let glued = self.peek().is_some_and(is_ident_continue);
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }

        let src = self.src;
        let text = &src[start..self.pos];
        let invalid = || LiteralError {
            offset: start,
            kind: LiteralErrorKind::InvalidNumber(text.to_string()),
        };
        if glued {
            return Err(invalid());
        }

        let digits = text.strip_prefix('+').unwrap_or(text);
        if is_integer && let Ok(n) = digits.parse::<i64>() {
            return Ok(Value::Number(Number::from(n)));
        }
        digits
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_array() {
        let src = "[\n  { t: 0, v: 0 },\n  { t: 1, v: 2.5 },\n  { t: 2, v: -5e-1 },\n]";
        let value = parse_literal(src).unwrap();
        assert_eq!(
            value,
            json!([{ "t": 0, "v": 0 }, { "t": 1, "v": 2.5 }, { "t": 2, "v": -0.5 }])
        );
    }

    #[test]
    fn test_scalars_and_strings() {
        assert_eq!(parse_literal("true").unwrap(), json!(true));
        assert_eq!(parse_literal(" null ").unwrap(), json!(null));
        assert_eq!(parse_literal("+3").unwrap(), json!(3));
        assert_eq!(parse_literal(".5").unwrap(), json!(0.5));
        assert_eq!(parse_literal(r#"'it\'s'"#).unwrap(), json!("it's"));
        assert_eq!(parse_literal(r#""è\u{1F600}""#).unwrap(), json!("è😀"));
        assert_eq!(
            parse_literal(r#"{ "quoted key": 'x', 2: [] }"#).unwrap(),
            json!({ "quoted key": "x", "2": [] })
        );
    }

    #[test]
    fn test_comments_are_trivia() {
        let src = "[ // first point\n 1, /* second */ 2 ]";
        assert_eq!(parse_literal(src).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_rejects_code() {
        let err = parse_literal("[{ t: 0, v: Math.PI }]").unwrap_err();
        assert_eq!(err.kind, LiteralErrorKind::NotALiteral("Math".into()));
        assert_eq!(err.offset, 12);

        let err = parse_literal("(() => fetch('x'))()").unwrap_err();
        assert_eq!(err.kind, LiteralErrorKind::UnexpectedChar('('));

        let err = parse_literal("[1, 2].map(x => x)").unwrap_err();
        assert_eq!(err.kind, LiteralErrorKind::TrailingInput);

        assert!(parse_literal("[...points]").is_err());
        assert!(parse_literal("`template`").is_err());
        assert!(parse_literal("[1 2]").is_err());
        assert!(parse_literal("[1,,2]").is_err());
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(
            parse_literal("[1, 2").unwrap_err().kind,
            LiteralErrorKind::UnexpectedEnd
        );
        assert_eq!(
            parse_literal("\"open").unwrap_err().kind,
            LiteralErrorKind::UnterminatedString
        );
        assert_eq!(
            parse_literal("12abc").unwrap_err().kind,
            LiteralErrorKind::InvalidNumber("12abc".into())
        );
        assert_eq!(
            parse_literal(r#""\q""#).unwrap_err().kind,
            LiteralErrorKind::InvalidEscape
        );
        assert!(parse_literal("").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = "[".repeat(MAX_DEPTH + 1) + &"]".repeat(MAX_DEPTH + 1);
        assert_eq!(
            parse_literal(&deep).unwrap_err().kind,
            LiteralErrorKind::TooDeep(MAX_DEPTH)
        );

        let ok = "[".repeat(MAX_DEPTH) + &"]".repeat(MAX_DEPTH);
        assert!(parse_literal(&ok).is_ok());
    }
}
