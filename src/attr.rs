//! Attribute system for custom elements
//!
//! - `Vec<(CompactString, AttrValue)>` keeps source order and stays small
//! - `AttrValue` distinguishes plain strings, numbers and embedded expressions

use std::borrow::Cow;

use compact_str::CompactString;
use serde_json::Value;

use crate::literal::parse_literal;

/// Value of a custom element attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Quoted string: `title="Naloga 1"`
    Str(String),
    /// Numeric expression: `width={3.5}`
    Number(f64),
    /// Any other embedded expression, kept as source text: `data={[...]}`
    Expr(String),
    /// Attribute written without a value: `<Graph dashed />`
    Flag,
}

impl AttrValue {
    /// Text form of plain values; `None` for expressions and flags.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Str(s) => Some(Cow::Borrowed(s)),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::Expr(_) | Self::Flag => None,
        }
    }

    /// Text of a plain value, or of an expression holding a single string or
    /// number literal (`{"t"}`, `{2}`).
    pub fn resolve_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Expr(src) => match parse_literal(src).ok()? {
                Value::String(s) => Some(Cow::Owned(s)),
                Value::Number(n) => Some(Cow::Owned(n.to_string())),
                _ => None,
            },
            other => other.as_text(),
        }
    }

    /// Source text of an embedded expression.
    pub fn as_expr(&self) -> Option<&str> {
        match self {
            Self::Expr(src) => Some(src),
            _ => None,
        }
    }

    /// Check if this is an embedded expression
    pub fn is_expr(&self) -> bool {
        matches!(self, Self::Expr(_))
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Element attributes as ordered name/value pairs
pub type Attrs = Vec<(CompactString, AttrValue)>;

/// Extension trait for attribute operations on Attrs
pub trait AttrsExt {
    /// Get an attribute value by name
    fn get_attr(&self, name: &str) -> Option<&AttrValue>;

    /// Get the text of an attribute, resolving string and number literals
    fn get_text(&self, name: &str) -> Option<Cow<'_, str>>;

    /// Check if an attribute exists
    fn has_attr(&self, name: &str) -> bool;

    /// Set an attribute value (insert or update)
    fn set_attr(&mut self, name: impl Into<CompactString>, value: impl Into<AttrValue>);
}

impl AttrsExt for Attrs {
    fn get_attr(&self, name: &str) -> Option<&AttrValue> {
        self.iter().find(|(k, _)| k.as_str() == name).map(|(_, v)| v)
    }

    fn get_text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get_attr(name).and_then(AttrValue::resolve_text)
    }

    fn has_attr(&self, name: &str) -> bool {
        self.iter().any(|(k, _)| k.as_str() == name)
    }

    fn set_attr(&mut self, name: impl Into<CompactString>, value: impl Into<AttrValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(attr) = self.iter_mut().find(|(k, _)| k == &name) {
            attr.1 = value;
        } else {
            self.push((name, value));
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
