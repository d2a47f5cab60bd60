//! Text leaf type
//!
//! Literal text and math source in the document tree.

// =============================================================================
// TextKind
// =============================================================================

/// What a text leaf holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextKind {
    /// Prose; reserved LaTeX characters are escaped on output
    #[default]
    Plain,
    /// `$...$` math source
    InlineMath,
    /// `$$...$$` math source
    BlockMath,
    /// Leaf with no print form (raw HTML, comments)
    Opaque,
}

// =============================================================================
// Text
// =============================================================================

/// Text leaf node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// Literal content or math source
    pub content: String,
    /// How the content is interpreted
    pub kind: TextKind,
}

impl Text {
    /// Create a leaf of the given kind
    pub fn new(content: impl Into<String>, kind: TextKind) -> Self {
        Self {
            content: content.into(),
            kind,
        }
    }

    /// Create a plain text leaf
    pub fn plain(content: impl Into<String>) -> Self {
        Self::new(content, TextKind::Plain)
    }

    /// Create an inline math leaf
    pub fn inline_math(source: impl Into<String>) -> Self {
        Self::new(source, TextKind::InlineMath)
    }

    /// Create a display math leaf
    pub fn block_math(source: impl Into<String>) -> Self {
        Self::new(source, TextKind::BlockMath)
    }

    /// Create a leaf that renders to nothing
    pub fn opaque(content: impl Into<String>) -> Self {
        Self::new(content, TextKind::Opaque)
    }

    /// Check if this leaf holds math source
    pub fn is_math(&self) -> bool {
        matches!(self.kind, TextKind::InlineMath | TextKind::BlockMath)
    }

    /// Check if text content is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
