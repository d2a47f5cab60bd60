//! Error types for mdx-tex.
//!
//! Errors are layered the same way processing is:
//!
//! - [`LiteralError`]: the embedded-data parser rejected an attribute value
//! - [`FragmentError`]: a single custom element could not be rendered
//!   (always downgraded to empty output by the renderer)
//! - [`ConvertError`]: the MDX front end could not build a tree
//! - [`CompileError`]: the external typesetting tool failed
//! - [`DocumentError`]: a whole document failed inside a batch

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Embedded literals
// =============================================================================

/// Error from the embedded literal parser, with the byte offset it stopped at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid literal at byte {offset}: {kind}")]
pub struct LiteralError {
    /// Byte offset into the parsed source
    pub offset: usize,
    /// What went wrong
    pub kind: LiteralErrorKind,
}

/// Reason a literal was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),

    /// An identifier in value position (`foo`, `Math.PI`, a call, ...)
    #[error("`{0}` is not a literal")]
    NotALiteral(String),

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("unterminated string")]
    UnterminatedString,

    #[error("invalid escape sequence")]
    InvalidEscape,

    #[error("unexpected input after the literal")]
    TrailingInput,

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

// =============================================================================
// Fragments
// =============================================================================

/// A custom element whose attributes could not be turned into output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FragmentError {
    #[error("missing `{0}` attribute")]
    MissingAttribute(&'static str),

    /// Attribute present but given as a plain string or number
    #[error("`{0}` must be an embedded expression")]
    NotAnExpression(&'static str),

    #[error("malformed `{attr}` data: {source}")]
    MalformedData {
        attr: &'static str,
        #[source]
        source: LiteralError,
    },

    #[error("`{0}` must be an array of records")]
    NotARecordList(&'static str),

    #[error("record {index} has no numeric `{key}` field")]
    MissingField { index: usize, key: String },
}

// =============================================================================
// MDX front end
// =============================================================================

/// Errors building a document tree from MDX source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("line {line}: <{name}> is never closed")]
    Unclosed { name: String, line: usize },

    #[error("line {line}: </{found}> does not close <{expected}>")]
    Mismatched {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("line {line}: </{name}> has no matching opening tag")]
    UnexpectedClose { name: String, line: usize },

    #[error("line {line}: malformed tag: {message}")]
    MalformedTag { message: String, line: usize },
}

impl ConvertError {
    /// Create a malformed tag error.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedTag {
            message: message.into(),
            line,
        }
    }
}

// =============================================================================
// External compiler
// =============================================================================

/// Failure of the external typesetting tool.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}{}", format_tail(.log_tail))]
    Failed {
        program: String,
        status: String,
        /// Last lines of the tool's output
        log_tail: String,
    },

    #[error("compiler produced no artifact at {}", .0.display())]
    MissingArtifact(PathBuf),
}

fn format_tail(tail: &str) -> String {
    if tail.is_empty() {
        String::new()
    } else {
        format!("\n{tail}")
    }
}

// =============================================================================
// Documents
// =============================================================================

/// Errors that abort processing of one document (never the whole batch).
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("source not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("{}: {source}", .path.display())]
    Convert {
        path: PathBuf,
        #[source]
        source: ConvertError,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for document processing.
pub type DocumentResult<T> = Result<T, DocumentError>;

impl DocumentError {
    /// Create an I/O error with a short description of what was attempted.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Short label used in batch summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingSource(_) => "missing source",
            Self::Convert { .. } => "invalid MDX",
            Self::Compile(_) => "compile failure",
            Self::Io { .. } => "I/O error",
        }
    }
}
