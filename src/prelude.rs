//! Prelude module for common imports.
//!
//! ```ignore
//! use mdx_tex::prelude::*;
//! ```

// Node types
pub use crate::node::{Children, Document, Element, ElementKind, Metadata, Node, Text, TextKind};

// Components and attributes
pub use crate::attr::{AttrValue, Attrs, AttrsExt};
pub use crate::component::Component;

// Conversion
pub use crate::convert::from_mdx;
pub use crate::literal::parse_literal;

// Render
pub use crate::render::{
    render, render_body, render_document, LatexRenderer, PlotStyle, RenderConfig, StrongStyle,
};

// Pipeline
pub use crate::batch::{
    discover, Batch, BatchConfig, BatchReport, CommandCompiler, Compiler, Outcome, SourceDoc,
};
pub use crate::cache::{CacheEntry, CacheKey, SharedRenderCache};
pub use crate::watch::{Regenerator, Watcher};

// Error
pub use crate::error::{CompileError, ConvertError, DocumentError, DocumentResult};
