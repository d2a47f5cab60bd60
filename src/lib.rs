//! mdx-tex - MDX physics exercises to printable LaTeX
//!
//! ## Core Concepts
//!
//! **One tree, one walker**: an MDX file is parsed into a [`Document`]
//! (markdown structure plus custom components such as `<Problem>`,
//! `<Graph>` and `<EquationBox>`), and a single recursive renderer turns it
//! into LaTeX. Rendering never fails; a fragment that cannot be produced is
//! logged and left out.
//!
//! ## Modules
//! - `node`: Document/Element/Text tree types
//! - `component`: custom MDX components the renderer knows
//! - `attr`: component attributes
//! - `literal`: safe parser for embedded data (`data={[...]}`)
//! - `convert`: MDX source → document tree
//! - `render`: document tree → LaTeX
//! - `batch`: sources → compiled artifacts, with per-document reports
//! - `cache`, `hash`: fingerprints for incremental builds
//! - `watch`: polling watcher with debounced regeneration
//!
//! ## Usage
//!
//! ```ignore
//! use mdx_tex::convert::from_mdx;
//! use mdx_tex::render::{LatexRenderer, RenderConfig};
//!
//! let doc = from_mdx(source)?;
//! let latex = LatexRenderer::with_config(RenderConfig::PRINT).render_document(&doc);
//! ```

#[macro_use]
mod macros;

// =============================================================================
// Core modules
// =============================================================================

/// Node types: Document, Element, Node, Text
pub mod node;

/// Custom MDX components
pub mod component;

/// Attribute types
pub mod attr;

/// Safe literal parser for embedded data
pub mod literal;

/// Error types
pub mod error;

/// MDX front end
pub mod convert;

/// LaTeX rendering
pub mod render;

// =============================================================================
// Pipeline modules
// =============================================================================

/// Batch generation of artifacts
pub mod batch;

/// Render cache for incremental builds
pub mod cache;

/// Deterministic hashing
pub mod hash;

/// Watch mode
pub mod watch;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Node types
pub use node::{Children, Document, Element, ElementKind, Metadata, Node, Stats, Text, TextKind};

// Components and attributes
pub use attr::{AttrValue, Attrs, AttrsExt};
pub use component::Component;

// Conversion and rendering
pub use convert::from_mdx;
pub use render::{LatexRenderer, RenderConfig, StrongStyle, render, render_body, render_document};

// Pipeline
pub use batch::{Batch, BatchConfig, BatchReport, CommandCompiler, Compiler, Outcome, SourceDoc};
pub use cache::{CacheEntry, CacheKey, RenderCache, SharedRenderCache};
pub use hash::StableHasher;
pub use watch::{Regenerator, Watcher};

// Error types
pub use error::{
    CompileError, ConvertError, DocumentError, DocumentResult, FragmentError, LiteralError,
};

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(RenderConfig: Send, Sync);
    assert_impl_all!(LatexRenderer: Send, Sync);
    assert_impl_all!(Document: Send, Sync);
    assert_impl_all!(SharedRenderCache: Send, Sync, Clone);
    assert_impl_all!(Batch<CommandCompiler>: Send, Sync);

    #[test]
    fn test_end_to_end() {
        let source = "---\ntitle: Sile\nsection: 1. Letnik\n---\n\
                      <Problem>\nTelo z maso $m = 2\\,\\mathrm{kg}$ miruje.\n\
                      <Solution>\n$F = 0$\n</Solution>\n</Problem>\n";
        let doc = from_mdx(source).unwrap();
        let latex = LatexRenderer::with_config(RenderConfig::PRINT).render_document(&doc);

        assert!(latex.starts_with("\\documentclass{article}\n"));
        assert!(latex.contains("\\title{Sile}\n\\author{1. Letnik}\n"));
        assert!(latex.contains("\\section*{Problem 1}\n"));
        assert!(latex.contains("Telo z maso $m = 2\\,\\mathrm{kg}$ miruje."));
        assert!(!latex.contains("F = 0"));
        assert!(latex.trim_end().ends_with("\\end{document}"));
    }
}
