//! Document type and related utilities
//!
//! The root container for a parsed MDX file, with query and traversal APIs.

use serde::Deserialize;

use crate::component::Component;

use super::{Element, Node};

// =============================================================================
// Metadata
// =============================================================================

/// Title block fields, read from the document's front matter
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: String,
    pub section: String,
    pub subsection: String,
}

impl Metadata {
    /// Title used when the front matter has none
    pub const DEFAULT_TITLE: &'static str = "Physics Problems";

    /// Create metadata with a title and empty section fields
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: Self::DEFAULT_TITLE.to_string(),
            section: String::new(),
            subsection: String::new(),
        }
    }
}

// =============================================================================
// Document
// =============================================================================

/// Root document container
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Root element (kind `Root`)
    pub root: Element,
    /// Title block data
    pub meta: Metadata,
}

impl Document {
    /// Create a new document with default metadata
    pub fn new(root: Element) -> Self {
        Self {
            root,
            meta: Metadata::default(),
        }
    }

    /// Replace the metadata
    pub fn with_meta(mut self, meta: Metadata) -> Self {
        self.meta = meta;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query API
    // ─────────────────────────────────────────────────────────────────────────

    /// Find first element matching predicate (depth-first search)
    pub fn find_element<F>(&self, predicate: F) -> Option<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        self.elements().find(|e| predicate(e))
    }

    /// Find all elements matching predicate
    pub fn find_all<F>(&self, predicate: F) -> Vec<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        self.elements().filter(|e| predicate(e)).collect()
    }

    /// Count total elements in document
    pub fn element_count(&self) -> usize {
        self.elements().count()
    }

    /// Iterate over all elements (depth-first, document order)
    pub fn elements(&self) -> ElementIterator<'_> {
        ElementIterator::new(&self.root)
    }

    /// Collect statistics about the document
    pub fn collect_stats(&self) -> Stats {
        let mut stats = Stats::default();
        for elem in self.elements() {
            stats.element_count += 1;

            match elem.component() {
                Some(Component::Problem) => stats.problem_count += 1,
                Some(Component::Graph) => stats.graph_count += 1,
                Some(Component::Solution) => stats.solution_count += 1,
                Some(Component::EqRow) => stats.equation_row_count += 1,
                _ => {}
            }

            for child in &elem.children {
                if let Node::Text(text) = child {
                    if text.is_math() {
                        stats.math_count += 1;
                    } else {
                        stats.text_count += 1;
                    }
                }
            }
        }
        stats
    }
}

// =============================================================================
// ElementIterator - depth-first element traversal
// =============================================================================

/// Depth-first iterator over elements
pub struct ElementIterator<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> ElementIterator<'a> {
    fn new(root: &'a Element) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for ElementIterator<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let elem = self.stack.pop()?;
        // Push children in reverse order so they're visited left-to-right
        for child in elem.children.iter().rev() {
            if let Some(child_elem) = child.as_element() {
                self.stack.push(child_elem);
            }
        }
        Some(elem)
    }
}

// =============================================================================
// Stats - document statistics
// =============================================================================

/// Document statistics collected from traversal
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    pub problem_count: usize,
    pub graph_count: usize,
    pub solution_count: usize,
    pub equation_row_count: usize,
    pub math_count: usize,
    pub text_count: usize,
    pub element_count: usize,
}

impl Stats {
    /// Check if document has any problems
    pub fn has_problems(&self) -> bool {
        self.problem_count > 0
    }
}
