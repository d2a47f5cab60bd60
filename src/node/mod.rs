//! Document tree types.
//!
//! This module provides `Node`, `Element`, `Text` and `Document`: the parsed
//! shape of one MDX file that the LaTeX renderer walks.
//!
//! # Shape
//!
//! - Structure (root, paragraphs, emphasis, lists, custom components) is an
//!   [`Element`] tagged with an [`ElementKind`]
//! - Leaves (prose, inline math, display math) are [`Text`] tagged with a
//!   [`TextKind`]
//! - The tree is owned, acyclic and read-only to the renderer

mod document;
mod element;
mod text;

pub use document::{Document, ElementIterator, Metadata, Stats};
pub use element::{Element, ElementKind};
pub use text::{Text, TextKind};

use smallvec::SmallVec;

/// Node in a document tree - either Element or Text.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Box<Element>),
    Text(Text),
}

impl Node {
    // Generates for each variant (element -> Element, text -> Text):
    //   - is_xxx(&self) -> bool
    //   - as_xxx(&self) -> Option<&Type>
    //   - as_xxx_mut(&mut self) -> Option<&mut Type>
    impl_enum_accessors!(element, text);

    /// Check if this node is a math leaf
    pub fn is_math(&self) -> bool {
        self.as_text().is_some_and(Text::is_math)
    }
}

impl From<Element> for Node {
    fn from(elem: Element) -> Self {
        Node::Element(Box::new(elem))
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

/// Type alias for children collection.
pub type Children = SmallVec<[Node; 8]>;
