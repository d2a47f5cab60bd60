//! Element type - structural nodes of the document tree
//!
//! Markdown structure (paragraphs, emphasis, lists) and custom MDX
//! components share one type; `ElementKind` tells them apart.

use std::borrow::Cow;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::attr::{AttrValue, Attrs, AttrsExt};
use crate::component::Component;

use super::{Node, Text};

// =============================================================================
// ElementKind
// =============================================================================

/// Structural role of an element
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Document root
    Root,
    Paragraph,
    Emphasis,
    Strong,
    /// Bulleted (`ordered: false`) or numbered list
    List { ordered: bool },
    ListItem,
    /// Custom MDX component
    Custom(Component),
    /// Anything else the parser produced (headings, links, code, ...)
    Other(CompactString),
}

impl ElementKind {
    /// Kind name for logging and debugging
    pub fn name(&self) -> &str {
        match self {
            Self::Root => "root",
            Self::Paragraph => "paragraph",
            Self::Emphasis => "emphasis",
            Self::Strong => "strong",
            Self::List { .. } => "list",
            Self::ListItem => "list-item",
            Self::Custom(component) => component.name(),
            Self::Other(name) => name,
        }
    }
}

// =============================================================================
// Element
// =============================================================================

/// Element with attributes and ordered children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Structural role
    pub kind: ElementKind,
    /// Attributes (only custom components carry any)
    pub attrs: Attrs,
    /// Child nodes, in source order
    pub children: SmallVec<[Node; 8]>,
}

impl Element {
    /// Create an empty element of the given kind
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attrs: Vec::new(),
            children: SmallVec::new(),
        }
    }

    impl_kind_constructors!(
        root => Root,
        paragraph => Paragraph,
        emphasis => Emphasis,
        strong => Strong,
        list_item => ListItem,
    );

    /// Create a list element
    pub fn list(ordered: bool) -> Self {
        Self::new(ElementKind::List { ordered })
    }

    /// Create a custom component element, identified by tag name
    pub fn custom(name: &str) -> Self {
        Self::new(ElementKind::Custom(Component::identify(name)))
    }

    /// Create a pass-through element
    pub fn other(name: impl Into<CompactString>) -> Self {
        Self::new(ElementKind::Other(name.into()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder
    // ─────────────────────────────────────────────────────────────────────────

    /// Add an attribute
    pub fn attr(mut self, name: impl Into<CompactString>, value: impl Into<AttrValue>) -> Self {
        self.attrs.set_attr(name, value);
        self
    }

    /// Add a child element
    pub fn child(mut self, elem: Element) -> Self {
        self.push_elem(elem);
        self
    }

    /// Add a plain text child
    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.push_text(content);
        self
    }

    /// Add an inline math child
    pub fn inline_math(mut self, source: impl Into<String>) -> Self {
        self.push_node(Node::Text(Text::inline_math(source)));
        self
    }

    /// Add a display math child
    pub fn block_math(mut self, source: impl Into<String>) -> Self {
        self.push_node(Node::Text(Text::block_math(source)));
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a child element
    pub fn push_elem(&mut self, elem: Element) {
        self.children.push(Node::Element(Box::new(elem)));
    }

    /// Append a plain text child, merging with a preceding plain text leaf
    pub fn push_text(&mut self, content: impl Into<String>) {
        let content = content.into();
        if let Some(Node::Text(last)) = self.children.last_mut()
            && last.kind == super::TextKind::Plain
        {
            last.content.push_str(&content);
            return;
        }
        self.children.push(Node::Text(Text::plain(content)));
    }

    /// Append any node
    pub fn push_node(&mut self, node: Node) {
        self.children.push(node);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Custom component, if this is one
    pub fn component(&self) -> Option<&Component> {
        match &self.kind {
            ElementKind::Custom(component) => Some(component),
            _ => None,
        }
    }

    /// Check if this element is the given component
    pub fn is_component(&self, component: &Component) -> bool {
        self.component() == Some(component)
    }

    /// Get attribute value by name
    pub fn get_attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get_attr(name)
    }

    /// Get text of a string or number attribute
    pub fn get_text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.attrs.get_text(name)
    }

    /// Check if attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.has_attr(name)
    }

    /// Check if element has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of direct children (all node types)
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Iterate over child element references
    pub fn children_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| n.as_element())
    }

    /// First descendant leaf matching predicate, depth-first in document order
    pub fn find_text<F>(&self, predicate: F) -> Option<&Text>
    where
        F: Fn(&Text) -> bool,
    {
        self.find_text_where(predicate, |_| true)
    }

    /// Like [`find_text`](Self::find_text), but only enters child elements
    /// accepted by `descend`.
    pub fn find_text_where<F, D>(&self, predicate: F, descend: D) -> Option<&Text>
    where
        F: Fn(&Text) -> bool,
        D: Fn(&Element) -> bool,
    {
        Self::find_text_in(self, &predicate, &descend)
    }

    fn find_text_in<'a, F, D>(elem: &'a Element, predicate: &F, descend: &D) -> Option<&'a Text>
    where
        F: Fn(&Text) -> bool,
        D: Fn(&Element) -> bool,
    {
        for child in &elem.children {
            match child {
                Node::Text(t) if predicate(t) => return Some(t),
                Node::Text(_) => {}
                Node::Element(e) if descend(e) => {
                    if let Some(found) = Self::find_text_in(e, predicate, descend) {
                        return Some(found);
                    }
                }
                Node::Element(_) => {}
            }
        }
        None
    }

    /// Get text content of this element (concatenated from all leaves)
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, buf: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => buf.push_str(&t.content),
                Node::Element(e) => e.collect_text(buf),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_basics() {
        let elem = Element::paragraph();
        assert_eq!(elem.kind, ElementKind::Paragraph);
        assert!(elem.is_empty());
        assert_eq!(elem.child_count(), 0);
        assert!(elem.component().is_none());
    }

    #[test]
    fn test_element_builder() {
        let elem = Element::custom("Problem")
            .attr("title", "Naloga 3")
            .child(Element::paragraph().text("Avto pelje s hitrostjo "))
            .inline_math("v = 20\\,\\mathrm{m/s}");

        assert!(elem.is_component(&Component::Problem));
        assert_eq!(elem.get_text("title").as_deref(), Some("Naloga 3"));
        assert_eq!(elem.child_count(), 2);
        assert_eq!(elem.children_elements().count(), 1);
        assert_eq!(elem.kind.name(), "Problem");
    }

    #[test]
    fn test_push_text_merges_plain_leaves() {
        let mut elem = Element::paragraph();
        elem.push_text("a");
        elem.push_text("b");
        elem.push_node(Node::Text(Text::inline_math("x")));
        elem.push_text("c");
        assert_eq!(elem.child_count(), 3);
        assert_eq!(elem.text_content(), "abxc");
    }

    #[test]
    fn test_find_text_depth_first() {
        let elem = Element::custom("EqRow")
            .child(
                Element::paragraph()
                    .text("intro ")
                    .child(Element::emphasis().inline_math("first")),
            )
            .block_math("second");

        let found = elem.find_text(Text::is_math).map(|t| t.content.as_str());
        assert_eq!(found, Some("first"));
        assert!(elem.find_text(|t| t.content == "missing").is_none());
    }

    #[test]
    fn test_find_text_where_skips_subtrees() {
        let elem = Element::custom("EqRow")
            .child(Element::emphasis().inline_math("hidden"))
            .block_math("shown");

        let found = elem
            .find_text_where(Text::is_math, |e| e.kind != ElementKind::Emphasis)
            .map(|t| t.content.as_str());
        assert_eq!(found, Some("shown"));
    }
}
