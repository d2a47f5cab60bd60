//! Markdown chunks between component tags, via pulldown-cmark.

use pulldown_cmark::{Event, Options, Parser, Tag};

use crate::node::{Children, Element, Node, Text};

/// Parser options: CommonMark plus `$...$` / `$$...$$` math
fn options() -> Options {
    Options::ENABLE_MATH | Options::ENABLE_STRIKETHROUGH
}

/// Parse a markdown chunk into top-level nodes.
///
/// The chunk is dedented first, so content indented under a component tag
/// is not mistaken for an indented code block.
pub fn parse_markdown(chunk: &str) -> Children {
    let source = dedent(chunk);
    let mut stack: Vec<Element> = vec![Element::root()];

    for event in Parser::new_ext(&source, options()) {
        match event {
            Event::Start(tag) => stack.push(element_for(&tag)),
            Event::End(_) => {
                if stack.len() > 1
                    && let Some(done) = stack.pop()
                    && let Some(parent) = stack.last_mut()
                {
                    parent.push_elem(done);
                }
            }
            event => {
                if let Some(top) = stack.last_mut() {
                    push_leaf(top, event);
                }
            }
        }
    }

    // Unbalanced events cannot come out of the parser; fold any leftovers.
    while stack.len() > 1 {
        if let Some(done) = stack.pop()
            && let Some(parent) = stack.last_mut()
        {
            parent.push_elem(done);
        }
    }
    stack.pop().map(|root| root.children).unwrap_or_default()
}

fn element_for(tag: &Tag<'_>) -> Element {
    match tag {
        Tag::Paragraph => Element::paragraph(),
        Tag::Emphasis => Element::emphasis(),
        Tag::Strong => Element::strong(),
        Tag::List(start) => Element::list(start.is_some()),
        Tag::Item => Element::list_item(),
        Tag::Heading { level, .. } => {
            Element::other("heading").attr("level", *level as usize as f64)
        }
        Tag::BlockQuote(_) => Element::other("blockquote"),
        Tag::CodeBlock(_) => Element::other("code"),
        Tag::HtmlBlock => Element::other("html"),
        Tag::Strikethrough => Element::other("delete"),
        Tag::Link { .. } => Element::other("link"),
        Tag::Image { .. } => Element::other("image"),
        _ => Element::other("block"),
    }
}

fn push_leaf(parent: &mut Element, event: Event<'_>) {
    match event {
        Event::Text(text) => parent.push_text(text.into_string()),
        Event::SoftBreak | Event::HardBreak => parent.push_text("\n"),
        Event::Code(code) => {
            parent.push_elem(Element::other("inline-code").text(code.into_string()));
        }
        Event::InlineMath(math) => {
            parent.push_node(Node::Text(Text::inline_math(math.into_string())));
        }
        Event::DisplayMath(math) => {
            parent.push_node(Node::Text(Text::block_math(math.into_string())));
        }
        Event::Html(html) | Event::InlineHtml(html) => {
            parent.push_node(Node::Text(Text::opaque(html.into_string())));
        }
        Event::Rule => parent.push_elem(Element::other("rule")),
        _ => {}
    }
}

/// Remove the indentation shared by all non-blank lines.
pub fn dedent(chunk: &str) -> String {
    let indent = chunk
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let mut out = String::with_capacity(chunk.len());
    for line in chunk.split_inclusive('\n') {
        let cut = indent.min(line.len() - line.trim_start_matches([' ', '\t']).len());
        out.push_str(&line[cut..]);
    }
    out
}
