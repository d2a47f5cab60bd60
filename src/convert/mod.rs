//! MDX source to document tree.
//!
//! [`from_mdx`] builds a [`Document`] from one MDX file:
//!
//! | Part | Module | Handles |
//! |------|--------|---------|
//! | `---` front matter | [`frontmatter`] | title, section, subsection |
//! | component tags | [`jsx`] | `<Problem>`, `<Graph ... />`, `</EqRow>` |
//! | everything else | [`markdown`] | paragraphs, emphasis, lists, math |
//!
//! Component tags are recognized where MDX treats them as flow content: at
//! the start of a line, directly after another tag, or (for closing tags) at
//! the end of a line. A tag may span several lines. Text between tags is
//! parsed as an independent markdown chunk.

pub mod frontmatter;
pub mod jsx;
pub mod markdown;

use crate::error::ConvertError;
use crate::node::{Document, Element};

use self::jsx::{Tag, TagKind};

/// Parse an MDX source into a document.
pub fn from_mdx(source: &str) -> Result<Document, ConvertError> {
    let split = frontmatter::split(source);
    let meta = split.yaml.map(frontmatter::parse_metadata).unwrap_or_default();
    let segments = segment(split.body, split.body_line_offset + 1)?;
    let root = build_tree(segments)?;
    Ok(Document::new(root).with_meta(meta))
}

// =============================================================================
// Segmentation
// =============================================================================

/// Piece of an MDX body, in source order
#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Markdown(&'a str),
    Tag(Tag, usize),
}

struct Segmenter<'a> {
    body: &'a str,
    out: Vec<Segment<'a>>,
    /// Start of markdown not yet flushed
    pending: Option<usize>,
}

impl<'a> Segmenter<'a> {
    fn flush(&mut self, end: usize) {
        if let Some(start) = self.pending.take() {
            let chunk = &self.body[start..end];
            if !chunk.trim().is_empty() {
                self.out.push(Segment::Markdown(chunk));
            }
        }
    }

    fn mark(&mut self, pos: usize) {
        self.pending.get_or_insert(pos);
    }
}

fn horizontal_ws(s: &str) -> usize {
    s.len() - s.trim_start_matches([' ', '\t']).len()
}

/// Lines MDX treats as code rather than content
fn is_ignored_line(text: &str, indent: usize) -> bool {
    let trimmed = text.trim();
    let comment = trimmed.starts_with("{/*") && trimmed.ends_with("*/}");
    let esm = indent == 0 && (trimmed.starts_with("import ") || trimmed.starts_with("export "));
    comment || esm
}

fn segment(body: &str, first_line: usize) -> Result<Vec<Segment<'_>>, ConvertError> {
    let mut seg = Segmenter {
        body,
        out: Vec::new(),
        pending: None,
    };
    let mut pos = 0;
    let mut line = first_line;
    let mut fence: Option<&str> = None;

    while pos < body.len() {
        let rest = &body[pos..];
        let indent = horizontal_ws(rest);

        if fence.is_none() && jsx::is_tag_start(&rest[indent..]) {
            seg.flush(pos);
            let start = pos + indent;
            let (tag, used) = jsx::parse_tag(&body[start..], line)?;
            seg.out.push(Segment::Tag(tag, line));
            line += body[start..start + used].matches('\n').count();
            pos = start + used;

            let after = horizontal_ws(&body[pos..]);
            if body[pos + after..].starts_with('\n') {
                pos += after + 1;
                line += 1;
            }
            continue;
        }

        let end = rest.find('\n').map_or(body.len(), |i| pos + i + 1);
        let text = &body[pos..end];
        let trimmed = text.trim_start();
        let fence_line = ["```", "~~~"].into_iter().find(|m| trimmed.starts_with(m));

        match (fence, fence_line) {
            (None, Some(marker)) => fence = Some(marker),
            (Some(open), Some(marker)) if open == marker => fence = None,
            _ => {}
        }

        if fence.is_none() && fence_line.is_none() {
            if seg.pending.is_none() && (text.trim().is_empty() || is_ignored_line(text, indent)) {
                pos = end;
                line += 1;
                continue;
            }
            if let Some(at) = jsx::trailing_close_tags(text) {
                seg.mark(pos);
                let mut cursor = pos + at;
                seg.flush(cursor);
                while cursor < end && jsx::is_tag_start(&body[cursor..end]) {
                    let (tag, used) = jsx::parse_tag(&body[cursor..end], line)?;
                    seg.out.push(Segment::Tag(tag, line));
                    cursor += used;
                    cursor += horizontal_ws(&body[cursor..end]);
                }
                pos = end;
                line += 1;
                continue;
            }
        }

        seg.mark(pos);
        pos = end;
        line += 1;
    }

    seg.flush(body.len());
    Ok(seg.out)
}

// =============================================================================
// Tree building
// =============================================================================

fn build_tree(segments: Vec<Segment<'_>>) -> Result<Element, ConvertError> {
    // Open elements with the line of their opening tag
    let mut stack: Vec<(Element, usize)> = vec![(Element::root(), 0)];

    for segment in segments {
        match segment {
            Segment::Markdown(chunk) => {
                if let Some((top, _)) = stack.last_mut() {
                    for node in markdown::parse_markdown(chunk) {
                        top.push_node(node);
                    }
                }
            }
            Segment::Tag(tag, line) => match tag.kind {
                TagKind::Open => stack.push((component(tag), line)),
                TagKind::SelfClosing => {
                    if let Some((top, _)) = stack.last_mut() {
                        top.push_elem(component(tag));
                    }
                }
                TagKind::Close => {
                    if stack.len() == 1 {
                        return Err(ConvertError::UnexpectedClose {
                            name: tag.name.to_string(),
                            line,
                        });
                    }
                    let Some((elem, _)) = stack.pop() else {
                        break;
                    };
                    if elem.kind.name() != tag.name {
                        return Err(ConvertError::Mismatched {
                            expected: elem.kind.name().to_string(),
                            found: tag.name.to_string(),
                            line,
                        });
                    }
                    if let Some((parent, _)) = stack.last_mut() {
                        parent.push_elem(elem);
                    }
                }
            },
        }
    }

    if stack.len() > 1
        && let Some((elem, line)) = stack.pop()
    {
        return Err(ConvertError::Unclosed {
            name: elem.kind.name().to_string(),
            line,
        });
    }
    Ok(stack.pop().map(|(root, _)| root).unwrap_or_else(Element::root))
}

fn component(tag: Tag) -> Element {
    let mut elem = Element::custom(&tag.name);
    elem.attrs = tag.attrs;
    elem
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::AttrValue;
    use crate::component::Component;
    use crate::node::{ElementKind, Metadata};
    use crate::render::{render_body, RenderConfig};

    const SAMPLE: &str = r#"---
title: Enakomerno gibanje
section: 1. Letnik
subsection: Kinematika
---

import { Graph } from '@/components/Graph'

Uvod v **kinematiko**.

<ProblemSet>
  <Problem title="Avto">
    Avto pelje s hitrostjo $v = 20\,\mathrm{m/s}$.

    <Graph
      data={[{ t: 0, v: 0 }, { t: 1, v: 20 }]}
      xKey="t"
      yKey="v"
    />

    <Solution>
      Rešitev: $s = vt$
    </Solution>
  </Problem>
  <Problem>
    Druga naloga.
  </Problem>
</ProblemSet>

<EquationBox>
  <EqRow>$v = s/t$ hitrost</EqRow>
  <EqRow>
    $$a = \frac{\Delta v}{\Delta t}$$

    pospešek
  </EqRow>
</EquationBox>
"#;

    #[test]
    fn test_sample_document_tree() {
        let doc = from_mdx(SAMPLE).unwrap();
        assert_eq!(doc.meta.title, "Enakomerno gibanje");
        assert_eq!(doc.meta.subsection, "Kinematika");

        let stats = doc.collect_stats();
        assert_eq!(stats.problem_count, 2);
        assert_eq!(stats.graph_count, 1);
        assert_eq!(stats.solution_count, 1);
        assert_eq!(stats.equation_row_count, 2);

        let graph = doc.find_element(|e| e.is_component(&Component::Graph)).unwrap();
        assert!(graph.get_attr("data").is_some_and(AttrValue::is_expr));
        assert_eq!(graph.get_text("xKey").as_deref(), Some("t"));

        let problem = doc.find_element(|e| e.is_component(&Component::Problem)).unwrap();
        assert_eq!(problem.get_text("title").as_deref(), Some("Avto"));
        assert!(problem.text_content().contains("Avto pelje"));
    }

    #[test]
    fn test_sample_renders() {
        let doc = from_mdx(SAMPLE).unwrap();
        let latex = render_body(&doc.root, &RenderConfig::default());

        assert!(latex.contains("Uvod v \\textbf{kinematiko}."));
        assert!(!latex.contains("import"));
        assert!(latex.contains("\\section*{Avto}"));
        assert!(latex.contains("\\section*{Problem 2}"));
        assert!(latex.contains("(0,0) (1,20)"));
        assert!(!latex.contains("Rešitev"));
        assert!(latex.contains("$\\displaystyle v = s/t$ & hitrost \\\\[0.6em]"));
        assert!(latex.contains("$\\displaystyle a = \\frac{\\Delta v}{\\Delta t}$ & pospešek"));
    }

    #[test]
    fn test_no_front_matter() {
        let doc = from_mdx("Samo besedilo.\n").unwrap();
        assert_eq!(doc.meta, Metadata::default());
        assert_eq!(doc.root.child_count(), 1);
    }

    #[test]
    fn test_tags_on_one_line() {
        let doc = from_mdx("<Problem><Solution>x</Solution></Problem>\n").unwrap();
        let problem = doc.root.children_elements().next().unwrap();
        assert!(problem.is_component(&Component::Problem));
        let solution = problem.children_elements().next().unwrap();
        assert!(solution.is_component(&Component::Solution));
        assert_eq!(solution.text_content(), "x");
    }

    #[test]
    fn test_fenced_code_keeps_tags() {
        let doc = from_mdx("```\n<Problem>\n```\n").unwrap();
        assert!(doc.find_element(|e| e.is_component(&Component::Problem)).is_none());
        assert_eq!(
            doc.root.children_elements().next().unwrap().kind,
            ElementKind::Other("code".into())
        );
    }

    #[test]
    fn test_lowercase_html_is_markdown() {
        let doc = from_mdx("<div>\nhi\n</div>\n").unwrap();
        assert!(doc.find_element(|e| e.component().is_some()).is_none());
    }

    #[test]
    fn test_structure_errors() {
        assert_eq!(
            from_mdx("\n<Problem>\ntext\n").unwrap_err(),
            ConvertError::Unclosed { name: "Problem".into(), line: 2 }
        );
        assert_eq!(
            from_mdx("<Problem>\n</Solution>\n").unwrap_err(),
            ConvertError::Mismatched {
                expected: "Problem".into(),
                found: "Solution".into(),
                line: 2,
            }
        );
        assert_eq!(
            from_mdx("---\ntitle: x\n---\ntext</Problem>\n").unwrap_err(),
            ConvertError::UnexpectedClose { name: "Problem".into(), line: 4 }
        );
        assert!(matches!(
            from_mdx("<Graph data={[1, 2\n").unwrap_err(),
            ConvertError::MalformedTag { line: 1, .. }
        ));
    }

    #[test]
    fn test_multiline_tag_line_numbers() {
        let err = from_mdx("<Graph\n  data={[]}\n/>\n\n</Problem>\n").unwrap_err();
        assert_eq!(err, ConvertError::UnexpectedClose { name: "Problem".into(), line: 5 });
    }
}
