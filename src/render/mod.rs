//! LaTeX rendering for document trees.
//!
//! One recursive walker turns a [`Document`] into LaTeX source. Markdown
//! structure maps onto the obvious LaTeX commands; custom components are
//! dispatched on [`Component`]:
//!
//! | Component     | Output                                             |
//! |---------------|----------------------------------------------------|
//! | `Problem`     | `\section*{title}` + children + `\vspace`          |
//! | `Solution`    | nothing                                            |
//! | `ProblemSet`  | children                                           |
//! | `Graph`       | pgfplots figure (see [`graph`])                    |
//! | `EquationBox` | two-column formula table (see [`equation`])        |
//! | `EqRow`       | nothing outside an `EquationBox`                   |
//! | unknown       | children                                           |
//!
//! Rendering never fails: a fragment that cannot be produced is logged and
//! left out.

mod equation;
mod escape;
pub mod graph;
pub mod preamble;

pub use equation::EquationRow;
pub use escape::{collapse_line_breaks, escape_latex, escape_with_math};
pub use graph::{render_graph, GraphSpec, PlotStyle};

use crate::component::Component;
use crate::node::{Document, Element, ElementKind, Metadata, Node, Text, TextKind};

// =============================================================================
// RenderConfig
// =============================================================================

/// Default heading prefix for untitled problems ("Problem 1", ...)
pub const DEFAULT_PROBLEM_PREFIX: &str = "Problem";

/// Space after each problem
const PROBLEM_SPACING: &str = "0.5cm";

/// How `**strong**` text is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrongStyle {
    /// `\textbf{...}`
    #[default]
    Bold,
    /// Content only, no markup
    Plain,
}

/// Configuration for LaTeX rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// How strong emphasis is printed.
    pub strong: StrongStyle,
    /// Base font size passed to the document class (10, 11 or 12).
    pub font_size_pt: Option<u8>,
    /// Whether to pass the `draft` class option.
    pub draft: bool,
    /// Heading prefix for untitled problems (default: "Problem").
    pub problem_prefix: String,
    /// Title used when the document metadata has an empty title.
    pub default_title: String,
}

impl RenderConfig {
    /// Final print output.
    pub const PRINT: Self = Self {
        strong: StrongStyle::Bold,
        font_size_pt: None,
        draft: false,
        problem_prefix: String::new(), // Will use DEFAULT_PROBLEM_PREFIX
        default_title: String::new(),  // Will use Metadata::DEFAULT_TITLE
    };

    /// Draft output (class `draft` option, overfull boxes marked).
    pub const DRAFT: Self = Self {
        strong: StrongStyle::Bold,
        font_size_pt: None,
        draft: true,
        problem_prefix: String::new(),
        default_title: String::new(),
    };

    /// Create a new config.
    pub fn new(strong: StrongStyle, draft: bool) -> Self {
        Self {
            strong,
            font_size_pt: None,
            draft,
            problem_prefix: DEFAULT_PROBLEM_PREFIX.to_string(),
            default_title: Metadata::DEFAULT_TITLE.to_string(),
        }
    }

    /// Set how strong emphasis is printed.
    pub fn with_strong(mut self, strong: StrongStyle) -> Self {
        self.strong = strong;
        self
    }

    /// Set the base font size in points.
    pub fn with_font_size(mut self, pt: u8) -> Self {
        self.font_size_pt = Some(pt);
        self
    }

    /// Set the heading prefix for untitled problems.
    pub fn with_problem_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.problem_prefix = prefix.into();
        self
    }

    /// Set the fallback document title.
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Get the heading prefix for untitled problems.
    pub fn problem_prefix(&self) -> &str {
        if self.problem_prefix.is_empty() {
            DEFAULT_PROBLEM_PREFIX
        } else {
            &self.problem_prefix
        }
    }

    /// Get the fallback document title.
    pub fn default_title(&self) -> &str {
        if self.default_title.is_empty() {
            Metadata::DEFAULT_TITLE
        } else {
            &self.default_title
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new(StrongStyle::Bold, false)
    }
}

// =============================================================================
// LatexRenderer
// =============================================================================

/// Renders documents with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct LatexRenderer {
    config: RenderConfig,
}

impl LatexRenderer {
    /// Create a renderer with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with the given configuration.
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render the body of a tree, without preamble.
    pub fn render_body(&self, root: &Element) -> String {
        render_body(root, &self.config)
    }

    /// Render a complete, compilable LaTeX document.
    pub fn render_document(&self, doc: &Document) -> String {
        render_document(doc, &self.config)
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Render a tree and its metadata to a complete LaTeX document.
pub fn render(tree: &Element, meta: &Metadata, config: &RenderConfig) -> String {
    let body = render_body(tree, config);
    if meta.title.trim().is_empty() {
        let meta = Metadata {
            title: config.default_title().to_string(),
            ..meta.clone()
        };
        preamble::wrap_document(&body, &meta, config)
    } else {
        preamble::wrap_document(&body, meta, config)
    }
}

/// Render a document to a complete LaTeX document.
pub fn render_document(doc: &Document, config: &RenderConfig) -> String {
    log::debug!(
        "rendering `{}` ({} elements)",
        doc.meta.title,
        doc.element_count()
    );
    render(&doc.root, &doc.meta, config)
}

/// Render a tree to LaTeX body text.
pub fn render_body(root: &Element, config: &RenderConfig) -> String {
    Walker::new(config).render_element(root)
}

// =============================================================================
// Walker
// =============================================================================

/// Per-document render state over a tree borrowed for `'t`.
pub(super) struct Walker<'a, 't> {
    config: &'a RenderConfig,
    /// Problems seen so far, titled or not
    problem_count: usize,
    /// Leaf left out while rendering an equation row description
    skip: Option<&'t Text>,
}

impl<'a, 't> Walker<'a, 't> {
    pub(super) fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            problem_count: 0,
            skip: None,
        }
    }

    fn render_node(&mut self, node: &'t Node) -> String {
        match node {
            Node::Element(elem) => self.render_element(elem),
            Node::Text(text) => self.render_text(text),
        }
    }

    fn render_text(&self, text: &Text) -> String {
        if self.skip.is_some_and(|skip| std::ptr::eq(skip, text)) {
            return String::new();
        }
        match text.kind {
            TextKind::Plain => escape_latex(&text.content),
            TextKind::InlineMath => format!("${}$", text.content),
            TextKind::BlockMath => format!("\\[{}\\]", text.content),
            TextKind::Opaque => String::new(),
        }
    }

    fn render_children(&mut self, elem: &'t Element) -> String {
        let mut out = String::new();
        for child in &elem.children {
            out.push_str(&self.render_node(child));
        }
        out
    }

    /// Render an element's children with one leaf excluded.
    pub(super) fn render_children_skipping(
        &mut self,
        elem: &'t Element,
        skip: Option<&'t Text>,
    ) -> String {
        let previous = std::mem::replace(&mut self.skip, skip);
        let out = self.render_children(elem);
        self.skip = previous;
        out
    }

    fn render_element(&mut self, elem: &'t Element) -> String {
        match &elem.kind {
            ElementKind::Root => {
                let parts: Vec<String> = elem
                    .children
                    .iter()
                    .map(|child| self.render_node(child))
                    .filter(|part| !part.is_empty())
                    .collect();
                parts.join("\n\n")
            }
            ElementKind::Paragraph => {
                let mut out = self.render_children(elem);
                out.push_str("\n\n");
                out
            }
            ElementKind::Emphasis => format!("\\textit{{{}}}", self.render_children(elem)),
            ElementKind::Strong => match self.config.strong {
                StrongStyle::Bold => format!("\\textbf{{{}}}", self.render_children(elem)),
                StrongStyle::Plain => self.render_children(elem),
            },
            ElementKind::List { ordered } => {
                let env = if *ordered { "enumerate" } else { "itemize" };
                format!(
                    "\\begin{{{env}}}\n{}\\end{{{env}}}\n",
                    self.render_children(elem)
                )
            }
            ElementKind::ListItem => format!("\\item {}\n", self.render_children(elem).trim()),
            ElementKind::Custom(component) => self.render_component(component, elem),
            ElementKind::Other(_) => self.render_children(elem),
        }
    }

    fn render_component(&mut self, component: &Component, elem: &'t Element) -> String {
        match component {
            Component::Problem => self.render_problem(elem),
            Component::Solution | Component::EqRow => String::new(),
            Component::ProblemSet | Component::Unknown(_) => self.render_children(elem),
            Component::Graph => render_graph(elem).unwrap_or_else(|err| {
                log::warn!("skipping graph: {err}");
                String::new()
            }),
            Component::EquationBox => {
                let mut out = String::new();
                if equation::write_equation_box(self, elem, &mut out) {
                    out
                } else {
                    self.render_children(elem)
                }
            }
        }
    }

    fn render_problem(&mut self, elem: &'t Element) -> String {
        self.problem_count += 1;
        let title = problem_title(elem).unwrap_or_else(|| {
            format!("{} {}", self.config.problem_prefix(), self.problem_count)
        });
        format!(
            "\\section*{{{}}}\n{}\n\\vspace{{{PROBLEM_SPACING}}}\n",
            escape_with_math(&title),
            self.render_children(elem)
        )
    }
}

/// Explicit title of a problem: a string, a number, or `{"..."}`.
fn problem_title(elem: &Element) -> Option<String> {
    let value = elem.get_attr("title")?;
    let Some(title) = value.resolve_text() else {
        if let Some(src) = value.as_expr() {
            log::warn!("ignoring non-literal problem title `{src}`");
        }
        return None;
    };
    (!title.trim().is_empty()).then(|| title.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::AttrValue;

    fn body(root: Element) -> String {
        render_body(&root, &RenderConfig::default())
    }

    #[test]
    fn test_text_escaping() {
        let latex = body(Element::root().child(Element::paragraph().text("50% of $5 & a_1 #2")));
        assert_eq!(latex, "50\\% of \\$5 \\& a\\_1 \\#2\n\n");
    }

    #[test]
    fn test_markup() {
        let latex = body(
            Element::root().child(
                Element::paragraph()
                    .child(Element::emphasis().text("hitrost"))
                    .text(" in ")
                    .child(Element::strong().text("pot"))
                    .inline_math("s = vt"),
            ),
        );
        assert_eq!(latex, "\\textit{hitrost} in \\textbf{pot}$s = vt$\n\n");
    }

    #[test]
    fn test_plain_strong() {
        let root = Element::root().child(Element::paragraph().child(Element::strong().text("pot")));
        let config = RenderConfig::PRINT.with_strong(StrongStyle::Plain);
        assert_eq!(render_body(&root, &config), "pot\n\n");
    }

    #[test]
    fn test_lists() {
        let root = Element::root()
            .child(
                Element::list(false)
                    .child(Element::list_item().child(Element::paragraph().text("a")))
                    .child(Element::list_item().text("b")),
            )
            .child(Element::list(true).child(Element::list_item().text("c")));
        let latex = body(root);
        assert!(latex.contains("\\begin{itemize}\n\\item a\n\\item b\n\\end{itemize}\n"));
        assert!(latex.contains("\\begin{enumerate}\n\\item c\n\\end{enumerate}\n"));
    }

    #[test]
    fn test_math_is_not_escaped() {
        let latex = body(Element::root().child(Element::paragraph().block_math("a_{x} = 5\\,\\%")));
        assert_eq!(latex, "\\[a_{x} = 5\\,\\%\\]\n\n");
    }

    #[test]
    fn test_solution_excluded_at_any_depth() {
        let root = Element::root().child(
            Element::custom("ProblemSet").child(
                Element::custom("Problem")
                    .child(Element::paragraph().text("Question"))
                    .child(
                        Element::custom("Callout").child(
                            Element::custom("Solution")
                                .child(Element::paragraph().text("SECRET answer")),
                        ),
                    ),
            ),
        );
        let latex = body(root);
        assert!(latex.contains("Question"));
        assert!(!latex.contains("SECRET"));
    }

    #[test]
    fn test_problem_numbering() {
        let root = Element::root()
            .child(Element::custom("Problem").child(Element::paragraph().text("a")))
            .child(Element::custom("Problem").attr("title", "Prosti pad"))
            .child(Element::custom("Problem"));
        let latex = body(root);

        assert!(latex.contains("\\section*{Problem 1}\n"));
        assert!(latex.contains("\\section*{Prosti pad}\n"));
        assert!(latex.contains("\\section*{Problem 3}\n"));
        assert!(!latex.contains("Problem 2"));
        assert!(latex.contains("\\vspace{0.5cm}"));
    }

    #[test]
    fn test_problem_prefix_and_expr_title() {
        let root = Element::root()
            .child(Element::custom("Problem"))
            .child(
                Element::custom("Problem")
                    .attr("title", AttrValue::Expr("\"Naklon 5%\"".into())),
            )
            .child(Element::custom("Problem").attr("title", AttrValue::Expr("name".into())));
        let config = RenderConfig::PRINT.with_problem_prefix("Naloga");
        let latex = render_body(&root, &config);

        assert!(latex.contains("\\section*{Naloga 1}"));
        assert!(latex.contains("\\section*{Naklon 5\\%}"));
        assert!(latex.contains("\\section*{Naloga 3}"));
    }

    #[test]
    fn test_bad_graph_keeps_siblings() {
        let root = Element::root()
            .child(Element::paragraph().text("before"))
            .child(Element::custom("Graph").attr("data", AttrValue::Expr("fetch()".into())))
            .child(Element::paragraph().text("after"));
        let latex = body(root);

        assert!(!latex.contains("tikzpicture"));
        assert!(latex.contains("before"));
        assert!(latex.contains("after"));
    }

    #[test]
    fn test_good_graph_inside_problem() {
        let root = Element::root().child(
            Element::custom("Problem").child(
                Element::custom("Graph")
                    .attr("data", AttrValue::Expr("[{x: 0, y: 1}, {x: 1, y: 3}]".into())),
            ),
        );
        let latex = body(root);
        assert!(latex.contains("(0,1) (1,3)"));
    }

    #[test]
    fn test_eq_row_outside_box_and_unknown_components() {
        let root = Element::root()
            .child(Element::custom("EqRow").block_math("x = 1"))
            .child(Element::custom("Callout").child(Element::paragraph().text("kept")))
            .child(Element::other("heading").text("Naslov"))
            .child(Element::other("html").child(Element::paragraph()));
        let latex = body(root);

        assert!(!latex.contains("x = 1"));
        assert!(latex.contains("kept"));
        assert!(latex.contains("Naslov"));
    }

    #[test]
    fn test_opaque_leaf_renders_nothing() {
        let mut para = Element::paragraph().text("a");
        para.push_node(Node::Text(Text::opaque("<br/>")));
        assert_eq!(body(Element::root().child(para)), "a\n\n");
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(body(Element::root()), "");
        let doc = render_document(&Document::new(Element::root()), &RenderConfig::default());
        assert!(doc.contains("\\title{Physics Problems}"));
        assert!(doc.ends_with("\\end{document}\n"));
    }

    #[test]
    fn test_deep_nesting_terminates() {
        let mut elem = Element::paragraph().text("deep");
        for _ in 0..256 {
            elem = Element::emphasis().child(elem);
        }
        let latex = body(Element::root().child(elem));
        assert_eq!(latex.matches("\\textit{").count(), 256);
        assert!(latex.contains("deep"));
    }

    #[test]
    fn test_root_skips_empty_parts() {
        let root = Element::root()
            .child(Element::paragraph().text("a"))
            .child(Element::custom("Solution").text("x"))
            .child(Element::paragraph().text("b"));
        assert_eq!(body(root), "a\n\n\n\nb\n\n");
    }

    #[test]
    fn test_render_document_uses_default_title() {
        let doc = Document::new(Element::root()).with_meta(Metadata::titled(""));
        let renderer =
            LatexRenderer::with_config(RenderConfig::PRINT.with_default_title("Vaje"));
        assert!(renderer.render_document(&doc).contains("\\title{Vaje}"));
        assert_eq!(renderer.config().problem_prefix(), "Problem");
    }

    #[test]
    fn test_config_presets() {
        assert_eq!(RenderConfig::PRINT.problem_prefix(), DEFAULT_PROBLEM_PREFIX);
        assert_eq!(RenderConfig::DRAFT.default_title(), Metadata::DEFAULT_TITLE);
        assert!(RenderConfig::DRAFT.draft);
        assert_eq!(RenderConfig::default().strong, StrongStyle::Bold);
    }
}
