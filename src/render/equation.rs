//! `<EquationBox>` → two-column formula table.
//!
//! Each `<EqRow>` becomes one table row: its first math node (depth-first)
//! in display style on the left, the rest of the row as the description on
//! the right.

use crate::component::Component;
use crate::node::{Element, Text};

use super::escape::collapse_line_breaks;
use super::Walker;

/// Column layout of the formula table
pub const TABLE_COLUMNS: &str = "p{0.42\\textwidth} p{0.50\\textwidth}";
/// Extra space after each row
pub const ROW_SPACING: &str = "0.6em";

/// One rendered table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquationRow {
    /// Source of the primary equation, empty when the row has no math
    pub equation: String,
    /// Rendered description with line breaks collapsed
    pub description: String,
}

impl EquationRow {
    fn write_latex(&self, out: &mut String) {
        if !self.equation.is_empty() {
            out.push_str("$\\displaystyle ");
            out.push_str(&self.equation);
            out.push('$');
        }
        out.push_str(" & ");
        out.push_str(&self.description);
        out.push_str(" \\\\[");
        out.push_str(ROW_SPACING);
        out.push_str("]\n");
    }
}

/// Build the rows of an equation box; empty when it has no `<EqRow>` children.
///
/// The primary equation is never taken from web-only content such as a
/// nested `<Solution>`.
pub(super) fn collect_rows<'t>(
    walker: &mut Walker<'_, 't>,
    elem: &'t Element,
) -> Vec<EquationRow> {
    elem.children_elements()
        .filter(|child| child.is_component(&Component::EqRow))
        .map(|row| {
            let primary = row.find_text_where(Text::is_math, |e| {
                !e.component().is_some_and(Component::is_web_only)
            });
            let description = walker.render_children_skipping(row, primary);
            EquationRow {
                equation: primary.map(|t| t.content.trim().to_string()).unwrap_or_default(),
                description: collapse_line_breaks(&description),
            }
        })
        .collect()
}

/// Write the table for an equation box; `false` if it has no rows.
pub(super) fn write_equation_box<'t>(
    walker: &mut Walker<'_, 't>,
    elem: &'t Element,
    out: &mut String,
) -> bool {
    let rows = collect_rows(walker, elem);
    if rows.is_empty() {
        return false;
    }

    out.push_str("\\begin{center}\n\\begin{tabular}{");
    out.push_str(TABLE_COLUMNS);
    out.push_str("}\n");
    for row in &rows {
        row.write_latex(out);
    }
    out.push_str("\\end{tabular}\n\\end{center}\n\\vspace{0.5cm}\n");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::from_mdx;
    use crate::render::{render_body, RenderConfig};

    fn eq_row(math: &str, text: &str) -> Element {
        Element::custom("EqRow")
            .child(Element::paragraph().block_math(math))
            .child(Element::paragraph().text(text))
    }

    #[test]
    fn test_two_rows_in_order() {
        let root = Element::root().child(
            Element::custom("EquationBox")
                .child(eq_row("v = s/t", "velocity"))
                .child(eq_row("a = \\Delta v/\\Delta t", "acceleration")),
        );
        let latex = render_body(&root, &RenderConfig::default());

        let rows: Vec<&str> = latex.lines().filter(|l| l.contains(" & ")).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], "$\\displaystyle v = s/t$ & velocity \\\\[0.6em]");
        assert_eq!(
            rows[1],
            "$\\displaystyle a = \\Delta v/\\Delta t$ & acceleration \\\\[0.6em]"
        );
        assert!(latex.contains("\\begin{tabular}{p{0.42\\textwidth} p{0.50\\textwidth}}"));
        assert!(latex.contains("\\end{tabular}\n\\end{center}\n\\vspace{0.5cm}"));
    }

    #[test]
    fn test_inline_primary_is_redisplayed() {
        let row = Element::custom("EqRow").child(
            Element::paragraph()
                .text("Newton: ")
                .inline_math("F = ma")
                .text(" and ")
                .inline_math("p = mv"),
        );
        let config = RenderConfig::PRINT;
        let boxed = Element::custom("EquationBox").child(row);
        let mut walker = Walker::new(&config);
        let rows = collect_rows(&mut walker, &boxed);

        assert_eq!(rows[0].equation, "F = ma");
        assert_eq!(rows[0].description, "Newton:  and $p = mv$");
    }

    #[test]
    fn test_row_without_math() {
        let row = Element::custom("EqRow")
            .child(Element::paragraph().text("Velja za 50% primerov\nin več"));
        let config = RenderConfig::PRINT;
        let boxed = Element::custom("EquationBox").child(row);
        let mut walker = Walker::new(&config);
        let rows = collect_rows(&mut walker, &boxed);

        assert_eq!(rows[0].equation, "");
        assert_eq!(rows[0].description, "Velja za 50\\% primerov in več");

        let mut out = String::new();
        rows[0].write_latex(&mut out);
        assert!(out.starts_with(" & Velja"));
    }

    #[test]
    fn test_box_without_rows_falls_back_to_children() {
        let root = Element::root().child(
            Element::custom("EquationBox").child(Element::paragraph().block_math("E = mc^2")),
        );
        let latex = render_body(&root, &RenderConfig::default());
        assert!(!latex.contains("tabular"));
        assert!(latex.contains("\\[E = mc^2\\]"));
    }

    #[test]
    fn test_non_row_children_ignored_when_rows_present() {
        let root = Element::root().child(
            Element::custom("EquationBox")
                .child(Element::paragraph().text("Enačbe"))
                .child(eq_row("s = vt", "pot")),
        );
        let latex = render_body(&root, &RenderConfig::default());
        assert!(!latex.contains("Enačbe"));
        assert!(latex.contains("$\\displaystyle s = vt$ & pot"));
    }

    #[test]
    fn test_solution_math_never_becomes_primary() {
        let row = Element::custom("EqRow")
            .child(Element::custom("Solution").inline_math("SECRET = 42"))
            .child(Element::paragraph().text("hitrost ").inline_math("v = s/t"));
        let root = Element::root().child(Element::custom("EquationBox").child(row));
        let latex = render_body(&root, &RenderConfig::default());

        assert!(!latex.contains("SECRET"));
        assert!(latex.contains("$\\displaystyle v = s/t$ & hitrost \\\\[0.6em]"));
    }

    #[test]
    fn test_solution_in_parsed_row_is_left_out() {
        let source = "<EquationBox>\n<EqRow>\n<Solution>\n$F = ma$\n</Solution>\n\
                      Newtonov zakon\n</EqRow>\n</EquationBox>\n";
        let doc = from_mdx(source).unwrap();
        let latex = render_body(&doc.root, &RenderConfig::default());

        assert!(!latex.contains("F = ma"));
        assert!(latex.contains(" & Newtonov zakon \\\\[0.6em]"));
    }
}
