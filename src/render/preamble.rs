//! Fixed document preamble and title block.

use std::fmt::Write as _;

use crate::node::Metadata;

use super::escape::escape_with_math;
use super::RenderConfig;

/// Packages loaded by every generated document, in order
pub const PACKAGES: &[&str] = &[
    "\\usepackage[utf8]{inputenc}",
    "\\usepackage[T1]{fontenc}",
    "\\usepackage{amsmath}",
    "\\usepackage{amssymb}",
    "\\usepackage{pgfplots}",
    "\\pgfplotsset{compat=1.18}",
    "\\usepackage{geometry}",
    "\\geometry{a4paper, margin=1in}",
    "\\usepackage{parskip}",
];

/// `\documentclass` line for the configured options
pub fn document_class(config: &RenderConfig) -> String {
    let mut options = Vec::new();
    if let Some(pt) = config.font_size_pt {
        if matches!(pt, 10..=12) {
            options.push(format!("{pt}pt"));
        } else {
            log::warn!("article class supports 10pt to 12pt, ignoring {pt}pt");
        }
    }
    if config.draft {
        options.push("draft".to_string());
    }

    if options.is_empty() {
        "\\documentclass{article}".to_string()
    } else {
        format!("\\documentclass[{}]{{article}}", options.join(","))
    }
}

/// `\author` content: "section - subsection", or whichever is set
fn author_line(meta: &Metadata) -> String {
    match (meta.section.trim(), meta.subsection.trim()) {
        ("", "") => String::new(),
        (section, "") => escape_with_math(section),
        ("", subsection) => escape_with_math(subsection),
        (section, subsection) => {
            format!("{} - {}", escape_with_math(section), escape_with_math(subsection))
        }
    }
}

/// Wrap a rendered body into a complete LaTeX document.
pub fn wrap_document(body: &str, meta: &Metadata, config: &RenderConfig) -> String {
    let mut out = String::with_capacity(body.len() + 512);
    out.push_str(&document_class(config));
    out.push('\n');
    for package in PACKAGES {
        out.push_str(package);
        out.push('\n');
    }
    out.push('\n');

    let _ = writeln!(out, "\\title{{{}}}", escape_with_math(&meta.title));
    let _ = writeln!(out, "\\author{{{}}}", author_line(meta));
    out.push_str("\\date{}\n\n");

    out.push_str("\\begin{document}\n\n\\maketitle\n\n");
    out.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("\n\\end{document}\n");
    out
}
