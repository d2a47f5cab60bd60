//! LaTeX escaping helpers.

/// Escape reserved LaTeX characters in literal text.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(text, &mut out);
    out
}

/// Escape reserved LaTeX characters, appending to `out`.
///
/// Single pass: the braces of `\textbackslash{}` are never re-escaped.
pub fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '$' => out.push_str("\\$"),
            '&' => out.push_str("\\&"),
            '#' => out.push_str("\\#"),
            '^' => out.push_str("\\textasciicircum{}"),
            '_' => out.push_str("\\_"),
            '~' => out.push_str("\\textasciitilde{}"),
            '%' => out.push_str("\\%"),
            _ => out.push(c),
        }
    }
}

/// Escape text that may contain `$...$` math spans (titles, axis labels).
///
/// Paired dollar signs delimit math and are kept verbatim; an unpaired
/// trailing `$` is escaped like any other character.
pub fn escape_with_math(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('$') {
        let Some(len) = rest[open + 1..].find('$') else {
            break;
        };
        escape_into(&rest[..open], &mut out);
        out.push_str(&rest[open..open + len + 2]);
        rest = &rest[open + len + 2..];
    }
    escape_into(rest, &mut out);
    out
}

/// Collapse whitespace runs that contain a line break into one space, trim.
pub fn collapse_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();
    for c in text.trim().chars() {
        if c.is_whitespace() {
            pending.push(c);
            continue;
        }
        if !pending.is_empty() {
            if pending.contains('\n') {
                out.push(' ');
            } else {
                out.push_str(&pending);
            }
            pending.clear();
        }
        out.push(c);
    }
    out
}
