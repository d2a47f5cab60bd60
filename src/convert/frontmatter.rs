//! YAML front matter.

use crate::node::Metadata;

/// Front matter split off an MDX source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    /// YAML between the `---` fences, if any
    pub yaml: Option<&'a str>,
    /// Everything after the closing fence
    pub body: &'a str,
    /// Number of source lines before `body`
    pub body_line_offset: usize,
}

/// Split `---` fenced front matter from the body.
///
/// The opening fence must be the first line. Without a closing fence the
/// whole source is body.
pub fn split(source: &str) -> Split<'_> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let no_front_matter = Split {
        yaml: None,
        body: source,
        body_line_offset: 0,
    };

    let Some(first_end) = source.find('\n') else {
        return no_front_matter;
    };
    if source[..first_end].trim_end() != "---" {
        return no_front_matter;
    }

    let mut offset = first_end + 1;
    let mut lines = 1;
    for line in source[offset..].split_inclusive('\n') {
        lines += 1;
        let fence = matches!(line.trim_end(), "---" | "...");
        if fence {
            return Split {
                yaml: Some(&source[first_end + 1..offset]),
                body: &source[offset + line.len()..],
                body_line_offset: lines,
            };
        }
        offset += line.len();
    }
    no_front_matter
}

/// Read title block fields from YAML front matter.
///
/// Missing keys keep their defaults; unreadable YAML falls back to defaults
/// entirely.
pub fn parse_metadata(yaml: &str) -> Metadata {
    if yaml.trim().is_empty() {
        return Metadata::default();
    }
    match serde_saphyr::from_str::<Metadata>(yaml) {
        Ok(meta) => meta,
        Err(err) => {
            log::warn!("ignoring malformed front matter: {err}");
            Metadata::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split() {
        let src = "---\ntitle: Kinematika\n---\n# Body\n";
        let split = split(src);
        assert_eq!(split.yaml, Some("title: Kinematika\n"));
        assert_eq!(split.body, "# Body\n");
        assert_eq!(split.body_line_offset, 3);
    }

    #[test]
    fn test_no_front_matter() {
        let src = "# Body\n---\n";
        assert_eq!(split(src).yaml, None);
        assert_eq!(split(src).body, src);

        let unclosed = "---\ntitle: x\n";
        assert_eq!(split(unclosed).yaml, None);
    }

    #[test]
    fn test_parse_metadata() {
        let meta =
            parse_metadata("title: Premo gibanje\nsection: 1. Letnik\nsubsection: Kinematika\n");
        assert_eq!(meta.title, "Premo gibanje");
        assert_eq!(meta.section, "1. Letnik");
        assert_eq!(meta.subsection, "Kinematika");

        let partial = parse_metadata("section: Dinamika\norder: 3\n");
        assert_eq!(partial.title, Metadata::DEFAULT_TITLE);
        assert_eq!(partial.section, "Dinamika");
    }

    #[test]
    fn test_malformed_falls_back() {
        assert_eq!(parse_metadata("title: [unclosed"), Metadata::default());
        assert_eq!(parse_metadata("  \n"), Metadata::default());
    }
}
