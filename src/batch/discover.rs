//! Source discovery under the content directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DocumentError, DocumentResult};

/// File extension of MDX sources
pub const SOURCE_EXTENSION: &str = "mdx";

/// One source document and its slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceDoc {
    /// Path to the `.mdx` file
    pub path: PathBuf,
    /// Path relative to the content directory, without extension, split
    /// into segments: `1-letnik/kinematika/naloge`
    pub slug: Vec<String>,
}

impl SourceDoc {
    /// Create a source from a path, with the slug taken relative to
    /// `content_dir` when the path lies inside it, else the file stem.
    pub fn new(content_dir: &Path, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let relative = path.strip_prefix(content_dir).unwrap_or(&path).with_extension("");
        let mut slug: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if slug.is_empty() {
            slug.push("document".to_string());
        }
        Self { path, slug }
    }

    /// Last slug segment, used to name the artifact
    pub fn name(&self) -> &str {
        self.slug.last().map_or("document", String::as_str)
    }

    /// Slug joined with `/`
    pub fn slug_path(&self) -> String {
        self.slug.join("/")
    }
}

/// Find all `.mdx` files below `content_dir`, sorted by path.
pub fn discover(content_dir: &Path) -> DocumentResult<Vec<SourceDoc>> {
    let mut files = Vec::new();
    walk(content_dir, &mut files)?;
    files.sort();
    log::debug!("found {} sources in {}", files.len(), content_dir.display());
    Ok(files.into_iter().map(|path| SourceDoc::new(content_dir, path)).collect())
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> DocumentResult<()> {
    let entries = fs::read_dir(dir)
        .map_err(|e| DocumentError::io(format!("reading {}", dir.display()), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| DocumentError::io(format!("reading {}", dir.display()), e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| DocumentError::io(format!("inspecting {}", path.display()), e))?;

        if file_type.is_dir() {
            walk(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}
