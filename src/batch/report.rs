//! Per-document outcomes and the batch summary.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::DocumentError;

use super::SourceDoc;

/// What happened to one document
#[derive(Debug)]
pub enum Outcome {
    /// Artifact written
    Generated(PathBuf),
    /// Source unchanged since the last run; artifact left as is
    Unchanged(PathBuf),
    /// Document skipped; other documents are unaffected
    Failed(DocumentError),
}

impl Outcome {
    /// Artifact path, unless the document failed
    pub fn artifact(&self) -> Option<&Path> {
        match self {
            Self::Generated(path) | Self::Unchanged(path) => Some(path),
            Self::Failed(_) => None,
        }
    }

    /// The error, if the document failed
    pub fn error(&self) -> Option<&DocumentError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcome of one source document
#[derive(Debug)]
pub struct DocumentReport {
    pub source: SourceDoc,
    pub outcome: Outcome,
}

/// Outcomes of a batch run, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    /// Number of artifacts written
    pub fn generated(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Generated(_)))
    }

    /// Number of documents skipped as unchanged
    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Unchanged(_)))
    }

    /// Number of failed documents
    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failed)
    }

    pub fn has_failures(&self) -> bool {
        self.documents.iter().any(|d| d.outcome.is_failed())
    }

    /// Failed documents with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&SourceDoc, &DocumentError)> {
        self.documents
            .iter()
            .filter_map(|d| d.outcome.error().map(|err| (&d.source, err)))
    }

    /// Paths of all current artifacts
    pub fn artifacts(&self) -> impl Iterator<Item = &Path> {
        self.documents.iter().filter_map(|d| d.outcome.artifact())
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.documents.iter().filter(|d| pred(&d.outcome)).count()
    }

    /// Human-readable summary: one count line, then one line per failure.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} documents: {} generated, {} unchanged, {} failed",
            self.documents.len(),
            self.generated(),
            self.unchanged(),
            self.failed()
        );
        for (source, err) in self.failures() {
            let _ = write!(out, "\n  {} [{}]: {err}", source.path.display(), err.label());
        }
        out
    }
}
