//! Batch generation: MDX sources to compiled artifacts.
//!
//! Each document goes through
//!
//! ```text
//! read → from_mdx → render_document → <tmp>/output.tex → Compiler → <out>/<name>.pdf
//! ```
//!
//! A failure at any step is recorded for that document and the batch moves
//! on; [`BatchReport`] collects every outcome in input order.

mod compiler;
mod discover;
mod report;

pub use compiler::{CommandCompiler, Compiler, INPUT_PLACEHOLDER, OUTDIR_PLACEHOLDER};
pub use discover::{discover, SourceDoc, SOURCE_EXTENSION};
pub use report::{BatchReport, DocumentReport, Outcome};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cache::{fingerprint, CacheKey, SharedRenderCache};
use crate::convert::from_mdx;
use crate::error::{DocumentError, DocumentResult};
use crate::render::{render_document, RenderConfig};

/// Name of the LaTeX file handed to the compiler
pub const TEX_FILE_NAME: &str = "output.tex";

// =============================================================================
// BatchConfig
// =============================================================================

/// Where sources come from and where artifacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Root of the MDX content tree
    pub content_dir: PathBuf,
    /// Directory receiving artifacts
    pub output_dir: PathBuf,
    /// Artifact extension (default: "pdf")
    pub artifact_extension: String,
    /// Write `.tex` files instead of compiling
    pub tex_only: bool,
    /// Keep each document's temporary directory
    pub keep_temp: bool,
    /// Skip documents whose source and options are unchanged
    pub incremental: bool,
}

impl BatchConfig {
    /// Create a config for a content and an output directory.
    pub fn new(content_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            output_dir: output_dir.into(),
            artifact_extension: "pdf".to_string(),
            tex_only: false,
            keep_temp: false,
            incremental: false,
        }
    }

    pub fn with_tex_only(mut self, tex_only: bool) -> Self {
        self.tex_only = tex_only;
        self
    }

    pub fn with_keep_temp(mut self, keep_temp: bool) -> Self {
        self.keep_temp = keep_temp;
        self
    }

    pub fn with_incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }

    pub fn with_artifact_extension(mut self, extension: impl Into<String>) -> Self {
        self.artifact_extension = extension.into();
        self
    }

    /// Artifact path for a source
    pub fn artifact_path(&self, doc: &SourceDoc) -> PathBuf {
        let extension = if self.tex_only { "tex" } else { &self.artifact_extension };
        self.output_dir.join(format!("{}.{extension}", doc.name()))
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new("content", "public/pdfs")
    }
}

// =============================================================================
// Batch
// =============================================================================

/// Generates artifacts for a set of sources.
pub struct Batch<C> {
    config: BatchConfig,
    render: RenderConfig,
    compiler: C,
    cache: SharedRenderCache,
}

impl<C: Compiler> Batch<C> {
    /// Create a batch with its own empty cache.
    pub fn new(config: BatchConfig, render: RenderConfig, compiler: C) -> Self {
        Self {
            config,
            render,
            compiler,
            cache: SharedRenderCache::new(),
        }
    }

    /// Share a cache with other batches (watch mode).
    pub fn with_cache(mut self, cache: SharedRenderCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn cache(&self) -> &SharedRenderCache {
        &self.cache
    }

    /// All sources under the content directory.
    pub fn discover(&self) -> DocumentResult<Vec<SourceDoc>> {
        discover(&self.config.content_dir)
    }

    /// Discover and process every source.
    pub fn run_all(&self) -> DocumentResult<BatchReport> {
        let docs = self.discover()?;
        Ok(self.run(&docs))
    }

    /// Process `docs`, recording one outcome per document.
    pub fn run(&self, docs: &[SourceDoc]) -> BatchReport {
        log::info!("generating {} documents", docs.len());
        log::debug!("render cache holds {} entries", self.cache.len());

        #[cfg(feature = "parallel")]
        let documents = {
            use rayon::prelude::*;
            docs.par_iter().map(|doc| self.report(doc)).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let documents = docs.iter().map(|doc| self.report(doc)).collect();

        BatchReport { documents }
    }

    fn report(&self, doc: &SourceDoc) -> DocumentReport {
        let outcome = match self.process(doc) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("{}: {err}", doc.path.display());
                Outcome::Failed(err)
            }
        };
        DocumentReport {
            source: doc.clone(),
            outcome,
        }
    }

    /// Generate the artifact for one document.
    pub fn process(&self, doc: &SourceDoc) -> DocumentResult<Outcome> {
        let key = CacheKey::new(&doc.path);
        let source = fs::read(&doc.path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => {
                self.cache.remove(&key);
                DocumentError::MissingSource(doc.path.clone())
            }
            _ => DocumentError::io(format!("reading {}", doc.path.display()), err),
        })?;

        let artifact = self.config.artifact_path(doc);
        let print = fingerprint(&source, &self.render);
        if self.config.incremental && artifact.is_file() && self.cache.is_fresh(&key, print) {
            log::debug!("{} unchanged", doc.slug_path());
            return Ok(Outcome::Unchanged(artifact));
        }

        let text = std::str::from_utf8(&source).map_err(|err| {
            DocumentError::io(
                format!("reading {}", doc.path.display()),
                io::Error::new(io::ErrorKind::InvalidData, err),
            )
        })?;
        let document = from_mdx(text).map_err(|source| DocumentError::Convert {
            path: doc.path.clone(),
            source,
        })?;
        let latex = render_document(&document, &self.render);

        fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            DocumentError::io(format!("creating {}", self.config.output_dir.display()), e)
        })?;

        if self.config.tex_only {
            write_file(&artifact, &latex)?;
        } else {
            self.compile(&latex, &artifact)?;
        }

        let entry = self.cache.record(key, print);
        log::info!("{} -> {} (v{})", doc.slug_path(), artifact.display(), entry.version);
        Ok(Outcome::Generated(artifact))
    }

    fn compile(&self, latex: &str, artifact: &Path) -> DocumentResult<()> {
        let tmp = tempfile::Builder::new()
            .prefix("mdx-tex-")
            .tempdir()
            .map_err(|e| DocumentError::io("creating temporary directory", e))?;

        let tex = tmp.path().join(TEX_FILE_NAME);
        write_file(&tex, latex)?;
        let produced = self.compiler.compile(&tex, tmp.path())?;
        fs::copy(&produced, artifact)
            .map_err(|e| DocumentError::io(format!("copying to {}", artifact.display()), e))?;

        if self.config.keep_temp {
            let kept = tmp.keep();
            log::info!("kept {}", kept.display());
        }
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> DocumentResult<()> {
    fs::write(path, contents)
        .map_err(|e| DocumentError::io(format!("writing {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::CompileError;

    /// Copies the `.tex` to `<out>/output.pdf`, or fails on a marker
    #[derive(Default)]
    struct FakeCompiler {
        calls: AtomicUsize,
    }

    impl Compiler for FakeCompiler {
        fn compile(&self, tex: &Path, out_dir: &Path) -> Result<PathBuf, CompileError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let latex = fs::read_to_string(tex).unwrap();
            if latex.contains("BREAK") {
                return Err(CompileError::Failed {
                    program: "fake".into(),
                    status: "exit status: 1".into(),
                    log_tail: "! Emergency stop.".into(),
                });
            }
            let artifact = out_dir.join("output.pdf");
            fs::write(&artifact, latex).unwrap();
            Ok(artifact)
        }
    }

    const PROBLEM: &str = "---\ntitle: Naloge\n---\n<Problem>\nAvto pelje $v = 20$.\n</Problem>\n";

    fn setup(names: &[&str]) -> (tempfile::TempDir, BatchConfig, Vec<SourceDoc>) {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("content");
        fs::create_dir_all(content.join("kinematika")).unwrap();
        let docs = names
            .iter()
            .map(|name| {
                let path = content.join("kinematika").join(format!("{name}.mdx"));
                fs::write(&path, PROBLEM).unwrap();
                SourceDoc::new(&content, path)
            })
            .collect();
        let config = BatchConfig::new(&content, dir.path().join("public/pdfs"));
        (dir, config, docs)
    }

    #[test]
    fn test_one_missing_source() {
        let (_dir, config, docs) = setup(&["a", "b", "c"]);
        fs::remove_file(&docs[1].path).unwrap();

        let batch = Batch::new(config.clone(), RenderConfig::default(), FakeCompiler::default());
        let report = batch.run(&docs);

        assert_eq!(report.generated(), 2);
        assert_eq!(report.failed(), 1);
        let (failed, err) = report.failures().next().unwrap();
        assert_eq!(failed.name(), "b");
        assert!(matches!(err, DocumentError::MissingSource(_)));

        let mut written: Vec<_> = fs::read_dir(&config.output_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        written.sort();
        assert_eq!(written, vec!["a.pdf", "c.pdf"]);

        let pdf = fs::read_to_string(config.output_dir.join("a.pdf")).unwrap();
        assert!(pdf.contains("\\section*{Problem 1}"));
        assert!(pdf.contains("\\title{Naloge}"));
    }

    #[test]
    fn test_report_keeps_input_order() {
        let (_dir, config, docs) = setup(&["z", "a", "m"]);
        let batch = Batch::new(config, RenderConfig::default(), FakeCompiler::default());
        let names: Vec<_> = batch
            .run(&docs)
            .documents
            .iter()
            .map(|d| d.source.name().to_string())
            .collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_failures_do_not_stop_batch() {
        let (_dir, config, docs) = setup(&["bad-mdx", "bad-tex", "good"]);
        fs::write(&docs[0].path, "<Problem>\nnever closed\n").unwrap();
        fs::write(&docs[1].path, "BREAK\n").unwrap();

        let batch = Batch::new(config, RenderConfig::default(), FakeCompiler::default());
        let report = batch.run(&docs);

        let labels: Vec<_> = report.failures().map(|(_, err)| err.label()).collect();
        assert_eq!(labels, vec!["invalid MDX", "compile failure"]);
        assert_eq!(report.generated(), 1);
        assert!(report.summary().contains("! Emergency stop."));
    }

    #[test]
    fn test_tex_only_skips_compiler() {
        let (_dir, config, docs) = setup(&["naloge"]);
        let batch = Batch::new(
            config.with_tex_only(true),
            RenderConfig::default(),
            FakeCompiler::default(),
        );
        let report = batch.run(&docs);

        let artifact = report.artifacts().next().unwrap().to_path_buf();
        assert!(artifact.ends_with("naloge.tex"));
        assert!(fs::read_to_string(artifact).unwrap().starts_with("\\documentclass"));
        assert_eq!(batch.compiler.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_incremental_skips_unchanged() {
        let (_dir, config, docs) = setup(&["a", "b"]);
        let batch = Batch::new(
            config.with_incremental(true),
            RenderConfig::default(),
            FakeCompiler::default(),
        );

        assert_eq!(batch.run(&docs).generated(), 2);
        let second = batch.run(&docs);
        assert_eq!(second.unchanged(), 2);
        assert_eq!(batch.compiler.calls.load(Ordering::SeqCst), 2);

        fs::write(&docs[0].path, "Spremenjeno.\n").unwrap();
        let third = batch.run(&docs);
        assert_eq!((third.generated(), third.unchanged()), (1, 1));
        assert_eq!(batch.cache().get(&CacheKey::new(&docs[0].path)).unwrap().version, 1);
    }

    #[test]
    fn test_deleted_source_leaves_cache() {
        let (_dir, config, docs) = setup(&["a", "b"]);
        let batch = Batch::new(
            config.with_incremental(true),
            RenderConfig::default(),
            FakeCompiler::default(),
        );
        batch.run(&docs);
        assert_eq!(batch.cache().len(), 2);

        fs::remove_file(&docs[1].path).unwrap();
        let report = batch.run(&docs);
        assert_eq!((report.unchanged(), report.failed()), (1, 1));
        assert!(batch.cache().get(&CacheKey::new(&docs[1].path)).is_none());
        assert_eq!(batch.cache().len(), 1);
    }

    #[test]
    fn test_run_all_discovers() {
        let (_dir, config, _) = setup(&["b", "a"]);
        let batch = Batch::new(config, RenderConfig::default(), FakeCompiler::default());
        let report = batch.run_all().unwrap();
        assert_eq!(report.documents[0].source.slug_path(), "kinematika/a");
        assert_eq!(report.generated(), 2);
    }
}
