//! External typesetting tool.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::CompileError;

/// Placeholder for the `.tex` input path in argument templates
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder for the output directory in argument templates
pub const OUTDIR_PLACEHOLDER: &str = "{outdir}";

/// Lines of tool output kept in failure reports
const LOG_TAIL_LINES: usize = 20;

/// Turns a `.tex` file into an artifact.
pub trait Compiler: Send + Sync {
    /// Compile `tex`, writing into `out_dir`; returns the artifact path.
    fn compile(&self, tex: &Path, out_dir: &Path) -> Result<PathBuf, CompileError>;
}

/// Runs an external program with an argument template.
///
/// Every argument has `{input}` and `{outdir}` replaced before spawning.
/// The artifact is expected at `<outdir>/<input stem>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
    extension: String,
}

impl CommandCompiler {
    /// Create a compiler for `program` with an argument template.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            extension: "pdf".to_string(),
        }
    }

    /// `pdflatex -interaction=nonstopmode -output-directory={outdir} {input}`
    pub fn pdflatex() -> Self {
        Self::new(
            "pdflatex",
            vec![
                "-interaction=nonstopmode".to_string(),
                format!("-output-directory={OUTDIR_PLACEHOLDER}"),
                INPUT_PLACEHOLDER.to_string(),
            ],
        )
    }

    /// Set the artifact extension (default: "pdf").
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Program name
    pub fn program(&self) -> &str {
        &self.program
    }

    fn expand_args(&self, tex: &Path, out_dir: &Path) -> Vec<OsString> {
        let input = tex.to_string_lossy();
        let outdir = out_dir.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                OsString::from(
                    arg.replace(INPUT_PLACEHOLDER, &input)
                        .replace(OUTDIR_PLACEHOLDER, &outdir),
                )
            })
            .collect()
    }
}

impl Default for CommandCompiler {
    fn default() -> Self {
        Self::pdflatex()
    }
}

impl Compiler for CommandCompiler {
    fn compile(&self, tex: &Path, out_dir: &Path) -> Result<PathBuf, CompileError> {
        log::debug!("running {} on {}", self.program, tex.display());
        let output = Command::new(&self.program)
            .args(self.expand_args(tex, out_dir))
            .current_dir(out_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CompileError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
            log.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(CompileError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                log_tail: log_tail(&log, LOG_TAIL_LINES),
            });
        }

        let stem = tex.file_stem().unwrap_or_default();
        let artifact = out_dir.join(stem).with_extension(&self.extension);
        if artifact.is_file() {
            Ok(artifact)
        } else {
            Err(CompileError::MissingArtifact(artifact))
        }
    }
}

/// Last `n` non-empty lines of `log`
fn log_tail(log: &str, n: usize) -> String {
    let lines: Vec<&str> = log.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_args() {
        let compiler = CommandCompiler::pdflatex();
        let args = compiler.expand_args(Path::new("/tmp/x/output.tex"), Path::new("/tmp/x"));
        assert_eq!(
            args,
            vec![
                OsString::from("-interaction=nonstopmode"),
                OsString::from("-output-directory=/tmp/x"),
                OsString::from("/tmp/x/output.tex"),
            ]
        );
    }

    #[test]
    fn test_log_tail() {
        let log = "a\n\nb\nc\n";
        assert_eq!(log_tail(log, 2), "b\nc");
        assert_eq!(log_tail(log, 10), "a\nb\nc");
        assert_eq!(log_tail("", 3), "");
    }

    #[test]
    fn test_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = CommandCompiler::new("mdx-tex-no-such-program", Vec::new());
        let err = compiler.compile(&dir.path().join("output.tex"), dir.path()).unwrap_err();
        assert!(matches!(err, CompileError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_compiler() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("output.tex");
        std::fs::write(&tex, "\\documentclass{article}").unwrap();

        let ok = CommandCompiler::new(
            "sh",
            vec!["-c".into(), "cp {input} {outdir}/output.pdf".into()],
        );
        assert_eq!(ok.compile(&tex, dir.path()).unwrap(), dir.path().join("output.pdf"));

        let no_output =
            CommandCompiler::new("sh", vec!["-c".into(), "true".into()]).with_extension("dvi");
        assert!(matches!(
            no_output.compile(&tex, dir.path()).unwrap_err(),
            CompileError::MissingArtifact(_)
        ));

        let failing = CommandCompiler::new(
            "sh",
            vec!["-c".into(), "echo '! Undefined control sequence.'; exit 3".into()],
        );
        match failing.compile(&tex, dir.path()).unwrap_err() {
            CompileError::Failed { log_tail, .. } => {
                assert_eq!(log_tail, "! Undefined control sequence.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
