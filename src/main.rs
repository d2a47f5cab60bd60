//! `mdx-tex`: generate printable exercise sheets from MDX content.
//!
//! ```sh
//! mdx-tex build                        # content/ → public/pdfs/*.pdf
//! mdx-tex build --tex-only --out build # write .tex files only
//! mdx-tex build --watch --incremental  # regenerate on change
//! mdx-tex render content/naloge.mdx    # print LaTeX to stdout
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mdx_tex::batch::{Batch, BatchConfig, CommandCompiler, SourceDoc};
use mdx_tex::render::{LatexRenderer, RenderConfig, StrongStyle};
use mdx_tex::watch::{Regenerator, Watcher};

#[derive(Parser, Debug)]
#[command(name = "mdx-tex", version, about = "Render MDX physics exercises to LaTeX and PDF")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate artifacts for every source (or only the given files)
    Build(BuildArgs),
    /// Print the LaTeX for one file to stdout
    Render {
        /// MDX source file
        file: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Print **strong** text without `\textbf`
    #[arg(long)]
    plain_bold: bool,

    /// Pass the `draft` class option
    #[arg(long)]
    draft: bool,

    /// Base font size in points (10, 11 or 12)
    #[arg(long, value_name = "PT")]
    font_size: Option<u8>,

    /// Heading prefix for untitled problems
    #[arg(long, value_name = "TEXT", default_value = "Problem")]
    problem_prefix: String,
}

impl RenderArgs {
    fn config(&self) -> RenderConfig {
        let strong = if self.plain_bold { StrongStyle::Plain } else { StrongStyle::Bold };
        let mut config =
            RenderConfig::new(strong, self.draft).with_problem_prefix(&self.problem_prefix);
        if let Some(pt) = self.font_size {
            config = config.with_font_size(pt);
        }
        config
    }
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Root of the MDX content tree
    #[arg(long, value_name = "DIR", default_value = "content")]
    content: PathBuf,

    /// Directory receiving the artifacts
    #[arg(long, value_name = "DIR", default_value = "public/pdfs")]
    out: PathBuf,

    /// Write .tex files instead of compiling
    #[arg(long)]
    tex_only: bool,

    /// Skip sources unchanged since the last run
    #[arg(long)]
    incremental: bool,

    /// Keep temporary build directories
    #[arg(long)]
    keep_temp: bool,

    /// Typesetting program
    #[arg(long, value_name = "PROG", default_value = "pdflatex")]
    compiler: String,

    /// Compiler argument; `{input}` and `{outdir}` are substituted (repeatable)
    #[arg(long = "compiler-arg", value_name = "ARG", allow_hyphen_values = true)]
    compiler_args: Vec<String>,

    /// Keep running and regenerate when sources change
    #[arg(long)]
    watch: bool,

    /// Quiet period before regenerating in watch mode
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    debounce_ms: u64,

    #[command(flatten)]
    render: RenderArgs,

    /// Only these sources (default: everything under --content)
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,
}

impl BuildArgs {
    fn compiler(&self) -> CommandCompiler {
        if self.compiler_args.is_empty() && self.compiler == "pdflatex" {
            CommandCompiler::pdflatex()
        } else {
            CommandCompiler::new(&self.compiler, self.compiler_args.clone())
        }
    }

    fn batch_config(&self) -> BatchConfig {
        BatchConfig::new(&self.content, &self.out)
            .with_tex_only(self.tex_only)
            .with_incremental(self.incremental || self.watch)
            .with_keep_temp(self.keep_temp)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Build(args) => build(args),
        Command::Render { file, render } => render_file(&file, &render).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when any document failed.
fn build(args: BuildArgs) -> anyhow::Result<bool> {
    let batch = Batch::new(args.batch_config(), args.render.config(), args.compiler());

    let docs = if args.files.is_empty() {
        batch
            .discover()
            .with_context(|| format!("scanning {}", args.content.display()))?
    } else {
        args.files
            .iter()
            .map(|path| SourceDoc::new(&args.content, path))
            .collect()
    };

    let report = batch.run(&docs);
    println!("{}", report.summary());
    let ok = !report.has_failures();

    if !args.watch {
        return Ok(ok);
    }

    let content = batch.config().content_dir.clone();
    let explicit = args.files.clone();
    let regen = Arc::new(Regenerator::new(move |changed: &[PathBuf]| {
        let docs = if explicit.is_empty() {
            match batch.discover() {
                Ok(docs) => docs,
                Err(err) => {
                    log::error!("{err}");
                    return;
                }
            }
        } else {
            explicit
                .iter()
                .filter(|p| changed.contains(*p))
                .map(|p| SourceDoc::new(&content, p))
                .collect()
        };
        let report = batch.run(&docs);
        println!("{}", report.summary());
    }));

    log::info!("watching {} (Ctrl-C to stop)", args.content.display());
    Watcher::new(&args.content)
        .with_debounce(Duration::from_millis(args.debounce_ms))
        .run(regen);
    Ok(ok)
}

fn render_file(file: &Path, args: &RenderArgs) -> anyhow::Result<()> {
    let source =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let doc = mdx_tex::from_mdx(&source).with_context(|| format!("parsing {}", file.display()))?;
    let stats = doc.collect_stats();
    if !stats.has_problems() {
        log::warn!("{}: no <Problem> found", file.display());
    }
    log::debug!(
        "{}: {} problems, {} graphs, {} solutions left out",
        file.display(),
        stats.problem_count,
        stats.graph_count,
        stats.solution_count
    );
    print!("{}", LatexRenderer::with_config(args.config()).render_document(&doc));
    Ok(())
}
