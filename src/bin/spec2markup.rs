//! CLI binary for spec2markup.
//!
//! A thin shim over the library crate that maps CLI flags (and their
//! `SPEC2MARKUP_*` environment fallbacks) to a `RunConfig`, then either
//! prints the plan or runs it through an external converter program.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use spec2markup::config::{load_settings, split_property};
use spec2markup::{
    plan_jobs, run, CommandConverter, ConversionJob, ConverterConfig, ProgressCallback, RunConfig,
    RunProgressCallback, Spec2MarkupError,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the run, one log line per job.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Planning");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_jobs: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} specs  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_jobs as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
    }

    fn on_job_start(&self, _index: usize, _total: usize, source: &str) {
        self.bar.set_message(source.to_string());
    }

    fn on_job_complete(&self, index: usize, total: usize, target: &str) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            dim(target)
        ));
        self.bar.inc(1);
    }

    fn on_job_error(&self, index: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let first_line = error.lines().next().unwrap_or(error);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            red("✗"),
            index,
            total,
            red(first_line)
        ));
    }

    fn on_run_complete(&self, total: usize, succeeded: usize) {
        self.bar.finish_and_clear();
        if self.errors.load(Ordering::SeqCst) == 0 {
            eprintln!(
                "{} {} specification(s) converted",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} specification(s) converted before the failure",
                red("✘"),
                bold(&succeeded.to_string()),
                total
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every spec under src/docs/swagger, mirrored into target/asciidoc
  spec2markup src/docs/swagger -d target/asciidoc --converter swagger2markup-convert

  # One remote spec into one file
  spec2markup https://petstore.swagger.io/v2/swagger.json -o target/petstore.adoc \
      --converter swagger2markup-convert

  # Converter settings from a TOML file, with an override
  spec2markup specs -d out --config-file s2m.toml \
      -c swagger2markup.markupLanguage=MARKDOWN --converter swagger2markup-convert

  # Show where every spec would be written, without converting
  spec2markup specs -d out --plan-only
  spec2markup specs -d out --plan-only --json

OUTPUT RULES:
  -o only         every spec is written to the same file (last one wins)
  -d, one spec    written into the directory as-is
  -d, many specs  the input tree is mirrored under the directory; specs that
                  share a folder each get a sub-folder named after the file
  -o and -d       as -d, with one file named like -o in each folder

CONVERTER PROTOCOL:
  <converter> [converter-args..] --input <spec> (--output-file <path> | --output-dir <path>)
              --config <properties-file>

SETTINGS FILE (TOML, nested tables become dotted keys):
  [swagger2markup]
  markupLanguage = "MARKDOWN"
  pathsGroupedBy = "TAGS"

ENVIRONMENT VARIABLES:
  SPEC2MARKUP_INPUT, SPEC2MARKUP_OUTPUT_FILE, SPEC2MARKUP_OUTPUT_DIR,
  SPEC2MARKUP_SKIP, SPEC2MARKUP_CONFIG_FILE, SPEC2MARKUP_CONVERTER,
  SPEC2MARKUP_DOWNLOAD_TIMEOUT
  RUST_LOG                overrides the log filter
"#;

/// Convert API specification files, trees and URLs to markup.
#[derive(Parser, Debug)]
#[command(
    name = "spec2markup",
    version,
    about = "Convert API specification files, folders and URLs to markup with an external converter",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Specification file, directory of specifications, or HTTP/HTTPS URL.
    #[arg(env = "SPEC2MARKUP_INPUT")]
    input: String,

    /// Write each specification's markup into this file.
    #[arg(short = 'o', long, env = "SPEC2MARKUP_OUTPUT_FILE")]
    output_file: Option<PathBuf>,

    /// Write each specification's markup below this directory.
    #[arg(short = 'd', long, env = "SPEC2MARKUP_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Do nothing and exit successfully.
    #[arg(long, env = "SPEC2MARKUP_SKIP")]
    skip: bool,

    /// Converter setting as key=value (repeatable, overrides --config-file).
    #[arg(short = 'c', long = "config", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    config: Vec<(String, String)>,

    /// TOML file with converter settings.
    #[arg(long, env = "SPEC2MARKUP_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// Converter program to run for every specification.
    #[arg(long, env = "SPEC2MARKUP_CONVERTER")]
    converter: Option<PathBuf>,

    /// Extra argument passed to the converter before the protocol flags (repeatable).
    #[arg(long = "converter-arg", value_name = "ARG", allow_hyphen_values = true)]
    converter_args: Vec<String>,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "SPEC2MARKUP_DOWNLOAD_TIMEOUT", default_value_t = 120,
          value_parser = clap::value_parser!(u64).range(1..))]
    download_timeout: u64,

    /// Print the planned jobs and exit without converting.
    #[arg(long)]
    plan_only: bool,

    /// With --plan-only, print the plan as JSON.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "SPEC2MARKUP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SPEC2MARKUP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SPEC2MARKUP_QUIET")]
    quiet: bool,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    split_property(s)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces per-job INFO lines unless --verbose is set.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.plan_only && !cli.skip;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn RunProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Plan-only mode ───────────────────────────────────────────────────
    if cli.plan_only {
        let jobs = plan_jobs(&config).context("Planning failed")?;
        print_plan(&jobs, cli.json)?;
        return Ok(());
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let program = match (&cli.converter, config.skip) {
        (Some(program), _) => program.clone(),
        // A skipped run never reaches the converter.
        (None, true) => PathBuf::new(),
        (None, false) => anyhow::bail!(
            "No converter program configured.\nPass --converter <PROGRAM> or set SPEC2MARKUP_CONVERTER."
        ),
    };
    let converter = CommandConverter::new(program)
        .args(cli.converter_args.iter().cloned())
        .download_timeout_secs(cli.download_timeout);

    let summary = match run(&config, &converter).await {
        Ok(summary) => summary,
        Err(e @ Spec2MarkupError::DownloadTimeout { .. }) => {
            return Err(anyhow::Error::new(e).context("Raise --download-timeout and retry"));
        }
        Err(e) => {
            return Err(
                anyhow::Error::new(e).context(format!("Failed to convert '{}'", cli.input))
            );
        }
    };

    if !cli.quiet && !show_progress && !summary.skipped {
        eprintln!(
            "Converted {} specification(s) in {}ms",
            summary.jobs.len(),
            summary.duration_ms
        );
    }

    Ok(())
}

/// Map CLI args to `RunConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<RunConfig> {
    let mut properties = match cli.config_file {
        Some(ref path) if !cli.skip => load_settings(path)
            .with_context(|| format!("Failed to load converter settings from {:?}", path))?,
        _ => ConverterConfig::new(),
    };
    properties.extend(cli.config.iter().cloned());

    let mut builder = RunConfig::builder(cli.input.clone())
        .skip(cli.skip)
        .properties(properties);

    if let Some(ref file) = cli.output_file {
        builder = builder.output_file(file.clone());
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_plan(jobs: &[ConversionJob], json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(jobs).context("Failed to serialise plan")?
        );
        return Ok(());
    }

    for job in jobs {
        println!("{}  ->  {}", job.document.source(), job.target);
    }
    Ok(())
}
