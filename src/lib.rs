//! # spec2markup
//!
//! Turn one API specification input into markup conversion jobs, and decide
//! deterministically where each job's output goes.
//!
//! The input may be a single specification file, a directory tree of them, or
//! an HTTP(S) URL. The markup generator itself is an external collaborator
//! behind the [`MarkupConverter`] trait; this crate decides *what* to convert
//! and *where* the result is written.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input string
//!  │
//!  ├─ 1. Resolve   classify as URL, local file or local directory
//!  ├─ 2. Discover  recursive scan for *.yaml / *.yml / *.json
//!  ├─ 3. Plan      one output target per document (mirroring + disambiguation)
//!  └─ 4. Convert   one converter call per job, in order, stop at first error
//! ```
//!
//! ## Output planning
//!
//! With `/in/x/doc1.json`, `/in/x/doc2.json` and `/in/y/doc3.yaml` as input
//! and `/out` as output directory:
//!
//! ```text
//! /out/x/doc1   ← two documents share /in/x, so each gets its own folder
//! /out/x/doc2
//! /out/y        ← alone in /in/y, mirrored as-is
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spec2markup::{run, CommandConverter, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::builder("src/docs/swagger")
//!         .output_dir("target/asciidoc")
//!         .property("swagger2markup.markupLanguage", "ASCIIDOC")
//!         .build()?;
//!     let converter = CommandConverter::new("swagger2markup-convert");
//!     let summary = run(&config, &converter).await?;
//!     eprintln!("{} job(s) in {}ms", summary.jobs.len(), summary.duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `spec2markup` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod discover;
pub mod driver;
pub mod engine;
pub mod error;
pub mod paths;
pub mod plan;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConverterConfig, RunConfig, RunConfigBuilder};
pub use discover::{discover, Document, DocumentSource, InputSpec};
pub use driver::{plan_jobs, run, run_sync, RunSummary};
pub use engine::{CommandConverter, ConvertedMarkup, MarkupConverter};
pub use error::{ErrorKind, Spec2MarkupError};
pub use plan::{plan, ConversionJob, OutputLayout, OutputTarget};
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
