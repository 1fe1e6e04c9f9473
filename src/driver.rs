//! Run entry points: discovery → planning → one conversion per job.
//!
//! Jobs run strictly one after another in discovery order. The first failing
//! job ends the run and its error is returned as-is; outputs already written
//! by earlier jobs stay on disk. Re-running with the same inputs rewrites
//! every output, so a failed run is recovered by fixing the cause and running
//! again.

use crate::config::{ConverterConfig, RunConfig};
use crate::discover::{self, InputSpec};
use crate::engine::MarkupConverter;
use crate::error::Spec2MarkupError;
use crate::plan::{self, ConversionJob, OutputLayout, OutputTarget};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What a run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// The run was disabled by the `skip` flag; nothing was touched.
    pub skipped: bool,
    /// Jobs that were executed, in order.
    pub jobs: Vec<ConversionJob>,
    pub duration_ms: u64,
}

impl RunSummary {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Discover and plan without converting anything.
///
/// Ignores `skip`: this answers "what would a run do".
///
/// # Errors
/// Every discovery and planning error: missing output settings, missing
/// input, empty input directory, colliding targets.
pub fn plan_jobs(config: &RunConfig) -> Result<Vec<ConversionJob>, Spec2MarkupError> {
    let layout = OutputLayout::from_options(
        config.output_file.as_deref(),
        config.output_dir.as_deref(),
    )?;
    let input = InputSpec::resolve(&config.input)?;
    let documents = discover::discover(&input)?;
    plan::plan_layout(&documents, &input, &layout)
}

/// Convert every document the configuration points at.
///
/// With `skip` set this returns immediately: no discovery, no planning, no
/// filesystem access, no converter call.
///
/// # Errors
/// The first error of any stage. Later jobs are not attempted.
pub async fn run(
    config: &RunConfig,
    converter: &dyn MarkupConverter,
) -> Result<RunSummary, Spec2MarkupError> {
    if config.skip {
        info!("Conversion is skipped.");
        return Ok(RunSummary::skipped());
    }

    let start = Instant::now();
    log_parameters(config);

    // ── Step 1: Discover and plan ────────────────────────────────────────
    let jobs = plan_jobs(config)?;
    let total = jobs.len();
    info!("Planned {} conversion job(s) for {}", total, config.input);

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    // ── Step 2: Convert, one job at a time ───────────────────────────────
    for (idx, job) in jobs.iter().enumerate() {
        let index = idx + 1;
        let source = job.document.source().uri();
        if let Some(ref cb) = config.progress_callback {
            cb.on_job_start(index, total, &source);
        }

        if let Err(e) = execute_job(job, &config.properties, converter).await {
            if let Some(ref cb) = config.progress_callback {
                cb.on_job_error(index, total, &e.to_string());
                cb.on_run_complete(total, idx);
            }
            return Err(e);
        }

        if let Some(ref cb) = config.progress_callback {
            cb.on_job_complete(index, total, &job.target.path().display().to_string());
        }
    }

    let duration_ms = millis(start.elapsed());
    info!("Conversion complete: {} job(s), {}ms", total, duration_ms);

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, total);
    }

    Ok(RunSummary {
        skipped: false,
        jobs,
        duration_ms,
    })
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync(
    config: &RunConfig,
    converter: &dyn MarkupConverter,
) -> Result<RunSummary, Spec2MarkupError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Spec2MarkupError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run(config, converter))
}

async fn execute_job(
    job: &ConversionJob,
    properties: &ConverterConfig,
    converter: &dyn MarkupConverter,
) -> Result<(), Spec2MarkupError> {
    info!("Converting {} -> {}", job.document.source(), job.target);
    let markup = converter.convert(job.document.source(), properties).await?;

    match &job.target {
        OutputTarget::SingleFile(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dir(parent).await?;
            }
            markup.write_to_file(path).await
        }
        OutputTarget::Directory(path) => {
            create_dir(path).await?;
            markup.write_to_directory(path).await
        }
    }
}

async fn create_dir(path: &Path) -> Result<(), Spec2MarkupError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| Spec2MarkupError::output_write(path, e))
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn log_parameters(config: &RunConfig) {
    debug!("input: {}", config.input);
    debug!("output_dir: {:?}", config.output_dir);
    debug!("output_file: {:?}", config.output_file);
    for (key, value) in &config.properties {
        debug!("{}: {}", key, value);
    }
}
