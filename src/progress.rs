//! Progress-callback trait for per-job run events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::RunConfigBuilder::progress_callback`] to be told as the
//! driver works through the planned jobs. The CLI uses it to drive a
//! terminal progress bar; a build-tool host can forward the events to its own
//! logger.
//!
//! Jobs run one at a time, so the methods are never called concurrently for
//! one run. The trait is still `Send + Sync` so a callback can be shared with
//! other threads.
//!
//! # Example
//!
//! ```rust
//! use spec2markup::{RunConfig, RunProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl RunProgressCallback for CountingCallback {
//!     fn on_job_complete(&self, index: usize, total: usize, target: &str) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} -> {}", index, total, target);
//!     }
//! }
//!
//! let config = RunConfig::builder("specs")
//!     .output_dir("out")
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the driver as it processes each conversion job.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Job indices are 1-based.
pub trait RunProgressCallback: Send + Sync {
    /// Called once after planning, before the first job.
    fn on_run_start(&self, total_jobs: usize) {
        let _ = total_jobs;
    }

    /// Called before the converter is invoked for a job.
    ///
    /// # Arguments
    /// * `index`: 1-based job number
    /// * `total`: number of planned jobs
    /// * `source`: local path or URL of the document
    fn on_job_start(&self, index: usize, total: usize, source: &str) {
        let _ = (index, total, source);
    }

    /// Called after the job's output was written.
    fn on_job_complete(&self, index: usize, total: usize, target: &str) {
        let _ = (index, total, target);
    }

    /// Called when a job fails. No further jobs run after this.
    fn on_job_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once when the run ends, successfully or not.
    ///
    /// # Arguments
    /// * `total`: number of planned jobs
    /// * `succeeded`: jobs that completed before the run ended
    fn on_run_complete(&self, total: usize, succeeded: usize) {
        let _ = (total, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RunConfig`].
pub type ProgressCallback = Arc<dyn RunProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct TrackingCallback {
        events: Mutex<Vec<String>>,
    }

    impl RunProgressCallback for TrackingCallback {
        fn on_run_start(&self, total_jobs: usize) {
            self.events.lock().unwrap().push(format!("start:{total_jobs}"));
        }

        fn on_job_error(&self, index: usize, _total: usize, error: &str) {
            self.events.lock().unwrap().push(format!("error:{index}:{error}"));
        }
    }

    #[test]
    fn noop_callback_accepts_every_event() {
        let cb = NoopProgressCallback;
        cb.on_run_start(2);
        cb.on_job_start(1, 2, "/in/a.json");
        cb.on_job_complete(1, 2, "/out/a");
        cb.on_job_error(2, 2, "boom");
        cb.on_run_complete(2, 1);
    }

    #[test]
    fn tracking_callback_records_in_order() {
        let cb = TrackingCallback {
            events: Mutex::new(Vec::new()),
        };
        cb.on_run_start(2);
        cb.on_job_complete(1, 2, "ignored");
        cb.on_job_error(2, 2, "unreachable url");
        assert_eq!(
            *cb.events.lock().unwrap(),
            vec!["start:2".to_string(), "error:2:unreachable url".to_string()]
        );
    }
}
