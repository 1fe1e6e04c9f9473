//! Error types for the spec2markup library.
//!
//! Every failure is fatal for the current run: the driver stops at the first
//! error and reports it once. Each variant carries the offending path or URI
//! so a build log line is enough to fix the configuration without re-running
//! at debug level.
//!
//! [`Spec2MarkupError::kind`] collapses the variants into the coarse
//! [`ErrorKind`] taxonomy for hosts that only need to branch on the category.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the spec2markup library.
#[derive(Debug, Error)]
pub enum Spec2MarkupError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A path argument was empty or could not be made absolute.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The input path does not exist on the local filesystem.
    #[error("Input not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// The input directory exists but holds no recognised document.
    #[error("No API specification files (*.{extensions}) found in directory: '{path}'")]
    NoDocumentsFound { path: PathBuf, extensions: String },

    // ── Planning errors ───────────────────────────────────────────────────
    /// Neither an output file nor an output directory was configured.
    #[error("Either an output file or an output directory must be configured")]
    MissingOutput,

    /// Two documents were planned into the same output directory.
    #[error("Output directory '{path}' would be shared by '{first}' and '{second}'")]
    TargetCollision {
        path: PathBuf,
        first: String,
        second: String,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output location.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Converter errors ──────────────────────────────────────────────────
    /// The external converter rejected the document or exited with an error.
    #[error("Conversion of '{source_uri}' failed: {reason}")]
    ConversionFailed { source_uri: String, reason: String },

    /// A remote specification could not be fetched.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// The remote fetch exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}' (see CommandConverter::download_timeout_secs)")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation or settings file parsing failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidPath,
    InputNotFound,
    NoDocumentsFound,
    MissingOutput,
    OutputWrite,
    Conversion,
    Config,
}

impl Spec2MarkupError {
    /// Category of this error.
    ///
    /// Download failures are reported as [`ErrorKind::Conversion`]: fetching a
    /// remote specification is part of converting it. A target collision is a
    /// planning problem the user fixes in configuration, so it is
    /// [`ErrorKind::Config`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPath { .. } => ErrorKind::InvalidPath,
            Self::InputNotFound { .. } => ErrorKind::InputNotFound,
            Self::NoDocumentsFound { .. } => ErrorKind::NoDocumentsFound,
            Self::MissingOutput => ErrorKind::MissingOutput,
            Self::OutputWriteFailed { .. } => ErrorKind::OutputWrite,
            Self::ConversionFailed { .. }
            | Self::DownloadFailed { .. }
            | Self::DownloadTimeout { .. }
            | Self::Internal(_) => ErrorKind::Conversion,
            Self::TargetCollision { .. } | Self::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWriteFailed {
            path: path.into(),
            source,
        }
    }
}
