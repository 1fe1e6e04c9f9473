//! [`MarkupConverter`] backed by an external program.
//!
//! The program is run once per written target with this argument protocol:
//!
//! ```text
//! <program> [args..] --input <spec> --output-file <path> --config <properties>
//! <program> [args..] --input <spec> --output-dir  <path> --config <properties>
//! ```
//!
//! `<spec>` is always a local file (remote specifications are downloaded
//! first, see [`super::fetch`]) and `<properties>` holds the forwarded
//! converter settings in `key=value` form. A non-zero exit status fails the
//! job with the program's stderr in the message.

use super::fetch::{self, FetchedSource};
use super::{ConvertedMarkup, MarkupConverter};
use crate::config::{render_properties, ConverterConfig};
use crate::discover::DocumentSource;
use crate::error::Spec2MarkupError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

const PROPERTIES_FILE_NAME: &str = "converter.properties";

/// Runs an external converter program.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: PathBuf,
    args: Vec<String>,
    download_timeout_secs: u64,
}

impl CommandConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            download_timeout_secs: 120,
        }
    }

    /// Arguments placed before the `--input` flag (a subcommand, for instance).
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Timeout for fetching remote specifications. Default: 120.
    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.download_timeout_secs = secs.max(1);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl MarkupConverter for CommandConverter {
    async fn convert(
        &self,
        source: &DocumentSource,
        config: &ConverterConfig,
    ) -> Result<Box<dyn ConvertedMarkup>, Spec2MarkupError> {
        let input = fetch::fetch_source(source, self.download_timeout_secs).await?;

        let work_dir = TempDir::new().map_err(|e| Spec2MarkupError::Internal(e.to_string()))?;
        let properties = work_dir.path().join(PROPERTIES_FILE_NAME);
        tokio::fs::write(&properties, render_properties(config))
            .await
            .map_err(|e| {
                Spec2MarkupError::Internal(format!("Failed to write converter properties: {}", e))
            })?;

        Ok(Box::new(PreparedConversion {
            program: self.program.clone(),
            args: self.args.clone(),
            source_uri: source.uri(),
            input,
            properties,
            _work_dir: work_dir,
        }))
    }
}

/// A source ready to be handed to the program. Owns the temp files.
struct PreparedConversion {
    program: PathBuf,
    args: Vec<String>,
    source_uri: String,
    input: FetchedSource,
    properties: PathBuf,
    _work_dir: TempDir,
}

impl PreparedConversion {
    async fn invoke(&self, output_flag: &str, output: &Path) -> Result<(), Spec2MarkupError> {
        debug!(
            "Running {} for {} ({} {})",
            self.program.display(),
            self.source_uri,
            output_flag,
            output.display()
        );

        let result = Command::new(&self.program)
            .args(&self.args)
            .arg("--input")
            .arg(self.input.path())
            .arg(output_flag)
            .arg(output)
            .arg("--config")
            .arg(&self.properties)
            .output()
            .await
            .map_err(|e| Spec2MarkupError::ConversionFailed {
                source_uri: self.source_uri.clone(),
                reason: format!("cannot start '{}': {}", self.program.display(), e),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Spec2MarkupError::ConversionFailed {
                source_uri: self.source_uri.clone(),
                reason: format!(
                    "'{}' exited with {}: {}",
                    self.program.display(),
                    result.status,
                    stderr.trim()
                ),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ConvertedMarkup for PreparedConversion {
    async fn write_to_file(&self, path: &Path) -> Result<(), Spec2MarkupError> {
        self.invoke("--output-file", path).await
    }

    async fn write_to_directory(&self, path: &Path) -> Result<(), Spec2MarkupError> {
        self.invoke("--output-dir", path).await
    }
}
