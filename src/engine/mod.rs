//! The external conversion engine seam.
//!
//! The driver never looks at generated markup. It asks a [`MarkupConverter`]
//! to load one document and then tells the result where to write itself:
//! into one file or into a directory. Both calls are made exactly once per
//! job, through a single dispatch on [`crate::plan::OutputTarget`].
//!
//! ```text
//! DocumentSource ──convert──▶ ConvertedMarkup ──write_to_file──────▶ file
//!   (path/URL)    + config                    └─write_to_directory─▶ dir
//! ```
//!
//! [`CommandConverter`] adapts an external program to this contract;
//! [`fetch`] resolves remote sources to a local file for it.

pub mod command;
pub mod fetch;

pub use command::CommandConverter;

use crate::config::ConverterConfig;
use crate::discover::DocumentSource;
use crate::error::Spec2MarkupError;
use async_trait::async_trait;
use std::path::Path;

/// Loads one document with the forwarded converter settings.
#[async_trait]
pub trait MarkupConverter: Send + Sync {
    /// # Errors
    /// Any failure to read, fetch or parse the source. The driver reports it
    /// as-is and stops the run.
    async fn convert(
        &self,
        source: &DocumentSource,
        config: &ConverterConfig,
    ) -> Result<Box<dyn ConvertedMarkup>, Spec2MarkupError>;
}

/// A converted document, ready to be written.
#[async_trait]
pub trait ConvertedMarkup: Send + Sync {
    /// Write all generated markup into the single file `path`.
    async fn write_to_file(&self, path: &Path) -> Result<(), Spec2MarkupError>;

    /// Write the generated markup documents into the directory `path`.
    async fn write_to_directory(&self, path: &Path) -> Result<(), Spec2MarkupError>;
}
