//! Output path planning: one [`OutputTarget`] per discovered [`Document`].
//!
//! ## Rules
//!
//! | Outputs configured | Documents | Target |
//! |--------------------|-----------|--------|
//! | file only          | any       | `SingleFile(file)` for every document (last writer wins) |
//! | dir                | one       | `Directory(dir)` |
//! | dir                | many      | `Directory(dir/<relative dir>[/<stem>])` |
//! | file + dir         | any       | `SingleFile(<directory as above>/<file name>)` |
//!
//! The `<stem>` segment is only added when two or more documents sit in the
//! same source folder. A document alone in its folder keeps the plain
//! mirrored path.

use crate::discover::{Document, InputSpec};
use crate::error::Spec2MarkupError;
use crate::paths;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// How the caller asked for output to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OutputLayout {
    /// Every document into one file.
    File { file: PathBuf },
    /// One directory per document, mirrored below `dir`.
    Directory { dir: PathBuf },
    /// One composite file per mirrored directory below `dir`.
    Combined { file: PathBuf, dir: PathBuf },
}

impl OutputLayout {
    /// Build the layout from the two optional output settings.
    ///
    /// # Errors
    /// [`Spec2MarkupError::MissingOutput`] when neither is set.
    pub fn from_options(
        output_file: Option<&Path>,
        output_dir: Option<&Path>,
    ) -> Result<Self, Spec2MarkupError> {
        match (output_file, output_dir) {
            (Some(file), None) => Ok(OutputLayout::File {
                file: file.to_path_buf(),
            }),
            (None, Some(dir)) => Ok(OutputLayout::Directory {
                dir: dir.to_path_buf(),
            }),
            (Some(file), Some(dir)) => Ok(OutputLayout::Combined {
                file: file.to_path_buf(),
                dir: dir.to_path_buf(),
            }),
            (None, None) => Err(Spec2MarkupError::MissingOutput),
        }
    }
}

/// Where one document's generated markup goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum OutputTarget {
    SingleFile(PathBuf),
    Directory(PathBuf),
}

impl OutputTarget {
    pub fn path(&self) -> &Path {
        match self {
            OutputTarget::SingleFile(p) | OutputTarget::Directory(p) => p,
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::SingleFile(p) => write!(f, "file {}", p.display()),
            OutputTarget::Directory(p) => write!(f, "dir {}", p.display()),
        }
    }
}

/// A document paired with its output target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionJob {
    pub document: Document,
    pub target: OutputTarget,
}

/// Compute one job per document, in document order.
///
/// # Errors
/// - [`Spec2MarkupError::MissingOutput`] when neither output is set
/// - [`Spec2MarkupError::InvalidPath`] when the output file has no file name
///   to reuse in combined mode
/// - [`Spec2MarkupError::TargetCollision`] when two documents would share one
///   output location outside single-file mode
pub fn plan(
    documents: &[Document],
    input: &InputSpec,
    output_file: Option<&Path>,
    output_dir: Option<&Path>,
) -> Result<Vec<ConversionJob>, Spec2MarkupError> {
    let layout = OutputLayout::from_options(output_file, output_dir)?;
    plan_layout(documents, input, &layout)
}

/// [`plan`] for an already-validated [`OutputLayout`].
pub fn plan_layout(
    documents: &[Document],
    input: &InputSpec,
    layout: &OutputLayout,
) -> Result<Vec<ConversionJob>, Spec2MarkupError> {
    let targets: Vec<OutputTarget> = match layout {
        OutputLayout::File { file } => {
            if documents.len() > 1 {
                warn!(
                    "{} specifications share the single output file {}; later ones overwrite earlier ones",
                    documents.len(),
                    file.display()
                );
            }
            vec![OutputTarget::SingleFile(file.clone()); documents.len()]
        }
        OutputLayout::Directory { dir } => mirrored_dirs(documents, input, dir)
            .into_iter()
            .map(OutputTarget::Directory)
            .collect(),
        OutputLayout::Combined { file, dir } => {
            let name = file.file_name().ok_or_else(|| Spec2MarkupError::InvalidPath {
                path: file.display().to_string(),
                reason: "output file has no file name".into(),
            })?;
            mirrored_dirs(documents, input, dir)
                .into_iter()
                .map(|d| OutputTarget::SingleFile(d.join(name)))
                .collect()
        }
    };

    let jobs: Vec<ConversionJob> = documents
        .iter()
        .cloned()
        .zip(targets)
        .map(|(document, target)| ConversionJob { document, target })
        .collect();

    if !matches!(layout, OutputLayout::File { .. }) {
        check_distinct(&jobs)?;
    }

    for job in &jobs {
        debug!("Planned {} -> {}", job.document.source(), job.target);
    }
    Ok(jobs)
}

/// Per-document output directories below `root`.
fn mirrored_dirs(documents: &[Document], input: &InputSpec, root: &Path) -> Vec<PathBuf> {
    if documents.len() <= 1 || !input.is_directory() {
        return vec![root.to_path_buf(); documents.len()];
    }

    let mut dirs: Vec<PathBuf> = documents
        .iter()
        .map(|d| paths::join_relative(root, d.relative_dir()))
        .collect();

    let mut by_folder: HashMap<&Path, Vec<usize>> = HashMap::new();
    for (idx, doc) in documents.iter().enumerate() {
        by_folder.entry(doc.relative_dir()).or_default().push(idx);
    }

    for members in by_folder.values().filter(|m| m.len() > 1) {
        let names: Vec<String> = members.iter().map(|&i| documents[i].file_name()).collect();
        let mut stem_counts: HashMap<&str, usize> = HashMap::new();
        for name in &names {
            *stem_counts.entry(paths::strip_extension(name)).or_default() += 1;
        }
        for (&idx, name) in members.iter().zip(&names) {
            let stem = paths::strip_extension(name);
            // `api.json` next to `api.yaml`: the stem alone is ambiguous.
            let segment = if stem_counts[stem] > 1 { name.as_str() } else { stem };
            dirs[idx].push(segment);
        }
    }

    dirs
}

fn check_distinct(jobs: &[ConversionJob]) -> Result<(), Spec2MarkupError> {
    let mut seen: HashMap<&Path, &Document> = HashMap::new();
    for job in jobs {
        if let Some(first) = seen.insert(job.target.path(), &job.document) {
            return Err(Spec2MarkupError::TargetCollision {
                path: job.target.path().to_path_buf(),
                first: first.source().uri(),
                second: job.document.source().uri(),
            });
        }
    }
    Ok(())
}
