//! Input classification and document discovery.
//!
//! An input string is classified once into an [`InputSpec`]: a remote URL, a
//! single local file, or a local directory tree. [`discover`] then turns it
//! into the ordered list of [`Document`]s to convert.
//!
//! Directory trees are walked recursively and filtered by extension. Entries
//! are visited in file-name order, so two scans of an unchanged tree always
//! yield the same sequence. Symlinked files are picked up under the link's
//! own path; symlinked directories are not entered.

use crate::error::Spec2MarkupError;
use crate::paths;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File extensions (compared case-insensitively) picked up by a directory scan.
pub const RECOGNISED_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// A classified input specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum InputSpec {
    /// `http://` or `https://` URL. Never checked locally.
    Remote(String),
    /// Existing local file, made absolute.
    LocalFile(PathBuf),
    /// Existing local directory, made absolute. Root of the scan.
    LocalDir(PathBuf),
}

/// Check if the input string is an HTTP(S) URL. The scheme is matched
/// case-insensitively.
pub fn is_url(input: &str) -> bool {
    let lower = input.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl InputSpec {
    /// Classify `input`.
    ///
    /// # Errors
    /// - [`Spec2MarkupError::InvalidPath`] for an empty input
    /// - [`Spec2MarkupError::InputNotFound`] when a local path does not exist
    pub fn resolve(input: &str) -> Result<Self, Spec2MarkupError> {
        if is_url(input) {
            return Ok(InputSpec::Remote(input.trim().to_string()));
        }

        let path = paths::absolute(input)?;
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => Ok(InputSpec::LocalDir(path)),
            Ok(_) => Ok(InputSpec::LocalFile(path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Spec2MarkupError::InputNotFound { path })
            }
            Err(e) => Err(Spec2MarkupError::InvalidPath {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, InputSpec::LocalDir(_))
    }
}

impl fmt::Display for InputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSpec::Remote(url) => f.write_str(url),
            InputSpec::LocalFile(p) | InputSpec::LocalDir(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Where a document's content lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum DocumentSource {
    Local(PathBuf),
    Remote(String),
}

impl DocumentSource {
    /// The source as a URI-ish string: the absolute path or the URL.
    pub fn uri(&self) -> String {
        match self {
            DocumentSource::Local(p) => p.display().to_string(),
            DocumentSource::Remote(url) => url.clone(),
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

/// One discovered convertible document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Document {
    source: DocumentSource,
    relative_dir: PathBuf,
}

impl Document {
    /// A local document whose containing directory sits at `relative_dir`
    /// below the input root.
    pub fn local(path: impl Into<PathBuf>, relative_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: DocumentSource::Local(path.into()),
            relative_dir: relative_dir.into(),
        }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            source: DocumentSource::Remote(url.into()),
            relative_dir: PathBuf::new(),
        }
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// Containing directory relative to the input root. Empty for single-file
    /// and URL inputs, and for documents directly in the root.
    pub fn relative_dir(&self) -> &Path {
        &self.relative_dir
    }

    /// Last path segment of the source (query strings included for URLs).
    pub fn file_name(&self) -> String {
        match &self.source {
            DocumentSource::Local(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| paths::file_name_of(&p.to_string_lossy()).to_string()),
            DocumentSource::Remote(url) => paths::file_name_of(url).to_string(),
        }
    }
}

/// Produce the documents to convert for `input`.
///
/// # Errors
/// - [`Spec2MarkupError::NoDocumentsFound`] when a directory holds no file
///   with a recognised extension
/// - [`Spec2MarkupError::InvalidPath`] when part of the tree cannot be read
pub fn discover(input: &InputSpec) -> Result<Vec<Document>, Spec2MarkupError> {
    match input {
        InputSpec::Remote(url) => {
            debug!("Remote specification: {}", url);
            Ok(vec![Document::remote(url.clone())])
        }
        InputSpec::LocalFile(path) => {
            debug!("Single specification file: {}", path.display());
            Ok(vec![Document::local(path.clone(), PathBuf::new())])
        }
        InputSpec::LocalDir(root) => scan_directory(root),
    }
}

fn scan_directory(root: &Path) -> Result<Vec<Document>, Spec2MarkupError> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| Spec2MarkupError::InvalidPath {
            path: e.path().unwrap_or(root).display().to_string(),
            reason: e.to_string(),
        })?;

        if !has_recognised_extension(entry.path()) {
            continue;
        }
        // Links to files count as files; links to directories are not descended.
        let file_type = entry.file_type();
        if !(file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())) {
            if file_type.is_symlink() {
                warn!(
                    "Skipping {}: link target is missing or not a file",
                    entry.path().display()
                );
            }
            continue;
        }

        let path = entry.path();
        let parent = path.parent().unwrap_or(root);
        let relative_dir = paths::relative_suffix(root, parent)?;
        debug!(
            "Found specification: {} (relative dir '{}')",
            path.display(),
            relative_dir.display()
        );
        documents.push(Document::local(path.to_path_buf(), relative_dir));
    }

    if documents.is_empty() {
        return Err(Spec2MarkupError::NoDocumentsFound {
            path: root.to_path_buf(),
            extensions: format!("{{{}}}", RECOGNISED_EXTENSIONS.join(",")),
        });
    }

    debug!(
        "Discovered {} specification(s) under {}",
        documents.len(),
        root.display()
    );
    Ok(documents)
}

fn has_recognised_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            RECOGNISED_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{}").unwrap();
        path
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/api.yaml"));
        assert!(is_url("http://example.com/api.json"));
        assert!(is_url("HTTPS://EXAMPLE.COM/API.YAML"));
        assert!(!is_url("/tmp/api.yaml"));
        assert!(!is_url("httpdocs/api.yaml"));
        assert!(!is_url(""));
    }

    #[test]
    fn resolve_remote_skips_filesystem() {
        let spec = InputSpec::resolve("https://example.com/does-not-exist.yaml").unwrap();
        assert_eq!(
            spec,
            InputSpec::Remote("https://example.com/does-not-exist.yaml".into())
        );
        let docs = discover(&spec).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].relative_dir().as_os_str().is_empty());
        assert_eq!(docs[0].file_name(), "does-not-exist.yaml");
    }

    #[test]
    fn resolve_missing_path_fails() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("non-existent");
        let err = InputSpec::resolve(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, Spec2MarkupError::InputNotFound { path } if path == missing));
    }

    #[test]
    fn resolve_empty_input_fails() {
        assert!(matches!(
            InputSpec::resolve(""),
            Err(Spec2MarkupError::InvalidPath { .. })
        ));
    }

    #[test]
    fn single_file_yields_one_document() {
        let tmp = TempDir::new().unwrap();
        let file = touch(tmp.path(), "a/b/doc.json");
        let spec = InputSpec::resolve(file.to_str().unwrap()).unwrap();
        assert!(!spec.is_directory());

        let docs = discover(&spec).unwrap();
        assert_eq!(docs, vec![Document::local(file, "")]);
    }

    #[test]
    fn single_file_is_not_filtered_by_extension() {
        let tmp = TempDir::new().unwrap();
        let file = touch(tmp.path(), "api.txt");
        let spec = InputSpec::resolve(file.to_str().unwrap()).unwrap();
        assert_eq!(discover(&spec).unwrap().len(), 1);
    }

    #[test]
    fn directory_scan_filters_and_records_relative_dirs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(root, "x/doc1.json");
        touch(root, "y/doc2.yaml");
        touch(root, "y/deeper/doc3.YML");
        touch(root, "top.json");
        touch(root, "notes.md");
        touch(root, "x/README");

        let spec = InputSpec::resolve(root.to_str().unwrap()).unwrap();
        assert!(spec.is_directory());
        let docs = discover(&spec).unwrap();

        let found: HashSet<(String, PathBuf)> = docs
            .iter()
            .map(|d| (d.file_name(), d.relative_dir().to_path_buf()))
            .collect();
        let expected: HashSet<(String, PathBuf)> = [
            ("doc1.json", "x"),
            ("doc2.yaml", "y"),
            ("doc3.YML", "y/deeper"),
            ("top.json", ""),
        ]
        .into_iter()
        .map(|(n, d)| (n.to_string(), PathBuf::from(d)))
        .collect();
        assert_eq!(found, expected);

        for doc in &docs {
            match doc.source() {
                DocumentSource::Local(p) => assert!(p.is_absolute()),
                other => panic!("unexpected source {other:?}"),
            }
        }
    }

    #[test]
    fn directory_scan_is_repeatable() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b/two.yaml");
        touch(tmp.path(), "a/one.json");
        touch(tmp.path(), "a/three.yml");
        let spec = InputSpec::resolve(tmp.path().to_str().unwrap()).unwrap();
        assert_eq!(discover(&spec).unwrap(), discover(&spec).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_found_but_linked_dirs_are_not_entered() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        let shared = touch(tmp.path(), "shared/common.yaml");
        let root = tmp.path().join("in");
        touch(&root, "x/a.json");
        symlink(&shared, root.join("x/common.yaml")).unwrap();
        symlink(tmp.path().join("shared"), root.join("linked")).unwrap();
        symlink(tmp.path().join("gone.json"), root.join("x/dangling.json")).unwrap();

        let spec = InputSpec::resolve(root.to_str().unwrap()).unwrap();
        let docs = discover(&spec).unwrap();

        let found: Vec<(String, PathBuf)> = docs
            .iter()
            .map(|d| (d.file_name(), d.relative_dir().to_path_buf()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("a.json".to_string(), PathBuf::from("x")),
                ("common.yaml".to_string(), PathBuf::from("x")),
            ]
        );
        assert_eq!(
            docs[1].source(),
            &DocumentSource::Local(root.join("x/common.yaml"))
        );
    }

    #[test]
    fn empty_directory_fails() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "only-notes.txt");
        let spec = InputSpec::resolve(tmp.path().to_str().unwrap()).unwrap();
        let err = discover(&spec).unwrap_err();
        assert!(matches!(err, Spec2MarkupError::NoDocumentsFound { .. }));
    }
}
