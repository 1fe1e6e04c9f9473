//! Path helpers shared by discovery and planning.
//!
//! Most helpers work on plain strings because a source may be a URL as well
//! as a filesystem path, and hosts sometimes hand over paths assembled from
//! fragments with mixed `/` and `\` separators.

use crate::error::Spec2MarkupError;
use std::path::{Path, PathBuf};

const SEPARATORS: [char; 2] = ['/', '\\'];

/// Resolve `path` against the process working directory.
///
/// The path does not need to exist. `..` components are kept as-is.
pub fn absolute(path: &str) -> Result<PathBuf, Spec2MarkupError> {
    if path.trim().is_empty() {
        return Err(Spec2MarkupError::InvalidPath {
            path: path.to_string(),
            reason: "path is empty".into(),
        });
    }
    std::path::absolute(path).map_err(|e| Spec2MarkupError::InvalidPath {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

/// Everything before the last `/` or `\`. Empty when there is no separator.
///
/// String-level counterpart of [`Path::parent`] for hosts holding URLs or
/// paths glued together from mixed-separator fragments. Discovery works on
/// walked [`Path`]s and uses `Path::parent` instead.
pub fn parent_of(path: &str) -> &str {
    match path.rfind(SEPARATORS) {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Everything after the last `/` or `\`.
pub fn file_name_of(path: &str) -> &str {
    match path.rfind(SEPARATORS) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Drop the last `.ext` from a file name.
///
/// A leading dot does not start an extension, so `.json` stays `.json`.
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}

/// The part of `full` below `base`.
///
/// Comparison is component-wise, so `/in` is not a prefix of `/input/a`.
/// A `full` path that is not under `base` (a symlinked or differently-cased
/// spelling, for instance) is rejected rather than guessed at.
pub fn relative_suffix(base: &Path, full: &Path) -> Result<PathBuf, Spec2MarkupError> {
    full.strip_prefix(base)
        .map(Path::to_path_buf)
        .map_err(|_| Spec2MarkupError::InvalidPath {
            path: full.display().to_string(),
            reason: format!("not located under '{}'", base.display()),
        })
}

/// `base` joined with `relative`, without a trailing separator when
/// `relative` is empty.
pub fn join_relative(base: &Path, relative: &Path) -> PathBuf {
    if relative.as_os_str().is_empty() {
        base.to_path_buf()
    } else {
        base.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_rejects_empty() {
        assert!(matches!(
            absolute(""),
            Err(Spec2MarkupError::InvalidPath { .. })
        ));
        assert!(absolute("   ").is_err());
    }

    #[test]
    fn absolute_resolves_against_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute("docs/api.yaml").unwrap(), cwd.join("docs/api.yaml"));
        let abs = cwd.join("x");
        assert_eq!(absolute(abs.to_str().unwrap()).unwrap(), abs);
    }

    #[test]
    fn parent_of_tolerates_mixed_separators() {
        assert_eq!(parent_of("/in/x/doc.json"), "/in/x");
        assert_eq!(parent_of(r"C:\in\x/doc.json"), r"C:\in\x");
        assert_eq!(parent_of(r"/in/x\y\doc.json"), "/in/x\\y");
        assert_eq!(parent_of("doc.json"), "");
    }

    #[test]
    fn file_name_of_takes_last_segment() {
        assert_eq!(file_name_of("https://host/specs/petstore.yaml"), "petstore.yaml");
        assert_eq!(file_name_of(r"a\b/c.json"), "c.json");
        assert_eq!(file_name_of("plain"), "plain");
    }

    #[test]
    fn strip_extension_removes_last_only() {
        assert_eq!(strip_extension("doc1.json"), "doc1");
        assert_eq!(strip_extension("api.v2.yaml"), "api.v2");
        assert_eq!(strip_extension("README"), "README");
        assert_eq!(strip_extension(".json"), ".json");
    }

    #[test]
    fn relative_suffix_of_descendant() {
        let rel = relative_suffix(Path::new("/in"), Path::new("/in/x/y")).unwrap();
        assert_eq!(rel, PathBuf::from("x/y"));
        let same = relative_suffix(Path::new("/in"), Path::new("/in")).unwrap();
        assert!(same.as_os_str().is_empty());
    }

    #[test]
    fn relative_suffix_rejects_non_prefix() {
        assert!(relative_suffix(Path::new("/in"), Path::new("/input/x")).is_err());
        assert!(relative_suffix(Path::new("/in"), Path::new("/other/in/x")).is_err());
    }

    #[test]
    fn relative_suffix_round_trips() {
        let root = Path::new("/work/specs");
        for full in [
            "/work/specs",
            "/work/specs/a",
            "/work/specs/a/b/c",
            "/work/specs/with space/v1",
        ] {
            let full = Path::new(full);
            let rel = relative_suffix(root, full).unwrap();
            assert_eq!(join_relative(root, &rel), full);
        }
    }

    #[test]
    fn join_relative_skips_empty() {
        assert_eq!(
            join_relative(Path::new("/out"), Path::new("")).as_os_str(),
            "/out"
        );
        assert_eq!(join_relative(Path::new("/out"), Path::new("x")), PathBuf::from("/out/x"));
    }
}
