//! Source resolution: give the converter a local file for every document.
//!
//! Remote specifications are fetched once into a `TempDir`. The directory is
//! owned by the returned [`FetchedSource`], so the download is cleaned up when
//! the conversion result is dropped. There is no retry: a failed or timed-out
//! request fails the job.

use crate::discover::DocumentSource;
use crate::error::Spec2MarkupError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

/// File name used when the URL path does not end in one.
const FALLBACK_FILE_NAME: &str = "specification";

/// A document available on the local filesystem.
pub enum FetchedSource {
    /// Source was already local.
    Local(PathBuf),
    /// Source was a URL; the body lives in `_temp_dir` until drop.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl FetchedSource {
    pub fn path(&self) -> &Path {
        match self {
            FetchedSource::Local(p) => p,
            FetchedSource::Downloaded { path, .. } => path,
        }
    }
}

/// Resolve `source` to a local file, downloading remote sources.
pub async fn fetch_source(
    source: &DocumentSource,
    timeout_secs: u64,
) -> Result<FetchedSource, Spec2MarkupError> {
    match source {
        DocumentSource::Local(path) => {
            if !path.exists() {
                return Err(Spec2MarkupError::InputNotFound { path: path.clone() });
            }
            debug!("Using local specification: {}", path.display());
            Ok(FetchedSource::Local(path.clone()))
        }
        DocumentSource::Remote(url) => download_url(url, timeout_secs).await,
    }
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<FetchedSource, Spec2MarkupError> {
    info!("Downloading specification from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Spec2MarkupError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Spec2MarkupError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Spec2MarkupError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(Spec2MarkupError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Spec2MarkupError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let temp_dir = TempDir::new().map_err(|e| Spec2MarkupError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(download_file_name(url));
    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| Spec2MarkupError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(FetchedSource::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Last URL path segment, without query or fragment, when it looks like a
/// file name. The extension matters: converters pick YAML or JSON by it.
fn download_file_name(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    FALLBACK_FILE_NAME.to_string()
}
