//! Input resolution: normalise a user-supplied path or URL to a local file.
//!
//! ## Why download to a temp file?
//!
//! Keeping a real file on disk lets the rest of the pipeline use the same
//! decode path for both local and remote inputs, and a `TempDir` guarantees
//! cleanup when `ResolvedInput` is dropped, even if the process panics. We
//! validate the image magic bytes before returning so callers get a
//! meaningful error rather than a decoder failure deep in the pipeline.

use crate::error::GreenshotError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// The resolved input — either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; image downloaded to a temp directory.
    /// The `TempDir` is kept alive to prevent cleanup until processing completes.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Get the path to the image file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// True when the first bytes carry a known image signature
/// (PNG, JPEG, GIF, or WebP).
pub fn looks_like_image(bytes: &[u8]) -> bool {
    image_extension(bytes).is_some()
}

/// File extension matching the image signature in the first bytes.
///
/// The decoder picks its format from the path extension, so files spooled
/// from in-memory bytes must carry the right suffix.
pub(crate) fn image_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG") {
        Some(".png")
    } else if bytes.starts_with(b"\xFF\xD8\xFF") {
        Some(".jpg")
    } else if bytes.starts_with(b"GIF8") {
        Some(".gif")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some(".webp")
    } else {
        None
    }
}

/// Resolve the input string to a local image file path.
///
/// If the input is a URL, download it to a temporary directory.
/// If the input is a local file, validate it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, GreenshotError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Resolve a local file path, validating existence and image magic bytes.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, GreenshotError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(GreenshotError::ImageNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut head = [0u8; 12];
            let n = f.read(&mut head).unwrap_or(0);
            if !looks_like_image(&head[..n]) {
                let mut magic = [0u8; 4];
                let n4 = n.min(4);
                magic[..n4].copy_from_slice(&head[..n4]);
                return Err(GreenshotError::NotAnImage { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(GreenshotError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(GreenshotError::ImageNotFound { path });
        }
    }

    debug!("Resolved local image: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, GreenshotError> {
    info!("Downloading image from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| GreenshotError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            GreenshotError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            GreenshotError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(GreenshotError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = extract_filename(url);

    let temp_dir = TempDir::new().map_err(|e| GreenshotError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| GreenshotError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if !looks_like_image(&bytes) {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(GreenshotError::NotAnImage {
            path: file_path,
            magic,
        });
    }

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| GreenshotError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded to: {}", file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Extract a reasonable filename from the URL.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.png".to_string()
}
