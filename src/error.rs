//! Error types for the greenshot library.
//!
//! Three distinct types reflect three distinct failure surfaces:
//!
//! * [`GreenshotError`] — **Fatal for one check**: the image cannot be
//!   resolved, decoded, or OCR'd at all. Returned as `Err(GreenshotError)`
//!   from the top-level `check*` functions.
//!
//! * [`CandidateError`] — **Non-fatal**: a single candidate in the bot loop
//!   failed (image fetch glitch, OCR failure, reply rejected) but the loop
//!   keeps running. Collected in [`crate::connector::BotStats`] so callers
//!   can inspect partial success.
//!
//! * [`ConnectorError`] — outcomes of the platform connector's comment
//!   submission, including the rate-limit signal with its retry delay.
//!
//! A negative [`crate::Verdict`] is deliberately *not* an error anywhere in
//! this hierarchy: "not a greentext" is the system's one expected negative
//! outcome and is carried as plain data.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// All fatal errors returned by the greenshot library.
///
/// Per-candidate failures in the bot loop use [`CandidateError`] and are
/// stored in [`crate::connector::BotStats`] rather than propagated here.
#[derive(Debug, Error)]
pub enum GreenshotError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("image file not found: '{path}'\nCheck the path exists and is readable.")]
    ImageNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a supported image format.
    #[error("file is not a supported image: '{path}'\nFirst bytes: {magic:?}")]
    NotAnImage { path: PathBuf, magic: [u8; 4] },

    // ── Image errors ──────────────────────────────────────────────────────
    /// The image header looked fine but decoding the pixel data failed.
    #[error("failed to decode image '{path}': {detail}")]
    DecodeFailed { path: PathBuf, detail: String },

    /// Re-encoding the enhanced image for the OCR engine failed.
    #[error("failed to encode enhanced image: {detail}")]
    EncodeFailed { detail: String },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR engine could not be initialised (missing tesseract install
    /// or language data).
    #[error(
        "OCR engine is not available: {detail}\n\
         Install tesseract (e.g. apt install tesseract-ocr) or inject a \
         custom OcrEngine via CheckConfig."
    )]
    OcrUnavailable { detail: String },

    /// Text recognition failed after all retries.
    #[error("OCR failed after {retries} retries: {detail}")]
    OcrFailed { retries: u32, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single bot-loop candidate.
///
/// The loop logs these, records them in [`crate::connector::BotStats`], and
/// moves on to the next candidate.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum CandidateError {
    /// The candidate's image could not be fetched or decoded.
    #[error("candidate {id}: image fetch failed: {detail}")]
    FetchFailed { id: String, detail: String },

    /// OCR failed after retries.
    #[error("candidate {id}: OCR failed: {detail}")]
    OcrFailed { id: String, detail: String },

    /// The reply could not be posted (including a second rate-limit hit).
    #[error("candidate {id}: reply failed: {detail}")]
    ReplyFailed { id: String, detail: String },
}

/// Failure outcomes of [`crate::connector::PlatformConnector::post_comment`].
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The API asked us to back off; retry after the given delay.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// Credentials were rejected; retrying will not help.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Any other submission failure.
    #[error("{0}")]
    Other(String),
}
