//! Eager check entry points: run the full pipeline on one image.
//!
//! [`check`] is the canonical path — resolve the input, enhance the image,
//! OCR it, reconstruct the transcript, verify. The other entry points are
//! thin wrappers: [`check_from_bytes`] for in-memory images,
//! [`check_to_file`] to persist the Markdown, and [`check_sync`] for
//! callers without a Tokio runtime.

use crate::config::CheckConfig;
use crate::error::GreenshotError;
use crate::format::format_greentext;
use crate::output::{CheckOutput, CheckStats};
use crate::pipeline::{enhance, input, ocr};
use crate::pipeline::ocr::{OcrEngine, TesseractEngine};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Check a single image (local path or URL) for greentext content.
///
/// Runs the full pipeline and returns the reconstructed Markdown together
/// with the verdict and per-stage timings. A negative verdict is a normal
/// result, not an error; errors are reserved for pipeline failures
/// (missing file, download failure, OCR breakdown).
///
/// # Example
/// ```rust,no_run
/// use greenshot::{check, CheckConfig};
///
/// # async fn run() -> Result<(), greenshot::GreenshotError> {
/// let output = check("https://i.imgur.com/abc123.png", &CheckConfig::default()).await?;
/// if output.verdict.is_valid {
///     println!("{}", output.markdown);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn check(
    input_str: impl AsRef<str>,
    config: &CheckConfig,
) -> Result<CheckOutput, GreenshotError> {
    let input_str = input_str.as_ref();
    let total_start = Instant::now();
    let mut stats = CheckStats::default();

    // Stage 1: resolve the input to a local image file.
    let stage = Instant::now();
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    stats.download_ms = stage.elapsed().as_millis() as u64;

    // Stage 2: decode and enhance. Both are CPU-bound, so they run on the
    // blocking pool together with the PNG re-encode.
    let stage = Instant::now();
    let path = resolved.path().to_path_buf();
    let cfg = config.clone();
    let png = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, GreenshotError> {
        let img = image::open(&path).map_err(|e| GreenshotError::DecodeFailed {
            path,
            detail: e.to_string(),
        })?;
        let enhanced = enhance::enhance(&img, &cfg);
        enhance::to_png_bytes(&enhanced)
    })
    .await
    .map_err(|e| GreenshotError::Internal(format!("enhance task panicked: {}", e)))??;
    stats.enhance_ms = stage.elapsed().as_millis() as u64;
    debug!("Enhanced {} in {}ms", input_str, stats.enhance_ms);

    // Stage 3: OCR with retry/backoff.
    let stage = Instant::now();
    let engine = resolve_engine(config)?;
    let raw_text = ocr::recognize_text(&engine, png, config).await?;
    stats.ocr_ms = stage.elapsed().as_millis() as u64;
    drop(resolved);

    // Stage 4: reconstruct and verify. Pure and fast.
    let stage = Instant::now();
    let transcript = format_greentext(&raw_text, config);
    stats.format_ms = stage.elapsed().as_millis() as u64;

    stats.total_ms = total_start.elapsed().as_millis() as u64;
    info!(
        input = input_str,
        valid = transcript.verdict.is_valid,
        lines = transcript.verdict.line_count,
        "Check finished in {}",
        stats
    );

    Ok(CheckOutput {
        markdown: transcript.markdown,
        verdict: transcript.verdict,
        stats,
    })
}

/// Check an image already held in memory.
///
/// The bytes are validated and spooled to a temp file so the rest of the
/// pipeline can use the same decode path as [`check`].
pub async fn check_from_bytes(
    bytes: &[u8],
    config: &CheckConfig,
) -> Result<CheckOutput, GreenshotError> {
    let suffix = match input::image_extension(bytes) {
        Some(ext) => ext,
        None => {
            let mut magic = [0u8; 4];
            let n = bytes.len().min(4);
            magic[..n].copy_from_slice(&bytes[..n]);
            return Err(GreenshotError::NotAnImage {
                path: "<bytes>".into(),
                magic,
            });
        }
    };

    // The decoder resolves the format from the path, so the spooled file
    // must carry the extension matching the sniffed signature.
    let mut tmp = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .map_err(|e| GreenshotError::Internal(format!("failed to create temp file: {}", e)))?;
    tmp.write_all(bytes)
        .map_err(|e| GreenshotError::Internal(format!("failed to write temp file: {}", e)))?;
    tmp.flush()
        .map_err(|e| GreenshotError::Internal(format!("failed to flush temp file: {}", e)))?;

    let path = tmp.path().to_string_lossy().into_owned();
    check(&path, config).await
}

/// Check an image and write the Markdown transcript to `output_path`.
///
/// The file is written atomically (temp file + rename) so a crash mid-write
/// never leaves a truncated transcript behind. The transcript is written
/// even when the verdict is negative; callers decide what to do with it.
pub async fn check_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &CheckConfig,
) -> Result<CheckOutput, GreenshotError> {
    let output_path = output_path.as_ref();
    let result = check(input_str, config).await?;

    let dir = output_path.parent().unwrap_or_else(|| Path::new("."));
    let write_err = |e: std::io::Error| GreenshotError::OutputWriteFailed {
        path: output_path.to_path_buf(),
        source: e,
    };

    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tokio::fs::write(tmp.path(), result.markdown.as_bytes())
        .await
        .map_err(write_err)?;
    tmp.persist(output_path)
        .map_err(|e| write_err(e.error))?;

    info!("Wrote transcript to {}", output_path.display());
    Ok(result)
}

/// Blocking wrapper around [`check`] for synchronous callers.
///
/// Creates a throwaway runtime per call. Must not be called from inside a
/// Tokio runtime; use [`check`] there instead.
pub fn check_sync(
    input_str: impl AsRef<str>,
    config: &CheckConfig,
) -> Result<CheckOutput, GreenshotError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| GreenshotError::Internal(format!("failed to create runtime: {}", e)))?;
    runtime.block_on(check(input_str, config))
}

/// Pick the configured engine or fall back to local tesseract.
fn resolve_engine(config: &CheckConfig) -> Result<Arc<dyn OcrEngine>, GreenshotError> {
    match &config.ocr {
        Some(engine) => Ok(Arc::clone(engine)),
        None => Ok(Arc::new(TesseractEngine::new(&config.ocr_language)?)),
    }
}
