//! OCR: recognise text in the enhanced image, with retry/backoff.
//!
//! The engine sits behind the [`OcrEngine`] trait so callers can inject a
//! remote service (or a canned fake in tests) without touching the
//! pipeline. The default is [`TesseractEngine`], driven through the
//! `tesseract` crate.
//!
//! ## Why spawn_blocking?
//!
//! Tesseract wraps a C++ library that is CPU-bound and not async-safe.
//! `tokio::task::spawn_blocking` moves recognition onto the blocking thread
//! pool so Tokio worker threads never stall on a multi-second OCR pass.
//!
//! ## Retry strategy
//!
//! Exponential backoff (`retry_backoff_ms * 2^attempt`). Local tesseract
//! failures are usually permanent, but injected remote engines see the same
//! transient 5xx/timeout behaviour as any network API, and the pipeline
//! treats both uniformly.

use crate::config::CheckConfig;
use crate::error::GreenshotError;
use std::sync::Arc;
use tesseract::Tesseract;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Text recognition over an encoded (PNG) image.
///
/// Implementations must be cheap to call repeatedly and must not keep
/// state between calls; the pipeline may invoke them concurrently from
/// multiple checks.
pub trait OcrEngine: Send + Sync {
    /// Recognise text in the given PNG-encoded image.
    fn recognize(&self, png: &[u8]) -> Result<String, GreenshotError>;

    /// Short engine name used in logs.
    fn name(&self) -> &str {
        "ocr"
    }
}

/// The default engine: local tesseract via the `tesseract` crate.
pub struct TesseractEngine {
    language: String,
}

impl TesseractEngine {
    /// Create an engine for the given language, verifying that tesseract
    /// can be initialised at all so a missing install fails fast.
    pub fn new(language: impl Into<String>) -> Result<Self, GreenshotError> {
        let language = language.into();
        Tesseract::new(None, Some(&language)).map_err(|e| GreenshotError::OcrUnavailable {
            detail: e.to_string(),
        })?;
        Ok(Self { language })
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, png: &[u8]) -> Result<String, GreenshotError> {
        // Tesseract instances are single-use; build one per call.
        let text = Tesseract::new(None, Some(&self.language))
            .map_err(|e| GreenshotError::OcrUnavailable {
                detail: e.to_string(),
            })?
            .set_image_from_mem(png)
            .map_err(|e| ocr_failed(e.to_string()))?
            .recognize()
            .map_err(|e| ocr_failed(e.to_string()))?
            .get_text()
            .map_err(|e| ocr_failed(e.to_string()))?;
        Ok(text)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

fn ocr_failed(detail: String) -> GreenshotError {
    GreenshotError::OcrFailed { retries: 0, detail }
}

/// Run recognition with the configured retry/backoff policy.
///
/// Each attempt runs on the blocking pool; the image bytes are cloned per
/// attempt since the closure must own its input.
pub async fn recognize_text(
    engine: &Arc<dyn OcrEngine>,
    png: Vec<u8>,
    config: &CheckConfig,
) -> Result<String, GreenshotError> {
    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "OCR retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        let eng = Arc::clone(engine);
        let bytes = png.clone();
        let result = tokio::task::spawn_blocking(move || eng.recognize(&bytes))
            .await
            .map_err(|e| GreenshotError::Internal(format!("OCR task panicked: {}", e)))?;

        match result {
            Ok(text) => {
                debug!(
                    engine = engine.name(),
                    chars = text.chars().count(),
                    "OCR produced text"
                );
                return Ok(text);
            }
            Err(GreenshotError::OcrUnavailable { detail }) => {
                // Missing install or language data never heals on retry.
                return Err(GreenshotError::OcrUnavailable { detail });
            }
            Err(e) => {
                warn!("OCR attempt {} failed — {}", attempt + 1, e);
                last_err = Some(e.to_string());
            }
        }
    }

    Err(GreenshotError::OcrFailed {
        retries: config.max_retries,
        detail: last_err.unwrap_or_else(|| "unknown error".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine that fails a fixed number of times before succeeding.
    struct FlakyEngine {
        failures: usize,
        calls: AtomicUsize,
    }

    impl OcrEngine for FlakyEngine {
        fn recognize(&self, _png: &[u8]) -> Result<String, GreenshotError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(GreenshotError::OcrFailed {
                    retries: 0,
                    detail: "transient".into(),
                })
            } else {
                Ok(">recovered".to_string())
            }
        }
    }

    fn fast_config(max_retries: u32) -> CheckConfig {
        CheckConfig::builder()
            .max_retries(max_retries)
            .retry_backoff_ms(1)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn retries_until_success() {
        let engine: Arc<dyn OcrEngine> = Arc::new(FlakyEngine {
            failures: 2,
            calls: AtomicUsize::new(0),
        });
        let text = recognize_text(&engine, vec![0u8; 4], &fast_config(2))
            .await
            .expect("third attempt should succeed");
        assert_eq!(text, ">recovered");
    }

    #[tokio::test]
    async fn exhausted_retries_report_last_error() {
        let engine: Arc<dyn OcrEngine> = Arc::new(FlakyEngine {
            failures: 10,
            calls: AtomicUsize::new(0),
        });
        let err = recognize_text(&engine, vec![0u8; 4], &fast_config(1))
            .await
            .unwrap_err();
        match err {
            GreenshotError::OcrFailed { retries, detail } => {
                assert_eq!(retries, 1);
                assert!(detail.contains("transient"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unavailable_engine_is_not_retried() {
        struct Unavailable {
            calls: AtomicUsize,
        }
        impl OcrEngine for Unavailable {
            fn recognize(&self, _png: &[u8]) -> Result<String, GreenshotError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(GreenshotError::OcrUnavailable {
                    detail: "tesseract not installed".into(),
                })
            }
        }
        let inner = Arc::new(Unavailable {
            calls: AtomicUsize::new(0),
        });
        let engine: Arc<dyn OcrEngine> = inner.clone();
        let err = recognize_text(&engine, vec![], &fast_config(3))
            .await
            .unwrap_err();
        assert!(matches!(err, GreenshotError::OcrUnavailable { .. }));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }
}
