//! Configuration for a greentext check.
//!
//! All behaviour is controlled through [`CheckConfig`], built via its
//! [`CheckConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across tasks, serialise them for logging, and
//! diff two runs to understand why their verdicts differ.
//!
//! # Design choice: builder over constructor
//! The config grew one field at a time as the detection heuristics evolved;
//! a positional constructor would break on every addition. The builder lets
//! callers set only what they care about and rely on documented defaults.

use crate::error::GreenshotError;
use crate::pipeline::ocr::OcrEngine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Block boundary granularity used when segmenting raw OCR text.
///
/// Both modes are real iterations of the detection logic and both remain
/// selectable: paragraph mode reproduces the coarser historical behaviour,
/// line mode additionally repairs OCR line-wrap artefacts inside a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Split on blank lines; each paragraph is one block.
    Paragraph,
    /// Split on every newline; classify and merge per physical line. (default)
    #[default]
    Line,
}

/// Configuration for [`crate::check`] and [`crate::format_greentext`].
///
/// Built via [`CheckConfig::builder()`] or [`CheckConfig::default()`].
///
/// # Example
/// ```rust
/// use greenshot::{CheckConfig, Granularity};
///
/// let config = CheckConfig::builder()
///     .granularity(Granularity::Line)
///     .ratio_threshold(CheckConfig::STRICT_RATIO)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct CheckConfig {
    /// Segmentation granularity. Default: [`Granularity::Line`].
    pub granularity: Granularity,

    /// Backslash-escape the second and later quote lines of a run so
    /// Markdown renderers keep them visually distinct. `None` uses the
    /// granularity default (on in line mode, off in paragraph mode).
    pub escape_consecutive_quotes: Option<bool>,

    /// Minimum line count a transcript must *exceed* to be valid. Default: 4.
    ///
    /// Anything at or below this is too short to be a story; single quoted
    /// captions and two-line memes are the dominant false positives.
    pub min_lines: usize,

    /// Quote ratio a transcript must *exceed* to be valid. Default: 0.4.
    ///
    /// The threshold drifted between 0.4 and 0.51 as the heuristics were
    /// tuned against real screenshots; 0.4 keeps recall high, while
    /// [`CheckConfig::STRICT_RATIO`] trades recall for precision.
    pub ratio_threshold: f64,

    /// Integer upscale factor applied before OCR. Range 1–8. Default: 4.
    ///
    /// Board screenshots use small type; tesseract accuracy improves
    /// sharply up to roughly 4× and flattens beyond it.
    pub resize_factor: u32,

    /// Contrast boost factor applied after grayscaling. Default: 2.0.
    ///
    /// 1.0 leaves the image untouched; 2.0 doubles the distance of every
    /// pixel from the image mean, which separates anti-aliased text from
    /// the board's tinted background.
    pub contrast_factor: f32,

    /// Pre-constructed OCR engine. When `None`, a tesseract engine is
    /// created per check using [`CheckConfig::ocr_language`].
    pub ocr: Option<Arc<dyn OcrEngine>>,

    /// Tesseract language code for the default engine. Default: `"eng"`.
    pub ocr_language: String,

    /// Maximum retry attempts on a transient OCR failure. Default: 2.
    ///
    /// Local tesseract rarely fails transiently, but injected remote
    /// engines do; permanent errors surface immediately either way.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Number of concurrent checks in batch mode. Default: 4.
    pub concurrency: usize,

    /// Download timeout for URL inputs in seconds. Default: 30.
    pub download_timeout_secs: u64,
}

impl CheckConfig {
    /// The stricter historical ratio profile.
    pub const STRICT_RATIO: f64 = 0.51;

    /// Create a new builder.
    pub fn builder() -> CheckConfigBuilder {
        CheckConfigBuilder {
            config: Self::default(),
        }
    }

    /// Effective escape setting for the configured granularity.
    pub fn escape_consecutive(&self) -> bool {
        self.escape_consecutive_quotes
            .unwrap_or(self.granularity == Granularity::Line)
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::default(),
            escape_consecutive_quotes: None,
            min_lines: 4,
            ratio_threshold: 0.4,
            resize_factor: 4,
            contrast_factor: 2.0,
            ocr: None,
            ocr_language: "eng".to_string(),
            max_retries: 2,
            retry_backoff_ms: 500,
            concurrency: 4,
            download_timeout_secs: 30,
        }
    }
}

impl fmt::Debug for CheckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckConfig")
            .field("granularity", &self.granularity)
            .field("escape_consecutive_quotes", &self.escape_consecutive_quotes)
            .field("min_lines", &self.min_lines)
            .field("ratio_threshold", &self.ratio_threshold)
            .field("resize_factor", &self.resize_factor)
            .field("contrast_factor", &self.contrast_factor)
            .field("ocr", &self.ocr.as_ref().map(|_| "<dyn OcrEngine>"))
            .field("ocr_language", &self.ocr_language)
            .field("max_retries", &self.max_retries)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

/// Builder for [`CheckConfig`].
#[derive(Debug)]
pub struct CheckConfigBuilder {
    config: CheckConfig,
}

impl CheckConfigBuilder {
    pub fn granularity(mut self, g: Granularity) -> Self {
        self.config.granularity = g;
        self
    }

    pub fn escape_consecutive_quotes(mut self, v: bool) -> Self {
        self.config.escape_consecutive_quotes = Some(v);
        self
    }

    pub fn min_lines(mut self, n: usize) -> Self {
        self.config.min_lines = n;
        self
    }

    pub fn ratio_threshold(mut self, r: f64) -> Self {
        self.config.ratio_threshold = r.clamp(0.0, 1.0);
        self
    }

    pub fn resize_factor(mut self, f: u32) -> Self {
        self.config.resize_factor = f.clamp(1, 8);
        self
    }

    pub fn contrast_factor(mut self, f: f32) -> Self {
        self.config.contrast_factor = f.max(0.0);
        self
    }

    pub fn ocr(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr = Some(engine);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CheckConfig, GreenshotError> {
        let c = &self.config;
        if !(0.0..=1.0).contains(&c.ratio_threshold) {
            return Err(GreenshotError::InvalidConfig(format!(
                "ratio threshold must be within 0.0–1.0, got {}",
                c.ratio_threshold
            )));
        }
        if c.resize_factor == 0 {
            return Err(GreenshotError::InvalidConfig(
                "resize factor must be ≥ 1".into(),
            ));
        }
        if c.ocr_language.is_empty() {
            return Err(GreenshotError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
