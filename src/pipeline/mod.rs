//! Pipeline stages wrapped around the core reconstruction engine.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a remote OCR engine) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ enhance ──▶ ocr ──▶ format
//! (URL/path) (upscale,  (tesseract,  (crate::format,
//!            grayscale,  spawn_blocking)  pure)
//!            contrast)
//! ```
//!
//! 1. [`input`]   — canonicalise the user-supplied path or URL to a local
//!    image file
//! 2. [`enhance`] — upscale, grayscale, and contrast-boost the image so the
//!    small board type survives OCR
//! 3. [`ocr`]     — drive the OCR engine with retry/backoff; runs in
//!    `spawn_blocking` because tesseract's C API is not async-safe
//!
//! The final stage, text reconstruction, lives in [`crate::format`] — it is
//! pure and shared with callers that already have raw text.

pub mod enhance;
pub mod input;
pub mod ocr;
