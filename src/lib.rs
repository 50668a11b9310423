//! # greenshot
//!
//! Turn greentext screenshots back into Markdown.
//!
//! The library fetches an image (local path or URL), enhances it for OCR,
//! recognises the text, reconstructs the greentext as Markdown, and verifies
//! the result is actually a greentext story rather than an unrelated
//! screenshot. A bot loop is included that drives the whole pipeline against
//! a forum feed and replies with the transcript.
//!
//! ## Pipeline
//!
//! ```text
//! path/URL ──▶ input ──▶ enhance ──▶ ocr ──▶ format ──▶ verify
//!              resolve    upscale,   tesseract  rebuild    accept /
//!              and fetch  grayscale, w/ retries Markdown   reject
//!                         contrast
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use greenshot::{check, CheckConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), greenshot::GreenshotError> {
//!     let output = check("https://i.imgur.com/abc123.png", &CheckConfig::default()).await?;
//!     if output.verdict.is_valid {
//!         println!("{}", output.markdown);
//!     } else {
//!         println!("No greentext found.");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Already have the text? The reconstruction engine is pure and can be
//! called directly:
//!
//! ```rust
//! use greenshot::{format_greentext, CheckConfig};
//!
//! let raw = "Anonymous 01/02/03 No. 12345\n>be me\n>write doc example\n>it compiles\n>mfw";
//! let transcript = format_greentext(raw, &CheckConfig::default());
//! assert!(transcript.markdown.contains(">be me"));
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default) — build the `greenshot` binary with its clap/indicatif
//!   stack. Disable for a lean library dependency.

pub mod check;
pub mod config;
pub mod connector;
pub mod error;
pub mod format;
pub mod output;
pub mod pipeline;

pub use check::{check, check_from_bytes, check_sync, check_to_file};
pub use config::{CheckConfig, CheckConfigBuilder, Granularity};
pub use connector::{
    run_bot, BotStats, Candidate, CommentId, PlatformConnector, SeenWindow, VALID_DOMAINS,
};
pub use error::{CandidateError, ConnectorError, GreenshotError};
pub use format::verify::Verdict;
pub use format::{format_greentext, Transcript};
pub use output::{CheckOutput, CheckStats};
pub use pipeline::ocr::{OcrEngine, TesseractEngine};
