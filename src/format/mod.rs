//! Text reconstruction: turn raw OCR output into a greentext Markdown transcript.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us tune one rule
//! (e.g. the quote-ratio threshold) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! raw text ──▶ normalize ──▶ segment ──▶ assemble ──▶ verify
//! (from OCR)   (fix '>')    (classify)  (state machine)  (verdict)
//! ```
//!
//! 1. [`normalize`] — rewrite OCR misreadings of the `>` quote marker
//! 2. [`segment`]  — split into blocks and classify each as separator,
//!    quote, or narrative
//! 3. [`topic`]    — recover a post title from a separator block
//! 4. [`assemble`] — fold classified blocks into output lines, merging
//!    OCR line-wrap artefacts and inserting post dividers
//! 5. [`verify`]   — structural acceptance test (line count + quote ratio)
//!
//! The whole stage is pure and synchronous: no I/O, no clock, no shared
//! state. Identical input always yields identical output, so it is safe to
//! call concurrently from the async pipeline any number of times.

pub mod assemble;
pub mod normalize;
pub mod segment;
pub mod topic;
pub mod verify;

use crate::config::CheckConfig;
use assemble::QuoteAssembler;
use serde::{Deserialize, Serialize};
use verify::Verdict;

/// The reconstructed transcript plus its acceptance verdict.
///
/// Created and returned by [`format_greentext`]; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Assembled Markdown, lines joined with hard line breaks (`"  \n"`).
    pub markdown: String,
    /// Structural statistics and the accept/reject decision.
    pub verdict: Verdict,
}

/// Reconstruct a greentext transcript from raw OCR text.
///
/// This is the single entry point of the core engine:
/// `normalize → segment → assemble → verify`. Arbitrarily garbled input
/// (empty text, no recognisable markers, stray metadata) degrades to a
/// negative [`Verdict`] — it never panics and never returns an error.
pub fn format_greentext(raw_text: &str, config: &CheckConfig) -> Transcript {
    let text = raw_text.replace("\r\n", "\n").replace('\r', "\n");
    let text = normalize::normalize_arrows(&text);

    let blocks = segment::segment(&text, config.granularity);

    let mut assembler = QuoteAssembler::new(config.granularity, config.escape_consecutive());
    for block in &blocks {
        assembler.push(block);
    }
    let markdown = assembler.finish();

    let verdict = verify::verify(&markdown, config);
    Transcript { markdown, verdict }
}
