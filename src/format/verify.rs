//! Acceptance test: decide whether assembled text is plausibly a greentext.
//!
//! Two cheap structural statistics catch almost every false positive the
//! OCR stage produces (UI chrome, memes with captions, unrelated
//! screenshots): a transcript must have enough lines to be a story, and
//! enough of those lines must be quotes. Both thresholds use strict
//! inequality — a value exactly at the threshold is rejected.
//!
//! A rejection is a normal negative verdict, logged at WARN. It is never an
//! error and never propagates.

use crate::config::CheckConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Structural statistics and the accept/reject decision for one transcript.
///
/// Computed once per formatting run, never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the transcript is accepted as a real greentext post.
    pub is_valid: bool,
    /// Number of lines in the assembled text.
    pub line_count: usize,
    /// Fraction of lines starting with `>` or the escaped form `\>`.
    pub quote_ratio: f64,
}

/// Compute the verdict for an assembled transcript.
pub fn verify(assembled: &str, config: &CheckConfig) -> Verdict {
    let lines: Vec<&str> = assembled.split('\n').collect();
    let line_count = lines.len();

    let quote_lines = lines
        .iter()
        .filter(|l| l.starts_with('>') || l.starts_with("\\>"))
        .count();
    // split() always yields at least one element, so line_count >= 1.
    let quote_ratio = quote_lines as f64 / line_count as f64;

    let is_valid = if line_count <= config.min_lines {
        warn!(
            line_count,
            min_lines = config.min_lines,
            "rejecting transcript: not enough lines"
        );
        false
    } else if quote_ratio <= config.ratio_threshold {
        warn!(
            quote_ratio,
            threshold = config.ratio_threshold,
            "rejecting transcript: quote ratio too low"
        );
        false
    } else {
        true
    };

    Verdict {
        is_valid,
        line_count,
        quote_ratio,
    }
}
