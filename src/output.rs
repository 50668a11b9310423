//! Result types returned by the `check*` entry points.

use crate::format::verify::Verdict;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The complete result of checking one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutput {
    /// Reconstructed Markdown transcript. Present even when the verdict is
    /// negative so callers can inspect what was rejected.
    pub markdown: String,
    /// Acceptance verdict with its structural statistics.
    pub verdict: Verdict,
    /// Per-stage wall-clock timings.
    pub stats: CheckStats,
}

/// Wall-clock timings for one check, all in milliseconds.
///
/// Returned as plain data — the pipeline records each stage once and never
/// mutates the struct afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStats {
    /// Input resolution (and download, for URL inputs).
    pub download_ms: u64,
    /// Image decode plus enhancement plus PNG re-encode.
    pub enhance_ms: u64,
    /// OCR, including any retries.
    pub ocr_ms: u64,
    /// Text reconstruction and verification.
    pub format_ms: u64,
    /// End-to-end duration.
    pub total_ms: u64,
}

impl fmt::Display for CheckStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3}s (dl: {:.3}/prep: {:.3}/ocr: {:.3})",
            self.total_ms as f64 / 1000.0,
            self.download_ms as f64 / 1000.0,
            self.enhance_ms as f64 / 1000.0,
            self.ocr_ms as f64 / 1000.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_display_is_compact() {
        let stats = CheckStats {
            download_ms: 120,
            enhance_ms: 80,
            ocr_ms: 900,
            format_ms: 1,
            total_ms: 1101,
        };
        assert_eq!(stats.to_string(), "1.101s (dl: 0.120/prep: 0.080/ocr: 0.900)");
    }

    #[test]
    fn output_round_trips_through_json() {
        let out = CheckOutput {
            markdown: ">be me".to_string(),
            verdict: Verdict {
                is_valid: false,
                line_count: 1,
                quote_ratio: 1.0,
            },
            stats: CheckStats::default(),
        };
        let json = serde_json::to_string(&out).unwrap();
        let back: CheckOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(out, back);
    }
}
