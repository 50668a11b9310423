//! Arrow normalisation: rewrite known OCR misreadings of the `>` marker.
//!
//! Tesseract routinely mangles the leading quote marker of a greentext line
//! into short punctuation runs (`:=-`, `2:-`, …) depending on font and
//! compression artefacts. This pass rewrites those fixed forms back to the
//! canonical marker before segmentation, so the classifier only ever has to
//! reason about `>`.

/// Known OCR misreadings of `>`, replaced in this order.
///
/// Each pattern is replaced in a single left-to-right, non-overlapping pass;
/// later patterns do not re-scan text produced by earlier replacements.
const ARROW_MISREADS: [&str; 4] = [":=-", "2:-", "r=-", "I=-"];

/// Replace every known misreading of the quote marker with `>`.
///
/// Total and side-effect free; `normalize_arrows` is idempotent because no
/// replacement output can form a new misreading pattern.
pub fn normalize_arrows(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in ARROW_MISREADS {
        out = out.replace(pattern, ">");
    }
    out
}
