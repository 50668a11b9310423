//! Block segmentation and classification.
//!
//! A [`Block`] is a contiguous span of the normalised raw text; its
//! [`BlockKind`] is a pure function of its content, never stored. Two
//! granularities exist because the detection logic evolved: paragraph mode
//! splits on blank lines and treats each paragraph as one unit, line mode
//! splits on every newline so OCR line-wrap artefacts inside a single quote
//! can be merged back together by the assembler. Line mode is the default —
//! it subsumes paragraph mode's post-separation behaviour.

use crate::config::Granularity;
use once_cell::sync::Lazy;
use regex::Regex;

/// Post timestamps as OCR'd from board metadata, e.g. `01/02/03`.
static RE_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\d\d/\d\d/\d\d").unwrap());

/// Post numbers, e.g. `No.12345678` or `No. 12345678`.
static RE_POST_NO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^No\. ?\d{4,}").unwrap());

/// A leading quote marker, possibly preceded by OCR noise: any run of
/// non-word characters ending in `>`, or a bare `:` (a common OCR
/// substitution for `>` at line start).
static RE_QUOTE_LEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([^\w\n]*?>|:)").unwrap());

/// The anonymous-poster label that marks forum post metadata.
pub const ANON_MARKER: &str = "Anonymous";

/// A contiguous span of raw OCR text, delimited per the chosen granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub content: String,
}

impl Block {
    /// Classification of this block; derived from content on every call.
    pub fn kind(&self) -> BlockKind {
        classify(&self.content)
    }
}

/// What a block structurally is. Classification is total: every block maps
/// to exactly one kind. Empty blocks classify as `Narrative` but carry no
/// content; the assembler consumes them as blank-line signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Forum post metadata (anonymous label, timestamp, post number).
    Separator,
    /// A line carrying the `>` quote marker (or a recognised stand-in).
    Quote,
    /// Anything else, including empty lines.
    Narrative,
}

/// Split normalised text into ordered blocks.
pub fn segment(text: &str, granularity: Granularity) -> Vec<Block> {
    let parts: Vec<&str> = match granularity {
        Granularity::Line => text.split('\n').collect(),
        Granularity::Paragraph => text.split("\n\n").collect(),
    };
    parts
        .into_iter()
        .map(|s| Block {
            content: s.to_string(),
        })
        .collect()
}

/// True when a line is forum post metadata rather than post content.
pub fn is_separator(line: &str) -> bool {
    line.contains(ANON_MARKER) || RE_DATE.is_match(line) || RE_POST_NO.is_match(line)
}

/// Classify a block's content. Total and deterministic.
pub fn classify(content: &str) -> BlockKind {
    if is_separator(content) {
        BlockKind::Separator
    } else if RE_QUOTE_LEAD.is_match(content) {
        BlockKind::Quote
    } else {
        BlockKind::Narrative
    }
}

/// Rewrite a recognised leading marker run to a single canonical `>`.
///
/// Leaves the line untouched when no marker is present.
pub(crate) fn canonicalize_marker(line: &str) -> String {
    RE_QUOTE_LEAD.replace_all(line, ">").into_owned()
}
