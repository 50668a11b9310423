//! Topic extraction: recover a post title from a separator block.
//!
//! Board screenshots often carry the thread subject on the same metadata
//! line as the anonymous label (`Subject Anonymous 01/02/03 No.1234…`).
//! When enough readable text precedes the label we surface it as a bolded
//! title; short fragments are dropped since they are almost always OCR
//! noise rather than a real subject.

use super::segment;

/// Minimum title length in characters. Anything shorter is treated as an
/// OCR fragment and discarded.
const MIN_TOPIC_CHARS: usize = 6;

/// Extract a bolded `**title**` from a separator block, if one exists.
///
/// Splits the block on internal newlines, finds the metadata sub-line, and
/// takes the text preceding the anonymous label. The candidate is trimmed
/// of whitespace and trailing separator dashes; it must exceed
/// [`MIN_TOPIC_CHARS`] characters to be returned.
pub fn extract_topic(block: &str) -> Option<String> {
    for part in block.split('\n') {
        if !segment::is_separator(part) {
            continue;
        }
        let candidate = part
            .split(segment::ANON_MARKER)
            .next()
            .unwrap_or("")
            .trim()
            .trim_end_matches('-')
            .trim_end();
        if candidate.chars().count() > MIN_TOPIC_CHARS {
            return Some(format!("**{candidate}**"));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_board_name_before_label() {
        assert_eq!(
            extract_topic("Board Name - Anonymous 01/02/03 No. 12345678"),
            Some("**Board Name**".to_string())
        );
    }

    #[test]
    fn short_fragment_is_dropped() {
        assert_eq!(extract_topic("/b/ - Anonymous 01/02/03"), None);
    }

    #[test]
    fn bare_metadata_has_no_topic() {
        assert_eq!(extract_topic("Anonymous 01/02/03 No. 12345678"), None);
    }

    #[test]
    fn searches_internal_sub_lines() {
        let block = "stray ocr junk\nGreentext Stories Anonymous No. 87654321";
        assert_eq!(
            extract_topic(block),
            Some("**Greentext Stories**".to_string())
        );
    }

    #[test]
    fn non_separator_block_yields_nothing() {
        assert_eq!(extract_topic(">be me"), None);
    }
}
