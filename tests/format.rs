//! End-to-end tests of the reconstruction engine through the public API.

use greenshot::{format_greentext, CheckConfig, Granularity};

fn default_config() -> CheckConfig {
    CheckConfig::default()
}

#[test]
fn titled_post_reconstructs_with_bold_topic() {
    let raw = "Board Name - Anonymous 01/02/03 No. 12345678\n\n\
               >be me\n>greentext test case\n>works fine";
    let out = format_greentext(raw, &default_config());

    assert_eq!(
        out.markdown,
        "**Board Name**  \n>be me  \n\\>greentext test case  \n\\>works fine"
    );
    // Title plus three quotes is four lines, which sits exactly at the
    // minimum and is therefore rejected.
    assert_eq!(out.verdict.line_count, 4);
    assert!((out.verdict.quote_ratio - 0.75).abs() < f64::EPSILON);
    assert!(!out.verdict.is_valid);
}

#[test]
fn one_more_quote_flips_the_verdict() {
    let raw = "Board Name - Anonymous 01/02/03 No. 12345678\n\n\
               >be me\n>greentext test case\n>works fine\n>mfw it does";
    let out = format_greentext(raw, &default_config());
    assert_eq!(out.verdict.line_count, 5);
    assert!(out.verdict.is_valid);
}

#[test]
fn ocr_arrow_misreads_become_quotes() {
    let raw = ":=-be me\n2:-do thing\nr=-another\nI=-and more\n>last one";
    let out = format_greentext(raw, &default_config());

    // Every line should have been recognised as a quote after normalisation.
    assert!(out.markdown.contains(">be me"));
    assert!(out.markdown.contains(">do thing"));
    assert!(out.markdown.contains(">another"));
    assert!(out.markdown.contains(">and more"));
    assert!(out.verdict.is_valid);
}

#[test]
fn two_posts_are_joined_by_one_divider() {
    let raw = "Anonymous 01/02/03\n\n>first\n>second\n\n\
               Anonymous 04/05/06\n\n>third\n>fourth";
    let out = format_greentext(raw, &default_config());

    assert_eq!(out.markdown.matches("---").count(), 1);
    assert!(!out.markdown.starts_with('-'));
    assert!(!out.markdown.ends_with('-'));
    assert!(out.verdict.is_valid);
}

#[test]
fn split_metadata_lines_do_not_duplicate_the_divider() {
    let raw = ">be me\n>do thing\nAnonymous 01/02/03\nNo. 12345678\n>second post";
    let out = format_greentext(raw, &default_config());

    assert_eq!(out.markdown.matches("---").count(), 1);
    assert!(out.markdown.contains(">second post"));
}

#[test]
fn pure_narrative_is_rejected() {
    let raw = "just\nsome\nplain\nlines\nhere\nwith no quotes at all";
    let out = format_greentext(raw, &default_config());
    assert_eq!(out.verdict.quote_ratio, 0.0);
    assert!(!out.verdict.is_valid);
}

#[test]
fn wrapped_quote_lines_are_merged_in_line_mode() {
    let raw = ">be me writing a sentence\nthat wrapped in the screenshot\n\
               >next quote\n>another\n>and one more\n>the last";
    let out = format_greentext(raw, &default_config());

    assert!(out
        .markdown
        .contains(">be me writing a sentence that wrapped in the screenshot"));
    assert!(out.verdict.is_valid);
}

#[test]
fn granularity_controls_escaping_defaults() {
    let raw = ">be me\n>do it\n>win\n>profit\n>the end";

    let line = format_greentext(raw, &default_config());
    assert!(line.markdown.contains("\\>do it"));

    let para_config = CheckConfig::builder()
        .granularity(Granularity::Paragraph)
        .build()
        .unwrap();
    let para = format_greentext(raw, &para_config);
    assert!(para.markdown.contains(">do it"));
    assert!(!para.markdown.contains("\\>"));
}

#[test]
fn escape_override_disables_backslashes_in_line_mode() {
    let config = CheckConfig::builder()
        .escape_consecutive_quotes(false)
        .build()
        .unwrap();
    let raw = ">be me\n>do it\n>win\n>profit\n>the end";
    let out = format_greentext(raw, &config);
    assert!(!out.markdown.contains("\\>"));
    assert!(out.verdict.is_valid);
}

#[test]
fn strict_profile_rejects_what_default_accepts() {
    // Five quotes then three separated narrative lines assemble to twelve
    // output lines, a ratio of 5/12 — between the two thresholds.
    let raw = ">a\n>b\n>c\n>d\n>e\n\nn1\n\nn2\n\nn3";
    let default_out = format_greentext(raw, &default_config());
    let strict_out = format_greentext(
        raw,
        &CheckConfig::builder()
            .ratio_threshold(CheckConfig::STRICT_RATIO)
            .build()
            .unwrap(),
    );

    assert!(default_out.verdict.is_valid);
    assert!(default_out.verdict.quote_ratio > 0.4);
    assert!(strict_out.verdict.quote_ratio <= CheckConfig::STRICT_RATIO);
    assert_eq!(default_out.markdown, strict_out.markdown);
    assert!(!strict_out.verdict.is_valid);
}

#[test]
fn short_title_fragments_are_dropped() {
    let raw = "/b/ - Anonymous 01/02/03\n\n>be me\n>short title test\n>more\n>even more\n>done";
    let out = format_greentext(raw, &default_config());
    assert!(!out.markdown.contains("**"));
    assert!(out.verdict.is_valid);
}

#[test]
fn output_uses_markdown_hard_line_breaks() {
    let raw = ">a line\n>b line\n>c line\n>d line\n>e line";
    let out = format_greentext(raw, &default_config());
    for line in out.markdown.split("  \n").filter(|l| !l.is_empty()) {
        assert!(!line.contains('\n'), "soft newline leaked into: {line:?}");
    }
}
