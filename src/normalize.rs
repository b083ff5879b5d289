//! HTML to bounded plain text.
//!
//! The extraction model only needs the visible text of a results page, so the
//! markup is flattened with a handful of regex passes rather than a DOM parse.
//! The passes are order-sensitive:
//!
//! 1. drop `<script>` and `<style>` blocks (case-insensitive, non-greedy)
//! 2. replace every remaining tag with a space
//! 3. decode `&nbsp;`, `&amp;`, `&lt;`, `&gt;`
//! 4. collapse whitespace runs and trim
//! 5. hard-truncate to [`MAX_TEXT_CHARS`] characters
//!
//! Re-running the passes on their own output is a no-op, except for
//! entity-encoded markup: `&lt;b&gt;` decodes to a literal `<b>` after tags
//! have already been stripped, and a second pass removes it.

use once_cell::sync::Lazy;
use regex::Regex;

/// Character budget for the text sent to the extraction API.
pub const MAX_TEXT_CHARS: usize = 12_000;

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid script regex")
});
static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style\b.*?</style\s*>").expect("valid style regex")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[^>]+>").expect("valid tag regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Flatten `html` into at most [`MAX_TEXT_CHARS`] characters of plain text.
///
/// # Arguments
///
/// * `html` - Raw page body; plain text passes through with whitespace collapsed
///
/// # Returns
///
/// Trimmed text with script/style blocks and tags removed and entities decoded.
pub fn clean_text(html: &str) -> String {
    clean_text_with_limit(html, MAX_TEXT_CHARS)
}

/// [`clean_text`] with an explicit character budget.
///
/// The cut is made on a character boundary with no regard for words or
/// sentences; whitespace left dangling at the cut is trimmed.
pub fn clean_text_with_limit(html: &str, max_chars: usize) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, " ");
    let text = STYLE_BLOCK.replace_all(&text, " ");
    let text = TAG.replace_all(&text, " ");
    let text = decode_entities(&text);
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].trim_end().to_string(),
        None => text.to_string(),
    }
}

// Runs after tag stripping, so decoded `<`/`>` survive into the output.
// `&amp;` goes last so `&amp;lt;` stays `&lt;`.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_and_style_blocks() {
        let html = r#"<html><head><STYLE type="text/css">body { color: red; }</STYLE>
            <script>var draws = "9999";</script></head>
            <body><h1>Hanoi</h1><Script
            src="x.js">
            alert(1)
            </sCRIPT><p>1234</p></body></html>"#;
        assert_eq!(clean_text(html), "Hanoi 1234");
    }

    #[test]
    fn test_script_removal_is_non_greedy() {
        let html = "<script>a</script>keep<script>b</script>";
        assert_eq!(clean_text(html), "keep");
    }

    #[test]
    fn test_tags_become_separators() {
        assert_eq!(clean_text("<td>12</td><td>34</td>"), "12 34");
        assert_eq!(clean_text("<br/>top3<br>"), "top3");
    }

    #[test]
    fn test_decodes_small_entity_set() {
        assert_eq!(clean_text("a&nbsp;b &amp; c&lt;d&gt;"), "a b & c<d>");
        // Other entities pass through untouched.
        assert_eq!(clean_text("&quot;x&quot;"), "&quot;x&quot;");
    }

    #[test]
    fn test_collapses_whitespace_and_trims() {
        assert_eq!(clean_text("  \n\t งวด \r\n  16 \u{a0} ต.ค.  "), "งวด 16 ต.ค.");
    }

    #[test]
    fn test_truncates_to_limit() {
        let html = format!("<p>{}</p>", "x".repeat(MAX_TEXT_CHARS + 500));
        let text = clean_text(&html);
        assert_eq!(text.chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let html = "ฮานอย".repeat(10);
        let text = clean_text_with_limit(&html, 7);
        assert_eq!(text, "ฮานอยฮา");
    }

    #[test]
    fn test_truncation_trims_dangling_space() {
        assert_eq!(clean_text_with_limit("abc def", 4), "abc");
    }

    #[test]
    fn test_short_text_is_untouched() {
        assert_eq!(clean_text_with_limit("plain", 100), "plain");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_is_idempotent() {
        let samples = [
            "<div>ผลหวย <b>ลาวพัฒนา</b></div>\n<span>งวด 1 ม.ค. 2567</span> 1234 &amp; 234",
            "<style>p{}</style>   spaced\t\tout   ",
            "no markup at all",
        ];
        for html in samples {
            let once = clean_text(html);
            assert_eq!(clean_text(&once), once);
        }

        let long = format!("<p>{}</p>", "ab cd ".repeat(5_000));
        let once = clean_text(&long);
        assert!(once.chars().count() <= MAX_TEXT_CHARS);
        assert_eq!(clean_text(&once), once);
    }

    #[test]
    fn test_entity_encoded_markup_survives_one_pass() {
        let once = clean_text("&lt;b&gt;x");
        assert_eq!(once, "<b>x");
        assert_eq!(clean_text(&once), "x");

        assert_eq!(clean_text("&amp;lt;b&amp;gt;"), "&lt;b&gt;");
    }
}
