//! Turning upstream HTML into plain text.

use std::sync::OnceLock;

use regex::Regex;

/// Removes markup from `html`.
///
/// Script and style blocks are dropped with their content, line breaks
/// become `\n`, closing paragraphs become `\n\n`, every other tag is
/// removed, entities are decoded and surrounding whitespace is trimmed.
pub fn strip_html(html: &str) -> String {
    static SCRIPT_STYLE: OnceLock<Regex> = OnceLock::new();
    static LINE_BREAK: OnceLock<Regex> = OnceLock::new();
    static PARAGRAPH_END: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();

    let text = SCRIPT_STYLE
        .get_or_init(|| Regex::new(r"(?is)<script.*?>.*?</script>|<style.*?>.*?</style>").unwrap())
        .replace_all(html, "");
    let text = LINE_BREAK
        .get_or_init(|| Regex::new(r"(?is)<br\s*/?>").unwrap())
        .replace_all(&text, "\n");
    let text = PARAGRAPH_END
        .get_or_init(|| Regex::new(r"(?is)</p\s*>").unwrap())
        .replace_all(&text, "\n\n");
    let text = TAG
        .get_or_init(|| Regex::new(r"(?s)<.*?>").unwrap())
        .replace_all(&text, "");
    html_escape::decode_html_entities(&text).trim().to_string()
}

/// Returns the trimmed `text`, cut to `limit` characters including a
/// trailing ellipsis if it is longer.
pub fn shorten(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut shortened = text
        .chars()
        .take(limit.saturating_sub(1))
        .collect::<String>();
    shortened.push('…');
    shortened
}

/// Returns the first `limit` characters of `text`, followed by an ellipsis
/// if anything was cut.
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => format!("{}…", &text[..end]),
        None => text.to_string(),
    }
}
