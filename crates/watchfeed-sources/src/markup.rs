//! Small text helpers for feed and page markup.

use regex::Regex;
use std::sync::LazyLock;

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static WHITESPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Returns the contents of a `<![CDATA[...]]>` section, or the input trimmed.
pub fn unwrap_cdata(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("<![CDATA[")
        .and_then(|inner| inner.strip_suffix("]]>"))
        .unwrap_or(trimmed)
}

/// Drops HTML tags and collapses runs of whitespace into single spaces.
pub fn strip_tags(html: &str) -> String {
    let without_tags = TAG_PATTERN.replace_all(html, " ");
    WHITESPACE_PATTERN
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}
