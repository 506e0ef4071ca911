//! Canonical text extraction for embedding input.
//!
//! Prepares post text for embedding:
//! 1. Replace bare URLs and `@handle` mentions with placeholder tokens
//! 2. Collapse whitespace
//! 3. Append quoted post text when present
//! 4. Truncate to max length with ellipsis

use once_cell::sync::Lazy;
use regex::Regex;

use crate::semantic::types::PostRef;

/// Token substituted for every bare URL.
pub const URL_PLACEHOLDER: &str = "[link]";

/// Token substituted for every `@handle` mention.
pub const MENTION_PLACEHOLDER: &str = "[mention]";

/// Default maximum extracted length (characters, not tokens)
pub const DEFAULT_MAX_TEXT_CHARS: usize = 1024;

/// Ellipsis suffix when content is truncated
const TRUNCATION_SUFFIX: &str = "...";

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:https?://|www\.)[^\s]+").expect("static url regex is valid")
});

static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\B@[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?")
        .expect("static mention regex is valid")
});

/// Returns true for the placeholder tokens inserted by extraction.
pub fn is_placeholder(token: &str) -> bool {
    token == URL_PLACEHOLDER || token == MENTION_PLACEHOLDER
}

/// Derives the text to embed from a post.
#[derive(Clone, Debug)]
pub struct TextExtractor {
    include_quoted: bool,
    max_chars: usize,
}

impl TextExtractor {
    pub fn new(include_quoted: bool, max_chars: usize) -> Self {
        Self {
            include_quoted,
            max_chars,
        }
    }

    /// Extract the canonical text of a post: body, then quoted text.
    ///
    /// Returns an empty string when neither part has content; callers must
    /// not embed it.
    pub fn extract(&self, post: &PostRef) -> String {
        let body = normalize(&post.text);
        let quoted = match (&post.quoted_text, self.include_quoted) {
            (Some(quoted), true) => normalize(quoted),
            _ => String::new(),
        };

        let content = if body.is_empty() {
            quoted
        } else if quoted.is_empty() {
            body
        } else {
            format!("{body} {quoted}")
        };

        self.truncate(content)
    }

    /// Clean a search query. Queries have no quoted content.
    pub fn clean_query(&self, query: &str) -> String {
        self.truncate(normalize(query))
    }

    fn truncate(&self, content: String) -> String {
        if content.chars().count() <= self.max_chars {
            return content;
        }

        let max_chars = self.max_chars.saturating_sub(TRUNCATION_SUFFIX.len());
        let truncated: String = content.chars().take(max_chars).collect();

        format!("{}{}", truncated.trim_end(), TRUNCATION_SUFFIX)
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(true, DEFAULT_MAX_TEXT_CHARS)
    }
}

/// Replace URLs and mentions, then collapse whitespace.
fn normalize(text: &str) -> String {
    let text = URL_RE.replace_all(text, format!(" {URL_PLACEHOLDER} ").as_str());
    let text = MENTION_RE.replace_all(&text, format!(" {MENTION_PLACEHOLDER} ").as_str());

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
