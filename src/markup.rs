//! Emphasis stripping for model replies

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());

/// Remove `**bold**` and then `*italic*` markers, keeping the inner text.
///
/// Matching is non-greedy and never crosses a line break, so list bullets
/// like `* item` on separate lines are left alone.
pub fn strip_emphasis(text: &str) -> String {
    let without_bold = BOLD.replace_all(text, "$1");
    ITALIC.replace_all(&without_bold, "$1").into_owned()
}
