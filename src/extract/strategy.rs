//! Payload location strategies.
//!
//! Each strategy looks at the raw reply and either yields a candidate
//! payload or passes. The chain stops at the first candidate; later
//! strategies are never consulted, even if the candidate fails to parse.

use once_cell::sync::Lazy;
use regex::Regex;

/// How a candidate payload was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    /// A fenced block tagged `json`.
    Fenced,
    /// First balanced `[...]` span.
    BalancedArray,
    /// First balanced `{...}` span.
    BalancedObject,
}

type Strategy = fn(&str) -> Option<&str>;

const STRATEGIES: [(PayloadSource, Strategy); 3] = [
    (PayloadSource::Fenced, fenced_json),
    (PayloadSource::BalancedArray, balanced_array),
    (PayloadSource::BalancedObject, balanced_object),
];

/// Runs the strategies in order and returns the first candidate.
pub fn locate_payload(text: &str) -> Option<(PayloadSource, &str)> {
    STRATEGIES
        .iter()
        .find_map(|(source, strategy)| strategy(text).map(|payload| (*source, payload)))
}

const FENCE_PATTERN: &str = r"(?s)```(?i:json)[ \t]*\r?\n(.*?)\r?\n[ \t]*```";

static FENCE_REGEX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(FENCE_PATTERN).ok());

/// Contents of the first ```` ```json ```` fence.
pub fn fenced_json(text: &str) -> Option<&str> {
    let re = FENCE_REGEX.as_ref()?;
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// First balanced `[...]` span.
pub fn balanced_array(text: &str) -> Option<&str> {
    balanced_span(text, b'[', b']')
}

/// First balanced `{...}` span.
pub fn balanced_object(text: &str) -> Option<&str> {
    balanced_span(text, b'{', b'}')
}

/// Minimal balanced span starting at the first `open`.
///
/// Only the one delimiter pair is tracked; the span ends where depth
/// first returns to zero. `None` if there is no `open` or it never
/// closes.
fn balanced_span(text: &str, open: u8, close: u8) -> Option<&str> {
    let start = text.bytes().position(|b| b == open)?;
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate().skip(start) {
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[start..=i]);
            }
        }
    }
    None
}
