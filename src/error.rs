//! Error types.
//!
//! The judge grades untrusted output, so most entry points are
//! best-effort and never fail. `JudgeError` is what internal helpers
//! return; callers decide whether to skip the offending record or
//! surface the error (only single-document loaders do the latter).

use thiserror::Error;

/// Errors raised while reading calendar data, specs, or responses.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// A timestamp or date field could not be parsed.
    #[error("Invalid instant: {0}")]
    InvalidInstant(String),

    /// A recurrence rule could not be parsed or expanded.
    #[error("Invalid RRULE: {0}")]
    InvalidRecurrence(String),

    /// A JSON document could not be parsed or has the wrong shape.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// A required field is absent.
    #[error("Missing field: {0}")]
    MissingField(String),
}

impl From<serde_json::Error> for JudgeError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidJson(e.to_string())
    }
}
