//! Structured output with raw-text fallback.
//!
//! Every stage that expects JSON from the model runs the response text
//! through [`interpret`]. Decoding either succeeds with the expected
//! schema or degrades to [`Interpreted::RawFallback`] carrying the text
//! unchanged. Malformed output never becomes an error.

use serde::de::DeserializeOwned;
use tracing::warn;

/// Maximum characters of raw text echoed into fallback log lines.
const PREVIEW_CHARS: usize = 120;

/// Outcome of interpreting a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpreted<T> {
    /// The text decoded as the expected schema.
    Structured(T),
    /// The text did not decode; carried verbatim.
    RawFallback(String),
}

impl<T> Interpreted<T> {
    /// Returns `true` if decoding succeeded.
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// Collapses both cases into one value.
    pub fn unwrap_or_else<F>(self, fallback: F) -> T
    where
        F: FnOnce(String) -> T,
    {
        match self {
            Self::Structured(value) => value,
            Self::RawFallback(raw) => fallback(raw),
        }
    }
}

/// Attempts to decode `raw` as `T`.
///
/// Surrounding whitespace and a Markdown code fence (```` ```json ````) are
/// stripped first. Anything that still fails to decode is returned as
/// [`Interpreted::RawFallback`] with the original, untrimmed text.
pub fn interpret<T: DeserializeOwned>(raw: &str) -> Interpreted<T> {
    match serde_json::from_str::<T>(strip_code_fence(raw)) {
        Ok(value) => Interpreted::Structured(value),
        Err(e) => {
            warn!(
                error = %e,
                preview = %preview(raw),
                "response did not match expected schema, using raw text"
            );
            Interpreted::RawFallback(raw.to_string())
        }
    }
}

/// Removes a surrounding Markdown code block, if present.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    }
}

fn preview(raw: &str) -> String {
    raw.chars().take(PREVIEW_CHARS).collect()
}
