//! # HTTP Utilities
//!
//! Response parsing helpers shared by the API client and the CLI, plus
//! friendly hints for the Flickr error codes users hit most often.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Return a user-facing hint for common Flickr API error codes.
///
/// Flickr reports failures as `{"stat": "fail", "code": N, "message": ...}`
/// with an HTTP 200. A handful of codes are configuration problems rather
/// than bad input, and deserve a pointer to the fix.
///
/// # Example
/// ```rust
/// use flickrview_util::http::flickr_error_hint;
///
/// let hint = flickr_error_hint(100).unwrap();
/// assert!(hint.contains("FLICKR_KEY"));
///
/// assert!(flickr_error_hint(1).is_none());
/// ```
pub fn flickr_error_hint(code: i64) -> Option<&'static str> {
    match code {
        98 => Some("Invalid auth token (98). Hint: run `flickrview auth` to obtain a fresh access token"),
        99 => Some("Insufficient permissions (99). Hint: this method needs an authenticated user; run `flickrview auth`"),
        100 => Some("Invalid API key (100). Hint: set FLICKR_KEY=... or api_key in the config file"),
        105 => Some("Service currently unavailable (105). Hint: retry later"),
        112 => Some("Method not found (112). Hint: check the method name, e.g. flickr.people.getInfo"),
        _ => None,
    }
}

/// Parse HTTP response text into JSON, providing detailed errors on failure.
///
/// Any parsing error is decorated with the originating HTTP status and a
/// truncated preview of the body, so malformed payloads can be diagnosed
/// from logs.
pub fn parse_response_json_strict(text: &str, status: Option<StatusCode>) -> Result<Value, JsonParseError> {
    serde_json::from_str::<Value>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());
        let preview = truncate_response_preview(text, 200);

        JsonParseError::new(status_note, error, preview)
    })
}

/// Collapse whitespace and cap the body preview at `limit` bytes.
pub fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Error returned when strict JSON parsing of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to parse JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    /// Access the truncated response preview captured during parsing.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}
