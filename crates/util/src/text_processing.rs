//! # Text Processing Utilities
//!
//! Redaction of credentials before text reaches logs or the browser.

use once_cell::sync::Lazy;
use regex::Regex;

/// Redacts values that look like secrets in a string.
///
/// Covers OAuth and API key query parameters (as they appear in signed
/// Flickr URLs), authorization headers, and `NAME=value` assignments whose
/// name mentions a key, token, secret or password.
///
/// # Example
/// ```rust
/// use flickrview_util::redact_sensitive;
///
/// let url = "https://api.flickr.com/services/rest/?api_key=abc123&method=flickr.test.echo";
/// assert_eq!(
///     redact_sensitive(url),
///     "https://api.flickr.com/services/rest/?api_key=[REDACTED]&method=flickr.test.echo"
/// );
///
/// assert_eq!(redact_sensitive("FLICKR_SECRET=xyz"), "FLICKR_SECRET=[REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    redact_sensitive_with(input, "[REDACTED]")
}

/// Redacts sensitive-looking values, using a custom replacement token.
pub fn redact_sensitive_with(input: &str, replacement: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{replacement}")
            })
            .to_string();
    }
    redacted
}

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b((?:api_key|api_sig|oauth_token|oauth_token_secret|oauth_signature|oauth_verifier)=)([^&\s]+)",
        r"(?i)(authorization:\s+)([^\r\n]+)",
        r"(?i)\b([A-Z0-9_]*(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s&]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("redaction pattern compiles"))
    .collect()
});
