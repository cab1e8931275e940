use flickrview_util::http::JsonParseError;
use thiserror::Error;

/// Failures from the Flickr client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid Flickr API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Flickr answered with `stat: fail`.
    #[error("Flickr error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error(transparent)]
    Decode(#[from] JsonParseError),

    #[error("malformed Flickr response: {0}")]
    Malformed(String),

    #[error("OAuth exchange failed: {0}")]
    OAuth(String),
}

impl ApiError {
    /// Flickr error code when the remote reported one.
    pub fn remote_code(&self) -> Option<i64> {
        match self {
            Self::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Message for end users, with a hint for well-known Flickr codes.
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote { code, message } => flickrview_util::http::flickr_error_hint(*code)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{message} ({code})")),
            other => flickrview_util::redact_sensitive(&other.to_string()),
        }
    }
}
