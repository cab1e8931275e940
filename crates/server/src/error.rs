use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use flickrview_explorer::RemoteError;
use flickrview_util::{PersonStoreError, redact_sensitive};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::templates;

/// Errors a view can end with. Each renders as an error page; none stops
/// the server.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Flickr call failed: {0}")]
    Upstream(#[from] RemoteError),

    #[error("unexpected Flickr payload: {0}")]
    Payload(String),

    #[error(transparent)]
    Store(#[from] PersonStoreError),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) | Self::Payload(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) | Self::Template(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a remote failure, treating Flickr's "not found" codes as 404.
    pub fn from_remote(error: RemoteError, what: &str) -> Self {
        match error {
            RemoteError::Status { code: 1, message } => Self::NotFound(format!("{what}: {message}")),
            other => Self::Upstream(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = redact_sensitive(&self.to_string());
        if status.is_server_error() {
            error!(%status, error = %message, "request failed");
        } else {
            warn!(%status, error = %message, "request rejected");
        }

        let context = json!({
            "status": status.as_u16(),
            "reason": status.canonical_reason().unwrap_or("Error"),
            "message": message,
        });
        match templates::render("error.html", &context) {
            Ok(page) => (status, Html(page)).into_response(),
            Err(render_error) => {
                error!(error = %render_error, "error page failed to render");
                (status, message).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(AppError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Upstream(RemoteError::Transport("timed out".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(AppError::Payload("x".into()).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn flickr_not_found_code_becomes_404() {
        let error = AppError::from_remote(
            RemoteError::Status {
                code: 1,
                message: "User not found".into(),
            },
            "person",
        );
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
        assert_eq!(error.to_string(), "person: User not found");

        let error = AppError::from_remote(
            RemoteError::Status {
                code: 105,
                message: "Service currently unavailable".into(),
            },
            "person",
        );
        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
    }
}
