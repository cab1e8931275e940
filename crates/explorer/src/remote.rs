//! The seam between the explorer and the remote API.

use async_trait::async_trait;
use flickrview_api::{ApiError, FlickrClient, qualify_method};
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::REFLECTION_METHOD;

/// Failure reported by a [`RemoteEndpoint`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// No operation name was given.
    #[error("operation name is empty")]
    EmptyOperation,

    /// The remote answered with a non-ok status.
    #[error("{message} (code {code})")]
    Status { code: i64, message: String },

    /// The call never produced a usable answer (network, HTTP, auth setup).
    #[error("{0}")]
    Transport(String),

    /// The remote answered ok but the payload had an unexpected shape.
    #[error("unexpected payload: {0}")]
    Malformed(String),
}

impl From<ApiError> for RemoteError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Remote { code, message } => Self::Status { code, message },
            ApiError::Decode(_) | ApiError::Malformed(_) => Self::Malformed(error.user_message()),
            other => Self::Transport(other.user_message()),
        }
    }
}

/// Remote RPC surface the explorer needs: introspection plus generic dispatch.
///
/// Calls are awaited by the handling request; implementations must not
/// retry or cache.
#[async_trait]
pub trait RemoteEndpoint: Send + Sync {
    /// Return the raw introspection payload for `operation`.
    async fn describe(&self, operation: &str) -> Result<Value, RemoteError>;

    /// Call `operation` with named string arguments and return the raw payload.
    async fn dispatch(&self, operation: &str, arguments: &IndexMap<String, String>) -> Result<Value, RemoteError>;
}

#[async_trait]
impl RemoteEndpoint for FlickrClient {
    async fn describe(&self, operation: &str) -> Result<Value, RemoteError> {
        let mut arguments = IndexMap::new();
        arguments.insert("method_name".to_string(), qualify_method(operation));
        Ok(self.call(REFLECTION_METHOD, &arguments).await?)
    }

    async fn dispatch(&self, operation: &str, arguments: &IndexMap<String, String>) -> Result<Value, RemoteError> {
        Ok(self.call(operation, arguments).await?)
    }
}
