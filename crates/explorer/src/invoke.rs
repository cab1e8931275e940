//! Generic Invoker.

use serde_json::Value;
use tracing::{debug, warn};

use crate::{RemoteEndpoint, RemoteError, SubmittedArguments};

/// Dispatch `operation` with validated arguments.
///
/// Exactly one remote call is made; failures are returned as-is for the
/// caller to render. Results are not cached.
pub async fn invoke(endpoint: &dyn RemoteEndpoint, operation: &str, arguments: &SubmittedArguments) -> Result<Value, RemoteError> {
    debug!(%operation, argument_count = arguments.len(), "invoking remote operation");
    let result = endpoint.dispatch(operation, arguments.as_map()).await;
    if let Err(error) = &result {
        warn!(%operation, %error, "remote operation failed");
    }
    result
}
