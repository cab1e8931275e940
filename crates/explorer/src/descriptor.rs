//! Method Descriptor Fetcher.

use flickrview_types::{ArgumentSpec, MethodDescriptor};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{RemoteEndpoint, RemoteError};

/// Flickr's introspection method.
pub const REFLECTION_METHOD: &str = "flickr.reflection.getMethodInfo";

#[derive(Debug, Deserialize)]
struct MethodInfo {
    #[serde(default)]
    method: Option<MethodSection>,
    #[serde(default)]
    arguments: Option<ArgumentsSection>,
}

#[derive(Debug, Deserialize)]
struct MethodSection {
    #[serde(default)]
    description: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ArgumentsSection {
    #[serde(default)]
    argument: Vec<RawArgument>,
}

#[derive(Debug, Deserialize)]
struct RawArgument {
    name: String,
    #[serde(default)]
    optional: Value,
    #[serde(rename = "_content", default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(rename = "_content", default)]
    content: String,
}

/// Flickr reports `optional` as `0`/`1`, `"0"`/`"1"` or occasionally a bool.
/// A missing flag is read as optional so the form never blocks on it.
fn is_optional(flag: &Value) -> bool {
    match flag {
        Value::Bool(optional) => *optional,
        Value::Number(number) => number.as_i64() != Some(0),
        Value::String(text) => !matches!(text.trim(), "0" | "false"),
        _ => true,
    }
}

/// Fetch the descriptor of `operation` from the endpoint's introspection call.
///
/// The returned descriptor keeps `operation` verbatim and the argument
/// order reported by the remote. An empty name fails without a remote call.
pub async fn fetch_descriptor(endpoint: &dyn RemoteEndpoint, operation: &str) -> Result<MethodDescriptor, RemoteError> {
    if operation.trim().is_empty() {
        return Err(RemoteError::EmptyOperation);
    }
    debug!(%operation, "fetching method descriptor");
    let payload = endpoint.describe(operation).await?;
    parse_method_info(operation, &payload)
}

/// Parse a `flickr.reflection.getMethodInfo` payload into a descriptor.
///
/// Repeated argument names keep their first occurrence.
pub fn parse_method_info(operation: &str, payload: &Value) -> Result<MethodDescriptor, RemoteError> {
    let info = MethodInfo::deserialize(payload).map_err(|error| RemoteError::Malformed(error.to_string()))?;

    let mut arguments: Vec<ArgumentSpec> = Vec::new();
    for raw in info.arguments.map(|section| section.argument).unwrap_or_default() {
        if arguments.iter().any(|existing| existing.name == raw.name) {
            warn!(%operation, argument = %raw.name, "duplicate argument in descriptor ignored");
            continue;
        }
        let required = !is_optional(&raw.optional);
        arguments.push(ArgumentSpec::new(raw.name, raw.content.trim(), required));
    }

    let description = info
        .method
        .and_then(|method| method.description)
        .map(|description| description.content.trim().to_string())
        .filter(|description| !description.is_empty());

    Ok(MethodDescriptor {
        operation_name: operation.to_string(),
        description,
        arguments,
    })
}
