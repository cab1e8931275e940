//! Outcome kinds of an explorer interaction.

use thiserror::Error;

use crate::{RemoteError, ValidationError};

/// Outcome kinds of an explorer interaction that did not produce a result.
///
/// None of these is fatal; each is scoped to the interaction that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExplorerError {
    /// The descriptor could not be fetched; shown as "not found".
    #[error("unknown operation '{operation}': {source}")]
    UnknownOperation {
        operation: String,
        #[source]
        source: RemoteError,
    },

    /// A required field was left empty; shown inline on the form.
    #[error(transparent)]
    ValidationFailed(#[from] ValidationError),

    /// The dispatch call failed; shown with the result view, never retried.
    #[error("call to '{operation}' failed: {source}")]
    RemoteCallFailed {
        operation: String,
        #[source]
        source: RemoteError,
    },

    /// The interaction stopped before anything was submitted.
    #[error("no submission for '{operation}'")]
    NotSubmitted { operation: String },
}
