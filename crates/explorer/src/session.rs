//! Explorer state machine.
//!
//! ```text
//! AwaitingDescriptor ──fetch ok──▶ DescriptorReady ──GET──▶ AwaitingSubmission
//!        │                              │
//!        └──fetch failed──▶ NotFound    └──POST──▶ validate ──invalid──▶ AwaitingSubmission (with errors)
//!                                                     │
//!                                                   valid
//!                                                     ▼
//!                                                 Invoking ──▶ ResultReady | Failed
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use flickrview_types::Form;
use serde_json::Value;
use tracing::trace;

use crate::{
    ExplorerError, RemoteEndpoint, RemoteError, SubmittedArguments, ValidationError, build_form, fetch_descriptor, invoke,
    prefill, validate,
};

/// States of a single explorer interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerState {
    AwaitingDescriptor {
        operation: String,
    },
    DescriptorReady {
        form: Form,
    },
    /// Form ready for input; `errors` is set when a submission was rejected.
    AwaitingSubmission {
        form: Form,
        errors: Option<ValidationError>,
    },
    Invoking {
        form: Form,
        arguments: SubmittedArguments,
    },
    ResultReady {
        form: Form,
        arguments: SubmittedArguments,
        result: Value,
    },
    Failed {
        form: Form,
        arguments: SubmittedArguments,
        error: RemoteError,
    },
    /// The descriptor fetch failed; no form exists.
    NotFound {
        operation: String,
        error: RemoteError,
    },
}

impl ExplorerState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AwaitingDescriptor { .. } => "awaiting_descriptor",
            Self::DescriptorReady { .. } => "descriptor_ready",
            Self::AwaitingSubmission { .. } => "awaiting_submission",
            Self::Invoking { .. } => "invoking",
            Self::ResultReady { .. } => "result_ready",
            Self::Failed { .. } => "failed",
            Self::NotFound { .. } => "not_found",
        }
    }

    /// Whether the interaction has finished for this request.
    ///
    /// `AwaitingSubmission` ends a request too, but the interaction resumes
    /// with the next submission.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ResultReady { .. } | Self::Failed { .. } | Self::NotFound { .. })
    }

    /// The form, in every state that has one.
    pub fn form(&self) -> Option<&Form> {
        match self {
            Self::AwaitingDescriptor { .. } | Self::NotFound { .. } => None,
            Self::DescriptorReady { form }
            | Self::AwaitingSubmission { form, .. }
            | Self::Invoking { form, .. }
            | Self::ResultReady { form, .. }
            | Self::Failed { form, .. } => Some(form),
        }
    }

    /// Collapse the state into the invocation result or the error kind that
    /// stopped it.
    pub fn into_result(self) -> Result<Value, ExplorerError> {
        match self {
            Self::ResultReady { result, .. } => Ok(result),
            Self::Failed { form, error, .. } => Err(ExplorerError::RemoteCallFailed {
                operation: form.operation,
                source: error,
            }),
            Self::NotFound { operation, error } => Err(ExplorerError::UnknownOperation { operation, source: error }),
            Self::AwaitingSubmission {
                errors: Some(errors), ..
            } => Err(ExplorerError::ValidationFailed(errors)),
            Self::AwaitingDescriptor { operation } => Err(ExplorerError::NotSubmitted { operation }),
            Self::DescriptorReady { form } | Self::AwaitingSubmission { form, .. } | Self::Invoking { form, .. } => {
                Err(ExplorerError::NotSubmitted { operation: form.operation })
            }
        }
    }
}

/// Drives explorer interactions against a remote endpoint.
///
/// Holds no per-interaction state; each call owns its descriptor, form and
/// arguments and drops them when it returns.
#[derive(Clone)]
pub struct Explorer {
    endpoint: Arc<dyn RemoteEndpoint>,
}

impl Explorer {
    pub fn new(endpoint: Arc<dyn RemoteEndpoint>) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &Arc<dyn RemoteEndpoint> {
        &self.endpoint
    }

    /// GET: fetch the descriptor and present an empty form.
    pub async fn show(&self, operation: &str) -> ExplorerState {
        match self.load(operation).await {
            ExplorerState::DescriptorReady { form } => step(ExplorerState::AwaitingSubmission { form, errors: None }),
            other => other,
        }
    }

    /// POST: fetch the descriptor, validate `raw_input` and invoke on success.
    ///
    /// A rejected submission never reaches the remote dispatch.
    pub async fn submit(&self, operation: &str, raw_input: &HashMap<String, String>) -> ExplorerState {
        let form = match self.load(operation).await {
            ExplorerState::DescriptorReady { form } => prefill(&form, raw_input),
            other => return other,
        };

        let arguments = match validate(&form, raw_input) {
            Ok(arguments) => arguments,
            Err(errors) => {
                return step(ExplorerState::AwaitingSubmission {
                    form,
                    errors: Some(errors),
                });
            }
        };

        let (form, arguments) = match step(ExplorerState::Invoking { form, arguments }) {
            ExplorerState::Invoking { form, arguments } => (form, arguments),
            other => return other,
        };

        let next = match invoke(self.endpoint.as_ref(), &form.operation, &arguments).await {
            Ok(result) => ExplorerState::ResultReady { form, arguments, result },
            Err(error) => ExplorerState::Failed { form, arguments, error },
        };
        step(next)
    }

    async fn load(&self, operation: &str) -> ExplorerState {
        step(ExplorerState::AwaitingDescriptor {
            operation: operation.to_string(),
        });
        let next = match fetch_descriptor(self.endpoint.as_ref(), operation).await {
            Ok(descriptor) => ExplorerState::DescriptorReady {
                form: build_form(&descriptor),
            },
            Err(error) => ExplorerState::NotFound {
                operation: operation.to_string(),
                error,
            },
        };
        step(next)
    }
}

fn step(state: ExplorerState) -> ExplorerState {
    trace!(state = state.name(), "explorer transition");
    state
}
