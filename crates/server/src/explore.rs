//! `/explore/{method}`: the reflective form for any Flickr method.

use std::collections::HashMap;

use axum::Form as FormBody;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use flickrview_explorer::{ExplorerError, ExplorerState, ValidationError};
use flickrview_types::Form;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{AppError, AppState, templates};

#[derive(Debug, Serialize)]
struct FieldView<'a> {
    name: &'a str,
    help_text: &'a str,
    required: bool,
    value: Option<&'a str>,
    error: Option<&'static str>,
}

fn field_views<'a>(form: &'a Form, errors: Option<&ValidationError>) -> Vec<FieldView<'a>> {
    form.fields
        .iter()
        .map(|field| FieldView {
            name: &field.name,
            help_text: &field.help_text,
            required: field.required,
            value: field.value.as_deref(),
            error: errors.and_then(|errors| errors.field_error(&field.name)),
        })
        .collect()
}

fn render_form(
    form: &Form,
    errors: Option<&ValidationError>,
    result: Option<&Value>,
    failure: Option<String>,
) -> Result<Html<String>, AppError> {
    let result = result
        .map(serde_json::to_string_pretty)
        .transpose()
        .map_err(|e| AppError::Payload(e.to_string()))?;
    let page = templates::render(
        "explore.html",
        &json!({
            "form": form,
            "fields": field_views(form, errors),
            "result": result,
            "failure": failure,
        }),
    )?;
    Ok(Html(page))
}

/// Turn a finished interaction into a page and its status.
pub fn respond(state: ExplorerState) -> Result<(StatusCode, Html<String>), AppError> {
    match state {
        ExplorerState::AwaitingSubmission { form, errors } => {
            Ok((StatusCode::OK, render_form(&form, errors.as_ref(), None, None)?))
        }
        ExplorerState::ResultReady { form, result, .. } => {
            Ok((StatusCode::OK, render_form(&form, None, Some(&result), None)?))
        }
        ExplorerState::Failed { form, error, .. } => {
            let failure = ExplorerError::RemoteCallFailed {
                operation: form.operation.clone(),
                source: error,
            };
            Ok((
                StatusCode::BAD_GATEWAY,
                render_form(&form, None, None, Some(failure.to_string()))?,
            ))
        }
        ExplorerState::NotFound { operation, error } => {
            Err(AppError::NotFound(ExplorerError::UnknownOperation { operation, source: error }.to_string()))
        }
        other => Err(AppError::Internal(format!("explorer stopped in state {}", other.name()))),
    }
}

pub async fn show(
    State(state): State<AppState>,
    Path(method): Path<String>,
) -> Result<(StatusCode, Html<String>), AppError> {
    respond(state.explorer.show(&method).await)
}

pub async fn submit(
    State(state): State<AppState>,
    Path(method): Path<String>,
    FormBody(input): FormBody<HashMap<String, String>>,
) -> Result<(StatusCode, Html<String>), AppError> {
    respond(state.explorer.submit(&method, &input).await)
}
