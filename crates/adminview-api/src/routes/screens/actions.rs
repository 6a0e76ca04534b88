//! Row action endpoints
//!
//! Actions name their record by id. The table lock is released before the
//! dispatcher runs, so a slow backend call never blocks view updates.

use adminview_core::error::{DefaultErrorLogger, ErrorContext, ErrorLogger};
use adminview_core::{ActionOutcome, ActionRequest, RowAction, ScreenTable};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::lookup;
use crate::{ApiError, AppState};

type ApiResult = Result<Json<Value>, ApiError>;

/// Optional body of action and dialog confirmation requests
#[derive(Debug, Default, Deserialize)]
pub struct ReasonBody {
    #[serde(default)]
    pub reason: Option<String>,
}

fn parse_action(action: &str) -> Result<RowAction, ApiError> {
    action.parse::<RowAction>().map_err(ApiError::bad_request)
}

fn reason(body: Option<Json<ReasonBody>>) -> Option<String> {
    body.and_then(|Json(body)| body.reason)
}

async fn dispatch(state: &AppState, request: &ActionRequest) -> ApiResult {
    let outcome: ActionOutcome = state
        .dispatcher
        .dispatch(&state.session, request)
        .await
        .map_err(|e| {
            let context = ErrorContext::new(format!("dispatch {}", request.action))
                .with_screen(request.screen.as_str())
                .with_record(request.record_id.as_str());
            DefaultErrorLogger.log_error(&e, &context);
            e
        })?;
    Ok(Json(serde_json::json!({
        "success": outcome.success,
        "message": outcome.message,
        "data": outcome,
    })))
}

/// One record of a screen's current snapshot
pub async fn api_record(state: State<AppState>, path: Path<(String, String)>) -> ApiResult {
    let (slug, id) = path.0;
    let table = lookup(&state, &slug)?;
    let record = table.read().await.record_json(&id)?;
    Ok(Json(serde_json::json!({ "success": true, "data": record })))
}

/// Validate and dispatch an action right away
pub async fn api_row_action(
    state: State<AppState>,
    path: Path<(String, String, String)>,
    body: Option<Json<ReasonBody>>,
) -> ApiResult {
    let (slug, id, action) = path.0;
    let action = parse_action(&action)?;
    let table = lookup(&state, &slug)?;
    let request = table.read().await.request_action(&id, action, reason(body))?;
    dispatch(&state, &request).await
}

/// Open the confirmation dialog for an action
pub async fn api_open_dialog(state: State<AppState>, path: Path<(String, String, String)>) -> ApiResult {
    let (slug, id, action) = path.0;
    let action = parse_action(&action)?;
    let table = lookup(&state, &slug)?;
    let mut table = table.write().await;
    let request = table.open_action(&id, action)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": request,
        "pending": table.pending_action(),
    })))
}

/// Confirm the open dialog and dispatch its action
pub async fn api_confirm_dialog(
    state: State<AppState>,
    path: Path<String>,
    body: Option<Json<ReasonBody>>,
) -> ApiResult {
    let table = lookup(&state, &path.0)?;
    let request = table.write().await.confirm_pending(reason(body))?;
    match request {
        Some(request) => dispatch(&state, &request).await,
        None => Err(ApiError::bad_request(format!("no pending action on {}", path.0))),
    }
}

pub async fn api_cancel_dialog(state: State<AppState>, path: Path<String>) -> ApiResult {
    let table = lookup(&state, &path.0)?;
    let cancelled = table.write().await.cancel_pending();
    Ok(Json(serde_json::json!({ "success": true, "data": cancelled })))
}
