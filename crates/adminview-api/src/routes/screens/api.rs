//! Screen API endpoints - derived view and view state commands
//!
//! Every state-changing endpoint answers with `changed` (whether the
//! command was accepted) and the freshly rendered view.

use adminview_core::{CoreError, ScreenTable, ViewCommand};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::lookup;
use crate::{ApiError, AppState};

type ApiResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct FilterBody {
    pub column: String,
    #[serde(default)]
    pub value: String,
}

/// Unknown column ids in a path or body are a client error here, even
/// though the table itself would ignore them
async fn run(state: &AppState, slug: &str, command: ViewCommand) -> ApiResult {
    let table = lookup(state, slug)?;
    let mut table = table.write().await;
    if let Some(column) = command.column() {
        table.require_column(column)?;
    }
    let changed = table.apply(&command);
    let view = table.render_json()?;
    Ok(Json(serde_json::json!({ "success": true, "changed": changed, "data": view })))
}

/// Current page of a screen with cells and records
pub async fn api_screen(state: State<AppState>, path: Path<String>) -> ApiResult {
    let table = lookup(&state, &path.0)?;
    let view = table.read().await.render_json()?;
    Ok(Json(serde_json::json!({ "success": true, "data": view })))
}

/// Serialized view state of a screen
pub async fn api_screen_state(state: State<AppState>, path: Path<String>) -> ApiResult {
    let table = lookup(&state, &path.0)?;
    let view_state = serde_json::to_value(table.read().await.state()).map_err(CoreError::from)?;
    Ok(Json(serde_json::json!({ "success": true, "data": view_state })))
}

/// Apply any view command sent as JSON
pub async fn api_command(state: State<AppState>, path: Path<String>, command: Json<ViewCommand>) -> ApiResult {
    run(&state, &path.0, command.0).await
}

pub async fn api_set_filter(state: State<AppState>, path: Path<String>, body: Json<FilterBody>) -> ApiResult {
    let Json(FilterBody { column, value }) = body;
    run(&state, &path.0, ViewCommand::SetFilter { column, value }).await
}

pub async fn api_clear_filters(state: State<AppState>, path: Path<String>) -> ApiResult {
    run(&state, &path.0, ViewCommand::ClearFilters).await
}

/// Cycle the sort of one column
pub async fn api_toggle_sort(state: State<AppState>, path: Path<(String, String)>) -> ApiResult {
    let (slug, column) = path.0;
    run(&state, &slug, ViewCommand::ToggleSort { column }).await
}

pub async fn api_toggle_column(state: State<AppState>, path: Path<(String, String)>) -> ApiResult {
    let (slug, column) = path.0;
    run(&state, &slug, ViewCommand::ToggleVisibility { column }).await
}

pub async fn api_set_page(state: State<AppState>, path: Path<(String, usize)>) -> ApiResult {
    let (slug, index) = path.0;
    run(&state, &slug, ViewCommand::SetPage { index }).await
}

pub async fn api_next_page(state: State<AppState>, path: Path<String>) -> ApiResult {
    run(&state, &path.0, ViewCommand::NextPage).await
}

pub async fn api_previous_page(state: State<AppState>, path: Path<String>) -> ApiResult {
    run(&state, &path.0, ViewCommand::PreviousPage).await
}

/// Toggle one row. Unknown ids can only be deselected.
pub async fn api_toggle_selection(state: State<AppState>, path: Path<(String, String)>) -> ApiResult {
    let (slug, id) = path.0;
    let table = lookup(&state, &slug)?;
    let mut table = table.write().await;
    if !table.contains(&id) && !table.state().is_selected(&id) {
        return Err(CoreError::RecordNotFound { id }.into());
    }
    let changed = table.apply(&ViewCommand::ToggleSelection { id });
    let view = table.render_json()?;
    Ok(Json(serde_json::json!({ "success": true, "changed": changed, "data": view })))
}

/// Select every row of the current page
pub async fn api_select_visible(state: State<AppState>, path: Path<String>) -> ApiResult {
    run(&state, &path.0, ViewCommand::SelectAllVisible).await
}

pub async fn api_clear_selection(state: State<AppState>, path: Path<String>) -> ApiResult {
    run(&state, &path.0, ViewCommand::ClearSelection).await
}
