//! HTTP host for the admin console
//!
//! Routes are organized into modules:
//! - routes::screens: derived views, view state commands and row actions
//!
//! Everything is JSON; each screen is addressed by its slug.

pub mod error;
pub mod routes;

use adminview_config::Config;
use adminview_core::{ActionDispatcher, RowAction, Screen, ScreenRegistry, ScreenTable, Session};
use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ScreenRegistry>,
    pub dispatcher: Arc<dyn ActionDispatcher>,
    pub session: Session,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::screens::{
        api_cancel_dialog, api_clear_filters, api_clear_selection, api_command, api_confirm_dialog,
        api_next_page, api_open_dialog, api_previous_page, api_record, api_row_action, api_screen,
        api_screen_state, api_select_visible, api_set_filter, api_set_page, api_toggle_column,
        api_toggle_selection, api_toggle_sort,
    };

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/screens", get(api_screens))
        .route("/api/reload", post(api_reload))
        .route("/api/screens/:screen", get(api_screen))
        .route("/api/screens/:screen/state", get(api_screen_state))
        .route("/api/screens/:screen/command", post(api_command))
        .route("/api/screens/:screen/filter", post(api_set_filter).delete(api_clear_filters))
        .route("/api/screens/:screen/sort/:column", post(api_toggle_sort))
        .route("/api/screens/:screen/columns/:column/toggle", post(api_toggle_column))
        .route("/api/screens/:screen/page/next", post(api_next_page))
        .route("/api/screens/:screen/page/previous", post(api_previous_page))
        .route("/api/screens/:screen/page/:index", post(api_set_page))
        .route("/api/screens/:screen/selection", delete(api_clear_selection))
        .route("/api/screens/:screen/selection/visible", post(api_select_visible))
        .route("/api/screens/:screen/selection/:id", post(api_toggle_selection))
        .route("/api/screens/:screen/rows/:id", get(api_record))
        .route("/api/screens/:screen/rows/:id/actions/:action", post(api_row_action))
        .route("/api/screens/:screen/rows/:id/actions/:action/dialog", post(api_open_dialog))
        .route("/api/screens/:screen/dialog", delete(api_cancel_dialog))
        .route("/api/screens/:screen/dialog/confirm", post(api_confirm_dialog))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
struct ScreenSummary {
    slug: &'static str,
    title: &'static str,
    actions: &'static [RowAction],
    total_records: usize,
    version: u64,
}

/// List the registered screens
async fn api_screens(state: State<AppState>) -> Json<serde_json::Value> {
    let mut screens = Vec::new();
    for screen in state.registry.screens() {
        let Some(table) = state.registry.table(screen) else {
            continue;
        };
        let table = table.read().await;
        screens.push(ScreenSummary {
            slug: screen.slug(),
            title: screen.title(),
            actions: screen.allowed_actions(),
            total_records: table.view().total_records,
            version: table.view().version,
        });
    }
    Json(serde_json::json!({ "success": true, "data": screens }))
}

/// Refetch every screen once
async fn api_reload(state: State<AppState>) -> Json<serde_json::Value> {
    let reports = state.registry.refresh_all(&state.session).await;
    let success = reports.iter().all(|r| r.error.is_none());
    Json(serde_json::json!({ "success": success, "data": reports }))
}

/// Start the HTTP server and run until `shutdown` resolves
pub async fn start_server<F>(state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = state.config.bind_address();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting adminview server on http://{}", addr);
    for screen in Screen::ALL {
        log::info!("  - /api/screens/{} ({})", screen.slug(), screen.title());
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}
