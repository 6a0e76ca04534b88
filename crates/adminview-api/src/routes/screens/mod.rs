//! Screen routes - derived views, view state and row actions
//!
//! Every handler resolves `:screen` to a registered table first; an
//! unknown slug is a 404.

pub mod actions;
pub mod api;

use adminview_core::registry::TableRef;
use adminview_core::Screen;

use crate::{ApiError, AppState};

pub use actions::{api_cancel_dialog, api_confirm_dialog, api_open_dialog, api_record, api_row_action};
pub use api::{
    api_clear_filters, api_clear_selection, api_command, api_next_page, api_previous_page, api_screen,
    api_screen_state, api_select_visible, api_set_filter, api_set_page, api_toggle_column,
    api_toggle_selection, api_toggle_sort,
};

/// Resolve a screen slug to its table
pub(crate) fn lookup(state: &AppState, slug: &str) -> Result<TableRef, ApiError> {
    slug.parse::<Screen>()
        .ok()
        .and_then(|screen| state.registry.table(screen))
        .ok_or_else(|| ApiError::not_found(format!("screen {}", slug)))
}
