//! Screens of the admin console
//!
//! Each screen shows one record type. `ScreenTable` erases the record type
//! so that a host can drive every screen through the same handle.

use serde::{Deserialize, Serialize};

use crate::action::{ActionRequest, RowAction};
use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use crate::state::{SortDirection, ViewState};
use crate::table::TableView;
use crate::view::DerivedView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Fees,
    HistoryFees,
    Stores,
    StoreRequests,
    Payouts,
    Transactions,
}

impl Screen {
    pub const ALL: [Screen; 6] = [
        Screen::Fees,
        Screen::HistoryFees,
        Screen::Stores,
        Screen::StoreRequests,
        Screen::Payouts,
        Screen::Transactions,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Screen::Fees => "fees",
            Screen::HistoryFees => "history-fees",
            Screen::Stores => "stores",
            Screen::StoreRequests => "store-requests",
            Screen::Payouts => "payouts",
            Screen::Transactions => "transactions",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Fees => "Fees",
            Screen::HistoryFees => "Fee History",
            Screen::Stores => "Stores",
            Screen::StoreRequests => "Store Requests",
            Screen::Payouts => "Payouts",
            Screen::Transactions => "Transactions",
        }
    }

    /// Actions a screen offers at most; an action rule may narrow them per row
    pub fn allowed_actions(&self) -> &'static [RowAction] {
        match self {
            Screen::Fees | Screen::HistoryFees => &[RowAction::Detail, RowAction::Delete],
            Screen::StoreRequests => &[RowAction::Detail, RowAction::Confirm, RowAction::Decline],
            Screen::Payouts => &[RowAction::Detail, RowAction::Confirm],
            Screen::Stores | Screen::Transactions => &[RowAction::Detail],
        }
    }

    pub fn reason_required(&self) -> &'static [RowAction] {
        match self {
            Screen::StoreRequests => &[RowAction::Decline],
            _ => &[],
        }
    }

    /// Record field the backend identifies the target by
    pub fn target_field(&self) -> &'static str {
        match self {
            Screen::Stores | Screen::StoreRequests => "user_id",
            _ => "id",
        }
    }
}

impl std::str::FromStr for Screen {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .iter()
            .copied()
            .find(|screen| screen.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown screen: {}", s))
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// A view state transition, as sent by a host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ViewCommand {
    SetFilter { column: String, value: String },
    ClearFilters,
    ToggleSort { column: String },
    SetSort { column: String, direction: SortDirection },
    ClearSort,
    ToggleVisibility { column: String },
    SetPage { index: usize },
    NextPage,
    PreviousPage,
    ToggleSelection { id: String },
    SelectAllVisible,
    ClearSelection,
}

impl ViewCommand {
    /// Column the command names, if any
    pub fn column(&self) -> Option<&str> {
        match self {
            ViewCommand::SetFilter { column, .. }
            | ViewCommand::ToggleSort { column }
            | ViewCommand::SetSort { column, .. }
            | ViewCommand::ToggleVisibility { column } => Some(column),
            _ => None,
        }
    }
}

impl<R: Record> TableView<R> {
    /// Run one command; returns whether the view changed
    pub fn apply(&mut self, command: &ViewCommand) -> bool {
        match command {
            ViewCommand::SetFilter { column, value } => self.set_filter(column, value),
            ViewCommand::ClearFilters => self.clear_filters(),
            ViewCommand::ToggleSort { column } => self.toggle_sort(column),
            ViewCommand::SetSort { column, direction } => self.set_sort(column, *direction),
            ViewCommand::ClearSort => self.clear_sort(),
            ViewCommand::ToggleVisibility { column } => self.toggle_visibility(column),
            ViewCommand::SetPage { index } => self.set_page(*index),
            ViewCommand::NextPage => self.next_page(),
            ViewCommand::PreviousPage => self.previous_page(),
            ViewCommand::ToggleSelection { id } => self.toggle_selection(id),
            ViewCommand::SelectAllVisible => self.select_all_visible() > 0,
            ViewCommand::ClearSelection => self.clear_selection(),
        }
    }
}

/// Type-erased handle to a screen's table
pub trait ScreenTable: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&mut self, command: &ViewCommand) -> bool;
    fn view(&self) -> &DerivedView;
    fn state(&self) -> &ViewState;
    fn contains(&self, record_id: &str) -> bool;
    fn require_column(&self, column_id: &str) -> CoreResult<()>;
    fn render_json(&self) -> CoreResult<serde_json::Value>;
    fn record_json(&self, record_id: &str) -> CoreResult<serde_json::Value>;
    /// Validated request carrying the target record
    fn request_action(&self, record_id: &str, action: RowAction, reason: Option<String>) -> CoreResult<ActionRequest>;
    fn open_action(&mut self, record_id: &str, action: RowAction) -> CoreResult<ActionRequest>;
    fn pending_action(&self) -> Option<&ActionRequest>;
    fn confirm_pending(&mut self, reason: Option<String>) -> CoreResult<Option<ActionRequest>>;
    fn cancel_pending(&mut self) -> Option<ActionRequest>;
}

impl<R> ScreenTable for TableView<R>
where
    R: Record + Serialize + Send + Sync,
{
    fn name(&self) -> &str {
        TableView::name(self)
    }

    fn apply(&mut self, command: &ViewCommand) -> bool {
        TableView::apply(self, command)
    }

    fn view(&self) -> &DerivedView {
        TableView::view(self)
    }

    fn state(&self) -> &ViewState {
        TableView::state(self)
    }

    fn contains(&self, record_id: &str) -> bool {
        self.record(record_id).is_some()
    }

    fn require_column(&self, column_id: &str) -> CoreResult<()> {
        TableView::require_column(self, column_id)
    }

    fn render_json(&self) -> CoreResult<serde_json::Value> {
        Ok(serde_json::to_value(self.render())?)
    }

    fn record_json(&self, record_id: &str) -> CoreResult<serde_json::Value> {
        let record = self.record(record_id).ok_or_else(|| CoreError::RecordNotFound {
            id: record_id.to_string(),
        })?;
        Ok(serde_json::to_value(record)?)
    }

    fn request_action(&self, record_id: &str, action: RowAction, reason: Option<String>) -> CoreResult<ActionRequest> {
        let request = TableView::request_action(self, record_id, action, reason)?;
        Ok(request.with_record(self.record_json(record_id)?))
    }

    fn open_action(&mut self, record_id: &str, action: RowAction) -> CoreResult<ActionRequest> {
        TableView::open_action(self, record_id, action)
    }

    fn pending_action(&self) -> Option<&ActionRequest> {
        TableView::pending_action(self)
    }

    fn confirm_pending(&mut self, reason: Option<String>) -> CoreResult<Option<ActionRequest>> {
        match TableView::confirm_pending(self, reason)? {
            Some(request) => {
                let record = self.record_json(&request.record_id)?;
                Ok(Some(request.with_record(record)))
            }
            None => Ok(None),
        }
    }

    fn cancel_pending(&mut self) -> Option<ActionRequest> {
        TableView::cancel_pending(self)
    }
}
