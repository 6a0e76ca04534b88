//! Stateful table view of one screen
//!
//! Owns the current snapshot, the column set and the view state, and keeps
//! the derived view in step with them. Every accepted setter recomputes
//! before returning and bumps the version.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::action::{ActionRequest, ActionRule, PendingAction, RowAction};
use crate::column::{ColumnKind, ColumnSet};
use crate::engine;
use crate::error::{CoreError, CoreResult};
use crate::record::{index_by_id, Record};
use crate::state::{SortDirection, ViewState};
use crate::view::{Cell, DerivedView, ViewRow};

pub struct TableView<R> {
    name: String,
    records: Arc<[R]>,
    positions: HashMap<String, usize>,
    columns: Arc<ColumnSet<R>>,
    state: ViewState,
    view: DerivedView,
    version: u64,
    actions: Vec<RowAction>,
    rule: Option<ActionRule<R>>,
    reason_required: Vec<RowAction>,
    pending: PendingAction,
}

/// Column header as rendering code needs it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnHeader {
    pub id: String,
    pub header: String,
    pub kind: ColumnKind,
    pub sortable: bool,
    pub hideable: bool,
    pub filterable: bool,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorted: Option<SortDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenderedRow<'a, R> {
    #[serde(flatten)]
    pub row: &'a ViewRow,
    pub cells: Vec<Cell>,
    /// Actions offered on this row
    pub actions: Vec<RowAction>,
    pub record: &'a R,
}

/// Everything a host needs to draw the current page
#[derive(Debug, Serialize)]
pub struct RenderedView<'a, R> {
    pub name: &'a str,
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<RenderedRow<'a, R>>,
    pub page_index: usize,
    pub page_count: usize,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    pub total_filtered: usize,
    pub total_records: usize,
    pub selected_count: usize,
    pub range_label: String,
    pub actions: &'a [RowAction],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<&'a ActionRequest>,
    pub version: u64,
}

impl<R: Record> TableView<R> {
    /// An empty table; records arrive through `replace_records`
    pub fn new(name: impl Into<String>, columns: Arc<ColumnSet<R>>, page_size: usize) -> Self {
        let records: Arc<[R]> = Arc::from(Vec::new());
        let state = ViewState::new(page_size);
        let view = engine::derive(&records, &columns, &state);
        Self {
            name: name.into(),
            records,
            positions: HashMap::new(),
            columns,
            state,
            view,
            version: 0,
            actions: Vec::new(),
            rule: None,
            reason_required: Vec::new(),
            pending: PendingAction::default(),
        }
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = RowAction>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }

    /// Narrow the screen's actions per record
    pub fn with_action_rule(mut self, rule: ActionRule<R>) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Actions that can only be dispatched with a non-blank reason
    pub fn with_reason_required(mut self, actions: impl IntoIterator<Item = RowAction>) -> Self {
        self.reason_required = actions.into_iter().collect();
        self
    }

    pub fn with_records(mut self, records: Vec<R>) -> CoreResult<Self> {
        self.replace_records(records)?;
        Ok(self)
    }

    fn recompute(&mut self) {
        let mut view = engine::derive(&self.records, &self.columns, &self.state);
        self.state.pagination.page_index = view.page_index;
        self.version += 1;
        view.version = self.version;
        self.view = view;
    }

    fn recompute_if(&mut self, changed: bool) -> bool {
        if changed {
            self.recompute();
        }
        changed
    }

    // ---- snapshot ----

    /// Swap in a fresh snapshot. Duplicate ids reject the whole snapshot
    /// and leave the current one in place.
    pub fn replace_records(&mut self, records: Vec<R>) -> CoreResult<()> {
        let positions = index_by_id(&records)?;
        log::info!(
            "{}: replacing {} record(s) with {}",
            self.name,
            self.records.len(),
            records.len()
        );
        self.records = Arc::from(records);
        self.positions = positions;
        self.recompute();
        Ok(())
    }

    // ---- setters ----

    pub fn set_filter(&mut self, column_id: &str, value: &str) -> bool {
        let changed = self.state.set_filter(&self.columns, column_id, value);
        self.recompute_if(changed)
    }

    pub fn clear_filters(&mut self) -> bool {
        let changed = self.state.clear_filters();
        self.recompute_if(changed)
    }

    pub fn toggle_sort(&mut self, column_id: &str) -> bool {
        let changed = self.state.toggle_sort(&self.columns, column_id);
        self.recompute_if(changed)
    }

    pub fn set_sort(&mut self, column_id: &str, direction: SortDirection) -> bool {
        let changed = self.state.set_sort(&self.columns, column_id, direction);
        self.recompute_if(changed)
    }

    pub fn clear_sort(&mut self) -> bool {
        let changed = self.state.clear_sort();
        self.recompute_if(changed)
    }

    pub fn toggle_visibility(&mut self, column_id: &str) -> bool {
        let changed = self.state.toggle_visibility(&self.columns, column_id);
        self.recompute_if(changed)
    }

    pub fn set_page(&mut self, page_index: usize) -> bool {
        let changed = self.state.set_page(page_index, self.view.page_count);
        self.recompute_if(changed)
    }

    pub fn next_page(&mut self) -> bool {
        let changed = self.state.next_page(self.view.page_count);
        self.recompute_if(changed)
    }

    pub fn previous_page(&mut self) -> bool {
        let changed = self.state.previous_page();
        self.recompute_if(changed)
    }

    /// Ids need not be in the snapshot; unknown ones stay inert
    pub fn toggle_selection(&mut self, record_id: &str) -> bool {
        let changed = self.state.toggle_selection(record_id);
        self.recompute_if(changed)
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.state.clear_selection();
        self.recompute_if(changed)
    }

    /// Select the rows of the current page only. Returns how many were added.
    pub fn select_all_visible(&mut self) -> usize {
        let added = self
            .state
            .select(self.view.rows.iter().map(|row| row.id.as_str()));
        self.recompute_if(added > 0);
        added
    }

    // ---- queries ----

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn view(&self) -> &DerivedView {
        &self.view
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn columns(&self) -> &ColumnSet<R> {
        &self.columns
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn actions(&self) -> &[RowAction] {
        &self.actions
    }

    pub fn record(&self, record_id: &str) -> Option<&R> {
        self.positions.get(record_id).map(|&p| &self.records[p])
    }

    /// The screen's actions that `record` currently offers
    pub fn available_actions(&self, record: &R) -> Vec<RowAction> {
        self.actions
            .iter()
            .copied()
            .filter(|&action| self.rule.map_or(true, |rule| rule(record, action)))
            .collect()
    }

    /// Report an unknown column id instead of ignoring it
    pub fn require_column(&self, column_id: &str) -> CoreResult<()> {
        self.columns.require(column_id).map(|_| ())
    }

    /// Selected records present in the snapshot, in snapshot order
    pub fn selected_records(&self) -> Vec<&R> {
        self.records
            .iter()
            .filter(|r| self.state.is_selected(r.id()))
            .collect()
    }

    pub fn visible_columns(&self) -> &[String] {
        &self.view.visible_columns
    }

    pub fn headers(&self) -> Vec<ColumnHeader> {
        let sort = self.state.sort.as_ref();
        self.columns
            .iter()
            .map(|c| ColumnHeader {
                id: c.id().to_string(),
                header: c.header().to_string(),
                kind: c.kind(),
                sortable: c.is_sortable(),
                hideable: c.is_hideable(),
                filterable: c.is_filterable(),
                hidden: self.state.is_hidden(c.id()),
                sorted: sort.filter(|s| s.column_id == c.id()).map(|s| s.direction),
                filter: self.state.filter(c.id()).map(str::to_string),
            })
            .collect()
    }

    /// Cells of the visible columns for one row of the current view
    pub fn cells(&self, row: &ViewRow) -> Vec<Cell> {
        let Some(record) = self.records.get(row.position) else {
            return Vec::new();
        };
        self.columns
            .iter()
            .filter(|c| !self.state.is_hidden(c.id()))
            .map(|c| {
                let value = c.value(record);
                let text = match c.kind() {
                    ColumnKind::Index => row.number.to_string(),
                    ColumnKind::Action => String::new(),
                    ColumnKind::Text | ColumnKind::Badge => value.to_string(),
                };
                Cell {
                    column_id: c.id().to_string(),
                    kind: c.kind(),
                    text,
                    tone: c.tone(&value),
                }
            })
            .collect()
    }

    pub fn render(&self) -> RenderedView<'_, R> {
        let rows = self
            .view
            .rows
            .iter()
            .filter_map(|row| {
                self.records.get(row.position).map(|record| RenderedRow {
                    row,
                    cells: self.cells(row),
                    actions: self.available_actions(record),
                    record,
                })
            })
            .collect();

        RenderedView {
            name: &self.name,
            columns: self.headers(),
            rows,
            page_index: self.view.page_index,
            page_count: self.view.page_count,
            can_go_next: self.view.can_go_next,
            can_go_previous: self.view.can_go_previous,
            total_filtered: self.view.total_filtered,
            total_records: self.view.total_records,
            selected_count: self.selected_records().len(),
            range_label: self.view.range_label(),
            actions: &self.actions,
            pending: self.pending.current(),
            version: self.version,
        }
    }

    // ---- row actions ----

    /// Check `action` against the screen, `record_id` against the current
    /// snapshot and the record against the action rule
    fn validate(&self, record_id: &str, action: RowAction) -> CoreResult<&R> {
        if !self.actions.contains(&action) {
            return Err(CoreError::ActionNotAllowed {
                action: action.to_string(),
                screen: self.name.clone(),
            });
        }
        let record = self.record(record_id).ok_or_else(|| CoreError::RecordNotFound {
            id: record_id.to_string(),
        })?;
        if self.rule.is_some_and(|rule| !rule(record, action)) {
            return Err(CoreError::ActionNotAllowed {
                action: action.to_string(),
                screen: self.name.clone(),
            });
        }
        Ok(record)
    }

    /// Validate a request ready for dispatch. Actions listed as needing a
    /// reason fail without one.
    pub fn request_action(
        &self,
        record_id: &str,
        action: RowAction,
        reason: Option<String>,
    ) -> CoreResult<ActionRequest> {
        self.validate(record_id, action)?;
        let request = ActionRequest::new(self.name.as_str(), record_id, action).with_reason(reason);
        if request.reason.is_none() && self.reason_required.contains(&action) {
            return Err(CoreError::ReasonRequired {
                action: action.to_string(),
                screen: self.name.clone(),
            });
        }
        Ok(request)
    }

    /// Open the confirmation dialog for an action. The reason, if one is
    /// needed, comes with the confirmation.
    pub fn open_action(&mut self, record_id: &str, action: RowAction) -> CoreResult<ActionRequest> {
        self.validate(record_id, action)?;
        let request = ActionRequest::new(self.name.as_str(), record_id, action);
        if action.requires_confirmation() {
            self.pending.open(request.clone());
        }
        Ok(request)
    }

    pub fn pending_action(&self) -> Option<&ActionRequest> {
        self.pending.current()
    }

    /// Close the dialog and re-validate its request, since a refresh may
    /// have dropped the record while the dialog was open. A missing reason
    /// leaves the dialog open.
    pub fn confirm_pending(&mut self, reason: Option<String>) -> CoreResult<Option<ActionRequest>> {
        let Some(pending) = self.pending.current() else {
            return Ok(None);
        };
        let (record_id, action) = (pending.record_id.clone(), pending.action);
        match self.request_action(&record_id, action, reason) {
            Err(e @ CoreError::ReasonRequired { .. }) => Err(e),
            result => {
                self.pending.confirm();
                result.map(Some)
            }
        }
    }

    pub fn cancel_pending(&mut self) -> Option<ActionRequest> {
        self.pending.cancel()
    }
}

impl<R> std::fmt::Debug for TableView<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableView")
            .field("name", &self.name)
            .field("records", &self.records.len())
            .field("state", &self.state)
            .field("version", &self.version)
            .finish()
    }
}
