//! View state of one screen instance
//!
//! Created empty when a screen mounts and dropped with it. Every transition
//! returns whether the state actually changed; requests that reference an
//! unknown column or a column without the needed capability are ignored.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::column::ColumnSet;

/// Rows per page when the screen does not configure one
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Column id to filter text
pub type FilterState = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column_id: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl PaginationState {
    /// A zero page size is raised to one
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Filters, sort, hidden columns, selection and pagination
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub filters: FilterState,
    #[serde(default)]
    pub sort: Option<SortState>,
    #[serde(default)]
    pub hidden: BTreeSet<String>,
    #[serde(default)]
    pub selected: BTreeSet<String>,
    #[serde(default)]
    pub pagination: PaginationState,
}

/// Blank filter values count as no filter
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            pagination: PaginationState::new(page_size),
            ..Self::default()
        }
    }

    pub fn filter(&self, column_id: &str) -> Option<&str> {
        self.filters.get(column_id).map(String::as_str)
    }

    /// Set or clear one column filter. An accepted change moves back to page 0.
    pub fn set_filter<R>(&mut self, columns: &ColumnSet<R>, column_id: &str, value: &str) -> bool {
        match columns.get(column_id) {
            Some(column) if column.is_filterable() => {}
            _ => {
                log::debug!("ignoring filter on column '{}'", column_id);
                return false;
            }
        }

        let changed = if is_blank(value) {
            self.filters.remove(column_id).is_some()
        } else if self.filter(column_id) == Some(value) {
            false
        } else {
            self.filters.insert(column_id.to_string(), value.to_string());
            true
        };

        if changed {
            self.pagination.page_index = 0;
        }
        changed
    }

    pub fn clear_filters(&mut self) -> bool {
        if self.filters.is_empty() {
            return false;
        }
        self.filters.clear();
        self.pagination.page_index = 0;
        true
    }

    /// none -> asc -> desc -> none on the same column; another column starts at asc
    pub fn toggle_sort<R>(&mut self, columns: &ColumnSet<R>, column_id: &str) -> bool {
        if !Self::can_sort(columns, column_id) {
            return false;
        }

        self.sort = match self.sort.take() {
            Some(SortState {
                column_id: current,
                direction: SortDirection::Asc,
            }) if current == column_id => Some(SortState {
                column_id: current,
                direction: SortDirection::Desc,
            }),
            Some(SortState {
                column_id: current,
                direction: SortDirection::Desc,
            }) if current == column_id => None,
            _ => Some(SortState {
                column_id: column_id.to_string(),
                direction: SortDirection::Asc,
            }),
        };
        true
    }

    pub fn set_sort<R>(&mut self, columns: &ColumnSet<R>, column_id: &str, direction: SortDirection) -> bool {
        if !Self::can_sort(columns, column_id) {
            return false;
        }
        let next = Some(SortState {
            column_id: column_id.to_string(),
            direction,
        });
        if self.sort == next {
            return false;
        }
        self.sort = next;
        true
    }

    pub fn clear_sort(&mut self) -> bool {
        self.sort.take().is_some()
    }

    fn can_sort<R>(columns: &ColumnSet<R>, column_id: &str) -> bool {
        match columns.get(column_id) {
            Some(column) if column.is_sortable() => true,
            _ => {
                log::debug!("ignoring sort on column '{}'", column_id);
                false
            }
        }
    }

    /// Flip a hideable column between shown and hidden
    pub fn toggle_visibility<R>(&mut self, columns: &ColumnSet<R>, column_id: &str) -> bool {
        match columns.get(column_id) {
            Some(column) if column.is_hideable() => {}
            _ => {
                log::debug!("ignoring visibility toggle on column '{}'", column_id);
                return false;
            }
        }
        if !self.hidden.remove(column_id) {
            self.hidden.insert(column_id.to_string());
        }
        true
    }

    pub fn is_hidden(&self, column_id: &str) -> bool {
        self.hidden.contains(column_id)
    }

    pub fn toggle_selection(&mut self, record_id: &str) -> bool {
        if !self.selected.remove(record_id) {
            self.selected.insert(record_id.to_string());
        }
        true
    }

    pub fn select<'a>(&mut self, record_ids: impl IntoIterator<Item = &'a str>) -> usize {
        record_ids
            .into_iter()
            .filter(|id| self.selected.insert(id.to_string()))
            .count()
    }

    pub fn clear_selection(&mut self) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        self.selected.clear();
        true
    }

    pub fn is_selected(&self, record_id: &str) -> bool {
        self.selected.contains(record_id)
    }

    /// Move to `page_index`; out-of-range requests are rejected
    pub fn set_page(&mut self, page_index: usize, page_count: usize) -> bool {
        if page_index >= page_count || page_index == self.pagination.page_index {
            return false;
        }
        self.pagination.page_index = page_index;
        true
    }

    pub fn next_page(&mut self, page_count: usize) -> bool {
        if self.pagination.page_index + 1 >= page_count {
            log::debug!("already on the last page");
            return false;
        }
        self.pagination.page_index += 1;
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if self.pagination.page_index == 0 {
            log::debug!("already on the first page");
            return false;
        }
        self.pagination.page_index -= 1;
        true
    }
}
