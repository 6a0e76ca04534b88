//! The derived view handed to rendering code

use serde::Serialize;

use crate::column::{BadgeTone, ColumnKind};
use crate::state::SortState;

/// One displayed row, addressed by its record id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRow {
    pub id: String,
    /// Position within the filtered and sorted sequence, starting at 1
    pub number: usize,
    pub selected: bool,
    /// Index into the snapshot the view was derived from
    #[serde(skip)]
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedView {
    pub rows: Vec<ViewRow>,
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    pub total_filtered: usize,
    pub total_records: usize,
    pub visible_columns: Vec<String>,
    pub sort: Option<SortState>,
    /// Bumped on every recomputation of the owning table
    pub version: u64,
}

impl DerivedView {
    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn row(&self, id: &str) -> Option<&ViewRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Footer text, e.g. "Showing 11 to 20 of 42 row(s)."
    pub fn range_label(&self) -> String {
        let (first, last) = match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => (first.number, last.number),
            _ => (0, 0),
        };
        format!("Showing {} to {} of {} row(s).", first, last, self.total_filtered)
    }
}

/// A rendered cell of a visible column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub column_id: String,
    pub kind: ColumnKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<BadgeTone>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, number: usize) -> ViewRow {
        ViewRow {
            id: id.to_string(),
            number,
            selected: false,
            position: number - 1,
        }
    }

    fn view(rows: Vec<ViewRow>, total_filtered: usize) -> DerivedView {
        DerivedView {
            rows,
            page_index: 1,
            page_size: 2,
            page_count: 2,
            can_go_next: false,
            can_go_previous: true,
            total_filtered,
            total_records: total_filtered,
            visible_columns: vec![],
            sort: None,
            version: 0,
        }
    }

    #[test]
    fn test_range_label() {
        let v = view(vec![row("c", 3)], 3);
        assert_eq!(v.range_label(), "Showing 3 to 3 of 3 row(s).");
        assert_eq!(view(vec![], 0).range_label(), "Showing 0 to 0 of 0 row(s).");
    }

    #[test]
    fn test_row_lookup() {
        let v = view(vec![row("a", 1), row("b", 2)], 2);
        assert_eq!(v.ids(), vec!["a", "b"]);
        assert_eq!(v.row("b").map(|r| r.number), Some(2));
        assert!(v.row("z").is_none());
    }
}
