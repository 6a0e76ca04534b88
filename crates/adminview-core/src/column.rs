//! Column descriptors
//!
//! Each screen declares its columns once. A descriptor says how to read a
//! value from a record and which view operations the column takes part in.
//! The `kind` tag tells the rendering layer what to draw; the engine only
//! looks at the capability flags.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::value::CellValue;

/// Id of the row number column
pub const INDEX_COLUMN: &str = "index";
/// Id of the row actions column
pub const ACTIONS_COLUMN: &str = "actions";

/// Reads one cell from a record
pub type Accessor<R> = Arc<dyn Fn(&R) -> CellValue + Send + Sync>;

/// Maps a badge cell to its tone
pub type ToneFn = fn(&CellValue) -> BadgeTone;

/// What a column renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Row number within the filtered and sorted sequence
    Index,
    Text,
    /// Status-like value drawn as a colored badge
    Badge,
    /// Row action menu
    Action,
}

/// Badge colors used by the status columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Success,
    Danger,
    Info,
    Neutral,
}

pub struct ColumnDescriptor<R> {
    id: String,
    header: String,
    kind: ColumnKind,
    accessor: Option<Accessor<R>>,
    tone: Option<ToneFn>,
    sortable: bool,
    hideable: bool,
    filterable: bool,
}

impl<R> ColumnDescriptor<R> {
    /// Plain data column: sortable, hideable and filterable
    pub fn text<F>(id: impl Into<String>, header: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            header: header.into(),
            kind: ColumnKind::Text,
            accessor: Some(Arc::new(accessor)),
            tone: None,
            sortable: true,
            hideable: true,
            filterable: true,
        }
    }

    /// Data column rendered as a badge
    pub fn badge<F>(id: impl Into<String>, header: impl Into<String>, accessor: F, tone: ToneFn) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        Self {
            kind: ColumnKind::Badge,
            tone: Some(tone),
            ..Self::text(id, header, accessor)
        }
    }

    /// The `No` column. Never sorted, filtered or hidden.
    pub fn index() -> Self {
        Self::reserved(INDEX_COLUMN, "No", ColumnKind::Index)
    }

    /// The row actions slot. Never sorted, filtered or hidden.
    pub fn actions() -> Self {
        Self::reserved(ACTIONS_COLUMN, "", ColumnKind::Action)
    }

    fn reserved(id: &str, header: &str, kind: ColumnKind) -> Self {
        Self {
            id: id.to_string(),
            header: header.to_string(),
            kind,
            accessor: None,
            tone: None,
            sortable: false,
            hideable: false,
            filterable: false,
        }
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Keep the column on screen permanently
    pub fn pinned(mut self) -> Self {
        self.hideable = false;
        self
    }

    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_hideable(&self) -> bool {
        self.hideable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    /// Read this column's value. Reserved columns have no data and yield `Empty`.
    pub fn value(&self, record: &R) -> CellValue {
        match &self.accessor {
            Some(accessor) => accessor(record),
            None => CellValue::Empty,
        }
    }

    pub fn tone(&self, value: &CellValue) -> Option<BadgeTone> {
        self.tone.map(|tone| tone(value))
    }
}

impl<R> Clone for ColumnDescriptor<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            kind: self.kind,
            accessor: self.accessor.clone(),
            tone: self.tone,
            sortable: self.sortable,
            hideable: self.hideable,
            filterable: self.filterable,
        }
    }
}

impl<R> std::fmt::Debug for ColumnDescriptor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("sortable", &self.sortable)
            .field("hideable", &self.hideable)
            .field("filterable", &self.filterable)
            .finish()
    }
}

/// The ordered, id-unique column list of one screen
pub struct ColumnSet<R> {
    columns: Vec<ColumnDescriptor<R>>,
}

impl<R> ColumnSet<R> {
    pub fn new(columns: Vec<ColumnDescriptor<R>>) -> CoreResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.id.as_str()) {
                return Err(CoreError::DuplicateColumn {
                    id: column.id.clone(),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDescriptor<R>> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Like [`ColumnSet::get`], for callers that want the miss reported
    pub fn require(&self, id: &str) -> CoreResult<&ColumnDescriptor<R>> {
        self.get(id).ok_or_else(|| CoreError::InvalidColumnReference { id: id.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor<R>> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<R> Clone for ColumnSet<R> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
        }
    }
}

impl<R> std::fmt::Debug for ColumnSet<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.columns.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        name: String,
        status: String,
    }

    fn status_tone(value: &CellValue) -> BadgeTone {
        match value.to_string().as_str() {
            "OK" => BadgeTone::Success,
            _ => BadgeTone::Neutral,
        }
    }

    fn columns() -> Vec<ColumnDescriptor<Row>> {
        vec![
            ColumnDescriptor::index(),
            ColumnDescriptor::text("Name", "Name", |r: &Row| CellValue::text(&r.name)),
            ColumnDescriptor::badge("Status", "Status", |r: &Row| CellValue::text(&r.status), status_tone),
            ColumnDescriptor::actions(),
        ]
    }

    #[test]
    fn test_reserved_columns_have_no_capabilities() {
        let set = ColumnSet::new(columns()).unwrap();
        for id in [INDEX_COLUMN, ACTIONS_COLUMN] {
            let column = set.get(id).unwrap();
            assert!(!column.is_sortable());
            assert!(!column.is_hideable());
            assert!(!column.is_filterable());
        }
        assert_eq!(set.get(INDEX_COLUMN).unwrap().header(), "No");
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut cols = columns();
        cols.push(ColumnDescriptor::text("Name", "Again", |r: &Row| CellValue::text(&r.name)));
        let err = ColumnSet::new(cols).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateColumn { id } if id == "Name"));
    }

    #[test]
    fn test_badge_tone_and_value() {
        let set = ColumnSet::new(columns()).unwrap();
        let row = Row {
            name: "a".to_string(),
            status: "OK".to_string(),
        };
        let status = set.get("Status").unwrap();
        let value = status.value(&row);
        assert_eq!(status.kind(), ColumnKind::Badge);
        assert_eq!(status.tone(&value), Some(BadgeTone::Success));
        assert_eq!(set.get("Name").unwrap().tone(&value), None);
        assert!(set.get(ACTIONS_COLUMN).unwrap().value(&row).is_empty());
    }

    #[test]
    fn test_builder_flags() {
        let column = ColumnDescriptor::text("Id", "Id", |r: &Row| CellValue::text(&r.name))
            .pinned()
            .not_sortable();
        assert!(!column.is_hideable());
        assert!(!column.is_sortable());
        assert!(column.is_filterable());
    }

    #[test]
    fn test_require_reports_unknown_column() {
        let set = ColumnSet::new(columns()).unwrap();
        assert!(set.require("Name").is_ok());
        assert!(matches!(
            set.require("Missing"),
            Err(CoreError::InvalidColumnReference { .. })
        ));
    }
}
