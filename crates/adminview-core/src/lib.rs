//! Derived view engine for the admin console's tabular screens
//!
//! Records are filtered, sorted and paginated into a `DerivedView` by pure
//! functions in [`engine`]. [`TableView`] keeps one screen's view state and
//! recomputes on every change; [`ScreenRegistry`] wires the six console
//! screens to their record sources.

pub mod action;
pub mod column;
pub mod engine;
pub mod error;
pub mod models;
pub mod poller;
pub mod record;
pub mod registry;
pub mod screen;
pub mod session;
pub mod source;
pub mod state;
pub mod table;
pub mod value;
pub mod view;

pub use action::{
    ActionDispatcher, ActionOutcome, ActionRequest, ActionRule, LoggingDispatcher, PendingAction, RowAction,
};
pub use column::{BadgeTone, ColumnDescriptor, ColumnKind, ColumnSet};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
pub use poller::{spawn_poller, Feed, PollerHandle, Refresh, SnapshotSink};
pub use record::Record;
pub use registry::{RefreshReport, ScreenOptions, ScreenRegistry, TableRef};
pub use screen::{Screen, ScreenTable, ViewCommand};
pub use session::Session;
pub use source::{JsonFileSource, RecordSource, SourceRef};
pub use state::{SortDirection, SortState, ViewState};
pub use table::TableView;
pub use value::{CellValue, SortKey};
pub use view::{Cell, DerivedView, ViewRow};
