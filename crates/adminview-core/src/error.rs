//! Error types for adminview-core
//!
//! The engine itself never fails on user input: unknown columns, rejected
//! page moves and stale page indexes are absorbed as no-ops or clamps. The
//! errors below come from snapshot validation, the record sources and the
//! row action boundary.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    RecordNotFound,
    DuplicateRecord,
    DuplicateColumn,
    InvalidColumnReference,
    Unauthorized,
    SourceUnavailable,
    InvalidFormat,
    ActionNotAllowed,
    ReasonRequired,
    IoError,
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::RecordNotFound => write!(f, "RECORD_NOT_FOUND"),
            ErrorCode::DuplicateRecord => write!(f, "DUPLICATE_RECORD"),
            ErrorCode::DuplicateColumn => write!(f, "DUPLICATE_COLUMN"),
            ErrorCode::InvalidColumnReference => write!(f, "INVALID_COLUMN_REFERENCE"),
            ErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            ErrorCode::SourceUnavailable => write!(f, "SOURCE_UNAVAILABLE"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::ActionNotAllowed => write!(f, "ACTION_NOT_ALLOWED"),
            ErrorCode::ReasonRequired => write!(f, "REASON_REQUIRED"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Debug information
    Debug,
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Debug => write!(f, "debug"),
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for adminview-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Record not found: {id}")]
    RecordNotFound { id: String },

    #[error("Duplicate record id in snapshot: {id}")]
    DuplicateRecord { id: String },

    #[error("Duplicate column id: {id}")]
    DuplicateColumn { id: String },

    #[error("Unknown column: {id}")]
    InvalidColumnReference { id: String },

    #[error("Please login first")]
    Unauthorized,

    #[error("Record source unavailable: {path}")]
    SourceUnavailable { path: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Action '{action}' is not available on {screen}")]
    ActionNotAllowed { action: String, screen: String },

    #[error("Action '{action}' on {screen} needs a reason")]
    ReasonRequired { action: String, screen: String },

    #[error("IO error occurred")]
    IoError,

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::RecordNotFound { .. } => ErrorCode::RecordNotFound,
            CoreError::DuplicateRecord { .. } => ErrorCode::DuplicateRecord,
            CoreError::DuplicateColumn { .. } => ErrorCode::DuplicateColumn,
            CoreError::InvalidColumnReference { .. } => ErrorCode::InvalidColumnReference,
            CoreError::Unauthorized => ErrorCode::Unauthorized,
            CoreError::SourceUnavailable { .. } => ErrorCode::SourceUnavailable,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::ActionNotAllowed { .. } => ErrorCode::ActionNotAllowed,
            CoreError::ReasonRequired { .. } => ErrorCode::ReasonRequired,
            CoreError::IoError => ErrorCode::IoError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::RecordNotFound { .. } => ErrorSeverity::Info,
            CoreError::DuplicateRecord { .. } => ErrorSeverity::Error,
            CoreError::DuplicateColumn { .. } => ErrorSeverity::Critical,
            CoreError::InvalidColumnReference { .. } => ErrorSeverity::Debug,
            CoreError::Unauthorized => ErrorSeverity::Warning,
            CoreError::SourceUnavailable { .. } => ErrorSeverity::Error,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
            CoreError::ActionNotAllowed { .. } => ErrorSeverity::Warning,
            CoreError::ReasonRequired { .. } => ErrorSeverity::Info,
            CoreError::IoError => ErrorSeverity::Error,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::RecordNotFound { .. } => {
                details = details
                    .with_suggestion("The record may have been removed by the last refresh.".to_string())
                    .with_suggestion("Reload the screen and pick the row again.".to_string());
            }
            CoreError::DuplicateRecord { id } => {
                details = details.with_detail(serde_json::json!({ "id": id }));
                details = details.with_suggestion(
                    "Every record in one snapshot needs a distinct id.".to_string(),
                );
            }
            CoreError::Unauthorized => {
                details = details.with_suggestion(
                    "Set session.token in the configuration file.".to_string(),
                );
            }
            CoreError::SourceUnavailable { path } => {
                details = details.with_detail(serde_json::json!({ "path": path }));
                details = details.with_suggestion(
                    "Check data.path and the per-screen file names.".to_string(),
                );
            }
            CoreError::InvalidFormat { message } => {
                details = details.with_detail(serde_json::json!({ "decode_message": message }));
                details = details.with_suggestion(
                    "Sources must return {\"success\": true, \"message\": ..., \"data\": [...]}."
                        .to_string(),
                );
            }
            CoreError::ActionNotAllowed { screen, .. } => {
                details = details.with_suggestion(format!(
                    "Use GET /api/screens/{} to list the actions of this screen.",
                    screen
                ));
            }
            CoreError::ReasonRequired { .. } => {
                details = details.with_suggestion("Send {\"reason\": \"...\"} with the request.".to_string());
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(_error: io::Error) -> Self {
        CoreError::IoError
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::InvalidFormat {
            message: error.to_string(),
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Screen the operation ran against
    pub screen: Option<String>,
    /// Record targeted by the operation
    pub record_id: Option<String>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            screen: None,
            record_id: None,
        }
    }

    pub fn with_screen(mut self, screen: impl Into<String>) -> Self {
        self.screen = Some(screen.into());
        self
    }

    pub fn with_record(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Debug | ErrorSeverity::Info => log::debug!(
                target: "adminview::error",
                "[{}] {} - Operation: {} - Screen: {:?} - Record: {:?}",
                error.code(),
                error,
                context.operation,
                context.screen,
                context.record_id
            ),
            ErrorSeverity::Warning => log::warn!(
                target: "adminview::error",
                "[{}] {} - Operation: {} - Screen: {:?} - Record: {:?}",
                error.code(),
                error,
                context.operation,
                context.screen,
                context.record_id
            ),
            ErrorSeverity::Error | ErrorSeverity::Critical => log::error!(
                target: "adminview::error",
                "[{}] {} - Operation: {} - Screen: {:?} - Record: {:?}",
                error.code(),
                error.to_details(),
                context.operation,
                context.screen,
                context.record_id
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "adminview::error",
            "WARNING: {} - Operation: {} - Screen: {:?} - Record: {:?}",
            message,
            context.operation,
            context.screen,
            context.record_id
        );
    }
}

// ==================== Tests ====================
