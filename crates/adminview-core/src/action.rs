//! Row actions
//!
//! Actions always name their target by record id. A row's page position
//! can change under a background refresh; its id cannot.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::screen::Screen;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowAction {
    /// Navigate to the record's detail page
    Detail,
    Confirm,
    Decline,
    Delete,
}

impl RowAction {
    /// Everything except navigation goes through a confirmation dialog
    pub fn requires_confirmation(&self) -> bool {
        !matches!(self, RowAction::Detail)
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            RowAction::Detail => "opened",
            RowAction::Confirm => "confirmed",
            RowAction::Decline => "declined",
            RowAction::Delete => "deleted",
        }
    }
}

impl std::str::FromStr for RowAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "detail" => Ok(RowAction::Detail),
            "confirm" => Ok(RowAction::Confirm),
            "decline" => Ok(RowAction::Decline),
            "delete" => Ok(RowAction::Delete),
            _ => Err(format!("Invalid row action: {}", s)),
        }
    }
}

impl std::fmt::Display for RowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowAction::Detail => write!(f, "detail"),
            RowAction::Confirm => write!(f, "confirm"),
            RowAction::Decline => write!(f, "decline"),
            RowAction::Delete => write!(f, "delete"),
        }
    }
}

/// Whether `action` is offered on one particular record
pub type ActionRule<R> = fn(&R, RowAction) -> bool;

/// A validated request to run `action` on one record of `screen`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub screen: String,
    pub record_id: String,
    pub action: RowAction,
    /// Free-text reason entered in the dialog, e.g. why a store was declined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The target record as served, for backends keyed by another field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<serde_json::Value>,
}

impl ActionRequest {
    pub fn new(screen: impl Into<String>, record_id: impl Into<String>, action: RowAction) -> Self {
        Self {
            screen: screen.into(),
            record_id: record_id.into(),
            action,
            reason: None,
            record: None,
        }
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason.filter(|r| !r.trim().is_empty());
        self
    }

    pub fn with_record(mut self, record: serde_json::Value) -> Self {
        self.record = Some(record);
        self
    }

    pub fn detail_path(&self) -> String {
        format!("/dashboard/{}/{}", self.screen, self.record_id)
    }

    /// A string field of the target record
    pub fn field(&self, name: &str) -> Option<&str> {
        self.record.as_ref()?.get(name)?.as_str()
    }

    /// Id the backend expects: the owning user for store screens, the
    /// record id everywhere else
    pub fn target_id(&self) -> &str {
        let field = self
            .screen
            .parse::<Screen>()
            .map(|screen| screen.target_field())
            .unwrap_or("id");
        self.field(field).unwrap_or(&self.record_id)
    }
}

/// The open confirm/decline/delete dialog of a screen, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingAction {
    request: Option<ActionRequest>,
}

impl PendingAction {
    /// Opening a dialog replaces whatever dialog was open
    pub fn open(&mut self, request: ActionRequest) {
        self.request = Some(request);
    }

    pub fn cancel(&mut self) -> Option<ActionRequest> {
        self.request.take()
    }

    /// Close the dialog and hand back the request to dispatch
    pub fn confirm(&mut self) -> Option<ActionRequest> {
        self.request.take()
    }

    pub fn current(&self) -> Option<&ActionRequest> {
        self.request.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    /// Where the host should navigate next
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// Backend side of row actions
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    async fn dispatch(&self, session: &Session, request: &ActionRequest) -> CoreResult<ActionOutcome>;
}

/// Dispatcher that only records and logs what it was asked to do
#[derive(Debug, Default)]
pub struct LoggingDispatcher {
    history: Mutex<Vec<ActionRequest>>,
}

impl LoggingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests dispatched so far, oldest first
    pub fn history(&self) -> Vec<ActionRequest> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ActionDispatcher for LoggingDispatcher {
    async fn dispatch(&self, session: &Session, request: &ActionRequest) -> CoreResult<ActionOutcome> {
        if request.action == RowAction::Detail {
            return Ok(ActionOutcome {
                success: true,
                message: format!("{} {}", request.screen, request.record_id),
                redirect: Some(request.detail_path()),
            });
        }

        session.bearer()?;

        log::info!(
            "{} {} (target {}) on {} requested by {}{}",
            request.action,
            request.record_id,
            request.target_id(),
            request.screen,
            session.display_name(),
            request
                .reason
                .as_deref()
                .map(|r| format!(", reason: {}", r))
                .unwrap_or_default()
        );
        self.history
            .lock()
            .map_err(|_| CoreError::InternalError {
                message: "dispatcher history poisoned".to_string(),
            })?
            .push(request.clone());

        Ok(ActionOutcome {
            success: true,
            message: format!("{} {}", request.record_id, request.action.past_tense()),
            redirect: None,
        })
    }
}
