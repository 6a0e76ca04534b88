//! Record sources
//!
//! A source owns fetching. The engine only ever sees the snapshot it hands
//! back.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::session::Session;

/// Shared handle to a record source
pub type SourceRef<R> = Arc<dyn RecordSource<R>>;

#[async_trait]
pub trait RecordSource<R>: Send + Sync {
    /// Fetch a complete snapshot
    async fn fetch(&self, session: &Session) -> CoreResult<Vec<R>>;

    /// Human readable origin, used in logs
    fn describe(&self) -> String;
}

/// Response envelope of the admin backend: `{ success, message, data }`
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

fn default_success() -> bool {
    true
}

/// Decode an envelope and unwrap its `data` list.
///
/// `success: false` turns into `InvalidFormat` carrying the backend
/// message. A missing `data` field is an empty collection.
pub fn decode_envelope<R: DeserializeOwned>(body: &str) -> CoreResult<Vec<R>> {
    let envelope: ApiEnvelope<Vec<R>> = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(CoreError::InvalidFormat {
            message: envelope
                .message
                .unwrap_or_else(|| "request was not successful".to_string()),
        });
    }
    Ok(envelope.data.unwrap_or_default())
}

/// Reads an envelope from a JSON file on every fetch
pub struct JsonFileSource<R> {
    path: PathBuf,
    require_session: bool,
    _record: PhantomData<fn() -> R>,
}

impl<R> JsonFileSource<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            require_session: true,
            _record: PhantomData,
        }
    }

    /// Skip the session check, for fixtures that stand in for public data
    pub fn without_session(mut self) -> Self {
        self.require_session = false;
        self
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl<R> RecordSource<R> for JsonFileSource<R>
where
    R: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, session: &Session) -> CoreResult<Vec<R>> {
        if self.require_session {
            session.bearer()?;
        }

        let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            log::debug!("failed to read {}: {}", self.path.display(), e);
            CoreError::SourceUnavailable {
                path: self.path.display().to_string(),
            }
        })?;

        decode_envelope(&body)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
