//! Background refresh
//!
//! A poller periodically refetches one screen's records and swaps the
//! snapshot into its table. It stops at the next await point after
//! `PollerHandle::shutdown`.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::record::Record;
use crate::session::Session;
use crate::source::SourceRef;
use crate::table::TableView;

/// Receives complete replacement snapshots
#[async_trait]
pub trait SnapshotSink<R>: Send + Sync {
    async fn replace(&self, records: Vec<R>) -> CoreResult<()>;
}

#[async_trait]
impl<R> SnapshotSink<R> for RwLock<TableView<R>>
where
    R: Record + Send + Sync + 'static,
{
    async fn replace(&self, records: Vec<R>) -> CoreResult<()> {
        self.write().await.replace_records(records)
    }
}

/// Something that can refetch itself once
#[async_trait]
pub trait Refresh: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch and install a fresh snapshot, returning its size
    async fn refresh(&self, session: &Session) -> CoreResult<usize>;
}

/// A source wired to the sink it feeds
pub struct Feed<R> {
    name: String,
    source: SourceRef<R>,
    sink: Arc<dyn SnapshotSink<R>>,
    keep: Option<fn(&R) -> bool>,
}

impl<R> Feed<R> {
    pub fn new(name: impl Into<String>, source: SourceRef<R>, sink: Arc<dyn SnapshotSink<R>>) -> Self {
        Self {
            name: name.into(),
            source,
            sink,
            keep: None,
        }
    }

    /// Drop fetched records failing `keep` before they reach the sink
    pub fn retain(mut self, keep: fn(&R) -> bool) -> Self {
        self.keep = Some(keep);
        self
    }
}

#[async_trait]
impl<R> Refresh for Feed<R>
where
    R: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn refresh(&self, session: &Session) -> CoreResult<usize> {
        let mut records = self.source.fetch(session).await?;
        if let Some(keep) = self.keep {
            records.retain(|r| keep(r));
        }
        let count = records.len();
        self.sink.replace(records).await?;
        log::debug!("{}: fetched {} record(s) from {}", self.name, count, self.source.describe());
        Ok(count)
    }
}

pub struct PollerHandle {
    name: String,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signal the task and wait for it to finish
    pub async fn shutdown(self) {
        if self.shutdown.send(true).is_err() {
            log::debug!("poller {} already stopped", self.name);
        }
        if let Err(e) = self.task.await {
            log::error!("poller {} ended abnormally: {}", self.name, e);
        }
    }
}

/// Refetch `feed` every `interval`, starting one interval from now.
///
/// A failed fetch is logged and the previous snapshot stays in place.
pub fn spawn_poller(feed: Arc<dyn Refresh>, session: Session, interval: Duration) -> PollerHandle {
    let (shutdown, mut stop) = watch::channel(false);
    let name = feed.name().to_string();
    let task_name = name.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let logger = DefaultErrorLogger;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = feed.refresh(&session).await {
                        logger.log_warning(
                            &format!("{}; keeping the previous snapshot", e),
                            &ErrorContext::new("poll").with_screen(task_name.as_str()),
                        );
                    }
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }
        log::debug!("poller {} stopped", task_name);
    });

    log::info!("polling {} every {:?}", name, interval);
    PollerHandle { name, shutdown, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnDescriptor, ColumnSet};
    use crate::error::CoreError;
    use crate::source::RecordSource;
    use crate::value::CellValue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    struct Item {
        id: String,
    }

    impl Record for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    /// Returns one more record on every call; fails once `fail_after` calls are made
    struct CountingSource {
        calls: AtomicUsize,
        fail_after: usize,
    }

    #[async_trait]
    impl RecordSource<Item> for CountingSource {
        async fn fetch(&self, _session: &Session) -> CoreResult<Vec<Item>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n > self.fail_after {
                return Err(CoreError::SourceUnavailable {
                    path: "counting".to_string(),
                });
            }
            Ok((0..n).map(|i| Item { id: i.to_string() }).collect())
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn table() -> Arc<RwLock<TableView<Item>>> {
        let columns = ColumnSet::new(vec![
            ColumnDescriptor::index(),
            ColumnDescriptor::text("id", "Id", |i: &Item| CellValue::text(&i.id)),
        ])
        .unwrap();
        Arc::new(RwLock::new(TableView::new("items", Arc::new(columns), 10)))
    }

    fn feed(source: Arc<CountingSource>, table: Arc<RwLock<TableView<Item>>>) -> Arc<dyn Refresh> {
        Arc::new(Feed::new("items", source, table))
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let source = Arc::new(CountingSource { calls: AtomicUsize::new(0), fail_after: 10 });
        let table = table();
        let feed = feed(source, table.clone());
        assert_eq!(feed.refresh(&Session::default()).await.unwrap(), 1);
        assert_eq!(feed.refresh(&Session::default()).await.unwrap(), 2);
        assert_eq!(table.read().await.view().total_records, 2);
    }

    #[tokio::test]
    async fn test_feed_retain_filters_snapshot() {
        let source = Arc::new(CountingSource { calls: AtomicUsize::new(0), fail_after: 10 });
        let table = table();
        let feed = Feed::new("items", source, table.clone()).retain(|i: &Item| i.id != "0");
        feed.refresh(&Session::default()).await.unwrap();
        assert_eq!(feed.refresh(&Session::default()).await.unwrap(), 1);
        assert_eq!(table.read().await.view().ids(), vec!["1"]);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let source = Arc::new(CountingSource { calls: AtomicUsize::new(0), fail_after: 1 });
        let table = table();
        let feed = feed(source, table.clone());
        feed.refresh(&Session::default()).await.unwrap();
        let version = table.read().await.version();
        assert!(feed.refresh(&Session::default()).await.is_err());
        let t = table.read().await;
        assert_eq!(t.view().total_records, 1);
        assert_eq!(t.version(), version);
    }

    #[tokio::test]
    async fn test_poller_runs_until_shutdown() {
        let source = Arc::new(CountingSource { calls: AtomicUsize::new(0), fail_after: 1000 });
        let table = table();
        let handle = spawn_poller(
            feed(source.clone(), table.clone()),
            Session::default(),
            Duration::from_millis(10),
        );
        assert_eq!(handle.name(), "items");

        tokio::time::sleep(Duration::from_millis(80)).await;
        handle.shutdown().await;

        let calls = source.calls.load(Ordering::SeqCst);
        assert!(calls >= 2, "expected at least two fetches, got {}", calls);
        assert_eq!(table.read().await.view().total_records, calls);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), calls);
    }
}
