//! Screen registry
//!
//! Builds every screen's table and feed from configuration and hands out
//! type-erased handles to them.

use adminview_config::Config;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::action::ActionRule;
use crate::column::ColumnSet;
use crate::error::{CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::models::{
    fee_columns, payout_action_available, payout_columns, store_columns, transaction_columns, Fee, Payout,
    Store, Transaction,
};
use crate::poller::{spawn_poller, Feed, PollerHandle, Refresh};
use crate::record::Record;
use crate::screen::{Screen, ScreenTable};
use crate::session::Session;
use crate::source::{JsonFileSource, SourceRef};
use crate::table::TableView;

/// Shared handle to one screen's table
pub type TableRef = Arc<RwLock<dyn ScreenTable>>;

pub struct ScreenEntry {
    pub screen: Screen,
    pub table: TableRef,
    pub feed: Arc<dyn Refresh>,
}

/// Outcome of refreshing one screen
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub screen: Screen,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-screen narrowing of what the source serves and what rows offer
pub struct ScreenOptions<R> {
    keep: Option<fn(&R) -> bool>,
    rule: Option<ActionRule<R>>,
}

impl<R> Default for ScreenOptions<R> {
    fn default() -> Self {
        Self { keep: None, rule: None }
    }
}

impl<R> ScreenOptions<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep fetched records passing `keep`
    pub fn retain(mut self, keep: fn(&R) -> bool) -> Self {
        self.keep = Some(keep);
        self
    }

    pub fn action_rule(mut self, rule: ActionRule<R>) -> Self {
        self.rule = Some(rule);
        self
    }
}

#[derive(Default)]
pub struct ScreenRegistry {
    entries: Vec<ScreenEntry>,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register all six screens, each reading its configured data file
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let data = &config.data;
        let page_size = config.pagination.page_size;
        let mut registry = Self::new();

        registry.register(
            Screen::Fees,
            fee_columns()?,
            Arc::new(JsonFileSource::<Fee>::new(config.source_path(&data.fees_file))),
            page_size,
            ScreenOptions::new(),
        );
        registry.register(
            Screen::HistoryFees,
            fee_columns()?,
            Arc::new(JsonFileSource::<Fee>::new(config.source_path(&data.history_fees_file))),
            page_size,
            ScreenOptions::new(),
        );
        registry.register(
            Screen::Stores,
            store_columns()?,
            Arc::new(JsonFileSource::<Store>::new(config.source_path(&data.stores_file))),
            page_size,
            ScreenOptions::<Store>::new().retain(Store::is_verified),
        );
        registry.register(
            Screen::StoreRequests,
            store_columns()?,
            Arc::new(JsonFileSource::<Store>::new(config.source_path(&data.store_requests_file))),
            page_size,
            ScreenOptions::new(),
        );
        registry.register(
            Screen::Payouts,
            payout_columns()?,
            Arc::new(JsonFileSource::<Payout>::new(config.source_path(&data.payouts_file))),
            page_size,
            ScreenOptions::<Payout>::new().action_rule(payout_action_available),
        );
        registry.register(
            Screen::Transactions,
            transaction_columns()?,
            Arc::new(JsonFileSource::<Transaction>::new(config.source_path(&data.transactions_file))),
            page_size,
            ScreenOptions::new(),
        );

        Ok(registry)
    }

    /// Add a screen backed by `source`. A screen registered twice replaces
    /// the earlier entry.
    pub fn register<R>(
        &mut self,
        screen: Screen,
        columns: ColumnSet<R>,
        source: SourceRef<R>,
        page_size: usize,
        options: ScreenOptions<R>,
    ) where
        R: Record + Serialize + Send + Sync + 'static,
    {
        let mut view = TableView::new(screen.slug(), Arc::new(columns), page_size)
            .with_actions(screen.allowed_actions().iter().copied())
            .with_reason_required(screen.reason_required().iter().copied());
        if let Some(rule) = options.rule {
            view = view.with_action_rule(rule);
        }
        let table = Arc::new(RwLock::new(view));

        let mut feed = Feed::new(screen.slug(), source, table.clone());
        if let Some(keep) = options.keep {
            feed = feed.retain(keep);
        }

        self.entries.retain(|e| e.screen != screen);
        self.entries.push(ScreenEntry {
            screen,
            table,
            feed: Arc::new(feed),
        });
    }

    pub fn screens(&self) -> Vec<Screen> {
        self.entries.iter().map(|e| e.screen).collect()
    }

    pub fn entry(&self, screen: Screen) -> Option<&ScreenEntry> {
        self.entries.iter().find(|e| e.screen == screen)
    }

    pub fn table(&self, screen: Screen) -> Option<TableRef> {
        self.entry(screen).map(|e| e.table.clone())
    }

    /// Refetch every screen once. Failures are logged and reported; the
    /// affected screens keep their previous snapshot.
    pub async fn refresh_all(&self, session: &Session) -> Vec<RefreshReport> {
        let logger = DefaultErrorLogger;
        let mut reports = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let report = match entry.feed.refresh(session).await {
                Ok(count) => RefreshReport {
                    screen: entry.screen,
                    records: Some(count),
                    error: None,
                },
                Err(e) => {
                    logger.log_error(&e, &ErrorContext::new("refresh").with_screen(entry.screen.slug()));
                    RefreshReport {
                        screen: entry.screen,
                        records: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            reports.push(report);
        }
        reports
    }

    pub fn spawn_pollers(&self, session: &Session, interval: Duration) -> Vec<PollerHandle> {
        self.entries
            .iter()
            .map(|e| spawn_poller(e.feed.clone(), session.clone(), interval))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::RowAction;
    use crate::error::CoreError;
    use crate::screen::ViewCommand;
    use crate::state::SortDirection;
    use std::path::PathBuf;

    fn write_fixtures(dir: &PathBuf) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(
            dir.join("fees.json"),
            r#"{"success":true,"data":[
                {"id":"f1","name":"Admin Fee","interest":2.5,"description":"per order"},
                {"id":"f2","name":"Service Fee","interest":1,"description":"flat"}
            ]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("stores.json"),
            r#"{"success":true,"data":[
                {"id":"s1","name":"Maju","is_verified":"VERIFIED","createdAt":"2024-05-01T10:00:00Z"},
                {"id":"s2","name":"Jaya","is_verified":"PENDING","createdAt":"2024-05-02T10:00:00Z"}
            ]}"#,
        )
        .unwrap();
        std::fs::write(dir.join("store-requests.json"), r#"{"success":false,"message":"Unauthorized"}"#).unwrap();
    }

    fn config(dir: &PathBuf) -> Config {
        let mut config = Config::default();
        config.data.path = dir.clone();
        config.pagination.page_size = 1;
        config
    }

    fn session() -> Session {
        Session::new("token", "admin")
    }

    #[test]
    fn test_registry_has_all_screens() {
        let registry = ScreenRegistry::from_config(&Config::default()).unwrap();
        assert_eq!(registry.screens(), Screen::ALL.to_vec());
        assert!(registry.table(Screen::Payouts).is_some());
    }

    #[tokio::test]
    async fn test_refresh_all_reports_per_screen() {
        let dir = std::env::temp_dir().join(format!("adminview-registry-{}", std::process::id()));
        write_fixtures(&dir);
        let registry = ScreenRegistry::from_config(&config(&dir)).unwrap();

        let reports = registry.refresh_all(&session()).await;
        let fees = reports.iter().find(|r| r.screen == Screen::Fees).unwrap();
        assert_eq!(fees.records, Some(2));
        let requests = reports.iter().find(|r| r.screen == Screen::StoreRequests).unwrap();
        assert!(requests.error.as_deref().unwrap_or_default().contains("Unauthorized"));
        let payouts = reports.iter().find(|r| r.screen == Screen::Payouts).unwrap();
        assert!(payouts.records.is_none());

        let stores = registry.table(Screen::Stores).unwrap();
        assert_eq!(stores.read().await.view().ids(), vec!["s1"]);

        let fees = registry.table(Screen::Fees).unwrap();
        {
            let mut table = fees.write().await;
            table.apply(&ViewCommand::SetSort {
                column: "interest".to_string(),
                direction: SortDirection::Asc,
            });
            assert_eq!(table.view().ids(), vec!["f2"]);
            assert_eq!(table.view().page_count, 2);
        }

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_screens_apply_row_rules() {
        let dir = std::env::temp_dir().join(format!("adminview-registry-rules-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("payouts.json"),
            r#"{"success":true,"data":[
                {"id":"p1","status":"PENDING","createdAt":"2024-05-01T10:00:00Z"},
                {"id":"p2","status":"SUCCESS","createdAt":"2024-05-02T10:00:00Z"}
            ]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("store-requests.json"),
            r#"{"success":true,"data":[
                {"id":"s2","user_id":"u2","name":"Jaya","is_verified":"PENDING","createdAt":"2024-05-02T10:00:00Z"}
            ]}"#,
        )
        .unwrap();
        let registry = ScreenRegistry::from_config(&config(&dir)).unwrap();
        registry.refresh_all(&session()).await;

        let payouts = registry.table(Screen::Payouts).unwrap();
        {
            let table = payouts.read().await;
            assert!(table.request_action("p1", RowAction::Confirm, None).is_ok());
            assert!(matches!(
                table.request_action("p2", RowAction::Confirm, None),
                Err(CoreError::ActionNotAllowed { .. })
            ));
            assert!(matches!(
                table.request_action("p1", RowAction::Decline, None),
                Err(CoreError::ActionNotAllowed { .. })
            ));
        }

        let requests = registry.table(Screen::StoreRequests).unwrap();
        let table = requests.read().await;
        assert!(matches!(
            table.request_action("s2", RowAction::Decline, None),
            Err(CoreError::ReasonRequired { .. })
        ));
        let request = table
            .request_action("s2", RowAction::Decline, Some("blurry ID photo".to_string()))
            .unwrap();
        assert_eq!(request.target_id(), "u2");

        std::fs::remove_dir_all(dir).ok();
    }
}
