//! `SQLite`-backed [`ReportStore`].

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use safety_map_geography_models::Coordinate;
use safety_map_report_models::{NewReport, Report};
use switchy_database::Database;
use tokio::sync::Mutex;

use crate::settings::SqliteSettingsStore;
use crate::subscription::SubscriberRegistry;
use crate::{FetchError, ReportStore, Subscription, UpdateCallback, db, queries};

/// Report store over a local `SQLite` file.
///
/// Writes and subscription snapshots are serialized so a subscriber never
/// sees an older snapshot after a newer one.
pub struct SqliteReportStore {
    db: Arc<dyn Database>,
    subscribers: Arc<SubscriberRegistry>,
    write_lock: Mutex<()>,
}

impl SqliteReportStore {
    /// Opens the database at `path`, creating it and its schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the database cannot be opened.
    pub async fn open(path: &Path) -> Result<Self, FetchError> {
        let db = db::open(path).await?;
        log::info!("Report store ready at {}", path.display());
        Ok(Self::from_database(Arc::from(db)))
    }

    /// Wraps an already-initialized database handle.
    #[must_use]
    pub fn from_database(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            subscribers: SubscriberRegistry::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Settings persisted in the same database.
    #[must_use]
    pub fn settings(&self) -> SqliteSettingsStore {
        SqliteSettingsStore::new(Arc::clone(&self.db))
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Number of stored reports.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the query fails.
    pub async fn count(&self) -> Result<u64, FetchError> {
        queries::count_reports(self.db.as_ref()).await
    }

    async fn refresh_subscribers(&self) {
        let Some(limit) = self.subscribers.max_limit() else {
            return;
        };

        match queries::query_reports(self.db.as_ref(), Some(limit)).await {
            Ok(latest) => self.subscribers.notify(&latest),
            Err(e) => log::error!("Failed to refresh live subscriptions: {e}"),
        }
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn load_all(&self) -> Result<Vec<Report>, FetchError> {
        queries::query_reports(self.db.as_ref(), None).await
    }

    async fn latest(&self, limit: u32) -> Result<Vec<Report>, FetchError> {
        queries::query_reports(self.db.as_ref(), Some(limit)).await
    }

    async fn insert(
        &self,
        report: NewReport,
        coordinates: Option<Coordinate>,
    ) -> Result<Report, FetchError> {
        let coordinates = coordinates.filter(|c| {
            let valid = c.is_valid();
            if !valid {
                log::warn!("Dropping out-of-range coordinates {c:?}");
            }
            valid
        });

        let report = report.into_report(uuid::Uuid::new_v4().to_string(), Utc::now(), coordinates);

        let _guard = self.write_lock.lock().await;
        queries::insert_report(self.db.as_ref(), &report).await?;
        log::info!(
            "Stored {} report {} ({})",
            report.report_type,
            report.id,
            if report.is_mappable() {
                "mapped"
            } else {
                "unmapped"
            }
        );

        self.refresh_subscribers().await;

        Ok(report)
    }

    async fn subscribe(
        &self,
        limit: u32,
        on_update: UpdateCallback,
    ) -> Result<Subscription, FetchError> {
        let _guard = self.write_lock.lock().await;

        let initial = queries::query_reports(self.db.as_ref(), Some(limit)).await?;
        let subscription = self.subscribers.register(limit, on_update);
        self.subscribers.notify_one(&subscription, &initial);

        log::debug!(
            "Subscription registered (limit {limit}, {} active)",
            self.subscribers.len()
        );

        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex as StdMutex;

    fn temp_db_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "safety_map_store_{name}_{}",
            uuid::Uuid::new_v4()
        ));
        dir.join("reports.db")
    }

    fn new_report(report_type: &str, notes: &str) -> NewReport {
        NewReport {
            location_text: Some("5th & Main".to_string()),
            report_type: report_type.to_string(),
            notes: Some(notes.to_string()),
            time_seen: None,
        }
    }

    fn recorder() -> (Arc<StdMutex<Vec<Vec<String>>>>, UpdateCallback) {
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let callback: UpdateCallback = Arc::new(move |reports: Vec<Report>| {
            sink.lock()
                .unwrap()
                .push(reports.into_iter().map(|r| r.id).collect());
        });
        (calls, callback)
    }

    #[tokio::test]
    async fn load_all_is_newest_first() {
        let store = SqliteReportStore::open(&temp_db_path("order")).await.unwrap();

        let first = store.insert(new_report("patrol", "one"), None).await.unwrap();
        let second = store
            .insert(
                new_report("raid", "two"),
                Some(Coordinate::new(34.05, -118.24)),
            )
            .await
            .unwrap();

        let all = store.load_all().await.unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, [second.id.as_str(), first.id.as_str()]);

        assert_eq!(all[0].coordinates, Some(Coordinate::new(34.05, -118.24)));
        assert!(all[1].coordinates.is_none());
        assert_eq!(all[0].notes.as_deref(), Some("two"));
        assert!(all[0].timestamp.is_some());
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn empty_store_loads_nothing() {
        let store = SqliteReportStore::open(&temp_db_path("empty")).await.unwrap();
        assert!(store.load_all().await.unwrap().is_empty());
        assert!(store.latest(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_coordinates_are_dropped() {
        let store = SqliteReportStore::open(&temp_db_path("coords")).await.unwrap();
        let report = store
            .insert(new_report("other", "x"), Some(Coordinate::new(95.0, 0.0)))
            .await
            .unwrap();
        assert!(report.coordinates.is_none());
    }

    #[tokio::test]
    async fn subscription_is_capped_at_limit() {
        let store = SqliteReportStore::open(&temp_db_path("cap")).await.unwrap();
        let (calls, callback) = recorder();

        let subscription = store.subscribe(2, callback).await.unwrap();

        let mut inserted = Vec::new();
        for n in 0..3 {
            let report = store
                .insert(new_report("patrol", &n.to_string()), None)
                .await
                .unwrap();
            inserted.push(report.id);
        }

        let calls = calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 4);
        assert!(calls[0].is_empty());
        assert!(calls.iter().all(|c| c.len() <= 2));
        assert_eq!(
            calls.last().unwrap(),
            &vec![inserted[2].clone(), inserted[1].clone()]
        );

        drop(subscription);
    }

    #[tokio::test]
    async fn unsubscribe_stops_callbacks() {
        let store = SqliteReportStore::open(&temp_db_path("unsub")).await.unwrap();
        let (calls, callback) = recorder();

        let subscription = store.subscribe(5, callback).await.unwrap();
        store.insert(new_report("raid", "a"), None).await.unwrap();
        subscription.unsubscribe();
        assert_eq!(store.subscriber_count(), 0);

        store.insert(new_report("raid", "b"), None).await.unwrap();
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_type_reads_back_as_other() {
        let store = SqliteReportStore::open(&temp_db_path("type")).await.unwrap();
        store.insert(new_report("Patrulla", "a"), None).await.unwrap();
        store.insert(new_report("surveillance", "b"), None).await.unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(
            all[0].report_type,
            safety_map_report_models::ReportType::Other
        );
        assert_eq!(
            all[1].report_type,
            safety_map_report_models::ReportType::Patrol
        );
    }
}
