#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report storage for the safety map.
//!
//! [`ReportStore`] is the seam between the feed and whatever persists
//! reports. It offers a one-shot ordered load, a capped live subscription,
//! and the append operation used by the reporting form. The bundled
//! [`store::SqliteReportStore`] implements it on `SQLite` through
//! `switchy_database`, and [`settings`] stores user preferences in the same
//! database.

pub mod db;
pub mod paths;
pub mod queries;
pub mod settings;
pub mod store;
pub mod subscription;

use async_trait::async_trait;
use safety_map_geography_models::Coordinate;
use safety_map_report_models::{NewReport, Report};
use thiserror::Error;

pub use settings::{AppSettings, SettingsError, SettingsStore, SqliteSettingsStore};
pub use store::SqliteReportStore;
pub use subscription::{Subscription, UpdateCallback};

/// Errors from loading or storing reports.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The database could not be opened or a query failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row could not be converted into a report.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Source of incident reports.
///
/// Every read is ordered newest first by server timestamp. Ties are
/// ordered however the backend likes.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Loads every report.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the backend is unreachable or the query
    /// fails.
    async fn load_all(&self) -> Result<Vec<Report>, FetchError>;

    /// Loads the `limit` most recent reports.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the backend is unreachable or the query
    /// fails.
    async fn latest(&self, limit: u32) -> Result<Vec<Report>, FetchError>;

    /// Appends a report, assigning its id and timestamp, and notifies live
    /// subscriptions.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the write fails. Subscription refresh
    /// failures are logged, not returned.
    async fn insert(
        &self,
        report: NewReport,
        coordinates: Option<Coordinate>,
    ) -> Result<Report, FetchError>;

    /// Registers a live feed of the `limit` most recent reports.
    ///
    /// `on_update` is called once with the current snapshot and again after
    /// every change, never with more than `limit` reports. Dropping or
    /// calling [`Subscription::unsubscribe`] on the returned handle stops
    /// further calls.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the initial snapshot cannot be loaded.
    async fn subscribe(
        &self,
        limit: u32,
        on_update: UpdateCallback,
    ) -> Result<Subscription, FetchError>;
}
