//! Key/value preference storage.
//!
//! Values are JSON strings keyed by name, the same shape the mobile client
//! keeps in device storage.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use moosicbox_json_utils::database::ToValue as _;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use switchy_database::{Database, DatabaseValue};
use thiserror::Error;

/// Key holding the JSON array of emergency contacts.
pub const EMERGENCY_CONTACTS_KEY: &str = "emergencyContacts";

/// Key holding the JSON-encoded [`AppSettings`].
pub const APP_SETTINGS_KEY: &str = "appSettings";

/// Key holding the selected UI language code.
pub const LANGUAGE_KEY: &str = "language";

/// Errors from settings storage.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A database query or command failed.
    #[error("Database error: {0}")]
    Database(String),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored row could not be read.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Privacy and notification toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Whether push notifications are enabled.
    pub push_notifications: bool,
    /// Whether the user's location may be shared in alerts.
    pub location_sharing: bool,
    /// Whether reports are submitted without identifying details.
    pub anonymous_reporting: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            push_notifications: true,
            location_sharing: true,
            anonymous_reporting: false,
        }
    }
}

/// Persistent string settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the lookup fails.
    async fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the write fails.
    async fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;
}

/// Reads and deserializes the value stored under `key`.
///
/// # Errors
///
/// Returns [`SettingsError`] if the lookup fails or the stored value is not
/// valid JSON for `T`.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn SettingsStore,
    key: &str,
) -> Result<Option<T>, SettingsError> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serializes `value` and stores it under `key`.
///
/// # Errors
///
/// Returns [`SettingsError`] if serialization or the write fails.
pub async fn set_json<T: Serialize + Sync>(
    store: &dyn SettingsStore,
    key: &str,
    value: &T,
) -> Result<(), SettingsError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

/// Loads [`AppSettings`], falling back to defaults when unset.
///
/// # Errors
///
/// Returns [`SettingsError`] if the lookup fails or the stored value is
/// malformed.
pub async fn app_settings(store: &dyn SettingsStore) -> Result<AppSettings, SettingsError> {
    Ok(get_json(store, APP_SETTINGS_KEY).await?.unwrap_or_default())
}

/// [`SettingsStore`] on the report database's `settings` table.
#[derive(Clone)]
pub struct SqliteSettingsStore {
    db: Arc<dyn Database>,
}

impl SqliteSettingsStore {
    /// Wraps a database whose schema has already been created.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT value FROM settings WHERE key = $1",
                &[DatabaseValue::String(key.to_string())],
            )
            .await
            .map_err(|e| SettingsError::Database(e.to_string()))?;

        let value = rows.first().map(|row| row.to_value("value")).transpose();

        value.map_err(|e| SettingsError::Conversion {
            message: format!("setting {key}: {e}"),
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.db
            .exec_raw_params(
                "INSERT INTO settings (key, value, updated_at)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at",
                &[
                    DatabaseValue::String(key.to_string()),
                    DatabaseValue::String(value.to_string()),
                    DatabaseValue::String(Utc::now().to_rfc3339()),
                ],
            )
            .await
            .map_err(|e| SettingsError::Database(e.to_string()))?;

        log::debug!("Updated setting {key}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteReportStore;

    async fn store(name: &str) -> SqliteSettingsStore {
        let path = std::env::temp_dir()
            .join(format!("safety_map_settings_{name}_{}", uuid::Uuid::new_v4()))
            .join("settings.db");
        SqliteReportStore::open(&path).await.unwrap().settings()
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let settings = store("missing").await;
        assert!(settings.get(LANGUAGE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_overwrites() {
        let settings = store("overwrite").await;
        settings.set(LANGUAGE_KEY, "\"en\"").await.unwrap();
        settings.set(LANGUAGE_KEY, "\"es\"").await.unwrap();
        assert_eq!(
            settings.get(LANGUAGE_KEY).await.unwrap().as_deref(),
            Some("\"es\"")
        );
    }

    #[tokio::test]
    async fn app_settings_default_then_round_trip() {
        let settings = store("app").await;
        assert_eq!(
            app_settings(&settings).await.unwrap(),
            AppSettings::default()
        );

        let changed = AppSettings {
            location_sharing: false,
            ..AppSettings::default()
        };
        set_json(&settings, APP_SETTINGS_KEY, &changed).await.unwrap();
        assert_eq!(app_settings(&settings).await.unwrap(), changed);
    }

    #[tokio::test]
    async fn unreadable_value_is_an_error() {
        let path = std::env::temp_dir()
            .join(format!("safety_map_settings_null_{}", uuid::Uuid::new_v4()))
            .join("settings.db");
        let db: Arc<dyn Database> = Arc::from(crate::db::open(&path).await.unwrap());
        for sql in [
            "DROP TABLE settings",
            "CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT, updated_at TEXT)",
            "INSERT INTO settings (key, value, updated_at) VALUES ('language', NULL, '')",
        ] {
            db.exec_raw(sql).await.unwrap();
        }

        let settings = SqliteSettingsStore::new(db);
        assert!(matches!(
            settings.get(LANGUAGE_KEY).await,
            Err(SettingsError::Conversion { .. })
        ));
    }

    #[test]
    fn partial_app_settings_fill_defaults() {
        let parsed: AppSettings = serde_json::from_str(r#"{"anonymousReporting":true}"#).unwrap();
        assert!(parsed.anonymous_reporting);
        assert!(parsed.push_notifications);
        assert!(parsed.location_sharing);
    }
}
