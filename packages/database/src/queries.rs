//! Report queries.
//!
//! Timestamps are stored as RFC 3339 text with a fixed microsecond
//! precision and a `Z` suffix, so lexical order is chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use moosicbox_json_utils::database::ToValue as _;
use safety_map_geography_models::Coordinate;
use safety_map_report_models::{Report, ReportType};
use switchy_database::{Database, DatabaseValue};

use crate::FetchError;

const SELECT_REPORTS: &str = "SELECT id, location_text, report_type, notes, time_seen,
        timestamp, latitude, longitude
 FROM reports
 ORDER BY timestamp DESC, rowid DESC";

/// Formats a timestamp the way it is stored.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Inserts a fully-formed report.
///
/// # Errors
///
/// Returns [`FetchError`] if the insert fails.
pub async fn insert_report(db: &dyn Database, report: &Report) -> Result<(), FetchError> {
    db.exec_raw_params(
        "INSERT INTO reports (
            id, location_text, report_type, notes, time_seen,
            timestamp, latitude, longitude
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        &[
            DatabaseValue::String(report.id.clone()),
            optional_string(report.location_text.as_deref()),
            DatabaseValue::String(report.report_type.to_string()),
            optional_string(report.notes.as_deref()),
            optional_string(report.time_seen.as_deref()),
            report
                .timestamp
                .map_or(DatabaseValue::Null, |ts| {
                    DatabaseValue::String(format_timestamp(ts))
                }),
            report
                .coordinates
                .map_or(DatabaseValue::Null, |c| DatabaseValue::Real64(c.lat)),
            report
                .coordinates
                .map_or(DatabaseValue::Null, |c| DatabaseValue::Real64(c.lng)),
        ],
    )
    .await
    .map_err(|e| FetchError::Database(e.to_string()))?;

    Ok(())
}

/// Loads reports newest first, optionally capped at `limit`.
///
/// # Errors
///
/// Returns [`FetchError`] if the query fails or the `id` column of a row
/// cannot be read.
pub async fn query_reports(
    db: &dyn Database,
    limit: Option<u32>,
) -> Result<Vec<Report>, FetchError> {
    let rows = match limit {
        Some(limit) => {
            db.query_raw_params(
                &format!("{SELECT_REPORTS} LIMIT $1"),
                &[DatabaseValue::Int32(i32::try_from(limit).unwrap_or(i32::MAX))],
            )
            .await
        }
        None => db.query_raw_params(SELECT_REPORTS, &[]).await,
    }
    .map_err(|e| FetchError::Database(e.to_string()))?;

    let mut reports = Vec::with_capacity(rows.len());
    for row in &rows {
        let id: String = row.to_value("id").map_err(|e| FetchError::Conversion {
            message: format!("Failed to parse report id: {e}"),
        })?;

        let report_type: String = row.to_value("report_type").unwrap_or_default();
        let timestamp: Option<String> = row.to_value("timestamp").unwrap_or(None);
        let timestamp = timestamp.and_then(|raw| parse_timestamp(&id, &raw));

        reports.push(Report {
            location_text: row.to_value("location_text").unwrap_or(None),
            report_type: ReportType::from_label(&report_type),
            notes: row.to_value("notes").unwrap_or(None),
            time_seen: row.to_value("time_seen").unwrap_or(None),
            timestamp,
            coordinates: Coordinate::from_parts(
                row.to_value("latitude").unwrap_or(None),
                row.to_value("longitude").unwrap_or(None),
            ),
            id,
        });
    }

    Ok(reports)
}

/// Returns the number of stored reports.
///
/// # Errors
///
/// Returns [`FetchError`] if the query fails.
pub async fn count_reports(db: &dyn Database) -> Result<u64, FetchError> {
    let rows = db
        .query_raw_params("SELECT COUNT(*) as cnt FROM reports", &[])
        .await
        .map_err(|e| FetchError::Database(e.to_string()))?;

    let count: i64 = rows.first().map_or(0, |r| r.to_value("cnt").unwrap_or(0));

    Ok(u64::try_from(count).unwrap_or(0))
}

fn parse_timestamp(id: &str, raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            log::warn!("Report {id} has unreadable timestamp {raw:?}: {e}");
            None
        }
    }
}

fn optional_string(value: Option<&str>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |s| {
        DatabaseValue::String(s.to_string())
    })
}
