//! List view cards.
//!
//! Unlike markers, every report gets a card, mapped or not.

use chrono::{DateTime, Utc};
use safety_map_feed::RankedReport;
use safety_map_feed::time_window::classify;
use serde::Serialize;

/// One entry in the report list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCard {
    /// Report identifier.
    pub report_id: String,
    /// Heading, the report type.
    pub title: String,
    /// Where the activity was seen.
    pub location: Option<String>,
    /// Relative age label.
    pub relative_age: String,
    /// Distance from the user.
    pub distance: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Whether the report has a map marker to jump to.
    pub mappable: bool,
}

/// Builds a card for every entry, in feed order.
#[must_use]
pub fn to_cards(ranked: &[RankedReport], now: DateTime<Utc>) -> Vec<ReportCard> {
    ranked
        .iter()
        .map(|entry| ReportCard {
            report_id: entry.report.id.clone(),
            title: entry.report.report_type.title().to_string(),
            location: entry.report.location_text.clone(),
            relative_age: classify(entry.report.effective_time(), now).to_string(),
            distance: entry.distance_label.clone(),
            notes: entry.report.notes.clone(),
            mappable: entry.report.is_mappable(),
        })
        .collect()
}
