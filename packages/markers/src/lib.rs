#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map marker and list card descriptors.
//!
//! Turns the filtered, distance-annotated feed into plain data that a map
//! widget or list view can draw: pin position, pin color, popup content,
//! and the viewport that frames every pin. Nothing here draws.

pub mod card;
pub mod popup;

use chrono::{DateTime, Utc};
use safety_map_feed::RankedReport;
use safety_map_feed::time_window::classify;
use safety_map_geography::{BoundingBox, Coordinate};
use safety_map_report_models::ReportType;
use serde::Serialize;

pub use card::{ReportCard, to_cards};
pub use popup::Popup;

/// Pin color for raids.
pub const RAID_COLOR: &str = "#dc2626";

/// Pin color for every other report type.
pub const DEFAULT_COLOR: &str = "#ef4444";

/// Pin color for the user's own position.
pub const USER_COLOR: &str = "#3b82f6";

/// Fraction of the marker span added on each side when framing the map.
pub const BOUNDS_PADDING: f64 = 0.1;

/// What a marker represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    /// An incident report.
    Report,
    /// The user's current position.
    User,
}

/// A renderer-agnostic map pin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDescriptor {
    /// Report the pin belongs to (`None` for the user marker).
    pub report_id: Option<String>,
    /// What the pin represents.
    pub kind: MarkerKind,
    /// Where to place the pin.
    pub position: Coordinate,
    /// CSS hex color of the pin.
    pub color: &'static str,
    /// Popup shown when the pin is selected.
    pub popup: Popup,
    /// `popup` rendered as escaped HTML, ready for the map widget.
    pub popup_html: String,
}

impl MarkerDescriptor {
    fn new(
        report_id: Option<String>,
        kind: MarkerKind,
        position: Coordinate,
        color: &'static str,
        popup: Popup,
    ) -> Self {
        Self {
            report_id,
            kind,
            position,
            color,
            popup_html: popup.to_html(),
            popup,
        }
    }
}

/// Returns the pin color for a report type.
#[must_use]
pub const fn color_for(report_type: ReportType) -> &'static str {
    match report_type {
        ReportType::Raid => RAID_COLOR,
        ReportType::Patrol | ReportType::Checkpoint | ReportType::Other => DEFAULT_COLOR,
    }
}

/// Builds a marker for every report that has coordinates, in feed order.
#[must_use]
pub fn to_markers(ranked: &[RankedReport], now: DateTime<Utc>) -> Vec<MarkerDescriptor> {
    ranked
        .iter()
        .filter_map(|entry| {
            let position = entry.report.coordinates?;
            let report = &entry.report;

            let popup = Popup {
                title: report.report_type.title().to_string(),
                location: report.location_text.clone(),
                time_seen: report.time_seen.clone(),
                relative_age: classify(report.effective_time(), now).to_string(),
                distance: entry.distance_label.clone(),
                notes: report.notes.clone(),
            };

            Some(MarkerDescriptor::new(
                Some(report.id.clone()),
                MarkerKind::Report,
                position,
                color_for(report.report_type),
                popup,
            ))
        })
        .collect()
}

/// Returns the marker for the user's own position.
#[must_use]
pub fn user_marker(position: Coordinate) -> MarkerDescriptor {
    MarkerDescriptor::new(
        None,
        MarkerKind::User,
        position,
        USER_COLOR,
        Popup::titled("Your Location"),
    )
}

/// Returns the padded box covering every marker, or `None` when there is
/// nothing to frame and the viewport should stay where it is.
#[must_use]
pub fn fit_bounds(markers: &[MarkerDescriptor]) -> Option<BoundingBox> {
    BoundingBox::from_points(markers.iter().map(|m| m.position))
        .map(|b| b.pad(BOUNDS_PADDING))
}
