#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the safety map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the feed and marker types to allow independent evolution of the
//! API contract.

use safety_map_feed::{FilterState, TypeFilter};
use safety_map_geography_models::{BoundingBox, Coordinate};
use safety_map_markers::{MarkerDescriptor, ReportCard};
use safety_map_report_models::{NewReport, ReportType};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Query parameters shared by the report list and marker endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQueryParams {
    /// Report type, or `"all"`.
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    /// Recency window: `all`, `1h`, `24h`, `7d`, or `30d`.
    pub window: Option<String>,
    /// User latitude.
    pub lat: Option<f64>,
    /// User longitude.
    pub lng: Option<f64>,
    /// Sort nearest first instead of newest first.
    #[serde(default)]
    pub nearest: bool,
}

impl FeedQueryParams {
    /// The filter selection these parameters describe. Unrecognized
    /// windows fall back to [`safety_map_feed::WindowKind::All`].
    #[must_use]
    pub fn filter_state(&self) -> FilterState {
        let type_filter = self
            .report_type
            .as_deref()
            .map_or(TypeFilter::All, TypeFilter::from_label);
        let time_filter = self
            .window
            .as_deref()
            .and_then(|w| w.trim().parse().ok())
            .unwrap_or_default();
        FilterState::new(type_filter, time_filter)
    }

    /// The user position, when both halves are present and in range.
    #[must_use]
    pub fn user_coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.lat, self.lng)
    }
}

/// `GET /api/reports` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListResponse {
    /// Cards for the reports passing the filters.
    pub reports: Vec<ReportCard>,
    /// Reports before filtering.
    pub total: usize,
    /// Reports after filtering.
    pub filtered: usize,
    /// Report types present before filtering.
    pub available_types: Vec<ReportType>,
    /// Whether distance labels are present.
    pub showing_distances: bool,
    /// Empty-state text.
    pub empty_message: Option<&'static str>,
    /// Set when the latest load failed and older data is being served.
    pub error: Option<String>,
}

/// `GET /api/markers` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerResponse {
    /// One marker per mapped report passing the filters.
    pub markers: Vec<MarkerDescriptor>,
    /// Viewport fitting every report marker.
    pub bounds: Option<BoundingBox>,
    /// The user's own marker.
    pub user: Option<MarkerDescriptor>,
}

/// `POST /api/reports` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    /// The submitted report.
    #[serde(flatten)]
    pub report: NewReport,
    /// Latitude, when the client already knows the position.
    pub lat: Option<f64>,
    /// Longitude, when the client already knows the position.
    pub lng: Option<f64>,
}

impl CreateReportRequest {
    /// Client-supplied coordinates, when both halves are present and in
    /// range.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.lat, self.lng)
    }
}

/// `GET /api/reports/live` parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LiveFeedParams {
    /// Most reports per update.
    pub limit: Option<u32>,
}

/// `GET /api/geocode/suggest` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestParams {
    /// Partially typed location.
    #[serde(default)]
    pub q: String,
    /// Client-chosen key grouping one person's keystrokes. Queries without
    /// one share a single anonymous session.
    #[serde(default)]
    pub session: String,
}

/// `GET /api/geocode/suggest` response.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestResponse {
    /// Suggested addresses.
    pub suggestions: Vec<String>,
    /// A newer query from the same session replaced this one before it
    /// was sent.
    pub superseded: bool,
}

/// `POST /api/alert` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertBody {
    /// Who is sending the alert.
    pub sender_name: String,
    /// Sender latitude.
    pub lat: Option<f64>,
    /// Sender longitude.
    pub lng: Option<f64>,
}

impl AlertBody {
    /// Sender position, when both halves are present and in range.
    #[must_use]
    pub fn location(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.lat, self.lng)
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use safety_map_feed::WindowKind;

    #[test]
    fn feed_params_parse_filters() {
        let params: FeedQueryParams =
            serde_json::from_str(r#"{"type":"Raid","window":"24h","lat":34.0,"lng":-118.0}"#)
                .unwrap();
        let state = params.filter_state();
        assert_eq!(state.type_filter, TypeFilter::Only(ReportType::Raid));
        assert_eq!(state.time_filter, WindowKind::Last24Hours);
        assert_eq!(
            params.user_coordinate(),
            Some(Coordinate::new(34.0, -118.0))
        );
    }

    #[test]
    fn feed_params_default_to_everything() {
        let params = FeedQueryParams {
            window: Some("2w".to_string()),
            lat: Some(34.0),
            ..FeedQueryParams::default()
        };
        assert!(params.filter_state().is_unfiltered());
        assert!(params.user_coordinate().is_none());
    }

    #[test]
    fn create_report_flattens_fields() {
        let body: CreateReportRequest = serde_json::from_str(
            r#"{"locationText":"5th & Main","type":"Patrulla","notes":"two cars","lat":34.0,"lng":-118.0}"#,
        )
        .unwrap();
        assert_eq!(body.report.location_text.as_deref(), Some("5th & Main"));
        assert_eq!(body.report.report_type, "Patrulla");
        assert!(body.coordinates().is_some());
    }
}
