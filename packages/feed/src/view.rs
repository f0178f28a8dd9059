//! The single owner of feed state.
//!
//! Report snapshots, filter changes, and the user position arrive
//! independently and in any order. [`FeedView`] keeps only the latest of
//! each and [`FeedView::render`] always derives output from all three.

use chrono::{DateTime, Utc};
use safety_map_geography::Coordinate;
use safety_map_report_models::{Report, ReportType};
use serde::Serialize;

use crate::filter::{FilterState, filter, report_types};
use crate::proximity::{RankedReport, annotate};

/// Generic message shown when loading reports fails.
pub const FETCH_ERROR_MESSAGE: &str = "Unable to load reports. Please try again.";

/// Shown when there are no reports at all.
pub const NO_REPORTS_MESSAGE: &str = "No reports available";

/// Shown when reports exist but none pass the current filters.
pub const NO_MATCHES_MESSAGE: &str = "No reports match your filters";

/// Latest report snapshot, filter selection, and user position.
#[derive(Debug, Clone, Default)]
pub struct FeedView {
    reports: Vec<Report>,
    filter: FilterState,
    user: Option<Coordinate>,
    last_error: Option<String>,
}

/// Output of [`FeedView::render`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    /// Reports passing the filters, annotated with distance, newest first.
    pub entries: Vec<RankedReport>,
    /// Number of reports in the snapshot before filtering.
    pub total: usize,
    /// Distinct report types present in the unfiltered snapshot.
    pub available_types: Vec<ReportType>,
    /// Whether distances are being shown.
    pub showing_distances: bool,
    /// Message for the last failed load, if the most recent load failed.
    pub error: Option<String>,
    /// Empty-state text when `entries` is empty.
    pub empty_message: Option<&'static str>,
}

impl FeedView {
    /// Creates an empty view with no filters and no user position.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the report snapshot.
    ///
    /// Snapshots may carry more reports than a subscription asked for;
    /// they are used as given.
    pub fn replace_reports(&mut self, reports: Vec<Report>) {
        self.reports = reports;
        self.last_error = None;
    }

    /// Applies the outcome of a load.
    ///
    /// On failure the previous snapshot is kept and a generic error message
    /// is recorded. Returns `true` if the snapshot was replaced.
    pub fn apply_fetch<E: std::fmt::Display>(&mut self, result: Result<Vec<Report>, E>) -> bool {
        match result {
            Ok(reports) => {
                self.replace_reports(reports);
                true
            }
            Err(e) => {
                log::warn!(
                    "Failed to load reports, keeping {} previous: {e}",
                    self.reports.len()
                );
                self.last_error = Some(FETCH_ERROR_MESSAGE.to_string());
                false
            }
        }
    }

    /// Replaces the filter selection.
    pub const fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    /// Returns the current filter selection.
    #[must_use]
    pub const fn filter(&self) -> FilterState {
        self.filter
    }

    /// Sets or clears the user position. Out-of-range coordinates are
    /// treated as unavailable.
    pub fn set_user_coordinate(&mut self, user: Option<Coordinate>) {
        self.user = user.filter(|c| {
            let valid = c.is_valid();
            if !valid {
                log::debug!("Ignoring invalid user coordinate {c:?}");
            }
            valid
        });
    }

    /// Returns the current user position.
    #[must_use]
    pub const fn user_coordinate(&self) -> Option<Coordinate> {
        self.user
    }

    /// Returns the current unfiltered snapshot.
    #[must_use]
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Empty-state text for the current selection, or `None` when at
    /// least one report passes the filters.
    #[must_use]
    pub fn empty_message(&self, now: DateTime<Utc>) -> Option<&'static str> {
        let visible = self
            .reports
            .iter()
            .filter(|r| self.filter.accepts(r, now))
            .count();
        self.empty_state(visible)
    }

    fn empty_state(&self, visible: usize) -> Option<&'static str> {
        if visible > 0 {
            None
        } else if self.reports.is_empty() {
            Some(NO_REPORTS_MESSAGE)
        } else {
            Some(NO_MATCHES_MESSAGE)
        }
    }

    /// Computes the filtered, annotated feed.
    #[must_use]
    pub fn render(&self, now: DateTime<Utc>) -> FeedSnapshot {
        let visible = filter(&self.reports, self.filter, now);
        let entries = annotate(&visible, self.user);
        let empty_message = self.empty_state(entries.len());

        FeedSnapshot {
            entries,
            total: self.reports.len(),
            available_types: report_types(&self.reports),
            showing_distances: self.user.is_some(),
            error: self.last_error.clone(),
            empty_message,
        }
    }
}
