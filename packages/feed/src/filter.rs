//! Type and recency filtering over a report snapshot.

use chrono::{DateTime, Utc};
use safety_map_report_models::{Report, ReportType};
use serde::{Deserialize, Serialize};

use crate::time_window::{WindowKind, within_window};

/// Report type restriction selected in the map filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TypeFilter {
    /// Every type
    #[default]
    All,
    /// Only reports of one type
    Only(ReportType),
}

impl TypeFilter {
    /// Parses `"all"` or a report type name. Unrecognized names select
    /// [`ReportType::Other`], matching how the reports themselves are read.
    #[must_use]
    pub fn from_label(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(ReportType::from_label(value))
        }
    }

    /// Returns `true` if `report_type` passes this filter.
    #[must_use]
    pub fn matches(self, report_type: ReportType) -> bool {
        match self {
            Self::All => true,
            Self::Only(t) => t == report_type,
        }
    }
}

impl std::fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(t) => write!(f, "{t}"),
        }
    }
}

impl Serialize for TypeFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_label(&value))
    }
}

/// The filter selection held by a view. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Type restriction.
    pub type_filter: TypeFilter,
    /// Recency window.
    pub time_filter: WindowKind,
}

impl FilterState {
    /// Creates a filter state.
    #[must_use]
    pub const fn new(type_filter: TypeFilter, time_filter: WindowKind) -> Self {
        Self {
            type_filter,
            time_filter,
        }
    }

    /// Returns `true` if this state lets every report through.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.type_filter == TypeFilter::All && self.time_filter == WindowKind::All
    }

    /// Returns `true` if `report` passes both the type and window filters.
    #[must_use]
    pub fn accepts(&self, report: &Report, now: DateTime<Utc>) -> bool {
        self.type_filter.matches(report.report_type)
            && within_window(report.effective_time(), self.time_filter, now)
    }
}

/// Returns the reports that pass `state`, in their original order.
#[must_use]
pub fn filter(reports: &[Report], state: FilterState, now: DateTime<Utc>) -> Vec<Report> {
    reports
        .iter()
        .filter(|r| state.accepts(r, now))
        .cloned()
        .collect()
}

/// Returns the distinct report types present, in first-seen order.
#[must_use]
pub fn report_types(reports: &[Report]) -> Vec<ReportType> {
    let mut seen = Vec::new();
    for report in reports {
        if !seen.contains(&report.report_type) {
            seen.push(report.report_type);
        }
    }
    seen
}
