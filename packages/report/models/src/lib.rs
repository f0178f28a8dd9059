#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident report types and the report type taxonomy.
//!
//! A [`Report`] is a single community sighting: what was seen, where, and
//! when. Reports are created once by the persistence layer (which assigns
//! the `id` and `timestamp`) and never mutated afterwards.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use safety_map_geography_models::Coordinate;

/// The kind of activity a report describes.
///
/// Collaborators treat the type as an open string. Anything that does not
/// parse as one of the known variants is folded into [`ReportType::Other`]
/// so that unknown values still render with default styling.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReportType {
    /// Officers patrolling an area on foot or by vehicle
    #[strum(to_string = "patrol", serialize = "patrulla")]
    Patrol,
    /// A fixed checkpoint stopping vehicles or pedestrians
    Checkpoint,
    /// A raid on a home or workplace
    Raid,
    /// Anything else, including unrecognized type strings
    Other,
}

impl ReportType {
    /// Parses a type string leniently, falling back to [`Self::Other`].
    #[must_use]
    pub fn from_label(value: &str) -> Self {
        value.trim().parse().unwrap_or(Self::Other)
    }

    /// Human-readable title used on cards and map popups.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Patrol => "Patrol",
            Self::Checkpoint => "Checkpoint",
            Self::Raid => "Raid",
            Self::Other => "Other",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Patrol, Self::Checkpoint, Self::Raid, Self::Other]
    }
}

impl<'de> Deserialize<'de> for ReportType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_label(&value))
    }
}

/// A single incident report as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Opaque unique identifier assigned by the persistence layer.
    pub id: String,
    /// Free-text address or description of where the activity was seen.
    pub location_text: Option<String>,
    /// Kind of activity.
    #[serde(rename = "type")]
    pub report_type: ReportType,
    /// Free-text description.
    pub notes: Option<String>,
    /// User-entered approximate time the activity was seen.
    pub time_seen: Option<String>,
    /// Server-assigned creation time. Authoritative when present.
    pub timestamp: Option<DateTime<Utc>>,
    /// Geocoded position of `location_text`, if geocoding succeeded.
    pub coordinates: Option<Coordinate>,
}

impl Report {
    /// Returns the time used for age and window calculations.
    ///
    /// The server `timestamp` wins; otherwise `time_seen` is parsed on a
    /// best-effort basis (see [`parse_time_seen`]).
    #[must_use]
    pub fn effective_time(&self) -> EffectiveTime {
        if let Some(ts) = self.timestamp {
            return EffectiveTime::Server(ts);
        }

        self.time_seen
            .as_deref()
            .and_then(parse_time_seen)
            .map_or(EffectiveTime::Unknown, EffectiveTime::Seen)
    }

    /// Returns `true` if the report can be placed on a map.
    #[must_use]
    pub const fn is_mappable(&self) -> bool {
        self.coordinates.is_some()
    }
}

/// The time a report is considered to have happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveTime {
    /// Authoritative server-assigned creation time.
    Server(DateTime<Utc>),
    /// Parsed from the user-entered `time_seen` text.
    Seen(DateTime<Utc>),
    /// Neither a timestamp nor a parseable `time_seen` was available.
    Unknown,
}

impl EffectiveTime {
    /// Returns the instant, if one is known.
    #[must_use]
    pub const fn instant(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Server(ts) | Self::Seen(ts) => Some(ts),
            Self::Unknown => None,
        }
    }
}

/// A report as submitted by the reporting form, before the persistence
/// layer assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    /// Free-text location.
    #[serde(default)]
    pub location_text: Option<String>,
    /// Kind of activity (lenient, see [`ReportType::from_label`]).
    #[serde(rename = "type")]
    pub report_type: String,
    /// Free-text description.
    #[serde(default)]
    pub notes: Option<String>,
    /// Approximate time the activity was seen.
    #[serde(default)]
    pub time_seen: Option<String>,
}

impl NewReport {
    /// Trims every text field and drops the ones left empty.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            location_text: non_empty(self.location_text),
            report_type: self.report_type.trim().to_string(),
            notes: non_empty(self.notes),
            time_seen: non_empty(self.time_seen),
        }
    }

    /// Builds the stored [`Report`] from this submission.
    #[must_use]
    pub fn into_report(
        self,
        id: String,
        timestamp: DateTime<Utc>,
        coordinates: Option<Coordinate>,
    ) -> Report {
        let normalized = self.normalized();
        Report {
            id,
            location_text: normalized.location_text,
            report_type: ReportType::from_label(&normalized.report_type),
            notes: normalized.notes,
            time_seen: normalized.time_seen,
            timestamp: Some(timestamp),
            coordinates,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Naive date-time layouts accepted for `time_seen`, interpreted as UTC.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    // date picker long form, e.g. "Jan 5, 2025, 3:04 PM"
    "%b %d, %Y, %I:%M %p",
];

/// Date-only layouts accepted for `time_seen`, taken as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d, %Y"];

/// Parses user-entered `time_seen` text.
///
/// Accepts RFC 3339 and a handful of common layouts. Returns `None` for
/// anything else; free text such as `"this morning"` is never guessed at.
#[must_use]
pub fn parse_time_seen(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn report(timestamp: Option<DateTime<Utc>>, time_seen: Option<&str>) -> Report {
        Report {
            id: "r1".to_string(),
            location_text: None,
            report_type: ReportType::Patrol,
            notes: None,
            time_seen: time_seen.map(String::from),
            timestamp,
            coordinates: None,
        }
    }

    #[test]
    fn parses_known_types_case_insensitively() {
        assert_eq!(ReportType::from_label("raid"), ReportType::Raid);
        assert_eq!(ReportType::from_label("Raid"), ReportType::Raid);
        assert_eq!(
            ReportType::from_label(" CHECKPOINT "),
            ReportType::Checkpoint
        );
        assert_eq!(ReportType::from_label("Patrulla"), ReportType::Patrol);
        assert_eq!(ReportType::from_label("patrol"), ReportType::Patrol);
    }

    #[test]
    fn unknown_types_fold_into_other() {
        assert_eq!(ReportType::from_label(""), ReportType::Other);
        assert_eq!(ReportType::from_label("helicopter"), ReportType::Other);
    }

    #[test]
    fn type_display_is_canonical() {
        assert_eq!(ReportType::Patrol.to_string(), "patrol");
        assert_eq!(ReportType::Raid.as_ref(), "raid");
        for t in ReportType::all() {
            assert_eq!(ReportType::from_label(&t.to_string()), *t);
        }
    }

    #[test]
    fn report_json_uses_type_key() {
        let json = serde_json::json!({
            "id": "abc",
            "locationText": "5th and Main",
            "type": "Patrulla",
            "notes": null,
            "timeSeen": null,
            "timestamp": "2025-01-05T15:04:00Z",
            "coordinates": { "lat": 34.0, "lng": -118.0 }
        });
        let parsed: Report = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.report_type, ReportType::Patrol);
        assert!(parsed.is_mappable());

        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["type"], "patrol");
    }

    #[test]
    fn timestamp_wins_over_time_seen() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap();
        let r = report(Some(ts), Some("2020-01-01 00:00"));
        assert_eq!(r.effective_time(), EffectiveTime::Server(ts));
    }

    #[test]
    fn falls_back_to_time_seen() {
        let r = report(None, Some("2025-01-05 15:04"));
        assert_eq!(
            r.effective_time(),
            EffectiveTime::Seen(Utc.with_ymd_and_hms(2025, 1, 5, 15, 4, 0).unwrap())
        );
    }

    #[test]
    fn unparseable_time_seen_is_unknown() {
        assert_eq!(
            report(None, Some("this morning")).effective_time(),
            EffectiveTime::Unknown
        );
        assert_eq!(report(None, None).effective_time(), EffectiveTime::Unknown);
    }

    #[test]
    fn parses_date_picker_formats() {
        assert_eq!(
            parse_time_seen("Jan 5, 2025, 3:04 PM"),
            Some(Utc.with_ymd_and_hms(2025, 1, 5, 15, 4, 0).unwrap())
        );
        assert_eq!(
            parse_time_seen("Jan 5, 2025"),
            Some(Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_time_seen("2025-01-05T15:04:00-08:00"),
            Some(Utc.with_ymd_and_hms(2025, 1, 5, 23, 4, 0).unwrap())
        );
        assert!(parse_time_seen("   ").is_none());
    }

    #[test]
    fn new_report_drops_blank_fields() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap();
        let submitted = NewReport {
            location_text: Some("  ".to_string()),
            report_type: "Raid".to_string(),
            notes: Some(" two vans ".to_string()),
            time_seen: Some(String::new()),
        };

        let stored = submitted.into_report("id-1".to_string(), ts, None);
        assert_eq!(stored.location_text, None);
        assert_eq!(stored.notes.as_deref(), Some("two vans"));
        assert_eq!(stored.time_seen, None);
        assert_eq!(stored.report_type, ReportType::Raid);
        assert_eq!(stored.timestamp, Some(ts));
    }
}
