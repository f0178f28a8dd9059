//! Distance annotation relative to the user's position.
//!
//! Annotation never reorders. [`sort_by_distance`] is available for
//! callers that want nearest-first ordering on top.

use safety_map_geography::{Coordinate, distance_km, format_distance};
use safety_map_report_models::Report;
use serde::Serialize;

/// A report paired with its distance from the user, when known.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedReport {
    /// The report.
    pub report: Report,
    /// Great-circle distance from the user in kilometers.
    pub distance_km: Option<f64>,
    /// Display form of `distance_km`.
    pub distance_label: Option<String>,
}

/// Attaches a distance to each report.
///
/// A distance is present only when both `user` and the report's
/// coordinates are known.
#[must_use]
pub fn annotate(reports: &[Report], user: Option<Coordinate>) -> Vec<RankedReport> {
    reports
        .iter()
        .map(|report| {
            let km = user
                .zip(report.coordinates)
                .map(|(from, to)| distance_km(from, to));

            RankedReport {
                report: report.clone(),
                distance_km: km,
                distance_label: km.map(format_distance),
            }
        })
        .collect()
}

/// Stable nearest-first sort. Entries without a distance keep their
/// relative order and go last.
pub fn sort_by_distance(ranked: &mut [RankedReport]) {
    ranked.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use safety_map_report_models::ReportType;

    fn report(id: &str, coordinates: Option<Coordinate>) -> Report {
        Report {
            id: id.to_string(),
            location_text: None,
            report_type: ReportType::Patrol,
            notes: None,
            time_seen: None,
            timestamp: None,
            coordinates,
        }
    }

    fn sample() -> Vec<Report> {
        vec![
            report("far", Some(Coordinate::new(34.20, -118.24))),
            report("unmapped", None),
            report("near", Some(Coordinate::new(34.0525, -118.2437))),
        ]
    }

    #[test]
    fn no_user_means_no_labels() {
        let ranked = annotate(&sample(), None);
        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|r| r.distance_label.is_none()));
        assert!(ranked.iter().all(|r| r.distance_km.is_none()));
    }

    #[test]
    fn labels_only_mapped_reports_and_keeps_order() {
        let user = Coordinate::new(34.0522, -118.2437);
        let ranked = annotate(&sample(), Some(user));

        let ids: Vec<&str> = ranked.iter().map(|r| r.report.id.as_str()).collect();
        assert_eq!(ids, ["far", "unmapped", "near"]);

        assert_eq!(ranked[0].distance_label.as_deref(), Some("16.4 km"));
        assert!(ranked[1].distance_label.is_none());
        assert_eq!(ranked[2].distance_label.as_deref(), Some("33 m"));
    }

    #[test]
    fn sort_puts_nearest_first_and_unknown_last() {
        let user = Coordinate::new(34.0522, -118.2437);
        let mut ranked = annotate(&sample(), Some(user));
        sort_by_distance(&mut ranked);

        let ids: Vec<&str> = ranked.iter().map(|r| r.report.id.as_str()).collect();
        assert_eq!(ids, ["near", "far", "unmapped"]);
    }
}
