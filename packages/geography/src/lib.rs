#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Great-circle distance between report locations and the user.
//!
//! Distances are computed with the haversine formula on a spherical Earth
//! of radius [`EARTH_RADIUS_KM`]. Inputs are not range-checked; callers
//! validate coordinates with [`Coordinate::is_valid`] before they get here.

pub use safety_map_geography_models::{BoundingBox, Coordinate};

/// Mean Earth radius used for all distance calculations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Returns the great-circle distance between `a` and `b` in kilometers.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Formats a distance for display.
///
/// Distances under one kilometer render as whole meters (`"500 m"`),
/// everything else as kilometers with one decimal (`"1.5 km"`).
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m", (km * 1000.0).round())
    } else {
        format!("{km:.1} km")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        for p in [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(34.0522, -118.2437),
            Coordinate::new(-89.9, 179.9),
        ] {
            assert!(distance_km(p, p).abs() < 1e-9);
        }
    }

    #[test]
    fn los_angeles_to_san_francisco() {
        let la = Coordinate::new(34.0522, -118.2437);
        let sf = Coordinate::new(37.7749, -122.4194);
        let d = distance_km(la, sf);
        assert!((d - 559.1).abs() < 1.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(41.8827, -87.6278);
        let b = Coordinate::new(38.8951, -77.0364);
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn quarter_meridian() {
        let d = distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(90.0, 0.0));
        assert!(
            (d - EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2).abs() < 1e-6
        );
    }

    #[test]
    fn formats_meters_below_one_km() {
        assert_eq!(format_distance(0.5), "500 m");
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(0.0456), "46 m");
    }

    #[test]
    fn formats_kilometers_from_one_km() {
        assert_eq!(format_distance(1.5), "1.5 km");
        assert_eq!(format_distance(1.0), "1.0 km");
        assert_eq!(format_distance(12.34), "12.3 km");
    }
}
