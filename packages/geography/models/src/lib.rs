#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate and bounding box types.
//!
//! These are the geographic primitives shared by report storage, distance
//! ranking, and marker generation. All values are WGS84 degrees.

use serde::{Deserialize, Serialize};

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, `[-90, 90]`.
    pub lat: f64,
    /// Longitude in degrees, `[-180, 180]`.
    pub lng: f64,
}

impl Coordinate {
    /// Creates a new coordinate. No range checking is performed; see
    /// [`Self::is_valid`].
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` if latitude and longitude are finite and within
    /// their WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Builds a coordinate from an optional latitude/longitude pair,
    /// returning `None` unless both halves are present and valid.
    #[must_use]
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self::new(lat, lng)).filter(Self::is_valid),
            _ => None,
        }
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Returns the smallest box covering every point, or `None` if the
    /// iterator is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        points.into_iter().fold(None, |acc, p| {
            Some(acc.map_or_else(
                || Self::new(p.lng, p.lat, p.lng, p.lat),
                |b: Self| {
                    Self::new(
                        b.west.min(p.lng),
                        b.south.min(p.lat),
                        b.east.max(p.lng),
                        b.north.max(p.lat),
                    )
                },
            ))
        })
    }

    /// Expands every side by `ratio` times the box's span on that axis.
    ///
    /// A single-point box has zero span and is returned unchanged.
    #[must_use]
    pub fn pad(self, ratio: f64) -> Self {
        let lat_pad = (self.north - self.south).abs() * ratio;
        let lng_pad = (self.east - self.west).abs() * ratio;
        Self::new(
            self.west - lng_pad,
            self.south - lat_pad,
            self.east + lng_pad,
            self.north + lat_pad,
        )
    }

    /// Returns `true` if the point lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.south..=self.north).contains(&point.lat)
            && (self.west..=self.east).contains(&point.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_ranges() {
        assert!(Coordinate::new(34.05, -118.24).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn from_parts_requires_both_halves() {
        assert_eq!(
            Coordinate::from_parts(Some(1.0), Some(2.0)),
            Some(Coordinate::new(1.0, 2.0))
        );
        assert!(Coordinate::from_parts(Some(1.0), None).is_none());
        assert!(Coordinate::from_parts(None, Some(2.0)).is_none());
        assert!(Coordinate::from_parts(Some(100.0), Some(2.0)).is_none());
    }

    #[test]
    fn bounding_box_covers_all_points() {
        let bbox = BoundingBox::from_points([
            Coordinate::new(34.0, -118.5),
            Coordinate::new(34.2, -118.1),
            Coordinate::new(33.9, -118.3),
        ])
        .unwrap();

        assert_eq!(bbox, BoundingBox::new(-118.5, 33.9, -118.1, 34.2));
        assert!(bbox.contains(Coordinate::new(34.0, -118.3)));
        assert!(!bbox.contains(Coordinate::new(35.0, -118.3)));
    }

    #[test]
    fn bounding_box_of_nothing_is_none() {
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn pad_expands_by_span() {
        let padded = BoundingBox::new(0.0, 0.0, 10.0, 20.0).pad(0.1);
        assert!((padded.west - -1.0).abs() < 1e-9);
        assert!((padded.east - 11.0).abs() < 1e-9);
        assert!((padded.south - -2.0).abs() < 1e-9);
        assert!((padded.north - 22.0).abs() < 1e-9);
    }

    #[test]
    fn coordinate_serializes_as_lat_lng() {
        let json = serde_json::to_value(Coordinate::new(1.5, -2.5)).unwrap();
        assert_eq!(json, serde_json::json!({ "lat": 1.5, "lng": -2.5 }));
    }
}
