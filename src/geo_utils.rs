//! # Geographic Utilities
//!
//! Core geographic computation for candidate ranking and route display.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`compute_bounds`] | Bounding box of a path, for fit-to-bounds camera moves |
//!
//! ## Coordinate System
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees),
//! which is what GPS receivers and the upstream mapping services deliver.

use crate::GpsPoint;
use geo::{Distance, Haversine, Point};

/// Calculate the great-circle distance between two GPS points using the
/// Haversine formula.
///
/// Returns the distance in meters along the Earth's surface (spherical
/// Earth, mean radius ~6,371 km).
///
/// # Example
///
/// ```rust
/// use bathroom_finder::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Bounding box for a set of GPS points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Compute the bounding box of a path.
///
/// Returns `None` for an empty path; a one-point path yields a degenerate
/// box at that point.
pub fn compute_bounds(points: &[GpsPoint]) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }
    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Some(Bounds {
        min_lat,
        max_lat,
        min_lng,
        max_lng,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GpsPoint::new(51.5074, -0.1278);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_symmetric() {
        let a = GpsPoint::new(51.5074, -0.1278);
        let b = GpsPoint::new(48.8566, 2.3522);
        let ab = haversine_distance(&a, &b);
        let ba = haversine_distance(&b, &a);
        assert!(approx_eq(ab, ba, 1e-9));
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // London to Paris is approximately 344 km
        let london = GpsPoint::new(51.5074, -0.1278);
        let paris = GpsPoint::new(48.8566, 2.3522);
        let dist = haversine_distance(&london, &paris);
        assert!(approx_eq(dist, 343_560.0, 5000.0)); // Within 5km
    }

    #[test]
    fn test_compute_bounds() {
        let path = vec![
            GpsPoint::new(51.50, -0.13),
            GpsPoint::new(51.51, -0.12),
            GpsPoint::new(51.505, -0.125),
        ];
        let bounds = compute_bounds(&path).unwrap();
        assert_eq!(bounds.min_lat, 51.50);
        assert_eq!(bounds.max_lat, 51.51);
        assert_eq!(bounds.min_lng, -0.13);
        assert_eq!(bounds.max_lng, -0.12);
    }

    #[test]
    fn test_compute_bounds_empty() {
        assert!(compute_bounds(&[]).is_none());
    }

    #[test]
    fn test_bounds_center() {
        let bounds = Bounds {
            min_lat: 51.50,
            max_lat: 51.52,
            min_lng: -0.12,
            max_lng: -0.10,
        };
        let center = bounds.center();
        assert!(approx_eq(center.latitude, 51.51, 1e-9));
        assert!(approx_eq(center.longitude, -0.11, 1e-9));
    }
}
