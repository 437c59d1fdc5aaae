//! Great-circle calculations on a spherical earth. These are thin wrappers
//! around the haversine implementations provided by geo, operating on the
//! LatLon coordinates used throughout this crate.

use geo::{Bearing, Destination, Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Tolerance (in degrees) used when deciding whether two coordinates refer to
/// the same location. Roughly 0.1mm on the ground.
pub const COORD_EPSILON: f64 = 1e-9;

/// A single location on the surface of the earth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        LatLon { lat, lon }
    }

    /// Check whether two coordinates are the same to within COORD_EPSILON
    pub fn approx_eq(&self, other: &LatLon) -> bool {
        (self.lat - other.lat).abs() <= COORD_EPSILON
            && (self.lon - other.lon).abs() <= COORD_EPSILON
    }
}

impl From<LatLon> for Point {
    fn from(coord: LatLon) -> Point {
        Point::new(coord.lon, coord.lat)
    }
}

impl From<Point> for LatLon {
    fn from(point: Point) -> LatLon {
        LatLon {
            lat: point.y(),
            lon: point.x(),
        }
    }
}

/// Great-circle distance between two points, in meters
pub fn distance_meters(p1: LatLon, p2: LatLon) -> f64 {
    Haversine::distance(Point::from(p1), Point::from(p2))
}

/// Initial bearing when travelling from p1 towards p2, in degrees clockwise
/// from north
pub fn bearing_degrees(p1: LatLon, p2: LatLon) -> f64 {
    Haversine::bearing(Point::from(p1), Point::from(p2))
}

/// The point reached by travelling distance_meters from origin along the
/// provided initial bearing
pub fn destination_point(
    origin: LatLon,
    distance_meters: f64,
    bearing_degrees: f64,
) -> LatLon {
    Haversine::destination(Point::from(origin), bearing_degrees, distance_meters)
        .into()
}
