//! Defines the pieces a route is assembled from: the waypoints placed by the
//! user, and the segments which connect them

use serde::{Deserialize, Serialize};

use crate::common::geodesy::{LatLon, distance_meters};
use crate::common::graph_data::NodeId;

/// A point the user has placed on the map. Node waypoints are bound to a node
/// in the routing graph, custom waypoints float freely and are always joined
/// to their neighbours with straight lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Waypoint {
    Node { lat: f64, lon: f64, node_id: NodeId },
    Custom { lat: f64, lon: f64 },
}

impl Waypoint {
    pub fn coords(&self) -> LatLon {
        match self {
            Waypoint::Node { lat, lon, .. } => LatLon::new(*lat, *lon),
            Waypoint::Custom { lat, lon } => LatLon::new(*lat, *lon),
        }
    }

    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Waypoint::Node { node_id, .. } => Some(*node_id),
            Waypoint::Custom { .. } => None,
        }
    }
}

/// The polyline connecting a waypoint to the one before it, along with its
/// length in meters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub coordinates: Vec<LatLon>,
    pub distance: f64,
}

impl RouteSegment {
    /// Degenerate segment used for the first waypoint of a route, which has
    /// nothing before it to connect to
    pub fn marker(coord: LatLon) -> RouteSegment {
        RouteSegment {
            coordinates: vec![coord],
            distance: 0.0,
        }
    }

    /// Two point segment joining from and to directly
    pub fn straight(from: LatLon, to: LatLon) -> RouteSegment {
        RouteSegment {
            coordinates: vec![from, to],
            distance: distance_meters(from, to),
        }
    }

    /// Check whether the provided location appears anywhere along this
    /// segment's polyline
    pub fn passes_through(&self, coord: &LatLon) -> bool {
        self.coordinates.iter().any(|point| point.approx_eq(coord))
    }

    /// As passes_through, but ignoring the two ends of the segment, which
    /// sit on top of the waypoints it connects
    pub fn passes_through_interior(&self, coord: &LatLon) -> bool {
        match self.coordinates.len() {
            0..=2 => false,
            len => self.coordinates[1..len - 1]
                .iter()
                .any(|point| point.approx_eq(coord)),
        }
    }
}

#[cfg(test)]
mod tests {

    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_waypoint_accessors() {
        let node = Waypoint::Node {
            lat: 1.0,
            lon: 2.0,
            node_id: NodeId::Osm(5),
        };
        let custom = Waypoint::Custom { lat: 3.0, lon: 4.0 };

        assert_eq!(node.coords(), LatLon::new(1.0, 2.0));
        assert_eq!(node.node_id(), Some(NodeId::Osm(5)));
        assert_eq!(custom.coords(), LatLon::new(3.0, 4.0));
        assert_eq!(custom.node_id(), None);
    }

    /// Waypoints are exchanged with the frontend, check the JSON layout
    #[test]
    fn test_waypoint_json() {
        let node = Waypoint::Node {
            lat: 1.0,
            lon: 2.0,
            node_id: NodeId::Intermediate {
                way: 9,
                segment: 0,
                position: 3,
            },
        };

        let raw = serde_json::to_string(&node).unwrap();
        let back: Waypoint = serde_json::from_str(&raw).unwrap();

        assert!(raw.contains(r#""kind":"node""#));
        assert_eq!(back, node);

        let custom: Waypoint =
            serde_json::from_str(r#"{"kind": "custom", "lat": 3.0, "lon": 4.0}"#)
                .unwrap();
        assert_eq!(custom, Waypoint::Custom { lat: 3.0, lon: 4.0 });
    }

    #[test]
    fn test_marker() {
        let result = RouteSegment::marker(LatLon::new(1.0, 2.0));

        assert_eq!(result.coordinates, vec![LatLon::new(1.0, 2.0)]);
        assert_eq!(result.distance, 0.0);
    }

    #[test]
    fn test_straight() {
        let from = LatLon::new(50.0, 10.0);
        let to = LatLon::new(50.001, 10.0);

        let result = RouteSegment::straight(from, to);

        assert_eq!(result.coordinates, vec![from, to]);
        assert_abs_diff_eq!(result.distance, 111.195, epsilon = 0.01);
    }

    #[test]
    fn test_passes_through() {
        let segment = RouteSegment {
            coordinates: vec![
                LatLon::new(50.0, 10.0),
                LatLon::new(50.0001, 10.0),
                LatLon::new(50.0002, 10.0),
            ],
            distance: 22.0,
        };

        assert!(segment.passes_through(&LatLon::new(50.0001, 10.0)));
        assert!(!segment.passes_through(&LatLon::new(50.00015, 10.0)));
    }

    #[test]
    fn test_passes_through_interior() {
        let segment = RouteSegment {
            coordinates: vec![
                LatLon::new(50.0, 10.0),
                LatLon::new(50.0001, 10.0),
                LatLon::new(50.0002, 10.0),
            ],
            distance: 22.0,
        };
        let straight =
            RouteSegment::straight(LatLon::new(50.0, 10.0), LatLon::new(50.1, 10.0));

        assert!(segment.passes_through_interior(&LatLon::new(50.0001, 10.0)));
        assert!(!segment.passes_through_interior(&LatLon::new(50.0, 10.0)));
        assert!(!segment.passes_through_interior(&LatLon::new(50.0002, 10.0)));
        assert!(!straight.passes_through_interior(&LatLon::new(50.0, 10.0)));
    }
}
