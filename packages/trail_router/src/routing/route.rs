//! The route being built by the user. A route is an ordered list of
//! waypoints, plus one segment per waypoint connecting it to the waypoint
//! before it. Segment 0 has nothing to connect to, so it is a single point
//! marker sitting on the first waypoint.
//!
//! Routes are never edited in place. Every operation returns a new Route,
//! reusing the segments which weren't affected by the change, so only the one
//! or two segments touching an edited waypoint ever need to be routed again.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::error::RouteError;
use crate::common::geodesy::LatLon;
use crate::elevation::profile::ElevationProfile;
use crate::routing::router::Router;
use crate::routing::structs::{RouteSegment, Waypoint};

/// Connect two waypoints, preferring a path through the graph. If either
/// waypoint isn't bound to the graph, or the graph has no path between them,
/// a straight line is used instead, so this always produces a segment.
pub fn route_with_fallback(
    router: &Router,
    prev: &Waypoint,
    cur: &Waypoint,
) -> RouteSegment {
    if let (Some(from), Some(to)) = (prev.node_id(), cur.node_id()) {
        if let Some(segment) = router.route(&from, &to) {
            return segment;
        }
        debug!(?from, ?to, "falling back to a straight segment");
    }
    router.create_straight_segment(prev.coords(), cur.coords())
}

/// Raw contents of a route, used to validate routes which arrive from outside
/// the crate
#[derive(Deserialize)]
struct RouteParts {
    waypoints: Vec<Waypoint>,
    segments: Vec<RouteSegment>,
    #[serde(default)]
    elevation: Option<ElevationProfile>,
}

impl TryFrom<RouteParts> for Route {
    type Error = RouteError;

    fn try_from(parts: RouteParts) -> Result<Route, RouteError> {
        let mut route = Route::new(parts.waypoints, parts.segments)?;
        route.elevation = parts.elevation;
        Ok(route)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RouteParts")]
pub struct Route {
    waypoints: Vec<Waypoint>,
    segments: Vec<RouteSegment>,
    total_distance: f64,
    elevation: Option<ElevationProfile>,
}

impl Route {
    /// Assemble a route from its parts, rejecting any combination where the
    /// segments don't line up with the waypoints
    pub fn new(
        waypoints: Vec<Waypoint>,
        segments: Vec<RouteSegment>,
    ) -> Result<Route, RouteError> {
        if waypoints.len() != segments.len() {
            return Err(RouteError::SegmentCountMismatch {
                waypoints: waypoints.len(),
                segments: segments.len(),
            });
        }

        let total_distance = segments.iter().map(|segment| segment.distance).sum();

        Ok(Route {
            waypoints,
            segments,
            total_distance,
            elevation: None,
        })
    }

    /// Internal constructor for parts which are consistent by construction
    fn assemble(waypoints: Vec<Waypoint>, segments: Vec<RouteSegment>) -> Route {
        debug_assert_eq!(waypoints.len(), segments.len());
        let total_distance = segments.iter().map(|segment| segment.distance).sum();
        Route {
            waypoints,
            segments,
            total_distance,
            elevation: None,
        }
    }

    pub fn empty() -> Route {
        Route::default()
    }

    /// Build a route from scratch, routing between every consecutive pair of
    /// waypoints
    pub fn from_waypoints(waypoints: Vec<Waypoint>, router: &Router) -> Route {
        let mut segments = Vec::with_capacity(waypoints.len());

        for (inx, waypoint) in waypoints.iter().enumerate() {
            let segment = match inx {
                0 => RouteSegment::marker(waypoint.coords()),
                _ => route_with_fallback(router, &waypoints[inx - 1], waypoint),
            };
            segments.push(segment);
        }

        Route::assemble(waypoints, segments)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn elevation(&self) -> Option<&ElevationProfile> {
        self.elevation.as_ref()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The full polyline of the route. Where a segment starts on the point
    /// the previous segment finished on, that point is only included once.
    pub fn coordinates(&self) -> Vec<LatLon> {
        let mut coords: Vec<LatLon> = Vec::new();
        for segment in self.segments.iter() {
            for (inx, coord) in segment.coordinates.iter().enumerate() {
                let duplicate = inx == 0
                    && coords.last().is_some_and(|last| last.approx_eq(coord));
                if !duplicate {
                    coords.push(*coord);
                }
            }
        }
        coords
    }

    /// Return a copy of this route with the provided elevation profile
    /// attached
    pub fn with_elevation(&self, profile: ElevationProfile) -> Route {
        let mut route = self.clone();
        route.elevation = Some(profile);
        route
    }

    fn check_index(&self, index: usize) -> Result<(), RouteError> {
        if index >= self.waypoints.len() {
            return Err(RouteError::WaypointOutOfRange {
                index,
                len: self.waypoints.len(),
            });
        }
        Ok(())
    }

    /// Work out where a new waypoint belongs. A node waypoint which sits
    /// part way along an existing segment splits that segment, anything else
    /// is added to the end of the route. Segment ends are ignored, so picking
    /// an existing waypoint (e.g. the start, to close a loop) appends it.
    /// Coordinates are compared with a small tolerance rather than exact
    /// equality.
    fn insertion_index(&self, waypoint: &Waypoint) -> usize {
        if let Waypoint::Node { .. } = waypoint {
            let coords = waypoint.coords();
            for (inx, segment) in self.segments.iter().enumerate().skip(1) {
                if segment.passes_through_interior(&coords) {
                    return inx;
                }
            }
        }
        self.waypoints.len()
    }

    /// Add a waypoint to the route, either splitting the segment it lies on
    /// or extending the end of the route
    pub fn add_waypoint(&self, waypoint: Waypoint, router: &Router) -> Route {
        let index = self.insertion_index(&waypoint);
        debug!(index, "adding waypoint");
        self.insert_at(index, waypoint, router)
    }

    /// Insert a waypoint so that it ends up at the provided index. Index may
    /// be equal to the number of waypoints, in which case the waypoint is
    /// appended.
    pub fn insert_waypoint(
        &self,
        index: usize,
        waypoint: Waypoint,
        router: &Router,
    ) -> Result<Route, RouteError> {
        if index > self.waypoints.len() {
            return Err(RouteError::WaypointOutOfRange {
                index,
                len: self.waypoints.len(),
            });
        }
        Ok(self.insert_at(index, waypoint, router))
    }

    fn insert_at(&self, index: usize, waypoint: Waypoint, router: &Router) -> Route {
        let mut waypoints = self.waypoints.clone();
        waypoints.insert(index, waypoint);

        let mut segments = Vec::with_capacity(waypoints.len());
        segments.extend_from_slice(&self.segments[..index]);

        // Connection into the new waypoint
        segments.push(match index {
            0 => RouteSegment::marker(waypoint.coords()),
            _ => route_with_fallback(router, &waypoints[index - 1], &waypoint),
        });

        // Connection out of the new waypoint replaces the old connection into
        // the waypoint which now follows it
        if index + 1 < waypoints.len() {
            segments.push(route_with_fallback(
                router,
                &waypoint,
                &waypoints[index + 1],
            ));
            segments.extend_from_slice(&self.segments[index + 1..]);
        }

        Route::assemble(waypoints, segments)
    }

    /// Remove a waypoint. The waypoints either side of it are joined up with
    /// a new segment, every other segment is kept as it was.
    pub fn delete_waypoint(
        &self,
        index: usize,
        router: &Router,
    ) -> Result<Route, RouteError> {
        self.check_index(index)?;

        if self.waypoints.len() == 1 {
            return Ok(Route::empty());
        }

        let mut waypoints = self.waypoints.clone();
        waypoints.remove(index);

        let mut segments = Vec::with_capacity(waypoints.len());
        segments.extend_from_slice(&self.segments[..index]);

        if index < waypoints.len() {
            segments.push(match index {
                0 => RouteSegment::marker(waypoints[0].coords()),
                _ => route_with_fallback(router, &waypoints[index - 1], &waypoints[index]),
            });
            segments.extend_from_slice(&self.segments[index + 2..]);
        }

        debug!(index, remaining = waypoints.len(), "deleted waypoint");
        Ok(Route::assemble(waypoints, segments))
    }

    /// Swap the waypoint at index for a new one, usually at the end of a drag
    /// gesture, and recalculate the segments either side of it
    pub fn move_waypoint(
        &self,
        index: usize,
        waypoint: Waypoint,
        router: &Router,
    ) -> Result<Route, RouteError> {
        self.check_index(index)?;

        let mut moved = self.clone();
        moved.waypoints[index] = waypoint;
        moved.recalculate_affected_segments(index, router)
    }

    /// Recalculate the segments into and out of the waypoint at index, after
    /// it has moved. Segment 0 is never routed, but its marker is kept on
    /// top of the first waypoint.
    pub fn recalculate_affected_segments(
        &self,
        index: usize,
        router: &Router,
    ) -> Result<Route, RouteError> {
        self.check_index(index)?;

        let waypoints = self.waypoints.clone();
        let mut segments = self.segments.clone();

        segments[index] = match index {
            0 => RouteSegment::marker(waypoints[0].coords()),
            _ => route_with_fallback(router, &waypoints[index - 1], &waypoints[index]),
        };

        if index + 1 < waypoints.len() {
            segments[index + 1] =
                route_with_fallback(router, &waypoints[index], &waypoints[index + 1]);
        }

        Ok(Route::assemble(waypoints, segments))
    }

    /// Rebuild every segment. Needed once the router has been replaced, as
    /// the old geometry may not exist in the new graph.
    pub fn recalculate_all_segments(&self, router: &Router) -> Route {
        Route::from_waypoints(self.waypoints.clone(), router)
    }
}
