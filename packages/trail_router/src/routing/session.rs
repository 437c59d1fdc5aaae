//! Holds the route a user is currently editing, along with the router it was
//! built against. Every change produces a new Route which replaces the
//! canonical one, so an edit which is still being previewed (e.g. a waypoint
//! part way through a drag) never leaks into the route until it is committed.
//!
//! Elevation profiles are fetched in the background, and may arrive after the
//! route or the router has moved on. Each change bumps a generation counter;
//! profiles requested under an older generation are discarded.

use std::sync::Arc;

use tracing::{debug, info};

use crate::common::error::RouteError;
use crate::elevation::profile::ElevationProfile;
use crate::routing::route::Route;
use crate::routing::router::Router;
use crate::routing::structs::Waypoint;

pub struct RouteSession {
    route: Route,
    router: Arc<Router>,
    generation: u64,
}

impl RouteSession {
    pub fn new(router: Arc<Router>) -> RouteSession {
        RouteSession {
            route: Route::empty(),
            router,
            generation: 0,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn replace_route(&mut self, route: Route) {
        self.route = route;
        self.generation += 1;
    }

    /// Turn a click into a waypoint against the current router
    pub fn snap(&self, lat: f64, lon: f64, radius: f64) -> Waypoint {
        self.router.snap(lat, lon, radius)
    }

    pub fn add_waypoint(&mut self, waypoint: Waypoint) -> &Route {
        let route = self.route.add_waypoint(waypoint, &self.router);
        self.replace_route(route);
        &self.route
    }

    pub fn delete_waypoint(&mut self, index: usize) -> Result<&Route, RouteError> {
        let route = self.route.delete_waypoint(index, &self.router)?;
        self.replace_route(route);
        Ok(&self.route)
    }

    pub fn move_waypoint(
        &mut self,
        index: usize,
        waypoint: Waypoint,
    ) -> Result<&Route, RouteError> {
        let route = self.route.move_waypoint(index, waypoint, &self.router)?;
        self.replace_route(route);
        Ok(&self.route)
    }

    /// Work out what the route would look like with the waypoint at index
    /// moved, without changing the canonical route. Used while a drag is in
    /// progress.
    pub fn preview_move(
        &self,
        index: usize,
        waypoint: Waypoint,
    ) -> Result<Route, RouteError> {
        self.route.move_waypoint(index, waypoint, &self.router)
    }

    /// Promote a previewed route to be the canonical route
    pub fn commit(&mut self, preview: Route) -> &Route {
        self.replace_route(preview);
        &self.route
    }

    /// Swap in a router built from fresh trail data. The old segments may
    /// reference nodes which no longer exist, so every segment is rebuilt.
    pub fn replace_router(&mut self, router: Arc<Router>) -> &Route {
        self.router = router;
        let route = self.route.recalculate_all_segments(&self.router);
        self.replace_route(route);
        info!(
            generation = self.generation,
            waypoints = self.route.len(),
            "router replaced, route recalculated"
        );
        &self.route
    }

    /// Snapshot of the route to fetch an elevation profile for, tagged with
    /// the generation it was taken at
    pub fn elevation_ticket(&self) -> (u64, Route) {
        (self.generation, self.route.clone())
    }

    /// Attach an elevation profile to the route, but only if nothing has
    /// changed since the matching ticket was issued. Returns whether the
    /// profile was applied.
    pub fn apply_elevation(&mut self, generation: u64, profile: ElevationProfile) -> bool {
        if generation != self.generation {
            debug!(
                ticket = generation,
                current = self.generation,
                "discarding stale elevation profile"
            );
            return false;
        }
        self.route = self.route.with_elevation(profile);
        true
    }
}
