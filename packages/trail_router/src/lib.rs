//! Routing core for an interactive hiking route planner. Trail data for a
//! bounding box is turned into a subdivided, weighted graph, clicks on the
//! map are snapped onto it, and a multi-waypoint route is kept up to date
//! with as few shortest-path queries as possible.

pub mod common;
pub mod elevation;
pub mod loading;
pub mod routing;
