//! Error types for the operations which can genuinely fail. Anything the
//! routing core recovers from by itself (no path, no nearby node, dangling
//! references in the trail data) is expressed as an Option instead.

use thiserror::Error;

/// Raised when a route is constructed or edited in a way which would break
/// its internal consistency
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route has {waypoints} waypoints but {segments} segments")]
    SegmentCountMismatch { waypoints: usize, segments: usize },
    #[error("waypoint {index} does not exist, route has {len} waypoints")]
    WaypointOutOfRange { index: usize, len: usize },
}

/// Raised when trail data could not be retrieved for a bounding box
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid bounding box: {0}")]
    InvalidBounds(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Raised when a single batch of elevations could not be retrieved
#[derive(Debug, Error)]
pub enum ElevationError {
    #[error("elevation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("elevation service returned {received} values for {expected} points")]
    CountMismatch { expected: usize, received: usize },
}
