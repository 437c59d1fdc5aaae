//! Elevation profiles for completed routes. Sampling the route and deriving
//! statistics happens locally, the elevations themselves are looked up via
//! an external service.

pub mod client;
pub mod profile;
