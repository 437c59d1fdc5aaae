//! Building blocks shared across the crate: coordinates and geodesic maths,
//! graph payloads, configuration and error types.

pub mod bbox;
pub mod config;
pub mod error;
pub mod geodesy;
pub mod graph_data;
