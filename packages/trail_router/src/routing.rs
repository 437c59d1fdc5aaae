//! This module covers everything which happens once a graph is available:
//! snapping clicks to nodes, finding paths between them, and maintaining an
//! editable route made up of waypoints and the segments between them.

pub mod route;
pub mod router;
pub mod session;
pub mod structs;
