//! This module focuses on retrieving trail data for a bounding box and
//! using it to generate a petgraph graph object which can be routed over.

pub mod petgraph;
pub mod postgres;
pub mod structs;
