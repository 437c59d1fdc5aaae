use serde::{Deserialize, Serialize};

use crate::common::geodesy::LatLon;

/// Identifies a node in the routing graph. Original nodes keep the identifier
/// they had in the trail data; intermediate nodes are named after the way and
/// segment they were inserted into, so rebuilding a graph from identical data
/// always produces identical identifiers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(untagged)]
pub enum NodeId {
    Osm(i64),
    Intermediate {
        way: i64,
        segment: u32,
        position: u32,
    },
}

/// Sets the data which will be stored as weights on nodes in the petgraph
/// graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeData {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
    pub is_intermediate: bool,
    pub origin_way: Option<i64>,
}

impl NodeData {
    pub fn coords(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

/// Container for edge metadata which will be stored in the graph. Distance is
/// the physical length of the edge, weight is the cost used while routing.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    pub way: i64,
    pub highway: Option<String>,
    pub distance: f64,
    pub weight: f64,
}
