use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Graph};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::common::geodesy::{
    LatLon, bearing_degrees, destination_point, distance_meters,
};
use crate::common::graph_data::{EdgeData, NodeData, NodeId};
use crate::loading::structs::{RawNode, RawWay};

/// Weight applied to ways without a highway tag, or with a tag which isn't
/// listed in highway_weight
pub const DEFAULT_HIGHWAY_WEIGHT: f64 = 1.5;

/// Routing preference for each type of highway. Physical distances are
/// multiplied by this value, so lower values are preferred. Foot-friendly
/// paths sit close to 1.0, roads shared with traffic approach 2.0.
pub fn highway_weight(highway: Option<&str>) -> f64 {
    match highway {
        Some("footway") | Some("path") | Some("pedestrian") => 1.0,
        Some("track") | Some("bridleway") => 1.1,
        Some("steps") => 1.2,
        Some("cycleway") => 1.3,
        Some("living_street") => 1.4,
        Some("service") => 1.5,
        Some("residential") | Some("unclassified") => 1.6,
        Some("tertiary") => 1.8,
        Some("secondary") => 1.9,
        Some("primary") | Some("trunk") => 2.0,
        _ => DEFAULT_HIGHWAY_WEIGHT,
    }
}

/// The graph used for routing, along with a lookup from node identifiers to
/// their position in the graph
#[derive(Debug, Clone, Default)]
pub struct RoutingGraph {
    graph: Graph<NodeData, EdgeData, Directed, u32>,
    node_lookup: FxHashMap<NodeId, NodeIndex>,
}

impl RoutingGraph {
    pub fn graph(&self) -> &Graph<NodeData, EdgeData, Directed, u32> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn index_of(&self, id: &NodeId) -> Option<NodeIndex> {
        self.node_lookup.get(id).copied()
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeData> {
        self.index_of(id)
            .and_then(|inx| self.graph.node_weight(inx))
    }

    /// All nodes, in the order they were added to the graph
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.graph.node_weights()
    }

    /// Every node which can be reached from the provided node via a single
    /// edge, along with the data for that edge
    pub fn neighbours(&self, id: &NodeId) -> Vec<(NodeId, &EdgeData)> {
        let Some(inx) = self.index_of(id) else {
            return Vec::new();
        };

        self.graph
            .edges(inx)
            .map(|eref| (self.graph[eref.target()].id, eref.weight()))
            .collect()
    }

    /// Add a node to the graph, unless a node with the same ID is already
    /// present
    fn insert_node(&mut self, data: NodeData) -> NodeIndex {
        if let Some(inx) = self.node_lookup.get(&data.id) {
            return *inx;
        }
        let inx = self.graph.add_node(data);
        self.node_lookup.insert(data.id, inx);
        inx
    }

    /// Link two nodes with a pair of directed edges carrying the same data
    fn insert_link(&mut self, src: NodeIndex, dst: NodeIndex, data: EdgeData) {
        self.graph.add_edge(dst, src, data.clone());
        self.graph.add_edge(src, dst, data);
    }
}

/// A single hop between two nodes, ready to be added to the graph
#[derive(Debug, Clone, PartialEq)]
struct Link {
    src: NodeId,
    dst: NodeId,
    distance: f64,
}

/// Everything a single way contributes to the graph
#[derive(Debug, Default)]
struct WayExpansion {
    intermediates: Vec<NodeData>,
    links: Vec<Link>,
    dangling: usize,
}

/// Generate the points which split a long stretch of way into hops no longer
/// than max_length. The returned list includes both endpoints.
fn subdivide_pair(
    way: i64,
    segment: u32,
    src: &NodeData,
    dst: &NodeData,
    distance: f64,
    max_length: f64,
) -> Vec<NodeData> {
    let steps = (distance / max_length).ceil() as u32;
    let bearing = bearing_degrees(src.coords(), dst.coords());

    let mut chain = Vec::with_capacity(steps as usize + 1);
    chain.push(*src);

    for position in 1..steps {
        let along = distance * (position as f64) / (steps as f64);
        let LatLon { lat, lon } =
            destination_point(src.coords(), along, bearing);
        chain.push(NodeData {
            id: NodeId::Intermediate {
                way,
                segment,
                position,
            },
            lat,
            lon,
            is_intermediate: true,
            origin_way: Some(way),
        });
    }

    chain.push(*dst);
    chain
}

/// Work out which hops and intermediate nodes a way adds to the graph. Only
/// reads from the graph, so ways can be expanded in parallel.
fn expand_way(
    way: &RawWay,
    routing: &RoutingGraph,
    max_length: f64,
) -> WayExpansion {
    let mut expansion = WayExpansion::default();

    for (segment, pair) in way.node_ids.windows(2).enumerate() {
        let (src_id, dst_id) = (NodeId::Osm(pair[0]), NodeId::Osm(pair[1]));

        let (src, dst) = match (routing.node(&src_id), routing.node(&dst_id)) {
            (Some(src), Some(dst)) => (src, dst),
            _ => {
                expansion.dangling += 1;
                continue;
            }
        };

        // Repeated node IDs would only ever produce zero length self-loops
        if src_id == dst_id {
            continue;
        }

        let distance = distance_meters(src.coords(), dst.coords());
        if max_length <= 0.0 || distance <= max_length {
            expansion.links.push(Link {
                src: src_id,
                dst: dst_id,
                distance,
            });
            continue;
        }

        let chain =
            subdivide_pair(way.id, segment as u32, src, dst, distance, max_length);
        for hop in chain.windows(2) {
            expansion.links.push(Link {
                src: hop[0].id,
                dst: hop[1].id,
                distance: distance_meters(hop[0].coords(), hop[1].coords()),
            });
        }
        expansion
            .intermediates
            .extend(chain[1..chain.len() - 1].iter().copied());
    }

    expansion
}

/// Based on the trail data which has been loaded for a bounding box, generate
/// a petgraph graph which can be used for route plotting. Any stretch of way
/// longer than max_segment_length is split up by intermediate nodes, so that
/// no edge in the graph is longer than max_segment_length.
pub fn create_graph(
    nodes: Vec<RawNode>,
    ways: &[RawWay],
    max_segment_length: f64,
) -> RoutingGraph {
    let mut routing = RoutingGraph::default();

    // Add all nodes to the graph, create mapping from source IDs to indexes
    for node in nodes {
        let id = NodeId::Osm(node.id);
        if routing.node_lookup.contains_key(&id) {
            debug!(node = node.id, "duplicate node in trail data, keeping first");
            continue;
        }
        routing.insert_node(NodeData {
            id,
            lat: node.lat,
            lon: node.lon,
            is_intermediate: false,
            origin_way: None,
        });
    }

    let expansions: Vec<WayExpansion> = ways
        .par_iter()
        .map(|way| expand_way(way, &routing, max_segment_length))
        .collect();

    let mut dangling = 0;
    for (way, expansion) in ways.iter().zip(expansions) {
        dangling += expansion.dangling;

        for data in expansion.intermediates {
            routing.insert_node(data);
        }

        let factor = highway_weight(way.highway());
        for link in expansion.links {
            // Both ends were either present already or have just been added
            let (Some(src), Some(dst)) =
                (routing.index_of(&link.src), routing.index_of(&link.dst))
            else {
                continue;
            };

            let edge_data = EdgeData {
                way: way.id,
                highway: way.highway().map(String::from),
                distance: link.distance,
                weight: link.distance * factor,
            };
            routing.insert_link(src, dst, edge_data);
        }
    }

    if dangling > 0 {
        warn!(
            skipped = dangling,
            "way segments referenced nodes missing from the trail data"
        );
    }

    info!(
        nodes = routing.node_count(),
        edges = routing.edge_count(),
        "routing graph created"
    );

    routing
}
