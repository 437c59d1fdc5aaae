//! Wraps a routing graph, providing the lookups needed while a route is being
//! edited: which node is closest to a click, and what is the best path
//! between two nodes.

use petgraph::algo::astar;
use tracing::{debug, warn};

use crate::common::geodesy::{LatLon, distance_meters};
use crate::common::graph_data::{NodeData, NodeId};
use crate::loading::petgraph::RoutingGraph;
use crate::routing::structs::{RouteSegment, Waypoint};

/// The closest node to a requested location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestNode {
    pub node_id: NodeId,
    pub distance: f64,
    pub node: NodeData,
}

pub struct Router {
    graph: RoutingGraph,
}

impl Router {
    pub fn new(graph: RoutingGraph) -> Router {
        Router { graph }
    }

    pub fn graph(&self) -> &RoutingGraph {
        &self.graph
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&NodeData> {
        self.graph.node(id)
    }

    /// Find the node closest to the provided location, so long as it is no
    /// further away than max_distance. Graphs only ever cover the visible
    /// map area, so a linear scan is quick enough. Where two nodes are
    /// exactly as close as each other, the first one added to the graph wins.
    pub fn find_nearest_node(
        &self,
        lat: f64,
        lon: f64,
        max_distance: f64,
    ) -> Option<NearestNode> {
        let target = LatLon::new(lat, lon);

        let mut closest: Option<(f64, &NodeData)> = None;
        for node in self.graph.nodes() {
            let dist = distance_meters(target, node.coords());
            match closest {
                Some((smallest, _)) if dist >= smallest => (),
                _ => closest = Some((dist, node)),
            }
        }

        match closest {
            Some((distance, node)) if distance <= max_distance => {
                Some(NearestNode {
                    node_id: node.id,
                    distance,
                    node: *node,
                })
            }
            _ => None,
        }
    }

    /// Turn a click on the map into a waypoint. If a node is within radius
    /// the waypoint is bound to it and moved onto it, otherwise the waypoint
    /// stays exactly where the user clicked.
    pub fn snap(&self, lat: f64, lon: f64, radius: f64) -> Waypoint {
        match self.find_nearest_node(lat, lon, radius) {
            Some(nearest) => Waypoint::Node {
                lat: nearest.node.lat,
                lon: nearest.node.lon,
                node_id: nearest.node_id,
            },
            None => Waypoint::Custom { lat, lon },
        }
    }

    /// Find the cheapest path between two nodes using A*. Edge weights are
    /// never smaller than the physical distance they cover, so straight line
    /// distance to the target is an admissible heuristic. Returns None if
    /// either node is unknown or no path exists between them.
    pub fn route(&self, from: &NodeId, to: &NodeId) -> Option<RouteSegment> {
        let (Some(start), Some(goal)) =
            (self.graph.index_of(from), self.graph.index_of(to))
        else {
            warn!(?from, ?to, "requested route between unknown nodes");
            return None;
        };

        let graph = self.graph.graph();
        let goal_coords = graph[goal].coords();

        let (_, mut path) = match astar(
            graph,
            start,
            |finish| finish == goal,
            |eref| eref.weight().weight,
            |inx| distance_meters(graph[inx].coords(), goal_coords),
        ) {
            Some(found) => found,
            None => {
                debug!(?from, ?to, "no path between nodes");
                return None;
            }
        };

        // Segments always run from the first node to the second
        if path.first() != Some(&start) {
            path.reverse();
        }

        let coordinates: Vec<LatLon> =
            path.iter().map(|inx| graph[*inx].coords()).collect();
        let distance = coordinates
            .windows(2)
            .map(|pair| distance_meters(pair[0], pair[1]))
            .sum();

        Some(RouteSegment {
            coordinates,
            distance,
        })
    }

    /// Join two locations directly, used whenever a waypoint isn't bound to
    /// the graph or no path could be found
    pub fn create_straight_segment(&self, from: LatLon, to: LatLon) -> RouteSegment {
        RouteSegment::straight(from, to)
    }
}

#[cfg(test)]
pub(crate) mod tests {

    use approx::assert_abs_diff_eq;
    use rustc_hash::FxHashMap;

    use super::*;
    use crate::common::config::DEFAULT_MAX_SEGMENT_LENGTH;
    use crate::loading::petgraph::create_graph;
    use crate::loading::structs::{RawNode, RawWay};

    /// Meters per degree of latitude
    pub(crate) const DEG_LAT: f64 = 111_194.93;

    pub(crate) fn raw_way(id: i64, node_ids: Vec<i64>, highway: &str) -> RawWay {
        let mut tags = FxHashMap::<String, String>::default();
        tags.insert("highway".to_string(), highway.to_string());
        RawWay { id, node_ids, tags }
    }

    /// A ladder shaped network running north from (50.0, 10.0). The western
    /// rail (1-2-3) is a road, the eastern rail (4-5-6) a footpath, and the
    /// rungs are footpaths. Node 7 & 8 form a separate island.
    ///
    /// ```text
    ///   3 ---- 6
    ///   |      |
    ///   2 ---- 5        7 ---- 8
    ///   |      |
    ///   1 ---- 4
    /// ```
    pub(crate) fn get_test_router() -> Router {
        let step = 20.0 / DEG_LAT;
        let nodes = vec![
            RawNode { id: 1, lat: 50.0, lon: 10.0 },
            RawNode { id: 2, lat: 50.0 + step, lon: 10.0 },
            RawNode { id: 3, lat: 50.0 + 2.0 * step, lon: 10.0 },
            RawNode { id: 4, lat: 50.0, lon: 10.0002 },
            RawNode { id: 5, lat: 50.0 + step, lon: 10.0002 },
            RawNode { id: 6, lat: 50.0 + 2.0 * step, lon: 10.0002 },
            RawNode { id: 7, lat: 50.0 + step, lon: 10.01 },
            RawNode { id: 8, lat: 50.0 + step, lon: 10.0102 },
        ];
        let ways = vec![
            raw_way(1, vec![1, 2, 3], "primary"),
            raw_way(2, vec![4, 5, 6], "path"),
            raw_way(3, vec![1, 4], "path"),
            raw_way(4, vec![2, 5], "path"),
            raw_way(5, vec![3, 6], "path"),
            raw_way(6, vec![7, 8], "path"),
        ];
        Router::new(create_graph(nodes, &ways, DEFAULT_MAX_SEGMENT_LENGTH))
    }

    #[cfg(test)]
    mod test_find_nearest_node {
        use super::*;

        fn get_single_node_router() -> Router {
            let nodes = vec![RawNode {
                id: 1,
                lat: 50.0,
                lon: 10.0,
            }];
            Router::new(create_graph(nodes, &[], DEFAULT_MAX_SEGMENT_LENGTH))
        }

        /// A node roughly 155m away is found with a 200m radius
        #[test]
        fn test_within_radius() {
            let router = get_single_node_router();

            let result = router.find_nearest_node(50.001, 10.0015, 200.0);

            match result {
                Some(nearest) => {
                    assert_eq!(nearest.node_id, NodeId::Osm(1));
                    assert!(nearest.distance > 150.0 && nearest.distance < 160.0);
                }
                None => panic!("Should have found a node"),
            }
        }

        /// The same node is out of reach with a 50m radius
        #[test]
        fn test_outside_radius() {
            let router = get_single_node_router();

            let result = router.find_nearest_node(50.001, 10.0015, 50.0);

            assert!(result.is_none());
        }

        #[test]
        fn test_empty_graph() {
            let router = Router::new(RoutingGraph::default());

            assert!(router.find_nearest_node(50.0, 10.0, 1000.0).is_none());
        }

        /// With several candidates, the closest should be picked
        #[test]
        fn test_picks_closest() {
            let router = get_test_router();

            let result = router.find_nearest_node(50.0, 10.00019, 100.0);

            assert_eq!(result.map(|nearest| nearest.node_id), Some(NodeId::Osm(4)));
        }
    }

    #[cfg(test)]
    mod test_route {
        use super::*;

        /// The router should prefer footpaths over a road, even though the
        /// road is no longer
        #[test]
        fn test_prefers_footpaths() {
            let router = get_test_router();

            let result = router.route(&NodeId::Osm(1), &NodeId::Osm(3));

            let segment = match result {
                Some(segment) => segment,
                None => panic!("Should have found a path"),
            };

            // 1 -> 4 -> 5 -> 6 -> 3, each hop roughly 14m or 20m
            let node_6 = router.get_node(&NodeId::Osm(6)).unwrap().coords();
            assert!(segment.passes_through(&node_6));
            assert_eq!(
                segment.coordinates.first(),
                Some(&router.get_node(&NodeId::Osm(1)).unwrap().coords())
            );
            assert_eq!(
                segment.coordinates.last(),
                Some(&router.get_node(&NodeId::Osm(3)).unwrap().coords())
            );
            let expected = segment
                .coordinates
                .windows(2)
                .map(|pair| distance_meters(pair[0], pair[1]))
                .sum::<f64>();
            assert_abs_diff_eq!(segment.distance, expected, epsilon = 1e-9);
        }

        /// Routing in the opposite direction should give coordinates ordered
        /// from the first node to the second
        #[test]
        fn test_orientation() {
            let router = get_test_router();

            let result = router.route(&NodeId::Osm(3), &NodeId::Osm(1)).unwrap();

            assert_eq!(
                result.coordinates.first(),
                Some(&router.get_node(&NodeId::Osm(3)).unwrap().coords())
            );
            assert_eq!(
                result.coordinates.last(),
                Some(&router.get_node(&NodeId::Osm(1)).unwrap().coords())
            );
        }

        #[test]
        fn test_disconnected() {
            let router = get_test_router();

            assert!(router.route(&NodeId::Osm(1), &NodeId::Osm(7)).is_none());
        }

        #[test]
        fn test_unknown_node() {
            let router = get_test_router();

            assert!(router.route(&NodeId::Osm(1), &NodeId::Osm(42)).is_none());
            assert!(router.route(&NodeId::Osm(42), &NodeId::Osm(1)).is_none());
        }

        /// Routes can start or end on intermediate nodes
        #[test]
        fn test_intermediate_nodes() {
            let nodes = vec![
                RawNode { id: 1, lat: 50.0, lon: 10.0 },
                RawNode { id: 2, lat: 50.0 + 90.0 / DEG_LAT, lon: 10.0 },
            ];
            let ways = vec![raw_way(9, vec![1, 2], "path")];
            let router =
                Router::new(create_graph(nodes, &ways, DEFAULT_MAX_SEGMENT_LENGTH));

            let mid = NodeId::Intermediate {
                way: 9,
                segment: 0,
                position: 2,
            };
            let result = router.route(&NodeId::Osm(1), &mid).unwrap();

            assert_eq!(result.coordinates.len(), 3);
            // Four hops of 22.5m, the route stops after the second
            assert_abs_diff_eq!(result.distance, 45.0, epsilon = 0.01);
        }
    }

    #[test]
    fn test_snap() {
        let router = get_test_router();

        let snapped = router.snap(50.00001, 10.00001, 10.0);
        let custom = router.snap(50.1, 10.1, 10.0);

        assert_eq!(
            snapped,
            Waypoint::Node {
                lat: 50.0,
                lon: 10.0,
                node_id: NodeId::Osm(1),
            }
        );
        assert_eq!(custom, Waypoint::Custom { lat: 50.1, lon: 10.1 });
    }

    #[test]
    fn test_create_straight_segment() {
        let router = get_test_router();
        let from = LatLon::new(50.0, 10.0);
        let to = LatLon::new(50.0, 10.01);

        let result = router.create_straight_segment(from, to);

        assert_eq!(result.coordinates, vec![from, to]);
        assert_abs_diff_eq!(result.distance, distance_meters(from, to));
    }
}
