//! The functions defined here can be used to read in details of all of the
//! nodes and ways required to represent the trail network inside the area
//! the user is currently looking at
use std::future::Future;

use aho_corasick::AhoCorasick;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::common::bbox::BBox;
use crate::common::error::LoadError;
use crate::loading::structs::{NodeRow, RawNode, RawWay, TrailData, WayRow};

/// Anything which can provide the trail network for a bounding box
pub trait TrailSource {
    fn fetch(
        &self,
        bbox: &BBox,
    ) -> impl Future<Output = Result<TrailData, LoadError>> + Send;
}

/// Fill in a SQL template, swapping each of the placeholders for the matching
/// attribute of the bounding box
fn fill_template(template: &str, bbox: &BBox) -> String {
    let ptn_list = bbox.get_partition_list();
    let ptn_str = ptn_list.join(", ");

    let patterns = [
        "< ptn_str >",
        "< south >",
        "< west >",
        "< north >",
        "< east >",
    ];
    let replace_with = [
        ptn_str,
        bbox.south.to_string(),
        bbox.west.to_string(),
        bbox.north.to_string(),
        bbox.east.to_string(),
    ];

    // Patterns are fixed literals, so building the automaton cannot fail
    match AhoCorasick::new(patterns) {
        Ok(ac) => ac.replace_all(template, &replace_with),
        Err(err) => unreachable!("invalid placeholder patterns: {err}"),
    }
}

/// Generate a SQL query to read in the nodes inside the provided bounding box
pub fn generate_nodes_query(bbox: &BBox) -> String {
    // This brings the query into the compiled code
    let nodes_base = include_str!("get_nodes.sql");
    fill_template(nodes_base, bbox)
}

/// Generate a SQL query to read in every way which overlaps the provided
/// bounding box. Ways may extend beyond it, references to nodes outside the
/// box are dropped when the graph is built.
pub fn generate_ways_query(bbox: &BBox) -> String {
    let ways_base = include_str!("get_ways.sql");
    fill_template(ways_base, bbox)
}

/// Trail data held in a PostgreSQL database, partitioned into single degree
/// squares
#[derive(Clone)]
pub struct PostgresTrailSource {
    pool: PgPool,
}

impl PostgresTrailSource {
    pub fn new(pool: PgPool) -> Self {
        PostgresTrailSource { pool }
    }

    /// Executes the nodes SQL query and returns a vector of RawNode
    pub async fn load_nodes(&self, bbox: &BBox) -> Result<Vec<RawNode>, LoadError> {
        let query = generate_nodes_query(bbox);
        let rows: Vec<NodeRow> =
            sqlx::query_as(&query).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(RawNode::from).collect())
    }

    /// Executes the ways SQL query and returns a vector of RawWay
    pub async fn load_ways(&self, bbox: &BBox) -> Result<Vec<RawWay>, LoadError> {
        let query = generate_ways_query(bbox);
        let rows: Vec<WayRow> =
            sqlx::query_as(&query).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(RawWay::from).collect())
    }
}

impl TrailSource for PostgresTrailSource {
    async fn fetch(&self, bbox: &BBox) -> Result<TrailData, LoadError> {
        if !bbox.is_valid() {
            return Err(LoadError::InvalidBounds(format!("{bbox:?}")));
        }

        debug!(?bbox, "loading trail data");
        let nodes = self.load_nodes(bbox).await?;
        let ways = self.load_ways(bbox).await?;
        info!(nodes = nodes.len(), ways = ways.len(), "trail data loaded");

        Ok(TrailData { nodes, ways })
    }
}
