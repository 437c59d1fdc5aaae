use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A trail-network vertex as it appears in the source data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

/// A polyline through RawNodes representing a single trail or path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWay {
    pub id: i64,
    pub node_ids: Vec<i64>,
    #[serde(default)]
    pub tags: FxHashMap<String, String>,
}

impl RawWay {
    /// The highway classifier for this way, if it has one
    pub fn highway(&self) -> Option<&str> {
        self.tags.get("highway").map(|val| val.as_str())
    }
}

/// Everything which was retrieved for a single bounding box
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrailData {
    pub nodes: Vec<RawNode>,
    pub ways: Vec<RawWay>,
}

/// Container for the raw output of the nodes SQL query
#[derive(sqlx::FromRow, Debug, Clone, Copy)]
pub struct NodeRow {
    pub id: i64,
    lat: f64,
    lon: f64,
}

impl From<NodeRow> for RawNode {
    fn from(row: NodeRow) -> RawNode {
        RawNode {
            id: row.id,
            lat: row.lat,
            lon: row.lon,
        }
    }
}

/// Container for the raw output of the ways SQL query
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct WayRow {
    pub id: i64,
    node_ids: Vec<i64>,
    highway: Option<String>,
}

impl From<WayRow> for RawWay {
    /// Unpack the raw way data, the highway column becomes the only tag
    fn from(row: WayRow) -> RawWay {
        let mut tags = FxHashMap::<String, String>::default();
        if let Some(highway) = row.highway {
            tags.insert("highway".to_string(), highway);
        }

        RawWay {
            id: row.id,
            node_ids: row.node_ids,
            tags,
        }
    }
}
