//! JSON graph files
//!
//! ```json
//! {
//!   "nodes": [{"id": 1, "x": 0.0, "y": 0.0, "metadata": {"class": "dock"}}],
//!   "edges": [{"id": 10, "start": 1, "end": 2, "metadata": {"penalty": 2.5}}]
//! }
//! ```

use nav_route_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

use super::{EdgeId, Graph, Metadata, NodeId};
use crate::geometry::Coordinates;

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    id: NodeId,
    x: f64,
    y: f64,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    id: EdgeId,
    start: NodeId,
    end: NodeId,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphFile {
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

impl Graph {
    /// Build a graph from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        let file: GraphFile = serde_json::from_str(json).map_err(|e| Error::Parse {
            what: "graph JSON".to_string(),
            reason: e.to_string(),
        })?;
        Self::from_records(file)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let file: GraphFile = serde_json::from_reader(reader).map_err(|e| Error::Parse {
            what: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let graph = Self::from_records(file)?;

        info!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "loaded route graph"
        );
        Ok(graph)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = GraphFile {
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeRecord {
                    id: n.nodeid,
                    x: n.coords.x,
                    y: n.coords.y,
                    metadata: n.metadata.clone(),
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| EdgeRecord {
                    id: e.edgeid,
                    start: self.nodes[e.start.0].nodeid,
                    end: self.nodes[e.end.0].nodeid,
                    metadata: e.metadata.clone(),
                })
                .collect(),
        };

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &file).map_err(std::io::Error::from)?;
        writer.flush()?;
        Ok(())
    }

    fn from_records(file: GraphFile) -> Result<Self> {
        let mut graph = Graph::new();

        for record in file.nodes {
            if !(record.x.is_finite() && record.y.is_finite()) {
                return Err(Error::InvalidGraph(format!(
                    "node {} has non-finite coordinates",
                    record.id
                )));
            }
            let idx = graph.add_node(record.id, Coordinates::new(record.x, record.y))?;
            *graph.node_metadata_mut(idx) = record.metadata;
        }

        for record in file.edges {
            let idx = graph.add_edge(record.id, record.start, record.end)?;
            *graph.edge_metadata_mut(idx) = record.metadata;
        }

        Ok(graph)
    }
}
