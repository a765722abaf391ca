//! Route graph: nodes, directional edges and their metadata
//!
//! The graph owns both arenas. Edges refer to their endpoints by
//! [`NodeIndex`], so nodes outlive every edge that mentions them. Scorers see
//! an edge through an [`EdgeView`], which borrows the edge and both endpoints.

pub mod io;
pub mod metadata;

use nav_route_common::{Error, Result};
use rstar::{primitives::GeomWithData, RTree};
use rustc_hash::FxHashMap;

use crate::geometry::Coordinates;

pub use metadata::{Metadata, MetadataError, MetadataValue};

/// Stable external node identifier
pub type NodeId = u32;
/// Stable external edge identifier
pub type EdgeId = u32;

/// Position of a node in the graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Position of an edge in the graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIndex(usize);

impl EdgeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub nodeid: NodeId,
    pub coords: Coordinates,
    pub metadata: Metadata,
}

#[derive(Debug, Clone)]
pub struct DirectionalEdge {
    pub edgeid: EdgeId,
    pub start: NodeIndex,
    pub end: NodeIndex,
    pub metadata: Metadata,
}

/// Borrowed view of an edge together with its endpoints
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'a> {
    pub edge: &'a DirectionalEdge,
    pub start: &'a Node,
    pub end: &'a Node,
}

impl<'a> EdgeView<'a> {
    pub fn id(&self) -> EdgeId {
        self.edge.edgeid
    }

    pub fn metadata(&self) -> &'a Metadata {
        &self.edge.metadata
    }

    /// Straight-line length between the endpoints
    pub fn length(&self) -> f64 {
        self.start.coords.distance(&self.end.coords)
    }
}

type SpatialPoint = GeomWithData<[f64; 2], NodeIndex>;

#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<DirectionalEdge>,
    node_lookup: FxHashMap<NodeId, NodeIndex>,
    edge_lookup: FxHashMap<EdgeId, EdgeIndex>,
    outgoing: Vec<Vec<EdgeIndex>>,
    spatial_index: RTree<SpatialPoint>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, nodeid: NodeId, coords: Coordinates) -> Result<NodeIndex> {
        if self.node_lookup.contains_key(&nodeid) {
            return Err(Error::InvalidGraph(format!("duplicate node id {nodeid}")));
        }

        let idx = NodeIndex(self.nodes.len());
        self.nodes.push(Node {
            nodeid,
            coords,
            metadata: Metadata::new(),
        });
        self.outgoing.push(Vec::new());
        self.node_lookup.insert(nodeid, idx);
        self.spatial_index
            .insert(GeomWithData::new([coords.x, coords.y], idx));
        Ok(idx)
    }

    /// Add a directed edge between two existing node ids
    pub fn add_edge(&mut self, edgeid: EdgeId, start: NodeId, end: NodeId) -> Result<EdgeIndex> {
        if self.edge_lookup.contains_key(&edgeid) {
            return Err(Error::InvalidGraph(format!("duplicate edge id {edgeid}")));
        }
        let start = self.node_index(start).ok_or(Error::UnknownNode(start))?;
        let end = self.node_index(end).ok_or(Error::UnknownNode(end))?;

        let idx = EdgeIndex(self.edges.len());
        self.edges.push(DirectionalEdge {
            edgeid,
            start,
            end,
            metadata: Metadata::new(),
        });
        self.outgoing[start.0].push(idx);
        self.edge_lookup.insert(edgeid, idx);
        Ok(idx)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_index(&self, nodeid: NodeId) -> Option<NodeIndex> {
        self.node_lookup.get(&nodeid).copied()
    }

    pub fn edge_index(&self, edgeid: EdgeId) -> Option<EdgeIndex> {
        self.edge_lookup.get(&edgeid).copied()
    }

    /// Panics if `idx` did not come from this graph.
    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.0]
    }

    /// Panics if `idx` did not come from this graph.
    pub fn edge(&self, idx: EdgeIndex) -> &DirectionalEdge {
        &self.edges[idx.0]
    }

    pub fn node_metadata_mut(&mut self, idx: NodeIndex) -> &mut Metadata {
        &mut self.nodes[idx.0].metadata
    }

    pub fn edge_metadata_mut(&mut self, idx: EdgeIndex) -> &mut Metadata {
        &mut self.edges[idx.0].metadata
    }

    /// Move a node, keeping the spatial index in sync
    pub fn set_node_coords(&mut self, idx: NodeIndex, coords: Coordinates) {
        let node = &mut self.nodes[idx.0];
        let old = GeomWithData::new([node.coords.x, node.coords.y], idx);
        self.spatial_index.remove(&old);
        node.coords = coords;
        self.spatial_index
            .insert(GeomWithData::new([coords.x, coords.y], idx));
    }

    pub fn edge_view(&self, idx: EdgeIndex) -> EdgeView<'_> {
        let edge = &self.edges[idx.0];
        EdgeView {
            edge,
            start: &self.nodes[edge.start.0],
            end: &self.nodes[edge.end.0],
        }
    }

    pub fn outgoing_edges(&self, idx: NodeIndex) -> &[EdgeIndex] {
        &self.outgoing[idx.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIndex(i), n))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &DirectionalEdge)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeIndex(i), e))
    }

    /// Nearest node to `target` - O(log n) via the R-tree
    pub fn nearest_node(&self, target: Coordinates) -> Option<NodeIndex> {
        self.spatial_index
            .nearest_neighbor(&[target.x, target.y])
            .map(|point| point.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Graph {
        let mut graph = Graph::new();
        graph.add_node(1, Coordinates::new(0.0, 0.0)).unwrap();
        graph.add_node(2, Coordinates::new(1.0, 0.0)).unwrap();
        graph.add_node(3, Coordinates::new(1.0, 1.0)).unwrap();
        graph.add_edge(10, 1, 2).unwrap();
        graph.add_edge(11, 2, 3).unwrap();
        graph.add_edge(12, 2, 1).unwrap();
        graph
    }

    #[test]
    fn test_edge_view_resolves_endpoints() {
        let graph = square();
        let e = graph.edge_index(11).unwrap();
        let view = graph.edge_view(e);

        assert_eq!(view.id(), 11);
        assert_eq!(view.start.nodeid, 2);
        assert_eq!(view.end.nodeid, 3);
        assert!((view.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_outgoing_edges() {
        let graph = square();
        let n2 = graph.node_index(2).unwrap();
        let ids: Vec<EdgeId> = graph
            .outgoing_edges(n2)
            .iter()
            .map(|&e| graph.edge(e).edgeid)
            .collect();
        assert_eq!(ids, vec![11, 12]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut graph = square();
        assert!(matches!(
            graph.add_node(1, Coordinates::default()),
            Err(Error::InvalidGraph(_))
        ));
        assert!(matches!(
            graph.add_edge(10, 1, 3),
            Err(Error::InvalidGraph(_))
        ));
        assert!(matches!(graph.add_edge(99, 1, 42), Err(Error::UnknownNode(42))));
    }

    #[test]
    fn test_nearest_node_tracks_moves() {
        let mut graph = square();
        let n3 = graph.node_index(3).unwrap();
        assert_eq!(graph.nearest_node(Coordinates::new(0.9, 1.2)), Some(n3));

        graph.set_node_coords(n3, Coordinates::new(50.0, 50.0));
        assert_eq!(
            graph.nearest_node(Coordinates::new(0.9, 1.2)),
            graph.node_index(2)
        );
        assert_eq!(graph.nearest_node(Coordinates::new(49.0, 49.0)), Some(n3));
    }

    #[test]
    fn test_nearest_node_empty_graph() {
        assert_eq!(Graph::new().nearest_node(Coordinates::default()), None);
    }
}
