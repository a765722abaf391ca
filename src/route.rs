//! Routes over the graph and the reference search that produces them

use nav_route_common::{Error, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;
use tracing::{debug, trace};

use crate::edge_scorer::EdgeScorer;
use crate::geometry::{closest_point_on_segment, Coordinates};
use crate::graph::{EdgeIndex, Graph, NodeId, NodeIndex};

/// Chain of edges leaving `start_node`
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub start_node: NodeIndex,
    pub edges: Vec<EdgeIndex>,
    /// Total cost as scored during the search
    pub cost: f64,
}

impl Route {
    /// Build a route, checking that every edge starts where the previous ended
    pub fn new(graph: &Graph, start_node: NodeIndex, edges: Vec<EdgeIndex>) -> Result<Self> {
        let mut at = start_node;
        for (i, &e) in edges.iter().enumerate() {
            let edge = graph.edge(e);
            if edge.start != at {
                return Err(Error::InvalidRoute(format!(
                    "edge {} at position {i} starts at node {}, expected node {}",
                    edge.edgeid,
                    graph.node(edge.start).nodeid,
                    graph.node(at).nodeid
                )));
            }
            at = edge.end;
        }

        Ok(Self {
            start_node,
            edges,
            cost: 0.0,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Node the route ends at (the start node for an empty route)
    pub fn end_node(&self, graph: &Graph) -> NodeIndex {
        self.edges
            .last()
            .map(|&e| graph.edge(e).end)
            .unwrap_or(self.start_node)
    }
}

/// Robot position part-way along an edge when re-planning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReroutingState {
    pub curr_edge: EdgeIndex,
    pub closest_pt_on_edge: Coordinates,
}

impl ReroutingState {
    /// Project `pose` onto `edge`, clamped to the segment
    pub fn from_pose(graph: &Graph, edge: EdgeIndex, pose: Coordinates) -> Self {
        let view = graph.edge_view(edge);
        Self {
            curr_edge: edge,
            closest_pt_on_edge: closest_point_on_segment(
                pose,
                view.start.coords,
                view.end.coords,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SearchState {
    cost: f64,
    node: NodeIndex,
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl Eq for SearchState {}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
    }
}

/// Cheapest route from `start` to `goal` (Dijkstra)
///
/// Every candidate edge is scored with `scorer`; edges it rejects are never
/// traversed. Negative or non-finite costs are treated as rejections.
pub fn find_route(graph: &Graph, scorer: &EdgeScorer, start: NodeId, goal: NodeId) -> Result<Route> {
    let start_idx = graph.node_index(start).ok_or(Error::UnknownNode(start))?;
    let goal_idx = graph.node_index(goal).ok_or(Error::UnknownNode(goal))?;
    let t = Instant::now();

    let mut dist = vec![f64::INFINITY; graph.node_count()];
    let mut came_from: Vec<Option<EdgeIndex>> = vec![None; graph.node_count()];
    let mut heap = BinaryHeap::new();
    let mut settled = 0usize;

    dist[start_idx.index()] = 0.0;
    heap.push(SearchState {
        cost: 0.0,
        node: start_idx,
    });

    while let Some(SearchState { cost, node }) = heap.pop() {
        if cost > dist[node.index()] {
            continue;
        }
        settled += 1;
        if node == goal_idx {
            break;
        }

        for &e in graph.outgoing_edges(node) {
            let view = graph.edge_view(e);
            let Some(edge_cost) = scorer.score(&view) else {
                continue;
            };
            if !(edge_cost >= 0.0 && edge_cost.is_finite()) {
                trace!(edge = view.id(), cost = edge_cost, "skipping unusable edge cost");
                continue;
            }

            let next = view.edge.end;
            let next_cost = cost + edge_cost;
            if next_cost < dist[next.index()] {
                dist[next.index()] = next_cost;
                came_from[next.index()] = Some(e);
                heap.push(SearchState {
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }

    if !dist[goal_idx.index()].is_finite() {
        debug!(start, goal, settled, "search exhausted without reaching goal");
        return Err(Error::NoRoute { start, goal });
    }

    let mut edges = Vec::new();
    let mut at = goal_idx;
    while let Some(e) = came_from[at.index()] {
        edges.push(e);
        at = graph.edge(e).start;
    }
    edges.reverse();

    debug!(
        start,
        goal,
        edges = edges.len(),
        cost = dist[goal_idx.index()],
        settled,
        elapsed_ms = t.elapsed().as_secs_f64() * 1000.0,
        "route found"
    );

    let mut route = Route::new(graph, start_idx, edges)?;
    route.cost = dist[goal_idx.index()];
    Ok(route)
}
