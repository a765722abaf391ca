//! Runtime edge adjustments: closures and cost overrides
//!
//! Owned by the edge scorer and shared (via `Arc`) with the request handler
//! that mutates it. Each lookup takes the read lock once, so a single scoring
//! call sees closure and override state from the same moment.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::graph::EdgeId;

/// Cost override for one edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EdgeCost {
    #[schema(example = 11)]
    pub edgeid: EdgeId,
    #[schema(example = 42.0)]
    pub cost: f64,
}

/// Edge adjustment request
///
/// Closures are applied first, then reopenings, then cost overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdjustEdgesRequest {
    #[serde(default)]
    pub closed_edges: Vec<EdgeId>,
    #[serde(default)]
    pub opened_edges: Vec<EdgeId>,
    #[serde(default)]
    pub adjust_edges: Vec<EdgeCost>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdjustEdgesResponse {
    pub success: bool,
}

/// Adjustment state of one edge at lookup time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeAdjustment {
    Closed,
    Cost(f64),
    Unchanged,
}

#[derive(Debug, Default)]
struct AdjustmentState {
    closed: FxHashSet<EdgeId>,
    overrides: FxHashMap<EdgeId, f64>,
}

#[derive(Debug, Default)]
pub struct EdgeAdjustments {
    state: RwLock<AdjustmentState>,
}

impl EdgeAdjustments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a request atomically. Unknown ids are accepted as no-ops.
    pub fn apply(&self, req: &AdjustEdgesRequest) -> AdjustEdgesResponse {
        let mut state = self.state.write();

        state.closed.extend(req.closed_edges.iter().copied());
        for id in &req.opened_edges {
            state.closed.remove(id);
        }
        for adjust in &req.adjust_edges {
            if adjust.cost.is_finite() && adjust.cost >= 0.0 {
                state.overrides.insert(adjust.edgeid, adjust.cost);
            } else {
                warn!(
                    edge = adjust.edgeid,
                    cost = adjust.cost,
                    "ignoring non-finite or negative edge cost override"
                );
            }
        }

        debug!(
            closed = req.closed_edges.len(),
            opened = req.opened_edges.len(),
            adjusted = req.adjust_edges.len(),
            total_closed = state.closed.len(),
            total_overrides = state.overrides.len(),
            "applied edge adjustments"
        );

        AdjustEdgesResponse { success: true }
    }

    pub fn close(&self, ids: impl IntoIterator<Item = EdgeId>) {
        self.state.write().closed.extend(ids);
    }

    pub fn reopen(&self, ids: impl IntoIterator<Item = EdgeId>) {
        let mut state = self.state.write();
        for id in ids {
            state.closed.remove(&id);
        }
    }

    pub fn set_cost(&self, edgeid: EdgeId, cost: f64) {
        self.apply(&AdjustEdgesRequest {
            adjust_edges: vec![EdgeCost { edgeid, cost }],
            ..Default::default()
        });
    }

    pub fn clear_cost(&self, edgeid: EdgeId) {
        self.state.write().overrides.remove(&edgeid);
    }

    /// Drop every closure and override
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.closed.clear();
        state.overrides.clear();
    }

    pub fn lookup(&self, edgeid: EdgeId) -> EdgeAdjustment {
        let state = self.state.read();
        if state.closed.contains(&edgeid) {
            EdgeAdjustment::Closed
        } else if let Some(&cost) = state.overrides.get(&edgeid) {
            EdgeAdjustment::Cost(cost)
        } else {
            EdgeAdjustment::Unchanged
        }
    }

    pub fn is_closed(&self, edgeid: EdgeId) -> bool {
        self.state.read().closed.contains(&edgeid)
    }

    /// Closed edge ids, sorted
    pub fn closed_edges(&self) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self.state.read().closed.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}
