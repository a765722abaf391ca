//! Adjust-edges scorer - runtime closures and cost overrides

use nav_route_common::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

use super::{check_weight, EdgeCostFunction};
use crate::adjustments::{EdgeAdjustment, EdgeAdjustments};
use crate::graph::EdgeView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdjustEdgesScorerConfig {
    /// Applied to override costs
    pub weight: f64,
}

impl Default for AdjustEdgesScorerConfig {
    fn default() -> Self {
        Self { weight: 1.0 }
    }
}

pub struct AdjustEdgesScorer {
    name: String,
    config: AdjustEdgesScorerConfig,
    adjustments: Arc<EdgeAdjustments>,
}

impl AdjustEdgesScorer {
    pub fn new(
        name: impl Into<String>,
        config: AdjustEdgesScorerConfig,
        adjustments: Arc<EdgeAdjustments>,
    ) -> Result<Self> {
        let name = name.into();
        check_weight(&name, config.weight)?;
        Ok(Self {
            name,
            config,
            adjustments,
        })
    }
}

impl EdgeCostFunction for AdjustEdgesScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, edge: &EdgeView<'_>) -> Option<f64> {
        match self.adjustments.lookup(edge.id()) {
            EdgeAdjustment::Closed => {
                trace!(edge = edge.id(), "edge closed");
                None
            }
            EdgeAdjustment::Cost(cost) => Some(self.config.weight * cost),
            EdgeAdjustment::Unchanged => Some(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustments::{AdjustEdgesRequest, EdgeCost};
    use crate::geometry::Coordinates;
    use crate::scorers::single_edge;

    #[test]
    fn test_close_override_reopen() {
        let adjustments = Arc::new(EdgeAdjustments::new());
        let scorer = AdjustEdgesScorer::new(
            "AdjustEdgesScorer",
            AdjustEdgesScorerConfig::default(),
            adjustments.clone(),
        )
        .unwrap();
        let (graph, e) = single_edge(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 0.0));
        assert_eq!(scorer.score(&graph.edge_view(e)), Some(0.0));

        adjustments.apply(&AdjustEdgesRequest {
            closed_edges: vec![10],
            ..Default::default()
        });
        assert_eq!(scorer.score(&graph.edge_view(e)), None);

        adjustments.apply(&AdjustEdgesRequest {
            opened_edges: vec![10],
            adjust_edges: vec![EdgeCost {
                edgeid: 10,
                cost: 42.0,
            }],
            ..Default::default()
        });
        assert_eq!(scorer.score(&graph.edge_view(e)), Some(42.0));
    }

    #[test]
    fn test_weight_scales_override() {
        let adjustments = Arc::new(EdgeAdjustments::new());
        adjustments.set_cost(10, 4.0);
        let scorer = AdjustEdgesScorer::new(
            "AdjustEdgesScorer",
            AdjustEdgesScorerConfig { weight: 0.25 },
            adjustments,
        )
        .unwrap();
        let (graph, e) = single_edge(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 0.0));
        assert_eq!(scorer.score(&graph.edge_view(e)), Some(1.0));
    }
}
