//! Penalty scorer - a static cost stored on the edge

use nav_route_common::Result;
use serde::{Deserialize, Serialize};

use super::{check_weight, float_tag, EdgeCostFunction};
use crate::graph::EdgeView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PenaltyScorerConfig {
    pub weight: f64,
    pub penalty_tag: String,
}

impl Default for PenaltyScorerConfig {
    fn default() -> Self {
        Self {
            weight: 1.0,
            penalty_tag: "penalty".to_string(),
        }
    }
}

pub struct PenaltyScorer {
    name: String,
    config: PenaltyScorerConfig,
}

impl PenaltyScorer {
    pub fn new(name: impl Into<String>, config: PenaltyScorerConfig) -> Result<Self> {
        let name = name.into();
        check_weight(&name, config.weight)?;
        Ok(Self { name, config })
    }
}

impl EdgeCostFunction for PenaltyScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, edge: &EdgeView<'_>) -> Option<f64> {
        let penalty =
            float_tag(edge.metadata(), &self.config.penalty_tag, &self.name).unwrap_or(0.0);
        Some(self.config.weight * penalty)
    }
}
