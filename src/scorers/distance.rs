//! Distance scorer - straight-line length, slowed by a speed fraction tag

use nav_route_common::Result;
use serde::{Deserialize, Serialize};

use super::{check_weight, float_tag, EdgeCostFunction};
use crate::graph::EdgeView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistanceScorerConfig {
    pub weight: f64,
    /// Edge tag holding the fraction of nominal speed allowed, in (0, 1]
    pub speed_tag: String,
}

impl Default for DistanceScorerConfig {
    fn default() -> Self {
        Self {
            weight: 1.0,
            speed_tag: "speed_limit".to_string(),
        }
    }
}

pub struct DistanceScorer {
    name: String,
    config: DistanceScorerConfig,
}

impl DistanceScorer {
    pub fn new(name: impl Into<String>, config: DistanceScorerConfig) -> Result<Self> {
        let name = name.into();
        check_weight(&name, config.weight)?;
        Ok(Self { name, config })
    }
}

impl EdgeCostFunction for DistanceScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, edge: &EdgeView<'_>) -> Option<f64> {
        let mut cost = edge.length();
        if let Some(fraction) = float_tag(edge.metadata(), &self.config.speed_tag, &self.name) {
            if fraction > 0.0 {
                cost /= fraction;
            }
        }
        Some(self.config.weight * cost)
    }
}
