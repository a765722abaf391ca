//! Time scorer - expected traversal time in seconds

use nav_route_common::{Error, Result};
use serde::{Deserialize, Serialize};

use super::{check_weight, float_tag, EdgeCostFunction};
use crate::graph::EdgeView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeScorerConfig {
    pub weight: f64,
    /// Edge tag holding a measured traversal time (s)
    pub time_tag: String,
    /// Edge tag holding an absolute speed limit (m/s)
    pub speed_tag: String,
    /// Speed assumed when the edge carries no usable limit (m/s)
    pub max_vel: f64,
}

impl Default for TimeScorerConfig {
    fn default() -> Self {
        Self {
            weight: 1.0,
            time_tag: "abs_time_taken".to_string(),
            speed_tag: "abs_speed_limit".to_string(),
            max_vel: 0.5,
        }
    }
}

pub struct TimeScorer {
    name: String,
    config: TimeScorerConfig,
}

impl TimeScorer {
    pub fn new(name: impl Into<String>, config: TimeScorerConfig) -> Result<Self> {
        let name = name.into();
        check_weight(&name, config.weight)?;
        if !(config.max_vel > 0.0 && config.max_vel.is_finite()) {
            return Err(Error::config(
                &name,
                format!("max_vel must be positive, got {}", config.max_vel),
            ));
        }
        Ok(Self { name, config })
    }
}

impl EdgeCostFunction for TimeScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, edge: &EdgeView<'_>) -> Option<f64> {
        let meta = edge.metadata();

        let time = match float_tag(meta, &self.config.time_tag, &self.name) {
            Some(taken) => taken,
            None => {
                let speed = float_tag(meta, &self.config.speed_tag, &self.name)
                    .filter(|v| *v > 0.0)
                    .unwrap_or(self.config.max_vel);
                edge.length() / speed
            }
        };

        Some(self.config.weight * time)
    }
}
