//! Costmap scorer - samples the latest occupancy grid along the edge

use nav_route_common::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

use super::{check_weight, EdgeCostFunction};
use crate::costmap::{SharedCostmap, LETHAL_OBSTACLE};
use crate::geometry::sample_line;
use crate::graph::EdgeView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostmapScorerConfig {
    pub weight: f64,
    /// Maximum sampled cost when true, mean when false
    pub use_maximum: bool,
    pub invalid_on_collision: bool,
    pub invalid_off_map: bool,
}

impl Default for CostmapScorerConfig {
    fn default() -> Self {
        Self {
            weight: 1.0,
            use_maximum: true,
            invalid_on_collision: true,
            invalid_off_map: true,
        }
    }
}

pub struct CostmapScorer {
    name: String,
    config: CostmapScorerConfig,
    costmap: Arc<SharedCostmap>,
}

impl CostmapScorer {
    pub fn new(
        name: impl Into<String>,
        config: CostmapScorerConfig,
        costmap: Arc<SharedCostmap>,
    ) -> Result<Self> {
        let name = name.into();
        check_weight(&name, config.weight)?;
        Ok(Self {
            name,
            config,
            costmap,
        })
    }
}

/// Sampling steps per edge; longer edges are sampled more sparsely
pub const MAX_SAMPLES_PER_EDGE: usize = 10_000;

impl EdgeCostFunction for CostmapScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, edge: &EdgeView<'_>) -> Option<f64> {
        let grid = self.costmap.snapshot()?;
        let (start, end) = (edge.start.coords, edge.end.coords);

        // The grid is a rectangle, so both ends on it keeps every sample on it
        if grid.world_to_map(start).is_none() || grid.world_to_map(end).is_none() {
            if self.config.invalid_off_map {
                trace!(edge = edge.id(), "edge leaves the costmap");
                return None;
            }
            return Some(0.0);
        }

        let mut max_cost = 0u8;
        let mut total = 0.0;
        let mut samples = 0usize;

        for point in sample_line(start, end, grid.resolution(), MAX_SAMPLES_PER_EDGE) {
            let Some(cost) = grid.cost_at(point) else {
                continue;
            };

            let cost = if cost >= LETHAL_OBSTACLE {
                if self.config.invalid_on_collision {
                    trace!(edge = edge.id(), x = point.x, y = point.y, "edge in collision");
                    return None;
                }
                LETHAL_OBSTACLE
            } else {
                cost
            };

            max_cost = max_cost.max(cost);
            total += cost as f64;
            samples += 1;
        }

        if samples == 0 {
            return Some(0.0);
        }

        let aggregate = if self.config.use_maximum {
            max_cost as f64
        } else {
            total / samples as f64
        };
        Some(self.config.weight * aggregate / LETHAL_OBSTACLE as f64)
    }
}
