//! Edge scoring engine
//!
//! Holds the configured scorer plugins in order and folds their verdicts into
//! one traversal cost per edge. The runtime adjustment state and the occupancy
//! grid slot are shared handles, so a rebuilt engine can keep serving the
//! closures and grid the previous one had.

use nav_route_common::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::adjustments::{AdjustEdgesRequest, AdjustEdgesResponse, EdgeAdjustments};
use crate::config::{parse_params, ScoringConfig};
use crate::costmap::{OccupancyGrid, SharedCostmap};
use crate::graph::EdgeView;
use crate::scorers::{
    AdjustEdgesScorer, CostmapScorer, DistanceScorer, EdgeCostFunction, PenaltyScorer,
    ScorerKind, SemanticScorer, TimeScorer,
};

pub struct EdgeScorer {
    plugins: Vec<Box<dyn EdgeCostFunction>>,
    adjustments: Arc<EdgeAdjustments>,
    costmap: Arc<SharedCostmap>,
}

impl EdgeScorer {
    /// Build from config with fresh adjustment state and no grid
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        Self::with_shared_state(
            config,
            Arc::new(EdgeAdjustments::new()),
            Arc::new(SharedCostmap::new()),
        )
    }

    pub fn with_shared_state(
        config: &ScoringConfig,
        adjustments: Arc<EdgeAdjustments>,
        costmap: Arc<SharedCostmap>,
    ) -> Result<Self> {
        let mut plugins: Vec<Box<dyn EdgeCostFunction>> =
            Vec::with_capacity(config.edge_cost_functions.len());

        for (i, name) in config.edge_cost_functions.iter().enumerate() {
            if config.edge_cost_functions[..i].contains(name) {
                return Err(Error::config(name, "plugin listed more than once"));
            }

            let (kind, params) = config.plugin_params(name)?;
            let plugin = build_plugin(name, kind, params, &adjustments, &costmap)?;
            info!(plugin = %name, kind = kind.type_name(), "created edge cost function");
            plugins.push(plugin);
        }

        if plugins.is_empty() {
            warn!("no edge cost functions configured; every edge scores 0");
        }

        Ok(Self {
            plugins,
            adjustments,
            costmap,
        })
    }

    /// Total cost of traversing `edge`, or `None` if any plugin rejects it
    pub fn score(&self, edge: &EdgeView<'_>) -> Option<f64> {
        let mut total = 0.0;
        for plugin in &self.plugins {
            match plugin.score(edge) {
                Some(cost) => total += cost,
                None => {
                    trace!(edge = edge.id(), plugin = plugin.name(), "edge rejected");
                    return None;
                }
            }
        }
        Some(total)
    }

    pub fn num_plugins(&self) -> usize {
        self.plugins.len()
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Apply closures, reopenings and cost overrides in one critical section
    pub fn adjust_edges(&self, req: &AdjustEdgesRequest) -> AdjustEdgesResponse {
        self.adjustments.apply(req)
    }

    pub fn adjustments(&self) -> &Arc<EdgeAdjustments> {
        &self.adjustments
    }

    /// Replace the occupancy grid seen by costmap scorers
    pub fn update_costmap(&self, grid: OccupancyGrid) {
        self.costmap.update(grid);
    }

    pub fn costmap(&self) -> &Arc<SharedCostmap> {
        &self.costmap
    }
}

fn build_plugin(
    name: &str,
    kind: ScorerKind,
    params: toml::Table,
    adjustments: &Arc<EdgeAdjustments>,
    costmap: &Arc<SharedCostmap>,
) -> Result<Box<dyn EdgeCostFunction>> {
    debug!(plugin = %name, options = params.len(), "configuring edge cost function");

    let plugin: Box<dyn EdgeCostFunction> = match kind {
        ScorerKind::Distance => Box::new(DistanceScorer::new(name, parse_params(name, params)?)?),
        ScorerKind::Penalty => Box::new(PenaltyScorer::new(name, parse_params(name, params)?)?),
        ScorerKind::Time => Box::new(TimeScorer::new(name, parse_params(name, params)?)?),
        ScorerKind::Semantic => Box::new(SemanticScorer::new(name, parse_params(name, params)?)?),
        ScorerKind::Costmap => Box::new(CostmapScorer::new(
            name,
            parse_params(name, params)?,
            Arc::clone(costmap),
        )?),
        ScorerKind::AdjustEdges => Box::new(AdjustEdgesScorer::new(
            name,
            parse_params(name, params)?,
            Arc::clone(adjustments),
        )?),
    };
    Ok(plugin)
}
