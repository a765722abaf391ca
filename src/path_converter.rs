//! Route to dense path conversion

use chrono::{DateTime, Utc};
use nav_route_common::{Error, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use crate::geometry::{interpolate_segment, Coordinates};
use crate::graph::Graph;
use crate::route::{ReroutingState, Route};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConverterConfig {
    /// Spacing between consecutive path points (m)
    pub path_density: f64,
    pub route_frame: String,
    /// Upper bound on points emitted for one segment
    pub max_points_per_segment: usize,
}

impl Default for PathConverterConfig {
    fn default() -> Self {
        Self {
            path_density: 0.05,
            route_frame: "map".to_string(),
            max_points_per_segment: 1_000_000,
        }
    }
}

impl PathConverterConfig {
    fn validate(&self) -> Result<()> {
        if !(self.path_density > 0.0 && self.path_density.is_finite()) {
            return Err(Error::config(
                "path_density",
                format!("must be positive and finite, got {}", self.path_density),
            ));
        }
        if self.max_points_per_segment == 0 {
            return Err(Error::config("max_points_per_segment", "must be at least 1"));
        }
        Ok(())
    }
}

/// Dense path handed to the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DensePath {
    #[schema(example = "map")]
    pub frame_id: String,
    #[schema(value_type = String, example = "2026-01-01T00:00:00Z")]
    pub stamp: DateTime<Utc>,
    pub poses: Vec<Coordinates>,
}

pub struct PathConverter {
    config: RwLock<Arc<PathConverterConfig>>,
}

impl PathConverter {
    pub fn new(config: PathConverterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: RwLock::new(Arc::new(config)),
        })
    }

    /// Swap in a new configuration; conversions already running keep the old one
    pub fn reconfigure(&self, config: PathConverterConfig) -> Result<()> {
        config.validate()?;
        debug!(
            path_density = config.path_density,
            route_frame = %config.route_frame,
            "path converter reconfigured"
        );
        *self.config.write() = Arc::new(config);
        Ok(())
    }

    pub fn config(&self) -> Arc<PathConverterConfig> {
        self.config.read().clone()
    }

    /// Interpolate `route` into evenly spaced points
    ///
    /// With `rerouting`, the remainder of the edge currently being driven is
    /// emitted first, starting from the robot's projected position.
    pub fn densify(
        &self,
        graph: &Graph,
        route: &Route,
        rerouting: Option<&ReroutingState>,
    ) -> DensePath {
        let config = self.config();
        let density = config.path_density;
        let cap = config.max_points_per_segment;
        let mut poses = Vec::new();

        if let Some(state) = rerouting {
            let end = graph.edge_view(state.curr_edge).end.coords;
            interpolate_segment(state.closest_pt_on_edge, end, density, cap, &mut poses);
        }

        for &e in &route.edges {
            let view = graph.edge_view(e);
            interpolate_segment(view.start.coords, view.end.coords, density, cap, &mut poses);
        }

        poses.push(graph.node(route.end_node(graph)).coords);

        debug!(
            edges = route.edges.len(),
            rerouting = rerouting.is_some(),
            points = poses.len(),
            "densified route"
        );

        DensePath {
            frame_id: config.route_frame.clone(),
            stamp: Utc::now(),
            poses,
        }
    }
}
