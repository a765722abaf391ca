//! Built-in edge scorer plugins
//!
//! Each scorer maps an edge (plus optional shared runtime state) to a verdict:
//! `Some(cost)` when the edge may be traversed, `None` when it must not be.
//! Scorers are pure with respect to each other; the engine sums their costs.

pub mod adjust_edges;
pub mod costmap;
pub mod distance;
pub mod penalty;
pub mod semantic;
pub mod time;

use nav_route_common::{Error, Result};
use tracing::trace;

use crate::graph::{EdgeView, Metadata};

pub use adjust_edges::{AdjustEdgesScorer, AdjustEdgesScorerConfig};
pub use costmap::{CostmapScorer, CostmapScorerConfig};
pub use distance::{DistanceScorer, DistanceScorerConfig};
pub use penalty::{PenaltyScorer, PenaltyScorerConfig};
pub use semantic::{SemanticScorer, SemanticScorerConfig};
pub use time::{TimeScorer, TimeScorerConfig};

/// Contract every scorer plugin implements
pub trait EdgeCostFunction: Send + Sync {
    /// Configured instance name
    fn name(&self) -> &str;

    /// Score one edge: `Some(cost)` if traversable, `None` to reject it
    fn score(&self, edge: &EdgeView<'_>) -> Option<f64>;
}

/// Scorer plugin types known to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScorerKind {
    Distance,
    Penalty,
    Time,
    Semantic,
    Costmap,
    AdjustEdges,
}

impl ScorerKind {
    pub fn all() -> &'static [ScorerKind] {
        &[
            ScorerKind::Distance,
            ScorerKind::Penalty,
            ScorerKind::Time,
            ScorerKind::Semantic,
            ScorerKind::Costmap,
            ScorerKind::AdjustEdges,
        ]
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ScorerKind::Distance => "DistanceScorer",
            ScorerKind::Penalty => "PenaltyScorer",
            ScorerKind::Time => "TimeScorer",
            ScorerKind::Semantic => "SemanticScorer",
            ScorerKind::Costmap => "CostmapScorer",
            ScorerKind::AdjustEdges => "AdjustEdgesScorer",
        }
    }

    /// Resolve a plugin type string. Namespaced forms such as
    /// `nav_route::TimeScorer` resolve by their last segment.
    pub fn from_type_name(plugin: &str) -> Option<ScorerKind> {
        let bare = plugin.rsplit("::").next().unwrap_or(plugin);
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.type_name() == bare)
    }

    pub fn type_names() -> Vec<&'static str> {
        Self::all().iter().map(|kind| kind.type_name()).collect()
    }
}

/// Float metadata value at `key`; values of another type count as absent
pub(crate) fn float_tag(meta: &Metadata, key: &str, scorer: &str) -> Option<f64> {
    match meta.opt_f64(key) {
        Ok(value) => value,
        Err(err) => {
            trace!(scorer, key, %err, "ignoring metadata value");
            None
        }
    }
}

pub(crate) fn check_weight(scope: &str, weight: f64) -> Result<()> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(Error::config(
            scope,
            format!("weight must be finite and non-negative, got {weight}"),
        ))
    }
}

/// Graph with nodes 1 -> 2 joined by edge 10
#[cfg(test)]
pub(crate) fn single_edge(
    start: crate::geometry::Coordinates,
    end: crate::geometry::Coordinates,
) -> (crate::graph::Graph, crate::graph::EdgeIndex) {
    let mut graph = crate::graph::Graph::new();
    graph.add_node(1, start).unwrap();
    graph.add_node(2, end).unwrap();
    let edge = graph.add_edge(10, 1, 2).unwrap();
    (graph, edge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ScorerKind::all() {
            assert_eq!(ScorerKind::from_type_name(kind.type_name()), Some(*kind));
        }
    }

    #[test]
    fn test_namespaced_type_names() {
        assert_eq!(
            ScorerKind::from_type_name("nav_route::CostmapScorer"),
            Some(ScorerKind::Costmap)
        );
        assert_eq!(ScorerKind::from_type_name("FakePluginPath"), None);
        assert_eq!(ScorerKind::from_type_name("distancescorer"), None);
    }

    #[test]
    fn test_check_weight() {
        assert!(check_weight("s", 0.0).is_ok());
        assert!(check_weight("s", 2.5).is_ok());
        assert!(check_weight("s", -1.0).is_err());
        assert!(check_weight("s", f64::INFINITY).is_err());
    }
}
