//! Semantic scorer - cost by semantic class of the edge and its end node
//!
//! With a non-empty `semantic_key`, the string stored under that key names the
//! class. With an empty key, every configured class name present as a key
//! counts, whatever its value.

use nav_route_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::{check_weight, EdgeCostFunction};
use crate::graph::{EdgeView, Metadata};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SemanticScorerConfig {
    pub weight: f64,
    pub semantic_key: String,
    /// Class name -> cost
    pub classes: BTreeMap<String, f64>,
}

impl Default for SemanticScorerConfig {
    fn default() -> Self {
        Self {
            weight: 1.0,
            semantic_key: "class".to_string(),
            classes: BTreeMap::new(),
        }
    }
}

pub struct SemanticScorer {
    name: String,
    config: SemanticScorerConfig,
}

impl SemanticScorer {
    pub fn new(name: impl Into<String>, config: SemanticScorerConfig) -> Result<Self> {
        let name = name.into();
        check_weight(&name, config.weight)?;
        if let Some((class, cost)) = config.classes.iter().find(|(_, c)| !c.is_finite()) {
            return Err(Error::config(
                &name,
                format!("class '{class}' has non-finite cost {cost}"),
            ));
        }
        if config.classes.is_empty() {
            debug!(scorer = %name, "no semantic classes configured");
        }
        Ok(Self { name, config })
    }

    fn class_cost(&self, meta: &Metadata) -> f64 {
        if self.config.semantic_key.is_empty() {
            self.config
                .classes
                .iter()
                .filter(|(class, _)| meta.contains_key(class))
                .map(|(_, cost)| cost)
                .sum()
        } else {
            meta.opt_str(&self.config.semantic_key)
                .ok()
                .flatten()
                .and_then(|class| self.config.classes.get(class))
                .copied()
                .unwrap_or(0.0)
        }
    }
}

impl EdgeCostFunction for SemanticScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, edge: &EdgeView<'_>) -> Option<f64> {
        let cost = self.class_cost(edge.metadata()) + self.class_cost(&edge.end.metadata);
        Some(self.config.weight * cost)
    }
}
