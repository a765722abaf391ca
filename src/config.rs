//! Route server configuration (TOML)
//!
//! ```toml
//! route_frame = "map"
//! path_density = 0.05
//!
//! [scoring]
//! edge_cost_functions = ["DistanceScorer", "tight_costmap", "AdjustEdgesScorer"]
//!
//! [scoring.tight_costmap]
//! plugin = "nav_route::CostmapScorer"
//! use_maximum = false
//! ```

use nav_route_common::{suggest_correction, Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::path_converter::PathConverterConfig;
use crate::scorers::ScorerKind;

/// Edge scorer plugin list plus one parameter table per plugin name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Plugin instance names, scored in this order
    pub edge_cost_functions: Vec<String>,
    /// Parameter tables keyed by plugin instance name
    #[serde(flatten)]
    pub plugins: BTreeMap<String, toml::Table>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            edge_cost_functions: vec![
                ScorerKind::Distance.type_name().to_string(),
                ScorerKind::AdjustEdges.type_name().to_string(),
            ],
            plugins: BTreeMap::new(),
        }
    }
}

impl ScoringConfig {
    /// Config scoring with exactly the given plugin type names
    pub fn with_plugins<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            edge_cost_functions: names.into_iter().map(Into::into).collect(),
            plugins: BTreeMap::new(),
        }
    }

    /// Attach a parameter table for plugin instance `name`
    pub fn set_params(&mut self, name: impl Into<String>, params: toml::Table) {
        self.plugins.insert(name.into(), params);
    }

    /// Resolve the plugin type of instance `name` and its remaining options
    pub fn plugin_params(&self, name: &str) -> Result<(ScorerKind, toml::Table)> {
        let mut params = match self.plugins.get(name) {
            Some(table) => table.clone(),
            None if ScorerKind::from_type_name(name).is_some() => toml::Table::new(),
            None => {
                return Err(Error::config(
                    name,
                    "no parameter block and the name is not a scorer type",
                ))
            }
        };

        let plugin = match params.remove("plugin") {
            Some(toml::Value::String(plugin)) => plugin,
            Some(other) => {
                return Err(Error::config(
                    name,
                    format!("'plugin' must be a string, got {}", other.type_str()),
                ))
            }
            None => name.to_string(),
        };

        let kind = ScorerKind::from_type_name(&plugin).ok_or_else(|| {
            let bare = plugin.rsplit("::").next().unwrap_or(&plugin);
            Error::UnknownScorer {
                suggestion: suggest_correction(bare, &ScorerKind::type_names()),
                name: plugin.clone(),
            }
        })?;

        Ok((kind, params))
    }
}

/// Decode a scorer's option table into its config struct
pub(crate) fn parse_params<T: DeserializeOwned>(scope: &str, params: toml::Table) -> Result<T> {
    toml::Value::Table(params)
        .try_into()
        .map_err(|e: toml::de::Error| Error::config(scope, e.message().to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteServerConfig {
    /// Frame label stamped on produced paths
    pub route_frame: String,
    /// Spacing between densified path points (m)
    pub path_density: f64,
    pub max_points_per_segment: usize,
    /// Searches slower than this are logged (s)
    pub max_planning_time: f64,
    pub scoring: ScoringConfig,
}

impl Default for RouteServerConfig {
    fn default() -> Self {
        Self {
            route_frame: "map".to_string(),
            path_density: 0.05,
            max_points_per_segment: 1_000_000,
            max_planning_time: 2.0,
            scoring: ScoringConfig::default(),
        }
    }
}

impl RouteServerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Parse {
            what: "route server config".to_string(),
            reason: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text).map_err(|e| Error::Parse {
            what: path.display().to_string(),
            reason: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.path_density > 0.0 && self.path_density.is_finite()) {
            return Err(Error::config(
                "path_density",
                format!("must be positive and finite, got {}", self.path_density),
            ));
        }
        if self.max_points_per_segment == 0 {
            return Err(Error::config("max_points_per_segment", "must be at least 1"));
        }
        if !(self.max_planning_time > 0.0) {
            return Err(Error::config(
                "max_planning_time",
                format!("must be positive, got {}", self.max_planning_time),
            ));
        }
        if self.route_frame.is_empty() {
            return Err(Error::config("route_frame", "must not be empty"));
        }
        Ok(())
    }

    pub fn path_converter(&self) -> PathConverterConfig {
        PathConverterConfig {
            path_density: self.path_density,
            route_frame: self.route_frame.clone(),
            max_points_per_segment: self.max_points_per_segment,
        }
    }
}
