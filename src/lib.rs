//! nav-route - edge scoring and path densification for mobile-robot route graphs
//!
//! The [`EdgeScorer`] folds a configured list of scorer plugins into one
//! traversal cost per edge, with runtime closures, cost overrides and a live
//! occupancy grid. The [`PathConverter`] turns a found [`Route`] into an evenly
//! spaced [`DensePath`].

pub mod adjustments;
pub mod config;
pub mod costmap;
pub mod edge_scorer;
pub mod geometry;
pub mod graph;
pub mod path_converter;
pub mod route;
pub mod scorers;
pub mod server;

pub use adjustments::{AdjustEdgesRequest, AdjustEdgesResponse, EdgeAdjustments, EdgeCost};
pub use config::{RouteServerConfig, ScoringConfig};
pub use costmap::{GridMessage, OccupancyGrid, SharedCostmap};
pub use edge_scorer::EdgeScorer;
pub use geometry::Coordinates;
pub use graph::{EdgeId, EdgeView, Graph, Metadata, MetadataValue, NodeId};
pub use nav_route_common::{Error, Result};
pub use path_converter::{DensePath, PathConverter, PathConverterConfig};
pub use route::{find_route, ReroutingState, Route};
pub use scorers::{EdgeCostFunction, ScorerKind};
pub use server::{build_router, run_server, RouteService};
