//! HTTP surface of the route server
//!
//! Delivers edge adjustments and occupancy grids to the scoring engine and
//! answers scoring and routing queries.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use nav_route_common::{Error, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::adjustments::{AdjustEdgesRequest, AdjustEdgesResponse, EdgeCost};
use crate::config::RouteServerConfig;
use crate::costmap::{GridMessage, OccupancyGrid};
use crate::edge_scorer::EdgeScorer;
use crate::geometry::Coordinates;
use crate::graph::{EdgeId, Graph, NodeId, NodeIndex};
use crate::path_converter::{DensePath, PathConverter};
use crate::route::{find_route, ReroutingState};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        adjust_edges_handler,
        costmap_handler,
        score_handler,
        route_handler,
        config_handler
    ),
    components(schemas(
        AdjustEdgesRequest,
        AdjustEdgesResponse,
        EdgeCost,
        GridMessage,
        ScoreRequest,
        ScoreResponse,
        EdgeScore,
        RouteRequest,
        ReroutingRequest,
        RouteResponse,
        DensePath,
        Coordinates,
        HealthResponse,
        ErrorResponse
    ))
)]
struct ApiDoc;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreRequest {
    /// Edge ids to score
    #[schema(example = json!([10, 11]))]
    pub edges: Vec<EdgeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EdgeScore {
    pub edgeid: EdgeId,
    pub valid: bool,
    /// Total cost, absent when the edge is rejected
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreResponse {
    pub scores: Vec<EdgeScore>,
}

/// Robot position on the edge it is currently driving
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReroutingRequest {
    pub edgeid: EdgeId,
    pub x: f64,
    pub y: f64,
}

/// Route query; each end is given either by node id or by position
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RouteRequest {
    #[serde(default)]
    pub start_id: Option<NodeId>,
    #[serde(default)]
    pub goal_id: Option<NodeId>,
    /// Start position [x, y], snapped to the nearest node
    #[serde(default)]
    #[schema(example = json!([0.0, 0.0]))]
    pub start: Option<[f64; 2]>,
    /// Goal position [x, y], snapped to the nearest node
    #[serde(default)]
    #[schema(example = json!([12.5, 3.0]))]
    pub goal: Option<[f64; 2]>,
    #[serde(default)]
    pub rerouting: Option<ReroutingRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RouteResponse {
    /// Node the search started from
    pub start_id: NodeId,
    pub goal_id: NodeId,
    /// Edge ids in travel order
    pub edges: Vec<EdgeId>,
    pub cost: f64,
    pub path: DensePath,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub nodes: usize,
    pub edges: usize,
    /// Configured edge cost functions, in scoring order
    pub plugins: Vec<String>,
    /// Whether an occupancy grid has been received
    pub costmap: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: Error) -> ApiError {
    let status = match &err {
        Error::UnknownNode(_) | Error::UnknownEdge(_) | Error::NoRoute { .. } => {
            StatusCode::NOT_FOUND
        }
        Error::InvalidGrid(_)
        | Error::InvalidRoute(_)
        | Error::InvalidConfig { .. }
        | Error::Parse { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Graph, scoring engine and path converter behind the HTTP handlers
pub struct RouteService {
    graph: Graph,
    scorer: RwLock<Arc<EdgeScorer>>,
    converter: PathConverter,
    config: RwLock<Arc<RouteServerConfig>>,
}

impl RouteService {
    pub fn new(graph: Graph, config: RouteServerConfig) -> Result<Self> {
        config.validate()?;
        let scorer = EdgeScorer::new(&config.scoring)?;
        let converter = PathConverter::new(config.path_converter())?;
        Ok(Self {
            graph,
            scorer: RwLock::new(Arc::new(scorer)),
            converter,
            config: RwLock::new(Arc::new(config)),
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Engine in use; a reload swaps it for later calls only
    pub fn scorer(&self) -> Arc<EdgeScorer> {
        self.scorer.read().clone()
    }

    pub fn config(&self) -> Arc<RouteServerConfig> {
        self.config.read().clone()
    }

    /// Rebuild the scoring engine and path converter from `config`
    ///
    /// Closures, cost overrides and the current grid carry over. On error the
    /// running configuration stays in place.
    pub fn reload(&self, config: RouteServerConfig) -> Result<()> {
        config.validate()?;
        let current = self.scorer();
        let scorer = EdgeScorer::with_shared_state(
            &config.scoring,
            Arc::clone(current.adjustments()),
            Arc::clone(current.costmap()),
        )?;
        self.converter.reconfigure(config.path_converter())?;

        info!(
            plugins = scorer.num_plugins(),
            route_frame = %config.route_frame,
            "route server reconfigured"
        );
        *self.scorer.write() = Arc::new(scorer);
        *self.config.write() = Arc::new(config);
        Ok(())
    }

    pub fn adjust_edges(&self, req: &AdjustEdgesRequest) -> AdjustEdgesResponse {
        self.scorer().adjust_edges(req)
    }

    pub fn update_costmap(&self, msg: GridMessage) -> Result<()> {
        let grid = OccupancyGrid::try_from(msg)?;
        self.scorer().update_costmap(grid);
        Ok(())
    }

    pub fn score_edges(&self, ids: &[EdgeId]) -> Result<Vec<EdgeScore>> {
        let scorer = self.scorer();
        ids.iter()
            .map(|&edgeid| {
                let idx = self
                    .graph
                    .edge_index(edgeid)
                    .ok_or(Error::UnknownEdge(edgeid))?;
                let cost = scorer.score(&self.graph.edge_view(idx));
                Ok(EdgeScore {
                    edgeid,
                    valid: cost.is_some(),
                    cost,
                })
            })
            .collect()
    }

    /// Search a route and densify it
    ///
    /// While rerouting, the search starts at the end of the edge being
    /// driven and the path begins at the robot's projection onto that edge.
    pub fn compute_route(&self, req: &RouteRequest) -> Result<RouteResponse> {
        let t = Instant::now();
        let scorer = self.scorer();
        let max_planning_time = self.config().max_planning_time;

        let rerouting = req
            .rerouting
            .as_ref()
            .map(|r| {
                let edge = self
                    .graph
                    .edge_index(r.edgeid)
                    .ok_or(Error::UnknownEdge(r.edgeid))?;
                Ok::<_, Error>(ReroutingState::from_pose(
                    &self.graph,
                    edge,
                    Coordinates::new(r.x, r.y),
                ))
            })
            .transpose()?;

        let start = match &rerouting {
            Some(state) => self.graph.edge(state.curr_edge).end,
            None => self.resolve_node(req.start_id, req.start, "start")?,
        };
        let goal = self.resolve_node(req.goal_id, req.goal, "goal")?;
        let start_id = self.graph.node(start).nodeid;
        let goal_id = self.graph.node(goal).nodeid;

        let route = find_route(&self.graph, &scorer, start_id, goal_id)?;
        let path = self
            .converter
            .densify(&self.graph, &route, rerouting.as_ref());

        let elapsed = t.elapsed().as_secs_f64();
        if elapsed > max_planning_time {
            warn!(
                elapsed_s = elapsed,
                max_planning_time,
                start = start_id,
                goal = goal_id,
                "route planning exceeded the time budget"
            );
        }

        Ok(RouteResponse {
            start_id,
            goal_id,
            edges: route
                .edges
                .iter()
                .map(|&e| self.graph.edge(e).edgeid)
                .collect(),
            cost: route.cost,
            path,
        })
    }

    fn resolve_node(
        &self,
        id: Option<NodeId>,
        position: Option<[f64; 2]>,
        which: &str,
    ) -> Result<NodeIndex> {
        match (id, position) {
            (Some(id), _) => self.graph.node_index(id).ok_or(Error::UnknownNode(id)),
            (None, Some([x, y])) => self
                .graph
                .nearest_node(Coordinates::new(x, y))
                .ok_or_else(|| Error::InvalidRoute("graph has no nodes".to_string())),
            (None, None) => Err(Error::InvalidRoute(format!(
                "request needs {which}_id or {which}"
            ))),
        }
    }

    pub fn health(&self) -> HealthResponse {
        let scorer = self.scorer();
        HealthResponse {
            status: "ok".to_string(),
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            plugins: scorer
                .plugin_names()
                .into_iter()
                .map(String::from)
                .collect(),
            costmap: scorer.costmap().has_grid(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Server is up", body = HealthResponse)),
    tag = "status"
)]
async fn health_handler(State(service): State<Arc<RouteService>>) -> Json<HealthResponse> {
    Json(service.health())
}

#[utoipa::path(
    post,
    path = "/adjust_edges",
    request_body = AdjustEdgesRequest,
    responses((status = 200, description = "Adjustments applied", body = AdjustEdgesResponse)),
    tag = "scoring"
)]
async fn adjust_edges_handler(
    State(service): State<Arc<RouteService>>,
    Json(req): Json<AdjustEdgesRequest>,
) -> Json<AdjustEdgesResponse> {
    Json(service.adjust_edges(&req))
}

#[utoipa::path(
    put,
    path = "/costmap",
    request_body = GridMessage,
    responses(
        (status = 204, description = "Occupancy grid replaced"),
        (status = 400, description = "Malformed grid", body = ErrorResponse)
    ),
    tag = "scoring"
)]
async fn costmap_handler(
    State(service): State<Arc<RouteService>>,
    Json(msg): Json<GridMessage>,
) -> std::result::Result<StatusCode, ApiError> {
    service.update_costmap(msg).map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/score",
    request_body = ScoreRequest,
    responses(
        (status = 200, description = "Per-edge verdicts", body = ScoreResponse),
        (status = 404, description = "Unknown edge id", body = ErrorResponse)
    ),
    tag = "scoring"
)]
async fn score_handler(
    State(service): State<Arc<RouteService>>,
    Json(req): Json<ScoreRequest>,
) -> std::result::Result<Json<ScoreResponse>, ApiError> {
    let scores = service.score_edges(&req.edges).map_err(api_error)?;
    Ok(Json(ScoreResponse { scores }))
}

#[utoipa::path(
    post,
    path = "/route",
    request_body = RouteRequest,
    responses(
        (status = 200, description = "Route found", body = RouteResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown node or edge, or no route", body = ErrorResponse)
    ),
    tag = "routing"
)]
async fn route_handler(
    State(service): State<Arc<RouteService>>,
    Json(req): Json<RouteRequest>,
) -> std::result::Result<Json<RouteResponse>, ApiError> {
    // Searching is CPU-bound; keep it off the async workers
    let result = tokio::task::spawn_blocking(move || service.compute_route(&req))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("route task failed: {e}"),
                }),
            )
        })?;
    result.map(Json).map_err(api_error)
}

#[utoipa::path(
    put,
    path = "/config",
    request_body(
        content = String,
        content_type = "application/toml",
        description = "Route server config"
    ),
    responses(
        (status = 204, description = "Scoring engine and path converter rebuilt"),
        (status = 400, description = "Invalid config", body = ErrorResponse)
    ),
    tag = "status"
)]
async fn config_handler(
    State(service): State<Arc<RouteService>>,
    body: String,
) -> std::result::Result<StatusCode, ApiError> {
    let config = RouteServerConfig::from_toml_str(&body).map_err(api_error)?;
    service.reload(config).map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn build_router(service: Arc<RouteService>) -> Router {
    Router::new()
        .route("/api-docs/openapi.json", get(openapi_handler))
        .route("/health", get(health_handler))
        .route("/adjust_edges", post(adjust_edges_handler))
        .route("/costmap", put(costmap_handler))
        .route("/score", post(score_handler))
        .route("/route", post(route_handler))
        .route("/config", put(config_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

pub async fn run_server(service: RouteService, port: u16) -> anyhow::Result<()> {
    let app = build_router(Arc::new(service));

    let addr = format!("0.0.0.0:{}", port);
    info!(%addr, "route server listening");
    info!("OpenAPI document at http://{}/api-docs/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
