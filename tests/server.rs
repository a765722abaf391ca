//! HTTP API round trips against the router

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use nav_route::{build_router, Graph, RouteServerConfig, RouteService};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const GRAPH: &str = r#"{
    "nodes": [
        {"id": 1, "x": 0.5, "y": 0.5},
        {"id": 2, "x": 2.5, "y": 0.5},
        {"id": 3, "x": 4.5, "y": 0.5},
        {"id": 4, "x": 2.5, "y": 2.5}
    ],
    "edges": [
        {"id": 10, "start": 1, "end": 2},
        {"id": 11, "start": 2, "end": 3},
        {"id": 12, "start": 1, "end": 4},
        {"id": 13, "start": 4, "end": 3}
    ]
}"#;

fn app(config: &str) -> Router {
    let graph = Graph::from_json(GRAPH).unwrap();
    let config = RouteServerConfig::from_toml_str(config).unwrap();
    build_router(Arc::new(RouteService::new(graph, config).unwrap()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app("");
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["nodes"], 4);
    assert_eq!(body["plugins"], json!(["DistanceScorer", "AdjustEdgesScorer"]));
    assert_eq!(body["costmap"], false);
}

#[tokio::test]
async fn test_closing_an_edge_changes_the_route() {
    let app = app("");

    let (status, body) = send(
        &app,
        "POST",
        "/route",
        Some(json!({"start_id": 1, "goal_id": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["edges"], json!([10, 11]));

    let (status, body) = send(
        &app,
        "POST",
        "/adjust_edges",
        Some(json!({"closed_edges": [11]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = send(&app, "POST", "/score", Some(json!({"edges": [10, 11]}))).await;
    assert_eq!(body["scores"][0]["valid"], true);
    assert_eq!(body["scores"][0]["cost"], 2.0);
    assert_eq!(body["scores"][1]["valid"], false);
    assert_eq!(body["scores"][1]["cost"], Value::Null);

    let (status, body) = send(
        &app,
        "POST",
        "/route",
        Some(json!({"start": [0.4, 0.6], "goal": [4.4, 0.4]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["edges"], json!([12, 13]));
    assert_eq!(body["path"]["frame_id"], "map");
}

#[tokio::test]
async fn test_costmap_updates() {
    let app = app(
        r#"
        [scoring]
        edge_cost_functions = ["DistanceScorer", "CostmapScorer"]
        "#,
    );

    // Before any grid arrives the costmap scorer rejects everything
    let (_, body) = send(&app, "POST", "/score", Some(json!({"edges": [10]}))).await;
    assert_eq!(body["scores"][0]["valid"], false);

    let mut data = vec![0u8; 25];
    data[2 * 5 + 2] = 254; // cell (2, 2) under node 4
    let (status, _) = send(
        &app,
        "PUT",
        "/costmap",
        Some(json!({
            "width": 5, "height": 5, "resolution": 1.0,
            "origin_x": 0.0, "origin_y": 0.0, "data": data
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "POST", "/score", Some(json!({"edges": [10, 13]}))).await;
    assert_eq!(body["scores"][0]["valid"], true);
    assert_eq!(body["scores"][1]["valid"], false);

    let (status, body) = send(
        &app,
        "PUT",
        "/costmap",
        Some(json!({"width": 5, "height": 5, "resolution": 1.0, "data": [0, 0, 0]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("occupancy grid"));
}

#[tokio::test]
async fn test_route_errors() {
    let app = app("");

    let (status, _) = send(
        &app,
        "POST",
        "/route",
        Some(json!({"start_id": 1, "goal_id": 99})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/route", Some(json!({"goal_id": 3}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/route", Some(json!({"start_id": 3, "goal_id": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rerouting_request() {
    let app = app("path_density = 0.5");
    let (status, body) = send(
        &app,
        "POST",
        "/route",
        Some(json!({
            "goal_id": 3,
            "rerouting": {"edgeid": 10, "x": 1.5, "y": 0.9}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["start_id"], 2);
    assert_eq!(body["edges"], json!([11]));
    assert_eq!(body["path"]["poses"][0], json!({"x": 1.5, "y": 0.5}));
}

#[tokio::test]
async fn test_config_reload_over_http() {
    let app = app("");
    send(&app, "POST", "/adjust_edges", Some(json!({"closed_edges": [11]}))).await;

    let reload = |toml: &'static str| {
        Request::builder()
            .method("PUT")
            .uri("/config")
            .header("content-type", "application/toml")
            .body(Body::from(toml))
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(reload(
            r#"
            [scoring]
            edge_cost_functions = ["DistanceScorer", "PenaltyScorer", "AdjustEdgesScorer"]
            "#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(
        body["plugins"],
        json!(["DistanceScorer", "PenaltyScorer", "AdjustEdgesScorer"])
    );
    // Closure made before the reload still holds
    let (_, body) = send(&app, "POST", "/score", Some(json!({"edges": [11]}))).await;
    assert_eq!(body["scores"][0]["valid"], false);

    let response = app
        .clone()
        .oneshot(reload("path_density = -1.0\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = app("");
    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/route"].is_object());
    assert!(body["components"]["schemas"]["DensePath"]["properties"]["poses"].is_object());
    assert!(body["components"]["schemas"]["RouteResponse"].is_object());
}
