//! Scoring engine driven through TOML configuration

use nav_route::{
    AdjustEdgesRequest, Coordinates, EdgeCost, EdgeScorer, Error, Graph, OccupancyGrid,
    RouteServerConfig, SharedCostmap,
};
use std::sync::Arc;

fn corridor() -> Graph {
    Graph::from_json(
        r#"{
            "nodes": [
                {"id": 1, "x": 1.0, "y": 1.0},
                {"id": 2, "x": 4.0, "y": 1.0, "metadata": {"class": "hall"}},
                {"id": 3, "x": 4.0, "y": 5.0}
            ],
            "edges": [
                {"id": 10, "start": 1, "end": 2, "metadata": {"penalty": 2.0, "class": "hall"}},
                {"id": 11, "start": 2, "end": 3, "metadata": {"speed_limit": 0.5}}
            ]
        }"#,
    )
    .unwrap()
}

fn scorer_from(toml: &str) -> EdgeScorer {
    let config = RouteServerConfig::from_toml_str(toml).unwrap();
    EdgeScorer::new(&config.scoring).unwrap()
}

#[test]
fn test_configured_plugins_are_summed_in_order() {
    let graph = corridor();
    let scorer = scorer_from(
        r#"
        [scoring]
        edge_cost_functions = ["DistanceScorer", "PenaltyScorer", "hall_cost"]

        [scoring.hall_cost]
        plugin = "nav_route::SemanticScorer"
        classes = { hall = 0.5 }
        "#,
    );

    assert_eq!(
        scorer.plugin_names(),
        vec!["DistanceScorer", "PenaltyScorer", "hall_cost"]
    );

    let e10 = graph.edge_view(graph.edge_index(10).unwrap());
    // 3m + penalty 2 + hall on edge and end node
    assert_eq!(scorer.score(&e10), Some(6.0));

    let e11 = graph.edge_view(graph.edge_index(11).unwrap());
    // 4m at half speed, no penalty, no class
    assert_eq!(scorer.score(&e11), Some(8.0));
}

#[test]
fn test_time_scorer_from_config() {
    let graph = corridor();
    let scorer = scorer_from(
        r#"
        [scoring]
        edge_cost_functions = ["TimeScorer"]

        [scoring.TimeScorer]
        max_vel = 2.0
        "#,
    );

    let e11 = graph.edge_view(graph.edge_index(11).unwrap());
    assert_eq!(scorer.score(&e11), Some(2.0));
}

#[test]
fn test_closures_and_overrides_through_engine() {
    let graph = corridor();
    let scorer = scorer_from("");
    let e10 = graph.edge_view(graph.edge_index(10).unwrap());
    let e11 = graph.edge_view(graph.edge_index(11).unwrap());

    let resp = scorer.adjust_edges(&AdjustEdgesRequest {
        closed_edges: vec![10, 4242],
        opened_edges: vec![],
        adjust_edges: vec![EdgeCost {
            edgeid: 11,
            cost: 5.0,
        }],
    });
    assert!(resp.success);
    assert_eq!(scorer.score(&e10), None);
    // 4m at half speed plus the override
    assert_eq!(scorer.score(&e11), Some(13.0));

    scorer.adjust_edges(&AdjustEdgesRequest {
        opened_edges: vec![10],
        ..Default::default()
    });
    assert_eq!(scorer.score(&e10), Some(3.0));
}

#[test]
fn test_costmap_scorer_with_live_grid() {
    let graph = corridor();
    let config = RouteServerConfig::from_toml_str(
        r#"
        [scoring]
        edge_cost_functions = ["CostmapScorer"]
        "#,
    )
    .unwrap();
    let costmap = Arc::new(SharedCostmap::new());
    let scorer =
        EdgeScorer::with_shared_state(&config.scoring, Default::default(), costmap.clone())
            .unwrap();
    let e10 = graph.edge_view(graph.edge_index(10).unwrap());

    // No grid yet
    assert_eq!(scorer.score(&e10), None);

    let mut grid = OccupancyGrid::new(100, 100, 0.1, Coordinates::default(), 0).unwrap();
    for mx in 0..100 {
        grid.set_cost(mx, 10, 127);
    }
    scorer.update_costmap(grid);
    let cost = scorer.score(&e10).unwrap();
    assert!((cost - 0.5).abs() < 1e-9);

    let mut blocked = OccupancyGrid::new(100, 100, 0.1, Coordinates::default(), 0).unwrap();
    for mx in 24..=26 {
        blocked.set_cost(mx, 10, 254);
    }
    costmap.update(blocked);
    assert_eq!(scorer.score(&e10), None);
}

#[test]
fn test_construction_errors() {
    let config = RouteServerConfig::from_toml_str(
        r#"
        [scoring]
        edge_cost_functions = ["costs"]

        [scoring.costs]
        plugin = "CostMapScorer"
        "#,
    )
    .unwrap();
    match EdgeScorer::new(&config.scoring) {
        Err(Error::UnknownScorer { suggestion, .. }) => {
            assert_eq!(suggestion.as_deref(), Some("CostmapScorer"));
        }
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("unknown plugin accepted"),
    }

    let config = RouteServerConfig::from_toml_str(
        r#"
        [scoring]
        edge_cost_functions = ["PenaltyScorer"]

        [scoring.PenaltyScorer]
        penalty_key = "toll"
        "#,
    )
    .unwrap();
    assert!(matches!(
        EdgeScorer::new(&config.scoring),
        Err(Error::InvalidConfig { .. })
    ));
}
