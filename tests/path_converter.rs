//! Search followed by densification, as the route server runs them

use nav_route::{
    find_route, Coordinates, EdgeScorer, Graph, PathConverter, PathConverterConfig,
    ReroutingState, Route, RouteServerConfig,
};

/// L-shaped corridor: 1 (0,0) -> 2 (2,0) -> 3 (2,1)
fn l_graph() -> Graph {
    let mut graph = Graph::new();
    graph.add_node(1, Coordinates::new(0.0, 0.0)).unwrap();
    graph.add_node(2, Coordinates::new(2.0, 0.0)).unwrap();
    graph.add_node(3, Coordinates::new(2.0, 1.0)).unwrap();
    graph.add_edge(10, 1, 2).unwrap();
    graph.add_edge(11, 2, 3).unwrap();
    graph
}

fn max_gap(poses: &[Coordinates]) -> f64 {
    poses
        .windows(2)
        .map(|w| w[0].distance(&w[1]))
        .fold(0.0, f64::max)
}

#[test]
fn test_found_route_densified_at_configured_spacing() {
    let graph = l_graph();
    let config = RouteServerConfig::from_toml_str("path_density = 0.1\nroute_frame = \"odom\"")
        .unwrap();
    let scorer = EdgeScorer::new(&config.scoring).unwrap();
    let converter = PathConverter::new(config.path_converter()).unwrap();

    let route = find_route(&graph, &scorer, 1, 3).unwrap();
    let path = converter.densify(&graph, &route, None);

    assert_eq!(path.frame_id, "odom");
    // 20 + 10 interpolated points plus the goal
    assert_eq!(path.poses.len(), 31);
    assert_eq!(path.poses.first(), Some(&Coordinates::new(0.0, 0.0)));
    assert_eq!(path.poses.last(), Some(&Coordinates::new(2.0, 1.0)));
    assert!(max_gap(&path.poses) <= 0.1 + 1e-9);
}

#[test]
fn test_rerouting_continues_from_robot_projection() {
    let graph = l_graph();
    let converter = PathConverter::new(PathConverterConfig {
        path_density: 0.5,
        ..Default::default()
    })
    .unwrap();

    let e10 = graph.edge_index(10).unwrap();
    let e11 = graph.edge_index(11).unwrap();
    let state = ReroutingState::from_pose(&graph, e10, Coordinates::new(1.0, 0.4));
    let route = Route::new(&graph, graph.node_index(2).unwrap(), vec![e11]).unwrap();

    let path = converter.densify(&graph, &route, Some(&state));

    // (1,0) (1.5,0) | (2,0) (2,0.5) | (2,1)
    assert_eq!(path.poses.len(), 5);
    assert_eq!(path.poses[0], Coordinates::new(1.0, 0.0));
    assert_eq!(path.poses[2], Coordinates::new(2.0, 0.0));
    assert_eq!(path.poses[4], Coordinates::new(2.0, 1.0));
    // No jump back to the start of the current edge
    assert!(path.poses.iter().all(|p| p.x >= 1.0));
}

#[test]
fn test_degenerate_edge_emits_single_point() {
    let mut graph = Graph::new();
    graph.add_node(1, Coordinates::new(3.0, 3.0)).unwrap();
    graph.add_node(2, Coordinates::new(3.0, 3.0)).unwrap();
    let e = graph.add_edge(10, 1, 2).unwrap();

    let converter = PathConverter::new(PathConverterConfig::default()).unwrap();
    let route = Route::new(&graph, graph.node_index(1).unwrap(), vec![e]).unwrap();
    let path = converter.densify(&graph, &route, None);

    assert_eq!(path.poses, vec![Coordinates::new(3.0, 3.0); 2]);
}

#[test]
fn test_segment_cap_bounds_output() {
    let mut graph = Graph::new();
    graph.add_node(1, Coordinates::new(0.0, 0.0)).unwrap();
    graph.add_node(2, Coordinates::new(1.0e6, 0.0)).unwrap();
    let e = graph.add_edge(10, 1, 2).unwrap();

    let converter = PathConverter::new(PathConverterConfig {
        path_density: 1e-6,
        max_points_per_segment: 1000,
        ..Default::default()
    })
    .unwrap();
    let route = Route::new(&graph, graph.node_index(1).unwrap(), vec![e]).unwrap();

    assert_eq!(converter.densify(&graph, &route, None).poses.len(), 1001);
}
