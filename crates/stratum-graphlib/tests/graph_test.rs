use stratum_graphlib::{alg, EdgeKey, Graph, GraphOptions};

fn directed() -> Graph<(), i64, ()> {
    Graph::new(GraphOptions::default())
}

#[test]
fn nodes_keep_insertion_order() {
    let mut g = directed();
    g.set_node("b", ());
    g.set_node("a", ());
    g.set_node("c", ());
    assert_eq!(g.nodes().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    assert_eq!(g.node_count(), 3);
}

#[test]
fn set_node_overwrites_without_duplicating() {
    let mut g: Graph<i64, i64, ()> = Graph::new(GraphOptions::default());
    g.set_node("a", 1);
    g.set_node("a", 2);
    assert_eq!(g.node_count(), 1);
    assert_eq!(g.node("a"), Some(&2));
}

#[test]
fn edges_create_missing_endpoints() {
    let mut g = directed();
    g.set_edge_with_label("a", "b", 7);
    assert!(g.has_node("a"));
    assert!(g.has_node("b"));
    assert_eq!(g.edge("a", "b", None), Some(&7));
    assert_eq!(g.edge("b", "a", None), None);
}

#[test]
fn multigraph_edges_are_distinguished_by_name() {
    let mut g: Graph<(), i64, ()> = Graph::new(GraphOptions {
        multigraph: true,
        ..Default::default()
    });
    g.set_edge_named("a", "b", Some("x"), Some(1));
    g.set_edge_named("a", "b", Some("y"), Some(2));
    g.set_edge_named("a", "b", None::<&str>, Some(3));
    assert_eq!(g.edge_count(), 3);
    assert_eq!(g.edge("a", "b", Some("x")), Some(&1));
    assert_eq!(g.edge("a", "b", Some("y")), Some(&2));
    assert_eq!(g.edge("a", "b", None), Some(&3));
}

#[test]
fn non_multigraph_ignores_edge_names() {
    let mut g = directed();
    g.set_edge_named("a", "b", Some("x"), Some(1));
    g.set_edge_named("a", "b", Some("y"), Some(2));
    assert_eq!(g.edge_count(), 1);
    assert_eq!(g.edge("a", "b", None), Some(&2));
}

#[test]
fn undirected_edges_ignore_endpoint_order() {
    let mut g: Graph<(), i64, ()> = Graph::new(GraphOptions {
        directed: false,
        ..Default::default()
    });
    g.set_edge_with_label("b", "a", 5);
    assert_eq!(g.edge("a", "b", None), Some(&5));
    assert_eq!(g.edge("b", "a", None), Some(&5));
    assert!(g.has_edge("a", "b", None));
}

#[test]
fn removing_a_node_removes_incident_edges() {
    let mut g = directed();
    g.set_path(&["a", "b", "c"]);
    g.set_edge("a", "c");
    assert!(g.remove_node("b"));
    assert_eq!(g.node_count(), 2);
    assert_eq!(g.edge_count(), 1);
    assert!(g.has_edge("a", "c", None));
    assert!(!g.remove_node("b"));
}

#[test]
fn adjacency_reflects_edge_direction() {
    let mut g = directed();
    g.set_edge("a", "b");
    g.set_edge("a", "c");
    g.set_edge("d", "a");
    assert_eq!(g.successors("a"), vec!["b", "c"]);
    assert_eq!(g.predecessors("a"), vec!["d"]);
    assert_eq!(g.neighbors("a"), vec!["b", "c", "d"]);
    assert_eq!(g.sources(), vec!["a", "d"]);
}

#[test]
fn out_edges_can_filter_by_target() {
    let mut g: Graph<(), i64, ()> = Graph::new(GraphOptions {
        multigraph: true,
        ..Default::default()
    });
    g.set_edge_named("a", "b", Some("1"), Some(1));
    g.set_edge_named("a", "b", Some("2"), Some(2));
    g.set_edge("a", "c");
    assert_eq!(g.out_edges("a", None).len(), 3);
    let to_b = g.out_edges("a", Some("b"));
    assert_eq!(to_b.len(), 2);
    assert!(to_b.iter().all(|e| e.w == "b"));
    assert_eq!(g.in_edges("b", Some("a")).len(), 2);
}

#[test]
fn compound_relation_tracks_parents_and_children() {
    let mut g: Graph<(), i64, ()> = Graph::new(GraphOptions {
        compound: true,
        ..Default::default()
    });
    g.set_node("p", ());
    g.set_parent("a", "p");
    g.set_parent("b", "p");
    assert_eq!(g.parent("a"), Some("p"));
    assert_eq!(g.children("p"), vec!["a", "b"]);
    assert_eq!(g.root_children(), vec!["p"]);

    g.set_parent("a", "q");
    assert_eq!(g.children("p"), vec!["b"]);
    assert_eq!(g.parent("a"), Some("q"));

    g.clear_parent("a");
    assert_eq!(g.parent("a"), None);

    g.remove_node("p");
    assert_eq!(g.parent("b"), None);
}

#[test]
fn edge_key_roundtrips_through_set_edge_key() {
    let mut g: Graph<(), i64, ()> = Graph::new(GraphOptions {
        multigraph: true,
        ..Default::default()
    });
    let key = EdgeKey::new("a", "b", Some("k"));
    g.set_edge_key(key.clone(), 9);
    assert_eq!(g.edge_by_key(&key), Some(&9));
    assert!(g.remove_edge_key(&key));
    assert_eq!(g.edge_by_key(&key), None);
}

#[test]
fn preorder_and_postorder_visit_successors() {
    let mut g = directed();
    g.set_path(&["a", "b", "c"]);
    g.set_edge("a", "d");
    assert_eq!(alg::preorder(&g, &["a"]), vec!["a", "b", "c", "d"]);
    assert_eq!(alg::postorder(&g, &["a"]), vec!["c", "b", "d", "a"]);
}

#[test]
fn components_group_weakly_connected_nodes() {
    let mut g = directed();
    g.set_path(&["a", "b"]);
    g.set_edge("c", "b");
    g.set_node("lonely", ());
    let comps = alg::components(&g);
    assert_eq!(comps.len(), 2);
    assert_eq!(comps[0], vec!["a", "b", "c"]);
    assert_eq!(comps[1], vec!["lonely"]);
}

#[test]
fn find_cycles_reports_sccs_and_self_loops() {
    let mut g = directed();
    g.set_path(&["a", "b", "c", "a"]);
    g.set_edge("d", "d");
    g.set_edge("c", "e");
    let cycles = alg::find_cycles(&g);
    assert_eq!(cycles, vec![vec!["a", "b", "c"], vec!["d"]]);

    let mut dag = directed();
    dag.set_path(&["a", "b", "c"]);
    assert!(alg::find_cycles(&dag).is_empty());
}
