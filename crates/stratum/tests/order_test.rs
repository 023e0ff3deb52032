use stratum::graphlib::{Graph, GraphOptions};
use stratum::order::{self, cross_count, init_order, median_value};
use stratum::util;
use stratum::{EdgeLabel, GraphLabel, LayoutGraph, NodeLabel};

fn new_graph() -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions {
        directed: true,
        multigraph: true,
        compound: false,
    });
    g.set_graph(GraphLabel::default());
    g
}

fn add_node(g: &mut LayoutGraph, id: &str, rank: i32) {
    g.set_node(
        id.to_string(),
        NodeLabel {
            rank: Some(rank),
            ..Default::default()
        },
    );
}

fn add_edge(g: &mut LayoutGraph, v: &str, w: &str, weight: f64) {
    g.set_edge_with_label(
        v.to_string(),
        w.to_string(),
        EdgeLabel {
            weight,
            ..Default::default()
        },
    );
}

fn layering(g: &LayoutGraph) -> Vec<Vec<String>> {
    util::build_layer_matrix(g)
}

#[test]
fn init_order_fills_each_rank_in_dfs_order() {
    let mut g = new_graph();
    add_node(&mut g, "a", 0);
    add_node(&mut g, "b", 0);
    add_node(&mut g, "c", 1);
    add_node(&mut g, "d", 1);
    add_edge(&mut g, "a", "d", 1.0);
    add_edge(&mut g, "b", "c", 1.0);

    let layers = init_order(&g);
    assert_eq!(layers, vec![vec!["a", "b"], vec!["d", "c"]]);
}

#[test]
fn order_assigns_a_permutation_per_rank() {
    let mut g = new_graph();
    for (id, rank) in [("a", 0), ("b", 0), ("c", 0), ("x", 1), ("y", 1)] {
        add_node(&mut g, id, rank);
    }
    add_edge(&mut g, "a", "x", 1.0);
    add_edge(&mut g, "b", "y", 1.0);
    add_edge(&mut g, "c", "x", 1.0);

    order::order(&mut g);

    for layer in layering(&g) {
        let mut orders: Vec<usize> = layer
            .iter()
            .map(|v| g.node(v).and_then(|n| n.order).expect("ordered"))
            .collect();
        orders.sort();
        assert_eq!(orders, (0..layer.len()).collect::<Vec<_>>());
    }
}

#[test]
fn order_untangles_a_fully_inverted_bipartite_graph() {
    let mut g = new_graph();
    for id in ["a", "b", "c"] {
        add_node(&mut g, id, 0);
    }
    for id in ["x", "y", "z"] {
        add_node(&mut g, id, 1);
    }
    add_edge(&mut g, "a", "z", 1.0);
    add_edge(&mut g, "b", "y", 1.0);
    add_edge(&mut g, "c", "x", 1.0);

    order::order(&mut g);
    assert_eq!(cross_count(&g, &layering(&g)), 0.0);
}

#[test]
fn order_never_worsens_the_initial_ordering() {
    let mut g = new_graph();
    for (id, rank) in [("a", 0), ("b", 0), ("p", 1), ("q", 1), ("r", 1)] {
        add_node(&mut g, id, rank);
    }
    add_edge(&mut g, "a", "q", 1.0);
    add_edge(&mut g, "a", "r", 1.0);
    add_edge(&mut g, "b", "p", 1.0);
    add_edge(&mut g, "b", "r", 1.0);

    // Deliberately bad starting orders: two crossings.
    for (id, order) in [("a", 0), ("b", 1), ("p", 0), ("q", 1), ("r", 2)] {
        g.node_mut(id).unwrap().order = Some(order);
    }
    let before = cross_count(&g, &layering(&g));
    assert_eq!(before, 2.0);

    order::order(&mut g);
    assert!(cross_count(&g, &layering(&g)) < before);
}

#[test]
fn cross_count_on_a_single_edge_is_zero() {
    let mut g = new_graph();
    add_node(&mut g, "a", 0);
    add_node(&mut g, "x", 1);
    add_edge(&mut g, "a", "x", 1.0);
    g.node_mut("a").unwrap().order = Some(0);
    g.node_mut("x").unwrap().order = Some(0);
    assert_eq!(cross_count(&g, &layering(&g)), 0.0);
}

#[test]
fn cross_count_detects_a_single_crossing() {
    let mut g = new_graph();
    for (id, rank, order) in [("a", 0, 0), ("b", 0, 1), ("x", 1, 0), ("y", 1, 1)] {
        add_node(&mut g, id, rank);
        g.node_mut(id).unwrap().order = Some(order);
    }
    add_edge(&mut g, "a", "y", 1.0);
    add_edge(&mut g, "b", "x", 1.0);
    assert_eq!(cross_count(&g, &layering(&g)), 1.0);
}

#[test]
fn cross_count_multiplies_crossing_weights() {
    let mut g = new_graph();
    for (id, rank, order) in [("a", 0, 0), ("b", 0, 1), ("x", 1, 0), ("y", 1, 1)] {
        add_node(&mut g, id, rank);
        g.node_mut(id).unwrap().order = Some(order);
    }
    add_edge(&mut g, "a", "y", 2.0);
    add_edge(&mut g, "b", "x", 3.0);
    assert_eq!(cross_count(&g, &layering(&g)), 6.0);
}

// One crossing is not an artifact of the fixed orders here: every ordering
// of K_{2,2} inverts exactly one of the two independent edge pairs, so this
// is also what an optimized layout measures.
#[test]
fn cross_count_of_complete_bipartite_two_by_two_is_one() {
    let mut g = new_graph();
    for (id, rank, order) in [("a", 0, 0), ("b", 0, 1), ("x", 1, 0), ("y", 1, 1)] {
        add_node(&mut g, id, rank);
        g.node_mut(id).unwrap().order = Some(order);
    }
    for v in ["a", "b"] {
        for w in ["x", "y"] {
            add_edge(&mut g, v, w, 1.0);
        }
    }
    assert_eq!(cross_count(&g, &layering(&g)), 1.0);
}

#[test]
fn cross_count_sums_across_rank_pairs() {
    let mut g = new_graph();
    for (id, rank, order) in [
        ("a", 0, 0),
        ("b", 0, 1),
        ("x", 1, 0),
        ("y", 1, 1),
        ("p", 2, 0),
        ("q", 2, 1),
    ] {
        add_node(&mut g, id, rank);
        g.node_mut(id).unwrap().order = Some(order);
    }
    add_edge(&mut g, "a", "y", 1.0);
    add_edge(&mut g, "b", "x", 1.0);
    add_edge(&mut g, "x", "q", 1.0);
    add_edge(&mut g, "y", "p", 1.0);
    assert_eq!(cross_count(&g, &layering(&g)), 2.0);
}

#[test]
fn median_value_follows_gansner() {
    assert_eq!(median_value(&[3.0]), 3.0);
    assert_eq!(median_value(&[1.0, 5.0]), 3.0);
    assert_eq!(median_value(&[0.0, 1.0, 2.0]), 1.0);
    // Four positions: the two middle ones blend, biased towards the side
    // whose middle sits closer to its extreme.
    assert_eq!(median_value(&[0.0, 1.0, 2.0, 9.0]), (1.0 * 7.0 + 2.0 * 1.0) / 8.0);
}
