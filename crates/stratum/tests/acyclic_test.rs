use stratum::graphlib::{alg, Graph, GraphOptions};
use stratum::{acyclic, Acyclicer, EdgeLabel, GraphLabel, LayoutGraph, NodeLabel};

fn new_graph(acyclicer: Acyclicer) -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions {
        directed: true,
        multigraph: true,
        compound: false,
    });
    g.set_graph(GraphLabel {
        acyclicer,
        ..Default::default()
    });
    g
}

fn add_edge(g: &mut LayoutGraph, v: &str, w: &str, weight: f64) {
    g.set_node(v.to_string(), NodeLabel::default());
    g.set_node(w.to_string(), NodeLabel::default());
    g.set_edge_with_label(
        v.to_string(),
        w.to_string(),
        EdgeLabel {
            weight,
            ..Default::default()
        },
    );
}

fn reversed_pairs(g: &LayoutGraph) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = g
        .edge_keys()
        .into_iter()
        .filter(|key| g.edge_by_key(key).map(|e| e.reversed).unwrap_or(false))
        .map(|key| (key.v, key.w))
        .collect();
    out.sort();
    out
}

#[test]
fn dfs_breaks_a_triangle_with_one_reversal() {
    let mut g = new_graph(Acyclicer::Dfs);
    add_edge(&mut g, "a", "b", 1.0);
    add_edge(&mut g, "b", "c", 1.0);
    add_edge(&mut g, "c", "a", 1.0);

    acyclic::run(&mut g);
    assert!(alg::find_cycles(&g).is_empty());
    assert_eq!(reversed_pairs(&g), vec![("a".to_string(), "c".to_string())]);
}

#[test]
fn greedy_prefers_to_keep_heavy_edges() {
    let mut g = new_graph(Acyclicer::Greedy);
    add_edge(&mut g, "a", "b", 5.0);
    add_edge(&mut g, "b", "a", 1.0);

    acyclic::run(&mut g);
    assert!(alg::find_cycles(&g).is_empty());
    // The light edge is the one that ends up flipped (stored as a -> b).
    assert_eq!(reversed_pairs(&g), vec![("a".to_string(), "b".to_string())]);
    assert_eq!(g.edge_count(), 2);
}

#[test]
fn undo_restores_orientation_but_keeps_the_marker() {
    let mut g = new_graph(Acyclicer::Dfs);
    add_edge(&mut g, "a", "b", 1.0);
    add_edge(&mut g, "b", "c", 1.0);
    add_edge(&mut g, "c", "a", 1.0);

    acyclic::run(&mut g);
    acyclic::undo(&mut g);

    let mut pairs: Vec<(String, String)> = g
        .edge_keys()
        .into_iter()
        .map(|key| (key.v, key.w))
        .collect();
    pairs.sort();
    assert_eq!(
        pairs,
        vec![
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "c".to_string()),
            ("c".to_string(), "a".to_string()),
        ]
    );

    let back = g.edge("c", "a", None).expect("edge restored");
    assert!(back.reversed);
    assert!(g.edge("a", "b", None).map(|e| !e.reversed).unwrap_or(false));
}

#[test]
fn acyclic_input_is_left_alone() {
    let mut g = new_graph(Acyclicer::Greedy);
    add_edge(&mut g, "a", "b", 1.0);
    add_edge(&mut g, "b", "c", 1.0);

    acyclic::run(&mut g);
    assert!(reversed_pairs(&g).is_empty());
    assert_eq!(g.edge_count(), 2);
}

#[test]
fn undo_reverses_the_polyline_direction_only_once() {
    use stratum::Point;

    let mut g = new_graph(Acyclicer::Dfs);
    add_edge(&mut g, "a", "b", 1.0);
    add_edge(&mut g, "b", "a", 1.0);

    acyclic::run(&mut g);
    // Simulate routing of the flipped edge, then the point correction the
    // pipeline applies before undo.
    for key in g.edge_keys() {
        if let Some(edge) = g.edge_mut_by_key(&key) {
            if edge.reversed {
                edge.points = vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)];
                edge.points.reverse();
            }
        }
    }
    acyclic::undo(&mut g);

    let restored = g.edge("b", "a", None).expect("flipped edge restored");
    assert!(restored.reversed);
    assert_eq!(restored.points.first(), Some(&Point::new(5.0, 5.0)));
}
