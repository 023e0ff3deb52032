use stratum::graphlib::{Graph, GraphOptions};
use stratum::util::IdMint;
use stratum::{nesting, DummyKind, EdgeLabel, GraphLabel, LayoutGraph, NodeLabel};

fn compound_graph() -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions {
        directed: true,
        multigraph: true,
        compound: true,
    });
    g.set_graph(GraphLabel::default());
    g
}

fn add_node(g: &mut LayoutGraph, id: &str) {
    g.set_node(id.to_string(), NodeLabel::default());
}

#[test]
fn flat_graphs_get_a_root_connected_to_every_node() {
    let mut g = compound_graph();
    add_node(&mut g, "a");
    add_node(&mut g, "b");
    g.set_edge_with_label("a", "b", EdgeLabel::default());

    nesting::run(&mut g, &mut IdMint::new());

    let root = g.graph().nesting_root.clone().expect("root recorded");
    assert_eq!(g.node(&root).unwrap().dummy, Some(DummyKind::NestingRoot));
    assert!(g.edge(&root, "a", None).is_some());
    assert!(g.edge(&root, "b", None).is_some());
    // Depth 0 nesting leaves minlens untouched.
    assert_eq!(g.edge("a", "b", None).unwrap().minlen, 1);
    assert_eq!(g.graph().node_rank_factor, 1);
}

#[test]
fn compound_parents_get_border_nodes_and_nesting_edges() {
    let mut g = compound_graph();
    add_node(&mut g, "p");
    add_node(&mut g, "x");
    add_node(&mut g, "y");
    g.set_parent("x", "p");
    g.set_parent("y", "p");
    g.set_edge_with_label("x", "y", EdgeLabel::default());

    nesting::run(&mut g, &mut IdMint::new());

    let p = g.node("p").unwrap().clone();
    let top = p.border_top.expect("top border");
    let bottom = p.border_bottom.expect("bottom border");
    assert_eq!(g.parent(&top), Some("p"));
    assert_eq!(g.parent(&bottom), Some("p"));
    assert_eq!(g.node(&top).unwrap().dummy, Some(DummyKind::Border));

    // One nesting level: original minlens are scaled by 2*1 + 1.
    assert_eq!(g.edge("x", "y", None).unwrap().minlen, 3);
    assert_eq!(g.graph().node_rank_factor, 3);

    // Children hang between the borders.
    assert!(g.edge(&top, "x", None).unwrap().nesting);
    assert!(g.edge("x", &bottom, None).unwrap().nesting);
    assert!(g.edge(&top, "y", None).unwrap().nesting);
    assert!(g.edge("y", &bottom, None).unwrap().nesting);
}

#[test]
fn disconnected_components_are_stitched_to_the_root() {
    let mut g = compound_graph();
    add_node(&mut g, "a");
    add_node(&mut g, "b");
    add_node(&mut g, "island");
    g.set_edge_with_label("a", "b", EdgeLabel::default());

    nesting::run(&mut g, &mut IdMint::new());
    let root = g.graph().nesting_root.clone().unwrap();
    assert!(g.edge(&root, "island", None).is_some());
}

#[test]
fn cleanup_removes_the_root_and_all_nesting_edges() {
    let mut g = compound_graph();
    add_node(&mut g, "p");
    add_node(&mut g, "x");
    g.set_parent("x", "p");
    add_node(&mut g, "q");
    g.set_edge_with_label("x", "q", EdgeLabel::default());

    nesting::run(&mut g, &mut IdMint::new());
    nesting::cleanup(&mut g);

    assert!(g.graph().nesting_root.is_none());
    for key in g.edge_keys() {
        assert!(!g.edge_by_key(&key).unwrap().nesting);
    }
    assert!(g.edge("x", "q", None).is_some());
}
