use stratum::coords;
use stratum::graphlib::{Graph, GraphOptions};
use stratum::{EdgeLabel, GraphLabel, LayoutGraph, NodeLabel, Point, RankDir};

fn graph_with(rankdir: RankDir) -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions {
        directed: true,
        multigraph: true,
        compound: false,
    });
    g.set_graph(GraphLabel {
        rankdir,
        ..Default::default()
    });
    g.set_node(
        "a",
        NodeLabel {
            width: 30.0,
            height: 10.0,
            ..Default::default()
        },
    );
    g.set_node(
        "b",
        NodeLabel {
            width: 30.0,
            height: 10.0,
            ..Default::default()
        },
    );
    g.set_edge_with_label(
        "a",
        "b",
        EdgeLabel {
            width: 8.0,
            height: 4.0,
            ..Default::default()
        },
    );
    g
}

#[test]
fn top_to_bottom_is_untouched() {
    let mut g = graph_with(RankDir::Tb);
    coords::adjust(&mut g);
    assert_eq!(g.node("a").unwrap().width, 30.0);
    coords::undo(&mut g);
    assert_eq!(g.node("a").unwrap().width, 30.0);
}

#[test]
fn horizontal_layouts_transpose_boxes_for_positioning() {
    let mut g = graph_with(RankDir::Lr);
    coords::adjust(&mut g);
    let a = g.node("a").unwrap();
    assert_eq!((a.width, a.height), (10.0, 30.0));
    let e = g.edge("a", "b", None).unwrap();
    assert_eq!((e.width, e.height), (4.0, 8.0));
}

#[test]
fn left_to_right_swaps_coordinates_back() {
    let mut g = graph_with(RankDir::Lr);
    coords::adjust(&mut g);

    // Positioning happened in top-to-bottom terms.
    g.node_mut("a").unwrap().x = Some(7.0);
    g.node_mut("a").unwrap().y = Some(30.0);
    if let Some(e) = g.edge_mut("a", "b", None) {
        e.points = vec![Point::new(7.0, 40.0)];
        e.x = Some(7.0);
        e.y = Some(45.0);
    }

    coords::undo(&mut g);
    let a = g.node("a").unwrap();
    assert_eq!((a.x, a.y), (Some(30.0), Some(7.0)));
    assert_eq!((a.width, a.height), (30.0, 10.0));
    let e = g.edge("a", "b", None).unwrap();
    assert_eq!(e.points, vec![Point::new(40.0, 7.0)]);
    assert_eq!((e.x, e.y), (Some(45.0), Some(7.0)));
}

#[test]
fn bottom_to_top_mirrors_the_y_axis() {
    let mut g = graph_with(RankDir::Bt);
    coords::adjust(&mut g);
    g.node_mut("a").unwrap().x = Some(5.0);
    g.node_mut("a").unwrap().y = Some(12.0);
    if let Some(e) = g.edge_mut("a", "b", None) {
        e.points = vec![Point::new(5.0, 20.0)];
    }

    coords::undo(&mut g);
    let a = g.node("a").unwrap();
    assert_eq!((a.x, a.y), (Some(5.0), Some(-12.0)));
    assert_eq!(
        g.edge("a", "b", None).unwrap().points,
        vec![Point::new(5.0, -20.0)]
    );
}

#[test]
fn right_to_left_mirrors_then_transposes() {
    let mut g = graph_with(RankDir::Rl);
    coords::adjust(&mut g);
    g.node_mut("a").unwrap().x = Some(3.0);
    g.node_mut("a").unwrap().y = Some(8.0);

    coords::undo(&mut g);
    let a = g.node("a").unwrap();
    // y is mirrored first, then axes swap.
    assert_eq!((a.x, a.y), (Some(-8.0), Some(3.0)));
    assert_eq!((a.width, a.height), (30.0, 10.0));
}
