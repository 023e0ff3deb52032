use stratum::graphlib::{Graph, GraphOptions};
use stratum::util::IdMint;
use stratum::{normalize, DummyKind, EdgeLabel, GraphLabel, LabelPos, LayoutGraph, NodeLabel, Point};

fn new_graph() -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions {
        directed: true,
        multigraph: true,
        compound: true,
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

fn spans(g: &LayoutGraph) -> Vec<i32> {
    g.edge_keys()
        .iter()
        .map(|key| {
            let v = g.node(&key.v).and_then(|n| n.rank).unwrap();
            let w = g.node(&key.w).and_then(|n| n.rank).unwrap();
            w - v
        })
        .collect()
}

#[test]
fn short_edges_are_left_alone() {
    let mut g = new_graph();
    add_node(&mut g, "a", 0);
    add_node(&mut g, "b", 1);
    g.set_edge_with_label("a", "b", EdgeLabel::default());

    normalize::run(&mut g, &mut IdMint::new());
    assert_eq!(g.node_count(), 2);
    assert_eq!(spans(&g), vec![1]);
    assert!(g.graph().dummy_chains.is_empty());
}

#[test]
fn long_edges_become_unit_chains() {
    let mut g = new_graph();
    add_node(&mut g, "a", 0);
    add_node(&mut g, "b", 3);
    g.set_edge_with_label(
        "a",
        "b",
        EdgeLabel {
            weight: 2.0,
            ..Default::default()
        },
    );

    normalize::run(&mut g, &mut IdMint::new());
    assert_eq!(g.node_count(), 4);
    assert_eq!(spans(&g), vec![1, 1, 1]);
    assert_eq!(g.graph().dummy_chains.len(), 1);

    // Chain segments inherit the edge's weight; interior nodes are dummies.
    for key in g.edge_keys() {
        assert_eq!(g.edge_by_key(&key).unwrap().weight, 2.0);
    }
    let dummies: Vec<&NodeLabel> = g
        .nodes()
        .filter_map(|v| g.node(v))
        .filter(|n| n.is_dummy())
        .collect();
    assert_eq!(dummies.len(), 2);
    assert!(dummies.iter().all(|n| n.dummy == Some(DummyKind::Edge)));
}

#[test]
fn the_label_rank_dummy_carries_the_label_box() {
    let mut g = new_graph();
    add_node(&mut g, "a", 0);
    add_node(&mut g, "b", 4);
    g.set_edge_with_label(
        "a",
        "b",
        EdgeLabel {
            width: 30.0,
            height: 10.0,
            labelpos: LabelPos::Left,
            label_rank: Some(2),
            ..Default::default()
        },
    );

    normalize::run(&mut g, &mut IdMint::new());

    let carriers: Vec<&NodeLabel> = g
        .nodes()
        .filter_map(|v| g.node(v))
        .filter(|n| n.dummy == Some(DummyKind::EdgeLabel))
        .collect();
    assert_eq!(carriers.len(), 1);
    let carrier = carriers[0];
    assert_eq!(carrier.rank, Some(2));
    assert_eq!((carrier.width, carrier.height), (30.0, 10.0));
    assert_eq!(carrier.labelpos, Some(LabelPos::Left));
}

#[test]
fn undo_collapses_chains_into_polylines() {
    let mut g = new_graph();
    add_node(&mut g, "a", 0);
    add_node(&mut g, "b", 3);
    g.set_edge_with_label("a", "b", EdgeLabel::default());

    let mut ids = IdMint::new();
    normalize::run(&mut g, &mut ids);

    // Pretend positioning placed the two chain dummies.
    let mut i = 0.0;
    for v in g.node_ids() {
        if let Some(node) = g.node_mut(&v) {
            if node.is_dummy() {
                node.x = Some(10.0 + i);
                node.y = Some(100.0 + i);
                i += 1.0;
            }
        }
    }

    normalize::undo(&mut g);
    assert_eq!(g.node_count(), 2);
    assert_eq!(g.edge_count(), 1);
    let edge = g.edge("a", "b", None).expect("edge restored");
    assert_eq!(
        edge.points,
        vec![Point::new(10.0, 100.0), Point::new(11.0, 101.0)]
    );
}

#[test]
fn undo_restores_the_label_anchor_from_its_carrier() {
    let mut g = new_graph();
    add_node(&mut g, "a", 0);
    add_node(&mut g, "b", 2);
    g.set_edge_with_label(
        "a",
        "b",
        EdgeLabel {
            width: 8.0,
            height: 4.0,
            label_rank: Some(1),
            ..Default::default()
        },
    );

    let mut ids = IdMint::new();
    normalize::run(&mut g, &mut ids);
    for v in g.node_ids() {
        if let Some(node) = g.node_mut(&v) {
            if node.is_dummy() {
                node.x = Some(42.0);
                node.y = Some(17.0);
            }
        }
    }

    normalize::undo(&mut g);
    let edge = g.edge("a", "b", None).unwrap();
    assert_eq!(edge.x, Some(42.0));
    assert_eq!(edge.y, Some(17.0));
}
