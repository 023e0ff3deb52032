//! The layout pipeline.
//!
//! Stages run in a fixed sequence over a private working copy of the input.
//! Structural passes (cycle breaking, nesting, normalization, borders, self
//! loops) each have an undo later in the sequence, so by the time results
//! are written back the working graph has the caller's shape again. The
//! input graph is only touched by the final write-back; a failure anywhere
//! leaves it unmodified.

use crate::error::{LayoutError, Result};
use crate::graphlib::{Graph, GraphOptions};
use crate::model::{
    DummyKind, EdgeLabel, GraphLabel, LabelPos, LayoutOptions, NodeLabel, Point,
};
use crate::util::{self, IdMint, Rect};
use crate::LayoutGraph;
use crate::{acyclic, borders, coords, nesting, normalize, order, parent_chains, position, rank, self_loops};
use rustc_hash::FxHashSet;

pub fn run(input: &mut LayoutGraph, opts: &LayoutOptions) -> Result<()> {
    let mut config = input.graph().clone();
    opts.apply(&mut config);
    validate(input, &config)?;

    let timing = opts.debug_timing;
    let mut g = build_layout_graph(input, config);
    let mut ids = IdMint::new();

    util::time(timing, "make_space_for_edge_labels", || {
        make_space_for_edge_labels(&mut g)
    });
    util::time(timing, "remove_self_loops", || {
        self_loops::remove_self_loops(&mut g)
    });
    util::time(timing, "acyclic", || acyclic::run(&mut g));
    util::time(timing, "nesting", || nesting::run(&mut g, &mut ids));
    util::time(timing, "rank", || {
        let mut flat = util::as_non_compound_graph(&g);
        rank::rank(&mut flat);
        for v in g.node_ids() {
            if !g.children(&v).is_empty() {
                continue;
            }
            let Some(rank) = flat.node(&v).and_then(|n| n.rank) else {
                continue;
            };
            if let Some(node) = g.node_mut(&v) {
                node.rank = Some(rank);
            }
        }
    });
    util::time(timing, "inject_edge_label_proxies", || {
        inject_edge_label_proxies(&mut g, &mut ids)
    });
    util::time(timing, "remove_empty_ranks", || {
        util::remove_empty_ranks(&mut g)
    });
    util::time(timing, "nesting_cleanup", || nesting::cleanup(&mut g));
    util::time(timing, "normalize_ranks", || util::normalize_ranks(&mut g));
    util::time(timing, "assign_rank_min_max", || assign_rank_min_max(&mut g));
    util::time(timing, "remove_edge_label_proxies", || {
        remove_edge_label_proxies(&mut g)
    });
    util::time(timing, "normalize", || normalize::run(&mut g, &mut ids));
    util::time(timing, "parent_chains", || parent_chains::run(&mut g));
    util::time(timing, "add_border_segments", || {
        borders::add_border_segments(&mut g, &mut ids)
    });
    util::time(timing, "order", || order::order(&mut g));
    util::time(timing, "insert_self_loop_dummies", || {
        self_loops::insert_self_loop_dummies(&mut g, &mut ids)
    });
    util::time(timing, "coords_adjust", || coords::adjust(&mut g));
    util::time(timing, "position", || position::position(&mut g));
    util::time(timing, "position_self_loops", || {
        self_loops::position_self_loops(&mut g)
    });
    util::time(timing, "remove_border_nodes", || {
        borders::remove_border_nodes(&mut g)
    });
    util::time(timing, "normalize_undo", || normalize::undo(&mut g));
    util::time(timing, "fixup_edge_label_coords", || {
        fixup_edge_label_coords(&mut g)
    });
    util::time(timing, "coords_undo", || coords::undo(&mut g));
    util::time(timing, "translate_graph", || translate_graph(&mut g));
    util::time(timing, "assign_node_intersects", || {
        assign_node_intersects(&mut g)
    })?;
    util::time(timing, "reverse_points", || {
        reverse_points_for_reversed_edges(&mut g)
    });
    util::time(timing, "acyclic_undo", || acyclic::undo(&mut g));

    util::time(timing, "write_back", || write_back(&g, input));
    Ok(())
}

/// Rejects inputs the pipeline cannot lay out, before anything is copied.
fn validate(input: &LayoutGraph, config: &GraphLabel) -> Result<()> {
    for (name, value) in [
        ("nodesep", config.nodesep),
        ("edgesep", config.edgesep),
        ("ranksep", config.ranksep),
        ("marginx", config.marginx),
        ("marginy", config.marginy),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(LayoutError::InvalidSeparation { name, value });
        }
    }

    let mut bad_node: Option<LayoutError> = None;
    input.for_each_node(|id, node| {
        if bad_node.is_some() {
            return;
        }
        let ok = node.width.is_finite()
            && node.height.is_finite()
            && node.width >= 0.0
            && node.height >= 0.0;
        if !ok {
            bad_node = Some(LayoutError::InvalidNodeSize {
                id: id.to_string(),
                width: node.width,
                height: node.height,
            });
        }
    });
    if let Some(err) = bad_node {
        return Err(err);
    }

    for key in input.edges() {
        if !input.has_node(&key.v) || !input.has_node(&key.w) {
            return Err(LayoutError::DanglingEndpoint {
                v: key.v.clone(),
                w: key.w.clone(),
            });
        }
        let Some(edge) = input.edge_by_key(key) else {
            continue;
        };
        if edge.minlen < 1 {
            return Err(LayoutError::InvalidMinlen {
                v: key.v.clone(),
                w: key.w.clone(),
            });
        }
        if !edge.weight.is_finite() || edge.weight <= 0.0 {
            return Err(LayoutError::InvalidEdgeWeight {
                v: key.v.clone(),
                w: key.w.clone(),
                weight: edge.weight,
            });
        }
        let ok = edge.width.is_finite()
            && edge.height.is_finite()
            && edge.width >= 0.0
            && edge.height >= 0.0;
        if !ok {
            return Err(LayoutError::InvalidEdgeLabel {
                v: key.v.clone(),
                w: key.w.clone(),
                width: edge.width,
                height: edge.height,
            });
        }
    }

    // The compound relation must be a forest.
    let mut settled: FxHashSet<String> = FxHashSet::default();
    for start in input.node_ids() {
        if settled.contains(&start) {
            continue;
        }
        let mut path: Vec<String> = Vec::new();
        let mut cur = start;
        loop {
            if settled.contains(&cur) {
                break;
            }
            if path.contains(&cur) {
                return Err(LayoutError::CyclicNesting { id: cur });
            }
            path.push(cur.clone());
            match input.parent(&cur) {
                Some(parent) => cur = parent.to_string(),
                None => break,
            }
        }
        settled.extend(path);
    }

    Ok(())
}

/// The working copy: whitelisted attributes only, defaults filled in, and
/// always multigraph + compound so the pipeline can add named reversals and
/// synthetic parents.
fn build_layout_graph(input: &LayoutGraph, mut config: GraphLabel) -> LayoutGraph {
    config.width = 0.0;
    config.height = 0.0;
    config.dummy_chains.clear();
    config.nesting_root = None;

    let mut g: LayoutGraph = Graph::new(GraphOptions {
        directed: true,
        multigraph: true,
        compound: true,
    });
    g.set_graph(config);

    input.for_each_node(|id, node| {
        g.set_node(
            id.to_string(),
            NodeLabel {
                width: node.width,
                height: node.height,
                ..Default::default()
            },
        );
    });
    for id in input.node_ids() {
        if let Some(parent) = input.parent(&id) {
            g.set_parent(id.clone(), parent.to_string());
        }
    }
    input.for_each_edge(|key, edge| {
        g.set_edge_named(
            key.v.clone(),
            key.w.clone(),
            key.name.clone(),
            Some(EdgeLabel {
                weight: edge.weight,
                minlen: edge.minlen,
                width: edge.width,
                height: edge.height,
                labelpos: edge.labelpos,
                labeloffset: edge.labeloffset,
                ..Default::default()
            }),
        );
    });

    g
}

/// Doubles every `minlen` and halves `ranksep` so labelled edges get a rank
/// of their own in between; off-center labels also widen the edge box by
/// their offset.
fn make_space_for_edge_labels(g: &mut LayoutGraph) {
    let rankdir = g.graph().rankdir;
    g.graph_mut().ranksep /= 2.0;
    g.for_each_edge_mut(|_, edge| {
        edge.minlen *= 2;
        if edge.labelpos != LabelPos::Center {
            if rankdir.is_horizontal() {
                edge.height += edge.labeloffset;
            } else {
                edge.width += edge.labeloffset;
            }
        }
    });
}

/// Stakes out the rank halfway along each labelled edge with a proxy dummy,
/// so rank compaction cannot squeeze the label's row away.
fn inject_edge_label_proxies(g: &mut LayoutGraph, ids: &mut IdMint) {
    for key in g.edge_keys() {
        let Some(edge) = g.edge_by_key(&key) else {
            continue;
        };
        if !edge.has_label() {
            continue;
        }
        let (Some(v_rank), Some(w_rank)) = (
            g.node(&key.v).and_then(|n| n.rank),
            g.node(&key.w).and_then(|n| n.rank),
        ) else {
            continue;
        };
        let label_rank = (w_rank - v_rank) / 2 + v_rank;
        let id = ids.fresh(g, "_ep");
        g.set_node(
            id,
            NodeLabel {
                rank: Some(label_rank),
                dummy: Some(DummyKind::EdgeProxy),
                edge_obj: Some(key.clone()),
                ..Default::default()
            },
        );
    }
}

/// Converts each proxy's final rank into `label_rank` on its edge, then
/// drops the proxy.
fn remove_edge_label_proxies(g: &mut LayoutGraph) {
    for v in g.node_ids() {
        let Some(node) = g.node(&v) else {
            continue;
        };
        if node.dummy != Some(DummyKind::EdgeProxy) {
            continue;
        }
        let rank = node.rank;
        if let Some(key) = node.edge_obj.clone() {
            if let Some(edge) = g.edge_mut_by_key(&key) {
                edge.label_rank = rank;
            }
        }
        g.remove_node(&v);
    }
}

/// Copies each compound node's rank span off its nesting border nodes.
fn assign_rank_min_max(g: &mut LayoutGraph) {
    for v in g.node_ids() {
        let Some(node) = g.node(&v) else {
            continue;
        };
        let (Some(top), Some(bottom)) = (node.border_top.clone(), node.border_bottom.clone())
        else {
            continue;
        };
        let (Some(min_rank), Some(max_rank)) = (
            g.node(&top).and_then(|n| n.rank),
            g.node(&bottom).and_then(|n| n.rank),
        ) else {
            continue;
        };
        if let Some(node) = g.node_mut(&v) {
            node.min_rank = Some(min_rank);
            node.max_rank = Some(max_rank);
        }
    }
}

/// Applies `labelpos`/`labeloffset` to label anchors: the box width borrowed
/// in `make_space_for_edge_labels` is returned and the anchor slides to the
/// requested side of the edge.
fn fixup_edge_label_coords(g: &mut LayoutGraph) {
    g.for_each_edge_mut(|_, edge| {
        let Some(x) = edge.x else {
            return;
        };
        if edge.labelpos != LabelPos::Center {
            edge.width -= edge.labeloffset;
        }
        match edge.labelpos {
            LabelPos::Left => edge.x = Some(x - edge.width / 2.0 - edge.labeloffset),
            LabelPos::Right => edge.x = Some(x + edge.width / 2.0 + edge.labeloffset),
            LabelPos::Center => {}
        }
    });
}

/// Shifts everything into the positive quadrant with the configured margins
/// and records the canvas size on the graph label.
fn translate_graph(g: &mut LayoutGraph) {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let mut grow = |x: f64, y: f64, width: f64, height: f64| {
        min_x = min_x.min(x - width / 2.0);
        max_x = max_x.max(x + width / 2.0);
        min_y = min_y.min(y - height / 2.0);
        max_y = max_y.max(y + height / 2.0);
    };
    g.for_each_node(|_, node| {
        if let (Some(x), Some(y)) = (node.x, node.y) {
            grow(x, y, node.width, node.height);
        }
    });
    g.for_each_edge(|_, edge| {
        if let (Some(x), Some(y)) = (edge.x, edge.y) {
            grow(x, y, edge.width, edge.height);
        }
    });

    if !min_x.is_finite() {
        return;
    }

    let margin_x = g.graph().marginx;
    let margin_y = g.graph().marginy;
    let dx = margin_x - min_x;
    let dy = margin_y - min_y;

    g.for_each_node_mut(|_, node| {
        if let Some(x) = node.x {
            node.x = Some(x + dx);
        }
        if let Some(y) = node.y {
            node.y = Some(y + dy);
        }
    });
    g.for_each_edge_mut(|_, edge| {
        for p in &mut edge.points {
            p.x += dx;
            p.y += dy;
        }
        if let Some(x) = edge.x {
            edge.x = Some(x + dx);
        }
        if let Some(y) = edge.y {
            edge.y = Some(y + dy);
        }
    });

    let label = g.graph_mut();
    label.width = max_x - min_x + 2.0 * margin_x;
    label.height = max_y - min_y + 2.0 * margin_y;
}

/// Clips every polyline to start and end on its endpoints' boundaries. Self
/// loops already do by construction.
fn assign_node_intersects(g: &mut LayoutGraph) -> Result<()> {
    for key in g.edge_keys() {
        if key.is_loop() {
            continue;
        }
        let rect_of = |id: &str| -> Option<Rect> {
            let node = g.node(id)?;
            Some(Rect {
                x: node.x?,
                y: node.y?,
                width: node.width,
                height: node.height,
            })
        };
        let (Some(v_rect), Some(w_rect)) = (rect_of(&key.v), rect_of(&key.w)) else {
            continue;
        };

        let Some(edge) = g.edge_by_key(&key) else {
            continue;
        };
        let (toward_v, toward_w) = match (edge.points.first(), edge.points.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => (
                Point::new(w_rect.x, w_rect.y),
                Point::new(v_rect.x, v_rect.y),
            ),
        };

        let head = util::intersect_rect(v_rect, toward_v).ok_or_else(|| {
            LayoutError::DegenerateIntersection { id: key.v.clone() }
        })?;
        let tail = util::intersect_rect(w_rect, toward_w).ok_or_else(|| {
            LayoutError::DegenerateIntersection { id: key.w.clone() }
        })?;

        let Some(edge) = g.edge_mut_by_key(&key) else {
            continue;
        };
        edge.points.insert(0, head);
        edge.points.push(tail);
    }
    Ok(())
}

/// Edges flipped by acyclicization were routed backwards; flip their
/// polylines so they read source to target again.
fn reverse_points_for_reversed_edges(g: &mut LayoutGraph) {
    g.for_each_edge_mut(|_, edge| {
        if edge.reversed {
            edge.points.reverse();
        }
    });
}

/// Copies results onto the caller's graph: positions for every node, extents
/// for compound nodes, polylines and label anchors for every edge, canvas
/// size and the feedback-set markers on the graph.
fn write_back(g: &LayoutGraph, input: &mut LayoutGraph) {
    for id in input.node_ids() {
        let Some(done) = g.node(&id) else {
            continue;
        };
        let is_compound = !g.children(&id).is_empty();
        if let Some(node) = input.node_mut(&id) {
            node.x = done.x;
            node.y = done.y;
            if is_compound {
                node.width = done.width;
                node.height = done.height;
            }
        }
    }

    for key in input.edge_keys() {
        let Some(done) = g.edge_by_key(&key) else {
            continue;
        };
        let points = done.points.clone();
        let (x, y) = (done.x, done.y);
        let reversed = done.reversed;
        if let Some(edge) = input.edge_mut_by_key(&key) {
            edge.points = points;
            edge.x = x;
            edge.y = y;
            edge.reversed = reversed;
        }
    }

    let label = input.graph_mut();
    label.width = g.graph().width;
    label.height = g.graph().height;
}
