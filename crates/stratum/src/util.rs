//! Shared helpers: layer matrices, rank compaction, rectangle intersection,
//! dummy-id minting, and opt-in stage timing.

use crate::graphlib::{Graph, GraphOptions};
use crate::model::{EdgeLabel, NodeLabel, Point};
use crate::LayoutGraph;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Instant;

/// An axis-aligned rectangle given by its center and full extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Point where the segment from the rectangle's center towards `point`
/// leaves the rectangle. `None` when `point` sits exactly on the center,
/// which leaves the direction undefined.
pub fn intersect_rect(rect: Rect, point: Point) -> Option<Point> {
    let dx = point.x - rect.x;
    let dy = point.y - rect.y;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }

    let mut w = rect.width / 2.0;
    let mut h = rect.height / 2.0;

    let (sx, sy) = if dy.abs() * w > dx.abs() * h {
        // Leaves through the top or bottom face.
        if dy < 0.0 {
            h = -h;
        }
        (h * dx / dy, h)
    } else {
        if dx < 0.0 {
            w = -w;
        }
        (w, w * dy / dx)
    };

    Some(Point::new(rect.x + sx, rect.y + sy))
}

/// Ranked nodes as rows, each row sorted by `order` (insertion order breaks
/// missing orders). Nodes without a rank (compound parents) are skipped.
pub fn build_layer_matrix<E, G>(g: &Graph<NodeLabel, E, G>) -> Vec<Vec<String>>
where
    E: Default,
    G: Default,
{
    let mut rows: BTreeMap<i32, Vec<(usize, usize, String)>> = BTreeMap::new();
    let mut seq = 0usize;
    g.for_each_node(|id, node| {
        let Some(rank) = node.rank else {
            return;
        };
        rows.entry(rank)
            .or_default()
            .push((node.order.unwrap_or(usize::MAX), seq, id.to_string()));
        seq += 1;
    });

    let Some((&min_rank, _)) = rows.iter().next() else {
        return Vec::new();
    };
    let &max_rank = rows.keys().next_back().expect("non-empty row map");

    let mut layers: Vec<Vec<String>> = vec![Vec::new(); (max_rank - min_rank + 1) as usize];
    for (rank, mut row) in rows {
        row.sort();
        layers[(rank - min_rank) as usize] = row.into_iter().map(|(_, _, id)| id).collect();
    }
    layers
}

/// Shifts all ranks so the smallest becomes 0.
pub fn normalize_ranks<E, G>(g: &mut Graph<NodeLabel, E, G>)
where
    E: Default,
    G: Default,
{
    let mut min_rank = i32::MAX;
    g.for_each_node(|_, node| {
        if let Some(rank) = node.rank {
            min_rank = min_rank.min(rank);
        }
    });
    if min_rank == i32::MAX {
        return;
    }
    g.for_each_node_mut(|_, node| {
        if let Some(rank) = node.rank {
            node.rank = Some(rank - min_rank);
        }
    });
}

/// Closes gaps left by ranks that hold no nodes. Ranks at multiples of the
/// graph's `node_rank_factor` are pinned and never removed, which is how the
/// nesting pass keeps compound borders on their own rows.
pub fn remove_empty_ranks(g: &mut LayoutGraph) {
    let factor = g.graph().node_rank_factor.max(1);

    let mut offset = i32::MAX;
    g.for_each_node(|_, node| {
        if let Some(rank) = node.rank {
            offset = offset.min(rank);
        }
    });
    if offset == i32::MAX {
        return;
    }

    let mut layers: BTreeMap<i32, Vec<String>> = BTreeMap::new();
    let mut max_index = 0;
    g.for_each_node(|id, node| {
        let Some(rank) = node.rank else {
            return;
        };
        let index = rank - offset;
        max_index = max_index.max(index);
        layers.entry(index).or_default().push(id.to_string());
    });

    let mut delta = 0;
    for index in 0..=max_index {
        match layers.get(&index) {
            None => {
                if index as usize % factor != 0 {
                    delta -= 1;
                }
            }
            Some(ids) if delta != 0 => {
                for id in ids {
                    if let Some(node) = g.node_mut(id) {
                        node.rank = Some(node.rank.expect("ranked node") + delta);
                    }
                }
            }
            Some(_) => {}
        }
    }
}

/// A flat (non-compound) view of `g`: compound parents dropped, leaves and
/// all edges kept, labels cloned.
pub fn as_non_compound_graph(g: &LayoutGraph) -> LayoutGraph {
    let mut flat: LayoutGraph = Graph::new(GraphOptions {
        multigraph: g.is_multigraph(),
        compound: false,
        directed: true,
    });
    flat.set_graph(g.graph().clone());

    for id in g.node_ids() {
        if g.children(&id).is_empty() {
            if let Some(label) = g.node(&id) {
                flat.set_node(id, label.clone());
            }
        }
    }
    for key in g.edge_keys() {
        if let Some(label) = g.edge_by_key(&key) {
            flat.set_edge_key(key, label.clone());
        }
    }
    flat
}

/// Collapses multi-edges into simple edges with summed weights and maximal
/// `minlen`, which is what the rankers operate on.
pub fn simplify(g: &LayoutGraph) -> LayoutGraph {
    let mut simple: LayoutGraph = Graph::new(GraphOptions::default());
    simple.set_graph(g.graph().clone());

    for id in g.node_ids() {
        if let Some(label) = g.node(&id) {
            simple.set_node(id, label.clone());
        }
    }
    for key in g.edge_keys() {
        let Some(label) = g.edge_by_key(&key) else {
            continue;
        };
        let (weight, minlen) = match simple.edge(&key.v, &key.w, None) {
            Some(prev) => (prev.weight + label.weight, prev.minlen.max(label.minlen)),
            None => (label.weight, label.minlen),
        };
        simple.set_edge_with_label(
            key.v.clone(),
            key.w.clone(),
            EdgeLabel {
                weight,
                minlen,
                ..Default::default()
            },
        );
    }
    simple
}

/// Mints ids for synthetic nodes. One mint lives per layout invocation, so
/// equal inputs produce identical id sequences and identical output geometry.
#[derive(Debug, Default)]
pub struct IdMint {
    next: usize,
}

impl IdMint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `{prefix}{n}` for the first `n` not already taken in `g`.
    pub fn fresh<E, G>(&mut self, g: &Graph<NodeLabel, E, G>, prefix: &str) -> String
    where
        E: Default,
        G: Default,
    {
        loop {
            self.next += 1;
            let id = format!("{prefix}{}", self.next);
            if !g.has_node(&id) {
                return id;
            }
        }
    }
}

/// Runs `f`, writing its wall-clock duration to `sink`.
pub fn time_to_writer<T>(name: &str, sink: &mut dyn Write, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    let _ = writeln!(sink, "{name}: {}ms", start.elapsed().as_millis());
    let _ = sink.flush();
    out
}

/// Stage timing against stderr, gated by the caller.
pub fn time<T>(enabled: bool, name: &str, f: impl FnOnce() -> T) -> T {
    if enabled {
        time_to_writer(name, &mut std::io::stderr(), f)
    } else {
        f()
    }
}
