//! Brandes & Köpf horizontal coordinate assignment.
//!
//! Four passes (up/down x left/right) each align every node with a median
//! neighbor into vertical blocks, then compact the blocks subject to
//! separation constraints. The passes are reconciled by shifting each onto
//! the narrowest one's extent and taking, per node, the mean of the two
//! middle candidates.

use crate::model::{BkAlign, BorderSide, DummyKind, LabelPos};
use crate::util;
use crate::graphlib::{Graph, GraphOptions};
use crate::LayoutGraph;
use rustc_hash::{FxHashMap, FxHashSet};

pub type Conflicts = FxHashMap<String, FxHashSet<String>>;
pub type XCoords = FxHashMap<String, f64>;

pub fn add_conflict(conflicts: &mut Conflicts, v: &str, w: &str) {
    let (v, w) = if v <= w { (v, w) } else { (w, v) };
    conflicts
        .entry(v.to_string())
        .or_default()
        .insert(w.to_string());
}

pub fn has_conflict(conflicts: &Conflicts, v: &str, w: &str) -> bool {
    let (v, w) = if v <= w { (v, w) } else { (w, v) };
    conflicts.get(v).map(|set| set.contains(w)).unwrap_or(false)
}

/// Marks edges that cross an inner segment (dummy-to-dummy); those edges are
/// barred from alignment so long chains stay straight.
pub fn find_type1_conflicts(g: &LayoutGraph, layering: &[Vec<String>], conflicts: &mut Conflicts) {
    for pair in layering.windows(2) {
        let (north, south) = (&pair[0], &pair[1]);
        if south.is_empty() {
            continue;
        }

        // `k0`/`k1` bracket the north positions reachable without crossing
        // an inner segment; anything outside conflicts.
        let mut k0 = 0usize;
        let mut scan_from = 0usize;
        let last = south.len() - 1;

        for (i, v) in south.iter().enumerate() {
            let inner_north = inner_segment_neighbor(g, v);
            let k1 = inner_north
                .as_deref()
                .and_then(|w| g.node(w))
                .and_then(|n| n.order)
                .unwrap_or(north.len());

            if inner_north.is_none() && i != last {
                continue;
            }

            for scan_node in &south[scan_from..=i] {
                for u in g.predecessors(scan_node) {
                    let Some(u_node) = g.node(u) else {
                        continue;
                    };
                    let u_pos = u_node.order.unwrap_or(0);
                    let both_dummies = u_node.is_dummy()
                        && g.node(scan_node).map(|n| n.is_dummy()).unwrap_or(false);
                    if (u_pos < k0 || k1 < u_pos) && !both_dummies {
                        add_conflict(conflicts, u, scan_node);
                    }
                }
            }
            scan_from = i + 1;
            k0 = k1;
        }
    }
}

/// Marks dummy-to-dummy edges that cross a compound border, so chains do not
/// get aligned through a subgraph they pass beside.
pub fn find_type2_conflicts(g: &LayoutGraph, layering: &[Vec<String>], conflicts: &mut Conflicts) {
    fn scan(
        g: &LayoutGraph,
        conflicts: &mut Conflicts,
        south: &[String],
        from: usize,
        to: usize,
        prev_border: isize,
        next_border: isize,
    ) {
        for v in &south[from..to.min(south.len())] {
            if g.node(v).map(|n| !n.is_dummy()).unwrap_or(true) {
                continue;
            }
            for u in g.predecessors(v) {
                let Some(u_node) = g.node(u) else {
                    continue;
                };
                if !u_node.is_dummy() {
                    continue;
                }
                let u_pos = u_node.order.unwrap_or(0) as isize;
                if u_pos < prev_border || u_pos > next_border {
                    add_conflict(conflicts, u, v);
                }
            }
        }
    }

    for pair in layering.windows(2) {
        let (north, south) = (&pair[0], &pair[1]);

        let mut prev_border: isize = -1;
        let mut next_border: Option<isize> = None;
        let mut from = 0usize;

        for (i, v) in south.iter().enumerate() {
            let is_border = g
                .node(v)
                .map(|n| n.dummy == Some(DummyKind::Border))
                .unwrap_or(false);
            if is_border {
                if let Some(u) = g.predecessors(v).first() {
                    next_border = g.node(u).and_then(|n| n.order).map(|o| o as isize);
                    scan(
                        g,
                        conflicts,
                        south,
                        from,
                        i,
                        prev_border,
                        next_border.unwrap_or(-1),
                    );
                    from = i;
                    prev_border = next_border.unwrap_or(prev_border);
                }
            }
            scan(
                g,
                conflicts,
                south,
                from,
                south.len(),
                next_border.unwrap_or(-1),
                north.len() as isize,
            );
        }
    }
}

fn inner_segment_neighbor(g: &LayoutGraph, v: &str) -> Option<String> {
    if !g.node(v)?.is_dummy() {
        return None;
    }
    g.predecessors(v)
        .into_iter()
        .find(|u| g.node(u).map(|n| n.is_dummy()).unwrap_or(false))
        .map(|u| u.to_string())
}

/// `root` names each block's representative; `align` is the cyclic
/// next-pointer within a block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockAlignment {
    pub root: FxHashMap<String, String>,
    pub align: FxHashMap<String, String>,
}

/// Chains each node to a median neighbor in the fixed direction, skipping
/// conflicted edges and never letting chains cross.
pub fn vertical_alignment<F>(
    layering: &[Vec<String>],
    conflicts: &Conflicts,
    neighbors: F,
) -> BlockAlignment
where
    F: Fn(&str) -> Vec<String>,
{
    let mut root: FxHashMap<String, String> = FxHashMap::default();
    let mut align: FxHashMap<String, String> = FxHashMap::default();
    let mut pos: FxHashMap<String, usize> = FxHashMap::default();

    for layer in layering {
        for (order, v) in layer.iter().enumerate() {
            root.insert(v.clone(), v.clone());
            align.insert(v.clone(), v.clone());
            pos.insert(v.clone(), order);
        }
    }

    for layer in layering {
        let mut prev_pos: isize = -1;
        for v in layer {
            let mut ws = neighbors(v);
            if ws.is_empty() {
                continue;
            }
            ws.sort_by_key(|w| pos.get(w).copied().unwrap_or(usize::MAX));

            let mid = (ws.len() - 1) as f64 / 2.0;
            let lo = mid.floor() as usize;
            let hi = mid.ceil() as usize;
            for w in &ws[lo..=hi] {
                let w_pos = pos.get(w).copied().unwrap_or(usize::MAX) as isize;
                let free = align.get(v).map(|a| a == v).unwrap_or(false);
                if free && prev_pos < w_pos && !has_conflict(conflicts, v, w) {
                    align.insert(w.clone(), v.clone());
                    let w_root = root.get(w).cloned().unwrap_or_else(|| w.clone());
                    align.insert(v.clone(), w_root.clone());
                    root.insert(v.clone(), w_root);
                    prev_pos = w_pos;
                }
            }
        }
    }

    BlockAlignment { root, align }
}

/// Longest-path placement of the block graph, then a pull towards the
/// opposite side where separation allows, yielding one x per node.
pub fn horizontal_compaction(
    g: &LayoutGraph,
    layering: &[Vec<String>],
    alignment: &BlockAlignment,
    reverse_sep: bool,
) -> XCoords {
    let root = &alignment.root;
    let block_graph = build_block_graph(g, layering, root, reverse_sep);
    let blocked_side = if reverse_sep {
        BorderSide::Left
    } else {
        BorderSide::Right
    };

    let mut xs: XCoords = XCoords::default();

    // Depth-first over the block graph, assigning a block once all its
    // inputs are assigned.
    fn visit_all<F, S>(block_graph: &Graph<(), f64, ()>, mut inputs: F, mut assign: S)
    where
        F: FnMut(&str) -> Vec<String>,
        S: FnMut(&str),
    {
        let mut stack: Vec<String> = block_graph.nodes().map(|v| v.to_string()).collect();
        let mut expanded: FxHashSet<String> = FxHashSet::default();
        while let Some(v) = stack.pop() {
            if expanded.contains(&v) {
                assign(&v);
                continue;
            }
            expanded.insert(v.clone());
            stack.push(v.clone());
            stack.extend(inputs(&v));
        }
    }

    // Pass 1: smallest feasible coordinates, left to right.
    visit_all(
        &block_graph,
        |v| {
            block_graph
                .predecessors(v)
                .iter()
                .map(|s| s.to_string())
                .collect()
        },
        |v| {
            let mut x: f64 = 0.0;
            for key in block_graph.in_edges(v, None) {
                let sep = block_graph.edge_by_key(&key).copied().unwrap_or(0.0);
                let prev = xs.get(&key.v).copied().unwrap_or(0.0);
                x = x.max(prev + sep);
            }
            xs.insert(v.to_string(), x);
        },
    );

    // Pass 2: pull right up to the successors' slack. Blocks rooted at a
    // border on the blocked side stay put so compound sides stay straight.
    visit_all(
        &block_graph,
        |v| {
            block_graph
                .successors(v)
                .iter()
                .map(|s| s.to_string())
                .collect()
        },
        |v| {
            let mut limit = f64::INFINITY;
            for key in block_graph.out_edges(v, None) {
                let sep = block_graph.edge_by_key(&key).copied().unwrap_or(0.0);
                let next = xs.get(&key.w).copied().unwrap_or(0.0);
                limit = limit.min(next - sep);
            }
            let border = g.node(v).and_then(|n| n.border_type);
            if limit.is_finite() && border != Some(blocked_side) {
                let current = xs.get(v).copied().unwrap_or(0.0);
                xs.insert(v.to_string(), current.max(limit));
            }
        },
    );

    // Every node takes its block root's coordinate.
    alignment
        .align
        .keys()
        .map(|v| {
            let r = root.get(v).cloned().unwrap_or_else(|| v.clone());
            (v.clone(), xs.get(&r).copied().unwrap_or(0.0))
        })
        .collect()
}

/// One node per block; an edge per adjacent pair within a rank, weighted by
/// the separation their labels demand.
fn build_block_graph(
    g: &LayoutGraph,
    layering: &[Vec<String>],
    root: &FxHashMap<String, String>,
    reverse_sep: bool,
) -> Graph<(), f64, ()> {
    let mut block_graph: Graph<(), f64, ()> = Graph::new(GraphOptions::default());
    for layer in layering {
        let mut prev: Option<&String> = None;
        for v in layer {
            let v_root = root.get(v).cloned().unwrap_or_else(|| v.clone());
            block_graph.ensure_node(v_root.clone());
            if let Some(u) = prev {
                let u_root = root.get(u).cloned().unwrap_or_else(|| u.clone());
                let gap = separation(g, v, u, reverse_sep);
                let prev_gap = block_graph.edge(&u_root, &v_root, None).copied().unwrap_or(0.0);
                block_graph.set_edge_with_label(u_root, v_root, gap.max(prev_gap));
            }
            prev = Some(v);
        }
    }
    block_graph
}

/// Required center distance between in-rank neighbors `v` and `u`: half
/// widths plus the node or edge separation, with off-center edge labels
/// counted on the side they occupy.
fn separation(g: &LayoutGraph, v: &str, u: &str, reverse_sep: bool) -> f64 {
    let node_sep = g.graph().nodesep;
    let edge_sep = g.graph().edgesep;

    let mut sum = 0.0;
    for (id, flip) in [(v, 1.0), (u, -1.0)] {
        let Some(node) = g.node(id) else {
            sum += node_sep / 2.0;
            continue;
        };
        sum += node.width / 2.0;
        if let Some(labelpos) = node.labelpos {
            let delta = match labelpos {
                LabelPos::Left => -node.width / 2.0,
                LabelPos::Right => node.width / 2.0,
                LabelPos::Center => 0.0,
            };
            if delta != 0.0 {
                let signed = flip * delta;
                sum += if reverse_sep { signed } else { -signed };
            }
        }
        sum += if node.is_dummy() { edge_sep } else { node_sep } / 2.0;
    }
    sum
}

/// The candidate set with the smallest horizontal extent, in the fixed
/// `ul, ur, dl, dr` tie order.
pub fn smallest_width_alignment(g: &LayoutGraph, xss: &[XCoords; 4]) -> XCoords {
    let mut best_width = f64::INFINITY;
    let mut best: XCoords = XCoords::default();

    for xs in xss {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (v, &x) in xs {
            let half = g.node(v).map(|n| n.width).unwrap_or(0.0) / 2.0;
            min = min.min(x - half);
            max = max.max(x + half);
        }
        if max - min < best_width {
            best_width = max - min;
            best = xs.clone();
        }
    }
    best
}

/// Shifts every candidate set so left-biased ones share the target's
/// minimum and right-biased ones its maximum.
pub fn align_coordinates(xss: &mut [XCoords; 4], align_to: &XCoords) {
    let target_min = align_to.values().copied().fold(f64::INFINITY, f64::min);
    let target_max = align_to.values().copied().fold(f64::NEG_INFINITY, f64::max);

    for which in ALIGNMENTS {
        let xs = &mut xss[which as usize];
        if xs.is_empty() {
            continue;
        }
        let delta = match which {
            BkAlign::UpLeft | BkAlign::DownLeft => {
                target_min - xs.values().copied().fold(f64::INFINITY, f64::min)
            }
            BkAlign::UpRight | BkAlign::DownRight => {
                target_max - xs.values().copied().fold(f64::NEG_INFINITY, f64::max)
            }
        };
        if delta != 0.0 {
            for x in xs.values_mut() {
                *x += delta;
            }
        }
    }
}

/// Final x per node: the chosen alignment's value, or the mean of the two
/// middle candidates when balancing all four.
pub fn balance(xss: &[XCoords; 4], align: Option<BkAlign>) -> XCoords {
    let reference = &xss[BkAlign::UpLeft as usize];

    if let Some(which) = align {
        let chosen = &xss[which as usize];
        return reference
            .keys()
            .map(|v| (v.clone(), chosen.get(v).copied().unwrap_or(0.0)))
            .collect();
    }

    reference
        .keys()
        .map(|v| {
            let mut candidates: Vec<f64> =
                xss.iter().filter_map(|xs| xs.get(v).copied()).collect();
            candidates.sort_by(f64::total_cmp);
            (v.clone(), (candidates[1] + candidates[2]) / 2.0)
        })
        .collect()
}

const ALIGNMENTS: [BkAlign; 4] = [
    BkAlign::UpLeft,
    BkAlign::UpRight,
    BkAlign::DownLeft,
    BkAlign::DownRight,
];

pub fn position_x(g: &LayoutGraph) -> XCoords {
    let layering = util::build_layer_matrix(g);

    let mut conflicts = Conflicts::default();
    find_type1_conflicts(g, &layering, &mut conflicts);
    find_type2_conflicts(g, &layering, &mut conflicts);

    let mut xss: [XCoords; 4] = Default::default();
    for which in ALIGNMENTS {
        let down = matches!(which, BkAlign::DownLeft | BkAlign::DownRight);
        let right = matches!(which, BkAlign::UpRight | BkAlign::DownRight);

        let mut adjusted: Vec<Vec<String>> = if down {
            layering.iter().rev().cloned().collect()
        } else {
            layering.clone()
        };
        if right {
            for layer in &mut adjusted {
                layer.reverse();
            }
        }

        let alignment = vertical_alignment(&adjusted, &conflicts, |v| {
            if down {
                g.successors(v).iter().map(|s| s.to_string()).collect()
            } else {
                g.predecessors(v).iter().map(|s| s.to_string()).collect()
            }
        });

        let mut xs = horizontal_compaction(g, &adjusted, &alignment, right);
        if right {
            for x in xs.values_mut() {
                *x = -*x;
            }
        }
        xss[which as usize] = xs;
    }

    let narrowest = smallest_width_alignment(g, &xss);
    align_coordinates(&mut xss, &narrowest);
    balance(&xss, g.graph().align)
}
