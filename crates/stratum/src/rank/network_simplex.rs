//! Network simplex ranking (Gansner et al., "A Technique for Drawing
//! Directed Graphs").
//!
//! Minimizes `sum(weight * (rank(w) - rank(v) - minlen))` subject to
//! non-negative slack. Starting from a tight tree, repeatedly swap a tree
//! edge with negative cut value for the minimum-slack non-tree edge that
//! crosses the same cut, until no cut value is negative.

use super::feasible_tree::feasible_tree;
use super::{longest_path, TightTree};
use crate::graphlib::{alg, EdgeKey};
use crate::util;
use crate::LayoutGraph;
use rustc_hash::{FxHashMap, FxHashSet};

pub fn run(g: &mut LayoutGraph) {
    let mut simple = util::simplify(g);
    longest_path(&mut simple);
    let mut tree = feasible_tree(&mut simple);
    init_low_lim_values(&mut tree, None);
    init_cut_values(&mut tree, &simple);

    while let Some(e) = leave_edge(&tree) {
        let f = enter_edge(&tree, &simple, &e);
        exchange_edges(&mut tree, &mut simple, &e, &f);
    }

    for v in g.node_ids() {
        if let Some(rank) = simple.node(&v).and_then(|n| n.rank) {
            if let Some(node) = g.node_mut(&v) {
                node.rank = Some(rank);
            }
        }
    }
}

/// Numbers the tree nodes with a postorder traversal. `lim` is a node's
/// postorder index, `low` the smallest index in its subtree; together they
/// answer "is u in the subtree under v" in O(1).
pub fn init_low_lim_values(tree: &mut TightTree, root: Option<&str>) {
    let Some(root) = root
        .map(|s| s.to_string())
        .or_else(|| tree.nodes().next().map(|s| s.to_string()))
    else {
        return;
    };

    fn dfs(
        tree: &mut TightTree,
        visited: &mut FxHashSet<String>,
        next_lim: i32,
        v: &str,
        parent: Option<&str>,
    ) -> i32 {
        let low = next_lim;
        visited.insert(v.to_string());

        let mut lim = next_lim;
        let neighbors: Vec<String> = tree.neighbors(v).iter().map(|s| s.to_string()).collect();
        for w in neighbors {
            if !visited.contains(&w) {
                lim = dfs(tree, visited, lim, &w, Some(v));
            }
        }

        if let Some(label) = tree.node_mut(v) {
            label.low = low;
            label.lim = lim;
            label.parent = parent.map(|p| p.to_string());
        }
        lim + 1
    }

    let mut visited = FxHashSet::default();
    dfs(tree, &mut visited, 1, &root, None);
}

/// Assigns every tree edge the weighted flow that would cross the cut made
/// by deleting it, computed leaves-first so each step is O(degree).
pub fn init_cut_values(tree: &mut TightTree, g: &LayoutGraph) {
    let roots: Vec<&str> = tree.nodes().collect();
    let mut order = alg::postorder(tree, &roots);
    order.pop();
    for v in order {
        let Some(parent) = tree.node(&v).and_then(|n| n.parent.clone()) else {
            continue;
        };
        let cutvalue = calc_cut_value(tree, g, &v);
        if let Some(edge) = tree.edge_mut(&v, &parent, None) {
            edge.cutvalue = cutvalue;
        }
    }
}

/// Cut value of the tree edge between `child` and its parent, using the
/// already-computed cut values of `child`'s other tree edges.
pub fn calc_cut_value(tree: &TightTree, g: &LayoutGraph, child: &str) -> f64 {
    let Some(parent) = tree.node(child).and_then(|n| n.parent.as_deref()) else {
        return 0.0;
    };

    // Orientation of the tree edge in the underlying graph.
    let (child_is_tail, edge) = match g.edge(child, parent, None) {
        Some(edge) => (true, edge),
        None => match g.edge(parent, child, None) {
            Some(edge) => (false, edge),
            None => return 0.0,
        },
    };

    let mut cut = edge.weight;

    let mut account = |other: &str, other_is_head: bool, weight: f64| {
        if other == parent {
            return;
        }
        let points_to_head = child_is_tail == other_is_head;
        cut += if points_to_head { weight } else { -weight };

        if tree.has_edge(child, other, None) {
            let other_cut = tree
                .edge(child, other, None)
                .map(|e| e.cutvalue)
                .unwrap_or(0.0);
            cut += if points_to_head { -other_cut } else { other_cut };
        }
    };

    for key in g.out_edges(child, None) {
        let weight = g.edge_by_key(&key).map(|e| e.weight).unwrap_or(0.0);
        account(&key.w, true, weight);
    }
    for key in g.in_edges(child, None) {
        let weight = g.edge_by_key(&key).map(|e| e.weight).unwrap_or(0.0);
        account(&key.v, false, weight);
    }

    cut
}

/// Any tree edge with a negative cut value, or `None` when ranks are optimal.
pub fn leave_edge(tree: &TightTree) -> Option<EdgeKey> {
    tree.edges()
        .find(|key| {
            tree.edge_by_key(key)
                .map(|e| e.cutvalue < 0.0)
                .unwrap_or(false)
        })
        .cloned()
}

/// The minimum-slack graph edge that crosses the cut of `edge` in the
/// opposite direction.
pub fn enter_edge(tree: &TightTree, g: &LayoutGraph, edge: &EdgeKey) -> EdgeKey {
    // Orient the tree edge the way the graph does.
    let (v, w) = if g.has_edge(&edge.v, &edge.w, None) {
        (edge.v.as_str(), edge.w.as_str())
    } else {
        (edge.w.as_str(), edge.v.as_str())
    };

    let spans: FxHashMap<&str, (i32, i32)> = tree
        .nodes()
        .filter_map(|id| tree.node(id).map(|n| (id, (n.low, n.lim))))
        .collect();

    let (Some(&(v_low, v_lim)), Some(&(_, w_lim))) = (spans.get(v), spans.get(w)) else {
        return edge.clone();
    };
    // The tail component of the cut is the subtree under whichever endpoint
    // has the smaller lim.
    let ((tail_low, tail_lim), flip) = if v_lim > w_lim {
        (spans[w], true)
    } else {
        ((v_low, v_lim), false)
    };

    let in_tail = |id: &str| {
        spans
            .get(id)
            .map(|&(_, lim)| tail_low <= lim && lim <= tail_lim)
            .unwrap_or(false)
    };

    let mut best: Option<(i32, EdgeKey)> = None;
    for key in g.edges() {
        if flip == in_tail(&key.v) && flip != in_tail(&key.w) {
            let s = super::slack(g, key);
            if best.as_ref().map_or(true, |(b, _)| s < *b) {
                best = Some((s, key.clone()));
            }
        }
    }
    best.map(|(_, key)| key).unwrap_or_else(|| edge.clone())
}

/// Swaps `e` out of the tree for `f`, then recomputes the tree bookkeeping
/// and the ranks it implies.
pub fn exchange_edges(tree: &mut TightTree, g: &mut LayoutGraph, e: &EdgeKey, f: &EdgeKey) {
    tree.remove_edge(&e.v, &e.w, None);
    tree.set_edge(f.v.clone(), f.w.clone());
    init_low_lim_values(tree, None);
    init_cut_values(tree, g);
    update_ranks(tree, g);
}

fn update_ranks(tree: &TightTree, g: &mut LayoutGraph) {
    let Some(root) = tree
        .nodes()
        .find(|v| tree.node(v).map(|n| n.parent.is_none()).unwrap_or(false))
        .or_else(|| tree.nodes().next())
    else {
        return;
    };

    for v in alg::preorder(tree, &[root]).into_iter().skip(1) {
        let Some(parent) = tree.node(&v).and_then(|n| n.parent.clone()) else {
            continue;
        };
        let (minlen, flipped) = match g.edge(&v, &parent, None) {
            Some(edge) => (edge.minlen as i32, false),
            None => match g.edge(&parent, &v, None) {
                Some(edge) => (edge.minlen as i32, true),
                None => continue,
            },
        };
        let Some(parent_rank) = g.node(&parent).and_then(|n| n.rank) else {
            continue;
        };
        let rank = if flipped {
            parent_rank + minlen
        } else {
            parent_rank - minlen
        };
        if let Some(node) = g.node_mut(&v) {
            node.rank = Some(rank);
        }
    }
}
