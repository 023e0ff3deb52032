//! Nesting constraints for compound graphs.
//!
//! A synthetic root plus per-compound top/bottom border nodes and auxiliary
//! edges force every child to rank strictly between its parent's borders.
//! Real `minlen`s are scaled so a nesting step fits between any two original
//! ranks. The pass also connects stray components through the root, since
//! the rankers expect a connected graph.

use crate::graphlib::alg;
use crate::model::{DummyKind, EdgeLabel, NodeLabel};
use crate::util::IdMint;
use crate::LayoutGraph;
use rustc_hash::FxHashMap;

pub fn run(g: &mut LayoutGraph, ids: &mut IdMint) {
    let root = ids.fresh(g, "_root");
    g.set_node(
        root.clone(),
        NodeLabel {
            dummy: Some(DummyKind::NestingRoot),
            ..Default::default()
        },
    );
    g.graph_mut().nesting_root = Some(root.clone());

    let depths = tree_depths(g);
    let height = depths.values().copied().max().unwrap_or(1) - 1;
    let node_sep = 2 * height + 1;

    // Leave room for a border rank above and below every nesting level.
    g.for_each_edge_mut(|_, edge| edge.minlen *= node_sep);

    let weight = sum_weights(g) + 1.0;

    let top_level: Vec<String> = g.root_children().iter().map(|s| s.to_string()).collect();
    for child in top_level {
        if child != root {
            dfs(g, ids, &root, node_sep, weight, height, &depths, &child);
        }
    }

    g.graph_mut().node_rank_factor = node_sep;

    // Components not reached by any nesting edge still need a path to the
    // root, or ranking sees a disconnected graph.
    let components = alg::components(g);
    if components.len() > 1 {
        for component in components {
            if component.iter().any(|v| v == &root) {
                continue;
            }
            let Some(v) = component.first() else {
                continue;
            };
            if g.edge(&root, v, None).is_none() {
                g.set_edge_with_label(
                    root.clone(),
                    v.clone(),
                    EdgeLabel {
                        weight: 0.0,
                        minlen: node_sep,
                        nesting: true,
                        ..Default::default()
                    },
                );
            }
        }
    }
}

/// Removes the nesting root and every auxiliary edge. Runs after ranking;
/// the border top/bottom nodes stay until border removal.
pub fn cleanup(g: &mut LayoutGraph) {
    if let Some(root) = g.graph_mut().nesting_root.take() {
        g.remove_node(&root);
    }
    for key in g.edge_keys() {
        if g.edge_by_key(&key).map(|e| e.nesting).unwrap_or(false) {
            g.remove_edge_key(&key);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn dfs(
    g: &mut LayoutGraph,
    ids: &mut IdMint,
    root: &str,
    node_sep: usize,
    weight: f64,
    height: usize,
    depths: &FxHashMap<String, usize>,
    v: &str,
) {
    let children: Vec<String> = g.children(v).iter().map(|s| s.to_string()).collect();
    if children.is_empty() {
        if v != root {
            g.set_edge_with_label(
                root.to_string(),
                v.to_string(),
                EdgeLabel {
                    weight: 0.0,
                    minlen: node_sep,
                    nesting: true,
                    ..Default::default()
                },
            );
        }
        return;
    }

    let top = border_node(g, ids, "_bt");
    let bottom = border_node(g, ids, "_bb");
    g.set_parent(top.clone(), v.to_string());
    g.set_parent(bottom.clone(), v.to_string());
    if let Some(node) = g.node_mut(v) {
        node.border_top = Some(top.clone());
        node.border_bottom = Some(bottom.clone());
    }

    for child in children {
        dfs(g, ids, root, node_sep, weight, height, depths, &child);

        let (child_top, child_bottom, child_is_compound) = match g.node(&child) {
            Some(node) => (
                node.border_top.clone().unwrap_or_else(|| child.clone()),
                node.border_bottom.clone().unwrap_or_else(|| child.clone()),
                node.border_top.is_some(),
            ),
            None => (child.clone(), child.clone(), false),
        };

        // Compound children contribute one edge per border; leaves get a
        // doubled weight so they stay put as firmly.
        let child_weight = if child_is_compound { weight } else { 2.0 * weight };
        let minlen = if child_top == child_bottom {
            height.saturating_sub(depths.get(v).copied().unwrap_or(1)) + 1
        } else {
            1
        };

        g.set_edge_with_label(
            top.clone(),
            child_top,
            EdgeLabel {
                weight: child_weight,
                minlen,
                nesting: true,
                ..Default::default()
            },
        );
        g.set_edge_with_label(
            child_bottom,
            bottom.clone(),
            EdgeLabel {
                weight: child_weight,
                minlen,
                nesting: true,
                ..Default::default()
            },
        );
    }

    if g.parent(v).is_none() {
        g.set_edge_with_label(
            root.to_string(),
            top,
            EdgeLabel {
                weight: 0.0,
                minlen: height + depths.get(v).copied().unwrap_or(1),
                nesting: true,
                ..Default::default()
            },
        );
    }
}

fn border_node(g: &mut LayoutGraph, ids: &mut IdMint, prefix: &str) -> String {
    let id = ids.fresh(g, prefix);
    g.set_node(
        id.clone(),
        NodeLabel {
            dummy: Some(DummyKind::Border),
            ..Default::default()
        },
    );
    id
}

/// Depth of every node in the compound forest, roots at 1.
fn tree_depths(g: &LayoutGraph) -> FxHashMap<String, usize> {
    fn dfs(g: &LayoutGraph, v: &str, depth: usize, out: &mut FxHashMap<String, usize>) {
        for child in g.children(v) {
            dfs(g, child, depth + 1, out);
        }
        out.insert(v.to_string(), depth);
    }

    let mut out = FxHashMap::default();
    for v in g.root_children() {
        dfs(g, v, 1, &mut out);
    }
    out
}

fn sum_weights(g: &LayoutGraph) -> f64 {
    let mut total = 0.0;
    g.for_each_edge(|_, edge| total += edge.weight);
    total
}
