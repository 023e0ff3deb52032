//! Cycle breaking.
//!
//! A feedback arc set is chosen (greedy by default, DFS back-edges
//! otherwise) and those edges are stored flipped for the rest of the
//! pipeline. `undo` restores the original orientation but keeps the
//! `reversed` marker so the feedback set stays observable in the output.

use crate::feedback;
use crate::graphlib::EdgeKey;
use crate::model::Acyclicer;
use crate::LayoutGraph;
use rustc_hash::FxHashSet;

pub fn run(g: &mut LayoutGraph) {
    let arcs = match g.graph().acyclicer {
        Acyclicer::Greedy => feedback::greedy_feedback_arcs_with(g, |label| {
            if label.weight.is_finite() {
                label.weight.round() as i64
            } else {
                0
            }
        }),
        Acyclicer::Dfs => dfs_back_edges(g),
    };

    let mut rev = 0usize;
    for key in arcs.into_iter().filter(|key| !key.is_loop()) {
        let Some(mut label) = g.edge_by_key(&key).cloned() else {
            continue;
        };
        g.remove_edge_key(&key);

        label.forward_name = key.name;
        label.reversed = true;

        let name = loop {
            rev += 1;
            let candidate = format!("rev{rev}");
            if !g.has_edge(&key.w, &key.v, Some(&candidate)) {
                break candidate;
            }
        };
        g.set_edge_named(key.w, key.v, Some(name), Some(label));
    }
}

/// Puts flipped edges back. Their polylines were already reversed by the
/// point-correction stage, so only the key changes here.
pub fn undo(g: &mut LayoutGraph) {
    for key in g.edge_keys() {
        let Some(label) = g.edge_by_key(&key) else {
            continue;
        };
        if !label.reversed {
            continue;
        }
        let mut label = label.clone();
        g.remove_edge_key(&key);

        let forward_name = label.forward_name.take();
        g.set_edge_named(key.w, key.v, forward_name, Some(label));
    }
}

fn dfs_back_edges(g: &LayoutGraph) -> Vec<EdgeKey> {
    fn dfs(
        g: &LayoutGraph,
        v: &str,
        visited: &mut FxHashSet<String>,
        gray: &mut FxHashSet<String>,
        arcs: &mut Vec<EdgeKey>,
    ) {
        if !visited.insert(v.to_string()) {
            return;
        }
        gray.insert(v.to_string());
        for key in g.out_edges(v, None) {
            if key.is_loop() {
                continue;
            }
            if gray.contains(&key.w) {
                arcs.push(key);
            } else {
                dfs(g, &key.w, visited, gray, arcs);
            }
        }
        gray.remove(v);
    }

    let mut visited = FxHashSet::default();
    let mut gray = FxHashSet::default();
    let mut arcs = Vec::new();
    for v in g.node_ids() {
        dfs(g, &v, &mut visited, &mut gray, &mut arcs);
    }
    arcs
}
