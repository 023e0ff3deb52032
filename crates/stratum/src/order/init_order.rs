//! Initial within-rank ordering.
//!
//! Nodes are visited depth-first from lowest-ranked roots; each node is
//! appended to its rank's layer on first visit. The DFS keeps connected
//! nodes near each other, which gives the sweeps a reasonable start.

use crate::LayoutGraph;
use rustc_hash::FxHashSet;

pub fn init_order(g: &LayoutGraph) -> Vec<Vec<String>> {
    let leaves: Vec<String> = g
        .nodes()
        .filter(|v| g.children(v).is_empty())
        .map(|v| v.to_string())
        .collect();

    let mut max_rank = i32::MIN;
    for v in &leaves {
        if let Some(rank) = g.node(v).and_then(|n| n.rank) {
            max_rank = max_rank.max(rank);
        }
    }
    if max_rank == i32::MIN {
        return Vec::new();
    }

    fn dfs(g: &LayoutGraph, v: &str, seen: &mut FxHashSet<String>, layers: &mut [Vec<String>]) {
        if !seen.insert(v.to_string()) {
            return;
        }
        if let Some(rank) = g.node(v).and_then(|n| n.rank) {
            layers[rank.max(0) as usize].push(v.to_string());
        }
        for w in g.successors(v) {
            dfs(g, w, seen, layers);
        }
    }

    // Roots first by rank; insertion order breaks rank ties so runs are
    // reproducible.
    let mut roots = leaves;
    roots.sort_by_key(|v| g.node(v).and_then(|n| n.rank).unwrap_or(i32::MAX));

    let mut layers: Vec<Vec<String>> = vec![Vec::new(); max_rank as usize + 1];
    let mut seen = FxHashSet::default();
    for v in roots {
        dfs(g, &v, &mut seen, &mut layers);
    }
    layers
}
