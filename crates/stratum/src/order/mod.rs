//! Crossing reduction.
//!
//! Alternating downward/upward barycenter sweeps reorder one rank at a time
//! against its fixed neighbor rank. Every sweep is scored by an exact
//! crossing count and the best complete ordering wins. Compound structure is
//! honored by sorting each subgraph in isolation and by a constraint graph
//! that keeps sibling subgraphs from interleaving across ranks.

mod barycenter;
mod cross_count;
mod init_order;
mod layer_graph;

pub use barycenter::{
    barycenter, median_value, resolve_conflicts, sort, sort_subgraph, BarycenterEntry, SortEntry,
    SortResult,
};
pub use cross_count::cross_count;
pub use init_order::init_order;
pub use layer_graph::{build_layer_graph, LayerGraph, Relationship};

use crate::graphlib::{Graph, GraphOptions};
use crate::util;
use crate::LayoutGraph;
use rustc_hash::FxHashMap;

/// Edge labels that expose an ordering weight.
pub trait EdgeWeight {
    fn weight(&self) -> f64;
}

impl EdgeWeight for crate::model::EdgeLabel {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Aggregated edge weight inside a layer graph.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightLabel {
    pub weight: f64,
}

impl EdgeWeight for WeightLabel {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Sweeps stop after this many rounds even if they keep improving.
const MAX_SWEEPS: usize = 24;

pub fn order(g: &mut LayoutGraph) {
    let mut max_rank = i32::MIN;
    g.for_each_node(|_, node| {
        if let Some(rank) = node.rank {
            max_rank = max_rank.max(rank);
        }
    });
    if max_rank == i32::MIN {
        return;
    }

    let layering = init_order(g);
    apply_order(g, &layering);

    let root = synthetic_root(g);
    let down: Vec<i32> = (1..=max_rank).collect();
    let up: Vec<i32> = (0..max_rank).rev().collect();

    let mut best: Option<Vec<Vec<String>>> = None;
    let mut best_crossings = f64::INFINITY;
    let mut since_best = 0usize;

    for sweep in 0..MAX_SWEEPS {
        if since_best >= 4 {
            break;
        }
        let bias_right = sweep % 4 >= 2;
        if sweep % 2 == 1 {
            sweep_ranks(g, &down, Relationship::InEdges, bias_right, &root);
        } else {
            sweep_ranks(g, &up, Relationship::OutEdges, bias_right, &root);
        }

        let layering = util::build_layer_matrix(g);
        let crossings = cross_count(g, &layering);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = Some(layering);
            since_best = 0;
        } else {
            since_best += 1;
        }
    }

    if let Some(best) = best {
        apply_order(g, &best);
    }
}

fn apply_order(g: &mut LayoutGraph, layering: &[Vec<String>]) {
    for layer in layering {
        for (i, v) in layer.iter().enumerate() {
            if let Some(node) = g.node_mut(v) {
                node.order = Some(i);
            }
        }
    }
}

fn sweep_ranks(
    g: &mut LayoutGraph,
    ranks: &[i32],
    relationship: Relationship,
    bias_right: bool,
    root: &str,
) {
    // Constraint graph carried across ranks: an edge `a -> b` forces
    // subgraph `a` to stay left of `b` for the rest of the sweep.
    let mut cg: Graph<(), (), ()> = Graph::new(GraphOptions::default());

    for &rank in ranks {
        let lg = build_layer_graph(g, rank, relationship, root);
        let sorted = barycenter::sort_subgraph(&lg, root, &cg, bias_right);
        for (i, v) in sorted.vs.iter().enumerate() {
            if let Some(node) = g.node_mut(v) {
                node.order = Some(i);
            }
        }
        add_subgraph_constraints(&lg, &mut cg, &sorted.vs);
    }
}

/// Records left-to-right constraints between the subgraphs touched by the
/// just-sorted layer, at every nesting level.
fn add_subgraph_constraints(lg: &LayerGraph, cg: &mut Graph<(), (), ()>, vs: &[String]) {
    let mut prev: FxHashMap<String, String> = FxHashMap::default();
    let mut root_prev: Option<String> = None;

    for v in vs {
        let mut child = lg.parent(v).map(|s| s.to_string());
        while let Some(c) = child {
            let parent = lg.parent(&c).map(|s| s.to_string());
            let prev_child = match &parent {
                Some(p) => prev.insert(p.clone(), c.clone()),
                None => root_prev.replace(c.clone()),
            };
            if let Some(prev_child) = prev_child {
                if prev_child != c {
                    cg.set_edge(prev_child, c);
                    break;
                }
            }
            child = parent;
        }
    }
}

/// An id that is not a node of `g`, to act as the layer graphs' root.
fn synthetic_root(g: &LayoutGraph) -> String {
    let mut n = 0usize;
    loop {
        n += 1;
        let id = format!("_sr{n}");
        if !g.has_node(&id) {
            return id;
        }
    }
}
