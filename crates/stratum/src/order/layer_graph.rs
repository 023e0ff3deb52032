//! Rank-local graphs for the ordering sweeps.
//!
//! A layer graph holds the nodes of one rank (plus compound nodes spanning
//! it), parented under a synthetic root, with the fixed-rank neighbors and
//! aggregated edge weights the barycenter needs. Out-edges are stored
//! reversed so the sort always reads its neighbors through `in_edges`.

use super::WeightLabel;
use crate::graphlib::{Graph, GraphOptions};
use crate::model::NodeLabel;
use crate::LayoutGraph;

pub type LayerGraph = Graph<NodeLabel, WeightLabel, ()>;

/// Which adjacent rank is fixed during the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    /// Downward sweep: the rank above is fixed.
    InEdges,
    /// Upward sweep: the rank below is fixed.
    OutEdges,
}

pub fn build_layer_graph(
    g: &LayoutGraph,
    rank: i32,
    relationship: Relationship,
    root: &str,
) -> LayerGraph {
    let mut lg: LayerGraph = Graph::new(GraphOptions {
        compound: true,
        ..Default::default()
    });
    lg.set_node(root.to_string(), NodeLabel::default());

    for v in g.node_ids() {
        let Some(node) = g.node(&v) else {
            continue;
        };
        let on_rank = node.rank == Some(rank);
        let spans_rank = match (node.min_rank, node.max_rank) {
            (Some(min), Some(max)) => min <= rank && rank <= max,
            _ => false,
        };
        if !on_rank && !spans_rank {
            continue;
        }

        lg.set_node(v.clone(), node.clone());
        let parent = g.parent(&v).unwrap_or(root).to_string();
        lg.set_parent(v.clone(), parent);

        // Multi-edges to the same neighbor collapse into one weighted edge.
        let fixed_neighbors = match relationship {
            Relationship::InEdges => g.in_edges(&v, None),
            Relationship::OutEdges => g.out_edges(&v, None),
        };
        for key in fixed_neighbors {
            let u = if key.v == v { &key.w } else { &key.v };
            let weight = g.edge_by_key(&key).map(|e| e.weight).unwrap_or(0.0);
            if !lg.has_node(u) {
                let label = g.node(u).cloned().unwrap_or_default();
                lg.set_node(u.clone(), label);
            }
            let prev = lg.edge(u, &v, None).map(|e| e.weight).unwrap_or(0.0);
            lg.set_edge_with_label(
                u.clone(),
                v.clone(),
                WeightLabel {
                    weight: weight + prev,
                },
            );
        }

        // A compound node is represented on this rank by its border slice
        // alone; its full border tables belong to other ranks.
        if node.min_rank.is_some() {
            lg.set_node(
                v.clone(),
                NodeLabel {
                    border_left: vec![node.border_left_at(rank).map(|s| s.to_string())],
                    border_right: vec![node.border_right_at(rank).map(|s| s.to_string())],
                    ..Default::default()
                },
            );
        }
    }

    lg
}
