//! Rank assignment.
//!
//! Three rankers over the flat (non-compound) view of the graph: longest
//! path (cheap, loose), tight tree (longest path pulled tight), and network
//! simplex (minimizes total weighted edge length).

pub mod feasible_tree;
pub mod network_simplex;

use crate::graphlib::{EdgeKey, Graph};
use crate::model::Ranker;
use crate::LayoutGraph;
use rustc_hash::FxHashMap;

/// Node label of the tight spanning tree used by the rankers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeNode {
    pub low: i32,
    pub lim: i32,
    pub parent: Option<String>,
}

/// Edge label of the tight spanning tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeEdge {
    pub cutvalue: f64,
}

/// The undirected spanning tree threaded through the network-simplex steps.
pub type TightTree = Graph<TreeNode, TreeEdge, ()>;

pub fn rank(g: &mut LayoutGraph) {
    match g.graph().ranker {
        Ranker::LongestPath => longest_path(g),
        Ranker::TightTree => {
            longest_path(g);
            feasible_tree::feasible_tree(g);
        }
        Ranker::NetworkSimplex => network_simplex::run(g),
    }
}

/// Topological labeling: every node as high as its outgoing constraints
/// allow, sinks at 0. Ranks may come out negative; callers normalize.
pub fn longest_path(g: &mut LayoutGraph) {
    fn visit(g: &mut LayoutGraph, v: &str, memo: &mut FxHashMap<String, i32>) -> i32 {
        if let Some(&rank) = memo.get(v) {
            return rank;
        }

        let mut rank: Option<i32> = None;
        for key in g.out_edges(v, None) {
            let minlen = g.edge_by_key(&key).map(|e| e.minlen as i32).unwrap_or(1);
            let candidate = visit(g, &key.w, memo) - minlen;
            rank = Some(match rank {
                Some(best) => best.min(candidate),
                None => candidate,
            });
        }

        let rank = rank.unwrap_or(0);
        if let Some(node) = g.node_mut(v) {
            node.rank = Some(rank);
        }
        memo.insert(v.to_string(), rank);
        rank
    }

    let sources: Vec<String> = g.sources().into_iter().map(|s| s.to_string()).collect();
    let mut memo = FxHashMap::default();
    for v in sources {
        visit(g, &v, &mut memo);
    }
}

/// How much longer the edge is than it has to be. Tight edges have slack 0.
pub fn slack(g: &LayoutGraph, key: &EdgeKey) -> i32 {
    let v_rank = g.node(&key.v).and_then(|n| n.rank).unwrap_or(0);
    let w_rank = g.node(&key.w).and_then(|n| n.rank).unwrap_or(0);
    let minlen = g.edge_by_key(key).map(|e| e.minlen as i32).unwrap_or(1);
    w_rank - v_rank - minlen
}
