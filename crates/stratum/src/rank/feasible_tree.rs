//! Tight spanning tree construction.
//!
//! Starting from a longest-path ranking, grow a tree of tight edges; while
//! the tree does not span the graph, shift the tree by the slack of the
//! closest non-tree edge, which tightens that edge without loosening any
//! tree edge.

use super::{slack, TightTree, TreeNode};
use crate::graphlib::{EdgeKey, Graph, GraphOptions};
use crate::LayoutGraph;

/// Builds the tight tree over `g`, adjusting `rank`s in place. Disconnected
/// inputs degrade into a forest rather than failing.
pub fn feasible_tree(g: &mut LayoutGraph) -> TightTree {
    let mut tree: TightTree = Graph::new(GraphOptions {
        directed: false,
        ..Default::default()
    });

    let Some(start) = g.nodes().next().map(|s| s.to_string()) else {
        return tree;
    };
    tree.set_node(start, TreeNode::default());

    let size = g.node_count();
    while grow_tight_tree(&mut tree, g) < size {
        match min_slack_edge(g, &tree) {
            Some(key) => {
                let delta = if tree.has_node(&key.v) {
                    slack(g, &key)
                } else {
                    -slack(g, &key)
                };
                shift_tree_ranks(&tree, g, delta);
            }
            None => {
                // No edge leaves the tree: the remainder is a separate
                // component. Seed it as a new tree root.
                let Some(next) = g
                    .nodes()
                    .find(|v| !tree.has_node(v))
                    .map(|s| s.to_string())
                else {
                    break;
                };
                tree.set_node(next, TreeNode::default());
            }
        }
    }
    tree
}

/// Pulls every node reachable through slack-0 edges into the tree. Returns
/// the tree size afterwards.
fn grow_tight_tree(tree: &mut TightTree, g: &LayoutGraph) -> usize {
    let roots = tree.node_ids();
    for root in roots {
        let mut stack = vec![root];
        while let Some(v) = stack.pop() {
            let mut incident = g.out_edges(&v, None);
            incident.extend(g.in_edges(&v, None));
            for key in incident {
                let other = if key.v == v { &key.w } else { &key.v };
                if tree.has_node(other) || slack(g, &key) != 0 {
                    continue;
                }
                tree.set_node(other.clone(), TreeNode::default());
                tree.set_edge(v.clone(), other.clone());
                stack.push(other.clone());
            }
        }
    }
    tree.node_count()
}

/// The non-tree edge with exactly one endpoint in the tree and the least
/// slack.
fn min_slack_edge(g: &LayoutGraph, tree: &TightTree) -> Option<EdgeKey> {
    let mut best: Option<(i32, EdgeKey)> = None;
    for key in g.edges() {
        if tree.has_node(&key.v) == tree.has_node(&key.w) {
            continue;
        }
        let s = slack(g, key);
        if best.as_ref().map_or(true, |(b, _)| s < *b) {
            best = Some((s, key.clone()));
        }
    }
    best.map(|(_, key)| key)
}

fn shift_tree_ranks(tree: &TightTree, g: &mut LayoutGraph, delta: i32) {
    for v in tree.node_ids() {
        if let Some(node) = g.node_mut(&v) {
            if let Some(rank) = node.rank {
                node.rank = Some(rank + delta);
            }
        }
    }
}
