//! Border dummies around compound nodes.
//!
//! For every rank a compound node spans, a left and a right border dummy is
//! inserted and chained to the previous rank's border with a high-priority
//! edge. Ordering then keeps children between the borders, and positioning
//! gives the compound node lateral extent. After positioning, the compound
//! rectangle is read off the border nodes and the dummies are deleted.

use crate::model::{BorderSide, DummyKind, EdgeLabel, NodeLabel};
use crate::util::IdMint;
use crate::LayoutGraph;

pub fn add_border_segments(g: &mut LayoutGraph, ids: &mut IdMint) {
    fn dfs(g: &mut LayoutGraph, ids: &mut IdMint, v: &str) {
        let children: Vec<String> = g.children(v).iter().map(|s| s.to_string()).collect();
        for child in children {
            dfs(g, ids, &child);
        }

        let Some((min_rank, max_rank)) = g
            .node(v)
            .and_then(|node| Some((node.min_rank?, node.max_rank?)))
        else {
            return;
        };

        let slots = max_rank.max(0) as usize + 1;
        if let Some(node) = g.node_mut(v) {
            node.border_left = vec![None; slots];
            node.border_right = vec![None; slots];
        }

        let mut prev_left: Option<String> = None;
        let mut prev_right: Option<String> = None;
        for rank in min_rank..=max_rank {
            let left = border_node(g, ids, v, rank, BorderSide::Left);
            if let Some(prev) = prev_left.replace(left.clone()) {
                chain(g, prev, left);
            }
            let right = border_node(g, ids, v, rank, BorderSide::Right);
            if let Some(prev) = prev_right.replace(right.clone()) {
                chain(g, prev, right);
            }
        }
    }

    let roots: Vec<String> = g.root_children().iter().map(|s| s.to_string()).collect();
    for v in roots {
        dfs(g, ids, &v);
    }
}

fn border_node(
    g: &mut LayoutGraph,
    ids: &mut IdMint,
    parent: &str,
    rank: i32,
    side: BorderSide,
) -> String {
    let prefix = match side {
        BorderSide::Left => "_bl",
        BorderSide::Right => "_br",
    };
    let id = ids.fresh(g, prefix);
    g.set_node(
        id.clone(),
        NodeLabel {
            rank: Some(rank),
            dummy: Some(DummyKind::Border),
            border_type: Some(side),
            ..Default::default()
        },
    );

    if let Some(node) = g.node_mut(parent) {
        let slot = rank.max(0) as usize;
        match side {
            BorderSide::Left => node.border_left[slot] = Some(id.clone()),
            BorderSide::Right => node.border_right[slot] = Some(id.clone()),
        }
    }
    g.set_parent(id.clone(), parent.to_string());
    id
}

fn chain(g: &mut LayoutGraph, prev: String, next: String) {
    g.set_edge_with_label(
        prev,
        next,
        EdgeLabel {
            weight: 1.0,
            ..Default::default()
        },
    );
}

/// Reads each compound rectangle off its border nodes, then deletes every
/// border dummy (the nesting pass's top/bottom nodes included).
pub fn remove_border_nodes(g: &mut LayoutGraph) {
    for v in g.node_ids() {
        if g.children(&v).is_empty() {
            continue;
        }
        let Some(node) = g.node(&v) else {
            continue;
        };
        let (Some(top), Some(bottom)) = (node.border_top.clone(), node.border_bottom.clone())
        else {
            continue;
        };
        let left = node.border_left.iter().flatten().next_back().cloned();
        let right = node.border_right.iter().flatten().next_back().cloned();
        let (Some(left), Some(right)) = (left, right) else {
            continue;
        };

        let corner = |id: &str| -> Option<(f64, f64)> {
            let n = g.node(id)?;
            Some((n.x?, n.y?))
        };
        let (Some((_, top_y)), Some((_, bottom_y)), Some((left_x, _)), Some((right_x, _))) = (
            corner(&top),
            corner(&bottom),
            corner(&left),
            corner(&right),
        ) else {
            continue;
        };

        let width = (right_x - left_x).abs();
        let height = (bottom_y - top_y).abs();
        if let Some(node) = g.node_mut(&v) {
            node.width = width;
            node.height = height;
            node.x = Some(left_x + width / 2.0);
            node.y = Some(top_y + height / 2.0);
        }
    }

    for v in g.node_ids() {
        if g.node(&v).map(|n| n.is_border_dummy()).unwrap_or(false) {
            g.remove_node(&v);
        }
    }
}
