//! Self-loop handling.
//!
//! A loop cannot constrain ranking, so loops leave the graph before
//! acyclicization and come back in two steps: after ordering, a dummy at the
//! endpoint's rank reserves horizontal room immediately to its right; after
//! positioning, the dummy turns into the loop's five-point curve out the
//! right side of the node.

use crate::model::{DummyKind, NodeLabel, Point, SelfLoop};
use crate::util::{self, IdMint};
use crate::LayoutGraph;

pub fn remove_self_loops(g: &mut LayoutGraph) {
    for key in g.edge_keys() {
        if !key.is_loop() {
            continue;
        }
        let Some(label) = g.edge_by_key(&key).cloned() else {
            continue;
        };
        let v = key.v.clone();
        g.remove_edge_key(&key);
        if let Some(node) = g.node_mut(&v) {
            node.self_loops.push(SelfLoop { key, label });
        }
    }
}

/// Weaves a dummy into the ordering right after each loop endpoint, shifting
/// the rest of the rank over.
pub fn insert_self_loop_dummies(g: &mut LayoutGraph, ids: &mut IdMint) {
    for layer in util::build_layer_matrix(g) {
        let mut shift = 0usize;
        for (i, v) in layer.iter().enumerate() {
            let Some(node) = g.node_mut(v) else {
                continue;
            };
            node.order = Some(i + shift);
            let Some(rank) = node.rank else {
                continue;
            };
            let loops = std::mem::take(&mut node.self_loops);

            for sl in loops {
                shift += 1;
                let id = ids.fresh(g, "_se");
                g.set_node(
                    id,
                    NodeLabel {
                        width: sl.label.width,
                        height: sl.label.height,
                        rank: Some(rank),
                        order: Some(i + shift),
                        dummy: Some(DummyKind::SelfLoop),
                        edge_label: Some(sl.label),
                        edge_obj: Some(sl.key),
                        ..Default::default()
                    },
                );
            }
        }
    }
}

/// Turns each positioned dummy into the loop's polyline and restores the
/// edge. The curve leaves the node's right face, bulges out to the dummy's
/// x, and re-enters the right face.
pub fn position_self_loops(g: &mut LayoutGraph) {
    for id in g.node_ids() {
        let Some(node) = g.node(&id) else {
            continue;
        };
        if node.dummy != Some(DummyKind::SelfLoop) {
            continue;
        }
        let node = node.clone();
        let (Some(x), Some(y)) = (node.x, node.y) else {
            continue;
        };
        let (Some(key), Some(mut label)) = (node.edge_obj, node.edge_label) else {
            continue;
        };
        let Some(endpoint) = g.node(&key.v) else {
            continue;
        };
        let (Some(vx), Some(vy)) = (endpoint.x, endpoint.y) else {
            continue;
        };

        let right = vx + endpoint.width / 2.0;
        let half_height = endpoint.height / 2.0;
        let reach = x - right;

        label.points = vec![
            Point::new(right + 2.0 * reach / 3.0, vy - half_height),
            Point::new(right + 5.0 * reach / 6.0, vy - half_height),
            Point::new(right + reach, vy),
            Point::new(right + 5.0 * reach / 6.0, vy + half_height),
            Point::new(right + 2.0 * reach / 3.0, vy + half_height),
        ];
        label.x = Some(x);
        label.y = Some(y);

        g.set_edge_key(key, label);
        g.remove_node(&id);
    }
}
