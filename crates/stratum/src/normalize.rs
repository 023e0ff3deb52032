//! Long-edge normalization.
//!
//! After this pass every edge spans exactly one rank: an edge from rank `r`
//! to rank `r + k` becomes a chain of `k - 1` synthetic nodes. The chain
//! node sitting on the edge's `label_rank` takes on the label's box so
//! ordering and positioning reserve room for it. `undo` folds each chain
//! back into the original edge's polyline.

use crate::model::{DummyKind, EdgeLabel, NodeLabel, Point};
use crate::util::IdMint;
use crate::LayoutGraph;

pub fn run(g: &mut LayoutGraph, ids: &mut IdMint) {
    g.graph_mut().dummy_chains.clear();
    for key in g.edge_keys() {
        let v_rank = g.node(&key.v).and_then(|n| n.rank).unwrap_or(0);
        let w_rank = g.node(&key.w).and_then(|n| n.rank).unwrap_or(0);
        if w_rank == v_rank + 1 {
            continue;
        }
        let Some(mut label) = g.edge_by_key(&key).cloned() else {
            continue;
        };
        g.remove_edge_key(&key);
        label.points.clear();

        let label_rank = label.label_rank;
        let segment_weight = label.weight;
        let mut prev = key.v.clone();
        let mut first = true;

        for rank in (v_rank + 1)..w_rank {
            let mut node = NodeLabel {
                rank: Some(rank),
                dummy: Some(DummyKind::Edge),
                edge_label: Some(label.clone()),
                edge_obj: Some(key.clone()),
                ..Default::default()
            };
            if label_rank == Some(rank) {
                node.width = label.width;
                node.height = label.height;
                node.dummy = Some(DummyKind::EdgeLabel);
                node.labelpos = Some(label.labelpos);
            }

            let dummy = ids.fresh(g, "_d");
            g.set_node(dummy.clone(), node);
            if first {
                g.graph_mut().dummy_chains.push(dummy.clone());
                first = false;
            }

            g.set_edge_named(
                prev,
                dummy.clone(),
                key.name.clone(),
                Some(EdgeLabel {
                    weight: segment_weight,
                    ..Default::default()
                }),
            );
            prev = dummy;
        }

        g.set_edge_named(
            prev,
            key.w.clone(),
            key.name.clone(),
            Some(EdgeLabel {
                weight: segment_weight,
                ..Default::default()
            }),
        );
    }
}

pub fn undo(g: &mut LayoutGraph) {
    let chains = std::mem::take(&mut g.graph_mut().dummy_chains);
    for start in chains {
        let Some(first) = g.node(&start) else {
            continue;
        };
        let (Some(mut label), Some(key)) = (first.edge_label.clone(), first.edge_obj.clone())
        else {
            continue;
        };

        let mut v = start;
        loop {
            let Some(node) = g.node(&v) else {
                break;
            };
            if node.dummy.is_none() {
                break;
            }

            if let (Some(x), Some(y)) = (node.x, node.y) {
                label.points.push(Point::new(x, y));
                if node.dummy == Some(DummyKind::EdgeLabel) {
                    label.x = Some(x);
                    label.y = Some(y);
                    label.width = node.width;
                    label.height = node.height;
                }
            }

            let next = g.successors(&v).first().map(|s| s.to_string());
            g.remove_node(&v);
            match next {
                Some(next) => v = next,
                None => break,
            }
        }

        g.set_edge_key(key, label);
    }
}
