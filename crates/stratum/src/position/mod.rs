//! Coordinate assignment.
//!
//! Runs in top-to-bottom coordinates only; the coordinate-system stage maps
//! other rank directions onto this one. The y of a rank is the running sum
//! of rank heights plus `ranksep`; x comes from Brandes–Köpf.

pub mod bk;

use crate::util;
use crate::LayoutGraph;

pub fn position(g: &mut LayoutGraph) {
    position_y(g);
    for (v, x) in bk::position_x(g) {
        if let Some(node) = g.node_mut(&v) {
            node.x = Some(x);
        }
    }
}

fn position_y(g: &mut LayoutGraph) {
    let layering = util::build_layer_matrix(g);
    let rank_sep = g.graph().ranksep;

    let mut prev_y = 0.0;
    for layer in layering {
        let max_height = layer
            .iter()
            .filter_map(|v| g.node(v).map(|n| n.height))
            .fold(0.0f64, f64::max);
        for v in &layer {
            if let Some(node) = g.node_mut(v) {
                node.y = Some(prev_y + max_height / 2.0);
            }
        }
        prev_y += max_height + rank_sep;
    }
}
