//! Rank-direction coordinate transforms.
//!
//! Positioning always thinks in top-to-bottom terms. For horizontal rank
//! directions, node and label boxes are transposed before positioning; the
//! undo step then mirrors the y axis for `bt`/`rl` and swaps x with y for
//! `lr`/`rl`, restoring the requested orientation.

use crate::model::RankDir;
use crate::LayoutGraph;

pub fn adjust(g: &mut LayoutGraph) {
    if g.graph().rankdir.is_horizontal() {
        swap_extents(g);
    }
}

pub fn undo(g: &mut LayoutGraph) {
    let rankdir = g.graph().rankdir;
    if matches!(rankdir, RankDir::Bt | RankDir::Rl) {
        flip_y(g);
    }
    if rankdir.is_horizontal() {
        transpose_xy(g);
        swap_extents(g);
    }
}

fn swap_extents(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_, node| {
        std::mem::swap(&mut node.width, &mut node.height);
        // Parked self loops carry label boxes of their own.
        for sl in &mut node.self_loops {
            std::mem::swap(&mut sl.label.width, &mut sl.label.height);
        }
    });
    g.for_each_edge_mut(|_, edge| {
        std::mem::swap(&mut edge.width, &mut edge.height);
    });
}

fn flip_y(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_, node| {
        if let Some(y) = node.y {
            node.y = Some(-y);
        }
    });
    g.for_each_edge_mut(|_, edge| {
        for p in &mut edge.points {
            p.y = -p.y;
        }
        if let Some(y) = edge.y {
            edge.y = Some(-y);
        }
    });
}

fn transpose_xy(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_, node| {
        std::mem::swap(&mut node.x, &mut node.y);
    });
    g.for_each_edge_mut(|_, edge| {
        for p in &mut edge.points {
            std::mem::swap(&mut p.x, &mut p.y);
        }
        std::mem::swap(&mut edge.x, &mut edge.y);
    });
}
