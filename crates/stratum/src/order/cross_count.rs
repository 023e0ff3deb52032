//! Exact weighted crossing count.
//!
//! Classic accumulator-tree counting (Barth, Jünger & Mutzel): walk the
//! edges between two ranks in north order, insert each at its south slot in
//! a balanced binary tree, and sum the weight already inserted to the slot's
//! right; that sum is the number of (weighted) pairs crossing it.

use super::EdgeWeight;
use crate::graphlib::Graph;
use rustc_hash::FxHashMap;

pub fn cross_count<N, E, G>(g: &Graph<N, E, G>, layering: &[Vec<String>]) -> f64
where
    N: Default,
    E: Default + EdgeWeight,
    G: Default,
{
    let mut total = 0.0;
    for pair in layering.windows(2) {
        total += two_layer_cross_count(g, &pair[0], &pair[1]);
    }
    total
}

fn two_layer_cross_count<N, E, G>(g: &Graph<N, E, G>, north: &[String], south: &[String]) -> f64
where
    N: Default,
    E: Default + EdgeWeight,
    G: Default,
{
    if south.is_empty() {
        return 0.0;
    }

    let south_pos: FxHashMap<&str, usize> = south
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();

    // (south position, weight) for every edge, grouped by north node in
    // order, each group sorted by south position.
    let mut entries: Vec<(usize, f64)> = Vec::new();
    for v in north {
        let mut group: Vec<(usize, f64)> = g
            .out_edges(v, None)
            .into_iter()
            .filter_map(|key| {
                let pos = *south_pos.get(key.w.as_str())?;
                let weight = g.edge_by_key(&key).map(|e| e.weight()).unwrap_or(0.0);
                Some((pos, weight))
            })
            .collect();
        group.sort_by_key(|&(pos, _)| pos);
        entries.extend(group);
    }

    let mut leaf_count = 1usize;
    while leaf_count < south.len() {
        leaf_count <<= 1;
    }
    let first_leaf = leaf_count - 1;
    let mut tree = vec![0.0f64; 2 * leaf_count - 1];

    let mut crossings = 0.0;
    for (pos, weight) in entries {
        let mut index = pos + first_leaf;
        tree[index] += weight;
        let mut right_sum = 0.0;
        while index > 0 {
            if index % 2 == 1 {
                right_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += weight;
        }
        crossings += weight * right_sum;
    }
    crossings
}
