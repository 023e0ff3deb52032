//! Barycenter sorting with conflict resolution.
//!
//! Movable nodes sort by the weighted mean position of their fixed-rank
//! neighbors. Equal barycenters fall back to the Gansner weighted median of
//! the same neighbors, then to the previous index, so every sort is
//! deterministic. Constraint-graph conflicts are resolved by merging the
//! constrained entries into one block before sorting.

use super::layer_graph::LayerGraph;
use crate::graphlib::Graph;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct BarycenterEntry {
    pub v: String,
    pub barycenter: Option<f64>,
    pub weight: Option<f64>,
    pub median: Option<f64>,
}

/// Barycenter and median of each movable node's in-neighbors in `lg`.
/// Nodes without neighbors get `None` and keep their relative position.
pub fn barycenter(lg: &LayerGraph, movable: &[String]) -> Vec<BarycenterEntry> {
    movable
        .iter()
        .map(|v| {
            let in_edges = lg.in_edges(v, None);
            if in_edges.is_empty() {
                return BarycenterEntry {
                    v: v.clone(),
                    barycenter: None,
                    weight: None,
                    median: None,
                };
            }

            let mut sum = 0.0;
            let mut weight = 0.0;
            let mut positions: Vec<f64> = Vec::with_capacity(in_edges.len());
            for key in in_edges {
                let edge_weight = lg.edge_by_key(&key).map(|e| e.weight).unwrap_or(0.0);
                let pos = lg
                    .node(&key.v)
                    .and_then(|n| n.order)
                    .map(|o| o as f64)
                    .unwrap_or(0.0);
                sum += edge_weight * pos;
                weight += edge_weight;
                positions.push(pos);
            }
            positions.sort_by(f64::total_cmp);

            BarycenterEntry {
                v: v.clone(),
                barycenter: Some(sum / weight),
                weight: Some(weight),
                median: Some(median_value(&positions)),
            }
        })
        .collect()
}

/// Gansner's weighted median of sorted neighbor positions. For even counts
/// beyond two, the two middle positions are blended, biased by how far each
/// sits from its outer extreme.
pub fn median_value(positions: &[f64]) -> f64 {
    let n = positions.len();
    let m = n / 2;
    if n == 0 {
        return -1.0;
    }
    if n % 2 == 1 {
        return positions[m];
    }
    if n == 2 {
        return (positions[0] + positions[1]) / 2.0;
    }
    let left = positions[m - 1] - positions[0];
    let right = positions[n - 1] - positions[m];
    if left + right == 0.0 {
        return (positions[m - 1] + positions[m]) / 2.0;
    }
    (positions[m - 1] * right + positions[m] * left) / (left + right)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortEntry {
    pub vs: Vec<String>,
    pub i: usize,
    pub barycenter: Option<f64>,
    pub weight: Option<f64>,
    pub median: Option<f64>,
}

#[derive(Debug, Clone)]
struct ConflictEntry {
    indegree: usize,
    ins: Vec<String>,
    outs: Vec<String>,
    entry: SortEntry,
    merged: bool,
}

/// Collapses entries that the constraint graph orders against their
/// barycenters into single blocks, so the subsequent sort cannot violate a
/// constraint.
pub fn resolve_conflicts<CN, CE, CG>(
    entries: &[BarycenterEntry],
    cg: &Graph<CN, CE, CG>,
) -> Vec<SortEntry>
where
    CN: Default,
    CE: Default,
    CG: Default,
{
    let mut blocks: FxHashMap<String, ConflictEntry> = FxHashMap::default();
    for (i, entry) in entries.iter().enumerate() {
        blocks.insert(
            entry.v.clone(),
            ConflictEntry {
                indegree: 0,
                ins: Vec::new(),
                outs: Vec::new(),
                entry: SortEntry {
                    vs: vec![entry.v.clone()],
                    i,
                    barycenter: entry.barycenter,
                    weight: entry.weight,
                    median: entry.median,
                },
                merged: false,
            },
        );
    }

    for key in cg.edges() {
        if !blocks.contains_key(&key.v) || !blocks.contains_key(&key.w) {
            continue;
        }
        blocks
            .get_mut(&key.w)
            .expect("block exists")
            .indegree += 1;
        blocks
            .get_mut(&key.v)
            .expect("block exists")
            .outs
            .push(key.w.clone());
    }

    let mut sources: Vec<String> = blocks
        .iter()
        .filter(|(_, b)| b.indegree == 0)
        .map(|(v, _)| v.clone())
        .collect();

    let mut processed: Vec<String> = Vec::new();
    while let Some(v) = sources.pop() {
        processed.push(v.clone());

        let ins = blocks.get(&v).map(|b| b.ins.clone()).unwrap_or_default();
        for u in ins.into_iter().rev() {
            if blocks.get(&u).map(|b| b.merged).unwrap_or(true) {
                continue;
            }
            let violated = {
                let (u_bc, v_bc) = (
                    blocks[&u].entry.barycenter,
                    blocks[&v].entry.barycenter,
                );
                match (u_bc, v_bc) {
                    (Some(ub), Some(vb)) => ub >= vb,
                    _ => true,
                }
            };
            if violated {
                merge_blocks(&mut blocks, &v, &u);
            }
        }

        let outs = blocks.get(&v).map(|b| b.outs.clone()).unwrap_or_default();
        for w in outs {
            let Some(block) = blocks.get_mut(&w) else {
                continue;
            };
            block.ins.push(v.clone());
            block.indegree -= 1;
            if block.indegree == 0 {
                sources.push(w);
            }
        }
    }

    processed
        .into_iter()
        .filter_map(|v| {
            let block = blocks.remove(&v)?;
            if block.merged {
                return None;
            }
            Some(block.entry)
        })
        .collect()
}

/// Folds `source` into `target`: source's nodes go first, barycenters,
/// medians, and weights combine weighted, and the smaller index wins.
fn merge_blocks(blocks: &mut FxHashMap<String, ConflictEntry>, target: &str, source: &str) {
    let source_entry = {
        let Some(block) = blocks.get_mut(source) else {
            return;
        };
        block.merged = true;
        block.entry.clone()
    };
    let Some(target_block) = blocks.get_mut(target) else {
        return;
    };
    let t = &mut target_block.entry;

    let mut sum = 0.0;
    let mut weight = 0.0;
    let mut median_sum = 0.0;
    for part in [&source_entry, &*t] {
        if let (Some(bc), Some(w)) = (part.barycenter, part.weight) {
            if w != 0.0 {
                sum += bc * w;
                median_sum += part.median.unwrap_or(bc) * w;
                weight += w;
            }
        }
    }

    let mut vs = source_entry.vs;
    vs.extend(t.vs.drain(..));
    t.vs = vs;
    if weight != 0.0 {
        t.barycenter = Some(sum / weight);
        t.median = Some(median_sum / weight);
        t.weight = Some(weight);
    }
    t.i = t.i.min(source_entry.i);
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortResult {
    pub vs: Vec<String>,
    pub barycenter: Option<f64>,
    pub weight: Option<f64>,
}

/// Orders sortable entries by barycenter (median, then previous index, break
/// ties), re-interleaving entries without a barycenter at their previous
/// positions.
pub fn sort(entries: &[SortEntry], bias_right: bool) -> SortResult {
    let mut sortable: Vec<&SortEntry> = Vec::new();
    let mut fixed: Vec<&SortEntry> = Vec::new();
    for entry in entries {
        if entry.barycenter.is_some() {
            sortable.push(entry);
        } else {
            fixed.push(entry);
        }
    }

    // Consumed from the back as index slots come up.
    fixed.sort_by(|a, b| b.i.cmp(&a.i));

    sortable.sort_by(|a, b| {
        let bc = a
            .barycenter
            .unwrap_or(0.0)
            .total_cmp(&b.barycenter.unwrap_or(0.0));
        if bc != std::cmp::Ordering::Equal {
            return bc;
        }
        let med = a
            .median
            .unwrap_or(0.0)
            .total_cmp(&b.median.unwrap_or(0.0));
        if med != std::cmp::Ordering::Equal {
            return med;
        }
        if bias_right {
            b.i.cmp(&a.i)
        } else {
            a.i.cmp(&b.i)
        }
    });

    let mut vs: Vec<String> = Vec::new();
    let mut sum = 0.0;
    let mut weight = 0.0;
    let mut slot = 0usize;

    let mut take_fixed = |vs: &mut Vec<String>, fixed: &mut Vec<&SortEntry>, mut slot: usize| {
        while fixed.last().map(|e| e.i <= slot).unwrap_or(false) {
            let entry = fixed.pop().expect("checked non-empty");
            vs.extend(entry.vs.iter().cloned());
            slot += 1;
        }
        slot
    };

    slot = take_fixed(&mut vs, &mut fixed, slot);
    for entry in sortable {
        slot += entry.vs.len();
        vs.extend(entry.vs.iter().cloned());
        if let (Some(bc), Some(w)) = (entry.barycenter, entry.weight) {
            sum += bc * w;
            weight += w;
        }
        slot = take_fixed(&mut vs, &mut fixed, slot);
    }
    // Anything still fixed sorts after every movable entry.
    for entry in fixed.into_iter().rev() {
        vs.extend(entry.vs.iter().cloned());
    }

    if weight != 0.0 {
        SortResult {
            vs,
            barycenter: Some(sum / weight),
            weight: Some(weight),
        }
    } else {
        SortResult {
            vs,
            barycenter: None,
            weight: None,
        }
    }
}

/// Sorts the children of `v` in the layer graph, recursing into compound
/// children and keeping each subgraph's border dummies at its flanks.
pub fn sort_subgraph<CN, CE, CG>(
    lg: &LayerGraph,
    v: &str,
    cg: &Graph<CN, CE, CG>,
    bias_right: bool,
) -> SortResult
where
    CN: Default,
    CE: Default,
    CG: Default,
{
    let mut movable: Vec<String> = lg.children(v).iter().map(|s| s.to_string()).collect();

    let (border_left, border_right) = lg
        .node(v)
        .map(|node| {
            (
                node.border_left.first().cloned().flatten(),
                node.border_right.first().cloned().flatten(),
            )
        })
        .unwrap_or((None, None));
    if let (Some(bl), Some(br)) = (&border_left, &border_right) {
        movable.retain(|w| w != bl && w != br);
    }

    let mut entries = barycenter(lg, &movable);

    let mut subgraphs: FxHashMap<String, SortResult> = FxHashMap::default();
    for entry in &mut entries {
        if lg.children(&entry.v).is_empty() {
            continue;
        }
        let nested = sort_subgraph(lg, &entry.v, cg, bias_right);
        if let Some(nested_bc) = nested.barycenter {
            // Pull the parent towards its sorted contents.
            let nested_w = nested.weight.unwrap_or(0.0);
            match (entry.barycenter, entry.weight) {
                (Some(bc), Some(w)) => {
                    entry.barycenter = Some((bc * w + nested_bc * nested_w) / (w + nested_w));
                    entry.weight = Some(w + nested_w);
                }
                _ => {
                    entry.barycenter = Some(nested_bc);
                    entry.weight = Some(nested_w);
                }
            }
        }
        subgraphs.insert(entry.v.clone(), nested);
    }

    let mut resolved = resolve_conflicts(&entries, cg);
    for entry in &mut resolved {
        let mut expanded: Vec<String> = Vec::with_capacity(entry.vs.len());
        for v in &entry.vs {
            match subgraphs.get(v) {
                Some(nested) => expanded.extend(nested.vs.iter().cloned()),
                None => expanded.push(v.clone()),
            }
        }
        entry.vs = expanded;
    }

    let mut result = sort(&resolved, bias_right);

    if let (Some(bl), Some(br)) = (border_left, border_right) {
        let mut vs = Vec::with_capacity(result.vs.len() + 2);
        vs.push(bl.clone());
        vs.append(&mut result.vs);
        vs.push(br.clone());
        result.vs = vs;

        // Border dummies have fixed-rank predecessors of their own; fold
        // them into the subgraph's barycenter so the parent sorts by its
        // full extent.
        let bl_pred = lg.predecessors(&bl).first().map(|s| s.to_string());
        let br_pred = lg.predecessors(&br).first().map(|s| s.to_string());
        if let (Some(bl_pred), Some(br_pred)) = (bl_pred, br_pred) {
            let order_of = |id: &str| {
                lg.node(id)
                    .and_then(|n| n.order)
                    .map(|o| o as f64)
                    .unwrap_or(0.0)
            };
            let bc = result.barycenter.unwrap_or(0.0);
            let w = result.weight.unwrap_or(0.0);
            result.barycenter =
                Some((bc * w + order_of(&bl_pred) + order_of(&br_pred)) / (w + 2.0));
            result.weight = Some(w + 2.0);
        }
    }

    result
}
