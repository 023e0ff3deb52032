//! Compound parents for normalization chains.
//!
//! A long edge can tunnel into and out of compound nodes. Each chain node is
//! assigned the compound parent whose rank span covers its rank, found by
//! walking the parent path from the edge's tail up to the endpoints' lowest
//! common ancestor and back down to the head.

use crate::LayoutGraph;
use rustc_hash::FxHashMap;

struct Span {
    low: usize,
    lim: usize,
}

pub fn run(g: &mut LayoutGraph) {
    let spans = postorder_spans(g);

    let chains = g.graph().dummy_chains.clone();
    for start in chains {
        let Some(key) = g.node(&start).and_then(|n| n.edge_obj.clone()) else {
            continue;
        };

        let (path, lca) = find_path(g, &spans, &key.v, &key.w);
        let mut path_idx = 0usize;
        let mut path_v = path.get(path_idx).cloned().unwrap_or(None);
        let mut ascending = true;

        let mut v = start;
        while v != key.w {
            let rank = g.node(&v).and_then(|n| n.rank).unwrap_or(0);

            if ascending {
                // Climb until a parent's span reaches this rank.
                while path_v != lca
                    && path_v
                        .as_deref()
                        .and_then(|p| g.node(p))
                        .and_then(|n| n.max_rank)
                        .unwrap_or(i32::MAX / 2)
                        < rank
                {
                    path_idx += 1;
                    path_v = path.get(path_idx).cloned().unwrap_or(None);
                }
                if path_v == lca {
                    ascending = false;
                }
            }
            if !ascending {
                // Descend as long as the next parent already covers the rank.
                while path_idx + 1 < path.len()
                    && path[path_idx + 1]
                        .as_deref()
                        .and_then(|p| g.node(p))
                        .and_then(|n| n.min_rank)
                        .unwrap_or(i32::MIN / 2)
                        <= rank
                {
                    path_idx += 1;
                }
                path_v = path.get(path_idx).cloned().unwrap_or(None);
            }

            match &path_v {
                Some(parent) => {
                    let parent = parent.clone();
                    g.set_parent(v.clone(), parent);
                }
                None => {
                    g.clear_parent(&v);
                }
            }

            let Some(next) = g.successors(&v).first().map(|s| s.to_string()) else {
                break;
            };
            v = next;
        }
    }
}

/// Parent path from `v` up to the LCA of `v` and `w`, then down to `w`'s
/// parent. `None` entries stand for the implicit root.
fn find_path(
    g: &LayoutGraph,
    spans: &FxHashMap<String, Span>,
    v: &str,
    w: &str,
) -> (Vec<Option<String>>, Option<String>) {
    let (Some(v_span), Some(w_span)) = (spans.get(v), spans.get(w)) else {
        return (vec![None], None);
    };
    let low = v_span.low.min(w_span.low);
    let lim = v_span.lim.max(w_span.lim);

    let mut path: Vec<Option<String>> = Vec::new();
    let mut parent = g.parent(v).map(|s| s.to_string());
    let lca = loop {
        path.push(parent.clone());
        match &parent {
            None => break None,
            Some(p) => {
                let span = &spans[p.as_str()];
                if span.low <= low && lim <= span.lim {
                    break Some(p.clone());
                }
                parent = g.parent(p).map(|s| s.to_string());
            }
        }
    };

    let mut down: Vec<Option<String>> = Vec::new();
    let mut cur = g.parent(w).map(|s| s.to_string());
    while cur != lca {
        let Some(p) = cur else {
            break;
        };
        down.push(Some(p.clone()));
        cur = g.parent(&p).map(|s| s.to_string());
    }
    down.reverse();
    path.extend(down);

    (path, lca)
}

/// Postorder interval numbering of the compound forest; a node's interval
/// contains exactly its descendants'.
fn postorder_spans(g: &LayoutGraph) -> FxHashMap<String, Span> {
    fn dfs(g: &LayoutGraph, v: &str, lim: &mut usize, out: &mut FxHashMap<String, Span>) {
        let low = *lim;
        for child in g.children(v) {
            dfs(g, child, lim, out);
        }
        out.insert(v.to_string(), Span { low, lim: *lim });
        *lim += 1;
    }

    let mut out = FxHashMap::default();
    let mut lim = 0usize;
    for v in g.root_children() {
        dfs(g, v, &mut lim, &mut out);
    }
    out
}
