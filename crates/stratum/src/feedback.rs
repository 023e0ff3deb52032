//! Greedy feedback arc set selection (Eades, Lin & Smyth).
//!
//! Nodes live in buckets keyed by weighted out-degree minus in-degree. Pure
//! sinks and pure sources occupy sentinel buckets at the two ends and are
//! drained eagerly; when only interior nodes remain, the node with the
//! largest out/in imbalance is removed and its remaining incoming edges are
//! recorded as feedback arcs.

use crate::graphlib::{EdgeKey, Graph};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Feedback arcs of `g`, treating every edge as weight 1.
pub fn greedy_feedback_arcs<N, E, G>(g: &Graph<N, E, G>) -> Vec<EdgeKey>
where
    N: Default,
    E: Default,
    G: Default,
{
    greedy_feedback_arcs_with(g, |_| 1)
}

/// Feedback arcs of `g` with per-edge weights. Multi-edges are aggregated
/// before selection and expanded again in the result.
pub fn greedy_feedback_arcs_with<N, E, G>(
    g: &Graph<N, E, G>,
    weight_fn: impl Fn(&E) -> i64,
) -> Vec<EdgeKey>
where
    N: Default,
    E: Default,
    G: Default,
{
    if g.node_count() <= 1 {
        return Vec::new();
    }

    let state = State::build(g, weight_fn);
    let ids = g.node_ids();

    let mut arcs: Vec<EdgeKey> = Vec::new();
    for (v, w) in state.run() {
        arcs.extend(g.out_edges(&ids[v], Some(&ids[w])));
    }
    arcs
}

struct AggEdge {
    v: usize,
    w: usize,
    weight: i64,
}

struct State {
    edges: Vec<AggEdge>,
    out_adj: Vec<Vec<usize>>,
    in_adj: Vec<Vec<usize>>,
    out_weight: Vec<i64>,
    in_weight: Vec<i64>,
    alive: Vec<bool>,
    // `bucket_of` is authoritative; queue entries whose bucket no longer
    // matches are stale and skipped on pop.
    buckets: Vec<VecDeque<usize>>,
    bucket_of: Vec<usize>,
    zero_index: i64,
}

impl State {
    fn build<N, E, G>(g: &Graph<N, E, G>, weight_fn: impl Fn(&E) -> i64) -> Self
    where
        N: Default,
        E: Default,
        G: Default,
    {
        let ids = g.node_ids();
        let index: FxHashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let n = ids.len();

        // Aggregate multi-edges, keeping first-occurrence order: the queue
        // discipline below is order-sensitive.
        let mut edges: Vec<AggEdge> = Vec::new();
        let mut slot: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        let mut out_weight = vec![0i64; n];
        let mut in_weight = vec![0i64; n];
        let (mut max_out, mut max_in) = (0i64, 0i64);

        for key in g.edges() {
            let (v, w) = (index[key.v.as_str()], index[key.w.as_str()]);
            let weight = g.edge_by_key(key).map(&weight_fn).unwrap_or(1);
            match slot.get(&(v, w)) {
                Some(&i) => edges[i].weight += weight,
                None => {
                    slot.insert((v, w), edges.len());
                    edges.push(AggEdge { v, w, weight });
                }
            }
            out_weight[v] += weight;
            max_out = max_out.max(out_weight[v]);
            in_weight[w] += weight;
            max_in = max_in.max(in_weight[w]);
        }

        let mut out_adj = vec![Vec::new(); n];
        let mut in_adj = vec![Vec::new(); n];
        for (i, e) in edges.iter().enumerate() {
            out_adj[e.v].push(i);
            in_adj[e.w].push(i);
        }

        let mut state = Self {
            edges,
            out_adj,
            in_adj,
            out_weight,
            in_weight,
            alive: vec![true; n],
            buckets: vec![VecDeque::new(); (max_out + max_in + 3).max(3) as usize],
            bucket_of: vec![0; n],
            zero_index: max_in + 1,
        };
        for v in 0..n {
            state.enqueue(v);
        }
        state
    }

    fn bucket_for(&self, v: usize) -> usize {
        if self.out_weight[v] == 0 {
            0
        } else if self.in_weight[v] == 0 {
            self.buckets.len() - 1
        } else {
            let raw = self.out_weight[v] - self.in_weight[v] + self.zero_index;
            raw.clamp(0, self.buckets.len() as i64 - 1) as usize
        }
    }

    fn enqueue(&mut self, v: usize) {
        let b = self.bucket_for(v);
        self.bucket_of[v] = b;
        self.buckets[b].push_front(v);
    }

    fn pop(&mut self, b: usize) -> Option<usize> {
        while let Some(v) = self.buckets[b].pop_back() {
            if self.alive[v] && self.bucket_of[v] == b {
                return Some(v);
            }
        }
        None
    }

    fn remove(&mut self, v: usize, collect: bool, arcs: &mut Vec<(usize, usize)>) {
        self.alive[v] = false;

        let incoming = std::mem::take(&mut self.in_adj[v]);
        for &i in &incoming {
            let (u, weight) = (self.edges[i].v, self.edges[i].weight);
            if !self.alive[u] {
                continue;
            }
            if collect {
                arcs.push((u, v));
            }
            self.out_weight[u] -= weight;
            self.enqueue(u);
        }
        self.in_adj[v] = incoming;

        let outgoing = std::mem::take(&mut self.out_adj[v]);
        for &i in &outgoing {
            let (w, weight) = (self.edges[i].w, self.edges[i].weight);
            if !self.alive[w] {
                continue;
            }
            self.in_weight[w] -= weight;
            self.enqueue(w);
        }
        self.out_adj[v] = outgoing;
    }

    fn run(mut self) -> Vec<(usize, usize)> {
        let last = self.buckets.len() - 1;
        let mut arcs: Vec<(usize, usize)> = Vec::new();
        let mut remaining = self.alive.len();

        while remaining > 0 {
            while let Some(v) = self.pop(0) {
                self.remove(v, false, &mut arcs);
                remaining -= 1;
            }
            while let Some(v) = self.pop(last) {
                self.remove(v, false, &mut arcs);
                remaining -= 1;
            }
            if remaining == 0 {
                break;
            }

            let mut interior = None;
            for b in (1..last).rev() {
                if let Some(v) = self.pop(b) {
                    interior = Some(v);
                    break;
                }
            }
            let Some(v) = interior else {
                // Every remaining node became a sink or source; loop again.
                continue;
            };
            self.remove(v, true, &mut arcs);
            remaining -= 1;
        }

        arcs
    }
}
