//! Small traversal helpers shared by the layout phases.

use crate::Graph;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Depth-first preorder over successors, starting from `roots` in order.
pub fn preorder<N, E, G>(g: &Graph<N, E, G>, roots: &[&str]) -> Vec<String>
where
    N: Default,
    E: Default,
    G: Default,
{
    walk(g, roots, true)
}

/// Depth-first postorder over successors, starting from `roots` in order.
pub fn postorder<N, E, G>(g: &Graph<N, E, G>, roots: &[&str]) -> Vec<String>
where
    N: Default,
    E: Default,
    G: Default,
{
    walk(g, roots, false)
}

fn walk<N, E, G>(g: &Graph<N, E, G>, roots: &[&str], pre: bool) -> Vec<String>
where
    N: Default,
    E: Default,
    G: Default,
{
    fn dfs<N, E, G>(
        g: &Graph<N, E, G>,
        v: &str,
        pre: bool,
        seen: &mut FxHashSet<String>,
        out: &mut Vec<String>,
    ) where
        N: Default,
        E: Default,
        G: Default,
    {
        if !seen.insert(v.to_string()) {
            return;
        }
        if pre {
            out.push(v.to_string());
        }
        for w in g.successors(v) {
            dfs(g, w, pre, seen, out);
        }
        if !pre {
            out.push(v.to_string());
        }
    }

    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for root in roots {
        dfs(g, root, pre, &mut seen, &mut out);
    }
    out
}

/// Weakly connected components, each in discovery order.
pub fn components<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
where
    N: Default,
    E: Default,
    G: Default,
{
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut out: Vec<Vec<String>> = Vec::new();

    for start in g.node_ids() {
        if !seen.insert(start.clone()) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue: VecDeque<String> = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            for next in g.successors(&v).into_iter().chain(g.predecessors(&v)) {
                if seen.insert(next.to_string()) {
                    queue.push_back(next.to_string());
                }
            }
            component.push(v);
        }
        out.push(component);
    }
    out
}

/// Cycles in a directed graph, reported as strongly connected components of
/// size > 1 plus self-loops. Tarjan's algorithm; deterministic output order.
pub fn find_cycles<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
where
    N: Default,
    E: Default,
    G: Default,
{
    struct State<'a, N: Default, E: Default, G: Default> {
        g: &'a Graph<N, E, G>,
        counter: usize,
        index: FxHashMap<String, usize>,
        lowlink: FxHashMap<String, usize>,
        stack: Vec<String>,
        on_stack: FxHashSet<String>,
        sccs: Vec<Vec<String>>,
    }

    impl<N: Default, E: Default, G: Default> State<'_, N, E, G> {
        fn connect(&mut self, v: &str) {
            self.index.insert(v.to_string(), self.counter);
            self.lowlink.insert(v.to_string(), self.counter);
            self.counter += 1;
            self.stack.push(v.to_string());
            self.on_stack.insert(v.to_string());

            let succs: Vec<String> = self.g.successors(v).iter().map(|s| s.to_string()).collect();
            for w in &succs {
                if !self.index.contains_key(w) {
                    self.connect(w);
                    let low = self.lowlink[v].min(self.lowlink[w]);
                    self.lowlink.insert(v.to_string(), low);
                } else if self.on_stack.contains(w) {
                    let low = self.lowlink[v].min(self.index[w]);
                    self.lowlink.insert(v.to_string(), low);
                }
            }

            if self.lowlink[v] == self.index[v] {
                let mut scc = Vec::new();
                loop {
                    let w = self.stack.pop().expect("tarjan stack underflow");
                    self.on_stack.remove(&w);
                    let done = w == v;
                    scc.push(w);
                    if done {
                        break;
                    }
                }
                self.sccs.push(scc);
            }
        }
    }

    let mut state = State {
        g,
        counter: 0,
        index: FxHashMap::default(),
        lowlink: FxHashMap::default(),
        stack: Vec::new(),
        on_stack: FxHashSet::default(),
        sccs: Vec::new(),
    };

    let ids = g.node_ids();
    for v in &ids {
        if !state.index.contains_key(v) {
            state.connect(v);
        }
    }

    let position: FxHashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();

    let mut cycles: Vec<Vec<String>> = Vec::new();
    for mut scc in state.sccs {
        if scc.len() > 1 {
            scc.sort_by_key(|v| position.get(v.as_str()).copied().unwrap_or(usize::MAX));
            cycles.push(scc);
        } else if g.has_edge(&scc[0], &scc[0], None) || !g.out_edges(&scc[0], Some(&scc[0])).is_empty()
        {
            cycles.push(scc);
        }
    }
    cycles.sort_by(|a, b| a.first().cmp(&b.first()));
    cycles
}
