use rustc_hash::FxBuildHasher;
use std::cell::{Ref, RefCell};

type FxHashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Construction-time switches. They cannot change after the graph exists.
#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    pub directed: bool,
    pub multigraph: bool,
    pub compound: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            directed: true,
            multigraph: false,
            compound: false,
        }
    }
}

/// Identifies one edge: tail `v`, head `w`, plus the optional discriminator
/// that tells parallel edges of a multigraph apart.
///
/// In undirected graphs the endpoints are stored in sorted order, so the key
/// for `(b, a)` and `(a, b)` is the same. Keys hash field-wise (`KeyView`
/// below must stay in sync with the field order here).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: Option<String>,
}

impl EdgeKey {
    pub fn new(v: impl Into<String>, w: impl Into<String>, name: Option<impl Into<String>>) -> Self {
        EdgeKey {
            v: v.into(),
            w: w.into(),
            name: name.map(Into::into),
        }
    }

    /// Whether both endpoints are the same node.
    pub fn is_loop(&self) -> bool {
        self.v == self.w
    }
}

/// Borrowed view of an [`EdgeKey`], so lookups don't have to allocate.
#[derive(Clone, Copy, Hash)]
struct KeyView<'a> {
    v: &'a str,
    w: &'a str,
    name: Option<&'a str>,
}

impl hashbrown::Equivalent<EdgeKey> for KeyView<'_> {
    fn equivalent(&self, key: &EdgeKey) -> bool {
        key.v == self.v && key.w == self.w && key.name.as_deref() == self.name
    }
}

#[derive(Debug, Clone)]
struct NodeSlot<N> {
    id: String,
    label: N,
}

#[derive(Debug, Clone)]
struct EdgeSlot<E> {
    key: EdgeKey,
    label: E,
}

/// Per-node in/out edge indices, rebuilt lazily after structural mutation.
#[derive(Debug, Default)]
struct AdjIndex {
    out: Vec<Vec<usize>>,
    inc: Vec<Vec<usize>>,
}

/// An insertion-ordered directed (or undirected) multigraph with typed node,
/// edge, and graph labels.
pub struct Graph<N, E, G>
where
    N: Default,
    E: Default,
    G: Default,
{
    options: GraphOptions,
    label: G,

    nodes: Vec<NodeSlot<N>>,
    node_lookup: FxHashMap<String, usize>,

    edges: Vec<EdgeSlot<E>>,
    edge_lookup: FxHashMap<EdgeKey, usize>,

    parent_of: FxHashMap<String, String>,
    children_of: FxHashMap<String, Vec<String>>,

    // Adjacency queries must be O(degree); scanning `edges` per query is not.
    // The index is dropped on any structural change and rebuilt on demand.
    adj: RefCell<Option<AdjIndex>>,
}

impl<N, E, G> Graph<N, E, G>
where
    N: Default,
    E: Default,
    G: Default,
{
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            label: G::default(),
            nodes: Vec::new(),
            node_lookup: FxHashMap::default(),
            edges: Vec::new(),
            edge_lookup: FxHashMap::default(),
            parent_of: FxHashMap::default(),
            children_of: FxHashMap::default(),
            adj: RefCell::new(None),
        }
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn is_directed(&self) -> bool {
        self.options.directed
    }

    pub fn is_multigraph(&self) -> bool {
        self.options.multigraph
    }

    pub fn is_compound(&self) -> bool {
        self.options.compound
    }

    pub fn set_graph(&mut self, label: G) -> &mut Self {
        self.label = label;
        self
    }

    pub fn graph(&self) -> &G {
        &self.label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.label
    }

    fn touch(&mut self) {
        *self.adj.get_mut() = None;
    }

    fn adj_index(&self) -> Ref<'_, AdjIndex> {
        {
            let mut slot = self.adj.borrow_mut();
            if slot.is_none() {
                let mut index = AdjIndex {
                    out: vec![Vec::new(); self.nodes.len()],
                    inc: vec![Vec::new(); self.nodes.len()],
                };
                for (i, e) in self.edges.iter().enumerate() {
                    if let Some(&v) = self.node_lookup.get(e.key.v.as_str()) {
                        index.out[v].push(i);
                    }
                    if let Some(&w) = self.node_lookup.get(e.key.w.as_str()) {
                        index.inc[w].push(i);
                    }
                }
                *slot = Some(index);
            }
        }
        Ref::map(self.adj.borrow(), |slot| {
            slot.as_ref().expect("adjacency index was just built")
        })
    }

    // ---- nodes ----------------------------------------------------------

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_lookup.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|slot| slot.id.as_str())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|slot| slot.id.clone()).collect()
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_lookup.get(id).map(|&i| &self.nodes[i].label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        let i = *self.node_lookup.get(id)?;
        Some(&mut self.nodes[i].label)
    }

    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&i) = self.node_lookup.get(id.as_str()) {
            self.nodes[i].label = label;
            return self;
        }
        self.touch();
        let i = self.nodes.len();
        self.nodes.push(NodeSlot {
            id: id.clone(),
            label,
        });
        self.node_lookup.insert(id, i);
        self
    }

    /// Adds the node with a default label unless it already exists.
    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if !self.has_node(&id) {
            self.set_node(id, N::default());
        }
        self
    }

    /// Removes a node together with its incident edges and compound links.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(i) = self.node_lookup.remove(id) else {
            return false;
        };
        self.touch();
        self.nodes.remove(i);
        for j in i..self.nodes.len() {
            *self
                .node_lookup
                .get_mut(self.nodes[j].id.as_str())
                .expect("node lookup out of sync") = j;
        }

        if self.edges.iter().any(|e| e.key.v == id || e.key.w == id) {
            self.edges.retain(|e| {
                let keep = e.key.v != id && e.key.w != id;
                if !keep {
                    self.edge_lookup.remove(&e.key);
                }
                keep
            });
            for (j, e) in self.edges.iter().enumerate() {
                *self
                    .edge_lookup
                    .get_mut(&e.key)
                    .expect("edge lookup out of sync") = j;
            }
        }

        if let Some(parent) = self.parent_of.remove(id) {
            if let Some(siblings) = self.children_of.get_mut(&parent) {
                siblings.retain(|c| c != id);
            }
        }
        if let Some(orphans) = self.children_of.remove(id) {
            for child in orphans {
                self.parent_of.remove(&child);
            }
        }
        true
    }

    pub fn for_each_node<F>(&self, mut f: F)
    where
        F: FnMut(&str, &N),
    {
        for slot in &self.nodes {
            f(&slot.id, &slot.label);
        }
    }

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut N),
    {
        for slot in &mut self.nodes {
            f(&slot.id, &mut slot.label);
        }
    }

    // ---- edges ----------------------------------------------------------

    fn key_view<'a>(&self, v: &'a str, w: &'a str, name: Option<&'a str>) -> KeyView<'a> {
        let (v, w) = if self.options.directed || v <= w {
            (v, w)
        } else {
            (w, v)
        };
        KeyView {
            v,
            w,
            name: if self.options.multigraph { name } else { None },
        }
    }

    fn canonical_key(&self, mut key: EdgeKey) -> EdgeKey {
        if !self.options.directed && key.v > key.w {
            std::mem::swap(&mut key.v, &mut key.w);
        }
        if !self.options.multigraph {
            key.name = None;
        }
        key
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().map(|slot| &slot.key)
    }

    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges.iter().map(|slot| slot.key.clone()).collect()
    }

    pub fn has_edge(&self, v: &str, w: &str, name: Option<&str>) -> bool {
        self.edge_lookup.contains_key(&self.key_view(v, w, name))
    }

    pub fn edge(&self, v: &str, w: &str, name: Option<&str>) -> Option<&E> {
        let i = *self.edge_lookup.get(&self.key_view(v, w, name))?;
        Some(&self.edges[i].label)
    }

    pub fn edge_mut(&mut self, v: &str, w: &str, name: Option<&str>) -> Option<&mut E> {
        let i = *self.edge_lookup.get(&self.key_view(v, w, name))?;
        Some(&mut self.edges[i].label)
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&E> {
        self.edge(&key.v, &key.w, key.name.as_deref())
    }

    pub fn edge_mut_by_key(&mut self, key: &EdgeKey) -> Option<&mut E> {
        self.edge_mut(&key.v, &key.w, key.name.as_deref())
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, None)
    }

    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: E,
    ) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, Some(label))
    }

    pub fn set_edge_key(&mut self, key: EdgeKey, label: E) -> &mut Self {
        self.set_edge_named(key.v, key.w, key.name, Some(label))
    }

    /// Inserts or updates an edge. Missing endpoints are created with default
    /// labels. `None` keeps an existing label, or installs a default one.
    pub fn set_edge_named(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
        label: Option<E>,
    ) -> &mut Self {
        let key = self.canonical_key(EdgeKey::new(v, w, name));
        self.ensure_node(key.v.clone());
        self.ensure_node(key.w.clone());

        if let Some(&i) = self.edge_lookup.get(&key) {
            if let Some(label) = label {
                self.edges[i].label = label;
            }
            return self;
        }

        self.touch();
        let i = self.edges.len();
        self.edges.push(EdgeSlot {
            key: key.clone(),
            label: label.unwrap_or_default(),
        });
        self.edge_lookup.insert(key, i);
        self
    }

    /// Connects consecutive ids with default-labelled edges.
    pub fn set_path(&mut self, ids: &[&str]) -> &mut Self {
        for pair in ids.windows(2) {
            self.set_edge(pair[0], pair[1]);
        }
        self
    }

    pub fn remove_edge(&mut self, v: &str, w: &str, name: Option<&str>) -> bool {
        let Some(i) = self.edge_lookup.get(&self.key_view(v, w, name)).copied() else {
            return false;
        };
        self.touch();
        self.edge_lookup.remove(&self.edges[i].key);
        self.edges.remove(i);
        for j in i..self.edges.len() {
            *self
                .edge_lookup
                .get_mut(&self.edges[j].key)
                .expect("edge lookup out of sync") = j;
        }
        true
    }

    pub fn remove_edge_key(&mut self, key: &EdgeKey) -> bool {
        self.remove_edge(&key.v, &key.w, key.name.as_deref())
    }

    pub fn for_each_edge<F>(&self, mut f: F)
    where
        F: FnMut(&EdgeKey, &E),
    {
        for slot in &self.edges {
            f(&slot.key, &slot.label);
        }
    }

    pub fn for_each_edge_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&EdgeKey, &mut E),
    {
        for slot in &mut self.edges {
            f(&slot.key, &mut slot.label);
        }
    }

    // ---- adjacency ------------------------------------------------------

    /// Outgoing edges of `v`, optionally restricted to those ending at `to`.
    /// For undirected graphs this is every incident edge.
    pub fn out_edges(&self, v: &str, to: Option<&str>) -> Vec<EdgeKey> {
        if !self.options.directed {
            return self.incident_edges(v, to);
        }
        let Some(&i) = self.node_lookup.get(v) else {
            return Vec::new();
        };
        let adj = self.adj_index();
        adj.out[i]
            .iter()
            .map(|&e| &self.edges[e].key)
            .filter(|key| to.map_or(true, |to| key.w == to))
            .cloned()
            .collect()
    }

    /// Incoming edges of `v`, optionally restricted to those starting at
    /// `from`. For undirected graphs this is every incident edge.
    pub fn in_edges(&self, v: &str, from: Option<&str>) -> Vec<EdgeKey> {
        if !self.options.directed {
            return self.incident_edges(v, from);
        }
        let Some(&i) = self.node_lookup.get(v) else {
            return Vec::new();
        };
        let adj = self.adj_index();
        adj.inc[i]
            .iter()
            .map(|&e| &self.edges[e].key)
            .filter(|key| from.map_or(true, |from| key.v == from))
            .cloned()
            .collect()
    }

    fn incident_edges(&self, v: &str, other: Option<&str>) -> Vec<EdgeKey> {
        self.edges
            .iter()
            .map(|slot| &slot.key)
            .filter(|key| {
                if key.v == v {
                    other.map_or(true, |o| key.w == o)
                } else if key.w == v {
                    other.map_or(true, |o| key.v == o)
                } else {
                    false
                }
            })
            .cloned()
            .collect()
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        if !self.options.directed {
            return self.adjacent(v);
        }
        let Some(&i) = self.node_lookup.get(v) else {
            return Vec::new();
        };
        let adj = self.adj_index();
        adj.out[i]
            .iter()
            .map(|&e| self.edges[e].key.w.as_str())
            .collect()
    }

    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        if !self.options.directed {
            return self.adjacent(v);
        }
        let Some(&i) = self.node_lookup.get(v) else {
            return Vec::new();
        };
        let adj = self.adj_index();
        adj.inc[i]
            .iter()
            .map(|&e| self.edges[e].key.v.as_str())
            .collect()
    }

    /// Deduplicated successors and predecessors.
    pub fn neighbors(&self, v: &str) -> Vec<&str> {
        if !self.options.directed {
            return self.adjacent(v);
        }
        let mut out: Vec<&str> = Vec::new();
        for w in self.successors(v).into_iter().chain(self.predecessors(v)) {
            if !out.contains(&w) {
                out.push(w);
            }
        }
        out
    }

    fn adjacent(&self, v: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for slot in &self.edges {
            let other = if slot.key.v == v {
                slot.key.w.as_str()
            } else if slot.key.w == v {
                slot.key.v.as_str()
            } else {
                continue;
            };
            if !out.contains(&other) {
                out.push(other);
            }
        }
        out
    }

    /// Nodes without incoming edges, in insertion order.
    pub fn sources(&self) -> Vec<&str> {
        if !self.options.directed {
            return self.nodes().collect();
        }
        let adj = self.adj_index();
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| adj.inc[*i].is_empty())
            .map(|(_, slot)| slot.id.as_str())
            .collect()
    }

    // ---- compound relation ----------------------------------------------

    /// Records `parent` as the compound parent of `child`. A no-op on
    /// non-compound graphs. Cycle prevention is the caller's concern.
    pub fn set_parent(&mut self, child: impl Into<String>, parent: impl Into<String>) -> &mut Self {
        if !self.options.compound {
            return self;
        }
        let child = child.into();
        let parent = parent.into();
        self.ensure_node(child.clone());
        self.ensure_node(parent.clone());
        if let Some(prev) = self.parent_of.insert(child.clone(), parent.clone()) {
            if let Some(siblings) = self.children_of.get_mut(&prev) {
                siblings.retain(|c| c != &child);
            }
        }
        let siblings = self.children_of.entry(parent).or_default();
        if !siblings.contains(&child) {
            siblings.push(child);
        }
        self
    }

    pub fn clear_parent(&mut self, child: &str) -> &mut Self {
        if let Some(prev) = self.parent_of.remove(child) {
            if let Some(siblings) = self.children_of.get_mut(&prev) {
                siblings.retain(|c| c != child);
            }
        }
        self
    }

    pub fn parent(&self, child: &str) -> Option<&str> {
        self.parent_of.get(child).map(String::as_str)
    }

    pub fn children(&self, parent: &str) -> Vec<&str> {
        self.children_of
            .get(parent)
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Nodes without a compound parent. Every node, for flat graphs.
    pub fn root_children(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|slot| !self.parent_of.contains_key(slot.id.as_str()))
            .map(|slot| slot.id.as_str())
            .collect()
    }
}

impl<N, E, G> Clone for Graph<N, E, G>
where
    N: Default + Clone,
    E: Default + Clone,
    G: Default + Clone,
{
    fn clone(&self) -> Self {
        Self {
            options: self.options,
            label: self.label.clone(),
            nodes: self.nodes.clone(),
            node_lookup: self.node_lookup.clone(),
            edges: self.edges.clone(),
            edge_lookup: self.edge_lookup.clone(),
            parent_of: self.parent_of.clone(),
            children_of: self.children_of.clone(),
            adj: RefCell::new(None),
        }
    }
}

impl<N, E, G> std::fmt::Debug for Graph<N, E, G>
where
    N: Default + std::fmt::Debug,
    E: Default + std::fmt::Debug,
    G: Default + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("label", &self.label)
            .field("nodes", &self.nodes)
            .field("edges", &self.edges)
            .field("parent_of", &self.parent_of)
            .finish()
    }
}
