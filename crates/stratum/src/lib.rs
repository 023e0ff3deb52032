//! Layered (Sugiyama-style) layout for directed graphs.
//!
//! Given a directed multigraph whose nodes carry sizes, [`layout`] assigns a
//! center position to every node, a polyline to every edge, and a bounding
//! rectangle to every compound node, mutating the graph in place. Edges end
//! up pointing predominantly along one configurable axis with heuristically
//! few crossings.
//!
//! ```
//! use stratum::graphlib::{Graph, GraphOptions};
//! use stratum::{layout, EdgeLabel, GraphLabel, NodeLabel};
//!
//! let mut g: Graph<NodeLabel, EdgeLabel, GraphLabel> =
//!     Graph::new(GraphOptions { directed: true, multigraph: true, compound: false });
//! g.set_graph(GraphLabel::default());
//! g.set_node("a", NodeLabel { width: 40.0, height: 20.0, ..Default::default() });
//! g.set_node("b", NodeLabel { width: 40.0, height: 20.0, ..Default::default() });
//! g.set_edge("a", "b");
//!
//! layout(&mut g).unwrap();
//! assert!(g.node("a").unwrap().y.unwrap() < g.node("b").unwrap().y.unwrap());
//! ```
//!
//! The submodules expose the individual pipeline phases so each can be
//! driven and tested on its own; `layout` is the supported entry point.

pub use stratum_graphlib as graphlib;

pub mod acyclic;
pub mod borders;
pub mod coords;
pub mod error;
pub mod feedback;
pub mod model;
pub mod nesting;
pub mod normalize;
pub mod order;
pub mod parent_chains;
pub mod pipeline;
pub mod position;
pub mod rank;
pub mod self_loops;
pub mod util;

pub use error::{LayoutError, Result};
pub use model::{
    Acyclicer, BkAlign, BorderSide, DummyKind, EdgeLabel, GraphLabel, LabelPos, LayoutOptions,
    NodeLabel, Point, RankDir, Ranker, SelfLoop,
};

/// The graph type the layout engine operates on.
pub type LayoutGraph = graphlib::Graph<NodeLabel, EdgeLabel, GraphLabel>;

/// Lays out `g` in place with the options already on its graph label.
pub fn layout(g: &mut LayoutGraph) -> Result<()> {
    pipeline::run(g, &LayoutOptions::default())
}

/// Lays out `g` in place, with `opts` overriding the graph label's options
/// for this invocation.
pub fn layout_with(g: &mut LayoutGraph, opts: &LayoutOptions) -> Result<()> {
    pipeline::run(g, opts)
}
