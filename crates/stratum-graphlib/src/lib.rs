//! Directed multigraph container used by the `stratum` layout engine.
//!
//! The container keeps nodes and edges in insertion order (layout heuristics
//! are sensitive to traversal order), supports optional multi-edges named by a
//! string discriminator, and an optional compound parent/child relation on
//! nodes. Undirected mode exists for the spanning trees built during ranking.

mod graph;

pub mod alg;

pub use graph::{EdgeKey, Graph, GraphOptions};
