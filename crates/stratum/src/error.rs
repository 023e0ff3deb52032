//! Layout failures.
//!
//! Input problems are detected up front, before the working graph is built;
//! the one late failure (degenerate intersection geometry) still happens
//! before anything is written back, so a failed layout never mutates the
//! caller's graph.

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("node `{id}` has an invalid size {width} x {height}; sizes must be finite and non-negative")]
    InvalidNodeSize { id: String, width: f64, height: f64 },

    #[error("edge `{v}` -> `{w}` has an invalid label box {width} x {height}")]
    InvalidEdgeLabel {
        v: String,
        w: String,
        width: f64,
        height: f64,
    },

    #[error("edge `{v}` -> `{w}` has an invalid weight {weight}; weights must be finite and positive")]
    InvalidEdgeWeight { v: String, w: String, weight: f64 },

    #[error("edge `{v}` -> `{w}` has minlen 0; the minimum rank distance is 1")]
    InvalidMinlen { v: String, w: String },

    #[error("graph option `{name}` is {value}; separations and margins must be finite and non-negative")]
    InvalidSeparation { name: &'static str, value: f64 },

    #[error("edge `{v}` -> `{w}` references a node that is not in the graph")]
    DanglingEndpoint { v: String, w: String },

    #[error("compound parent relation contains a cycle through `{id}`")]
    CyclicNesting { id: String },

    #[error("edge at node `{id}` collapses onto the node center; cannot intersect its boundary")]
    DegenerateIntersection { id: String },
}
