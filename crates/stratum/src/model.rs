//! Label types attached to the layout graph.
//!
//! The working graph carries only whitelisted, typed attributes; everything a
//! phase scribbles onto a node or edge lives here rather than in an untyped
//! attribute bag. Caller-facing inputs are `width`/`height` on nodes,
//! `weight`/`minlen`/label box fields on edges, and the configuration half of
//! [`GraphLabel`]. The rest is produced by the pipeline.

use crate::graphlib::EdgeKey;
use std::str::FromStr;

/// Primary layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankDir {
    /// Top to bottom.
    #[default]
    Tb,
    /// Bottom to top.
    Bt,
    /// Left to right.
    Lr,
    /// Right to left.
    Rl,
}

impl RankDir {
    pub fn is_horizontal(self) -> bool {
        matches!(self, RankDir::Lr | RankDir::Rl)
    }
}

impl FromStr for RankDir {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tb" => Ok(RankDir::Tb),
            "bt" => Ok(RankDir::Bt),
            "lr" => Ok(RankDir::Lr),
            "rl" => Ok(RankDir::Rl),
            _ => Err(UnknownOption("rankdir", s.to_string())),
        }
    }
}

/// Strategy for breaking cycles before ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Acyclicer {
    /// Eades–Lin–Smyth greedy feedback arc set.
    #[default]
    Greedy,
    /// Reverse back-edges found by depth-first search.
    Dfs,
}

impl FromStr for Acyclicer {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "greedy" => Ok(Acyclicer::Greedy),
            "dfs" => Ok(Acyclicer::Dfs),
            _ => Err(UnknownOption("acyclicer", s.to_string())),
        }
    }
}

/// Rank assignment algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ranker {
    #[default]
    NetworkSimplex,
    TightTree,
    LongestPath,
}

impl FromStr for Ranker {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "network-simplex" => Ok(Ranker::NetworkSimplex),
            "tight-tree" => Ok(Ranker::TightTree),
            "longest-path" => Ok(Ranker::LongestPath),
            _ => Err(UnknownOption("ranker", s.to_string())),
        }
    }
}

/// One of the four Brandes–Köpf alignments (up/down x left/right). When set
/// on the graph label, positioning uses that alignment alone instead of
/// balancing all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BkAlign {
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl FromStr for BkAlign {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ul" => Ok(BkAlign::UpLeft),
            "ur" => Ok(BkAlign::UpRight),
            "dl" => Ok(BkAlign::DownLeft),
            "dr" => Ok(BkAlign::DownRight),
            _ => Err(UnknownOption("align", s.to_string())),
        }
    }
}

/// Placement of an edge label relative to the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelPos {
    Left,
    #[default]
    Center,
    Right,
}

impl FromStr for LabelPos {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l" => Ok(LabelPos::Left),
            "c" => Ok(LabelPos::Center),
            "r" => Ok(LabelPos::Right),
            _ => Err(UnknownOption("labelpos", s.to_string())),
        }
    }
}

/// Raised when a string option does not name a recognized value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOption(pub &'static str, pub String);

impl std::fmt::Display for UnknownOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized value `{}` for option `{}`", self.1, self.0)
    }
}

impl std::error::Error for UnknownOption {}

/// Why a synthetic node exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyKind {
    /// Interior node of a normalized long-edge chain.
    Edge,
    /// The one chain node that carries the edge's label box.
    EdgeLabel,
    /// Pre-normalization stand-in reserving a rank for an edge label.
    EdgeProxy,
    /// Lateral or top/bottom padding around a compound node.
    Border,
    /// Reserves horizontal room for a self loop next to its endpoint.
    SelfLoop,
    /// Root of the nesting graph for compound ranking.
    NestingRoot,
}

impl DummyKind {
    /// Chain nodes, with or without the label box.
    pub fn is_edge_chain(self) -> bool {
        matches!(self, DummyKind::Edge | DummyKind::EdgeLabel)
    }
}

/// Which side of a compound node a border dummy pads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeLabel {
    pub width: f64,
    pub height: f64,

    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rank: Option<i32>,
    pub order: Option<usize>,

    /// Rank span of a compound node, from its top/bottom border nodes.
    pub min_rank: Option<i32>,
    pub max_rank: Option<i32>,

    pub dummy: Option<DummyKind>,
    /// Label placement copied onto edge-label chain nodes.
    pub labelpos: Option<LabelPos>,
    /// Original edge label carried by a chain / proxy / self-loop dummy.
    pub edge_label: Option<EdgeLabel>,
    /// The edge a dummy stands in for.
    pub edge_obj: Option<EdgeKey>,

    pub border_type: Option<BorderSide>,
    pub border_top: Option<String>,
    pub border_bottom: Option<String>,
    /// Left/right border dummy ids indexed by rank.
    pub border_left: Vec<Option<String>>,
    pub border_right: Vec<Option<String>>,

    /// Self loops excised from the graph, parked on their endpoint until
    /// positioning reinserts them.
    pub self_loops: Vec<SelfLoop>,
}

impl NodeLabel {
    pub fn is_dummy(&self) -> bool {
        self.dummy.is_some()
    }

    pub fn is_border_dummy(&self) -> bool {
        self.dummy == Some(DummyKind::Border)
    }

    pub(crate) fn border_left_at(&self, rank: i32) -> Option<&str> {
        self.border_left
            .get(rank.max(0) as usize)
            .and_then(|v| v.as_deref())
    }

    pub(crate) fn border_right_at(&self, rank: i32) -> Option<&str> {
        self.border_right
            .get(rank.max(0) as usize)
            .and_then(|v| v.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLabel {
    /// Priority of the edge for ordering and positioning. Must be positive.
    pub weight: f64,
    /// Minimum rank distance between the endpoints. Must be at least 1.
    pub minlen: usize,

    /// Label bounding box; both zero when the edge has no label.
    pub width: f64,
    pub height: f64,
    pub labelpos: LabelPos,
    /// Perpendicular shift of a non-centered label away from the edge.
    pub labeloffset: f64,

    /// Rank reserved for the label box, decided by the proxy pass.
    pub label_rank: Option<i32>,
    /// Set while the edge is flipped by acyclicization; kept after undo so
    /// callers can observe the feedback set.
    pub reversed: bool,
    /// Multi-edge name the edge had before it was flipped.
    pub forward_name: Option<String>,
    /// Marks auxiliary edges added by the nesting pass.
    pub nesting: bool,

    /// Output: polyline through the routed edge, node centers excluded.
    pub points: Vec<Point>,
    /// Output: label anchor, present when the edge has a label box.
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            weight: 1.0,
            minlen: 1,
            width: 0.0,
            height: 0.0,
            labelpos: LabelPos::Center,
            labeloffset: 10.0,
            label_rank: None,
            reversed: false,
            forward_name: None,
            nesting: false,
            points: Vec::new(),
            x: None,
            y: None,
        }
    }
}

impl EdgeLabel {
    pub fn has_label(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// A self loop parked on its endpoint while the pipeline runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfLoop {
    pub key: EdgeKey,
    pub label: EdgeLabel,
}

/// Graph-level configuration, outputs, and pipeline scratch.
#[derive(Debug, Clone)]
pub struct GraphLabel {
    pub rankdir: RankDir,
    pub align: Option<BkAlign>,
    pub nodesep: f64,
    pub edgesep: f64,
    pub ranksep: f64,
    pub marginx: f64,
    pub marginy: f64,
    pub acyclicer: Acyclicer,
    pub ranker: Ranker,

    /// Output: canvas size, set by the final translation.
    pub width: f64,
    pub height: f64,

    /// Granularity of empty-rank removal; the nesting pass overwrites this
    /// with `2 * nesting depth + 1`. Always at least 1.
    pub node_rank_factor: usize,

    /// First node of each normalized long-edge chain.
    pub dummy_chains: Vec<String>,
    /// Root dummy of the nesting graph, between its run and cleanup.
    pub nesting_root: Option<String>,
}

impl Default for GraphLabel {
    fn default() -> Self {
        Self {
            rankdir: RankDir::Tb,
            align: None,
            nodesep: 50.0,
            edgesep: 20.0,
            ranksep: 50.0,
            marginx: 0.0,
            marginy: 0.0,
            acyclicer: Acyclicer::Greedy,
            ranker: Ranker::NetworkSimplex,
            width: 0.0,
            height: 0.0,
            node_rank_factor: 4,
            dummy_chains: Vec::new(),
            nesting_root: None,
        }
    }
}

/// Optional overrides merged into the graph label at intake.
#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    pub rankdir: Option<RankDir>,
    pub align: Option<BkAlign>,
    pub nodesep: Option<f64>,
    pub edgesep: Option<f64>,
    pub ranksep: Option<f64>,
    pub marginx: Option<f64>,
    pub marginy: Option<f64>,
    pub acyclicer: Option<Acyclicer>,
    pub ranker: Option<Ranker>,
    /// Print per-stage wall-clock timings to stderr.
    pub debug_timing: bool,
}

impl LayoutOptions {
    pub(crate) fn apply(&self, label: &mut GraphLabel) {
        if let Some(rankdir) = self.rankdir {
            label.rankdir = rankdir;
        }
        if self.align.is_some() {
            label.align = self.align;
        }
        if let Some(nodesep) = self.nodesep {
            label.nodesep = nodesep;
        }
        if let Some(edgesep) = self.edgesep {
            label.edgesep = edgesep;
        }
        if let Some(ranksep) = self.ranksep {
            label.ranksep = ranksep;
        }
        if let Some(marginx) = self.marginx {
            label.marginx = marginx;
        }
        if let Some(marginy) = self.marginy {
            label.marginy = marginy;
        }
        if let Some(acyclicer) = self.acyclicer {
            label.acyclicer = acyclicer;
        }
        if let Some(ranker) = self.ranker {
            label.ranker = ranker;
        }
    }
}
