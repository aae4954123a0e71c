//! Physical transit network data needed by the rollout: PTN edges, the
//! minimum block headway of each edge, and the line pool (edge sequence and
//! frequency of every line).

use rustc_hash::FxHashMap;

use ean_core::{CoreError, CoreResult, EdgeId, LineId, Seconds, StationId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PtnEdge {
    pub id:    EdgeId,
    pub left:  StationId,
    pub right: StationId,
}

impl PtnEdge {
    /// `true` if the edge joins `a` and `b`, in either orientation.
    #[inline]
    pub fn connects(&self, a: StationId, b: StationId) -> bool {
        (self.left == a && self.right == b) || (self.left == b && self.right == a)
    }
}

/// One line of the line pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    pub frequency: u32,
    /// PTN edges in line order.
    pub edges: Vec<EdgeId>,
}

#[derive(Clone, Debug, Default)]
pub struct Ptn {
    /// Indexed by `EdgeId::index()`.
    pub edges:     Vec<PtnEdge>,
    pub headways:  FxHashMap<EdgeId, Seconds>,
    pub lines:     FxHashMap<LineId, Line>,
}

impl Ptn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an edge.  Edges must arrive in id order `1..=n`.
    pub fn add_edge(&mut self, left: StationId, right: StationId) -> EdgeId {
        let id = EdgeId::from_index(self.edges.len());
        self.edges.push(PtnEdge { id, left, right });
        id
    }

    pub fn set_headway(&mut self, edge: EdgeId, headway: Seconds) -> CoreResult<()> {
        if self.edge(edge).is_none() {
            return Err(CoreError::MissingReference {
                what:  "PTN edge",
                id:    edge.0,
                owner: "edge headway table".into(),
            });
        }
        self.headways.insert(edge, headway);
        Ok(())
    }

    /// Register `edge` at the end of `line` and record the line frequency.
    pub fn push_line_edge(&mut self, line: LineId, edge: EdgeId, frequency: u32) {
        let entry = self.lines.entry(line).or_default();
        entry.frequency = frequency;
        entry.edges.push(edge);
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&PtnEdge> {
        if !id.is_valid() {
            return None;
        }
        self.edges.get(id.index())
    }

    /// Frequency of `line`, `None` when the line pool does not know it.
    pub fn frequency(&self, line: LineId) -> Option<u32> {
        self.lines.get(&line).map(|l| l.frequency)
    }

    /// The edge between stations `a` and `b`, preferring the edges of `line`
    /// and falling back to any PTN edge.
    pub fn edge_between(&self, line: LineId, a: StationId, b: StationId) -> Option<EdgeId> {
        if let Some(l) = self.lines.get(&line) {
            let on_line = l
                .edges
                .iter()
                .copied()
                .find(|&e| self.edge(e).is_some_and(|edge| edge.connects(a, b)));
            if on_line.is_some() {
                return on_line;
            }
        }
        self.edges.iter().find(|e| e.connects(a, b)).map(|e| e.id)
    }

    /// Minimum block headway of `edge`; `0` when the headway table is silent.
    #[inline]
    pub fn headway(&self, edge: EdgeId) -> Seconds {
        self.headways.get(&edge).copied().unwrap_or(0)
    }
}
