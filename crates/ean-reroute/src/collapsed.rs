//! Collapsed network: decision points joined by rides and changes.
//!
//! A decision point is an event where a passenger can board, alight or
//! change: every trip start or end and both endpoints of every usable
//! change activity.  Between two consecutive decision points of a trip the
//! drive/wait run collapses into one [`Hop::Ride`]; every usable change
//! becomes one [`Hop::Change`].
//!
//! ```text
//! trip 1:  s1 ─d─▶ a ─w─▶ b ─d─▶ e1
//!                  │
//!                  change
//!                  ▼
//! trip 2:          s2 ─d─▶ x ─d─▶ e2
//!
//! nodes:  s1 a e1 s2 e2
//! edges:  s1→a Ride[d]    a→e1 Ride[w d]    s2→e2 Ride[d d]    a→s2 Change
//! ```

use ean_core::{ActivityId, EventId};
use ean_network::{Activity, AperiodicNetwork};

/// What a collapsed edge stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hop {
    /// Consecutive drive/wait activities of one trip, in travel order.
    Ride(Vec<ActivityId>),
    Change(ActivityId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollapsedEdge {
    pub source: usize,
    pub target: usize,
    pub hop:    Hop,
}

impl CollapsedEdge {
    #[inline]
    pub fn is_change(&self) -> bool {
        matches!(self.hop, Hop::Change(_))
    }
}

/// Decision points are numbered `0..node_count()` in event id order.
#[derive(Clone, Debug, Default)]
pub struct CollapsedNetwork {
    events:   Vec<EventId>,
    /// Node of each event slot of the source network.
    node:     Vec<Option<usize>>,
    edges:    Vec<CollapsedEdge>,
    outgoing: Vec<Vec<usize>>,
}

/// Whether the router may use change `a`.
#[inline]
pub(crate) fn usable_change(a: &Activity, respect_missed: bool) -> bool {
    a.kind.is_change() && !(respect_missed && a.is_missed())
}

/// The drive or wait activity that continues the trip after `event`.
pub(crate) fn next_on_trip(network: &AperiodicNetwork, event: EventId) -> Option<&Activity> {
    network.outgoing(event).find(|a| a.kind.is_trip())
}

/// The drive or wait activity that leads into `event` on its trip.
pub(crate) fn prev_on_trip(network: &AperiodicNetwork, event: EventId) -> Option<&Activity> {
    network.incoming(event).find(|a| a.kind.is_trip())
}

impl CollapsedNetwork {
    /// Collapse `network`.  With `respect_missed`, changes flagged as missed
    /// are left out.
    pub fn build(network: &AperiodicNetwork, respect_missed: bool) -> Self {
        let mut decision = vec![false; network.event_slots()];
        for e in network.events() {
            if e.start_of_trip || e.end_of_trip {
                decision[e.id.index()] = true;
            }
        }
        for a in network.activities().filter(|a| usable_change(a, respect_missed)) {
            decision[a.source.index()] = true;
            decision[a.target.index()] = true;
        }

        let mut out = Self { node: vec![None; network.event_slots()], ..Self::default() };
        for e in network.events().filter(|e| decision[e.id.index()]) {
            out.node[e.id.index()] = Some(out.events.len());
            out.events.push(e.id);
        }
        out.outgoing = vec![Vec::new(); out.events.len()];

        // ── Rides ─────────────────────────────────────────────────────────
        let limit = network.event_count();
        for source in 0..out.events.len() {
            let mut current = out.events[source];
            let mut run = Vec::new();
            while let Some(a) = next_on_trip(network, current) {
                run.push(a.id);
                current = a.target;
                if let Some(target) = out.node_of(current) {
                    out.push(source, target, Hop::Ride(run));
                    break;
                }
                if run.len() > limit {
                    break;
                }
            }
        }

        // ── Changes ───────────────────────────────────────────────────────
        for a in network.activities().filter(|a| usable_change(a, respect_missed)) {
            if let (Some(s), Some(t)) = (out.node_of(a.source), out.node_of(a.target)) {
                out.push(s, t, Hop::Change(a.id));
            }
        }
        out
    }

    fn push(&mut self, source: usize, target: usize, hop: Hop) {
        self.outgoing[source].push(self.edges.len());
        self.edges.push(CollapsedEdge { source, target, hop });
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[CollapsedEdge] {
        &self.edges
    }

    /// Decision point of `event`, if it is one.
    #[inline]
    pub fn node_of(&self, event: EventId) -> Option<usize> {
        if !event.is_valid() {
            return None;
        }
        self.node.get(event.index()).copied().flatten()
    }

    #[inline]
    pub fn event(&self, node: usize) -> EventId {
        self.events[node]
    }

    /// Edges leaving `node` with their indices, rides before changes.
    pub fn outgoing(&self, node: usize) -> impl Iterator<Item = (usize, &CollapsedEdge)> + '_ {
        self.outgoing[node].iter().map(|&i| (i, &self.edges[i]))
    }
}
