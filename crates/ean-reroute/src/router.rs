//! Minimal-change passenger routing and demand assignment.
//!
//! # Per OD pair
//!
//! ```text
//! departures at origin, grouped by dispo time, latest group first
//!   arrivals at destination, grouped by dispo time, earliest first,
//!   only those before the best arrival found so far
//!     hops = 0: ride the departure's trip to the arrival
//!     hops = 1..=max_changes: walks over the collapsed network with
//!       exactly `hops` changes, pruned by reachability
//!     → first non-empty result wins, all of its paths are kept
//! ```
//!
//! The result is a list of path groups in ascending departure time.  The
//! demand is spread over them by a uniform arrival model between
//! `day_start` and the last group, then split evenly over the paths of each
//! group.
//!
//! # Weights
//!
//! Routing only reads the network.  Assignments are written back afterwards
//! in OD order: every change activity on a path and its arrival event gain
//! the path's weight.  Change and event weights are reset first.

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use ean_core::{ActivityId, EventId, RerouteConfig, Seconds, StationId};
use ean_network::{AperiodicNetwork, EventKind, ExpandedOd, OdPair, PathRecord};

use crate::collapsed::{Hop, next_on_trip, prev_on_trip};
use crate::reachability::{mark, marked};
use crate::{CollapsedNetwork, Reachability, RerouteError, RerouteResult};

// ── Paths ─────────────────────────────────────────────────────────────────────

/// One concrete journey from a departure event to an arrival event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    pub departure:  EventId,
    pub arrival:    EventId,
    /// Every activity travelled, in order.
    pub activities: Vec<ActivityId>,
    /// The change activities among them.
    pub changes:    Vec<ActivityId>,
}

/// Equivalent paths leaving at the same time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathGroup {
    pub departure: Seconds,
    pub paths:     Vec<Path>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RerouteStats {
    pub decision_points: usize,
    pub collapsed_edges: usize,
    pub routed:          usize,
    /// Pairs without demand or with origin equal to destination.
    pub skipped:         usize,
    pub unroutable:      usize,
    pub paths:           usize,
    pub assigned:        u64,
}

/// Everything a rerouting run produced.
#[derive(Clone, Debug, Default)]
pub struct RerouteOutcome {
    pub paths:    Vec<PathRecord>,
    pub expanded: Vec<ExpandedOd>,
    pub stats:    RerouteStats,
}

/// Assignment of one OD pair, computed before any weight is written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OdAssignment {
    pub records:  Vec<PathRecord>,
    pub expanded: Vec<ExpandedOd>,
}

impl OdAssignment {
    pub fn assigned(&self) -> u64 {
        self.expanded.iter().map(|e| e.weight).sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Routing {
    Skipped,
    Unroutable,
    Routed(OdAssignment),
}

// ── Router ────────────────────────────────────────────────────────────────────

type Timed = (Seconds, EventId);

/// Departure and arrival events of one station, sorted by `(dispo_time, id)`.
#[derive(Default)]
struct StationEvents {
    departures: Vec<Timed>,
    arrivals:   Vec<Timed>,
}

/// Where a passenger enters or leaves the collapsed network, with the
/// activities between the event and that decision point.
struct Anchor {
    event: EventId,
    node:  usize,
    run:   Vec<ActivityId>,
}

/// Pending state of the path search.
struct Frame {
    node:   usize,
    budget: u32,
    edges:  Vec<usize>,
    nodes:  Vec<usize>,
}

/// Read-only router over one network, its collapsed form and closure.
pub struct PassengerRouter<'a> {
    network:     &'a AperiodicNetwork,
    collapsed:   &'a CollapsedNetwork,
    reach:       &'a Reachability,
    max_changes: u32,
    stations:    FxHashMap<StationId, StationEvents>,
}

impl<'a> PassengerRouter<'a> {
    pub fn new(
        network:     &'a AperiodicNetwork,
        collapsed:   &'a CollapsedNetwork,
        reach:       &'a Reachability,
        max_changes: u32,
    ) -> Self {
        let mut stations: FxHashMap<StationId, StationEvents> = FxHashMap::default();
        for e in network.events() {
            let entry = stations.entry(e.station).or_default();
            match e.kind {
                EventKind::Departure => entry.departures.push((e.dispo_time, e.id)),
                EventKind::Arrival => entry.arrivals.push((e.dispo_time, e.id)),
            }
        }
        for s in stations.values_mut() {
            s.departures.sort_unstable();
            s.arrivals.sort_unstable();
        }
        Self { network, collapsed, reach, max_changes, stations }
    }

    /// Path groups from `origin` to `destination`, ascending by departure.
    pub fn route(&self, origin: StationId, destination: StationId) -> Vec<PathGroup> {
        let (Some(from), Some(to)) = (self.stations.get(&origin), self.stations.get(&destination)) else {
            return Vec::new();
        };
        let arrivals: Vec<&[Timed]> = to.arrivals.chunk_by(|a, b| a.0 == b.0).collect();

        let mut best = Seconds::MAX;
        let mut groups = Vec::new();
        for departures in from.departures.chunk_by(|a, b| a.0 == b.0).rev() {
            let (time, bound) = (departures[0].0, best);
            let candidates = arrivals
                .iter()
                .filter(|g| g[0].0 >= time)
                .take_while(|g| g[0].0 < bound);
            for arrival_group in candidates {
                let paths = self.search(departures, arrival_group);
                if !paths.is_empty() {
                    best = arrival_group[0].0;
                    groups.push(PathGroup { departure: time, paths });
                    break;
                }
            }
        }
        groups.reverse();
        groups
    }

    /// Route `od` and spread its demand over the paths found.
    pub fn assign(&self, od: &OdPair, day_start: Seconds) -> Routing {
        if od.customers <= 0.0 || od.origin == od.destination {
            return Routing::Skipped;
        }
        let groups = self.route(od.origin, od.destination);
        if groups.is_empty() {
            return Routing::Unroutable;
        }

        let departures: Vec<Seconds> = groups.iter().map(|g| g.departure).collect();
        let shares = allocate(&departures, od.customers, day_start);
        let mut out = OdAssignment::default();
        for (group, share) in groups.iter().zip(shares) {
            if share == 0 {
                continue;
            }
            out.expanded.push(ExpandedOd {
                origin:      od.origin,
                destination: od.destination,
                departure:   group.departure,
                weight:      share,
            });
            for (path, weight) in group.paths.iter().zip(split(share, group.paths.len())) {
                if weight == 0 {
                    continue;
                }
                out.records.push(PathRecord {
                    weight,
                    origin_event:      path.departure,
                    destination_event: path.arrival,
                    origin:            od.origin,
                    destination:       od.destination,
                    changes:           path.changes.clone(),
                });
            }
        }
        Routing::Routed(out)
    }

    // ── Search ────────────────────────────────────────────────────────────

    /// All paths with the fewest changes from any departure to any arrival.
    fn search(&self, departures: &[Timed], arrivals: &[Timed]) -> Vec<Path> {
        let mut found = Vec::new();
        for &(_, d) in departures {
            for &(_, a) in arrivals {
                if let Some(run) = self.same_trip(d, a) {
                    found.push(Path { departure: d, arrival: a, activities: run, changes: Vec::new() });
                }
            }
        }
        if !found.is_empty() || self.max_changes == 0 {
            return found;
        }

        let starts: Vec<Anchor> = departures.iter().filter_map(|&(_, d)| self.boarding(d)).collect();
        let ends: Vec<Anchor> = arrivals.iter().filter_map(|&(_, a)| self.alighting(a)).collect();
        let mut mask = self.reach.mask();
        for end in &ends {
            mark(&mut mask, end.node);
        }
        if !starts.iter().any(|s| self.leads_to(s.node, &mask)) {
            return found;
        }

        for hops in 1..=self.max_changes {
            for start in &starts {
                for (last, edges) in self.walks(start.node, hops, &mask) {
                    for end in ends.iter().filter(|e| e.node == last) {
                        found.push(self.stitch(start, &edges, end));
                    }
                }
            }
            if !found.is_empty() {
                break;
            }
        }
        found
    }

    #[inline]
    fn leads_to(&self, node: usize, mask: &[u64]) -> bool {
        marked(mask, node) || self.reach.reaches_any(node, mask)
    }

    /// Walks from `start` with exactly `hops` changes that end on a node of
    /// `mask`, as `(last node, collapsed edges)`.  No node repeats on a walk.
    fn walks(&self, start: usize, hops: u32, mask: &[u64]) -> Vec<(usize, Vec<usize>)> {
        let mut out = Vec::new();
        let mut stack = vec![Frame { node: start, budget: hops, edges: Vec::new(), nodes: vec![start] }];
        while let Some(frame) = stack.pop() {
            if frame.budget == 0 && marked(mask, frame.node) {
                out.push((frame.node, frame.edges.clone()));
            }
            let next: Vec<_> = self
                .collapsed
                .outgoing(frame.node)
                .filter(|(_, e)| !e.is_change() || frame.budget > 0)
                .filter(|(_, e)| !frame.nodes.contains(&e.target) && self.leads_to(e.target, mask))
                .collect();
            // Reversed so edges pop in their natural order.
            for (index, edge) in next.into_iter().rev() {
                let mut edges = frame.edges.clone();
                edges.push(index);
                let mut nodes = frame.nodes.clone();
                nodes.push(edge.target);
                stack.push(Frame {
                    node:   edge.target,
                    budget: frame.budget - u32::from(edge.is_change()),
                    edges,
                    nodes,
                });
            }
        }
        out
    }

    /// Activities from `departure` to `arrival` without leaving the trip.
    fn same_trip(&self, departure: EventId, arrival: EventId) -> Option<Vec<ActivityId>> {
        let limit = self.network.event_count();
        let mut current = departure;
        let mut run = Vec::new();
        while current != arrival {
            let a = next_on_trip(self.network, current)?;
            run.push(a.id);
            current = a.target;
            if run.len() > limit {
                return None;
            }
        }
        Some(run)
    }

    /// First decision point at or after `departure` on its trip.
    fn boarding(&self, departure: EventId) -> Option<Anchor> {
        let limit = self.network.event_count();
        let mut current = departure;
        let mut run = Vec::new();
        loop {
            if let Some(node) = self.collapsed.node_of(current) {
                return Some(Anchor { event: departure, node, run });
            }
            let a = next_on_trip(self.network, current)?;
            run.push(a.id);
            current = a.target;
            if run.len() > limit {
                return None;
            }
        }
    }

    /// Last decision point at or before `arrival` on its trip.
    fn alighting(&self, arrival: EventId) -> Option<Anchor> {
        let limit = self.network.event_count();
        let mut current = arrival;
        let mut run = Vec::new();
        loop {
            if let Some(node) = self.collapsed.node_of(current) {
                run.reverse();
                return Some(Anchor { event: arrival, node, run });
            }
            let a = prev_on_trip(self.network, current)?;
            run.push(a.id);
            current = a.source;
            if run.len() > limit {
                return None;
            }
        }
    }

    fn stitch(&self, start: &Anchor, edges: &[usize], end: &Anchor) -> Path {
        let mut activities = start.run.clone();
        let mut changes = Vec::new();
        for &i in edges {
            match &self.collapsed.edges()[i].hop {
                Hop::Ride(run) => activities.extend_from_slice(run),
                Hop::Change(c) => {
                    activities.push(*c);
                    changes.push(*c);
                }
            }
        }
        activities.extend_from_slice(&end.run);
        Path { departure: start.event, arrival: end.event, activities, changes }
    }
}

// ── Demand split ──────────────────────────────────────────────────────────────

/// Whole passengers per path group.
///
/// Group `j` receives `⌊D·F(t_j)⌋ − ⌊D·F(t_{j−1})⌋` where `F` is the
/// uniform distribution between `day_start` and the last departure.  When
/// the two coincide the last group takes everything.
pub fn allocate(departures: &[Seconds], customers: f64, day_start: Seconds) -> Vec<u64> {
    let Some(&last) = departures.last() else {
        return Vec::new();
    };
    let mut shares = vec![0; departures.len()];
    let span = last - day_start;
    if span <= 0 {
        shares[departures.len() - 1] = customers.floor() as u64;
        return shares;
    }
    let mut previous = 0u64;
    for (share, &t) in shares.iter_mut().zip(departures) {
        let cdf = ((t - day_start) as f64 / span as f64).clamp(0.0, 1.0);
        let cumulative = (customers * cdf).floor() as u64;
        *share = cumulative.saturating_sub(previous);
        previous = previous.max(cumulative);
    }
    shares
}

/// `total` split over `parts` as evenly as possible, remainder first.
pub fn split(total: u64, parts: usize) -> Vec<u64> {
    if parts == 0 {
        return Vec::new();
    }
    let n = parts as u64;
    (0..n).map(|i| total / n + u64::from(i < total % n)).collect()
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Route every OD pair of `demand` through `network` and write the
/// resulting passenger weights back onto it.
///
/// Pairs without demand are skipped; pairs without any path are dropped
/// with a warning.
pub fn reroute(
    network: &mut AperiodicNetwork,
    demand:  &[OdPair],
    config:  &RerouteConfig,
) -> RerouteResult<RerouteOutcome> {
    config.validate()?;
    if let Some(od) = demand.iter().find(|od| !od.customers.is_finite() || od.customers < 0.0) {
        return Err(RerouteError::InvalidDemand {
            origin:      od.origin,
            destination: od.destination,
            customers:   od.customers,
        });
    }

    let mut stats = RerouteStats::default();
    let routings: Vec<Routing> = {
        let collapsed = CollapsedNetwork::build(network, config.respect_missed_connections);
        let reach = Reachability::closure(&collapsed);
        stats.decision_points = collapsed.node_count();
        stats.collapsed_edges = collapsed.edge_count();
        debug!(
            nodes = collapsed.node_count(),
            edges = collapsed.edge_count(),
            reachable = reach.count(),
            "built collapsed network"
        );
        let router = PassengerRouter::new(network, &collapsed, &reach, config.max_changes);

        #[cfg(not(feature = "parallel"))]
        {
            demand.iter().map(|od| router.assign(od, config.day_start)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            demand.par_iter().map(|od| router.assign(od, config.day_start)).collect()
        }
    };

    reset_weights(network);
    let mut outcome = RerouteOutcome::default();
    for (od, routing) in demand.iter().zip(routings) {
        match routing {
            Routing::Skipped => stats.skipped += 1,
            Routing::Unroutable => {
                stats.unroutable += 1;
                warn!(origin = %od.origin, destination = %od.destination, "no path found, demand dropped");
            }
            Routing::Routed(assignment) => {
                let assigned = assignment.assigned();
                if assigned != od.customers.floor() as u64 {
                    warn!(
                        origin = %od.origin,
                        destination = %od.destination,
                        demand = od.customers,
                        assigned,
                        "assigned passengers differ from demand"
                    );
                }
                apply(network, &assignment.records);
                stats.routed += 1;
                stats.paths += assignment.records.len();
                stats.assigned += assigned;
                outcome.paths.extend(assignment.records);
                outcome.expanded.extend(assignment.expanded);
            }
        }
    }

    info!(
        routed = stats.routed,
        unroutable = stats.unroutable,
        skipped = stats.skipped,
        paths = stats.paths,
        assigned = stats.assigned,
        "rerouted passengers"
    );
    outcome.stats = stats;
    Ok(outcome)
}

fn reset_weights(network: &mut AperiodicNetwork) {
    for a in network.activities_mut().filter(|a| a.kind.is_change()) {
        a.weight = 0.0;
    }
    for e in network.events_mut() {
        e.weight = 0.0;
    }
}

fn apply(network: &mut AperiodicNetwork, records: &[PathRecord]) {
    for r in records {
        let w = r.weight as f64;
        for &c in &r.changes {
            if let Some(a) = network.activity_mut(c) {
                a.weight += w;
            }
        }
        if let Some(e) = network.event_mut(r.destination_event) {
            e.weight += w;
        }
    }
}
