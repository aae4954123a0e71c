//! Disposition timetable: propagate source delays through the network.
//!
//! Events are visited in topological order (Kahn) of the activities that can
//! carry a delay.  When an event is reached, all of its predecessors are
//! final, so its disposition time is
//!
//! ```text
//! dispo(v) = max( time(v) + sourceDelay(v),
//!                 dispo(u) + lower(a) + sourceDelay(a)   for every carrying a = u → v,
//!                 kept feeders )
//! ```
//!
//! Drive, wait and turnaround activities always carry.  A headway carries
//! when it keeps the planned order; the reversed alternative is marked
//! swapped (`g = 1`) and ignored.  A change carries only if the departing
//! vehicle waits for it, which it does when the extra wait over its own
//! disposition time stays within `max_waiting_time`; otherwise the change
//! is marked missed (`z = 1`).

use std::collections::VecDeque;

use tracing::info;

use ean_core::{PropagationConfig, Seconds};
use ean_network::{Activity, ActivityKind, AperiodicNetwork};

use crate::{DelayError, DelayResult};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PropagationStats {
    pub delayed_events:     usize,
    pub missed_connections: usize,
    pub swapped_headways:   usize,
}

/// `true` if the headway runs against the planned order of its endpoints.
fn reverses_plan(network: &AperiodicNetwork, a: &Activity) -> bool {
    match (network.event(a.source), network.event(a.target)) {
        (Some(s), Some(t)) => (t.time, t.id) < (s.time, s.id),
        _ => false,
    }
}

/// Compute `dispo_time` of every event and the `z`/`g` flags of every
/// change and headway activity.  Previous disposition results are
/// discarded first.
pub fn propagate_delays(
    network: &mut AperiodicNetwork,
    config:  &PropagationConfig,
) -> DelayResult<PropagationStats> {
    config.validate()?;
    network.reset_disposition();

    let mut stats = PropagationStats::default();

    // ── Headway order ─────────────────────────────────────────────────────
    let swapped: Vec<_> = network
        .activities()
        .filter(|a| a.kind.is_headway() && reverses_plan(network, a))
        .map(|a| a.id)
        .collect();
    for &id in &swapped {
        if let Some(a) = network.activity_mut(id) {
            a.kind = ActivityKind::Headway { swapped: true };
        }
    }
    stats.swapped_headways = swapped.len();

    // ── Topological order ─────────────────────────────────────────────────
    let slots = network.event_slots();
    let mut dispo: Vec<Seconds> = vec![0; slots];
    let mut indegree: Vec<usize> = vec![0; slots];
    for e in network.events() {
        dispo[e.id.index()] = e.time + e.source_delay;
    }
    for a in network.activities().filter(|a| carries(a.kind)) {
        indegree[a.target.index()] += 1;
    }

    let mut queue: VecDeque<_> = network
        .events()
        .filter(|e| indegree[e.id.index()] == 0)
        .map(|e| e.id)
        .collect();
    let mut missed = Vec::new();
    let mut visited = 0usize;

    while let Some(v) = queue.pop_front() {
        visited += 1;
        let vi = v.index();

        // Feeders are final; decide which ones the departure waits for.
        let base = dispo[vi];
        for c in network.incoming(v).filter(|a| a.kind.is_change()) {
            let required = dispo[c.source.index()] + c.lower + c.source_delay;
            if required > base && required - base <= config.max_waiting_time {
                dispo[vi] = dispo[vi].max(required);
            }
        }
        // A feeder can still be caught thanks to waiting for another one.
        for c in network.incoming(v).filter(|a| a.kind.is_change()) {
            if dispo[c.source.index()] + c.lower + c.source_delay > dispo[vi] {
                missed.push(c.id);
            }
        }

        for a in network.outgoing(v).filter(|a| carries(a.kind)) {
            let ti = a.target.index();
            if !a.kind.is_change() {
                dispo[ti] = dispo[ti].max(dispo[vi] + a.lower + a.source_delay);
            }
            indegree[ti] -= 1;
            if indegree[ti] == 0 {
                queue.push_back(a.target);
            }
        }
    }

    let live = network.event_count();
    if visited < live {
        return Err(DelayError::Cycle { unresolved: live - visited });
    }

    // ── Write back ────────────────────────────────────────────────────────
    for &id in &missed {
        if let Some(a) = network.activity_mut(id) {
            a.kind = ActivityKind::Change { missed: true };
        }
    }
    stats.missed_connections = missed.len();

    for e in network.events_mut() {
        e.dispo_time = dispo[e.id.index()];
        if e.dispo_time > e.time {
            stats.delayed_events += 1;
        }
    }

    info!(
        delayed_events = stats.delayed_events,
        missed_connections = stats.missed_connections,
        swapped_headways = stats.swapped_headways,
        "propagated delays"
    );
    Ok(stats)
}

/// Activities that take part in the topological order.  Changes are
/// included so that feeders are final before their departure is decided.
fn carries(kind: ActivityKind) -> bool {
    !matches!(kind, ActivityKind::Headway { swapped: true })
}

/// Restore the `z`/`g` flags from disposition times read back from a table.
///
/// A change is missed when its lower bound is violated in the disposition
/// timetable; a headway is swapped when it runs against the planned order.
pub fn derive_flags(network: &mut AperiodicNetwork) {
    let flags: Vec<_> = network
        .activities()
        .filter_map(|a| {
            let (s, t) = (network.event(a.source)?, network.event(a.target)?);
            match a.kind {
                ActivityKind::Change { .. } => Some((
                    a.id,
                    ActivityKind::Change { missed: t.dispo_time - s.dispo_time < a.lower + a.source_delay },
                )),
                ActivityKind::Headway { .. } => Some((
                    a.id,
                    ActivityKind::Headway { swapped: (t.time, t.id) < (s.time, s.id) },
                )),
                _ => None,
            }
        })
        .collect();
    for (id, kind) in flags {
        if let Some(a) = network.activity_mut(id) {
            a.kind = kind;
        }
    }
}
