//! Headway synthesis, rollout and cleanup.
//!
//! A periodic headway `(L, U)` between two periodic events says that within
//! one period the second event happens between `L` and `U` seconds after the
//! first.  Concretized over a horizon, every pair of distinct instances
//! `(s, t)` yields the two alternatives of a disjunction:
//!
//! ```text
//! forward   s → t   [L,     U    ]
//! backward  t → s   [P − U, P − L]
//! ```
//!
//! Exactly one of them is respected in any feasible schedule; the other is
//! waived by the swap flag `g` during disposition.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use ean_core::{ActivityId, EventId, PeriodicActivityId, Seconds, time::normalize};
use ean_network::{
    Activity, ActivityKind, ActivityType, AperiodicNetwork, PeriodicActivity, PeriodicNetwork,
};

use crate::RolloutResult;

/// One self-loop headway `[h, P − h]` on the source event of every drive
/// activity whose PTN edge has a positive minimum headway `h`.
///
/// Synthesized activities are numbered after the largest periodic activity id.
pub(crate) fn synthesize(periodic: &PeriodicNetwork) -> Vec<PeriodicActivity> {
    let period = periodic.period;
    let mut next_id = periodic.activities.iter().map(|a| a.id.0).max().unwrap_or(0);
    let mut without_edge = 0usize;
    let mut out = Vec::new();

    for activity in periodic.activities.iter().filter(|a| a.activity_type == ActivityType::Drive) {
        let Some(h) = periodic.block_headway(activity) else {
            debug!(activity = %activity.id, "drive activity has no PTN edge, no headway synthesized");
            without_edge += 1;
            continue;
        };
        if h <= 0 {
            continue;
        }
        if 2 * h > period {
            warn!(
                activity = %activity.id,
                headway = h,
                period,
                "block headway exceeds half the period, no headway synthesized"
            );
            continue;
        }
        next_id += 1;
        out.push(PeriodicActivity {
            id:            PeriodicActivityId(next_id),
            activity_type: ActivityType::Headway,
            source:        activity.source,
            target:        activity.source,
            lower:         h,
            upper:         period - h,
            weight:        0.0,
        });
    }

    if without_edge > 0 {
        warn!(without_edge, "drive activities without PTN edge were skipped during headway synthesis");
    }
    debug!(synthesized = out.len(), "synthesized headway activities");
    out
}

/// Roll out one periodic headway over every pair of distinct instances.
pub(crate) fn roll_out(
    network:   &mut AperiodicNetwork,
    activity:  &PeriodicActivity,
    sources:   &[(Seconds, EventId)],
    targets:   &[(Seconds, EventId)],
    period:    Seconds,
) -> RolloutResult<usize> {
    let lower = normalize(activity.lower, period);
    let upper = lower + (activity.upper - activity.lower);
    let mut created = 0;

    for &(_, s) in sources {
        for &(_, t) in targets {
            if s == t {
                continue;
            }
            network.add_activity(headway(activity.id, s, t, lower, upper))?;
            network.add_activity(headway(activity.id, t, s, period - upper, period - lower))?;
            created += 2;
        }
    }
    Ok(created)
}

fn headway(id: PeriodicActivityId, source: EventId, target: EventId, lower: Seconds, upper: Seconds) -> Activity {
    Activity::new(id, ActivityKind::Headway { swapped: false }, source, target, lower, upper, 0.0)
}

/// For every event, keep only the incoming headway with the smallest lower
/// bound per source event.  Returns the number of removed activities.
///
/// Sources are compared by arena id, i.e. by instance identity.
pub(crate) fn clean_up(network: &mut AperiodicNetwork) -> usize {
    let mut redundant: Vec<ActivityId> = Vec::new();
    let mut best: FxHashMap<EventId, (Seconds, ActivityId)> = FxHashMap::default();

    for event in network.events() {
        best.clear();
        for a in network.incoming(event.id).filter(|a| a.kind.is_headway()) {
            match best.entry(a.source) {
                Entry::Vacant(slot) => {
                    slot.insert((a.lower, a.id));
                }
                Entry::Occupied(mut kept) if a.lower < kept.get().0 => {
                    redundant.push(kept.get().1);
                    kept.insert((a.lower, a.id));
                }
                Entry::Occupied(_) => redundant.push(a.id),
            }
        }
    }

    for &id in &redundant {
        network.remove_activity(id);
    }
    redundant.len()
}
