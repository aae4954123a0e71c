//! Event rollout and earliest-feasible activity matching.

use ean_core::{EventId, Horizon, Seconds, time::normalize};
use ean_network::{Activity, ActivityKind, AperiodicNetwork, Event, PeriodicActivity, PeriodicEvent};

use crate::RolloutResult;

/// Rolled-out instances of every periodic event, indexed by
/// `PeriodicEventId::index()`, each list ascending by time.
pub(crate) type Instances = Vec<Vec<(Seconds, EventId)>>;

/// Occurrence times of `event` within one period, ascending.
///
/// With `spread`, every timetable time `p` is repeated `f` times at
/// `p + i * period / f` for `i in 0..f`.
pub(crate) fn occurrence_times(event: &PeriodicEvent, period: Seconds, spread: bool) -> Vec<Seconds> {
    let f = Seconds::from(event.frequency.max(1));
    let mut times: Vec<Seconds> = if spread {
        event
            .times
            .iter()
            .flat_map(|&p| (0..f).map(move |i| normalize(p + i * period / f, period)))
            .collect()
    } else {
        event.times.clone()
    };
    times.sort_unstable();
    times.dedup();
    times
}

/// Create one aperiodic event per occurrence inside `horizon`.  Ids of one
/// periodic event's instances increase with time.
pub(crate) fn roll_out_events(
    network: &mut AperiodicNetwork,
    events:  &[PeriodicEvent],
    horizon: Horizon,
    period:  Seconds,
    spread:  bool,
) -> Instances {
    let mut instances = Vec::with_capacity(events.len());
    for pe in events {
        let weight = pe.weight / f64::from(pe.frequency.max(1));
        let mut absolute: Vec<Seconds> = occurrence_times(pe, period, spread)
            .into_iter()
            .flat_map(|p| horizon.occurrences(p, period))
            .collect();
        absolute.sort_unstable();

        let list = absolute
            .into_iter()
            .map(|t| {
                let mut event = Event::new(pe.id, pe.kind, pe.station, t, weight);
                event.start_of_trip = pe.start_of_trip;
                event.end_of_trip = pe.end_of_trip;
                (t, network.add_event(event))
            })
            .collect();
        instances.push(list);
    }
    instances
}

/// Connect every source instance to the first target instance that is at
/// least `lower` seconds later.  Source instances without such a target get
/// no activity.
pub(crate) fn match_earliest(
    network:  &mut AperiodicNetwork,
    activity: &PeriodicActivity,
    kind:     ActivityKind,
    sources:  &[(Seconds, EventId)],
    targets:  &[(Seconds, EventId)],
    weight:   f64,
) -> RolloutResult<usize> {
    let mut created = 0;
    for &(src_time, src) in sources {
        let first = targets.partition_point(|&(t, _)| t - src_time < activity.lower);
        let Some(&(_, tgt)) = targets[first..].iter().find(|&&(_, t)| t != src) else {
            continue;
        };
        network.add_activity(Activity::new(
            activity.id,
            kind,
            src,
            tgt,
            activity.lower,
            activity.upper,
            weight,
        ))?;
        created += 1;
    }
    Ok(created)
}
