//! Removal of incomplete trips.

use std::collections::VecDeque;

use ean_core::EventId;
use ean_network::{AperiodicNetwork, Event};

/// Counts of what a pruning pass removed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Pruned {
    pub events:     usize,
    pub activities: usize,
}

/// An event is incomplete when its trip is cut off on either side: no
/// incoming drive/wait although its periodic event does not start a trip, or
/// no outgoing drive/wait although it does not end one.
///
/// The `start_of_trip` / `end_of_trip` flags still hold the periodic values
/// at this point.
fn is_incomplete(network: &AperiodicNetwork, event: &Event) -> bool {
    let has_in = network.incoming(event.id).any(|a| a.kind.is_trip());
    let has_out = network.outgoing(event.id).any(|a| a.kind.is_trip());
    (!has_in && !event.start_of_trip) || (!has_out && !event.end_of_trip)
}

/// Remove incomplete events breadth-first.  When a removed activity was part
/// of a trip, its other endpoint is examined again.
pub(crate) fn whole_trips(network: &mut AperiodicNetwork) -> Pruned {
    let mut pruned = Pruned::default();
    let mut queue: VecDeque<EventId> = network.events().map(|e| e.id).collect();

    while let Some(id) = queue.pop_front() {
        let incomplete = match network.event(id) {
            Some(event) => is_incomplete(network, event),
            None => continue,
        };
        if !incomplete {
            continue;
        }
        let Some((_, removed)) = network.remove_event(id) else { continue };
        pruned.events += 1;
        pruned.activities += removed.len();
        for activity in removed.iter().filter(|a| a.kind.is_trip()) {
            let other = if activity.source == id { activity.target } else { activity.source };
            queue.push_back(other);
        }
    }
    pruned
}

/// Non-cascading cleanup: drop activities whose endpoint is gone and events
/// without any activity.
pub(crate) fn dangling(network: &mut AperiodicNetwork) -> Pruned {
    let mut pruned = Pruned::default();

    let dangling: Vec<_> = network
        .activities()
        .filter(|a| network.event(a.source).is_none() || network.event(a.target).is_none())
        .map(|a| a.id)
        .collect();
    for id in dangling {
        if network.remove_activity(id).is_some() {
            pruned.activities += 1;
        }
    }

    let isolated: Vec<EventId> = network
        .events()
        .filter(|e| network.incoming(e.id).next().is_none() && network.outgoing(e.id).next().is_none())
        .map(|e| e.id)
        .collect();
    for id in isolated {
        if network.remove_event(id).is_some() {
            pruned.events += 1;
        }
    }
    pruned
}
