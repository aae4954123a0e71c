//! Passenger demand and the records the router produces.

use ean_core::{ActivityId, EventId, Seconds, StationId};

/// Demand between two stations over the whole horizon.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OdPair {
    pub origin:      StationId,
    pub destination: StationId,
    pub customers:   f64,
}

/// Passengers assigned to one concrete path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathRecord {
    pub weight:            u64,
    pub origin_event:      EventId,
    pub destination_event: EventId,
    pub origin:            StationId,
    pub destination:       StationId,
    /// Change activities used, in travel order.
    pub changes:           Vec<ActivityId>,
}

/// Share of an OD pair's demand that departs at one time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExpandedOd {
    pub origin:      StationId,
    pub destination: StationId,
    pub departure:   Seconds,
    pub weight:      u64,
}
