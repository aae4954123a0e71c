//! The periodic event-activity network and its builder.
//!
//! The model is read-only once built.  [`PeriodicNetworkBuilder`] accepts
//! events, activities and timetable entries in table order, then
//! [`build`](PeriodicNetworkBuilder::build) validates them, drops sync
//! activities, resolves line frequencies and derives the trip start/end
//! flags.

use ean_core::{
    CoreError, CoreResult, LineId, PeriodicActivityId, PeriodicEventId, Seconds, StationId,
};

use crate::kind::{ActivityType, EventKind};
use crate::ptn::Ptn;

// ── PeriodicEvent ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicEvent {
    pub id:            PeriodicEventId,
    pub kind:          EventKind,
    pub station:       StationId,
    pub line:          LineId,
    /// Passengers per period.
    pub weight:        f64,
    /// Occurrences per period.
    pub frequency:     u32,
    /// Occurrence times within `[0, period)`.
    pub times:         Vec<Seconds>,
    pub start_of_trip: bool,
    pub end_of_trip:   bool,
}

// ── PeriodicActivity ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicActivity {
    pub id:            PeriodicActivityId,
    pub activity_type: ActivityType,
    pub source:        PeriodicEventId,
    pub target:        PeriodicEventId,
    pub lower:         Seconds,
    pub upper:         Seconds,
    pub weight:        f64,
}

// ── PeriodicNetwork ───────────────────────────────────────────────────────────

/// Periodic EAN.  Do not construct directly; use [`PeriodicNetworkBuilder`].
#[derive(Clone, Debug)]
pub struct PeriodicNetwork {
    pub period:     Seconds,
    /// Indexed by `PeriodicEventId::index()`.
    pub events:     Vec<PeriodicEvent>,
    /// Non-sync activities in table order.  Ids keep their table value, so
    /// they may have gaps where sync activities were dropped.
    pub activities: Vec<PeriodicActivity>,
    pub ptn:        Ptn,
}

impl PeriodicNetwork {
    #[inline]
    pub fn event(&self, id: PeriodicEventId) -> &PeriodicEvent {
        &self.events[id.index()]
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    /// Minimum block headway of the PTN edge a drive activity runs over.
    ///
    /// `None` when the PTN has no edge between the activity's two stations.
    pub fn block_headway(&self, activity: &PeriodicActivity) -> Option<Seconds> {
        let source = self.event(activity.source);
        let target = self.event(activity.target);
        self.ptn
            .edge_between(source.line, source.station, target.station)
            .map(|edge| self.ptn.headway(edge))
    }
}

// ── PeriodicNetworkBuilder ────────────────────────────────────────────────────

/// Construct a [`PeriodicNetwork`] incrementally, then call
/// [`build`](Self::build).
///
/// # Example
///
/// ```
/// use ean_core::{LineId, StationId};
/// use ean_network::{ActivityType, EventKind, PeriodicNetworkBuilder};
///
/// let mut b = PeriodicNetworkBuilder::new(60);
/// let dep = b.add_event(EventKind::Departure, StationId(1), LineId(1), 10.0);
/// let arr = b.add_event(EventKind::Arrival, StationId(2), LineId(1), 10.0);
/// b.add_activity(ActivityType::Drive, dep, arr, 5, 15, 10.0);
/// b.set_time(dep, 0).unwrap();
/// b.set_time(arr, 10).unwrap();
/// let net = b.build().unwrap();
/// assert!(net.event(dep).start_of_trip);
/// assert!(!net.event(arr).start_of_trip);
/// ```
pub struct PeriodicNetworkBuilder {
    period:     Seconds,
    events:     Vec<RawEvent>,
    activities: Vec<PeriodicActivity>,
    ptn:        Ptn,
}

struct RawEvent {
    kind:    EventKind,
    station: StationId,
    line:    LineId,
    weight:  f64,
    times:   Vec<Seconds>,
}

impl PeriodicNetworkBuilder {
    pub fn new(period: Seconds) -> Self {
        Self {
            period,
            events:     Vec::new(),
            activities: Vec::new(),
            ptn:        Ptn::new(),
        }
    }

    /// Add an event and return its id (sequential from 1).
    pub fn add_event(
        &mut self,
        kind: EventKind,
        station: StationId,
        line: LineId,
        weight: f64,
    ) -> PeriodicEventId {
        let id = PeriodicEventId::from_index(self.events.len());
        self.events.push(RawEvent { kind, station, line, weight, times: Vec::new() });
        id
    }

    /// Add an activity and return its id (sequential from 1, sync included).
    pub fn add_activity(
        &mut self,
        activity_type: ActivityType,
        source: PeriodicEventId,
        target: PeriodicEventId,
        lower: Seconds,
        upper: Seconds,
        weight: f64,
    ) -> PeriodicActivityId {
        let id = PeriodicActivityId::from_index(self.activities.len());
        self.activities.push(PeriodicActivity {
            id,
            activity_type,
            source,
            target,
            lower,
            upper,
            weight,
        });
        id
    }

    /// Append a periodic timetable time to `event`.  An event may have
    /// several rows; each adds one occurrence.
    pub fn set_time(&mut self, event: PeriodicEventId, time: Seconds) -> CoreResult<()> {
        let slot = event.is_valid().then(|| event.index());
        match slot.and_then(|s| self.events.get_mut(s)) {
            Some(raw) => {
                raw.times.push(time);
                Ok(())
            }
            None => Err(CoreError::MissingReference {
                what:  "periodic event",
                id:    event.0,
                owner: "periodic timetable".into(),
            }),
        }
    }

    /// Install the PTN, line pool and headway data.
    pub fn ptn(mut self, ptn: Ptn) -> Self {
        self.ptn = ptn;
        self
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Validate the inputs and produce the network.
    pub fn build(self) -> CoreResult<PeriodicNetwork> {
        if self.period <= 0 {
            return Err(CoreError::Config(format!("period must be positive, got {}", self.period)));
        }

        // ── Events ────────────────────────────────────────────────────────
        let mut events = Vec::with_capacity(self.events.len());
        for (slot, raw) in self.events.into_iter().enumerate() {
            let id = PeriodicEventId::from_index(slot);
            if raw.times.is_empty() {
                return Err(CoreError::Input(format!("periodic event {} has no timetable entry", id.0)));
            }
            if let Some(time) = raw.times.iter().find(|t| !(0..self.period).contains(*t)) {
                return Err(CoreError::Input(format!(
                    "periodic event {} has time {time} outside [0, {})",
                    id.0, self.period
                )));
            }
            let frequency = self.ptn.frequency(raw.line).unwrap_or(1);
            if frequency == 0 {
                return Err(CoreError::Input(format!(
                    "line {} of periodic event {} has frequency 0",
                    raw.line.0, id.0
                )));
            }
            events.push(PeriodicEvent {
                id,
                kind: raw.kind,
                station: raw.station,
                line: raw.line,
                weight: raw.weight,
                frequency,
                times: raw.times,
                start_of_trip: true,
                end_of_trip: true,
            });
        }

        // ── Activities ────────────────────────────────────────────────────
        let mut activities = Vec::with_capacity(self.activities.len());
        for a in self.activities {
            for endpoint in [a.source, a.target] {
                if !endpoint.is_valid() || endpoint.index() >= events.len() {
                    return Err(CoreError::MissingReference {
                        what:  "periodic event",
                        id:    endpoint.0,
                        owner: format!("periodic activity {}", a.id.0),
                    });
                }
            }
            if a.lower > a.upper {
                return Err(CoreError::BoundsInverted {
                    what:  "periodic activity",
                    id:    a.id.0,
                    lower: a.lower,
                    upper: a.upper,
                });
            }
            if a.activity_type == ActivityType::Sync {
                continue;
            }
            if a.activity_type.is_trip() {
                events[a.source.index()].end_of_trip = false;
                events[a.target.index()].start_of_trip = false;
            }
            activities.push(a);
        }

        Ok(PeriodicNetwork {
            period: self.period,
            events,
            activities,
            ptn: self.ptn,
        })
    }
}
