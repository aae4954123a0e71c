//! The aperiodic (rolled-out) event-activity network.
//!
//! # Data layout
//!
//! Events and activities live in two arenas addressed by their 1-based id:
//!
//! ```text
//! events[id.index()]      : Option<Event>      (None = removed)
//! activities[id.index()]  : Option<Activity>
//! ```
//!
//! Each event keeps the ids of its incoming and outgoing activities.  Removing
//! an element only vacates its slot, so ids held elsewhere stay valid while a
//! pass is running.  [`AperiodicNetwork::compact`] closes the gaps and
//! renumbers both arenas to `1..=n`; call it at stage boundaries only.

use ean_core::{
    ActivityId, CoreError, CoreResult, EventId, PeriodicActivityId, PeriodicEventId, Seconds,
    StationId,
};

use crate::kind::{ActivityType, EventKind};

// ── Event ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub id:            EventId,
    pub periodic_id:   PeriodicEventId,
    pub kind:          EventKind,
    pub station:       StationId,
    /// Planned absolute time.
    pub time:          Seconds,
    pub weight:        f64,
    pub start_of_trip: bool,
    pub end_of_trip:   bool,
    /// Delay injected at this event.
    pub source_delay:  Seconds,
    /// Disposition time; equals `time` until delays are propagated.
    pub dispo_time:    Seconds,
    pub incoming:      Vec<ActivityId>,
    pub outgoing:      Vec<ActivityId>,
}

impl Event {
    /// A fresh, unconnected event.  The id is assigned on insertion.
    pub fn new(
        periodic_id: PeriodicEventId,
        kind: EventKind,
        station: StationId,
        time: Seconds,
        weight: f64,
    ) -> Self {
        Self {
            id: EventId::INVALID,
            periodic_id,
            kind,
            station,
            time,
            weight,
            start_of_trip: false,
            end_of_trip: false,
            source_delay: 0,
            dispo_time: time,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    #[inline]
    pub fn is_arrival(&self) -> bool {
        self.kind == EventKind::Arrival
    }

    /// Disposition delay, never negative.
    #[inline]
    pub fn delay(&self) -> Seconds {
        (self.dispo_time - self.time).max(0)
    }
}

// ── Activity ──────────────────────────────────────────────────────────────────

/// Activity type plus the state only some types carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActivityKind {
    Drive,
    Wait,
    Turnaround,
    /// `missed` is the `z` flag: the connection is not maintained.
    Change { missed: bool },
    /// `swapped` is the `g` flag: the two vehicles run in reversed order.
    Headway { swapped: bool },
}

impl ActivityKind {
    /// Aperiodic kind for a table type; `None` for sync.
    pub fn from_type(t: ActivityType) -> Option<Self> {
        match t {
            ActivityType::Drive => Some(ActivityKind::Drive),
            ActivityType::Wait => Some(ActivityKind::Wait),
            ActivityType::Turnaround => Some(ActivityKind::Turnaround),
            ActivityType::Change => Some(ActivityKind::Change { missed: false }),
            ActivityType::Headway => Some(ActivityKind::Headway { swapped: false }),
            ActivityType::Sync => None,
        }
    }

    pub fn activity_type(self) -> ActivityType {
        match self {
            ActivityKind::Drive => ActivityType::Drive,
            ActivityKind::Wait => ActivityType::Wait,
            ActivityKind::Turnaround => ActivityType::Turnaround,
            ActivityKind::Change { .. } => ActivityType::Change,
            ActivityKind::Headway { .. } => ActivityType::Headway,
        }
    }

    #[inline]
    pub fn is_trip(self) -> bool {
        matches!(self, ActivityKind::Drive | ActivityKind::Wait)
    }

    #[inline]
    pub fn is_change(self) -> bool {
        matches!(self, ActivityKind::Change { .. })
    }

    #[inline]
    pub fn is_headway(self) -> bool {
        matches!(self, ActivityKind::Headway { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub id:           ActivityId,
    pub periodic_id:  PeriodicActivityId,
    pub kind:         ActivityKind,
    pub source:       EventId,
    pub target:       EventId,
    pub lower:        Seconds,
    pub upper:        Seconds,
    pub weight:       f64,
    /// Extra duration injected on this activity.
    pub source_delay: Seconds,
}

impl Activity {
    pub fn new(
        periodic_id: PeriodicActivityId,
        kind: ActivityKind,
        source: EventId,
        target: EventId,
        lower: Seconds,
        upper: Seconds,
        weight: f64,
    ) -> Self {
        Self {
            id: ActivityId::INVALID,
            periodic_id,
            kind,
            source,
            target,
            lower,
            upper,
            weight,
            source_delay: 0,
        }
    }

    /// `true` if the change is flagged as missed (`z = 1`).
    #[inline]
    pub fn is_missed(&self) -> bool {
        matches!(self.kind, ActivityKind::Change { missed: true })
    }

    /// `true` if the headway order is swapped (`g = 1`).
    #[inline]
    pub fn is_swapped(&self) -> bool {
        matches!(self.kind, ActivityKind::Headway { swapped: true })
    }
}

// ── AperiodicNetwork ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct AperiodicNetwork {
    events:           Vec<Option<Event>>,
    activities:       Vec<Option<Activity>>,
    live_events:      usize,
    live_activities:  usize,
}

impl AperiodicNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(events: usize, activities: usize) -> Self {
        Self {
            events:          Vec::with_capacity(events),
            activities:      Vec::with_capacity(activities),
            live_events:     0,
            live_activities: 0,
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn event_count(&self) -> usize {
        self.live_events
    }

    pub fn activity_count(&self) -> usize {
        self.live_activities
    }

    pub fn is_empty(&self) -> bool {
        self.live_events == 0
    }

    /// Number of event slots, vacant ones included.  Any `EventId` handed out
    /// so far satisfies `id.index() < event_slots()`.
    pub fn event_slots(&self) -> usize {
        self.events.len()
    }

    // ── Insertion ─────────────────────────────────────────────────────────

    /// Insert `event` and return its id.
    pub fn add_event(&mut self, mut event: Event) -> EventId {
        let id = EventId::from_index(self.events.len());
        event.id = id;
        event.incoming.clear();
        event.outgoing.clear();
        self.events.push(Some(event));
        self.live_events += 1;
        id
    }

    /// Insert `activity` and wire it into its endpoints' incidence lists.
    pub fn add_activity(&mut self, mut activity: Activity) -> CoreResult<ActivityId> {
        let id = ActivityId::from_index(self.activities.len());
        for endpoint in [activity.source, activity.target] {
            if self.event(endpoint).is_none() {
                return Err(CoreError::MissingReference {
                    what:  "event",
                    id:    endpoint.0,
                    owner: format!("activity {}", id.0),
                });
            }
        }
        if activity.lower > activity.upper {
            return Err(CoreError::BoundsInverted {
                what:  "activity",
                id:    id.0,
                lower: activity.lower,
                upper: activity.upper,
            });
        }
        activity.id = id;
        let (source, target) = (activity.source, activity.target);
        self.activities.push(Some(activity));
        self.live_activities += 1;
        if let Some(e) = self.event_mut(source) {
            e.outgoing.push(id);
        }
        if let Some(e) = self.event_mut(target) {
            e.incoming.push(id);
        }
        Ok(id)
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn event(&self, id: EventId) -> Option<&Event> {
        if !id.is_valid() {
            return None;
        }
        self.events.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn event_mut(&mut self, id: EventId) -> Option<&mut Event> {
        if !id.is_valid() {
            return None;
        }
        self.events.get_mut(id.index()).and_then(Option::as_mut)
    }

    #[inline]
    pub fn activity(&self, id: ActivityId) -> Option<&Activity> {
        if !id.is_valid() {
            return None;
        }
        self.activities.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn activity_mut(&mut self, id: ActivityId) -> Option<&mut Activity> {
        if !id.is_valid() {
            return None;
        }
        self.activities.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Live events in id order.
    pub fn events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter_map(Option::as_ref)
    }

    pub fn events_mut(&mut self) -> impl Iterator<Item = &mut Event> + '_ {
        self.events.iter_mut().filter_map(Option::as_mut)
    }

    /// Live activities in id order.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> + '_ {
        self.activities.iter().filter_map(Option::as_ref)
    }

    pub fn activities_mut(&mut self) -> impl Iterator<Item = &mut Activity> + '_ {
        self.activities.iter_mut().filter_map(Option::as_mut)
    }

    /// Live incoming activities of `event`.
    pub fn incoming(&self, event: EventId) -> impl Iterator<Item = &Activity> + '_ {
        self.event(event)
            .map(|e| e.incoming.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&a| self.activity(a))
    }

    /// Live outgoing activities of `event`.
    pub fn outgoing(&self, event: EventId) -> impl Iterator<Item = &Activity> + '_ {
        self.event(event)
            .map(|e| e.outgoing.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&a| self.activity(a))
    }

    // ── Removal ───────────────────────────────────────────────────────────

    /// Vacate the slot of `id` and unlink it from both endpoints.
    pub fn remove_activity(&mut self, id: ActivityId) -> Option<Activity> {
        if !id.is_valid() {
            return None;
        }
        let activity = self.activities.get_mut(id.index())?.take()?;
        self.live_activities -= 1;
        if let Some(e) = self.event_mut(activity.source) {
            e.outgoing.retain(|&a| a != id);
        }
        if let Some(e) = self.event_mut(activity.target) {
            e.incoming.retain(|&a| a != id);
        }
        Some(activity)
    }

    /// Vacate the slot of `id` together with every incident activity.
    ///
    /// Returns the event and the removed activities, incoming first.
    pub fn remove_event(&mut self, id: EventId) -> Option<(Event, Vec<Activity>)> {
        let incident: Vec<ActivityId> = {
            let e = self.event(id)?;
            e.incoming.iter().chain(e.outgoing.iter()).copied().collect()
        };
        let mut removed = Vec::with_capacity(incident.len());
        for a in incident {
            if let Some(activity) = self.remove_activity(a) {
                removed.push(activity);
            }
        }
        let event = self.events[id.index()].take()?;
        self.live_events -= 1;
        Some((event, removed))
    }

    // ── Renumbering ───────────────────────────────────────────────────────

    /// Drop vacant slots and renumber events and activities to `1..=n`,
    /// preserving relative order.
    pub fn compact(&mut self) {
        let mut event_map = vec![EventId::INVALID; self.events.len()];
        let mut next = 0usize;
        for (slot, e) in self.events.iter().enumerate() {
            if e.is_some() {
                event_map[slot] = EventId::from_index(next);
                next += 1;
            }
        }

        let mut activity_map = vec![ActivityId::INVALID; self.activities.len()];
        let mut next = 0usize;
        for (slot, a) in self.activities.iter().enumerate() {
            if a.is_some() {
                activity_map[slot] = ActivityId::from_index(next);
                next += 1;
            }
        }

        let activities: Vec<Option<Activity>> = std::mem::take(&mut self.activities)
            .into_iter()
            .flatten()
            .map(|mut a| {
                a.id = activity_map[a.id.index()];
                a.source = event_map[a.source.index()];
                a.target = event_map[a.target.index()];
                Some(a)
            })
            .collect();

        let events: Vec<Option<Event>> = std::mem::take(&mut self.events)
            .into_iter()
            .flatten()
            .map(|mut e| {
                e.id = event_map[e.id.index()];
                for a in e.incoming.iter_mut().chain(e.outgoing.iter_mut()) {
                    *a = activity_map[a.index()];
                }
                Some(e)
            })
            .collect();

        self.events = events;
        self.activities = activities;
        debug_assert_eq!(self.events.len(), self.live_events);
        debug_assert_eq!(self.activities.len(), self.live_activities);
    }

    /// `true` if both arenas are free of gaps, i.e. ids are exactly `1..=n`.
    pub fn is_compact(&self) -> bool {
        self.events.iter().enumerate().all(|(slot, e)| {
            e.as_ref().is_some_and(|e| e.id == EventId::from_index(slot))
        }) && self.activities.iter().enumerate().all(|(slot, a)| {
            a.as_ref().is_some_and(|a| a.id == ActivityId::from_index(slot))
        })
    }

    // ── Derived state ─────────────────────────────────────────────────────

    /// Recompute the trip flags from the structure: an event starts a trip
    /// when no drive/wait activity enters it and ends one when none leaves it.
    pub fn refresh_trip_flags(&mut self) {
        let flags: Vec<(EventId, bool, bool)> = self
            .events()
            .map(|e| {
                let start = !self.incoming(e.id).any(|a| a.kind.is_trip());
                let end = !self.outgoing(e.id).any(|a| a.kind.is_trip());
                (e.id, start, end)
            })
            .collect();
        for (id, start, end) in flags {
            if let Some(e) = self.event_mut(id) {
                e.start_of_trip = start;
                e.end_of_trip = end;
            }
        }
    }

    /// Forget every disposition decision: dispo times back to the plan,
    /// all `z`/`g` flags cleared.
    pub fn reset_disposition(&mut self) {
        for e in self.events_mut() {
            e.dispo_time = e.time;
        }
        for a in self.activities_mut() {
            match &mut a.kind {
                ActivityKind::Change { missed } => *missed = false,
                ActivityKind::Headway { swapped } => *swapped = false,
                _ => {}
            }
        }
    }

    /// Remove every injected delay.
    pub fn clear_source_delays(&mut self) {
        for e in self.events_mut() {
            e.source_delay = 0;
        }
        for a in self.activities_mut() {
            a.source_delay = 0;
        }
    }
}
