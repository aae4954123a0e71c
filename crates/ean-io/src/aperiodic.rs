//! Aperiodic network tables.
//!
//! | Table                | Columns                                                   |
//! |----------------------|-----------------------------------------------------------|
//! | aperiodic events     | `id; periodic id; type; time; weight; station`            |
//! | aperiodic activities | `id; periodic id; type; source; target; lower; upper; weight` |
//! | trip end events      | `event id`                                                |

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use ean_core::{
    CoreError, EventId, PeriodicActivityId, PeriodicEventId, StationId,
};
use ean_network::{Activity, ActivityKind, ActivityType, AperiodicNetwork, Event, EventKind};

use crate::table::{TableWriter, for_each_row};
use crate::{IoError, IoResult};

pub const EVENTS_HEADER: &str = "event-id; periodic-id; type; time; passengers; stop-id";
pub const ACTIVITIES_HEADER: &str =
    "activity-id; periodic-id; type; tail-event-id; head-event-id; lower-bound; upper-bound; passengers";
pub const TRIP_ENDS_HEADER: &str = "event-id";

/// Locations of the aperiodic network tables.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NetworkFiles {
    pub events:     PathBuf,
    pub activities: PathBuf,
    pub trip_ends:  Option<PathBuf>,
}

// ── Writing ───────────────────────────────────────────────────────────────────

pub fn write_events<W: Write>(network: &AperiodicNetwork, writer: W) -> IoResult<W> {
    let mut w = TableWriter::new(writer, EVENTS_HEADER)?;
    for e in network.events() {
        w.write_row([
            e.id.0.to_string(),
            e.periodic_id.0.to_string(),
            e.kind.as_str().to_owned(),
            e.time.to_string(),
            e.weight.to_string(),
            e.station.0.to_string(),
        ])?;
    }
    w.finish()
}

pub fn write_activities<W: Write>(network: &AperiodicNetwork, writer: W) -> IoResult<W> {
    let mut w = TableWriter::new(writer, ACTIVITIES_HEADER)?;
    for a in network.activities() {
        w.write_row([
            a.id.0.to_string(),
            a.periodic_id.0.to_string(),
            a.kind.activity_type().as_str().to_owned(),
            a.source.0.to_string(),
            a.target.0.to_string(),
            a.lower.to_string(),
            a.upper.to_string(),
            a.weight.to_string(),
        ])?;
    }
    w.finish()
}

/// List every event flagged as the end of a trip.
pub fn write_trip_ends<W: Write>(network: &AperiodicNetwork, writer: W) -> IoResult<W> {
    let mut w = TableWriter::new(writer, TRIP_ENDS_HEADER)?;
    for e in network.events().filter(|e| e.end_of_trip) {
        w.write_row([e.id.0.to_string()])?;
    }
    w.finish()
}

/// Write all network tables named in `files`.
///
/// The network must be compact so that written ids are `1..=n`.
pub fn save_network(network: &AperiodicNetwork, files: &NetworkFiles) -> IoResult<()> {
    if !network.is_compact() {
        return Err(CoreError::Input("network must be renumbered before it is written".into()).into());
    }
    write_events(network, create(&files.events)?)?;
    write_activities(network, create(&files.activities)?)?;
    if let Some(path) = &files.trip_ends {
        write_trip_ends(network, create(path)?)?;
    }
    debug!(
        events = network.event_count(),
        activities = network.activity_count(),
        "wrote aperiodic network"
    );
    Ok(())
}

// ── Reading ───────────────────────────────────────────────────────────────────

/// Read an aperiodic network.  Ids must be `1..=n`; trip flags are derived
/// from the structure and disposition times start at the planned times.
pub fn read_network<R1: Read, R2: Read>(events: R1, activities: R2) -> IoResult<AperiodicNetwork> {
    let mut network = AperiodicNetwork::new();

    for_each_row(events, "aperiodic events", |row| {
        let id: u32 = row.get(0, "event id")?;
        let periodic_id = PeriodicEventId(row.get(1, "periodic event id")?);
        let kind: EventKind = row.get(2, "event type")?;
        let time = row.get_int(3, "time")?;
        let weight: f64 = row.get(4, "weight")?;
        let station = StationId(row.get(5, "station id")?);
        let assigned = network.add_event(Event::new(periodic_id, kind, station, time, weight));
        if assigned.0 != id {
            return Err(CoreError::NotContiguous { what: "event", expected: assigned.0, found: id }.into());
        }
        Ok(())
    })?;

    for_each_row(activities, "aperiodic activities", |row| {
        let id: u32 = row.get(0, "activity id")?;
        let periodic_id = PeriodicActivityId(row.get(1, "periodic activity id")?);
        let activity_type: ActivityType = row.get(2, "activity type")?;
        let source = EventId(row.get(3, "source event")?);
        let target = EventId(row.get(4, "target event")?);
        let lower = row.get_int(5, "lower bound")?;
        let upper = row.get_int(6, "upper bound")?;
        let weight: f64 = row.get(7, "weight")?;
        let kind = ActivityKind::from_type(activity_type)
            .ok_or_else(|| row.error("sync activities have no aperiodic counterpart".into()))?;
        let assigned = network.add_activity(Activity::new(
            periodic_id, kind, source, target, lower, upper, weight,
        ))?;
        if assigned.0 != id {
            return Err(CoreError::NotContiguous { what: "activity", expected: assigned.0, found: id }.into());
        }
        Ok(())
    })?;

    network.refresh_trip_flags();
    Ok(network)
}

pub fn load_network(files: &NetworkFiles) -> IoResult<AperiodicNetwork> {
    let network = read_network(open(&files.events)?, open(&files.activities)?)?;
    debug!(
        events = network.event_count(),
        activities = network.activity_count(),
        "loaded aperiodic network"
    );
    Ok(network)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

pub(crate) fn open(path: &Path) -> IoResult<File> {
    File::open(path).map_err(|source| IoError::Open { path: path.to_path_buf(), source })
}

pub(crate) fn create(path: &Path) -> IoResult<File> {
    File::create(path).map_err(|source| IoError::Open { path: path.to_path_buf(), source })
}
