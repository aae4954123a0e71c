//! Source delay tables and the disposition timetable.
//!
//! Delay tables hold `id; delay` and list strictly positive delays only.
//! The disposition timetable holds `event id; dispo time` for every event.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ean_core::{ActivityId, CoreError, EventId};
use ean_network::AperiodicNetwork;

use crate::aperiodic::{create, open};
use crate::table::{TableWriter, for_each_row};
use crate::IoResult;

pub const EVENT_DELAYS_HEADER: &str = "event-id; delay";
pub const ACTIVITY_DELAYS_HEADER: &str = "activity-id; delay";
pub const DISPO_HEADER: &str = "event-id; dispo-time";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DelayFiles {
    pub events:     PathBuf,
    pub activities: PathBuf,
}

pub fn write_event_delays<W: Write>(network: &AperiodicNetwork, writer: W) -> IoResult<W> {
    let mut w = TableWriter::new(writer, EVENT_DELAYS_HEADER)?;
    for e in network.events().filter(|e| e.source_delay > 0) {
        w.write_row([e.id.0.to_string(), e.source_delay.to_string()])?;
    }
    w.finish()
}

pub fn write_activity_delays<W: Write>(network: &AperiodicNetwork, writer: W) -> IoResult<W> {
    let mut w = TableWriter::new(writer, ACTIVITY_DELAYS_HEADER)?;
    for a in network.activities().filter(|a| a.source_delay > 0) {
        w.write_row([a.id.0.to_string(), a.source_delay.to_string()])?;
    }
    w.finish()
}

/// Set the source delay of every event listed in `reader`.
pub fn read_event_delays<R: Read>(network: &mut AperiodicNetwork, reader: R) -> IoResult<usize> {
    let mut applied = 0;
    for_each_row(reader, "event delays", |row| {
        let id = EventId(row.get(0, "event id")?);
        let delay = row.get_int(1, "delay")?;
        if delay < 0 {
            return Err(row.error(format!("negative delay {delay}")));
        }
        let event = network.event_mut(id).ok_or_else(|| CoreError::MissingReference {
            what:  "event",
            id:    id.0,
            owner: format!("event delay table line {}", row.line()),
        })?;
        event.source_delay = delay;
        applied += 1;
        Ok(())
    })?;
    Ok(applied)
}

/// Set the source delay of every activity listed in `reader`.
pub fn read_activity_delays<R: Read>(network: &mut AperiodicNetwork, reader: R) -> IoResult<usize> {
    let mut applied = 0;
    for_each_row(reader, "activity delays", |row| {
        let id = ActivityId(row.get(0, "activity id")?);
        let delay = row.get_int(1, "delay")?;
        if delay < 0 {
            return Err(row.error(format!("negative delay {delay}")));
        }
        let activity = network.activity_mut(id).ok_or_else(|| CoreError::MissingReference {
            what:  "activity",
            id:    id.0,
            owner: format!("activity delay table line {}", row.line()),
        })?;
        activity.source_delay = delay;
        applied += 1;
        Ok(())
    })?;
    Ok(applied)
}

pub fn save_delays(network: &AperiodicNetwork, files: &DelayFiles) -> IoResult<()> {
    write_event_delays(network, create(&files.events)?)?;
    write_activity_delays(network, create(&files.activities)?)?;
    Ok(())
}

/// Apply both delay tables.  A missing file counts as an empty table.
pub fn load_delays(network: &mut AperiodicNetwork, files: &DelayFiles) -> IoResult<usize> {
    let mut applied = 0;
    if files.events.exists() {
        applied += read_event_delays(network, open(&files.events)?)?;
    }
    if files.activities.exists() {
        applied += read_activity_delays(network, open(&files.activities)?)?;
    }
    Ok(applied)
}

// ── Disposition timetable ─────────────────────────────────────────────────────

pub fn write_dispo_timetable<W: Write>(network: &AperiodicNetwork, writer: W) -> IoResult<W> {
    let mut w = TableWriter::new(writer, DISPO_HEADER)?;
    for e in network.events() {
        w.write_row([e.id.0.to_string(), e.dispo_time.to_string()])?;
    }
    w.finish()
}

pub fn read_dispo_timetable<R: Read>(network: &mut AperiodicNetwork, reader: R) -> IoResult<()> {
    for_each_row(reader, "disposition timetable", |row| {
        let id = EventId(row.get(0, "event id")?);
        let time = row.get_int(1, "dispo time")?;
        let event = network.event_mut(id).ok_or_else(|| CoreError::MissingReference {
            what:  "event",
            id:    id.0,
            owner: format!("disposition timetable line {}", row.line()),
        })?;
        event.dispo_time = time;
        Ok(())
    })
}

pub fn save_dispo_timetable(network: &AperiodicNetwork, path: &Path) -> IoResult<()> {
    write_dispo_timetable(network, create(path)?)?;
    Ok(())
}

pub fn load_dispo_timetable(network: &mut AperiodicNetwork, path: &Path) -> IoResult<()> {
    read_dispo_timetable(network, open(path)?)
}
