//! Periodic input tables → [`PeriodicNetwork`].
//!
//! | Table               | Columns                                             |
//! |---------------------|-----------------------------------------------------|
//! | periodic events     | `id; type; station; line; weight`                   |
//! | periodic activities | `id; type; source; target; lower; upper; weight`    |
//! | periodic timetable  | `event id; time`                                    |
//! | line pool           | `line id; position; edge id; frequency`             |
//! | PTN edges           | `id; left station; right station; …`                |
//! | edge headways       | `edge id; minimum headway`                          |
//!
//! Event, activity and edge ids must be numbered `1..=n` in file order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use ean_core::{
    CoreError, EdgeId, LineId, PeriodicEventId, Seconds, StationId,
};
use ean_network::{ActivityType, EventKind, PeriodicNetwork, PeriodicNetworkBuilder, Ptn};

use crate::table::for_each_row_in;
use crate::IoResult;

/// Locations of the periodic input tables.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PeriodicFiles {
    pub events:     PathBuf,
    pub activities: PathBuf,
    pub timetable:  PathBuf,
    pub line_pool:  Option<PathBuf>,
    pub edges:      Option<PathBuf>,
    pub headways:   Option<PathBuf>,
}

/// Load and validate the periodic network described by `files`.
pub fn load_periodic_network(files: &PeriodicFiles, period: Seconds) -> IoResult<PeriodicNetwork> {
    let ptn = load_ptn(
        files.edges.as_deref(),
        files.headways.as_deref(),
        files.line_pool.as_deref(),
    )?;

    let mut builder = PeriodicNetworkBuilder::new(period).ptn(ptn);

    for_each_row_in(&files.events, |row| {
        let id: u32 = row.get(0, "event id")?;
        let expected = builder.event_count() as u32 + 1;
        if id != expected {
            return Err(CoreError::NotContiguous { what: "periodic event", expected, found: id }.into());
        }
        let kind: EventKind = row.get(1, "event type")?;
        let station = StationId(row.get(2, "station id")?);
        let line = LineId(row.get(3, "line id")?);
        let weight: f64 = row.get(4, "weight")?;
        builder.add_event(kind, station, line, weight);
        Ok(())
    })?;

    let mut activity_count = 0u32;
    for_each_row_in(&files.activities, |row| {
        let id: u32 = row.get(0, "activity id")?;
        activity_count += 1;
        if id != activity_count {
            return Err(CoreError::NotContiguous {
                what:     "periodic activity",
                expected: activity_count,
                found:    id,
            }
            .into());
        }
        let activity_type: ActivityType = row.get(1, "activity type")?;
        let source = PeriodicEventId(row.get(2, "source event")?);
        let target = PeriodicEventId(row.get(3, "target event")?);
        let lower = row.get_int(4, "lower bound")?;
        let upper = row.get_int(5, "upper bound")?;
        let weight: f64 = row.get(6, "weight")?;
        builder.add_activity(activity_type, source, target, lower, upper, weight);
        Ok(())
    })?;

    for_each_row_in(&files.timetable, |row| {
        let event = PeriodicEventId(row.get(0, "event id")?);
        let time = row.get_int(1, "time")?;
        builder.set_time(event, time)?;
        Ok(())
    })?;

    let network = builder.build()?;
    debug!(
        events = network.event_count(),
        activities = network.activity_count(),
        "loaded periodic network"
    );
    Ok(network)
}

/// Load PTN edges, block headways and the line pool.  Each table is
/// optional; a missing one leaves the corresponding data empty.
pub fn load_ptn(
    edges: Option<&Path>,
    headways: Option<&Path>,
    line_pool: Option<&Path>,
) -> IoResult<Ptn> {
    let mut ptn = Ptn::new();

    if let Some(path) = edges {
        for_each_row_in(path, |row| {
            let id: u32 = row.get(0, "edge id")?;
            let left = StationId(row.get(1, "left station")?);
            let right = StationId(row.get(2, "right station")?);
            let assigned = ptn.add_edge(left, right);
            if assigned.0 != id {
                return Err(CoreError::NotContiguous {
                    what:     "PTN edge",
                    expected: assigned.0,
                    found:    id,
                }
                .into());
            }
            Ok(())
        })?;
    }

    if let Some(path) = headways {
        for_each_row_in(path, |row| {
            let edge = EdgeId(row.get(0, "edge id")?);
            let headway = row.get_int(1, "headway")?;
            ptn.set_headway(edge, headway)?;
            Ok(())
        })?;
    }

    if let Some(path) = line_pool {
        let mut entries: Vec<(LineId, i64, EdgeId, u32)> = Vec::new();
        for_each_row_in(path, |row| {
            let line = LineId(row.get(0, "line id")?);
            let position = row.get_int(1, "edge position")?;
            let edge = EdgeId(row.get(2, "edge id")?);
            let raw = row.get_int(3, "frequency")?;
            let frequency = u32::try_from(raw)
                .map_err(|_| row.error(format!("frequency {raw} out of range")))?;
            entries.push((line, position, edge, frequency));
            Ok(())
        })?;
        // Stable: rows of one line keep file order on equal positions.
        entries.sort_by_key(|&(line, position, _, _)| (line, position));
        for (line, _, edge, frequency) in entries {
            ptn.push_line_edge(line, edge, frequency);
        }
    }

    Ok(ptn)
}
