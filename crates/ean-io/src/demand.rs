//! OD demand, passenger paths and the expanded OD table.
//!
//! | Table        | Columns                                                              |
//! |--------------|----------------------------------------------------------------------|
//! | OD           | `origin; destination; customers`                                     |
//! | paths        | `weight; origin event; destination event; origin; destination; changes` |
//! | expanded OD  | `origin; destination; departure; weight`                             |
//!
//! `changes` is a comma-separated list of change activity ids, empty for a
//! direct path.

use std::io::{Read, Write};
use std::path::Path;

use ean_core::{ActivityId, EventId, StationId};
use ean_network::{ExpandedOd, OdPair, PathRecord};

use crate::aperiodic::{create, open};
use crate::table::{TableWriter, for_each_row};
use crate::IoResult;

pub const PATHS_HEADER: &str =
    "weight; origin-event-id; destination-event-id; origin-stop-id; destination-stop-id; change-activity-ids";
pub const EXPANDED_OD_HEADER: &str = "origin; destination; departure-time; customers";

/// Read OD pairs in file order.  Rows with zero customers are kept; the
/// router skips them.
pub fn read_od<R: Read>(reader: R) -> IoResult<Vec<OdPair>> {
    let mut pairs = Vec::new();
    for_each_row(reader, "OD", |row| {
        let customers: f64 = row.get(2, "customers")?;
        if customers < 0.0 {
            return Err(row.error(format!("negative demand {customers}")));
        }
        pairs.push(OdPair {
            origin: StationId(row.get(0, "origin")?),
            destination: StationId(row.get(1, "destination")?),
            customers,
        });
        Ok(())
    })?;
    Ok(pairs)
}

pub fn load_od(path: &Path) -> IoResult<Vec<OdPair>> {
    read_od(open(path)?)
}

pub fn write_paths<'a, W, I>(records: I, writer: W) -> IoResult<W>
where
    W: Write,
    I: IntoIterator<Item = &'a PathRecord>,
{
    let mut w = TableWriter::new(writer, PATHS_HEADER)?;
    for r in records {
        let changes = r
            .changes
            .iter()
            .map(|a| a.0.to_string())
            .collect::<Vec<_>>()
            .join(",");
        w.write_row([
            r.weight.to_string(),
            r.origin_event.0.to_string(),
            r.destination_event.0.to_string(),
            r.origin.0.to_string(),
            r.destination.0.to_string(),
            changes,
        ])?;
    }
    w.finish()
}

pub fn read_paths<R: Read>(reader: R) -> IoResult<Vec<PathRecord>> {
    let mut records = Vec::new();
    for_each_row(reader, "passenger paths", |row| {
        let raw = row.get_or(5, "change activities", String::new())?;
        let mut changes = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let id: u32 = part
                .parse()
                .map_err(|_| row.error(format!("invalid change activity id {part:?}")))?;
            changes.push(ActivityId(id));
        }
        records.push(PathRecord {
            weight: row.get(0, "weight")?,
            origin_event: EventId(row.get(1, "origin event")?),
            destination_event: EventId(row.get(2, "destination event")?),
            origin: StationId(row.get(3, "origin station")?),
            destination: StationId(row.get(4, "destination station")?),
            changes,
        });
        Ok(())
    })?;
    Ok(records)
}

pub fn save_paths(records: &[PathRecord], path: &Path) -> IoResult<()> {
    write_paths(records, create(path)?)?;
    Ok(())
}

pub fn load_paths(path: &Path) -> IoResult<Vec<PathRecord>> {
    read_paths(open(path)?)
}

pub fn write_expanded_od<W: Write>(rows: &[ExpandedOd], writer: W) -> IoResult<W> {
    let mut w = TableWriter::new(writer, EXPANDED_OD_HEADER)?;
    for r in rows {
        w.write_row([
            r.origin.0.to_string(),
            r.destination.0.to_string(),
            r.departure.to_string(),
            r.weight.to_string(),
        ])?;
    }
    w.finish()
}

pub fn save_expanded_od(rows: &[ExpandedOd], path: &Path) -> IoResult<()> {
    write_expanded_od(rows, create(path)?)?;
    Ok(())
}
