//! `key; value` statistic tables.

use std::fmt::Display;
use std::io::{Read, Write};
use std::path::Path;

use crate::aperiodic::{create, open};
use crate::table::{TableWriter, for_each_row};
use crate::IoResult;

pub const STATISTICS_HEADER: &str = "key; value";

pub fn write_statistics<W, I, K, V>(entries: I, writer: W) -> IoResult<W>
where
    W: Write,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    let mut w = TableWriter::new(writer, STATISTICS_HEADER)?;
    for (key, value) in entries {
        w.write_row([key.as_ref().to_owned(), value.to_string()])?;
    }
    w.finish()
}

pub fn read_statistics<R: Read>(reader: R) -> IoResult<Vec<(String, String)>> {
    let mut entries = Vec::new();
    for_each_row(reader, "statistics", |row| {
        entries.push((row.text(0, "key")?.to_owned(), row.text(1, "value")?.to_owned()));
        Ok(())
    })?;
    Ok(entries)
}

pub fn save_statistics<I, K, V>(entries: I, path: &Path) -> IoResult<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    write_statistics(entries, create(path)?)?;
    Ok(())
}

pub fn load_statistics(path: &Path) -> IoResult<Vec<(String, String)>> {
    read_statistics(open(path)?)
}
