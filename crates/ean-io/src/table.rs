//! The toolkit's tabular interchange format.
//!
//! # Format
//!
//! ```text
//! # event-id; type; stop-id; line-id; passengers
//! 1; departure; 1; 1; 10     # trailing comments are allowed
//! 2; arrival; 2; 1; 10
//! ```
//!
//! - fields are separated by `;` and trimmed,
//! - `#` starts a comment that runs to the end of the line,
//! - blank and comment-only lines are skipped,
//! - the header is a leading `#` line and is therefore never parsed.
//!
//! Comments and blank lines are removed before the text reaches the `csv`
//! reader; each remaining line keeps its original line number for error
//! messages.  Fields never span lines.

use std::fmt::Display;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use crate::{IoError, IoResult};

// ── Reading ───────────────────────────────────────────────────────────────────

/// One data line of a table.
pub struct Row<'a> {
    table:  &'a str,
    line:   u64,
    record: &'a StringRecord,
}

impl Row<'_> {
    /// 1-based line number in the source file.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }

    /// Text of column `col`, with surrounding double quotes removed.
    pub fn text(&self, col: usize, what: &str) -> IoResult<&str> {
        self.record
            .get(col)
            .map(|s| s.trim_matches('"').trim())
            .ok_or_else(|| self.error(format!("missing column {} ({what})", col + 1)))
    }

    /// Parse column `col`.
    pub fn get<T>(&self, col: usize, what: &str) -> IoResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.text(col, what)?;
        raw.parse::<T>()
            .map_err(|e| self.error(format!("invalid {what} {raw:?}: {e}")))
    }

    /// Parse column `col`, or return `default` if the row is shorter.
    pub fn get_or<T>(&self, col: usize, what: &str, default: T) -> IoResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        if col >= self.record.len() {
            return Ok(default);
        }
        self.get(col, what)
    }

    /// Integer column that some producers write with a fractional part
    /// (`"10.0"`).
    pub fn get_int(&self, col: usize, what: &str) -> IoResult<i64> {
        let raw = self.text(col, what)?;
        if let Ok(v) = raw.parse::<i64>() {
            return Ok(v);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 => Ok(v as i64),
            _ => Err(self.error(format!("invalid {what} {raw:?}: expected an integer"))),
        }
    }

    pub fn error(&self, message: String) -> IoError {
        IoError::Parse {
            table: self.table.to_owned(),
            line:  self.line,
            message,
        }
    }
}

/// Call `f` for every data row of `reader`, in file order.
pub fn for_each_row<R, F>(mut reader: R, table: &str, mut f: F) -> IoResult<()>
where
    R: Read,
    F: FnMut(&Row<'_>) -> IoResult<()>,
{
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let (data, lines) = strip_comments(&text);

    let mut csv_reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data.as_bytes());

    let mut record = StringRecord::new();
    let mut index = 0;
    while csv_reader.read_record(&mut record)? {
        let line = lines.get(index).copied().unwrap_or(0);
        index += 1;
        if record.iter().all(str::is_empty) {
            continue;
        }
        f(&Row { table, line, record: &record })?;
    }
    Ok(())
}

/// Like [`for_each_row`] but opens `path`.
pub fn for_each_row_in<F>(path: &Path, f: F) -> IoResult<()>
where
    F: FnMut(&Row<'_>) -> IoResult<()>,
{
    let file = File::open(path).map_err(|source| IoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let table = path.display().to_string();
    for_each_row(file, &table, f)
}

/// Drop comments and blank lines.  Returns the remaining data lines joined
/// by `\n` and, for each of them, its 1-based line number in `text`.
fn strip_comments(text: &str) -> (String, Vec<u64>) {
    let mut out = String::with_capacity(text.len());
    let mut lines = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let content = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let content = content.trim();
        if content.is_empty() {
            continue;
        }
        out.push_str(content);
        out.push('\n');
        lines.push(n as u64 + 1);
    }
    (out, lines)
}

// ── Writing ───────────────────────────────────────────────────────────────────

/// Writes one table: a `#` header line followed by `;`-separated rows.
pub struct TableWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl TableWriter<File> {
    /// Create (or truncate) `path` and write the header line.
    pub fn create(path: &Path, header: &str) -> IoResult<Self> {
        let file = File::create(path).map_err(|source| IoError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file, header)
    }
}

impl<W: Write> TableWriter<W> {
    pub fn new(mut writer: W, header: &str) -> IoResult<Self> {
        writeln!(writer, "# {header}")?;
        let inner = WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_writer(writer);
        Ok(Self { inner })
    }

    pub fn write_row<I, T>(&mut self, fields: I) -> IoResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.inner.write_record(fields)?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> IoResult<W> {
        self.inner
            .into_inner()
            .map_err(|e| IoError::Io(e.into_error()))
    }
}
