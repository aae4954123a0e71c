//! `ean-io`: the toolkit's `;`-separated tables.
//!
//! Every stage of the pipeline reads and writes whole tables through this
//! crate.  The format itself lives in [`table`]; the remaining modules map
//! one table family each onto the in-memory types of `ean-network`.
//!
//! | Module        | Tables                                                          |
//! |---------------|-----------------------------------------------------------------|
//! | [`table`]     | format: `Row`, `for_each_row`, `TableWriter`                    |
//! | [`periodic`]  | periodic events, activities, timetable, line pool, PTN, headways |
//! | [`aperiodic`] | aperiodic events, activities, trip ends                         |
//! | [`delays`]    | event/activity delays, disposition timetable                    |
//! | [`demand`]    | OD, passenger paths, expanded OD                                |
//! | [`report`]    | `key; value` statistics                                         |
//!
//! Functions come in two flavours: `read_*` / `write_*` work on any
//! `Read` / `Write`, `load_*` / `save_*` open the named file.

pub mod aperiodic;
pub mod delays;
pub mod demand;
pub mod error;
pub mod periodic;
pub mod report;
pub mod table;

#[cfg(test)]
mod tests;

pub use aperiodic::{NetworkFiles, load_network, read_network, save_network};
pub use delays::{DelayFiles, load_delays, load_dispo_timetable, save_delays, save_dispo_timetable};
pub use demand::{load_od, load_paths, save_expanded_od, save_paths};
pub use error::{IoError, IoResult};
pub use periodic::{PeriodicFiles, load_periodic_network, load_ptn};
pub use report::{load_statistics, save_statistics};
pub use table::{Row, TableWriter, for_each_row, for_each_row_in};
