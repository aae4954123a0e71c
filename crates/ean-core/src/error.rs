//! Toolkit error type.
//!
//! The variants mirror the four fatal error kinds of the pipeline:
//! configuration errors, input consistency errors, I/O errors and empty or
//! unsolvable results.  Stage crates wrap `CoreError` in their own enums via
//! `#[from]` so a single `?` carries it up to the binary.

use thiserror::Error;

/// The common error base for every `ean-*` crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{what} ids are not numbered contiguously from 1: expected {expected}, found {found}")]
    NotContiguous {
        what:     &'static str,
        expected: u32,
        found:    u32,
    },

    #[error("{what} {id} referenced by {owner} does not exist")]
    MissingReference {
        what:  &'static str,
        id:    u32,
        owner: String,
    },

    #[error("{what} {id}: lower bound {lower} exceeds upper bound {upper}")]
    BoundsInverted {
        what:  &'static str,
        id:    u32,
        lower: i64,
        upper: i64,
    },

    #[error("input error: {0}")]
    Input(String),

    #[error("empty result: {0}")]
    EmptyNetwork(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `ean-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;

/// Check that `ids`, in table order, are exactly `1, 2, …, n`.
pub fn ensure_contiguous<I>(what: &'static str, ids: I) -> CoreResult<()>
where
    I: IntoIterator<Item = u32>,
{
    for (slot, found) in ids.into_iter().enumerate() {
        let expected = slot as u32 + 1;
        if found != expected {
            return Err(CoreError::NotContiguous { what, expected, found });
        }
    }
    Ok(())
}
