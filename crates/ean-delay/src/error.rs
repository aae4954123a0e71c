use ean_core::{CoreError, StationId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DelayError {
    #[error("{requested} delays requested but only {available} candidates exist")]
    TooFewCandidates { requested: usize, available: usize },

    #[error("no event takes place at station {0}")]
    UnknownStation(StationId),

    #[error("the network has no {0} to choose from")]
    NothingToChoose(&'static str),

    #[error("propagation found a cycle: {unresolved} events could not be ordered")]
    Cycle { unresolved: usize },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type DelayResult<T> = Result<T, DelayError>;
