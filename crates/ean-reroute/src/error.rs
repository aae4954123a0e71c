use ean_core::{CoreError, StationId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RerouteError {
    #[error("demand {customers} from {origin} to {destination} is not a finite non-negative number")]
    InvalidDemand {
        origin:      StationId,
        destination: StationId,
        customers:   f64,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type RerouteResult<T> = Result<T, RerouteError>;
