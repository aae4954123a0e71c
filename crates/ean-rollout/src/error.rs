use ean_core::{CoreError, Horizon, Seconds};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RolloutError {
    #[error("rollout over {horizon} produced an empty network")]
    Empty { horizon: Horizon },

    #[error("configured period {configured} does not match the periodic network period {network}")]
    PeriodMismatch { configured: Seconds, network: Seconds },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type RolloutResult<T> = Result<T, RolloutError>;
