//! `ean-core`: foundational types for the `ean` rollout toolkit.
//!
//! Every other `ean-*` crate depends on this one.  It has no `ean-*`
//! dependencies and only `rand`, `serde` and `thiserror` as external ones.
//!
//! # What lives here
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`ids`]    | `EventId`, `ActivityId`, periodic ids, `StationId`, …      |
//! | [`time`]   | `Seconds`, `Horizon`, `normalize`                          |
//! | [`rng`]    | `DelayRng`                                                 |
//! | [`config`] | `RolloutConfig`, `DelayConfig`, `RerouteConfig`, …         |
//! | [`error`]  | `CoreError`, `CoreResult`, `ensure_contiguous`             |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    DelayConfig, DelayStrategy, EvaluationConfig, PropagationConfig, RerouteConfig, RolloutConfig,
};
pub use error::{CoreError, CoreResult, ensure_contiguous};
pub use ids::{
    ActivityId, EdgeId, EventId, LineId, PeriodicActivityId, PeriodicEventId, StationId,
};
pub use rng::DelayRng;
pub use time::{Horizon, Seconds};
