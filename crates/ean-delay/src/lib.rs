//! `ean-delay`: delays on a rolled-out network.
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`inject`]    | `inject_delays`, `InjectionSummary`                       |
//! | [`propagate`] | `propagate_delays`, `derive_flags`, `PropagationStats`    |
//! | [`evaluate`]  | `evaluate`, `EvaluationReport`                            |
//! | [`error`]     | `DelayError`, `DelayResult<T>`                            |
//!
//! The stages run in that order: source delays are drawn onto events or
//! activities, propagation turns them into disposition times and the
//! `z`/`g` flags, and the evaluator prices the result.

pub mod error;
pub mod evaluate;
pub mod inject;
pub mod propagate;


pub use error::{DelayError, DelayResult};
pub use evaluate::{EvaluationReport, evaluate};
pub use inject::{InjectionSummary, inject_delays};
pub use propagate::{PropagationStats, derive_flags, propagate_delays};
