//! `ean-rollout`: time expansion of a periodic event-activity network.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`engine`]  | `roll_out`, `RolloutStats`                                |
//! | `expand`    | event rollout, earliest-feasible activity matching        |
//! | `headway`   | headway synthesis, pairwise rollout, duplicate cleanup    |
//! | [`prune`]   | whole-trip and dangling-element pruning                   |
//! | [`error`]   | `RolloutError`, `RolloutResult<T>`                        |
//!
//! # Matching model
//!
//! ```text
//! periodic drive A → B, [5, 15], period 60, horizon [0, 119]
//!
//!   A@0   ──▶ B@10        first B with  t_B − t_A ≥ 5
//!   A@60  ──▶ B@70
//! ```
//!
//! Each source instance gets at most one activity, to the earliest target
//! instance that respects the lower bound.  Headways are the exception: they
//! connect every pair of distinct instances in both directions.

pub mod engine;
pub mod error;
mod expand;
mod headway;
pub mod prune;

#[cfg(test)]
mod tests;

pub use engine::{RolloutStats, roll_out};
pub use error::{RolloutError, RolloutResult};
pub use prune::Pruned;
