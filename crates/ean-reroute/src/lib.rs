//! `ean-reroute`: passenger rerouting in a disposition timetable.
//!
//! | Module           | Contents                                              |
//! |------------------|-------------------------------------------------------|
//! | [`collapsed`]    | `CollapsedNetwork`, `CollapsedEdge`, `Hop`            |
//! | [`reachability`] | `Reachability`: packed-bit Warshall closure          |
//! | [`router`]       | `reroute`, `PassengerRouter`, `allocate`, `split`     |
//! | [`error`]        | `RerouteError`, `RerouteResult<T>`                    |
//!
//! # Feature flags
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Routes OD pairs on Rayon's thread pool.                 |

pub mod collapsed;
pub mod error;
pub mod reachability;
pub mod router;


pub use collapsed::{CollapsedEdge, CollapsedNetwork, Hop};
pub use error::{RerouteError, RerouteResult};
pub use reachability::Reachability;
pub use router::{
    OdAssignment, PassengerRouter, Path, PathGroup, RerouteOutcome, RerouteStats, Routing, allocate,
    reroute, split,
};
