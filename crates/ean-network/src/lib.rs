//! `ean-network`: periodic and aperiodic event-activity networks.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`kind`]      | `EventKind`, `ActivityType`                                |
//! | [`ptn`]       | `Ptn`, `PtnEdge`, `Line`: edges, headways, line pool      |
//! | [`periodic`]  | `PeriodicNetwork`, `PeriodicNetworkBuilder`                |
//! | [`aperiodic`] | `AperiodicNetwork` arena, `Event`, `Activity`, `ActivityKind` |
//! | [`demand`]    | `OdPair`, `PathRecord`, `ExpandedOd`                       |

pub mod aperiodic;
pub mod demand;
pub mod kind;
pub mod periodic;
pub mod ptn;


pub use aperiodic::{Activity, ActivityKind, AperiodicNetwork, Event};
pub use demand::{ExpandedOd, OdPair, PathRecord};
pub use kind::{ActivityType, EventKind};
pub use periodic::{PeriodicActivity, PeriodicEvent, PeriodicNetwork, PeriodicNetworkBuilder};
pub use ptn::{Line, Ptn, PtnEdge};
