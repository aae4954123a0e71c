//! Strongly typed identifier wrappers.
//!
//! Every identifier in the interchange tables is a positive integer and the
//! tables of one entity type are numbered contiguously `1..=n`.  The wrappers
//! keep that external number as-is; [`index`](EventId::index) maps it onto the
//! zero-based slot of the owning `Vec`.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".  Ids start at 1, so 0 is free.
            pub const INVALID: $name = $name(0);

            /// Id of the element stored at zero-based slot `slot`.
            #[inline(always)]
            pub fn from_index(slot: usize) -> $name {
                $name((slot + 1) as $inner)
            }

            /// Zero-based slot for direct `Vec` indexing.
            ///
            /// Must not be called on [`INVALID`](Self::INVALID).
            #[inline(always)]
            pub fn index(self) -> usize {
                debug_assert!(self.0 > 0, concat!(stringify!($name), " is 1-based"));
                self.0 as usize - 1
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self.0 > 0
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Event of the periodic event-activity network.
    pub struct PeriodicEventId(u32);
}

typed_id! {
    /// Activity of the periodic event-activity network.
    pub struct PeriodicActivityId(u32);
}

typed_id! {
    /// Event of the rolled-out (aperiodic) network.
    pub struct EventId(u32);
}

typed_id! {
    /// Activity of the rolled-out (aperiodic) network.
    pub struct ActivityId(u32);
}

typed_id! {
    /// Station (stop) of the physical transit network.
    pub struct StationId(u32);
}

typed_id! {
    /// Edge of the physical transit network.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Line of the line pool.
    pub struct LineId(u32);
}
