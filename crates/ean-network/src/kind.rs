//! Event and activity type tags shared by both network flavours.

use std::fmt;
use std::str::FromStr;

use ean_core::CoreError;

// ── EventKind ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Arrival,
    Departure,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Arrival => "arrival",
            EventKind::Departure => "departure",
        }
    }
}

impl FromStr for EventKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches('"').to_ascii_lowercase().as_str() {
            "arrival" | "arr" => Ok(EventKind::Arrival),
            "departure" | "dep" => Ok(EventKind::Departure),
            other => Err(CoreError::Input(format!(
                "invalid event type {other:?}: expected \"arrival\" or \"departure\""
            ))),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ActivityType ──────────────────────────────────────────────────────────────

/// Plain activity tag as it appears in the periodic tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActivityType {
    Drive,
    Wait,
    Change,
    Headway,
    Turnaround,
    /// Synchronisation constraint; dropped before expansion.
    Sync,
}

impl ActivityType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::Drive => "drive",
            ActivityType::Wait => "wait",
            ActivityType::Change => "change",
            ActivityType::Headway => "headway",
            ActivityType::Turnaround => "turnaround",
            ActivityType::Sync => "sync",
        }
    }

    /// Drive and wait activities chain the events of one trip.
    #[inline]
    pub fn is_trip(self) -> bool {
        matches!(self, ActivityType::Drive | ActivityType::Wait)
    }
}

impl FromStr for ActivityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches('"').to_ascii_lowercase().as_str() {
            "drive" => Ok(ActivityType::Drive),
            "wait" => Ok(ActivityType::Wait),
            "change" => Ok(ActivityType::Change),
            "headway" => Ok(ActivityType::Headway),
            "turnaround" | "turn" => Ok(ActivityType::Turnaround),
            "sync" => Ok(ActivityType::Sync),
            other => Err(CoreError::Input(format!("invalid activity type {other:?}"))),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
