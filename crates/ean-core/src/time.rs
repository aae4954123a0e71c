//! Time model.
//!
//! All times are integer seconds.  A periodic time lives in `[0, period)`;
//! an aperiodic time is absolute and is produced as `k * period + p` for an
//! integer period index `k`.
//!
//! ```text
//! periodic p = 50, period = 60, horizon [0, 179]
//!   → 50, 110, 170
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Integer seconds.  Signed so that differences and horizons before the
/// period origin stay representable.
pub type Seconds = i64;

/// Reduce `t` into `[0, period)`.
#[inline]
pub fn normalize(t: Seconds, period: Seconds) -> Seconds {
    t.rem_euclid(period)
}

// ── Horizon ───────────────────────────────────────────────────────────────────

/// Closed time window `[earliest, latest]` covered by a rollout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    pub earliest: Seconds,
    pub latest:   Seconds,
}

impl Horizon {
    pub fn new(earliest: Seconds, latest: Seconds) -> CoreResult<Self> {
        if earliest > latest {
            return Err(CoreError::Config(format!(
                "horizon is inverted: earliest time {earliest} > latest time {latest}"
            )));
        }
        Ok(Self { earliest, latest })
    }

    #[inline]
    pub fn contains(&self, t: Seconds) -> bool {
        self.earliest <= t && t <= self.latest
    }

    /// Every absolute time `k * period + p` that falls inside the horizon,
    /// ascending.
    pub fn occurrences(&self, p: Seconds, period: Seconds) -> impl Iterator<Item = Seconds> {
        debug_assert!(period > 0);
        // Smallest k with k*period + p >= earliest, largest with <= latest.
        let first = (self.earliest - p + period - 1).div_euclid(period);
        let last  = (self.latest - p).div_euclid(period);
        (first..=last).map(move |k| k * period + p)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.earliest, self.latest)
    }
}
