//! Stage configuration.
//!
//! One plain struct per pipeline stage.  The binary deserializes them from a
//! single TOML document and hands each stage its own value; nothing here is
//! global or mutable after loading.  Every struct has a `validate()` that
//! rejects out-of-range or contradictory combinations with
//! [`CoreError::Config`].

use serde::{Deserialize, Serialize};

use crate::time::{Horizon, Seconds};
use crate::{CoreError, CoreResult, EdgeId, StationId};

// ── RolloutConfig ─────────────────────────────────────────────────────────────

/// Parameters of the time expansion.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RolloutConfig {
    /// Period length in seconds.
    pub period: Seconds,

    /// First second of the rolled-out horizon (inclusive).
    pub earliest_time: Seconds,

    /// Last second of the rolled-out horizon (inclusive).
    pub latest_time: Seconds,

    /// Spread each periodic event over its line frequency:
    /// `p + i * period / f` for `i in 0..f`.  When false the timetable time is
    /// used as the only occurrence.
    pub periodically_roll_out: bool,

    /// Remove every event that does not belong to a complete trip.
    pub only_whole_trips: bool,

    /// Skip periodic change activities that carry no passengers.
    pub discard_unused_changing_activities: bool,

    /// Synthesize and roll out headway activities.
    pub headways: bool,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            period:                             3_600,
            earliest_time:                      0,
            latest_time:                        86_399,
            periodically_roll_out:              false,
            only_whole_trips:                   true,
            discard_unused_changing_activities: false,
            headways:                           true,
        }
    }
}

impl RolloutConfig {
    pub fn horizon(&self) -> CoreResult<Horizon> {
        Horizon::new(self.earliest_time, self.latest_time)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.period <= 0 {
            return Err(CoreError::Config(format!(
                "period must be positive, got {}",
                self.period
            )));
        }
        self.horizon().map(|_| ())
    }
}

// ── DelayConfig ───────────────────────────────────────────────────────────────

/// Which elements receive source delays and how magnitudes are drawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayStrategy {
    /// Uniform delays on events inside the time window.
    UniformEvents,
    /// Uniform delays on activities inside the time window.
    UniformActivities,
    /// Negative-exponential delays on undelayed activities.
    ExponentialActivities,
    /// Uniform delays on the events of one station.
    UniformStation,
    /// Negative-exponential delays on the events of one station.
    ExponentialStation,
    /// Uniform delays on the activities running over one PTN edge.
    Track,
}

impl DelayStrategy {
    /// `true` if the strategy delays activities rather than events.
    pub fn targets_activities(self) -> bool {
        matches!(
            self,
            DelayStrategy::UniformActivities | DelayStrategy::ExponentialActivities | DelayStrategy::Track
        )
    }

    pub fn is_exponential(self) -> bool {
        matches!(self, DelayStrategy::ExponentialActivities | DelayStrategy::ExponentialStation)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub strategy: DelayStrategy,

    /// Number of delayed elements, or a percentage of the candidates when
    /// `absolute_count` is false (rounded down).
    pub count: i64,

    pub absolute_count: bool,

    /// Delay range in seconds, or in percent of the activity duration when
    /// `relative_delays` is set.  For exponential strategies this is the
    /// range of the rate parameter.
    pub min_delay: i64,
    pub max_delay: i64,

    /// Delay is `duration * percent / 100` (activity strategies only).
    pub relative_delays: bool,

    /// Only elements inside `[min_time, max_time]` are candidates.
    pub min_time: Seconds,
    pub max_time: Seconds,

    /// Seed for reproducible runs; `None` draws from OS entropy.
    pub seed: Option<u64>,

    /// Station of the station-scoped strategies; random when unset.
    pub station: Option<StationId>,

    /// PTN edge of the track strategy; random when unset.
    pub track: Option<EdgeId>,

    /// Add to the delays already present instead of starting from zero.
    pub append: bool,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            strategy:        DelayStrategy::UniformActivities,
            count:           1,
            absolute_count:  true,
            min_delay:       60,
            max_delay:       300,
            relative_delays: false,
            min_time:        Seconds::MIN,
            max_time:        Seconds::MAX,
            seed:            None,
            station:         None,
            track:           None,
            append:          false,
        }
    }
}

impl DelayConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.count < 0 {
            return Err(CoreError::Config(format!("delay count must not be negative, got {}", self.count)));
        }
        if !self.absolute_count && self.count > 100 {
            return Err(CoreError::Config(format!(
                "relative delay count is a percentage, got {}",
                self.count
            )));
        }
        if self.min_delay < 0 || self.min_delay > self.max_delay {
            return Err(CoreError::Config(format!(
                "delay range [{}, {}] is invalid",
                self.min_delay, self.max_delay
            )));
        }
        if self.min_time > self.max_time {
            return Err(CoreError::Config(format!(
                "delay time window [{}, {}] is inverted",
                self.min_time, self.max_time
            )));
        }
        if self.relative_delays && !self.strategy.targets_activities() {
            return Err(CoreError::Config(format!(
                "relative delays need a duration, strategy {:?} delays events",
                self.strategy
            )));
        }
        if self.relative_delays && self.strategy.is_exponential() {
            return Err(CoreError::Config(
                "relative delays cannot be combined with an exponential strategy".into(),
            ));
        }
        Ok(())
    }
}

// ── PropagationConfig ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Longest extra wait a departing vehicle accepts to keep a connection.
    /// `0` drops every connection that a delay breaks.
    pub max_waiting_time: Seconds,
}

impl PropagationConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_waiting_time < 0 {
            return Err(CoreError::Config(format!(
                "max waiting time must not be negative, got {}",
                self.max_waiting_time
            )));
        }
        Ok(())
    }
}

// ── RerouteConfig ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RerouteConfig {
    /// Largest number of changes a path may use.
    pub max_changes: u32,

    /// Ignore change activities flagged as missed.
    pub respect_missed_connections: bool,

    /// Start of the passenger arrival window at the origin.
    pub day_start: Seconds,
}

impl Default for RerouteConfig {
    fn default() -> Self {
        Self {
            max_changes:                8,
            respect_missed_connections: true,
            day_start:                  0,
        }
    }
}

impl RerouteConfig {
    pub fn validate(&self) -> CoreResult<()> {
        Ok(())
    }
}

// ── EvaluationConfig ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Cost of one missed connection; the period length when unset.
    pub missed_connection_penalty: Option<Seconds>,
}

impl EvaluationConfig {
    pub fn penalty(&self, period: Seconds) -> Seconds {
        self.missed_connection_penalty.unwrap_or(period)
    }

    pub fn validate(&self) -> CoreResult<()> {
        match self.missed_connection_penalty {
            Some(p) if p < 0 => Err(CoreError::Config(format!(
                "missed connection penalty must not be negative, got {p}"
            ))),
            _ => Ok(()),
        }
    }
}
