//! Source delay injection.
//!
//! Every strategy follows the same three steps:
//!
//! ```text
//! candidates  ← elements admitted by the strategy, in id order
//! drawn       ← `amount` distinct candidate positions, in draw order
//! delay(e)   += magnitude drawn for e
//! ```
//!
//! `amount` is the configured count, or that percentage of the candidates
//! (rounded down).  The uniform strategies refuse to draw more than exist;
//! the station and track strategies reduce the amount and log a warning.

use tracing::{debug, info, warn};

use ean_core::{ActivityId, CoreError, DelayConfig, DelayRng, DelayStrategy, EdgeId, EventId, Seconds, StationId};
use ean_network::{Activity, AperiodicNetwork, Ptn};

use crate::{DelayError, DelayResult};

/// What one injection run did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InjectionSummary {
    pub candidates:  usize,
    pub delayed:     usize,
    pub total_delay: Seconds,
    /// Station used by the station strategies.
    pub station:     Option<StationId>,
    /// PTN edge used by the track strategy.
    pub track:       Option<EdgeId>,
}

/// Draw source delays into `network` according to `config`.
///
/// Unless `config.append` is set, all existing source delays are cleared
/// first.  `ptn` is only consulted by the track strategy.
pub fn inject_delays(
    network: &mut AperiodicNetwork,
    ptn:     &Ptn,
    config:  &DelayConfig,
    rng:     &mut DelayRng,
) -> DelayResult<InjectionSummary> {
    config.validate()?;
    if !config.append {
        network.clear_source_delays();
    }

    let mut summary = InjectionSummary::default();
    match config.strategy {
        DelayStrategy::UniformEvents => {
            let candidates: Vec<EventId> = network
                .events()
                .filter(|e| in_window(config, e.time))
                .map(|e| e.id)
                .collect();
            let amount = draw_amount(config, candidates.len(), false)?;
            delay_events(network, &candidates, amount, config, rng, &mut summary);
        }
        DelayStrategy::UniformActivities | DelayStrategy::ExponentialActivities => {
            let undelayed_only = config.strategy.is_exponential();
            let candidates: Vec<ActivityId> = network
                .activities()
                .filter(|a| a.kind.is_trip() && activity_in_window(network, config, a))
                .filter(|a| !undelayed_only || a.source_delay <= 0)
                .map(|a| a.id)
                .collect();
            let amount = draw_amount(config, candidates.len(), false)?;
            delay_activities(network, &candidates, amount, config, rng, &mut summary);
        }
        DelayStrategy::UniformStation | DelayStrategy::ExponentialStation => {
            let station = pick_station(network, config, rng)?;
            let undelayed_only = config.strategy.is_exponential();
            let candidates: Vec<EventId> = network
                .events()
                .filter(|e| e.station == station && in_window(config, e.time))
                .filter(|e| !undelayed_only || e.source_delay <= 0)
                .map(|e| e.id)
                .collect();
            let amount = draw_amount(config, candidates.len(), true)?;
            summary.station = Some(station);
            delay_events(network, &candidates, amount, config, rng, &mut summary);
        }
        DelayStrategy::Track => {
            let edge = match config.track {
                Some(id) => *ptn.edge(id).ok_or(CoreError::MissingReference {
                    what:  "PTN edge",
                    id:    id.0,
                    owner: "the delay configuration".into(),
                })?,
                None => *rng.choose(&ptn.edges).ok_or(DelayError::NothingToChoose("PTN edge"))?,
            };
            let candidates: Vec<ActivityId> = network
                .activities()
                .filter(|a| activity_in_window(network, config, a))
                .filter(|a| {
                    let station = |id| network.event(id).map(|e| e.station);
                    match (station(a.source), station(a.target)) {
                        (Some(s), Some(t)) => edge.connects(s, t),
                        _ => false,
                    }
                })
                .map(|a| a.id)
                .collect();
            let amount = draw_amount(config, candidates.len(), true)?;
            summary.track = Some(edge.id);
            delay_activities(network, &candidates, amount, config, rng, &mut summary);
        }
    }

    info!(
        strategy = ?config.strategy,
        candidates = summary.candidates,
        delayed = summary.delayed,
        total_delay = summary.total_delay,
        "injected source delays"
    );
    Ok(summary)
}

// ── Candidate selection ───────────────────────────────────────────────────────

#[inline]
fn in_window(config: &DelayConfig, t: Seconds) -> bool {
    config.min_time <= t && t <= config.max_time
}

/// Source at or after `min_time`, target at or before `max_time`.
fn activity_in_window(network: &AperiodicNetwork, config: &DelayConfig, a: &Activity) -> bool {
    match (network.event(a.source), network.event(a.target)) {
        (Some(s), Some(t)) => s.time >= config.min_time && t.time <= config.max_time,
        _ => false,
    }
}

/// Number of elements to delay out of `available` candidates.
fn draw_amount(config: &DelayConfig, available: usize, clamp: bool) -> DelayResult<usize> {
    let count = usize::try_from(config.count).unwrap_or(0);
    let requested = if config.absolute_count { count } else { available * count / 100 };
    if requested <= available {
        return Ok(requested);
    }
    if clamp {
        warn!(requested, available, "fewer delay candidates than requested, delaying all of them");
        Ok(available)
    } else {
        Err(DelayError::TooFewCandidates { requested, available })
    }
}

/// The configured station, or a random one among the stations that have
/// events.
fn pick_station(network: &AperiodicNetwork, config: &DelayConfig, rng: &mut DelayRng) -> DelayResult<StationId> {
    let mut stations: Vec<StationId> = network.events().map(|e| e.station).collect();
    stations.sort_unstable();
    stations.dedup();
    match config.station {
        Some(s) if stations.binary_search(&s).is_ok() => Ok(s),
        Some(s) => Err(DelayError::UnknownStation(s)),
        None => {
            let s = *rng.choose(&stations).ok_or(DelayError::NothingToChoose("station"))?;
            debug!(station = %s, "picked random delay station");
            Ok(s)
        }
    }
}

// ── Magnitudes ────────────────────────────────────────────────────────────────

/// Absolute delay for an element of planned `duration`.
fn magnitude(config: &DelayConfig, duration: Seconds, rng: &mut DelayRng) -> Seconds {
    if config.strategy.is_exponential() {
        let rate = config.min_delay as f64 + rng.random::<f64>() * (config.max_delay - config.min_delay) as f64;
        return (-rate * rng.open_unit().ln()).round() as Seconds;
    }
    let drawn = rng.gen_range(config.min_delay..=config.max_delay);
    if config.relative_delays { duration * drawn / 100 } else { drawn }
}

fn delay_events(
    network:    &mut AperiodicNetwork,
    candidates: &[EventId],
    amount:     usize,
    config:     &DelayConfig,
    rng:        &mut DelayRng,
    summary:    &mut InjectionSummary,
) {
    summary.candidates = candidates.len();
    for slot in rng.sample_indices(candidates.len(), amount) {
        let delay = magnitude(config, 0, rng);
        if let Some(e) = network.event_mut(candidates[slot]) {
            e.source_delay += delay;
            summary.delayed += 1;
            summary.total_delay += delay;
        }
    }
}

fn delay_activities(
    network:    &mut AperiodicNetwork,
    candidates: &[ActivityId],
    amount:     usize,
    config:     &DelayConfig,
    rng:        &mut DelayRng,
    summary:    &mut InjectionSummary,
) {
    summary.candidates = candidates.len();
    for slot in rng.sample_indices(candidates.len(), amount) {
        let Some(a) = network.activity(candidates[slot]) else { continue };
        let delay = magnitude(config, a.lower, rng);
        if let Some(a) = network.activity_mut(candidates[slot]) {
            a.source_delay += delay;
            summary.delayed += 1;
            summary.total_delay += delay;
        }
    }
}
