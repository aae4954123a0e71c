//! The rollout pipeline.

use tracing::{debug, info};

use ean_core::{CoreError, RolloutConfig};
use ean_network::{ActivityKind, ActivityType, AperiodicNetwork, PeriodicNetwork};

use crate::prune::{self, Pruned};
use crate::{RolloutError, RolloutResult, expand, headway};

/// What a rollout produced and removed along the way.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RolloutStats {
    pub events:               usize,
    pub activities:           usize,
    pub synthesized_headways: usize,
    pub duplicate_headways:   usize,
    pub pruned:               Pruned,
}

/// Expand `periodic` over the configured horizon.
///
/// Stages, in order:
///
/// 1. events: one per occurrence inside the horizon,
/// 2. headway synthesis for drive activities (when `headways` is set),
/// 3. activity matching (drive, wait, change, turnaround) and headway
///    rollout,
/// 4. headway cleanup,
/// 5. pruning (`only_whole_trips` selects the cascading variant),
/// 6. structural trip flags and renumbering to `1..=n`.
///
/// Fails if the configuration is invalid, the periodic input is
/// inconsistent or nothing survives.
pub fn roll_out(
    periodic: &PeriodicNetwork,
    config:   &RolloutConfig,
) -> RolloutResult<(AperiodicNetwork, RolloutStats)> {
    config.validate()?;
    if config.period != periodic.period {
        return Err(RolloutError::PeriodMismatch {
            configured: config.period,
            network:    periodic.period,
        });
    }
    check_input(periodic)?;

    let horizon = config.horizon()?;
    let period = config.period;
    let mut stats = RolloutStats::default();
    let mut network = AperiodicNetwork::new();

    // ── Events ────────────────────────────────────────────────────────────
    let instances = expand::roll_out_events(
        &mut network,
        &periodic.events,
        horizon,
        period,
        config.periodically_roll_out,
    );
    debug!(events = network.event_count(), %horizon, "rolled out events");

    // ── Activities ────────────────────────────────────────────────────────
    let synthesized = if config.headways { headway::synthesize(periodic) } else { Vec::new() };
    stats.synthesized_headways = synthesized.len();

    for activity in periodic.activities.iter().chain(&synthesized) {
        let sources = &instances[activity.source.index()];
        let targets = &instances[activity.target.index()];

        match activity.activity_type {
            ActivityType::Headway => {
                if config.headways {
                    headway::roll_out(&mut network, activity, sources, targets, period)?;
                }
            }
            ActivityType::Sync => {}
            ActivityType::Change
                if config.discard_unused_changing_activities && activity.weight == 0.0 => {}
            other => {
                let Some(kind) = ActivityKind::from_type(other) else { continue };
                let frequency = periodic.event(activity.source).frequency.max(1);
                let weight = activity.weight / f64::from(frequency);
                expand::match_earliest(&mut network, activity, kind, sources, targets, weight)?;
            }
        }
    }
    debug!(activities = network.activity_count(), "rolled out activities");

    if config.headways {
        stats.duplicate_headways = headway::clean_up(&mut network);
        debug!(removed = stats.duplicate_headways, "removed duplicate headways");
    }

    // ── Pruning ───────────────────────────────────────────────────────────
    stats.pruned = if config.only_whole_trips {
        prune::whole_trips(&mut network)
    } else {
        prune::dangling(&mut network)
    };
    debug!(
        events = stats.pruned.events,
        activities = stats.pruned.activities,
        whole_trips = config.only_whole_trips,
        "pruned network"
    );

    network.refresh_trip_flags();
    network.compact();

    if network.is_empty() {
        return Err(RolloutError::Empty { horizon });
    }

    stats.events = network.event_count();
    stats.activities = network.activity_count();
    info!(
        events = stats.events,
        activities = stats.activities,
        synthesized_headways = stats.synthesized_headways,
        "rollout finished"
    );
    Ok((network, stats))
}

/// Activity endpoints exist and bounds are ordered.  A network from
/// `PeriodicNetworkBuilder` always passes; one assembled by hand may not.
fn check_input(periodic: &PeriodicNetwork) -> RolloutResult<()> {
    let count = periodic.events.len();
    for activity in &periodic.activities {
        for endpoint in [activity.source, activity.target] {
            if !endpoint.is_valid() || endpoint.index() >= count {
                return Err(CoreError::MissingReference {
                    what:  "periodic event",
                    id:    endpoint.0,
                    owner: format!("periodic activity {}", activity.id.0),
                }
                .into());
            }
        }
        if activity.lower > activity.upper {
            return Err(CoreError::BoundsInverted {
                what:  "periodic activity",
                id:    activity.id.0,
                lower: activity.lower,
                upper: activity.upper,
            }
            .into());
        }
    }
    Ok(())
}
