//! Feasibility check and delay objectives of a disposition timetable.

use tracing::{info, warn};

use ean_core::{CoreError, EvaluationConfig, Seconds};
use ean_network::{AperiodicNetwork, PathRecord};

use crate::DelayResult;

/// Key figures of a disposition timetable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationReport {
    pub feasible:                    bool,
    /// Activities whose lower bound is violated without being waived.
    pub violations:                  usize,
    pub delayed_events:              usize,
    /// Sum of the weights of delayed events.
    pub delayed_events_weighted:     f64,
    /// Sum of all event delays.
    pub total_delay:                 Seconds,
    /// Passenger-weighted delay at arrival events.
    pub weighted_delay:              f64,
    pub missed_connections:          usize,
    pub missed_connections_weighted: f64,
    pub swapped_headways:            usize,
    /// `weighted_delay + missed_connections_weighted * penalty`.
    pub objective:                   f64,
    /// Realized delay summed over passenger path records, when supplied.
    pub extended_objective:          Option<f64>,
}

impl EvaluationReport {
    /// `key; value` pairs for the statistic table.
    pub fn statistics(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("dm_feasible", self.feasible.to_string()),
            ("dm_violated_activities", self.violations.to_string()),
            ("dm_delayed_events", self.delayed_events.to_string()),
            ("dm_delayed_events_weighted", self.delayed_events_weighted.to_string()),
            ("dm_total_delay", self.total_delay.to_string()),
            ("dm_weighted_delay", self.weighted_delay.to_string()),
            ("dm_missed_connections", self.missed_connections.to_string()),
            ("dm_missed_connections_weighted", self.missed_connections_weighted.to_string()),
            ("dm_swapped_headways", self.swapped_headways.to_string()),
            ("dm_objective", self.objective.to_string()),
        ];
        if let Some(extended) = self.extended_objective {
            out.push(("dm_extended_objective", extended.to_string()));
        }
        out
    }
}

/// Evaluate `network` after delay propagation.
///
/// `period` prices a missed connection unless the configuration overrides
/// it.  With `paths`, the extended objective walks every record and fails
/// if a record names an event or activity the network does not have.
pub fn evaluate(
    network: &AperiodicNetwork,
    period:  Seconds,
    config:  &EvaluationConfig,
    paths:   Option<&[PathRecord]>,
) -> DelayResult<EvaluationReport> {
    config.validate()?;
    let penalty = config.penalty(period);
    let mut report = EvaluationReport::default();

    for e in network.events() {
        let delay = e.delay();
        report.total_delay += delay;
        if delay > 0 {
            report.delayed_events += 1;
            report.delayed_events_weighted += e.weight;
        }
        if e.is_arrival() {
            report.weighted_delay += e.weight * delay as f64;
        }
        if e.dispo_time < e.time {
            report.violations += 1;
        }
    }

    for a in network.activities() {
        if a.is_missed() {
            report.missed_connections += 1;
            report.missed_connections_weighted += a.weight;
            continue;
        }
        if a.is_swapped() {
            report.swapped_headways += 1;
            continue;
        }
        let (Some(s), Some(t)) = (network.event(a.source), network.event(a.target)) else {
            continue;
        };
        if t.dispo_time - s.dispo_time < a.lower + a.source_delay {
            report.violations += 1;
        }
    }

    report.feasible = report.violations == 0;
    report.objective = report.weighted_delay + report.missed_connections_weighted * penalty as f64;
    if let Some(paths) = paths {
        report.extended_objective = Some(extended_objective(network, paths, penalty)?);
    }

    if !report.feasible {
        warn!(violations = report.violations, "disposition timetable is infeasible");
    }
    info!(
        feasible = report.feasible,
        delayed_events = report.delayed_events,
        missed_connections = report.missed_connections,
        objective = report.objective,
        "evaluated disposition timetable"
    );
    Ok(report)
}

/// `Σ weight · (delay at destination + penalty · missed changes on the path)`
fn extended_objective(network: &AperiodicNetwork, paths: &[PathRecord], penalty: Seconds) -> DelayResult<f64> {
    let mut total = 0.0;
    for (row, record) in paths.iter().enumerate() {
        let destination = network.event(record.destination_event).ok_or_else(|| CoreError::MissingReference {
            what:  "event",
            id:    record.destination_event.0,
            owner: format!("path record {}", row + 1),
        })?;
        let mut missed = 0;
        for &id in &record.changes {
            let change = network.activity(id).ok_or_else(|| CoreError::MissingReference {
                what:  "activity",
                id:    id.0,
                owner: format!("path record {}", row + 1),
            })?;
            if change.is_missed() {
                missed += 1;
            }
        }
        let delay = destination.delay() + penalty * missed;
        total += record.weight as f64 * delay as f64;
    }
    Ok(total)
}
