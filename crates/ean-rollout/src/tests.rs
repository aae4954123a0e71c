//! Unit tests for ean-rollout.

use ean_core::{EventId, LineId, PeriodicEventId, RolloutConfig, Seconds, StationId};
use ean_network::{
    ActivityKind, ActivityType, AperiodicNetwork, EventKind, PeriodicNetwork,
    PeriodicNetworkBuilder, Ptn,
};

use crate::{Pruned, RolloutError, roll_out};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `(kind, station, line, weight, time)`
type Ev = (EventKind, u32, u32, f64, Seconds);
/// `(type, source, target, lower, upper, weight)` with 1-based event ids.
type Act = (ActivityType, u32, u32, Seconds, Seconds, f64);

fn periodic(period: Seconds, events: &[Ev], activities: &[Act], ptn: Ptn) -> PeriodicNetwork {
    let mut b = PeriodicNetworkBuilder::new(period).ptn(ptn);
    for &(kind, station, line, weight, time) in events {
        let id = b.add_event(kind, StationId(station), LineId(line), weight);
        b.set_time(id, time).unwrap();
    }
    for &(t, s, g, lower, upper, weight) in activities {
        b.add_activity(t, PeriodicEventId(s), PeriodicEventId(g), lower, upper, weight);
    }
    b.build().unwrap()
}

fn config(period: Seconds, earliest: Seconds, latest: Seconds) -> RolloutConfig {
    RolloutConfig {
        period,
        earliest_time: earliest,
        latest_time: latest,
        periodically_roll_out: false,
        only_whole_trips: true,
        discard_unused_changing_activities: false,
        headways: false,
    }
}

fn times(net: &AperiodicNetwork) -> Vec<Seconds> {
    net.events().map(|e| e.time).collect()
}

fn count(net: &AperiodicNetwork, pred: impl Fn(ActivityKind) -> bool) -> usize {
    net.activities().filter(|a| pred(a.kind)).count()
}

fn assert_contiguous(net: &AperiodicNetwork) {
    assert!(net.is_compact());
    for (slot, e) in net.events().enumerate() {
        assert_eq!(e.id, EventId::from_index(slot));
    }
    for (slot, a) in net.activities().enumerate() {
        assert_eq!(a.id.index(), slot);
    }
}

const DEP: EventKind = EventKind::Departure;
const ARR: EventKind = EventKind::Arrival;

/// A@30 (st 1) → B@50 (st 2) → C@55 (st 2) on line 1, and D@20 (st 1, line 2)
/// changing onto A.  Period 60.
fn cut_trip() -> PeriodicNetwork {
    periodic(
        60,
        &[(DEP, 1, 1, 6.0, 30), (ARR, 2, 1, 6.0, 50), (DEP, 2, 1, 6.0, 55), (ARR, 1, 2, 2.0, 20)],
        &[
            (ActivityType::Drive, 1, 2, 20, 25, 6.0),
            (ActivityType::Wait, 2, 3, 5, 10, 6.0),
            (ActivityType::Change, 4, 1, 5, 64, 2.0),
        ],
        Ptn::new(),
    )
}

// ── Event rollout ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod events {
    use super::*;

    #[test]
    fn minimal_rollout() {
        let p = periodic(60, &[(DEP, 1, 1, 10.0, 0)], &[], Ptn::new());
        let (net, stats) = roll_out(&p, &config(60, 0, 179)).unwrap();
        assert_eq!(times(&net), vec![0, 60, 120]);
        assert!(net.events().all(|e| e.weight == 10.0));
        assert_eq!(net.activity_count(), 0);
        assert_eq!(stats.events, 3);
        assert_contiguous(&net);
    }

    #[test]
    fn every_timetable_time_rolled_out() {
        let mut b = PeriodicNetworkBuilder::new(60);
        let id = b.add_event(DEP, StationId(1), LineId(1), 4.0);
        b.set_time(id, 30).unwrap();
        b.set_time(id, 0).unwrap();
        let p = b.build().unwrap();
        assert_eq!(p.event(id).times, vec![30, 0]);

        let (net, _) = roll_out(&p, &config(60, 0, 119)).unwrap();
        assert_eq!(times(&net), vec![0, 30, 60, 90]);
        assert_contiguous(&net);
    }

    #[test]
    fn periodic_spread_divides_weight() {
        let mut ptn = Ptn::new();
        let edge = ptn.add_edge(StationId(1), StationId(2));
        ptn.push_line_edge(LineId(1), edge, 3);
        let p = periodic(60, &[(DEP, 1, 1, 9.0, 5)], &[], ptn);

        let mut cfg = config(60, 0, 59);
        cfg.periodically_roll_out = true;
        let (net, _) = roll_out(&p, &cfg).unwrap();
        assert_eq!(times(&net), vec![5, 25, 45]);
        assert!(net.events().all(|e| e.weight == 3.0));
    }

    #[test]
    fn horizon_containment() {
        let p = periodic(60, &[(DEP, 1, 1, 1.0, 50), (DEP, 2, 2, 1.0, 10)], &[], Ptn::new());
        let cfg = config(60, 30, 200);
        let (net, _) = roll_out(&p, &cfg).unwrap();
        assert!(net.events().all(|e| (30..=200).contains(&e.time)));
        // 50, 110, 170 and 70, 130, 190.
        assert_eq!(net.event_count(), 6);
    }

    #[test]
    fn negative_horizon_start() {
        let p = periodic(60, &[(DEP, 1, 1, 1.0, 50)], &[], Ptn::new());
        let (net, _) = roll_out(&p, &config(60, -60, 59)).unwrap();
        assert_eq!(times(&net), vec![-10, 50]);
    }

    #[test]
    fn empty_result_is_an_error() {
        let p = periodic(60, &[(DEP, 1, 1, 1.0, 50)], &[], Ptn::new());
        assert!(matches!(roll_out(&p, &config(60, 0, 40)), Err(RolloutError::Empty { .. })));
    }

    #[test]
    fn period_mismatch_rejected() {
        let p = periodic(60, &[(DEP, 1, 1, 1.0, 0)], &[], Ptn::new());
        assert!(matches!(
            roll_out(&p, &config(120, 0, 179)),
            Err(RolloutError::PeriodMismatch { configured: 120, network: 60 })
        ));
    }

    #[test]
    fn inverted_horizon_rejected() {
        let p = periodic(60, &[(DEP, 1, 1, 1.0, 0)], &[], Ptn::new());
        assert!(matches!(roll_out(&p, &config(60, 100, 0)), Err(RolloutError::Core(_))));
    }
}

// ── Activity matching ─────────────────────────────────────────────────────────

#[cfg(test)]
mod matching {
    use super::*;
    use ean_core::CoreError;

    #[test]
    fn drive_matching() {
        let p = periodic(
            60,
            &[(DEP, 1, 1, 1.0, 0), (ARR, 2, 1, 1.0, 10)],
            &[(ActivityType::Drive, 1, 2, 5, 15, 1.0)],
            Ptn::new(),
        );
        let (net, _) = roll_out(&p, &config(60, 0, 59)).unwrap();
        assert_eq!(times(&net), vec![0, 10]);
        assert_eq!(net.activity_count(), 1);
        let drive = net.activities().next().unwrap();
        assert_eq!(drive.kind, ActivityKind::Drive);
        assert_eq!(net.event(drive.source).unwrap().time, 0);
        assert_eq!(net.event(drive.target).unwrap().time, 10);
        assert_eq!((drive.lower, drive.upper), (5, 15));
    }

    #[test]
    fn earliest_feasible_target_only() {
        // B occurs at 10, 70, 130; A at 0, 60, 120.  The lower bound 5 picks the
        // next B, never a later one.
        let p = periodic(
            60,
            &[(DEP, 1, 1, 1.0, 0), (ARR, 2, 1, 1.0, 10)],
            &[(ActivityType::Drive, 1, 2, 5, 15, 1.0)],
            Ptn::new(),
        );
        let mut cfg = config(60, 0, 130);
        cfg.only_whole_trips = false;
        let (net, _) = roll_out(&p, &cfg).unwrap();
        let pairs: Vec<(Seconds, Seconds)> = net
            .activities()
            .map(|a| (net.event(a.source).unwrap().time, net.event(a.target).unwrap().time))
            .collect();
        assert_eq!(pairs, vec![(0, 10), (60, 70), (120, 130)]);
    }

    #[test]
    fn lower_bound_crossing_the_period() {
        // Arrival lies in the next period: 50 → 70.
        let p = periodic(
            60,
            &[(DEP, 1, 1, 1.0, 50), (ARR, 2, 1, 1.0, 10)],
            &[(ActivityType::Drive, 1, 2, 20, 20, 1.0)],
            Ptn::new(),
        );
        let (net, _) = roll_out(&p, &config(60, 0, 119)).unwrap();
        let drive = net.activities().next().unwrap();
        assert_eq!(net.event(drive.source).unwrap().time, 50);
        assert_eq!(net.event(drive.target).unwrap().time, 70);
    }

    #[test]
    fn change_weight_divided_by_source_frequency() {
        let mut ptn = Ptn::new();
        let edge = ptn.add_edge(StationId(1), StationId(2));
        ptn.push_line_edge(LineId(1), edge, 2);
        let p = periodic(
            60,
            &[(ARR, 1, 1, 4.0, 0), (DEP, 1, 2, 4.0, 10)],
            &[(ActivityType::Change, 1, 2, 3, 63, 8.0)],
            ptn,
        );
        let (net, _) = roll_out(&p, &config(60, 0, 59)).unwrap();
        let change = net.activities().find(|a| a.kind.is_change()).unwrap();
        assert_eq!(change.weight, 4.0);
    }

    #[test]
    fn unused_changes_discarded_on_request() {
        let p = periodic(
            60,
            &[(ARR, 1, 1, 1.0, 0), (DEP, 1, 2, 1.0, 10)],
            &[
                (ActivityType::Change, 1, 2, 3, 63, 0.0),
                (ActivityType::Change, 1, 2, 5, 65, 1.0),
            ],
            Ptn::new(),
        );
        let mut cfg = config(60, 0, 59);
        let (net, _) = roll_out(&p, &cfg).unwrap();
        assert_eq!(count(&net, ActivityKind::is_change), 2);

        cfg.discard_unused_changing_activities = true;
        let (net, _) = roll_out(&p, &cfg).unwrap();
        assert_eq!(count(&net, ActivityKind::is_change), 1);
        assert_eq!(net.activities().next().unwrap().lower, 5);
    }

    #[test]
    fn inverted_bounds_in_input_rejected() {
        let mut p = periodic(
            60,
            &[(DEP, 1, 1, 1.0, 0), (ARR, 2, 1, 1.0, 10)],
            &[(ActivityType::Drive, 1, 2, 5, 15, 1.0)],
            Ptn::new(),
        );
        p.activities[0].lower = 30;
        assert!(matches!(
            roll_out(&p, &config(60, 0, 59)),
            Err(RolloutError::Core(CoreError::BoundsInverted { .. }))
        ));
    }

    #[test]
    fn out_of_range_event_rejected() {
        let mut p = periodic(
            60,
            &[(DEP, 1, 1, 1.0, 0), (ARR, 2, 1, 1.0, 10)],
            &[(ActivityType::Drive, 1, 2, 5, 15, 1.0)],
            Ptn::new(),
        );
        p.activities[0].target = PeriodicEventId(7);
        assert!(matches!(
            roll_out(&p, &config(60, 0, 59)),
            Err(RolloutError::Core(CoreError::MissingReference { id: 7, .. }))
        ));
    }
}

// ── Pruning ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pruning {
    use super::*;

    #[test]
    fn cut_trip_removed_with_whole_trips() {
        // Horizon [0, 100]: A@90 cannot reach B (next at 110).
        let (net, stats) = roll_out(&cut_trip(), &config(60, 0, 100)).unwrap();
        assert!(!net.events().any(|e| e.time == 90));
        assert_eq!(net.event_count(), 5);
        assert_eq!(net.activity_count(), 3);
        assert_eq!(stats.pruned.events, 1);
        // The change D@80 → A@90 went with it.
        assert_eq!(stats.pruned.activities, 1);
        assert_contiguous(&net);
    }

    #[test]
    fn cut_trip_kept_without_whole_trips() {
        let mut cfg = config(60, 0, 100);
        cfg.only_whole_trips = false;
        let (net, stats) = roll_out(&cut_trip(), &cfg).unwrap();
        // A@90 keeps its incoming change, so it survives.
        assert!(net.events().any(|e| e.time == 90));
        assert_eq!(net.event_count(), 6);
        assert_eq!(net.activity_count(), 4);
        assert_eq!(stats.pruned, Pruned::default());
    }

    #[test]
    fn removal_cascades_along_the_trip() {
        // Horizon [40, 100]: B@50 and C@55 lose A@30, and A@90 never reaches
        // a B, so both trips go.
        let (net, _) = roll_out(&cut_trip(), &config(60, 40, 100)).unwrap();
        // Left: D@80 alone, a one-event trip of line 2.
        assert_eq!(times(&net), vec![80]);
        assert_eq!(net.activity_count(), 0);
    }

    #[test]
    fn isolated_events_dropped_without_whole_trips() {
        let p = periodic(60, &[(DEP, 1, 1, 1.0, 0), (DEP, 2, 2, 1.0, 5)], &[], Ptn::new());
        let mut cfg = config(60, 0, 59);
        cfg.only_whole_trips = false;
        assert!(matches!(roll_out(&p, &cfg), Err(RolloutError::Empty { .. })));
    }

    #[test]
    fn trip_flags_recomputed() {
        let (net, _) = roll_out(&cut_trip(), &config(60, 0, 100)).unwrap();
        for e in net.events() {
            let expected = match e.time {
                30 => (true, false),
                50 => (false, false),
                55 => (false, true),
                _ => (true, true),
            };
            assert_eq!((e.start_of_trip, e.end_of_trip), expected, "event at {}", e.time);
        }
    }
}

// ── Headways ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod headways {
    use super::*;

    fn headway_bounds(net: &AperiodicNetwork) -> Vec<(Seconds, Seconds, Seconds, Seconds)> {
        let mut out: Vec<_> = net
            .activities()
            .filter(|a| a.kind.is_headway())
            .map(|a| {
                (net.event(a.source).unwrap().time, net.event(a.target).unwrap().time, a.lower, a.upper)
            })
            .collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn forward_and_backward_alternatives() {
        let p = periodic(
            60,
            &[(DEP, 1, 1, 1.0, 0), (DEP, 1, 2, 1.0, 30)],
            &[(ActivityType::Headway, 1, 2, 5, 20, 0.0)],
            Ptn::new(),
        );
        let mut cfg = config(60, 0, 59);
        cfg.headways = true;
        let (net, _) = roll_out(&p, &cfg).unwrap();
        assert_eq!(headway_bounds(&net), vec![(0, 30, 5, 20), (30, 0, 40, 55)]);
    }

    #[test]
    fn headways_ignored_when_disabled() {
        let p = periodic(
            60,
            &[(DEP, 1, 1, 1.0, 0), (DEP, 1, 2, 1.0, 30)],
            &[(ActivityType::Headway, 1, 2, 5, 20, 0.0)],
            Ptn::new(),
        );
        let (net, _) = roll_out(&p, &config(60, 0, 59)).unwrap();
        assert_eq!(count(&net, ActivityKind::is_headway), 0);
    }

    #[test]
    fn cleanup_keeps_minimal_lower_bound() {
        let p = periodic(
            60,
            &[(DEP, 1, 1, 1.0, 0), (DEP, 1, 2, 1.0, 30)],
            &[
                (ActivityType::Headway, 1, 2, 5, 20, 0.0),
                (ActivityType::Headway, 1, 2, 2, 30, 0.0),
            ],
            Ptn::new(),
        );
        let mut cfg = config(60, 0, 59);
        cfg.headways = true;
        let (net, stats) = roll_out(&p, &cfg).unwrap();
        assert_eq!(stats.duplicate_headways, 2);
        assert_eq!(headway_bounds(&net), vec![(0, 30, 2, 30), (30, 0, 30, 58)]);
        assert_contiguous(&net);
    }

    #[test]
    fn synthesized_from_block_headway() {
        let mut ptn = Ptn::new();
        let edge = ptn.add_edge(StationId(1), StationId(2));
        ptn.set_headway(edge, 10).unwrap();
        ptn.push_line_edge(LineId(1), edge, 1);
        let p = periodic(
            60,
            &[(DEP, 1, 1, 1.0, 0), (ARR, 2, 1, 1.0, 20)],
            &[(ActivityType::Drive, 1, 2, 20, 30, 1.0)],
            ptn,
        );
        let mut cfg = config(60, 0, 119);
        cfg.headways = true;
        let (net, stats) = roll_out(&p, &cfg).unwrap();

        assert_eq!(stats.synthesized_headways, 1);
        // (A@0, A@60) and (A@60, A@0) each produce both directions; one
        // copy per direction survives.
        assert_eq!(stats.duplicate_headways, 2);
        assert_eq!(headway_bounds(&net), vec![(0, 60, 10, 50), (60, 0, 10, 50)]);
        assert_eq!(count(&net, |k| k == ActivityKind::Drive), 2);
    }

    #[test]
    fn no_synthesis_without_ptn_edge() {
        let p = periodic(
            60,
            &[(DEP, 1, 1, 1.0, 0), (ARR, 2, 1, 1.0, 20)],
            &[(ActivityType::Drive, 1, 2, 20, 30, 1.0)],
            Ptn::new(),
        );
        let mut cfg = config(60, 0, 119);
        cfg.headways = true;
        let (net, stats) = roll_out(&p, &cfg).unwrap();
        assert_eq!(stats.synthesized_headways, 0);
        assert_eq!(count(&net, ActivityKind::is_headway), 0);
    }
}
