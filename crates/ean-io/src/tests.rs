//! Tests for ean-io.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use ean_core::{ActivityId, EventId, PeriodicActivityId, PeriodicEventId, StationId};
use ean_network::{Activity, ActivityKind, AperiodicNetwork, Event, EventKind};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn tmp() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("write table");
    path
}

/// dep@0 --drive--> arr@10 --wait--> dep@12, plus a change arr@10 → dep@30.
fn network() -> AperiodicNetwork {
    let mut net = AperiodicNetwork::new();
    let e = |p: u32, kind, station: u32, time| {
        Event::new(PeriodicEventId(p), kind, StationId(station), time, 2.5)
    };
    let a = net.add_event(e(1, EventKind::Departure, 1, 0));
    let b = net.add_event(e(2, EventKind::Arrival, 2, 10));
    let c = net.add_event(e(3, EventKind::Departure, 2, 12));
    let d = net.add_event(e(4, EventKind::Departure, 2, 30));
    let act = |p: u32, kind, s, t, lower, upper| {
        Activity::new(PeriodicActivityId(p), kind, s, t, lower, upper, 1.0)
    };
    net.add_activity(act(1, ActivityKind::Drive, a, b, 5, 15)).unwrap();
    net.add_activity(act(2, ActivityKind::Wait, b, c, 1, 5)).unwrap();
    net.add_activity(act(3, ActivityKind::Change { missed: false }, b, d, 3, 63)).unwrap();
    net
}

// ── Table format ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod table {
    use crate::table::{TableWriter, for_each_row};
    use crate::IoError;

    #[test]
    fn comments_and_blank_lines_skipped() {
        let text = "# id; value\n\n1; 10   # first\n  # only a comment\n2;20\n";
        let mut rows = Vec::new();
        for_each_row(text.as_bytes(), "t", |row| {
            rows.push((row.line(), row.get::<u32>(0, "id")?, row.get::<i64>(1, "value")?));
            Ok(())
        })
        .unwrap();
        assert_eq!(rows, vec![(3, 1, 10), (5, 2, 20)]);
    }

    #[test]
    fn quoted_fields_are_unquoted() {
        let mut kinds = Vec::new();
        for_each_row("1; \"departure\"\n".as_bytes(), "t", |row| {
            kinds.push(row.text(1, "kind")?.to_owned());
            Ok(())
        })
        .unwrap();
        assert_eq!(kinds, vec!["departure"]);
    }

    #[test]
    fn integer_column_accepts_fractional_zero() {
        for_each_row("10.0; 7; 2.5\n".as_bytes(), "t", |row| {
            assert_eq!(row.get_int(0, "a")?, 10);
            assert_eq!(row.get_int(1, "b")?, 7);
            assert!(row.get_int(2, "c").is_err());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn parse_error_names_table_and_line() {
        let text = "# header\n1; 2\nx; 3\n";
        let err = for_each_row(text.as_bytes(), "demo", |row| {
            row.get::<u32>(0, "id")?;
            Ok(())
        })
        .unwrap_err();
        match err {
            IoError::Parse { table, line, .. } => {
                assert_eq!(table, "demo");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn missing_column_reported() {
        let err = for_each_row("1\n".as_bytes(), "t", |row| {
            row.get::<u32>(1, "value")?;
            Ok(())
        })
        .unwrap_err();
        assert!(err.to_string().contains("missing column 2"));
    }

    #[test]
    fn get_or_defaults_on_short_rows() {
        for_each_row("1\n".as_bytes(), "t", |row| {
            assert_eq!(row.get_or(1, "x", 42u32)?, 42);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn writer_emits_header_and_rows() {
        let mut w = TableWriter::new(Vec::new(), "a; b").unwrap();
        w.write_row(["1", "x"]).unwrap();
        w.write_row(["2", ""]).unwrap();
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        assert_eq!(out, "# a; b\n1;x\n2;\n");
    }
}

// ── Periodic tables ───────────────────────────────────────────────────────────

#[cfg(test)]
mod periodic {
    use super::*;
    use ean_core::{CoreError, EdgeId, LineId};

    use crate::periodic::{PeriodicFiles, load_periodic_network, load_ptn};
    use crate::IoError;

    fn files(dir: &Path, events: &str) -> PeriodicFiles {
        PeriodicFiles {
            events:     write(dir, "Events-periodic.giv", events),
            activities: write(
                dir,
                "Activities-periodic.giv",
                "# id; type; from; to; lower; upper; weight\n\
                 1; \"drive\"; 1; 2; 5; 15; 4\n\
                 2; \"sync\"; 1; 3; 0; 0; 0\n",
            ),
            timetable:  write(dir, "Timetable-periodic.tim", "1; 0\n2; 10\n3; 30\n"),
            line_pool:  Some(write(dir, "Pool.giv", "# line; pos; edge; freq\n1; 1; 1; 2\n")),
            edges:      Some(write(dir, "Edge.giv", "1; 1; 2; 1000; 5; 10\n")),
            headways:   Some(write(dir, "Headway.giv", "1; 20\n")),
        }
    }

    #[test]
    fn loads_complete_model() {
        let dir = tmp();
        let f = files(
            dir.path(),
            "# id; type; stop; line; weight\n\
             1; \"departure\"; 1; 1; 4\n\
             2; \"arrival\"; 2; 1; 4\n\
             3; \"departure\"; 1; 2; 0\n",
        );
        let net = load_periodic_network(&f, 60).unwrap();
        assert_eq!(net.event_count(), 3);
        // Sync dropped at load time.
        assert_eq!(net.activity_count(), 1);
        assert_eq!(net.event(PeriodicEventId(1)).frequency, 2);
        assert_eq!(net.event(PeriodicEventId(3)).frequency, 1);
        assert_eq!(net.event(PeriodicEventId(2)).times, vec![10]);
        assert_eq!(net.block_headway(&net.activities[0]), Some(20));
    }

    #[test]
    fn repeated_timetable_rows_keep_every_time() {
        let dir = tmp();
        let mut f = files(dir.path(), "1; departure; 1; 1; 4\n2; arrival; 2; 1; 4\n3; departure; 1; 2; 0\n");
        f.timetable = write(dir.path(), "Timetable-periodic.tim", "1; 0\n1; 30\n2; 10\n2; 40\n3; 30\n");
        let net = load_periodic_network(&f, 60).unwrap();
        assert_eq!(net.event(PeriodicEventId(1)).times, vec![0, 30]);
        assert_eq!(net.event(PeriodicEventId(2)).times, vec![10, 40]);
        assert_eq!(net.event(PeriodicEventId(3)).times, vec![30]);
    }

    #[test]
    fn timetable_time_outside_period_rejected() {
        let dir = tmp();
        let mut f = files(dir.path(), "1; departure; 1; 1; 4\n2; arrival; 2; 1; 4\n3; departure; 1; 2; 0\n");
        f.timetable = write(dir.path(), "Timetable-periodic.tim", "1; 0\n1; 60\n2; 10\n3; 30\n");
        assert!(matches!(load_periodic_network(&f, 60), Err(IoError::Core(CoreError::Input(_)))));
    }

    #[test]
    fn gap_in_event_ids_rejected() {
        let dir = tmp();
        let f = files(dir.path(), "1; departure; 1; 1; 4\n3; arrival; 2; 1; 4\n");
        let err = load_periodic_network(&f, 60).unwrap_err();
        assert!(matches!(
            err,
            IoError::Core(CoreError::NotContiguous { expected: 2, found: 3, .. })
        ));
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tmp();
        let mut f = files(dir.path(), "1; departure; 1; 1; 4\n");
        f.timetable = dir.path().join("nope.tim");
        assert!(matches!(load_periodic_network(&f, 60), Err(IoError::Open { .. })));
    }

    #[test]
    fn line_pool_ordered_by_position() {
        let dir = tmp();
        let edges = write(dir.path(), "Edge.giv", "1; 1; 2\n2; 2; 3\n3; 3; 4\n");
        let pool = write(dir.path(), "Pool.giv", "1; 2; 3; 1\n1; 1; 1; 1\n2; 1; 2; 4\n");
        let ptn = load_ptn(Some(&edges), None, Some(&pool)).unwrap();
        let line = &ptn.lines[&LineId(1)];
        assert_eq!(line.edges, vec![EdgeId(1), EdgeId(3)]);
        assert_eq!(ptn.frequency(LineId(2)), Some(4));
        assert_eq!(ptn.headway(EdgeId(1)), 0);
    }

    #[test]
    fn frequency_out_of_u32_range_rejected() {
        let dir = tmp();
        let edges = write(dir.path(), "Edge.giv", "1; 1; 2\n");
        for freq in ["4294967296", "-1"] {
            let pool = write(dir.path(), "Pool.giv", &format!("1; 1; 1; {freq}\n"));
            let err = load_ptn(Some(&edges), None, Some(&pool)).unwrap_err();
            assert!(matches!(err, IoError::Parse { line: 1, .. }), "{freq}: {err:?}");
        }
    }
}

// ── Aperiodic tables ──────────────────────────────────────────────────────────

#[cfg(test)]
mod aperiodic {
    use super::*;
    use crate::aperiodic::{
        NetworkFiles, load_network, read_network, save_network, write_events, write_trip_ends,
    };

    #[test]
    fn event_table_layout() {
        let out = write_events(&network(), Vec::new()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with('#'));
        assert_eq!(lines.next().unwrap(), "1;1;departure;0;2.5;1");
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn save_and_load_preserve_structure() {
        let dir = tmp();
        let files = NetworkFiles {
            events:     dir.path().join("Events-expanded.giv"),
            activities: dir.path().join("Activities-expanded.giv"),
            trip_ends:  Some(dir.path().join("Trip-ends.giv")),
        };
        let original = network();
        save_network(&original, &files).unwrap();
        let loaded = load_network(&files).unwrap();

        assert_eq!(loaded.event_count(), 4);
        assert_eq!(loaded.activity_count(), 3);
        let change = loaded.activity(ActivityId(3)).unwrap();
        assert!(change.kind.is_change());
        assert_eq!((change.source, change.target), (EventId(2), EventId(4)));
        assert_eq!((change.lower, change.upper), (3, 63));
        assert_eq!(loaded.event(EventId(2)).unwrap().station, StationId(2));
        assert_eq!(loaded.event(EventId(2)).unwrap().dispo_time, 10);
        assert!(loaded.event(EventId(1)).unwrap().start_of_trip);
        assert!(loaded.event(EventId(3)).unwrap().end_of_trip);
        assert!(files.trip_ends.as_ref().unwrap().exists());
    }

    #[test]
    fn trip_ends_list_structural_ends() {
        let mut net = network();
        net.refresh_trip_flags();
        let text = String::from_utf8(write_trip_ends(&net, Vec::new()).unwrap()).unwrap();
        let ids: Vec<&str> = text.lines().skip(1).collect();
        // Event 4 is only reached by a change, so it is a one-event trip.
        assert_eq!(ids, vec!["3", "4"]);
    }

    #[test]
    fn non_compact_network_not_written() {
        let dir = tmp();
        let mut net = network();
        net.remove_event(EventId(1));
        let files = NetworkFiles {
            events:     dir.path().join("e.giv"),
            activities: dir.path().join("a.giv"),
            trip_ends:  None,
        };
        assert!(save_network(&net, &files).is_err());
    }

    #[test]
    fn dangling_activity_rejected() {
        let events = "1; 1; departure; 0; 1; 1\n";
        let activities = "1; 1; drive; 1; 2; 5; 10; 1\n";
        assert!(read_network(events.as_bytes(), activities.as_bytes()).is_err());
    }

    #[test]
    fn out_of_order_ids_rejected() {
        let events = "2; 1; departure; 0; 1; 1\n";
        assert!(read_network(events.as_bytes(), "".as_bytes()).is_err());
    }
}

// ── Delay tables ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod delays {
    use super::*;
    use crate::delays::{
        DelayFiles, load_delays, read_activity_delays, read_dispo_timetable, read_event_delays,
        save_delays,
        write_activity_delays, write_dispo_timetable,
    };

    #[test]
    fn only_positive_delays_written() {
        let mut net = network();
        net.activity_mut(ActivityId(2)).unwrap().source_delay = 40;
        net.activity_mut(ActivityId(3)).unwrap().source_delay = 0;
        let text = String::from_utf8(write_activity_delays(&net, Vec::new()).unwrap()).unwrap();
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(rows, vec!["2;40"]);
    }

    #[test]
    fn delays_survive_save_and_load() {
        let dir = tmp();
        let files = DelayFiles {
            events:     dir.path().join("Delays-Events.giv"),
            activities: dir.path().join("Delays-Activities.giv"),
        };
        let mut net = network();
        net.event_mut(EventId(1)).unwrap().source_delay = 120;
        net.activity_mut(ActivityId(1)).unwrap().source_delay = 30;
        save_delays(&net, &files).unwrap();

        let mut fresh = network();
        assert_eq!(load_delays(&mut fresh, &files).unwrap(), 2);
        assert_eq!(fresh.event(EventId(1)).unwrap().source_delay, 120);
        assert_eq!(fresh.activity(ActivityId(1)).unwrap().source_delay, 30);
    }

    #[test]
    fn missing_delay_files_are_empty() {
        let dir = tmp();
        let files = DelayFiles {
            events:     dir.path().join("none-e.giv"),
            activities: dir.path().join("none-a.giv"),
        };
        let mut net = network();
        assert_eq!(load_delays(&mut net, &files).unwrap(), 0);
    }

    #[test]
    fn delay_for_unknown_event_rejected() {
        let mut net = network();
        assert!(read_event_delays(&mut net, "9; 60\n".as_bytes()).is_err());
    }

    #[test]
    fn negative_delays_rejected() {
        let mut net = network();
        let err = read_event_delays(&mut net, "1; -30\n".as_bytes()).unwrap_err();
        assert!(matches!(err, crate::IoError::Parse { line: 1, .. }));
        let err = read_activity_delays(&mut net, "1; 30\n2; -5\n".as_bytes()).unwrap_err();
        assert!(matches!(err, crate::IoError::Parse { line: 2, .. }));
        assert_eq!(net.event(EventId(1)).unwrap().source_delay, 0);
    }

    #[test]
    fn dispo_timetable_applies_times() {
        let mut net = network();
        net.event_mut(EventId(2)).unwrap().dispo_time = 70;
        let out = write_dispo_timetable(&net, Vec::new()).unwrap();

        let mut fresh = network();
        read_dispo_timetable(&mut fresh, out.as_slice()).unwrap();
        assert_eq!(fresh.event(EventId(2)).unwrap().dispo_time, 70);
        assert_eq!(fresh.event(EventId(2)).unwrap().delay(), 60);
        assert_eq!(fresh.event(EventId(1)).unwrap().dispo_time, 0);
    }
}

// ── Demand tables ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod demand {
    use super::*;
    use ean_network::{ExpandedOd, PathRecord};

    use crate::demand::{read_od, read_paths, write_expanded_od, write_paths};

    #[test]
    fn od_rows_read_in_order() {
        let text = "# origin; destination; customers\n1; 2; 10\n2; 1; 0\n";
        let pairs = read_od(text.as_bytes()).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].origin, StationId(1));
        assert_eq!(pairs[0].customers, 10.0);
        assert_eq!(pairs[1].customers, 0.0);
    }

    #[test]
    fn negative_demand_rejected() {
        assert!(read_od("1; 2; -1\n".as_bytes()).is_err());
    }

    #[test]
    fn path_changes_are_comma_separated() {
        let records = vec![
            PathRecord {
                weight:            3,
                origin_event:      EventId(1),
                destination_event: EventId(9),
                origin:            StationId(1),
                destination:       StationId(4),
                changes:           vec![ActivityId(5), ActivityId(12)],
            },
            PathRecord {
                weight:            1,
                origin_event:      EventId(2),
                destination_event: EventId(7),
                origin:            StationId(1),
                destination:       StationId(4),
                changes:           Vec::new(),
            },
        ];
        let out = write_paths(&records, Vec::new()).unwrap();
        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with(";5,12"));
        assert_eq!(read_paths(out.as_slice()).unwrap(), records);
    }

    #[test]
    fn expanded_od_rows() {
        let rows = [ExpandedOd {
            origin:      StationId(1),
            destination: StationId(2),
            departure:   3600,
            weight:      7,
        }];
        let text = String::from_utf8(write_expanded_od(&rows, Vec::new()).unwrap()).unwrap();
        assert_eq!(text.lines().nth(1), Some("1;2;3600;7"));
    }
}

// ── Statistics ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod report {
    use super::*;
    use crate::report::{load_statistics, save_statistics};

    #[test]
    fn statistics_keep_order() {
        let dir = tmp();
        let path = dir.path().join("statistic.sta");
        save_statistics([("dm_feasible", "true"), ("dm_objective", "42")], &path).unwrap();
        let entries = load_statistics(&path).unwrap();
        assert_eq!(
            entries,
            vec![
                ("dm_feasible".to_owned(), "true".to_owned()),
                ("dm_objective".to_owned(), "42".to_owned()),
            ]
        );
    }
}
