use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use flight_schedule::FlightError;
use flight_schedule::ingestion::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionOptions,
    IngestionRequest, IngestionSeverity, IngestionSource, IngestionStats, Rejection, ingest_directory,
    ingest_file, list_input_files,
};

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(PathBuf, IngestionStats)>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
    empty_dirs: Mutex<Vec<PathBuf>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push((ctx.path.clone(), stats));
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &FlightError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &FlightError) {
        self.alerts.lock().unwrap().push(severity);
    }

    fn on_no_input(&self, dir: &Path) {
        self.empty_dirs.lock().unwrap().push(dir.to_path_buf());
    }
}

fn options_with(obs: &Arc<RecordingObserver>) -> IngestionOptions {
    IngestionOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    }
}

#[test]
fn directory_merges_files_in_file_then_line_order() {
    let report = ingest_directory("tests/fixtures/schedules", &IngestionOptions::default()).unwrap();

    let ids: Vec<&str> = report.records.iter().map(|r| r.flight_id()).collect();
    assert_eq!(ids, vec!["AB12", "EF56"]);
    assert_eq!(
        report.error_messages(),
        vec![
            "Line 2: bad,line → incorrect number of fields",
            "Line 3: MN34,SEA,DEN,2024-01-03 21:00,2024-01-03 20:00,99 → arrival before departure",
        ]
    );
}

#[test]
fn only_matching_extension_is_listed() {
    let files: Vec<PathBuf> = list_input_files("tests/fixtures/schedules", "csv")
        .unwrap()
        .into_iter()
        .map(Result::unwrap)
        .collect();
    let names: Vec<&str> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a_morning.csv", "b_evening.csv"]);
}

#[test]
fn parallel_directory_ingestion_matches_sequential() {
    let sequential = ingest_directory("tests/fixtures/schedules", &IngestionOptions::default()).unwrap();
    let parallel = ingest_directory(
        "tests/fixtures/schedules",
        &IngestionOptions {
            parallel: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn observer_sees_per_file_counts() {
    let obs = Arc::new(RecordingObserver::default());
    ingest_directory("tests/fixtures/schedules", &options_with(&obs)).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    let counts: Vec<(usize, usize)> = successes
        .iter()
        .map(|(_, s)| (s.valid_records, s.rejected_lines))
        .collect();
    assert_eq!(counts, vec![(1, 1), (1, 1)]);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn empty_directory_is_informational() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("readme.txt"), "nothing here").unwrap();
    let obs = Arc::new(RecordingObserver::default());

    let report = ingest_directory(dir.path(), &options_with(&obs)).unwrap();

    assert_eq!(report.valid_count(), 0);
    assert_eq!(report.error_count(), 0);
    assert_eq!(obs.empty_dirs.lock().unwrap().clone(), vec![dir.path().to_path_buf()]);
}

#[test]
fn not_a_directory_is_an_error() {
    let err = ingest_directory("tests/fixtures/flights.csv", &IngestionOptions::default()).unwrap_err();
    assert!(matches!(err, FlightError::NotADirectory { .. }));
}

#[test]
fn unreadable_file_becomes_single_entry_and_alerts() {
    let obs = Arc::new(RecordingObserver::default());
    let report = ingest_file("tests/fixtures/does_not_exist.csv", &options_with(&obs));

    assert_eq!(report.valid_count(), 0);
    assert_eq!(report.error_count(), 1);
    assert!(matches!(report.rejections[0], Rejection::Source(_)));
    assert!(
        report.error_messages()[0]
            .starts_with("Error reading file tests/fixtures/does_not_exist.csv: ")
    );
    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
}

#[cfg(unix)]
#[test]
fn unreadable_file_does_not_stop_siblings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.csv"),
        "AB12,JFK,LAX,2024-01-01 10:00,2024-01-01 14:00,350.00\n",
    )
    .unwrap();
    std::os::unix::fs::symlink(dir.path().join("gone.csv"), dir.path().join("b.csv")).unwrap();
    std::fs::write(
        dir.path().join("c.csv"),
        "EF56,ORD,LAX,2024-01-03 18:00,2024-01-03 20:15,120\n",
    )
    .unwrap();

    let report = ingest_directory(dir.path(), &IngestionOptions::default()).unwrap();

    let ids: Vec<&str> = report.records.iter().map(|r| r.flight_id()).collect();
    assert_eq!(ids, vec!["AB12", "EF56"]);
    assert_eq!(report.error_count(), 1);
    assert!(report.error_messages()[0].contains("b.csv"));
}

#[test]
fn request_runs_file_and_directory_sources() {
    let file = IngestionRequest {
        source: IngestionSource::File(PathBuf::from("tests/fixtures/flights.csv")),
        options: IngestionOptions::default(),
    };
    assert_eq!(file.run().unwrap().valid_count(), 3);

    let dir = IngestionRequest {
        source: IngestionSource::Directory(PathBuf::from("tests/fixtures/schedules")),
        options: IngestionOptions::default(),
    };
    assert_eq!(dir.run().unwrap().valid_count(), 2);
}

fn event_log_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| {
            // Drop the leading timestamp.
            let (ts, rest) = line.split_once(' ').unwrap();
            assert!(ts.parse::<u64>().is_ok(), "timestamp in {line:?}");
            rest.to_string()
        })
        .collect()
}

#[test]
fn file_observer_logs_each_file_of_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("events.log");
    let observer = Arc::new(FileObserver::create(&log).unwrap());
    assert_eq!(observer.path(), log.as_path());

    let options = IngestionOptions {
        observer: Some(observer),
        ..Default::default()
    };
    ingest_directory("tests/fixtures/schedules", &options).unwrap();

    assert_eq!(
        event_log_lines(&log),
        vec![
            "ok path=tests/fixtures/schedules/a_morning.csv valid=1 rejected=1",
            "ok path=tests/fixtures/schedules/b_evening.csv valid=1 rejected=1",
        ]
    );
}

#[test]
fn file_observer_logs_failure_and_alert_for_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("events.log");
    let options = IngestionOptions {
        observer: Some(Arc::new(FileObserver::create(&log).unwrap())),
        ..Default::default()
    };

    ingest_file("tests/fixtures/does_not_exist.csv", &options);

    let lines = event_log_lines(&log);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("fail severity=Critical path=tests/fixtures/does_not_exist.csv err=io error: "));
    assert!(lines[1].starts_with("ALERT severity=Critical path=tests/fixtures/does_not_exist.csv err=io error: "));
}

#[test]
fn file_observer_appends_to_existing_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("events.log");
    std::fs::write(&log, "0 earlier run\n").unwrap();
    let empty = dir.path().join("empty");
    std::fs::create_dir(&empty).unwrap();

    let options = IngestionOptions {
        observer: Some(Arc::new(FileObserver::create(&log).unwrap())),
        ..Default::default()
    };
    ingest_directory(&empty, &options).unwrap();

    assert_eq!(
        event_log_lines(&log),
        vec!["earlier run".to_string(), format!("empty dir={}", empty.display())]
    );
}

#[test]
fn composite_observer_fans_out_to_every_member() {
    let first = Arc::new(RecordingObserver::default());
    let second = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::default()
        .with(first.clone())
        .with(second.clone());
    assert_eq!(composite.len(), 2);

    let options = IngestionOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };
    ingest_directory("tests/fixtures/schedules", &options).unwrap();
    ingest_file("tests/fixtures/does_not_exist.csv", &options);

    for member in [&first, &second] {
        assert_eq!(member.successes.lock().unwrap().len(), 2);
        assert_eq!(member.failures.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
        assert_eq!(member.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
    }
}

#[test]
fn rejected_lines_alone_are_not_failures() {
    let obs = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![obs.clone()]);
    assert!(!composite.is_empty());

    let options = IngestionOptions {
        observer: Some(Arc::new(composite)),
        alert_at_or_above: IngestionSeverity::Info,
        ..Default::default()
    };
    ingest_file("tests/fixtures/flights.csv", &options);

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].1.valid_records, 3);
    assert_eq!(successes[0].1.rejected_lines, 4);
    assert!(obs.failures.lock().unwrap().is_empty());
    assert!(obs.alerts.lock().unwrap().is_empty());
}
