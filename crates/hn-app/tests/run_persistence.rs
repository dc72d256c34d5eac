use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use hn_app::{
    AppError, RunOptions, RunRequest, RunStage, consumer_series, ensure_run,
    ensure_run_with_progress, get_run_summary, list_runs, load_run,
};
use hn_project::{ProjectBuilder, SimulationDef, save_yaml};
use hn_results::RunType;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn write_district(prefix: &str, chunk_hours: Option<usize>) -> PathBuf {
    let dir = unique_temp_dir(prefix);
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    let project = ProjectBuilder::new("district")
        .street("main", &[[0.0, 0.0], [200.0, 0.0]])
        .producer("plant", [0.0, 10.0])
        .consumer("house-1", [60.0, 10.0], Some("d1"))
        .consumer("house-2", [140.0, -10.0], Some("d2"))
        .demand("d1", vec![20_000.0, 300.0, 15_000.0])
        .demand("d2", vec![12_000.0, 200.0, 9_000.0])
        .simulation(SimulationDef {
            chunk_hours,
            ..SimulationDef::default()
        })
        .build();
    let path = dir.join("district.yaml");
    save_yaml(&path, &project).expect("failed to save project");
    path
}

#[test]
fn run_is_persisted_and_then_served_from_cache() {
    let project_path = write_district("hn_app_cache", None);
    let request = RunRequest {
        project_path: &project_path,
        options: RunOptions::default(),
    };

    let mut stages = Vec::new();
    let mut hourly = 0;
    let mut cb = |event: hn_app::RunProgressEvent| {
        if event.hourly.is_some() {
            hourly += 1;
        } else {
            stages.push(event.stage);
        }
    };
    let first = ensure_run_with_progress(&request, Some(&mut cb)).expect("run failed");
    assert!(!first.loaded_from_cache);
    assert_eq!(hourly, 3);
    assert_eq!(stages.first(), Some(&RunStage::LoadingProject));
    assert_eq!(stages.last(), Some(&RunStage::Completed));
    assert!(stages.contains(&RunStage::Simulating));

    assert_eq!(first.manifest.consumer_ids, vec!["house-1", "house-2"]);
    assert!(matches!(first.manifest.run_type, RunType::Hourly { hours: 3, .. }));

    let second = ensure_run(&request).expect("cached run failed");
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);

    let runs = list_runs(&project_path).expect("failed to list runs");
    assert_eq!(runs.len(), 1);

    let (manifest, record) = load_run(&project_path, &first.run_id).expect("failed to load run");
    assert_eq!(record.hours.len(), 3);
    assert!(record.hours.iter().all(|h| h.consumers.len() == 2));

    let summary = get_run_summary(&manifest, &record).expect("failed to summarize");
    assert_eq!(summary.hour_range, (0, 2));
    assert_eq!(summary.consumer_count, 2);
    assert!(summary.worst_point.is_some());
    assert!(summary.pump.heat_kwh > 0.0);

    let demand = consumer_series(&manifest, &record, "house-1", "qext_w").expect("series");
    assert_eq!(demand, vec![(0, 20_000.0), (1, 300.0), (2, 15_000.0)]);
    assert!(consumer_series(&manifest, &record, "house-9", "qext_w").is_err());
    assert!(consumer_series(&manifest, &record, "house-1", "colour").is_err());
}

#[test]
fn disabling_the_cache_reruns() {
    let project_path = write_district("hn_app_nocache", None);
    let cached = RunRequest {
        project_path: &project_path,
        options: RunOptions::default(),
    };
    let first = ensure_run(&cached).expect("run failed");

    let fresh = RunRequest {
        project_path: &project_path,
        options: RunOptions {
            use_cache: false,
            ..RunOptions::default()
        },
    };
    let second = ensure_run(&fresh).expect("rerun failed");
    assert!(!second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);
}

#[test]
fn chunked_runs_get_their_own_id() {
    let project_path = write_district("hn_app_chunks", Some(1));
    let request = RunRequest {
        project_path: &project_path,
        options: RunOptions::default(),
    };
    let chunked = ensure_run(&request).expect("chunked run failed");
    assert!(matches!(
        chunked.manifest.run_type,
        RunType::ChunkParallel { chunk_hours: 1, .. }
    ));

    let sequential = RunRequest {
        project_path: &project_path,
        options: RunOptions {
            chunk_hours: None,
            ..RunOptions::default()
        },
    };
    // The project still asks for chunks, so the id is unchanged.
    let again = ensure_run(&sequential).expect("run failed");
    assert_eq!(again.run_id, chunked.run_id);

    let (_, record) = load_run(&project_path, &chunked.run_id).expect("load failed");
    let hours: Vec<usize> = record.hours.iter().map(|h| h.hour).collect();
    assert_eq!(hours, vec![0, 1, 2]);
}

#[test]
fn missing_project_and_run_are_errors() {
    let dir = unique_temp_dir("hn_app_missing");
    let project_path = dir.join("nope.yaml");
    let request = RunRequest {
        project_path: &project_path,
        options: RunOptions::default(),
    };
    assert!(matches!(
        ensure_run(&request),
        Err(AppError::ProjectFileRead { .. })
    ));

    let existing = write_district("hn_app_norun", None);
    assert!(matches!(
        load_run(&existing, "deadbeef"),
        Err(AppError::RunNotFound(_))
    ));
}
