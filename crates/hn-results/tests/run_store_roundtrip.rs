use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use hn_controls::ConvergenceStatus;
use hn_results::{ResultsError, RunManifest, RunStore, RunType};
use hn_sim::{ConsumerRecord, HourRecord, PumpRecord};
use hn_solver::PipeElement;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn manifest(run_id: &str, project: &str, timestamp: &str) -> RunManifest {
    RunManifest {
        run_id: run_id.to_string(),
        project_name: project.to_string(),
        timestamp: timestamp.to_string(),
        run_type: RunType::Hourly {
            first_hour: 0,
            hours: 2,
            max_iterations: 100,
        },
        solver_version: "reference-quadratic-v1".to_string(),
        worst_point: 1,
        consumer_ids: vec!["h1".to_string(), "h2".to_string()],
        unconverged_hours: vec![1],
    }
}

fn hour(h: usize, consumers: usize) -> HourRecord {
    let consumer = ConsumerRecord {
        qext_w: 8_000.0,
        mdot_kg_s: 0.1,
        t_from_k: 355.0,
        t_to_k: 336.0,
        p_from_bar: 3.8,
        p_to_bar: 2.7,
        target_return_c: 60.0,
        supply_met: true,
        status: ConvergenceStatus::Converged,
    };
    HourRecord {
        hour: h,
        iterations: 4,
        converged: h == 0,
        pump: PumpRecord {
            mdot_kg_s: 0.2,
            lift_bar: 1.5,
            p_flow_bar: 4.0,
            p_return_bar: 2.5,
            t_flow_k: 358.15,
            t_return_k: 336.0,
            heat_w: 18_000.0,
            status: ConvergenceStatus::Converged,
        },
        consumers: vec![consumer; consumers],
        pipes: vec![PipeElement {
            mdot_kg_s: 0.2,
            dp_bar: 0.05,
            t_k: 357.0,
        }],
    }
}

#[test]
fn save_list_load_roundtrip() {
    let project_dir = unique_temp_dir("hn_results_project");
    fs::create_dir_all(&project_dir).expect("failed to create temp project dir");
    let project_path = project_dir.join("project.yaml");
    fs::write(&project_path, "version: 2\nname: test\n").expect("failed to write project file");

    let store = RunStore::for_project(&project_path).expect("failed to create run store");
    assert!(store.root_dir().ends_with(".heatnet/runs"));

    let m = manifest("run-123", "demo", "2026-02-26T00:00:00Z");
    let hours = vec![hour(0, 2), hour(1, 2)];
    store.save_run(&m, &hours).expect("failed to save run");
    assert!(store.has_run("run-123"));

    let runs = store.list_runs("demo").expect("failed to list runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, m.run_id);
    assert_eq!(runs[0].run_type, m.run_type);
    assert_eq!(runs[0].worst_point_id(), Some("h2"));

    let (loaded, record) = store.load_record("run-123").expect("failed to load run");
    assert_eq!(loaded.unconverged_hours, vec![1]);
    assert_eq!(record.worst_point, 1);
    assert_eq!(record.hours.len(), hours.len());
    assert_eq!(record.hours[1].consumers.len(), 2);
    assert!((record.hours[0].pump.heat_w - 18_000.0).abs() < 1e-9);
    assert_eq!(record.unconverged_hours(), vec![1]);

    store.delete_run("run-123").expect("failed to delete run");
    assert!(!store.has_run("run-123"));
    let _ = fs::remove_dir_all(project_dir);
}

#[test]
fn list_runs_filters_by_project_and_sorts() {
    let store = RunStore::new(unique_temp_dir("hn_results_list")).unwrap();

    store
        .save_run(&manifest("b", "alpha", "2026-02-25T13:00:00Z"), &[])
        .unwrap();
    store
        .save_run(&manifest("a", "alpha", "2026-02-25T12:00:00Z"), &[])
        .unwrap();
    store
        .save_run(&manifest("c", "beta", "2026-02-25T14:00:00Z"), &[])
        .unwrap();

    let alpha: Vec<String> = store
        .list_runs("alpha")
        .unwrap()
        .into_iter()
        .map(|m| m.run_id)
        .collect();
    assert_eq!(alpha, vec!["a", "b"]);
    assert_eq!(store.list_runs("beta").unwrap().len(), 1);
    assert!(store.list_runs("gamma").unwrap().is_empty());
}

#[test]
fn missing_and_corrupt_runs_are_errors() {
    let store = RunStore::new(unique_temp_dir("hn_results_missing")).unwrap();
    assert!(matches!(
        store.load_manifest("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));

    store
        .save_run(&manifest("short", "demo", "2026-02-25T12:00:00Z"), &[hour(0, 1)])
        .unwrap();
    assert!(matches!(
        store.load_record("short"),
        Err(ResultsError::Corrupt { .. })
    ));
}
