//! Smoke test for the hn-app service layer.

use std::time::{SystemTime, UNIX_EPOCH};

use hn_app::{
    AppError, build_network_handle, connection_points, export_layers, generate_network,
    prepare_simulation, summarize, validate_project,
};
use hn_project::{ProjectBuilder, SimulationDef};

fn district() -> ProjectBuilder {
    ProjectBuilder::new("smoke")
        .street("main", &[[0.0, 0.0], [100.0, 0.0], [100.0, 80.0]])
        .producer("plant", [0.0, 8.0])
        .consumer("a", [40.0, 8.0], Some("d1"))
        .consumer("b", [92.0, 50.0], Some("d2"))
        .consumer("idle", [70.0, -8.0], None)
        .demand("d1", vec![10_000.0, 8_000.0])
        .demand("d2", vec![6_000.0, 4_000.0])
}

#[test]
fn summary_counts_points_and_peak() {
    let project = district().build();
    validate_project(&project).expect("valid project");
    let summary = summarize(&project);
    assert_eq!(summary.consumers, 3);
    assert_eq!(summary.producers, 1);
    assert_eq!(summary.hours, 2);
    assert!((summary.peak_demand_w - 16_000.0).abs() < 1e-9);
}

#[test]
fn connection_points_follow_project_order() {
    let project = district().build();
    let points = connection_points(&project);
    assert_eq!(points.len(), 4);
    assert!(points[0].is_producer());
    assert_eq!(points[1].peak_demand_w, 10_000.0);
    assert_eq!(points[3].peak_demand_w, 0.0);
}

#[test]
fn prepared_simulation_lines_up_with_consumers() {
    let project = district().build();
    let setup = prepare_simulation(&project).expect("setup failed");

    assert_eq!(setup.consumer_ids, vec!["a", "b", "idle"]);
    assert_eq!(setup.handle.consumer_count(), 3);
    assert_eq!(setup.inputs.consumers.len(), 3);
    assert_eq!(setup.inputs.hours(), 2);
    assert_eq!(setup.inputs.qext_w(0), vec![10_000.0, 6_000.0, 0.0]);
    assert!(setup.network.forward.topology.is_connected());
}

#[test]
fn named_worst_point_resolves_to_network_index() {
    let project = district()
        .simulation(SimulationDef {
            worst_point: Some("b".to_string()),
            ..SimulationDef::default()
        })
        .build();
    let setup = prepare_simulation(&project).expect("setup failed");
    assert_eq!(setup.options.worst_point, Some(1));
}

#[test]
fn project_without_producer_cannot_simulate() {
    let project = ProjectBuilder::new("orphan")
        .street("main", &[[0.0, 0.0], [100.0, 0.0]])
        .consumer("a", [40.0, 8.0], Some("d1"))
        .demand("d1", vec![1_000.0])
        .build();
    let network = generate_network(&project).expect("generation still works");
    assert!(matches!(
        build_network_handle(&project, &network),
        Err(AppError::InvalidInput(_))
    ));
}

#[test]
fn layers_are_written_as_geojson() {
    let project = district().build();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let out = std::env::temp_dir().join(format!("hn_app_layers_{nanos}"));

    let (_, report) = export_layers(&project, &out).expect("export failed");
    assert_eq!(report.files.len(), 4);
    assert!(report.unconnectable.is_empty());
    assert!(report.forward_pipes > 0);
    assert!(report.forward_length_m > 0.0);

    let forward = std::fs::read_to_string(out.join("forward.geojson")).expect("forward layer");
    let value: serde_json::Value = serde_json::from_str(&forward).expect("json");
    assert_eq!(value["type"], "FeatureCollection");
    assert_eq!(
        value["features"].as_array().map(Vec::len),
        Some(report.forward_pipes)
    );
}

#[test]
fn demo_project_loads_and_prepares() {
    let mut project_path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    project_path.pop(); // go to crates
    project_path.pop(); // go to repo root
    project_path.push("demos");
    project_path.push("district.yaml");

    if !project_path.exists() {
        eprintln!("Skipping test: demo project not found at {:?}", project_path);
        return;
    }

    let project = hn_app::load_project(&project_path).expect("Failed to load demo project");
    let summary = summarize(&project);
    assert_eq!(summary.consumers, 3);
    assert_eq!(summary.hours, 6);

    let setup = prepare_simulation(&project).expect("demo setup failed");
    assert_eq!(setup.inputs.hours(), 6);
    assert_eq!(setup.inputs.supply_temperature_c.as_ref().map(Vec::len), Some(6));
    assert!(setup.options.return_temperature.min_supply_control);
}
