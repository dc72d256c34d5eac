use hn_netgen::{Algorithm, GenerationOptions, ReturnOffset};
use hn_project::schema::*;
use hn_project::{ProjectBuilder, load_json, load_project, load_yaml, save_json, save_yaml};

fn district() -> Project {
    ProjectBuilder::new("Roundtrip District")
        .street("main", &[[0.0, 0.0], [200.0, 0.0]])
        .street("side", &[[100.0, 0.0], [100.0, 80.0]])
        .producer("plant", [0.0, 12.0])
        .consumer("h1", [60.0, 8.0], Some("d1"))
        .consumer("h2", [110.0, 40.0], Some("d2"))
        .demand("d1", vec![12_000.0, 9_000.0, 400.0])
        .demand("d2", vec![8_000.0, 7_500.0, 300.0])
        .network(GenerationOptions {
            algorithm: Algorithm::AStar,
            return_offset: ReturnOffset {
                distance_m: 2.0,
                angle_deg: 90.0,
            },
            ..GenerationOptions::default()
        })
        .build()
}

#[test]
fn roundtrip_yaml_district() {
    let project = district();
    let path = std::env::temp_dir().join("hn_project_roundtrip_district.yaml");

    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(project, loaded);

    let by_extension = load_project(&path).unwrap();
    assert_eq!(project, by_extension);
}

#[test]
fn roundtrip_json_district() {
    let mut project = district();
    project.demand_series[0].target_return_c = Some(vec![55.0, 50.0, 60.0]);
    project.plant.supply_schedule_c = Some(vec![90.0, 85.0, 80.0]);
    project.simulation.worst_point = Some("h2".to_string());
    project.simulation.hours = Some(0..2);

    let path = std::env::temp_dir().join("hn_project_roundtrip_district.json");
    save_json(&path, &project).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(project, loaded);
}

#[test]
fn minimal_yaml_takes_defaults() {
    let yaml = r#"
version: 2
name: Minimal
streets:
  - id: s1
    points: [[0.0, 0.0], [50.0, 0.0]]
points:
  - id: plant
    x: 0.0
    y: 5.0
    role: producer
  - id: h1
    x: 25.0
    y: 5.0
    demand: d1
demand_series:
  - id: d1
    hourly_w: [1000.0, 2000.0]
"#;
    let path = std::env::temp_dir().join("hn_project_minimal.yaml");
    std::fs::write(&path, yaml).unwrap();
    let project = load_yaml(&path).unwrap();

    assert_eq!(project.network, GenerationOptions::default());
    assert_eq!(project.pipes.pipe_type, "KMR 100/250-2v");
    assert_eq!(project.plant.lift_bar, 1.5);
    assert_eq!(project.controls.pressure.target_dp_bar, 1.0);
    assert_eq!(project.controls.return_temperature.bypass_w, 500.0);
    assert_eq!(project.points[1].role, PointRoleDef::Consumer);
}

#[test]
fn version_one_file_is_migrated() {
    let yaml = r#"
version: 1
name: Legacy
points:
  - id: erzeuger-1
    x: 0.0
    y: 0.0
"#;
    let path = std::env::temp_dir().join("hn_project_legacy.yaml");
    std::fs::write(&path, yaml).unwrap();
    let project = load_yaml(&path).unwrap();

    assert_eq!(project.version, hn_project::LATEST_VERSION);
    assert_eq!(project.points[0].role, PointRoleDef::Producer);
}
