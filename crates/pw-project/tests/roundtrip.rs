use pw_project::schema::*;
use pw_project::{ProjectError, ValidationError, load_yaml, parse_yaml, save_yaml};

#[test]
fn roundtrip_yaml_default_plant() {
    let plant = pw_project::default_plant().unwrap();

    let path = std::env::temp_dir().join("pw_project_roundtrip_default.yaml");
    save_yaml(&path, &plant).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(plant, loaded);
}

#[test]
fn omitted_fields_take_defaults() {
    let plant = parse_yaml(
        r#"
version: 1
name: lone_turntable
turntables:
  - name: tt
    diameter: 75
    turn_clockwise: CW
    turn_counter_clockwise: CCW
    horizontal_sensor: H
    vertical_sensor: V
"#,
    )
    .unwrap();

    assert_eq!(plant.tick_period_ms, DEFAULT_TICK_PERIOD_MS);
    assert!(plant.sensors.is_empty());
    assert!(plant.storage.is_none());
    let tt = &plant.turntables[0];
    assert_eq!(tt.step_size, 1);
    assert_eq!(tt.reset_position, 40);
    assert_eq!(tt.conveyor_left, None);
}

#[test]
fn save_refuses_invalid_plant() {
    let mut plant = pw_project::default_plant().unwrap();
    plant.gates[0].right.open = plant.gates[0].left.open.clone();

    let path = std::env::temp_dir().join("pw_project_roundtrip_invalid.yaml");
    let err = save_yaml(&path, &plant).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::DuplicateTag { .. })
    ));
}

#[test]
fn malformed_yaml_is_a_yaml_error() {
    let err = parse_yaml("version: [1\nname: x").unwrap_err();
    assert!(matches!(err, ProjectError::Yaml(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let path = std::env::temp_dir().join("pw_project_definitely_missing.yaml");
    let err = load_yaml(&path).unwrap_err();
    assert!(matches!(err, ProjectError::Io(_)));
}
