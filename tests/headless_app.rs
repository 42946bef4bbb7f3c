// tests/headless_app.rs
// Drives the harmonizer plugin through a headless app.

use bevy::prelude::*;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use dataharmonizer::grid::CellIssue;
use dataharmonizer::harmonizer::events::{
    HarmonizerFeedback, RequestLoadTemplate, RequestNextInvalidCell, RequestOpenFile,
    RequestSaveAs, RequestValidateGrid, UpdateCellEvent, ValidationFinished,
};
use dataharmonizer::harmonizer::{HarmonizerPlugin, HarmonizerRegistry, DEFAULT_GRID};
use dataharmonizer::io::JsonIndex;
use dataharmonizer::settings::AppSettings;
use dataharmonizer::template::SchemaSource;

const SCHEMA: &str = r#"{
  "name": "demo",
  "classes": {
    "Sample": {
      "is_a": "dh_interface",
      "slots": [
        {"name": "sample id", "slot_group": "Identity", "requirement": "required"},
        {"name": "host", "slot_group": "Identity", "datatype": "select", "vocabulary": ["Human", "Bat"]},
        {"name": "count", "slot_group": "Measure", "datatype": "xs:nonNegativeInteger"}
      ]
    }
  }
}"#;

#[derive(Resource, Default)]
struct Feedback(Vec<HarmonizerFeedback>);

fn collect_feedback(mut events: EventReader<HarmonizerFeedback>, mut feedback: ResMut<Feedback>) {
    feedback.0.extend(events.read().cloned());
}

fn test_app(templates_dir: &Path) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(AppSettings {
            templates_dir: templates_dir.to_path_buf(),
            min_rows: 3,
            min_spare_rows: 1,
            ..default()
        })
        .add_plugins(HarmonizerPlugin)
        .init_resource::<Feedback>()
        .add_systems(Last, collect_feedback);
    app.update();
    app
}

/// Updates until no background work is in flight.
fn settle(app: &mut App) {
    app.update();
    for _ in 0..2000 {
        if !app.world().resource::<HarmonizerRegistry>().is_busy() {
            break;
        }
        thread::sleep(Duration::from_millis(2));
        app.update();
    }
    app.update();
    assert!(!app.world().resource::<HarmonizerRegistry>().is_busy());
}

fn messages(app: &App, errors_only: bool) -> Vec<String> {
    app.world()
        .resource::<Feedback>()
        .0
        .iter()
        .filter(|f| f.is_error || !errors_only)
        .map(|f| f.message.clone())
        .collect()
}

fn setup_workspace(root: &Path) {
    let schema_dir = root.join("templates").join("demo");
    fs::create_dir_all(&schema_dir).unwrap();
    fs::write(schema_dir.join("schema.json"), SCHEMA).unwrap();
    fs::write(
        root.join("data.csv"),
        "sample id,host,count\nS1,Human,3\n,Bat,x\nS3,Dog,4\n",
    )
    .unwrap();
}

fn load_and_open(app: &mut App, root: &Path) {
    app.world_mut().send_event(RequestLoadTemplate {
        grid: DEFAULT_GRID.to_string(),
        source: SchemaSource::Menu("demo/Sample".to_string()),
    });
    settle(app);
    app.world_mut().send_event(RequestOpenFile {
        grid: DEFAULT_GRID.to_string(),
        path: root.join("data.csv"),
    });
    settle(app);
}

#[test]
fn load_open_validate_navigate_and_save() {
    let tmp = tempfile::tempdir().unwrap();
    setup_workspace(tmp.path());
    let mut app = test_app(&tmp.path().join("templates"));

    load_and_open(&mut app, tmp.path());
    {
        let registry = app.world().resource::<HarmonizerRegistry>();
        let harmonizer = registry.get(DEFAULT_GRID).unwrap();
        assert_eq!(harmonizer.template().unwrap().path(), "demo/Sample");
        assert_eq!(harmonizer.grid().cell(2, 1), "Dog");
        // 3 imported rows + 1 spare
        assert_eq!(harmonizer.grid().count_rows(), 4);
    }

    app.world_mut().send_event(RequestValidateGrid {
        grid: DEFAULT_GRID.to_string(),
    });
    settle(&mut app);
    {
        let registry = app.world().resource::<HarmonizerRegistry>();
        let invalid = registry.get(DEFAULT_GRID).unwrap().invalid_cells();
        assert_eq!(invalid.cell_count(), 3);
        assert_eq!(invalid.get(1, 0), Some(&CellIssue::EmptyRequired));
        assert!(matches!(invalid.get(1, 2), Some(CellIssue::Invalid(_))));
        assert!(matches!(invalid.get(2, 1), Some(CellIssue::Invalid(_))));
    }

    let mut visited = Vec::new();
    for _ in 0..4 {
        app.world_mut().send_event(RequestNextInvalidCell {
            grid: DEFAULT_GRID.to_string(),
        });
        app.update();
        let registry = app.world().resource::<HarmonizerRegistry>();
        visited.push(registry.get(DEFAULT_GRID).unwrap().selection().focus().unwrap());
    }
    assert_eq!(visited, vec![(1, 0), (1, 2), (2, 1), (1, 0)]);

    let refused = tmp.path().join("refused.csv");
    app.world_mut().send_event(RequestSaveAs {
        grid: DEFAULT_GRID.to_string(),
        path: refused.clone(),
        format: None,
        index: JsonIndex::None,
        force: false,
    });
    app.update();
    assert!(!refused.exists());
    assert!(messages(&app, true).iter().any(|e| e.contains("3 invalid cell(s)")));

    let out = tmp.path().join("out.csv");
    app.world_mut().send_event(RequestSaveAs {
        grid: DEFAULT_GRID.to_string(),
        path: out.clone(),
        format: None,
        index: JsonIndex::None,
        force: true,
    });
    app.update();
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("sample id,host,count"));
    assert!(written.contains("S3,Dog,4"));
}

#[test]
fn edit_during_validation_discards_the_result() {
    let tmp = tempfile::tempdir().unwrap();
    setup_workspace(tmp.path());
    let mut app = test_app(&tmp.path().join("templates"));
    load_and_open(&mut app, tmp.path());

    app.world_mut().send_event(RequestValidateGrid {
        grid: DEFAULT_GRID.to_string(),
    });
    app.world_mut().send_event(UpdateCellEvent {
        grid: DEFAULT_GRID.to_string(),
        row: 2,
        col: 1,
        value: "Bat".to_string(),
    });
    settle(&mut app);

    let registry = app.world().resource::<HarmonizerRegistry>();
    let harmonizer = registry.get(DEFAULT_GRID).unwrap();
    assert!(harmonizer.invalid_cells().is_empty());
    assert!(!harmonizer.is_validated());
    assert!(messages(&app, false).iter().any(|m| m.contains("validate again")));
    assert!(messages(&app, true).is_empty());
}

#[test]
fn unknown_template_reports_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    setup_workspace(tmp.path());
    let mut app = test_app(&tmp.path().join("templates"));

    app.world_mut().send_event(RequestLoadTemplate {
        grid: DEFAULT_GRID.to_string(),
        source: SchemaSource::Menu("demo/Missing".to_string()),
    });
    settle(&mut app);

    let registry = app.world().resource::<HarmonizerRegistry>();
    assert!(registry.get(DEFAULT_GRID).unwrap().template().is_none());
    assert!(messages(&app, true).iter().any(|e| e.starts_with("Template load failed")));
}

#[test]
fn file_opened_during_template_switch_never_lands_in_the_new_template() {
    let tmp = tempfile::tempdir().unwrap();
    setup_workspace(tmp.path());
    let mut app = test_app(&tmp.path().join("templates"));
    app.world_mut().send_event(RequestLoadTemplate {
        grid: DEFAULT_GRID.to_string(),
        source: SchemaSource::Menu("demo/Sample".to_string()),
    });
    settle(&mut app);

    // Same frame: the open is parsed against the template being replaced.
    app.world_mut().send_event(RequestLoadTemplate {
        grid: DEFAULT_GRID.to_string(),
        source: SchemaSource::Menu("demo/Sample".to_string()),
    });
    app.world_mut().send_event(RequestOpenFile {
        grid: DEFAULT_GRID.to_string(),
        path: tmp.path().join("data.csv"),
    });
    settle(&mut app);

    let registry = app.world().resource::<HarmonizerRegistry>();
    let harmonizer = registry.get(DEFAULT_GRID).unwrap();
    assert_eq!(harmonizer.template().unwrap().path(), "demo/Sample");
    assert_eq!(harmonizer.grid().count_empty_rows(), harmonizer.grid().count_rows());
}

#[test]
fn failed_validation_task_keeps_previous_results() {
    let tmp = tempfile::tempdir().unwrap();
    setup_workspace(tmp.path());
    let mut app = test_app(&tmp.path().join("templates"));
    load_and_open(&mut app, tmp.path());
    app.world_mut().send_event(RequestValidateGrid {
        grid: DEFAULT_GRID.to_string(),
    });
    settle(&mut app);

    let ticket = app
        .world()
        .resource::<HarmonizerRegistry>()
        .get(DEFAULT_GRID)
        .unwrap()
        .ticket();
    app.world_mut().resource_mut::<Feedback>().0.clear();
    app.world_mut().send_event(ValidationFinished {
        grid: DEFAULT_GRID.to_string(),
        ticket,
        result: Err("Validation task failed: cancelled".to_string()),
    });
    app.update();

    let registry = app.world().resource::<HarmonizerRegistry>();
    assert_eq!(registry.get(DEFAULT_GRID).unwrap().invalid_cells().cell_count(), 3);
    assert!(messages(&app, true).iter().any(|e| e.contains("cancelled")));
    assert!(!messages(&app, false).iter().any(|m| m.contains("Validation passed")));
}
