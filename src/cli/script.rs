// src/cli/script.rs
//! Runs a fixed list of harmonizer requests in a headless app, one step at a
//! time, waiting for background work between steps.

use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use super::report;
use crate::harmonizer::events::{
    HarmonizerFeedback, RequestExportTo, RequestLoadTemplate, RequestOpenFile, RequestSaveAs,
    RequestValidateGrid,
};
use crate::harmonizer::{HarmonizerPlugin, HarmonizerRegistry, HarmonizerSystemSet, TemplateCatalog, DEFAULT_GRID};
use crate::io::JsonIndex;
use crate::settings::AppSettings;
use crate::template::SchemaSource;

pub const EXIT_INVALID_CELLS: u8 = 1;
pub const EXIT_FAILURE: u8 = 2;

#[derive(Debug, Clone)]
pub enum ScriptStep {
    ListTemplates { drafts: bool },
    /// `None` resolves to the configured default template.
    LoadTemplate(Option<SchemaSource>),
    PrintFields,
    OpenFile(PathBuf),
    Validate,
    ReportInvalidCells,
    SaveAs {
        path: PathBuf,
        index: JsonIndex,
        force: bool,
    },
    ExportTo {
        path: PathBuf,
        format_name: String,
        force: bool,
    },
}

#[derive(Resource, Debug, Default)]
pub struct CliScript {
    pub steps: VecDeque<ScriptStep>,
    pub exit_code: u8,
    pub failure: Option<String>,
    pub finished: bool,
}

impl CliScript {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            ..default()
        }
    }
}

/// Headless app: minimal plugins, logging and the harmonizer.
pub fn build_app(settings: AppSettings, steps: Vec<ScriptStep>) -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(5))),
        LogPlugin {
            level: bevy::log::Level::INFO,
            filter: "bevy_tokio_tasks=warn,calamine=warn".to_string(),
            ..default()
        },
    ))
    .insert_resource(settings)
    .add_plugins(HarmonizerPlugin)
    .insert_resource(CliScript::new(steps))
    .add_systems(
        Update,
        run_script_step.before(HarmonizerSystemSet::UserInput),
    );
    app
}

pub fn run_script(settings: AppSettings, steps: Vec<ScriptStep>) -> AppExit {
    build_app(settings, steps).run()
}

/// Resolves the template for a `LoadTemplate(None)` step.
fn default_source(settings: &AppSettings, catalog: &TemplateCatalog) -> Option<SchemaSource> {
    settings
        .default_template
        .clone()
        .or_else(|| catalog.0.default_path())
        .map(SchemaSource::Menu)
}

#[allow(clippy::too_many_arguments)]
pub fn run_script_step(
    mut script: ResMut<CliScript>,
    registry: Res<HarmonizerRegistry>,
    catalog: Res<TemplateCatalog>,
    settings: Res<AppSettings>,
    mut feedback: EventReader<HarmonizerFeedback>,
    mut load_writer: EventWriter<RequestLoadTemplate>,
    mut open_writer: EventWriter<RequestOpenFile>,
    mut validate_writer: EventWriter<RequestValidateGrid>,
    mut save_writer: EventWriter<RequestSaveAs>,
    mut export_writer: EventWriter<RequestExportTo>,
    mut exit_writer: EventWriter<AppExit>,
) {
    for message in feedback.read() {
        if message.is_error && script.failure.is_none() {
            script.failure = Some(message.message.clone());
        }
    }
    if script.finished {
        return;
    }
    if let Some(failure) = &script.failure {
        eprintln!("Error: {}", failure);
        script.finished = true;
        exit_writer.write(AppExit::from_code(EXIT_FAILURE));
        return;
    }
    if registry.is_busy() {
        return;
    }

    let Some(step) = script.steps.pop_front() else {
        script.finished = true;
        exit_writer.write(AppExit::from_code(script.exit_code));
        return;
    };
    debug!("CLI step: {:?}", step);
    let grid = DEFAULT_GRID.to_string();
    match step {
        ScriptStep::ListTemplates { drafts } => {
            report::print_templates(&catalog.0, drafts || settings.view_draft_templates);
        }
        ScriptStep::LoadTemplate(source) => {
            match source.or_else(|| default_source(&settings, &catalog)) {
                Some(source) => {
                    load_writer.write(RequestLoadTemplate { grid, source });
                }
                None => {
                    script.failure = Some(format!(
                        "No template given and none found in '{}'.",
                        settings.templates_dir.display()
                    ));
                }
            }
        }
        ScriptStep::PrintFields => match registry.get(&grid).and_then(|h| h.template()) {
            Some(template) => report::print_fields(template),
            None => script.failure = Some("No template loaded.".to_string()),
        },
        ScriptStep::OpenFile(path) => {
            open_writer.write(RequestOpenFile { grid, path });
        }
        ScriptStep::Validate => {
            validate_writer.write(RequestValidateGrid { grid });
        }
        ScriptStep::ReportInvalidCells => {
            if let Some(harmonizer) = registry.get(&grid) {
                if let Some(template) = harmonizer.template() {
                    let invalid = harmonizer.invalid_cells();
                    report::print_invalid_cells(template, invalid);
                    if !invalid.is_empty() {
                        script.exit_code = EXIT_INVALID_CELLS;
                    }
                }
            }
        }
        ScriptStep::SaveAs { path, index, force } => {
            save_writer.write(RequestSaveAs {
                grid,
                path,
                format: None,
                index,
                force,
            });
        }
        ScriptStep::ExportTo {
            path,
            format_name,
            force,
        } => {
            export_writer.write(RequestExportTo {
                grid,
                path,
                format_name,
                force,
            });
        }
    }
}
