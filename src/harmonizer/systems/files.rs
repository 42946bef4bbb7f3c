// src/harmonizer/systems/files.rs
use bevy::prelude::*;
use bevy_tokio_tasks::TokioTasksRuntime;

use super::{send_feedback, SendEvent};
use crate::error::HarmonizerError;
use crate::harmonizer::events::{
    FileOpenFinished, FileWritten, GridDataReplaced, HarmonizerFeedback, RequestExportTo,
    RequestOpenFile, RequestSaveAs,
};
use crate::harmonizer::resources::HarmonizerRegistry;
use crate::io::{import_file, save_target};

pub fn handle_open_file_request(
    mut events: EventReader<RequestOpenFile>,
    mut registry: ResMut<HarmonizerRegistry>,
    runtime: Res<TokioTasksRuntime>,
    mut feedback_writer: EventWriter<HarmonizerFeedback>,
) {
    for event in events.read() {
        let Some(harmonizer) = registry.get_mut(&event.grid) else {
            send_feedback(
                &mut feedback_writer,
                &event.grid,
                HarmonizerError::UnknownGrid(event.grid.clone()).to_string(),
                true,
            );
            continue;
        };
        let Some(template) = harmonizer.shared_template() else {
            send_feedback(
                &mut feedback_writer,
                &event.grid,
                format!("Cannot open '{}': {}", event.path.display(), HarmonizerError::NoTemplate),
                true,
            );
            continue;
        };
        let ticket = harmonizer.ticket();
        harmonizer.overlay_mut().begin();
        info!("Opening '{}' into grid '{}'.", event.path.display(), event.grid);

        let grid = event.grid.clone();
        let path = event.path.clone();
        runtime.spawn_background_task(move |mut ctx| async move {
            let task_path = path.clone();
            let result = tokio::task::spawn_blocking(move || {
                import_file(&task_path, &template).map_err(|e| e.to_string())
            })
            .await
            .unwrap_or_else(|e| Err(format!("File open task failed: {}", e)));

            ctx.run_on_main_thread(move |world_ctx| {
                world_ctx.world.spawn(SendEvent {
                    event: FileOpenFinished {
                        grid,
                        ticket,
                        path,
                        result,
                    },
                });
            })
            .await;
        });
    }
}

pub fn handle_file_open_finished(
    mut events: EventReader<FileOpenFinished>,
    mut registry: ResMut<HarmonizerRegistry>,
    mut feedback_writer: EventWriter<HarmonizerFeedback>,
    mut replaced_writer: EventWriter<GridDataReplaced>,
) {
    for event in events.read() {
        let Some(harmonizer) = registry.get_mut(&event.grid) else {
            continue;
        };
        harmonizer.overlay_mut().end();
        if !harmonizer.is_current_generation(event.ticket) {
            send_feedback(
                &mut feedback_writer,
                &event.grid,
                format!(
                    "Discarded '{}': the template changed while it was loading.",
                    event.path.display()
                ),
                true,
            );
            continue;
        }
        let report = match &event.result {
            Ok(report) => report.clone(),
            Err(e) => {
                send_feedback(&mut feedback_writer, &event.grid, e.clone(), true);
                continue;
            }
        };
        let unmapped = report.unmapped_headers.clone();
        match harmonizer.open_rows(report) {
            Ok(rows) => {
                let mut message = format!("Opened {} row(s) from '{}'.", rows, event.path.display());
                if !unmapped.is_empty() {
                    message.push_str(&format!(" Ignored columns: {}.", unmapped.join(", ")));
                }
                send_feedback(&mut feedback_writer, &event.grid, message, false);
                replaced_writer.write(GridDataReplaced {
                    grid: event.grid.clone(),
                    rows,
                });
            }
            Err(e) => send_feedback(&mut feedback_writer, &event.grid, e.to_string(), true),
        }
    }
}

pub fn handle_save_as_request(
    mut events: EventReader<RequestSaveAs>,
    mut registry: ResMut<HarmonizerRegistry>,
    mut feedback_writer: EventWriter<HarmonizerFeedback>,
    mut written_writer: EventWriter<FileWritten>,
) {
    for event in events.read() {
        let result = registry.require_mut(&event.grid).and_then(|harmonizer| {
            let format = match event.format {
                Some(format) => format,
                None => save_target(&event.path)?,
            };
            harmonizer.save_as(&event.path, format, &event.index, event.force)
        });
        match result {
            Ok(rows) => {
                send_feedback(
                    &mut feedback_writer,
                    &event.grid,
                    format!("Saved {} row(s) to '{}'.", rows, event.path.display()),
                    false,
                );
                written_writer.write(FileWritten {
                    grid: event.grid.clone(),
                    path: event.path.clone(),
                    rows,
                });
            }
            Err(e) => send_feedback(
                &mut feedback_writer,
                &event.grid,
                format!("Save failed: {}", e),
                true,
            ),
        }
    }
}

pub fn handle_export_to_request(
    mut events: EventReader<RequestExportTo>,
    mut registry: ResMut<HarmonizerRegistry>,
    mut feedback_writer: EventWriter<HarmonizerFeedback>,
    mut written_writer: EventWriter<FileWritten>,
) {
    for event in events.read() {
        let result = registry
            .require_mut(&event.grid)
            .and_then(|harmonizer| harmonizer.export_to(&event.path, &event.format_name, event.force));
        match result {
            Ok(rows) => {
                send_feedback(
                    &mut feedback_writer,
                    &event.grid,
                    format!(
                        "Exported {} row(s) to '{}' as {}.",
                        rows,
                        event.path.display(),
                        event.format_name
                    ),
                    false,
                );
                written_writer.write(FileWritten {
                    grid: event.grid.clone(),
                    path: event.path.clone(),
                    rows,
                });
            }
            Err(e) => send_feedback(
                &mut feedback_writer,
                &event.grid,
                format!("Export failed: {}", e),
                true,
            ),
        }
    }
}
