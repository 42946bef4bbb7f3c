// src/harmonizer/systems/validation.rs
use bevy::prelude::*;
use bevy_tokio_tasks::TokioTasksRuntime;

use super::{send_feedback, SendEvent};
use crate::grid::validate_grid;
use crate::harmonizer::events::{
    HarmonizerFeedback, RequestValidateGrid, ValidationCompleted, ValidationFinished,
};
use crate::harmonizer::resources::HarmonizerRegistry;

pub fn handle_validate_request(
    mut events: EventReader<RequestValidateGrid>,
    mut registry: ResMut<HarmonizerRegistry>,
    runtime: Res<TokioTasksRuntime>,
    mut feedback_writer: EventWriter<HarmonizerFeedback>,
) {
    for event in events.read() {
        let Some(harmonizer) = registry.get_mut(&event.grid) else {
            send_feedback(
                &mut feedback_writer,
                &event.grid,
                format!("Cannot validate unknown grid '{}'.", event.grid),
                true,
            );
            continue;
        };
        let Some(template) = harmonizer.shared_template() else {
            send_feedback(&mut feedback_writer, &event.grid, "No template loaded.", true);
            continue;
        };
        let ticket = harmonizer.ticket();
        let snapshot = harmonizer.grid().clone();
        harmonizer.overlay_mut().begin();
        debug!("Validating grid '{}' at {:?}.", event.grid, ticket);

        let grid = event.grid.clone();
        runtime.spawn_background_task(move |mut ctx| async move {
            let result = tokio::task::spawn_blocking(move || validate_grid(&template, &snapshot))
                .await
                .map_err(|e| format!("Validation task failed: {}", e));

            ctx.run_on_main_thread(move |world_ctx| {
                world_ctx.world.spawn(SendEvent {
                    event: ValidationFinished {
                        grid,
                        ticket,
                        result,
                    },
                });
            })
            .await;
        });
    }
}

pub fn handle_validation_finished(
    mut events: EventReader<ValidationFinished>,
    mut registry: ResMut<HarmonizerRegistry>,
    mut feedback_writer: EventWriter<HarmonizerFeedback>,
    mut completed_writer: EventWriter<ValidationCompleted>,
) {
    for event in events.read() {
        let Some(harmonizer) = registry.get_mut(&event.grid) else {
            continue;
        };
        harmonizer.overlay_mut().end();
        let invalid_cells = match &event.result {
            Ok(invalid_cells) => invalid_cells.clone(),
            Err(e) => {
                send_feedback(&mut feedback_writer, &event.grid, e.clone(), true);
                continue;
            }
        };
        if !harmonizer.apply_validation(event.ticket, invalid_cells) {
            send_feedback(
                &mut feedback_writer,
                &event.grid,
                "The grid changed during validation; validate again.",
                false,
            );
            continue;
        }
        let invalid = harmonizer.invalid_cells();
        let message = if invalid.is_empty() {
            "Validation passed.".to_string()
        } else {
            format!(
                "Validation found {} invalid cell(s) in {} row(s).",
                invalid.cell_count(),
                invalid.row_count()
            )
        };
        let invalid_cells = invalid.cell_count();
        send_feedback(&mut feedback_writer, &event.grid, message, false);
        completed_writer.write(ValidationCompleted {
            grid: event.grid.clone(),
            invalid_cells,
        });
    }
}
