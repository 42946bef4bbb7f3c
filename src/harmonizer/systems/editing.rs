// src/harmonizer/systems/editing.rs
use bevy::prelude::*;

use super::send_feedback;
use crate::harmonizer::events::{
    GridDataReplaced, HarmonizerFeedback, MultiValueEditOpened, RequestAddRows,
    RequestBeginMultiValueEdit, RequestCommitMultiValueEdit, RequestFillColumn, RequestNewGrid,
    UpdateCellEvent,
};
use crate::harmonizer::resources::HarmonizerRegistry;

pub fn handle_new_grid_request(
    mut events: EventReader<RequestNewGrid>,
    mut registry: ResMut<HarmonizerRegistry>,
    mut feedback_writer: EventWriter<HarmonizerFeedback>,
    mut replaced_writer: EventWriter<GridDataReplaced>,
) {
    for event in events.read() {
        match registry.require_mut(&event.grid).and_then(|h| h.new_grid()) {
            Ok(()) => {
                info!("Grid '{}' cleared.", event.grid);
                replaced_writer.write(GridDataReplaced {
                    grid: event.grid.clone(),
                    rows: 0,
                });
            }
            Err(e) => send_feedback(&mut feedback_writer, &event.grid, e.to_string(), true),
        }
    }
}

pub fn handle_add_rows_request(
    mut events: EventReader<RequestAddRows>,
    mut registry: ResMut<HarmonizerRegistry>,
) {
    for event in events.read() {
        if let Some(harmonizer) = registry.get_mut(&event.grid) {
            harmonizer.add_rows(event.count);
            debug!("Grid '{}': added {} row(s).", event.grid, event.count);
        }
    }
}

pub fn handle_cell_update(
    mut events: EventReader<UpdateCellEvent>,
    mut registry: ResMut<HarmonizerRegistry>,
    mut feedback_writer: EventWriter<HarmonizerFeedback>,
) {
    for event in events.read() {
        let Some(harmonizer) = registry.get_mut(&event.grid) else {
            continue;
        };
        let columns = harmonizer.grid().columns();
        let rows = harmonizer.grid().count_rows();
        if event.col >= columns || event.row >= rows {
            send_feedback(
                &mut feedback_writer,
                &event.grid,
                format!(
                    "Cell update rejected: ({}, {}) out of bounds ({} rows, {} columns).",
                    event.row, event.col, rows, columns
                ),
                true,
            );
            continue;
        }
        if harmonizer.set_cell(event.row, event.col, event.value.clone()) {
            trace!(
                "Grid '{}': cell ({}, {}) set to '{}'.",
                event.grid,
                event.row,
                event.col,
                event.value
            );
        }
    }
}

pub fn handle_fill_column_request(
    mut events: EventReader<RequestFillColumn>,
    mut registry: ResMut<HarmonizerRegistry>,
    mut feedback_writer: EventWriter<HarmonizerFeedback>,
) {
    for event in events.read() {
        match registry
            .require_mut(&event.grid)
            .and_then(|h| h.fill_column(&event.title, &event.value))
        {
            Ok(changed) => send_feedback(
                &mut feedback_writer,
                &event.grid,
                format!("Filled {} cell(s) of '{}'.", changed, event.title),
                false,
            ),
            Err(e) => send_feedback(&mut feedback_writer, &event.grid, e.to_string(), true),
        }
    }
}

pub fn handle_begin_multi_value_edit(
    mut events: EventReader<RequestBeginMultiValueEdit>,
    mut registry: ResMut<HarmonizerRegistry>,
    mut opened_writer: EventWriter<MultiValueEditOpened>,
) {
    for event in events.read() {
        let Some(harmonizer) = registry.get_mut(&event.grid) else {
            continue;
        };
        match harmonizer.begin_multi_value_edit(event.row, event.col) {
            Some(edit) => {
                opened_writer.write(MultiValueEditOpened {
                    grid: event.grid.clone(),
                    edit,
                });
            }
            None => debug!(
                "Grid '{}': column {} is not multi-valued.",
                event.grid, event.col
            ),
        }
    }
}

pub fn handle_commit_multi_value_edit(
    mut events: EventReader<RequestCommitMultiValueEdit>,
    mut registry: ResMut<HarmonizerRegistry>,
) {
    for event in events.read() {
        if let Some(harmonizer) = registry.get_mut(&event.grid) {
            if harmonizer.commit_multi_value_edit(&event.edit) {
                trace!(
                    "Grid '{}': committed multi-value cell ({}, {}).",
                    event.grid,
                    event.edit.row,
                    event.edit.col
                );
            }
        }
    }
}
