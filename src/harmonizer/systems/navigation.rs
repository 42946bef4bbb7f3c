// src/harmonizer/systems/navigation.rs
use bevy::prelude::*;

use super::send_feedback;
use crate::harmonizer::events::{
    HarmonizerFeedback, RequestColumnVisibility, RequestNextInvalidCell, RequestRowVisibility,
    RequestSelectCell, SelectionChanged,
};
use crate::harmonizer::resources::HarmonizerRegistry;

pub fn handle_next_invalid_cell(
    mut events: EventReader<RequestNextInvalidCell>,
    mut registry: ResMut<HarmonizerRegistry>,
    mut selection_writer: EventWriter<SelectionChanged>,
) {
    for event in events.read() {
        let Some(harmonizer) = registry.get_mut(&event.grid) else {
            continue;
        };
        match harmonizer.next_invalid() {
            Some((row, col)) => {
                trace!("Grid '{}': next invalid cell ({}, {}).", event.grid, row, col);
                selection_writer.write(SelectionChanged {
                    grid: event.grid.clone(),
                    row,
                    col,
                });
            }
            None => debug!("Grid '{}': no invalid cells to visit.", event.grid),
        }
    }
}

pub fn handle_select_cell(
    mut events: EventReader<RequestSelectCell>,
    mut registry: ResMut<HarmonizerRegistry>,
    mut selection_writer: EventWriter<SelectionChanged>,
) {
    for event in events.read() {
        if let Some(harmonizer) = registry.get_mut(&event.grid) {
            harmonizer.select_cell(event.row, event.col);
            selection_writer.write(SelectionChanged {
                grid: event.grid.clone(),
                row: event.row,
                col: event.col,
            });
        }
    }
}

pub fn handle_column_visibility(
    mut events: EventReader<RequestColumnVisibility>,
    mut registry: ResMut<HarmonizerRegistry>,
    mut feedback_writer: EventWriter<HarmonizerFeedback>,
) {
    for event in events.read() {
        let result = registry
            .require_mut(&event.grid)
            .and_then(|harmonizer| harmonizer.apply_column_visibility(event.mode.clone()));
        match result {
            Ok(()) => info!("Grid '{}': {}.", event.grid, event.mode),
            Err(e) => send_feedback(&mut feedback_writer, &event.grid, e.to_string(), true),
        }
    }
}

pub fn handle_row_visibility(
    mut events: EventReader<RequestRowVisibility>,
    mut registry: ResMut<HarmonizerRegistry>,
) {
    for event in events.read() {
        if let Some(harmonizer) = registry.get_mut(&event.grid) {
            harmonizer.apply_row_visibility(event.mode);
            info!(
                "Grid '{}': {} ({} row(s) hidden).",
                event.grid,
                event.mode,
                harmonizer.visibility().hidden_rows.len()
            );
        }
    }
}
