// src/harmonizer/events.rs
use bevy::prelude::Event;
use std::path::PathBuf;

use super::state::OperationTicket;
use crate::grid::{ColumnVisibility, InvalidCellMap, MultiValueEdit, RowVisibility};
use crate::io::{ImportReport, JsonIndex, SaveFormat};
use crate::template::{SchemaSource, Template};

/// Loads a template into `grid` (created on demand). Runs in the background.
#[derive(Event, Debug, Clone)]
pub struct RequestLoadTemplate {
    pub grid: String,
    pub source: SchemaSource,
}

/// Imports a data file into `grid`. Runs in the background.
#[derive(Event, Debug, Clone)]
pub struct RequestOpenFile {
    pub grid: String,
    pub path: PathBuf,
}

#[derive(Event, Debug, Clone)]
pub struct RequestNewGrid {
    pub grid: String,
}

#[derive(Event, Debug, Clone)]
pub struct RequestAddRows {
    pub grid: String,
    pub count: usize,
}

#[derive(Event, Debug, Clone)]
pub struct UpdateCellEvent {
    pub grid: String,
    pub row: usize,
    pub col: usize,
    pub value: String,
}

#[derive(Event, Debug, Clone)]
pub struct RequestFillColumn {
    pub grid: String,
    pub title: String,
    pub value: String,
}

/// Full-grid validation pass. Runs in the background.
#[derive(Event, Debug, Clone)]
pub struct RequestValidateGrid {
    pub grid: String,
}

#[derive(Event, Debug, Clone)]
pub struct RequestNextInvalidCell {
    pub grid: String,
}

#[derive(Event, Debug, Clone)]
pub struct RequestSelectCell {
    pub grid: String,
    pub row: usize,
    pub col: usize,
}

#[derive(Event, Debug, Clone)]
pub struct RequestColumnVisibility {
    pub grid: String,
    pub mode: ColumnVisibility,
}

#[derive(Event, Debug, Clone)]
pub struct RequestRowVisibility {
    pub grid: String,
    pub mode: RowVisibility,
}

#[derive(Event, Debug, Clone)]
pub struct RequestBeginMultiValueEdit {
    pub grid: String,
    pub row: usize,
    pub col: usize,
}

#[derive(Event, Debug, Clone)]
pub struct RequestCommitMultiValueEdit {
    pub grid: String,
    pub edit: MultiValueEdit,
}

#[derive(Event, Debug, Clone)]
pub struct RequestSaveAs {
    pub grid: String,
    pub path: PathBuf,
    /// Inferred from the extension when absent.
    pub format: Option<SaveFormat>,
    pub index: JsonIndex,
    pub force: bool,
}

#[derive(Event, Debug, Clone)]
pub struct RequestExportTo {
    pub grid: String,
    pub path: PathBuf,
    pub format_name: String,
    pub force: bool,
}

#[derive(Event, Debug, Clone)]
pub struct RequestRescanTemplates;

// --- Background results ---

#[derive(Event, Debug, Clone)]
pub struct TemplateLoadFinished {
    pub grid: String,
    pub ticket: OperationTicket,
    pub result: Result<Template, String>,
}

#[derive(Event, Debug, Clone)]
pub struct FileOpenFinished {
    pub grid: String,
    pub ticket: OperationTicket,
    pub path: PathBuf,
    pub result: Result<ImportReport, String>,
}

#[derive(Event, Debug, Clone)]
pub struct ValidationFinished {
    pub grid: String,
    pub ticket: OperationTicket,
    pub result: Result<InvalidCellMap, String>,
}

// --- Notifications ---

/// User-visible outcome of an operation.
#[derive(Event, Debug, Clone)]
pub struct HarmonizerFeedback {
    pub grid: String,
    pub message: String,
    pub is_error: bool,
}

#[derive(Event, Debug, Clone)]
pub struct TemplateInstalled {
    pub grid: String,
    pub template_path: String,
}

#[derive(Event, Debug, Clone)]
pub struct GridDataReplaced {
    pub grid: String,
    pub rows: usize,
}

#[derive(Event, Debug, Clone)]
pub struct ValidationCompleted {
    pub grid: String,
    pub invalid_cells: usize,
}

#[derive(Event, Debug, Clone)]
pub struct SelectionChanged {
    pub grid: String,
    pub row: usize,
    pub col: usize,
}

#[derive(Event, Debug, Clone)]
pub struct MultiValueEditOpened {
    pub grid: String,
    pub edit: MultiValueEdit,
}

/// A save or export finished writing.
#[derive(Event, Debug, Clone)]
pub struct FileWritten {
    pub grid: String,
    pub path: PathBuf,
    pub rows: usize,
}
