// src/harmonizer/state.rs
use bevy::log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::error::{HarmonizerError, HarmonizerResult};
use crate::grid::{
    next_invalid_cell, validate_grid, CellMeta, ColumnVisibility, CurrentSelection, GridData,
    InvalidCellMap, MultiValueEdit, RowVisibility, VisibilityState,
};
use crate::io::{export_to, save_as, ImportReport, JsonIndex, SaveFormat};
use crate::template::{flat_headers, Template};

/// Row layout applied to new and opened grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSettings {
    pub min_rows: usize,
    pub min_spare_rows: usize,
    /// 0 for headers rendered by the widget, 2 for header text in the grid.
    pub header_rows: usize,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            min_rows: 100,
            min_spare_rows: 5,
            header_rows: 0,
        }
    }
}

/// Snapshot of the counters an async result must still match to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTicket {
    pub generation: u64,
    pub revision: u64,
}

/// Counts in-flight operations; visible while any is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingOverlay {
    in_flight: usize,
}

impl LoadingOverlay {
    pub fn begin(&mut self) {
        self.in_flight += 1;
    }

    pub fn end(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn is_visible(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

/// One data-entry grid bound to a template.
#[derive(Debug, Clone, Default)]
pub struct DataHarmonizer {
    settings: GridSettings,
    template: Option<Arc<Template>>,
    grid: GridData,
    invalid_cells: InvalidCellMap,
    cell_meta: CellMeta,
    selection: CurrentSelection,
    visibility: VisibilityState,
    overlay: LoadingOverlay,
    /// Bumped when a template switch starts and again when it is installed.
    generation: u64,
    /// Bumped whenever the grid is replaced (template, new grid, file open).
    epoch: u64,
    /// Bumped on every content change.
    revision: u64,
    validated_revision: Option<u64>,
}

impl DataHarmonizer {
    pub fn new(settings: GridSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> GridSettings {
        self.settings
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_deref()
    }

    pub fn shared_template(&self) -> Option<Arc<Template>> {
        self.template.clone()
    }

    fn require_template(&self) -> HarmonizerResult<Arc<Template>> {
        self.template.clone().ok_or(HarmonizerError::NoTemplate)
    }

    pub fn grid(&self) -> &GridData {
        &self.grid
    }

    pub fn invalid_cells(&self) -> &InvalidCellMap {
        &self.invalid_cells
    }

    pub fn selection(&self) -> CurrentSelection {
        self.selection
    }

    pub fn visibility(&self) -> &VisibilityState {
        &self.visibility
    }

    pub fn overlay(&self) -> &LoadingOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut LoadingOverlay {
        &mut self.overlay
    }

    pub fn cell_meta_mut(&mut self) -> &mut CellMeta {
        &mut self.cell_meta
    }

    pub fn ticket(&self) -> OperationTicket {
        OperationTicket {
            generation: self.generation,
            revision: self.revision,
        }
    }

    /// Whether a result started under `ticket` may still be applied.
    pub fn is_current(&self, ticket: OperationTicket) -> bool {
        ticket == self.ticket()
    }

    pub fn is_current_generation(&self, ticket: OperationTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Whether the invalid-cell map reflects the current content.
    pub fn is_validated(&self) -> bool {
        self.validated_revision == Some(self.revision)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Starts a template switch; results of older operations become stale.
    pub fn begin_template_switch(&mut self) -> OperationTicket {
        self.generation += 1;
        self.ticket()
    }

    /// Installs a template with a blank grid. Work started against the
    /// previous template is stale from here on.
    pub fn install_template(&mut self, template: Template) {
        info!(
            "Template '{}' installed ({} sections, {} fields).",
            template.path(),
            template.sections.len(),
            template.fields.len()
        );
        self.template = Some(Arc::new(template));
        self.generation += 1;
        self.reset_grid();
    }

    fn reset_grid(&mut self) {
        let columns = self.template.as_ref().map_or(0, |t| t.column_count());
        self.grid = self.framed_grid(GridData::new(columns, self.settings.min_rows));
        self.clear_derived_state();
    }

    fn clear_derived_state(&mut self) {
        self.epoch += 1;
        self.invalid_cells.clear();
        self.cell_meta.clear();
        self.selection = CurrentSelection::none();
        self.visibility.reset();
        self.validated_revision = None;
        self.touch();
    }

    fn framed_grid(&self, grid: GridData) -> GridData {
        match (self.settings.header_rows, self.template.as_deref()) {
            (0, _) | (_, None) => grid,
            (reserved, Some(template)) => match flat_headers(template) {
                Ok(headers) => grid.with_header_rows(headers, reserved),
                Err(e) => {
                    warn!("Header rows unavailable for '{}': {}", template.path(), e);
                    grid
                }
            },
        }
    }

    pub fn new_grid(&mut self) -> HarmonizerResult<()> {
        self.require_template()?;
        self.reset_grid();
        Ok(())
    }

    /// Replaces the grid with imported rows plus spare rows.
    pub fn open_rows(&mut self, report: ImportReport) -> HarmonizerResult<usize> {
        let template = self.require_template()?;
        let imported = report.rows.len();
        let mut grid = GridData::from_rows(template.column_count(), report.rows);
        let target = self
            .settings
            .min_rows
            .max(imported + self.settings.min_spare_rows);
        grid.add_rows(target - imported);
        self.grid = self.framed_grid(grid);
        self.clear_derived_state();
        Ok(imported)
    }

    pub fn add_rows(&mut self, count: usize) {
        if count > 0 {
            self.grid.add_rows(count);
            self.touch();
        }
    }

    /// Rows past the end are refused; grow the grid with `add_rows`.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        if self.grid.is_header_row(row) || row >= self.grid.count_rows() {
            return false;
        }
        let changed = self.grid.set_cell(row, col, value);
        if changed {
            self.touch();
        }
        changed
    }

    /// Fills a titled column of every non-empty row. Unknown titles change
    /// nothing.
    pub fn fill_column(&mut self, title: &str, value: &str) -> HarmonizerResult<usize> {
        let template = self.require_template()?;
        let Some(col) = template.column_of(title) else {
            warn!("Fill column: '{}' is not a field of '{}'.", title, template.path());
            return Ok(0);
        };
        let changed = self.grid.fill_column(col, value);
        if changed > 0 {
            self.touch();
        }
        Ok(changed)
    }

    /// Synchronous full-grid validation.
    pub fn validate(&mut self) -> HarmonizerResult<usize> {
        let template = self.require_template()?;
        let invalid = validate_grid(&template, &self.grid);
        let ticket = self.ticket();
        self.apply_validation(ticket, invalid);
        Ok(self.invalid_cells.cell_count())
    }

    /// Installs a validation result computed under `ticket`. Stale results
    /// are dropped.
    pub fn apply_validation(&mut self, ticket: OperationTicket, invalid: InvalidCellMap) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "Discarding validation result for {:?}; grid is at {:?}.",
                ticket,
                self.ticket()
            );
            return false;
        }
        self.invalid_cells = invalid;
        self.validated_revision = Some(self.revision);
        self.visibility.refresh_rows(&self.grid, &self.invalid_cells);
        true
    }

    /// Moves the selection to the next invalid cell.
    pub fn next_invalid(&mut self) -> Option<(usize, usize)> {
        let (row, col) = next_invalid_cell(&self.selection, &self.invalid_cells)?;
        self.select_cell(row, col);
        Some((row, col))
    }

    /// Selects a cell, first showing all columns if its column is hidden.
    pub fn select_cell(&mut self, row: usize, col: usize) {
        if self.visibility.is_column_hidden(col) {
            if let Some(template) = self.template.as_deref() {
                self.visibility.apply_columns(ColumnVisibility::All, template);
            }
        }
        self.selection = CurrentSelection::cell(row, col);
    }

    pub fn apply_column_visibility(&mut self, mode: ColumnVisibility) -> HarmonizerResult<()> {
        let template = self.require_template()?;
        self.visibility.apply_columns(mode, &template);
        Ok(())
    }

    pub fn apply_row_visibility(&mut self, mode: RowVisibility) {
        self.visibility
            .apply_rows(mode, &self.grid, &self.invalid_cells);
    }

    /// Opens the multi-value editor; healed delimiters are written back
    /// immediately. `None` for cells of single-valued fields.
    pub fn begin_multi_value_edit(&mut self, row: usize, col: usize) -> Option<MultiValueEdit> {
        let template = self.template.clone()?;
        let field = template.field(col).filter(|f| f.multivalued)?;
        let mut edit = MultiValueEdit::begin(row, col, field, self.grid.cell(row, col));
        edit.epoch = self.epoch;
        if let Some(healed) = &edit.healed_value {
            debug!("Healing multi-value cell ({}, {}) to '{}'.", row, col, healed);
            self.set_cell(row, col, healed.clone());
        }
        Some(edit)
    }

    /// Edits opened before the grid was replaced are dropped.
    pub fn commit_multi_value_edit(&mut self, edit: &MultiValueEdit) -> bool {
        if edit.epoch != self.epoch {
            debug!(
                "Dropping multi-value edit of ({}, {}); the grid was replaced.",
                edit.row, edit.col
            );
            return false;
        }
        self.set_cell(edit.row, edit.col, edit.commit())
    }

    pub fn cell_classes(&self, row: usize, col: usize) -> Vec<String> {
        match self.template.as_deref() {
            Some(template) => self
                .cell_meta
                .classes(template, &self.grid, &self.invalid_cells, row, col),
            None => Vec::new(),
        }
    }

    /// Validates, then refuses to write while invalid cells remain unless
    /// forced.
    fn check_before_write(&mut self, force: bool) -> HarmonizerResult<Arc<Template>> {
        let template = self.require_template()?;
        let invalid = self.validate()?;
        if invalid > 0 {
            if !force {
                return Err(HarmonizerError::InvalidCellsPresent(invalid));
            }
            warn!("Writing '{}' with {} invalid cell(s).", template.path(), invalid);
        }
        Ok(template)
    }

    pub fn save_as(
        &mut self,
        path: &Path,
        format: SaveFormat,
        index: &JsonIndex,
        force: bool,
    ) -> HarmonizerResult<usize> {
        let template = self.check_before_write(force)?;
        Ok(save_as(path, format, &template, &self.grid, index)?)
    }

    pub fn export_to(&mut self, path: &Path, format_name: &str, force: bool) -> HarmonizerResult<usize> {
        let template = self.check_before_write(force)?;
        Ok(export_to(path, format_name, &template, &self.grid)?)
    }
}
