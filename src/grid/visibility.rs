// src/grid/visibility.rs
//! Hidden row/column sets. Each axis has exactly one active mode, and every
//! mode is computed from scratch.

use bevy::log::warn;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::data::GridData;
use super::invalid_cells::InvalidCellMap;
use crate::template::Template;

/// Column that identifies a row; never hidden by section mode.
pub const ROW_IDENTIFIER_COLUMN: usize = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum ColumnVisibility {
    #[default]
    All,
    Required,
    Recommended,
    Section(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RowVisibility {
    #[default]
    All,
    Valid,
    Invalid,
}

impl FromStr for ColumnVisibility {
    type Err = String;

    /// `all`, `required`, `recommended` or `section:<title>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(section) = s.strip_prefix("section:") {
            return Ok(ColumnVisibility::Section(section.to_string()));
        }
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ColumnVisibility::All),
            "required" => Ok(ColumnVisibility::Required),
            "recommended" => Ok(ColumnVisibility::Recommended),
            other => Err(format!("unknown column visibility '{}'", other)),
        }
    }
}

impl FromStr for RowVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(RowVisibility::All),
            "valid" => Ok(RowVisibility::Valid),
            "invalid" => Ok(RowVisibility::Invalid),
            other => Err(format!("unknown row visibility '{}'", other)),
        }
    }
}

impl fmt::Display for ColumnVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnVisibility::All => write!(f, "show-all-columns"),
            ColumnVisibility::Required => write!(f, "show-required-columns"),
            ColumnVisibility::Recommended => write!(f, "show-recommended-columns"),
            ColumnVisibility::Section(title) => write!(f, "show-section({})", title),
        }
    }
}

impl fmt::Display for RowVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowVisibility::All => write!(f, "show-all-rows"),
            RowVisibility::Valid => write!(f, "show-valid-rows"),
            RowVisibility::Invalid => write!(f, "show-invalid-rows"),
        }
    }
}

pub fn hidden_columns(mode: &ColumnVisibility, template: &Template) -> BTreeSet<usize> {
    let fields = template.fields.iter().enumerate();
    match mode {
        ColumnVisibility::All => BTreeSet::new(),
        ColumnVisibility::Required => fields.filter(|(_, f)| !f.required).map(|(i, _)| i).collect(),
        ColumnVisibility::Recommended => fields
            .filter(|(_, f)| !f.required && !f.recommended)
            .map(|(i, _)| i)
            .collect(),
        ColumnVisibility::Section(title) => {
            let section = template.section_by_title(title);
            if section.is_none() {
                warn!("Unknown section '{}'; only the identifier column stays visible.", title);
            }
            (0..template.column_count())
                .filter(|&c| c != ROW_IDENTIFIER_COLUMN)
                .filter(|&c| !section.is_some_and(|s| s.contains(c)))
                .collect()
        }
    }
}

pub fn hidden_rows(mode: RowVisibility, grid: &GridData, invalid: &InvalidCellMap) -> BTreeSet<usize> {
    match mode {
        RowVisibility::All => BTreeSet::new(),
        RowVisibility::Valid => grid
            .body_rows()
            .map(|(row, _)| row)
            .filter(|&row| invalid.contains_row(row) || grid.is_empty_row(row))
            .collect(),
        RowVisibility::Invalid => grid
            .body_rows()
            .map(|(row, _)| row)
            .filter(|&row| !invalid.contains_row(row) || grid.is_empty_row(row))
            .collect(),
    }
}

/// Active mode and hidden set for both axes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityState {
    pub column_mode: ColumnVisibility,
    pub row_mode: RowVisibility,
    pub hidden_columns: BTreeSet<usize>,
    pub hidden_rows: BTreeSet<usize>,
}

impl VisibilityState {
    pub fn apply_columns(&mut self, mode: ColumnVisibility, template: &Template) {
        self.hidden_columns = hidden_columns(&mode, template);
        self.column_mode = mode;
    }

    pub fn apply_rows(&mut self, mode: RowVisibility, grid: &GridData, invalid: &InvalidCellMap) {
        self.hidden_rows = hidden_rows(mode, grid, invalid);
        self.row_mode = mode;
    }

    /// Recomputes the current row mode, e.g. after a validation pass.
    pub fn refresh_rows(&mut self, grid: &GridData, invalid: &InvalidCellMap) {
        self.hidden_rows = hidden_rows(self.row_mode, grid, invalid);
    }

    pub fn is_column_hidden(&self, col: usize) -> bool {
        self.hidden_columns.contains(&col)
    }

    pub fn is_row_hidden(&self, row: usize) -> bool {
        self.hidden_rows.contains(&row)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::invalid_cells::CellIssue;
    use crate::template::test_support::{rules_template, two_section_template};

    #[test]
    fn required_columns_scenario() {
        let template = two_section_template();
        let hidden = hidden_columns(&ColumnVisibility::Required, &template);
        assert_eq!(hidden, BTreeSet::from([1]));
    }

    #[test]
    fn recommended_keeps_required_and_recommended() {
        let template = rules_template();
        let hidden = hidden_columns(&ColumnVisibility::Recommended, &template);
        assert_eq!(hidden, BTreeSet::from([2, 3, 4, 5]));
    }

    #[test]
    fn section_mode_keeps_identifier_column() {
        let template = two_section_template();
        let hidden = hidden_columns(&ColumnVisibility::Section("B".into()), &template);
        assert_eq!(hidden, BTreeSet::from([1]));
        let unknown = hidden_columns(&ColumnVisibility::Section("Nope".into()), &template);
        assert_eq!(unknown, BTreeSet::from([1, 2]));
    }

    #[test]
    fn modes_are_idempotent_and_exclusive() {
        let template = two_section_template();
        let mut state = VisibilityState::default();
        state.apply_columns(ColumnVisibility::Required, &template);
        let once = state.hidden_columns.clone();
        state.apply_columns(ColumnVisibility::Required, &template);
        assert_eq!(state.hidden_columns, once);
        state.apply_columns(ColumnVisibility::Section("A".into()), &template);
        assert_eq!(state.hidden_columns, BTreeSet::from([2]));
        state.apply_columns(ColumnVisibility::All, &template);
        assert!(state.hidden_columns.is_empty());
    }

    #[test]
    fn row_modes_account_for_empty_rows() {
        let mut grid = GridData::new(3, 5);
        grid.set_cell(0, 0, "ok");
        grid.set_cell(1, 0, "bad");
        grid.set_cell(3, 0, "ok");
        let mut invalid = InvalidCellMap::new();
        invalid.insert(1, 2, CellIssue::EmptyRequired);

        assert_eq!(
            hidden_rows(RowVisibility::Valid, &grid, &invalid),
            BTreeSet::from([1, 2, 4])
        );
        assert_eq!(
            hidden_rows(RowVisibility::Invalid, &grid, &invalid),
            BTreeSet::from([0, 2, 3, 4])
        );
        assert!(hidden_rows(RowVisibility::All, &grid, &invalid).is_empty());
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("required".parse::<ColumnVisibility>(), Ok(ColumnVisibility::Required));
        assert_eq!(
            "section:Sample collection".parse::<ColumnVisibility>(),
            Ok(ColumnVisibility::Section("Sample collection".into()))
        );
        assert_eq!("invalid".parse::<RowVisibility>(), Ok(RowVisibility::Invalid));
        assert!("sideways".parse::<RowVisibility>().is_err());
        assert_eq!(ColumnVisibility::Required.to_string(), "show-required-columns");
    }
}
