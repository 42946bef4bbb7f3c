// src/grid/invalid_cells.rs
use std::collections::BTreeMap;

/// Why a cell is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellIssue {
    EmptyRequired,
    Invalid(String),
}

impl CellIssue {
    /// Empty string for a missing required value, otherwise the reason.
    pub fn message(&self) -> &str {
        match self {
            CellIssue::EmptyRequired => "",
            CellIssue::Invalid(reason) => reason,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            CellIssue::EmptyRequired => "empty-invalid-cell",
            CellIssue::Invalid(_) => "invalid-cell",
        }
    }
}

/// Sparse row → column → issue map of the cells failing their rule.
///
/// Keys are integers, so iteration is in numeric (row, column) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidCellMap {
    rows: BTreeMap<usize, BTreeMap<usize, CellIssue>>,
}

impl InvalidCellMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, row: usize, col: usize, issue: CellIssue) {
        self.rows.entry(row).or_default().insert(col, issue);
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellIssue> {
        self.rows.get(&row).and_then(|cols| cols.get(&col))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn contains_row(&self, row: usize) -> bool {
        self.rows.contains_key(&row)
    }

    pub fn row(&self, row: usize) -> Option<&BTreeMap<usize, CellIssue>> {
        self.rows.get(&row)
    }

    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    /// All entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &CellIssue)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, issue)| (row, col, issue)))
    }

    /// Lowest invalid row and its lowest invalid column.
    pub fn first(&self) -> Option<(usize, usize)> {
        let (&row, cols) = self.rows.iter().next()?;
        cols.keys().next().map(|&col| (row, col))
    }
}
