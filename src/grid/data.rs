// src/grid/data.rs
use serde::{Deserialize, Serialize};

/// Rectangular grid of string cells. Columns are fixed by the template;
/// rows grow on demand.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridData {
    columns: usize,
    /// Leading rows reserved for header display (legacy layout).
    #[serde(default)]
    header_rows: usize,
    rows: Vec<Vec<String>>,
}

impl GridData {
    /// Blank grid with `rows` body rows.
    pub fn new(columns: usize, rows: usize) -> Self {
        let mut grid = Self {
            columns,
            header_rows: 0,
            rows: Vec::new(),
        };
        grid.add_rows(rows);
        grid
    }

    /// Grid from existing body rows; rows are padded or cut to `columns`.
    pub fn from_rows(columns: usize, rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(columns, String::new());
                row
            })
            .collect();
        Self {
            columns,
            header_rows: 0,
            rows,
        }
    }

    /// Reserves the first `header_rows` rows for header text.
    pub fn with_header_rows(mut self, header_rows: [Vec<String>; 2], reserved: usize) -> Self {
        let reserved = reserved.min(2);
        let mut prefix: Vec<Vec<String>> = header_rows
            .into_iter()
            .take(reserved)
            .map(|mut row| {
                row.resize(self.columns, String::new());
                row
            })
            .collect();
        self.header_rows = prefix.len();
        prefix.append(&mut self.rows);
        self.rows = prefix;
        self
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn header_rows(&self) -> usize {
        self.header_rows
    }

    pub fn count_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_header_row(&self, row: usize) -> bool {
        row < self.header_rows
    }

    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Writes a cell, growing the grid if needed. Returns whether the value
    /// changed.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        if col >= self.columns {
            return false;
        }
        if row >= self.rows.len() {
            self.add_rows(row.saturating_add(1) - self.rows.len());
        }
        let value = value.into();
        let cell = &mut self.rows[row][col];
        if *cell == value {
            false
        } else {
            *cell = value;
            true
        }
    }

    pub fn add_rows(&mut self, count: usize) {
        let columns = self.columns;
        self.rows
            .extend(std::iter::repeat_with(|| vec![String::new(); columns]).take(count));
    }

    pub fn is_empty_row(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .map_or(true, |r| r.iter().all(|c| c.trim().is_empty()))
    }

    pub fn count_empty_rows(&self) -> usize {
        (0..self.rows.len()).filter(|&r| self.is_empty_row(r)).count()
    }

    /// Body rows as `(row index, cells)`, header rows skipped.
    pub fn body_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .skip(self.header_rows)
            .map(|(i, r)| (i, r.as_slice()))
    }

    /// Body rows with trailing empty rows removed.
    pub fn trimmed_data(&self) -> Vec<Vec<String>> {
        let mut end = self.rows.len();
        while end > self.header_rows && self.is_empty_row(end - 1) {
            end -= 1;
        }
        self.rows[self.header_rows..end].to_vec()
    }

    /// Writes `value` into `col` of every non-empty body row whose value
    /// differs. Returns the number of cells changed.
    pub fn fill_column(&mut self, col: usize, value: &str) -> usize {
        if col >= self.columns {
            return 0;
        }
        let mut changed = 0;
        for row in self.header_rows..self.rows.len() {
            if self.is_empty_row(row) {
                continue;
            }
            if self.rows[row][col] != value {
                self.rows[row][col] = value.to_string();
                changed += 1;
            }
        }
        changed
    }

    /// Removes `row` if it is a body row. Returns whether a row was removed.
    pub fn remove_row(&mut self, row: usize) -> bool {
        if row < self.header_rows || row >= self.rows.len() {
            return false;
        }
        self.rows.remove(row);
        true
    }
}
