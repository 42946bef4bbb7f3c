// src/grid/navigator.rs
use serde::Serialize;

use super::invalid_cells::InvalidCellMap;

/// Selected cell range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl CellRange {
    pub fn cell(row: usize, col: usize) -> Self {
        Self {
            start_row: row,
            start_col: col,
            end_row: row,
            end_col: col,
        }
    }
}

/// Grid selection; empty until the user (or navigator) selects a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CurrentSelection(pub Option<CellRange>);

impl CurrentSelection {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn cell(row: usize, col: usize) -> Self {
        Self(Some(CellRange::cell(row, col)))
    }

    /// Anchor cell of the selection.
    pub fn focus(&self) -> Option<(usize, usize)> {
        self.0.map(|r| (r.start_row, r.start_col))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

/// Next invalid cell after the selection, in (row, column) order, wrapping
/// to the first. `None` only when there are no invalid cells.
pub fn next_invalid_cell(selection: &CurrentSelection, invalid: &InvalidCellMap) -> Option<(usize, usize)> {
    let first = invalid.first()?;
    let Some((row, col)) = selection.focus() else {
        return Some(first);
    };

    if let Some(cols) = invalid.row(row) {
        if let Some((&next_col, _)) = cols.range(col + 1..).next() {
            return Some((row, next_col));
        }
    }

    invalid
        .rows()
        .find(|&r| r > row)
        .and_then(|r| invalid.row(r).and_then(|cols| cols.keys().next()).map(|&c| (r, c)))
        .or(Some(first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::invalid_cells::CellIssue;

    fn scenario_map() -> InvalidCellMap {
        let mut map = InvalidCellMap::new();
        map.insert(2, 0, CellIssue::EmptyRequired);
        map.insert(5, 1, CellIssue::Invalid("bad".into()));
        map
    }

    #[test]
    fn advances_from_selected_row_to_next_invalid_row() {
        let selection = CurrentSelection(Some(CellRange {
            start_row: 2,
            start_col: 0,
            end_row: 2,
            end_col: 0,
        }));
        assert_eq!(next_invalid_cell(&selection, &scenario_map()), Some((5, 1)));
    }

    #[test]
    fn no_selection_starts_at_first_invalid_cell() {
        assert_eq!(
            next_invalid_cell(&CurrentSelection::none(), &scenario_map()),
            Some((2, 0))
        );
    }

    #[test]
    fn empty_map_is_a_no_op() {
        let selection = CurrentSelection::cell(1, 1);
        assert_eq!(next_invalid_cell(&selection, &InvalidCellMap::new()), None);
    }

    #[test]
    fn cycle_visits_each_cell_once_in_order_then_wraps() {
        let mut map = InvalidCellMap::new();
        for (r, c) in [(10, 3), (2, 11), (2, 9), (9, 0), (10, 1)] {
            map.insert(r, c, CellIssue::EmptyRequired);
        }
        let mut selection = CurrentSelection::none();
        let mut visited = Vec::new();
        for _ in 0..6 {
            let (r, c) = next_invalid_cell(&selection, &map).unwrap();
            visited.push((r, c));
            selection = CurrentSelection::cell(r, c);
        }
        assert_eq!(
            visited,
            vec![(2, 9), (2, 11), (9, 0), (10, 1), (10, 3), (2, 9)]
        );
    }

    #[test]
    fn selection_between_invalid_cells_moves_forward() {
        let map = scenario_map();
        assert_eq!(next_invalid_cell(&CurrentSelection::cell(3, 7), &map), Some((5, 1)));
        assert_eq!(next_invalid_cell(&CurrentSelection::cell(5, 0), &map), Some((5, 1)));
        assert_eq!(next_invalid_cell(&CurrentSelection::cell(8, 0), &map), Some((2, 0)));
    }
}
