// src/grid/cell_meta.rs
//! Display classes per cell. Classes only accumulate; the validation class is
//! appended when a cell is rendered, so fixing a cell clears it on the next
//! pass without removing anything that was assigned.

use std::collections::HashMap;

use super::data::GridData;
use super::invalid_cells::InvalidCellMap;
use crate::template::Template;

pub const PRIMARY_HEADER_CLASS: &str = "primary-header-cell";
pub const SECONDARY_HEADER_CLASS: &str = "secondary-header-cell";
pub const BODY_CELL_CLASS: &str = "non-header-cell";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellMeta {
    extra: HashMap<(usize, usize), Vec<String>>,
}

impl CellMeta {
    /// Adds `class` to a cell unless already present.
    pub fn add_class(&mut self, row: usize, col: usize, class: impl Into<String>) {
        let class = class.into();
        let classes = self.extra.entry((row, col)).or_default();
        if !classes.contains(&class) {
            classes.push(class);
        }
    }

    pub fn extra_classes(&self, row: usize, col: usize) -> &[String] {
        self.extra.get(&(row, col)).map_or(&[], Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.extra.clear();
    }

    /// Full class list for rendering a cell.
    pub fn classes(
        &self,
        template: &Template,
        grid: &GridData,
        invalid: &InvalidCellMap,
        row: usize,
        col: usize,
    ) -> Vec<String> {
        let mut classes: Vec<String> = Vec::new();
        let mut push = |class: &str| {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        };

        match (grid.header_rows(), row) {
            (rows, 0) if rows > 0 => push(PRIMARY_HEADER_CLASS),
            (rows, 1) if rows > 1 => push(SECONDARY_HEADER_CLASS),
            _ => {
                push(BODY_CELL_CLASS);
                if let Some(field) = template.field(col) {
                    if field.required {
                        push("required");
                    } else if field.recommended {
                        push("recommended");
                    }
                }
            }
        }
        for class in self.extra_classes(row, col) {
            push(class.as_str());
        }
        if let Some(issue) = invalid.get(row, col) {
            push(issue.css_class());
        }
        classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::invalid_cells::CellIssue;
    use crate::template::test_support::two_section_template;

    #[test]
    fn validation_class_is_appended_after_existing_classes() {
        let template = two_section_template();
        let grid = GridData::new(3, 2);
        let mut meta = CellMeta::default();
        meta.add_class(0, 0, "highlight");
        meta.add_class(0, 0, "highlight");
        let mut invalid = InvalidCellMap::new();
        invalid.insert(0, 0, CellIssue::EmptyRequired);
        invalid.insert(0, 1, CellIssue::Invalid("bad".into()));

        assert_eq!(
            meta.classes(&template, &grid, &invalid, 0, 0),
            vec!["non-header-cell", "required", "highlight", "empty-invalid-cell"]
        );
        assert_eq!(
            meta.classes(&template, &grid, &invalid, 0, 1),
            vec!["non-header-cell", "invalid-cell"]
        );
        assert_eq!(
            meta.classes(&template, &grid, &InvalidCellMap::new(), 0, 0),
            vec!["non-header-cell", "required", "highlight"]
        );
    }

    #[test]
    fn header_rows_get_header_classes() {
        let template = two_section_template();
        let grid = GridData::new(3, 1).with_header_rows([vec![], vec![]], 2);
        let meta = CellMeta::default();
        let invalid = InvalidCellMap::new();
        assert_eq!(meta.classes(&template, &grid, &invalid, 0, 0), vec![PRIMARY_HEADER_CLASS]);
        assert_eq!(meta.classes(&template, &grid, &invalid, 1, 0), vec![SECONDARY_HEADER_CLASS]);
    }
}
