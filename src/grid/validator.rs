// src/grid/validator.rs
//! Full-grid validation pass. Runs only when explicitly requested.

use bevy::log::{debug, trace};
use chrono::NaiveDate;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

use super::data::GridData;
use super::invalid_cells::{CellIssue, InvalidCellMap};
use super::multivalue::split_multi_value;
use crate::template::{Datatype, Field, NumericKind, Template};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Comparison key for vocabulary matching: NFKC, trimmed, lowercased.
pub fn fold(value: &str) -> String {
    value.trim().nfkc().collect::<String>().to_lowercase()
}

/// Per-field rule with its vocabulary folded once up front.
pub struct CellValidator<'a> {
    field: &'a Field,
    vocabulary: HashSet<String>,
    null_values: HashSet<String>,
}

impl<'a> CellValidator<'a> {
    pub fn new(field: &'a Field) -> Self {
        Self {
            field,
            vocabulary: field.flat_vocabulary.iter().map(|v| fold(v)).collect(),
            null_values: field.null_values.iter().map(|v| fold(v)).collect(),
        }
    }

    fn is_null_value(&self, folded: &str) -> bool {
        self.null_values.contains(folded)
    }

    fn is_permitted(&self, folded: &str) -> bool {
        self.vocabulary.contains(folded) || self.is_null_value(folded)
    }

    /// `None` when the value is acceptable.
    pub fn validate(&self, value: &str) -> Option<CellIssue> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return self.field.required.then_some(CellIssue::EmptyRequired);
        }
        let folded = fold(trimmed);
        if self.is_null_value(&folded) {
            return None;
        }

        match self.field.datatype {
            Datatype::Multiple if self.field.has_vocabulary() => {
                if let Some(token) = split_multi_value(trimmed)
                    .into_iter()
                    .find(|t| !self.is_permitted(&fold(t)))
                {
                    return Some(CellIssue::Invalid(format!(
                        "'{}' is not a permitted value",
                        token
                    )));
                }
            }
            _ if self.field.has_vocabulary() => {
                if !self.is_permitted(&folded) {
                    return Some(CellIssue::Invalid(format!(
                        "'{}' is not a permitted value",
                        trimmed
                    )));
                }
            }
            Datatype::Date => {
                if NaiveDate::parse_from_str(trimmed, DATE_FORMAT).is_err() {
                    return Some(CellIssue::Invalid(format!(
                        "'{}' is not a date (YYYY-MM-DD)",
                        trimmed
                    )));
                }
            }
            Datatype::Numeric(NumericKind::NonNegativeInteger) => {
                if trimmed.parse::<u64>().is_err() {
                    return Some(CellIssue::Invalid(format!(
                        "'{}' is not a non-negative integer",
                        trimmed
                    )));
                }
            }
            Datatype::Numeric(NumericKind::Decimal) => {
                if !trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
                    return Some(CellIssue::Invalid(format!("'{}' is not a number", trimmed)));
                }
            }
            _ => {}
        }

        if let Some(pattern) = &self.field.pattern {
            if !pattern.is_match(trimmed) {
                return Some(CellIssue::Invalid(format!(
                    "'{}' does not match {}",
                    trimmed,
                    pattern.as_str()
                )));
            }
        }
        None
    }
}

/// Validates every non-empty body row of `grid` against `template`.
pub fn validate_grid(template: &Template, grid: &GridData) -> InvalidCellMap {
    let validators: Vec<CellValidator> = template.fields.iter().map(CellValidator::new).collect();
    let mut invalid = InvalidCellMap::new();
    let mut checked_rows = 0usize;

    for (row, cells) in grid.body_rows() {
        if grid.is_empty_row(row) {
            continue;
        }
        checked_rows += 1;
        for (col, validator) in validators.iter().enumerate() {
            let value = cells.get(col).map(String::as_str).unwrap_or("");
            if let Some(issue) = validator.validate(value) {
                trace!("Invalid cell ({}, {}): {:?}", row, col, issue);
                invalid.insert(row, col, issue);
            }
        }
    }

    debug!(
        "Validated {} row(s) of '{}': {} invalid cell(s) in {} row(s).",
        checked_rows,
        template.path(),
        invalid.cell_count(),
        invalid.row_count()
    );
    invalid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::test_support::{rules_template, two_section_template};

    fn column(template: &Template, title: &str) -> usize {
        template.column_of(title).unwrap()
    }

    #[test]
    fn vocabulary_match_ignores_case_and_whitespace() {
        let template = rules_template();
        let host = &template.fields[column(&template, "host")];
        let v = CellValidator::new(host);
        for ok in ["Human", " human ", "ADULT", "  Adult", "bat", "missing", "Not applicable"] {
            assert_eq!(v.validate(ok), None, "{ok} should be valid");
        }
        for bad in ["Humans", "Dog", "Adult Human"] {
            assert!(matches!(v.validate(bad), Some(CellIssue::Invalid(_))), "{bad}");
        }
        assert_eq!(v.validate(""), None);
    }

    #[test]
    fn fold_normalizes_compatibility_forms() {
        assert_eq!(fold(" Ｆｅｖｅｒ "), "fever");
    }

    #[test]
    fn pattern_scenario() {
        let template = rules_template();
        let count = &template.fields[column(&template, "count")];
        let v = CellValidator::new(count);
        assert!(matches!(v.validate("12a"), Some(CellIssue::Invalid(_))));
        assert_eq!(v.validate("12"), None);
        assert_eq!(v.validate(""), None);
    }

    #[test]
    fn empty_required_is_distinguished() {
        let template = rules_template();
        let v = CellValidator::new(&template.fields[0]);
        assert_eq!(v.validate("   "), Some(CellIssue::EmptyRequired));
        assert_eq!(v.validate("S1"), None);
    }

    #[test]
    fn multiple_checks_every_token() {
        let template = rules_template();
        let v = CellValidator::new(&template.fields[column(&template, "symptoms")]);
        assert_eq!(v.validate("fever; Cough"), None);
        assert_eq!(v.validate("Fever;;Cough ;"), None);
        assert_eq!(
            v.validate("Fever; Sneezing"),
            Some(CellIssue::Invalid("'Sneezing' is not a permitted value".into()))
        );
    }

    #[test]
    fn dates_and_numbers_accept_null_values() {
        let template = rules_template();
        let date = CellValidator::new(&template.fields[column(&template, "collection date")]);
        assert_eq!(date.validate("2021-03-04"), None);
        assert_eq!(date.validate("Missing"), None);
        assert!(date.validate("2021-13-04").is_some());
        assert!(date.validate("04/03/2021").is_some());

        let ct = CellValidator::new(&template.fields[column(&template, "ct value")]);
        assert_eq!(ct.validate("21.5"), None);
        assert!(ct.validate("high").is_some());
        assert!(ct.validate("NaN").is_some());
    }

    #[test]
    fn grid_pass_skips_empty_rows() {
        let template = two_section_template();
        let mut grid = GridData::new(3, 4);
        grid.set_cell(0, 0, "a");
        grid.set_cell(2, 1, "only optional");
        let invalid = validate_grid(&template, &grid);
        let cells: Vec<(usize, usize, &CellIssue)> = invalid.iter().collect();
        assert_eq!(
            cells,
            vec![
                (0, 2, &CellIssue::EmptyRequired),
                (2, 0, &CellIssue::EmptyRequired),
                (2, 2, &CellIssue::EmptyRequired)
            ]
        );
        assert!(!invalid.contains_row(1));
        assert!(!invalid.contains_row(3));
    }
}
