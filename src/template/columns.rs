// src/template/columns.rs
//! Grid column configuration derived from fields.
//!
//! Holds rendering configuration only. Validation lives in
//! `grid::validator` and runs as one explicit pass over the grid, because
//! per-cell validators on the rendering path are far too slow for large grids.

use serde::Serialize;

use super::datatype::{Datatype, NumericKind};
use super::definition::Template;
use super::field::Field;
use crate::error::ConfigurationError;

pub const DATE_DISPLAY_FORMAT: &str = "YYYY-MM-DD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CellEditor {
    Text,
    Date,
    Autocomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Plain,
    Date {
        date_format: &'static str,
        correct_format: bool,
    },
    Autocomplete {
        source: Vec<String>,
        trim_dropdown: bool,
    },
    /// Free-text editor with an autocomplete-style renderer; selection
    /// happens through the multi-value adapter.
    MultiSelect {
        editor: CellEditor,
        renderer: CellEditor,
        source: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnConfig {
    pub title: String,
    pub kind: ColumnKind,
    pub required: bool,
    pub recommended: bool,
}

pub fn column_config(field: &Field) -> ColumnConfig {
    let kind = match field.datatype {
        Datatype::Date => ColumnKind::Date {
            date_format: DATE_DISPLAY_FORMAT,
            correct_format: false,
        },
        Datatype::Select => ColumnKind::Autocomplete {
            source: field.permissible_values().map(str::to_string).collect(),
            trim_dropdown: false,
        },
        Datatype::Numeric(NumericKind::NonNegativeInteger | NumericKind::Decimal) => {
            if field.null_values.is_empty() {
                ColumnKind::Plain
            } else {
                ColumnKind::Autocomplete {
                    source: field.null_values.clone(),
                    trim_dropdown: false,
                }
            }
        }
        Datatype::Multiple => ColumnKind::MultiSelect {
            editor: CellEditor::Text,
            renderer: CellEditor::Autocomplete,
            source: field.permissible_values().map(str::to_string).collect(),
        },
        Datatype::Text => ColumnKind::Plain,
    };
    ColumnConfig {
        title: field.title.clone(),
        kind,
        required: field.required,
        recommended: field.recommended,
    }
}

pub fn column_configs(template: &Template) -> Vec<ColumnConfig> {
    template.fields.iter().map(column_config).collect()
}

/// First header row cell: a section label spanning its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionHeader {
    pub label: String,
    pub colspan: usize,
}

/// Second header row cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldHeader {
    pub label: String,
    pub classes: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestedHeaders {
    pub sections: Vec<SectionHeader>,
    pub fields: Vec<FieldHeader>,
}

pub fn nested_headers(template: &Template) -> NestedHeaders {
    let sections = template
        .sections
        .iter()
        .map(|s| SectionHeader {
            label: s.title.clone(),
            colspan: s.len(),
        })
        .collect();
    let fields = template
        .fields
        .iter()
        .map(|f| {
            let mut classes = vec!["secondary-header-text"];
            if f.required {
                classes.push("required");
            }
            if f.recommended {
                classes.push("recommended");
            }
            FieldHeader {
                label: f.title.clone(),
                classes,
            }
        })
        .collect();
    NestedHeaders { sections, fields }
}

/// Two header rows for tabular exports; section titles are padded with
/// empty cells across their span.
pub fn flat_headers(template: &Template) -> Result<[Vec<String>; 2], ConfigurationError> {
    let mut sections_row = Vec::with_capacity(template.column_count());
    let mut fields_row = Vec::with_capacity(template.column_count());
    for section in &template.sections {
        if section.is_empty() {
            return Err(ConfigurationError::EmptySection {
                section: section.title.clone(),
            });
        }
        sections_row.push(section.title.clone());
        sections_row.extend(std::iter::repeat(String::new()).take(section.len() - 1));
        fields_row.extend(template.section_fields(section).iter().map(|f| f.title.clone()));
    }
    Ok([sections_row, fields_row])
}
