// src/template/definition.rs
use std::collections::HashMap;

use super::export_format::ExportFormat;
use super::field::{Field, Section};

/// Prefix used for field entries in the "jump to" column list.
pub const JUMP_TO_FIELD_PREFIX: &str = " . . ";

/// A loaded template: sections partitioning a flat field list.
///
/// Built once per template load and never mutated; loading another template
/// replaces the whole value.
#[derive(Debug, Clone)]
pub struct Template {
    pub schema_name: String,
    pub name: String,
    pub see_also: Option<String>,
    pub sections: Vec<Section>,
    pub fields: Vec<Field>,
    pub export_formats: Vec<(String, ExportFormat)>,
    columns_by_title: HashMap<String, usize>,
    columns_by_name: HashMap<String, usize>,
}

impl Template {
    pub(crate) fn assemble(
        schema_name: String,
        name: String,
        see_also: Option<String>,
        sections: Vec<Section>,
        fields: Vec<Field>,
        export_formats: Vec<(String, ExportFormat)>,
    ) -> Self {
        let columns_by_title = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.title.clone(), i))
            .collect();
        let columns_by_name = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        Self {
            schema_name,
            name,
            see_also,
            sections,
            fields,
            export_formats,
            columns_by_title,
            columns_by_name,
        }
    }

    /// `schema/Template` menu path.
    pub fn path(&self) -> String {
        format!("{}/{}", self.schema_name, self.name)
    }

    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, column: usize) -> Option<&Field> {
        self.fields.get(column)
    }

    /// Column of a field looked up by title, falling back to its name.
    pub fn column_of(&self, title_or_name: &str) -> Option<usize> {
        self.columns_by_title
            .get(title_or_name)
            .or_else(|| self.columns_by_name.get(title_or_name))
            .copied()
    }

    pub fn field_by_title(&self, title_or_name: &str) -> Option<&Field> {
        self.column_of(title_or_name).and_then(|c| self.fields.get(c))
    }

    pub fn section_of(&self, column: usize) -> Option<&Section> {
        self.fields.get(column).map(|f| &self.sections[f.section])
    }

    pub fn section_by_title(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn section_fields(&self, section: &Section) -> &[Field] {
        &self.fields[section.columns.clone()]
    }

    /// Field title mapped to its 0-based column, in column order.
    pub fn field_coordinates(&self) -> Vec<(String, usize)> {
        self.fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.title.clone(), i))
            .collect()
    }

    /// Entries for the "jump to" list: each section title maps to its first
    /// column, each field (prefixed) to its own column.
    pub fn column_coordinates(&self) -> Vec<(String, usize)> {
        let mut out = Vec::with_capacity(self.sections.len() + self.fields.len());
        for section in &self.sections {
            out.push((section.title.clone(), section.columns.start));
            for column in section.columns.clone() {
                out.push((
                    format!("{}{}", JUMP_TO_FIELD_PREFIX, self.fields[column].title),
                    column,
                ));
            }
        }
        out
    }

    /// Export formats offered for this template.
    pub fn applicable_export_formats(&self) -> impl Iterator<Item = &(String, ExportFormat)> {
        self.export_formats
            .iter()
            .filter(|(_, format)| format.pertains_to(&self.name))
    }

    /// Field used to key JSON exports when no index field is named.
    pub fn inferred_index_field(&self) -> Option<&Field> {
        self.fields.first()
    }
}
