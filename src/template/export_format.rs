// src/template/export_format.rs
//! Declarative "Export To" formats declared by a schema.

use serde::{Deserialize, Serialize};

use super::definition::Template;
use crate::error::SaveError;
use crate::io::SaveFormat;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportFormat {
    #[serde(alias = "fileType")]
    pub file_type: SaveFormat,
    /// Template names this format applies to; absent means all.
    #[serde(default)]
    pub pertains_to: Option<Vec<String>>,
    #[serde(default)]
    pub columns: Vec<ExportColumn>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportColumn {
    pub header: String,
    /// Template fields (title or name) whose non-empty values are joined.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Constant written instead of field values.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_delimiter() -> String {
    ";".to_string()
}

impl ExportFormat {
    pub fn pertains_to(&self, template: &str) -> bool {
        self.pertains_to
            .as_ref()
            .map_or(true, |names| names.iter().any(|n| n == template))
    }

    /// Builds the export matrix (header row first) from body rows.
    pub fn transform(
        &self,
        format_name: &str,
        template: &Template,
        rows: &[Vec<String>],
    ) -> Result<Vec<Vec<String>>, SaveError> {
        if !self.pertains_to(&template.name) {
            return Err(SaveError::FormatNotApplicable {
                format: format_name.to_string(),
                template: template.name.clone(),
            });
        }
        let mut resolved: Vec<Vec<usize>> = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let mut indices = Vec::with_capacity(column.sources.len());
            for source in &column.sources {
                let idx = template
                    .column_of(source)
                    .ok_or_else(|| SaveError::UnknownExportSource {
                        format: format_name.to_string(),
                        field: source.clone(),
                    })?;
                indices.push(idx);
            }
            resolved.push(indices);
        }

        let mut out = Vec::with_capacity(rows.len() + 1);
        out.push(self.columns.iter().map(|c| c.header.clone()).collect());
        for row in rows {
            let mut out_row = Vec::with_capacity(self.columns.len());
            for (column, indices) in self.columns.iter().zip(&resolved) {
                let cell = match &column.value {
                    Some(constant) => constant.clone(),
                    None => indices
                        .iter()
                        .filter_map(|&i| row.get(i))
                        .map(|v| v.trim())
                        .filter(|v| !v.is_empty())
                        .collect::<Vec<_>>()
                        .join(&column.delimiter),
                };
                out_row.push(cell);
            }
            out.push(out_row);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::builder::build_template;
    use crate::template::schema::SchemaDocument;
    use serde_json::json;
    use std::path::Path;

    fn document() -> SchemaDocument {
        let raw = json!({
            "classes": {
                "Covid": {"is_a": "dh_interface", "slots": [
                    {"name": "sample id", "slot_group": "A"},
                    {"name": "city", "slot_group": "A"},
                    {"name": "country", "slot_group": "A"}
                ]}
            },
            "export_formats": {
                "GISAID": {
                    "file_type": "csv",
                    "pertains_to": ["Covid"],
                    "columns": [
                        {"header": "covv_virus_name", "sources": ["sample id"]},
                        {"header": "covv_location", "sources": ["country", "city"], "delimiter": " / "},
                        {"header": "covv_type", "value": "betacoronavirus"}
                    ]
                },
                "Other": {"fileType": "tsv", "pertains_to": ["Mpox"]}
            }
        });
        SchemaDocument::from_json_str(&raw.to_string(), Path::new("schema.json")).unwrap()
    }

    #[test]
    fn lists_only_formats_pertaining_to_template() {
        let doc = document();
        let names: Vec<String> = doc.export_formats_for("Covid").into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["GISAID"]);
        let template = build_template(&doc, "covid", "Covid").unwrap();
        assert_eq!(template.applicable_export_formats().count(), 1);
    }

    #[test]
    fn transform_joins_sources_and_writes_constants() {
        let doc = document();
        let template = build_template(&doc, "covid", "Covid").unwrap();
        let (_, gisaid) = &doc.export_formats[0];
        let rows = vec![vec!["S1".to_string(), "Ottawa".to_string(), "Canada".to_string()],
                        vec!["S2".to_string(), "".to_string(), "Canada".to_string()]];
        let matrix = gisaid.transform("GISAID", &template, &rows).unwrap();
        assert_eq!(matrix[0], vec!["covv_virus_name", "covv_location", "covv_type"]);
        assert_eq!(matrix[1], vec!["S1", "Canada / Ottawa", "betacoronavirus"]);
        assert_eq!(matrix[2], vec!["S2", "Canada", "betacoronavirus"]);
    }

    #[test]
    fn transform_rejects_foreign_template() {
        let doc = document();
        let template = build_template(&doc, "covid", "Covid").unwrap();
        let (_, other) = &doc.export_formats[1];
        assert!(matches!(
            other.transform("Other", &template, &[]),
            Err(SaveError::FormatNotApplicable { .. })
        ));
    }
}
