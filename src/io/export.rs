// src/io/export.rs
//! "Save As" (raw grid) and "Export To" (schema-declared transforms).

use bevy::log::{info, warn};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{validate_base_name, SaveFormat};
use crate::error::SaveError;
use crate::grid::GridData;
use crate::template::{flat_headers, Template};

/// How JSON data objects are keyed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JsonIndex {
    /// Plain array of objects.
    #[default]
    None,
    /// Object keyed by the value of this field (title or name).
    Field(String),
    /// Object keyed by 1-based row number.
    Auto,
}

const MAX_SHEET_NAME: usize = 31;
const SHEET_NAME_RESERVED: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

fn sheet_name(template_name: &str) -> String {
    let cleaned: String = template_name
        .chars()
        .filter(|c| !SHEET_NAME_RESERVED.contains(c))
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

fn check_file_name(path: &Path) -> Result<(), SaveError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    validate_base_name(&stem)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SaveError + '_ {
    move |source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes the grid's trimmed data. Returns the number of data rows written.
pub fn save_as(
    path: &Path,
    format: SaveFormat,
    template: &Template,
    grid: &GridData,
    index: &JsonIndex,
) -> Result<usize, SaveError> {
    check_file_name(path)?;
    let data = grid.trimmed_data();
    match format {
        SaveFormat::Xlsx | SaveFormat::Csv | SaveFormat::Tsv => {
            let headers = flat_headers(template)?;
            write_table(path, format, &sheet_name(&template.name), &headers, &data)?;
        }
        SaveFormat::Json => {
            let value = data_objects(template, &data, index)?;
            write_json(path, &value)?;
        }
    }
    info!(
        "Saved {} row(s) of '{}' to '{}' as {}.",
        data.len(),
        template.path(),
        path.display(),
        format
    );
    Ok(data.len())
}

/// Applies the named export format and writes its output.
pub fn export_to(path: &Path, format_name: &str, template: &Template, grid: &GridData) -> Result<usize, SaveError> {
    check_file_name(path)?;
    let (_, format) = template
        .export_formats
        .iter()
        .find(|(name, _)| name == format_name)
        .ok_or_else(|| SaveError::UnknownFormat(format_name.to_string()))?;
    let data = grid.trimmed_data();
    let matrix = format.transform(format_name, template, &data)?;
    let Some((header, rows)) = matrix.split_first() else {
        return Ok(0);
    };

    match format.file_type {
        SaveFormat::Xlsx | SaveFormat::Csv | SaveFormat::Tsv => {
            write_table(
                path,
                format.file_type,
                &sheet_name(format_name),
                std::slice::from_ref(header),
                rows,
            )?;
        }
        SaveFormat::Json => {
            let records = rows
                .iter()
                .map(|row| {
                    Value::Object(
                        header
                            .iter()
                            .cloned()
                            .zip(row.iter().cloned().map(Value::String))
                            .collect(),
                    )
                })
                .collect();
            write_json(path, &Value::Array(records))?;
        }
    }
    info!(
        "Exported {} row(s) of '{}' to '{}' using '{}'.",
        rows.len(),
        template.path(),
        path.display(),
        format_name
    );
    Ok(rows.len())
}

fn write_table(
    path: &Path,
    format: SaveFormat,
    sheet: &str,
    header_rows: &[Vec<String>],
    rows: &[Vec<String>],
) -> Result<(), SaveError> {
    match format.delimiter() {
        Some(delimiter) => {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(delimiter)
                .flexible(true)
                .from_path(path)?;
            for row in header_rows.iter().chain(rows) {
                writer.write_record(row)?;
            }
            writer.flush().map_err(io_error(path))?;
        }
        None => {
            let mut workbook = Workbook::new();
            let header_format = Format::new().set_bold();
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet)?;
            for (r, row) in header_rows.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    worksheet.write_string_with_format(r as u32, c as u16, value, &header_format)?;
                }
            }
            let offset = header_rows.len();
            for (r, row) in rows.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    if !value.is_empty() {
                        worksheet.write_string((r + offset) as u32, c as u16, value)?;
                    }
                }
            }
            workbook.save(path)?;
        }
    }
    Ok(())
}

/// Data rows as JSON objects keyed by field name.
pub fn data_objects(template: &Template, rows: &[Vec<String>], index: &JsonIndex) -> Result<Value, SaveError> {
    let records = rows.iter().map(|row| {
        let mut record = Map::new();
        for (field, value) in template.fields.iter().zip(row) {
            if !value.is_empty() {
                record.insert(field.name.clone(), Value::String(value.clone()));
            }
        }
        record
    });

    match index {
        JsonIndex::None => Ok(Value::Array(records.map(Value::Object).collect())),
        JsonIndex::Auto => Ok(Value::Object(
            records
                .enumerate()
                .map(|(i, r)| ((i + 1).to_string(), Value::Object(r)))
                .collect(),
        )),
        JsonIndex::Field(key_field) => {
            let col = template
                .column_of(key_field)
                .ok_or_else(|| SaveError::UnknownIndexField(key_field.clone()))?;
            let mut seen = HashSet::new();
            let mut keyed = Map::new();
            for (i, (row, record)) in rows.iter().zip(records).enumerate() {
                let base = match row.get(col).map(|v| v.trim()) {
                    Some(v) if !v.is_empty() => v.to_string(),
                    _ => (i + 1).to_string(),
                };
                let mut key = base.clone();
                let mut n = 2;
                while !seen.insert(key.clone()) {
                    key = format!("{}_{}", base, n);
                    n += 1;
                }
                if key != base {
                    warn!("Duplicate index value '{}' saved as '{}'.", base, key);
                }
                keyed.insert(key, Value::Object(record));
            }
            Ok(Value::Object(keyed))
        }
    }
}

fn write_json(path: &Path, value: &Value) -> Result<(), SaveError> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(io_error(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::test_support::two_section_template;
    use serde_json::json;
    use std::fs;

    fn grid() -> GridData {
        let mut grid = GridData::new(3, 4);
        grid.set_cell(0, 0, "S1");
        grid.set_cell(0, 2, "x");
        grid.set_cell(1, 0, "S2");
        grid.set_cell(1, 1, "note");
        grid
    }

    #[test]
    fn csv_has_flat_headers_and_trimmed_rows() {
        let template = two_section_template();
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        let written = save_as(&path, SaveFormat::Csv, &template, &grid(), &JsonIndex::None).unwrap();
        assert_eq!(written, 2);
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "A,,B\nreq1,opt1,req2\nS1,,x\nS2,note,\n");
    }

    #[test]
    fn json_index_modes() {
        let template = two_section_template();
        let rows = grid().trimmed_data();
        assert_eq!(
            data_objects(&template, &rows, &JsonIndex::None).unwrap(),
            json!([{"req1": "S1", "req2": "x"}, {"req1": "S2", "opt1": "note"}])
        );
        assert_eq!(
            data_objects(&template, &rows, &JsonIndex::Auto).unwrap(),
            json!({"1": {"req1": "S1", "req2": "x"}, "2": {"req1": "S2", "opt1": "note"}})
        );
        let keyed = data_objects(&template, &rows, &JsonIndex::Field("req1".into())).unwrap();
        assert_eq!(keyed["S2"]["opt1"], "note");
        assert!(matches!(
            data_objects(&template, &rows, &JsonIndex::Field("nope".into())),
            Err(SaveError::UnknownIndexField(_))
        ));
    }

    #[test]
    fn duplicate_index_values_get_suffixes() {
        let template = two_section_template();
        let rows = vec![
            vec!["S1".to_string(), String::new(), String::new()],
            vec!["S1".to_string(), String::new(), String::new()],
        ];
        let keyed = data_objects(&template, &rows, &JsonIndex::Field("req1".into())).unwrap();
        let keys: Vec<&String> = keyed.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["S1", "S1_2"]);
    }

    #[test]
    fn invalid_file_names_are_refused() {
        let template = two_section_template();
        let tmp = tempfile::tempdir().unwrap();
        let err = save_as(&tmp.path().join("bad:name.csv"), SaveFormat::Csv, &template, &grid(), &JsonIndex::None)
            .unwrap_err();
        assert!(matches!(err, SaveError::InvalidFileName(_)));
    }

    #[test]
    fn xlsx_round_trips_through_import() {
        let template = two_section_template();
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.xlsx");
        save_as(&path, SaveFormat::Xlsx, &template, &grid(), &JsonIndex::None).unwrap();
        let report = crate::io::import_file(&path, &template).unwrap();
        assert_eq!(report.header_rows, 2);
        assert_eq!(report.rows, grid().trimmed_data());
    }

    #[test]
    fn unknown_export_format_is_an_error() {
        let template = two_section_template();
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            export_to(&tmp.path().join("x.csv"), "GISAID", &template, &grid()),
            Err(SaveError::UnknownFormat(_))
        ));
    }
}
