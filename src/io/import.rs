// src/io/import.rs
//! Reads a data file into grid rows aligned with a template's columns.

use bevy::log::{debug, info, warn};
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::{Map, Value};
use std::cmp::Reverse;
use std::fs;
use std::path::Path;

use super::FileFormat;
use crate::error::FileFormatError;
use crate::grid::multivalue::MULTI_VALUE_SEPARATOR;
use crate::template::Template;

/// Rows mapped onto template columns, plus what could not be mapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub rows: Vec<Vec<String>>,
    /// Source headers with no matching field, in file order.
    pub unmapped_headers: Vec<String>,
    /// Header rows found above the data (0 for JSON).
    pub header_rows: usize,
}

pub fn import_file(path: &Path, template: &Template) -> Result<ImportReport, FileFormatError> {
    let format = FileFormat::from_path(path, &FileFormat::ALL)?;
    info!("Importing '{}' as {:?} for template '{}'.", path.display(), format, template.path());
    let report = match format {
        FileFormat::Xlsx | FileFormat::Xls => map_matrix(read_workbook(path)?, template)?,
        FileFormat::Csv => map_matrix(read_delimited(path, b',')?, template)?,
        FileFormat::Tsv => map_matrix(read_delimited(path, b'\t')?, template)?,
        FileFormat::Json => {
            let raw = fs::read_to_string(path).map_err(|source| FileFormatError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            map_json(
                &serde_json::from_str::<Value>(raw.trim_start_matches('\u{feff}'))?,
                template,
            )?
        }
    };
    if !report.unmapped_headers.is_empty() {
        warn!(
            "Import of '{}': {} column(s) not in template: {:?}",
            path.display(),
            report.unmapped_headers.len(),
            report.unmapped_headers
        );
    }
    info!("Imported {} row(s) from '{}'.", report.rows.len(), path.display());
    Ok(report)
}

/// First worksheet as a string matrix, anchored at A1.
pub fn read_workbook(path: &Path) -> Result<Vec<Vec<String>>, FileFormatError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| FileFormatError::Workbook(e.to_string()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| FileFormatError::Workbook("workbook contains no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| FileFormatError::Workbook(format!("sheet '{}': {}", sheet_name, e)))?;

    // Range coordinates are relative to its first used cell.
    let (start_row, start_col) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));
    let mut matrix = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col];
        cells.extend(row.iter().map(cell_text));
        matrix.push(cells);
    }
    debug!("Read {} row(s) from sheet '{}'.", matrix.len(), sheet_name);
    Ok(matrix)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if datetime.time() == chrono::NaiveTime::MIN => {
                datetime.format("%Y-%m-%d").to_string()
            }
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::Error(e) => e.to_string(),
    }
}

pub fn read_delimited(path: &Path, delimiter: u8) -> Result<Vec<Vec<String>>, FileFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)?;
    let mut matrix = Vec::new();
    for record in reader.records() {
        let record = record?;
        matrix.push(record.iter().map(|c| c.trim_start_matches('\u{feff}').to_string()).collect());
    }
    Ok(matrix)
}

/// Number of cells in `row` naming a template field.
fn header_score(row: &[String], template: &Template) -> usize {
    row.iter()
        .filter(|c| template.column_of(c.trim()).is_some())
        .count()
}

/// Locates the field header row (row 0, or row 1 under a section row) and
/// maps the rows below it onto template columns.
pub fn map_matrix(matrix: Vec<Vec<String>>, template: &Template) -> Result<ImportReport, FileFormatError> {
    let candidates = matrix.len().min(2);
    let header_row = (0..candidates)
        .map(|r| (r, header_score(&matrix[r], template)))
        .filter(|&(_, score)| score > 0)
        .max_by_key(|&(r, score)| (score, Reverse(r)))
        .map(|(r, _)| r)
        .ok_or_else(|| FileFormatError::HeaderMismatch {
            template: template.path(),
        })?;

    let mut unmapped_headers = Vec::new();
    let mapping: Vec<Option<usize>> = matrix[header_row]
        .iter()
        .map(|header| {
            let header = header.trim();
            let column = template.column_of(header);
            if column.is_none() && !header.is_empty() {
                unmapped_headers.push(header.to_string());
            }
            column
        })
        .collect();

    let columns = template.column_count();
    let rows = matrix
        .into_iter()
        .skip(header_row + 1)
        .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
        .map(|source| {
            let mut row = vec![String::new(); columns];
            for (value, target) in source.into_iter().zip(&mapping) {
                if let Some(col) = target {
                    row[*col] = value;
                }
            }
            row
        })
        .collect();

    Ok(ImportReport {
        rows,
        unmapped_headers,
        header_rows: header_row + 1,
    })
}

/// JSON data: an array of records, or an object of records keyed by an
/// index value. Records are keyed by field name or title.
pub fn map_json(value: &Value, template: &Template) -> Result<ImportReport, FileFormatError> {
    let records: Vec<&Map<String, Value>> = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_object()
                    .ok_or_else(|| FileFormatError::JsonLayout("array items must be objects".into()))
            })
            .collect::<Result<_, _>>()?,
        Value::Object(map) if map.contains_key("classes") => {
            return Err(FileFormatError::JsonLayout(
                "this is a schema document; load it as a template instead".into(),
            ))
        }
        Value::Object(map) => map
            .values()
            .map(|item| {
                item.as_object().ok_or_else(|| {
                    FileFormatError::JsonLayout("index-keyed values must be objects".into())
                })
            })
            .collect::<Result<_, _>>()?,
        _ => {
            return Err(FileFormatError::JsonLayout(
                "expected an array or object of records".into(),
            ))
        }
    };

    let columns = template.column_count();
    let mut unmapped_headers: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let mut row = vec![String::new(); columns];
        for (key, value) in record {
            match template.column_of(key) {
                Some(col) => row[col] = json_cell(value),
                None => {
                    if !unmapped_headers.contains(key) {
                        unmapped_headers.push(key.clone());
                    }
                }
            }
        }
        rows.push(row);
    }
    if rows.iter().all(|r| r.iter().all(String::is_empty)) && !unmapped_headers.is_empty() {
        return Err(FileFormatError::HeaderMismatch {
            template: template.path(),
        });
    }
    Ok(ImportReport {
        rows,
        unmapped_headers,
        header_rows: 0,
    })
}

fn json_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(json_cell)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(MULTI_VALUE_SEPARATOR),
        other => other.to_string(),
    }
}
