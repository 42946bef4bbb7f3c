// src/error.rs
//! Error taxonomy. Invalid cell content is never an error: it is recorded in
//! `InvalidCellMap`.

use std::path::PathBuf;
use thiserror::Error;

/// Malformed schema. Blocks the template load until the schema is fixed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("section '{section}' has no fields")]
    EmptySection { section: String },
    #[error("field '{field}' has no section")]
    FieldWithoutSection { field: String },
    #[error("field '{field}' borrows the vocabulary of unknown field '{source_field}'")]
    UnknownVocabularySource { field: String, source_field: String },
    #[error("field '{field}' has an invalid pattern: {reason}")]
    InvalidPattern { field: String, reason: String },
    #[error("field title '{title}' is used more than once")]
    DuplicateFieldTitle { title: String },
    #[error("template has no fields")]
    EmptyTemplate,
}

#[derive(Debug, Error)]
pub enum SchemaLoadError {
    #[error("failed to read schema '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse schema '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("template '{0}' not found")]
    TemplateNotFound(String),
    #[error("schema '{0}' declares no class with is_a = \"dh_interface\"")]
    NoInterfaceClass(String),
    #[error("please upload a template schema.json file (got '{0}')")]
    NotASchemaFile(String),
    #[error("template configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Import failures. The grid is left untouched.
#[derive(Debug, Error)]
pub enum FileFormatError {
    #[error("Only {accepted} files are supported (got '{extension}')")]
    UnsupportedExtension { extension: String, accepted: String },
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected JSON layout: {0}")]
    JsonLayout(String),
    #[error("failed to parse delimited data: {0}")]
    Delimited(#[from] csv::Error),
    #[error("failed to read workbook: {0}")]
    Workbook(String),
    #[error("no column header matches the template '{template}'")]
    HeaderMismatch { template: String },
}

/// Export failures. Surfaced in the save dialog, which stays open.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("invalid file name '{0}'")]
    InvalidFileName(String),
    #[error("unknown save format '{0}'")]
    UnknownFormat(String),
    #[error("export format '{format}' does not apply to template '{template}'")]
    FormatNotApplicable { format: String, template: String },
    #[error("index field '{0}' is not part of the template")]
    UnknownIndexField(String),
    #[error("export format '{format}' reads unknown field '{field}'")]
    UnknownExportSource { format: String, field: String },
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write delimited data: {0}")]
    Delimited(#[from] csv::Error),
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("template configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

#[derive(Debug, Error)]
pub enum HarmonizerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    SchemaLoad(#[from] SchemaLoadError),
    #[error(transparent)]
    FileFormat(#[from] FileFormatError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("no template loaded")]
    NoTemplate,
    #[error("grid '{0}' does not exist")]
    UnknownGrid(String),
    #[error("{0} invalid cell(s) present; fix them or force the operation")]
    InvalidCellsPresent(usize),
}

pub type HarmonizerResult<T> = Result<T, HarmonizerError>;
