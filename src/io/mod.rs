// src/io/mod.rs
//! File import and export. Formats are closed enums; every dispatch is an
//! exhaustive match.

pub mod export;
pub mod import;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{FileFormatError, SaveError};

pub use export::{export_to, save_as, JsonIndex};
pub use import::{import_file, ImportReport};

/// Formats accepted by "Open".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Xlsx,
    Xls,
    Tsv,
    Csv,
    Json,
}

impl FileFormat {
    pub const ALL: [FileFormat; 5] = [
        FileFormat::Xlsx,
        FileFormat::Xls,
        FileFormat::Tsv,
        FileFormat::Csv,
        FileFormat::Json,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
            FileFormat::Tsv => "tsv",
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        let lower = extension.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == lower)
    }

    /// `"xlsx, xls, tsv, csv, json"`, as shown in the rejection message.
    pub fn accepted_list(accepted: &[FileFormat]) -> String {
        accepted
            .iter()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resolves a path's extension against the formats an entry point accepts.
    pub fn from_path(path: &Path, accepted: &[FileFormat]) -> Result<Self, FileFormatError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_extension(&extension)
            .filter(|f| accepted.contains(f))
            .ok_or_else(|| FileFormatError::UnsupportedExtension {
                extension,
                accepted: Self::accepted_list(accepted),
            })
    }
}

/// Formats offered by "Save As" and used by export descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    Xlsx,
    Csv,
    Tsv,
    Json,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Xlsx => "xlsx",
            SaveFormat::Csv => "csv",
            SaveFormat::Tsv => "tsv",
            SaveFormat::Json => "json",
        }
    }

    pub fn delimiter(self) -> Option<u8> {
        match self {
            SaveFormat::Csv => Some(b','),
            SaveFormat::Tsv => Some(b'\t'),
            SaveFormat::Xlsx | SaveFormat::Json => None,
        }
    }
}

impl fmt::Display for SaveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SaveFormat {
    type Err = SaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(SaveFormat::Xlsx),
            "csv" => Ok(SaveFormat::Csv),
            "tsv" => Ok(SaveFormat::Tsv),
            "json" => Ok(SaveFormat::Json),
            _ => Err(SaveError::UnknownFormat(s.to_string())),
        }
    }
}

const INVALID_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Rejects base names that are empty, hidden, or contain path or reserved
/// characters.
pub fn validate_base_name(name: &str) -> Result<(), SaveError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.starts_with('.') || trimmed.contains(&INVALID_NAME_CHARS[..]) {
        return Err(SaveError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

/// Validates the file name of `path` and infers the save format from its
/// extension.
pub fn save_target(path: &Path) -> Result<SaveFormat, SaveError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    validate_base_name(&stem)?;
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    extension.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_lists_accepted_extensions() {
        let err = FileFormat::from_path(Path::new("data.txt"), &FileFormat::ALL).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only xlsx, xls, tsv, csv, json files are supported (got 'txt')"
        );
        let json_only = FileFormat::from_path(Path::new("data.csv"), &[FileFormat::Json]);
        assert!(json_only.is_err());
        assert_eq!(
            FileFormat::from_path(Path::new("DATA.XLSX"), &FileFormat::ALL).unwrap(),
            FileFormat::Xlsx
        );
    }

    #[test]
    fn base_names_follow_file_system_rules() {
        assert!(validate_base_name("samples_2021").is_ok());
        for bad in ["", "  ", ".hidden", "a/b", "a:b", "what?", "x|y"] {
            assert!(matches!(validate_base_name(bad), Err(SaveError::InvalidFileName(_))), "{bad}");
        }
    }

    #[test]
    fn save_target_reads_extension() {
        assert_eq!(save_target(Path::new("out/run1.tsv")).unwrap(), SaveFormat::Tsv);
        assert!(matches!(
            save_target(Path::new("out/run1.docx")),
            Err(SaveError::UnknownFormat(_))
        ));
        assert!(matches!(
            save_target(Path::new("out/.tsv")),
            Err(SaveError::InvalidFileName(_)) | Err(SaveError::UnknownFormat(_))
        ));
    }

    #[test]
    fn save_format_deserializes_lowercase() {
        let format: SaveFormat = serde_json::from_str("\"csv\"").unwrap();
        assert_eq!(format, SaveFormat::Csv);
        assert_eq!(SaveFormat::Xlsx.to_string(), "xlsx");
    }
}
