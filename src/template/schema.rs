// src/template/schema.rs
//! Raw schema document as read from `schema.json`.

use serde::{
    de::{self, DeserializeOwned, Deserializer},
    Deserialize,
};
use std::path::Path;

use super::datatype::Datatype;
use super::export_format::ExportFormat;
use super::vocabulary::{deserialize_vocabulary, CaseTransform, VocabularyNode};
use crate::error::SchemaLoadError;

/// `is_a` value marking a class as a data-entry template.
pub const INTERFACE_MARKER: &str = "dh_interface";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SchemaDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "ordered_entries")]
    pub classes: Vec<(String, RawClass)>,
    #[serde(default, deserialize_with = "ordered_entries")]
    pub export_formats: Vec<(String, ExportFormat)>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawClass {
    #[serde(default)]
    pub is_a: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub display: Option<bool>,
    #[serde(default)]
    pub see_also: Option<String>,
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub slots: Vec<RawSlot>,
}

impl RawClass {
    pub fn is_interface(&self) -> bool {
        self.is_a.as_deref() == Some(INTERFACE_MARKER)
    }

    pub fn is_published(&self) -> bool {
        self.status.as_deref().map_or(true, |s| s == "published")
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSlot {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slot_group: Option<String>,
    #[serde(default)]
    pub datatype: Datatype,
    /// Free text such as "required" or "recommended".
    #[serde(default)]
    pub requirement: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub recommended: Option<bool>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default, alias = "schema:ItemList", deserialize_with = "deserialize_vocabulary")]
    pub vocabulary: Vec<VocabularyNode>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub capitalize: Option<CaseTransform>,
    #[serde(default, alias = "dataStatus")]
    pub null_values: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub guidance: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub examples: Vec<String>,
}

impl RawSlot {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
            || self
                .requirement
                .as_deref()
                .is_some_and(|r| r.contains("required"))
    }

    pub fn is_recommended(&self) -> bool {
        self.recommended.unwrap_or(false)
            || self
                .requirement
                .as_deref()
                .is_some_and(|r| r.contains("recommended"))
    }
}

impl SchemaDocument {
    pub fn from_json_str(raw: &str, origin: &Path) -> Result<Self, SchemaLoadError> {
        let trimmed = raw.trim_start_matches('\u{FEFF}');
        serde_json::from_str(trimmed).map_err(|source| SchemaLoadError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self, SchemaLoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw, path)
    }

    pub fn class(&self, name: &str) -> Option<&RawClass> {
        self.classes
            .iter()
            .find(|(class_name, _)| class_name == name)
            .map(|(_, class)| class)
    }

    pub fn interface_classes(&self) -> impl Iterator<Item = (&str, &RawClass)> {
        self.classes
            .iter()
            .filter(|(_, class)| class.is_interface())
            .map(|(name, class)| (name.as_str(), class))
    }

    /// First class declared as a template; used when a schema is uploaded
    /// without naming the template.
    pub fn default_interface(&self) -> Option<&str> {
        self.interface_classes().next().map(|(name, _)| name)
    }

    pub fn export_formats_for(&self, template: &str) -> Vec<(String, ExportFormat)> {
        self.export_formats
            .iter()
            .filter(|(_, format)| format.pertains_to(template))
            .cloned()
            .collect()
    }
}

/// Scans a JSON document's `classes` map for the template class.
pub fn resolve_interface_class(document: &serde_json::Value) -> Option<String> {
    document
        .get("classes")?
        .as_object()?
        .iter()
        .find(|(_, class)| class.get("is_a").and_then(|v| v.as_str()) == Some(INTERFACE_MARKER))
        .map(|(name, _)| name.clone())
}

fn ordered_entries<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
    map.into_iter()
        .map(|(key, value)| {
            serde_json::from_value(value)
                .map(|parsed| (key.clone(), parsed))
                .map_err(|e| de::Error::custom(format!("Invalid entry '{}': {}", key, e)))
        })
        .collect()
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::String(s) => Ok(vec![s]),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => Ok(s),
                other => Ok(other.to_string()),
            })
            .collect(),
        other => Err(de::Error::custom(format!(
            "expected string or list, got {}",
            other
        ))),
    }
}
