// src/template/menu.rs
//! Template menu built by scanning a templates directory for
//! `<schema>/schema.json` files.

use bevy::log::{error, info, trace, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::schema::SchemaDocument;

pub const SCHEMA_FILE_NAME: &str = "schema.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    pub schema_name: String,
    pub template_name: String,
    pub schema_path: PathBuf,
    pub published: bool,
    pub display: bool,
}

impl TemplateEntry {
    pub fn path(&self) -> String {
        format!("{}/{}", self.schema_name, self.template_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateMenu {
    entries: Vec<TemplateEntry>,
}

/// Splits a `schema/Template` path.
pub fn parse_template_path(path: &str) -> Option<(&str, &str)> {
    let (schema, template) = path.split_once('/')?;
    if schema.is_empty() || template.is_empty() {
        return None;
    }
    Some((schema, template))
}

impl TemplateMenu {
    pub fn from_entries(entries: Vec<TemplateEntry>) -> Self {
        Self { entries }
    }

    /// Scans `templates_dir` one level deep. Unreadable schemas are logged
    /// and skipped.
    pub fn scan(templates_dir: &Path) -> Self {
        info!("TemplateMenu: Scanning '{}' for schemas...", templates_dir.display());
        let mut entries = Vec::new();
        if !templates_dir.exists() {
            warn!(
                "TemplateMenu: Templates directory '{}' does not exist.",
                templates_dir.display()
            );
            return Self { entries };
        }

        let mut schema_files: Vec<PathBuf> = WalkDir::new(templates_dir)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    error!("TemplateMenu: Failed reading entry: {}", e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && e.file_name() == SCHEMA_FILE_NAME)
            .map(|e| e.into_path())
            .collect();
        schema_files.sort();

        for schema_path in schema_files {
            let Some(schema_name) = schema_path
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            if schema_name.starts_with('.') {
                trace!("TemplateMenu: Skipping hidden folder '{}'.", schema_name);
                continue;
            }
            match SchemaDocument::read(&schema_path) {
                Ok(document) => {
                    for (template_name, class) in document.interface_classes() {
                        entries.push(TemplateEntry {
                            schema_name: schema_name.clone(),
                            template_name: template_name.to_string(),
                            schema_path: schema_path.clone(),
                            published: class.is_published(),
                            display: class.display.unwrap_or(true),
                        });
                    }
                }
                Err(e) => warn!("TemplateMenu: Skipping '{}': {}", schema_path.display(), e),
            }
        }
        info!("TemplateMenu: Found {} template(s).", entries.len());
        Self { entries }
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Menu paths shown to the user; drafts only when requested.
    pub fn options(&self, view_drafts: bool) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.display && (view_drafts || e.published))
            .map(TemplateEntry::path)
            .collect()
    }

    pub fn find(&self, template_path: &str) -> Option<&TemplateEntry> {
        let (schema, template) = parse_template_path(template_path)?;
        self.entries
            .iter()
            .find(|e| e.schema_name == schema && e.template_name == template)
    }

    /// Path used when none is requested: the first displayed entry.
    pub fn default_path(&self) -> Option<String> {
        self.entries.iter().find(|e| e.display).map(TemplateEntry::path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_schema(root: &Path, folder: &str, body: &str) {
        let dir = root.join(folder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SCHEMA_FILE_NAME), body).unwrap();
    }

    #[test]
    fn scans_folders_and_hides_drafts() {
        let tmp = tempfile::tempdir().unwrap();
        write_schema(
            tmp.path(),
            "covid",
            r#"{"classes": {"Covid": {"is_a": "dh_interface"}, "Draft": {"is_a": "dh_interface", "status": "draft"}, "Base": {}}}"#,
        );
        write_schema(tmp.path(), "broken", "{not json");

        let menu = TemplateMenu::scan(tmp.path());
        assert_eq!(menu.entries().len(), 2);
        assert_eq!(menu.options(false), vec!["covid/Covid"]);
        assert_eq!(menu.options(true), vec!["covid/Covid", "covid/Draft"]);
        assert!(menu.find("covid/Draft").is_some());
        assert!(menu.find("covid/Base").is_none());
        assert_eq!(menu.default_path().as_deref(), Some("covid/Covid"));
    }

    #[test]
    fn missing_directory_gives_empty_menu() {
        let menu = TemplateMenu::scan(Path::new("/definitely/not/here"));
        assert!(menu.is_empty());
    }

    #[test]
    fn template_paths_need_both_parts() {
        assert_eq!(parse_template_path("a/B"), Some(("a", "B")));
        assert_eq!(parse_template_path("a/"), None);
        assert_eq!(parse_template_path("plain"), None);
    }
}
