// src/settings/mod.rs
pub mod io;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::harmonizer::GridSettings;

/// Environment variable overriding `templates_dir`.
pub const TEMPLATES_DIR_ENV: &str = "DATAHARMONIZER_TEMPLATES_DIR";

#[derive(Resource, Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub templates_dir: PathBuf,
    /// `schema/Template` path loaded when none is given.
    pub default_template: Option<String>,
    pub view_draft_templates: bool,
    pub min_rows: usize,
    pub min_spare_rows: usize,
    pub header_rows: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        let grid = GridSettings::default();
        Self {
            templates_dir: PathBuf::from("templates"),
            default_template: None,
            view_draft_templates: false,
            min_rows: grid.min_rows,
            min_spare_rows: grid.min_spare_rows,
            header_rows: grid.header_rows,
        }
    }
}

impl AppSettings {
    pub fn grid_settings(&self) -> GridSettings {
        GridSettings {
            min_rows: self.min_rows,
            min_spare_rows: self.min_spare_rows,
            header_rows: self.header_rows.min(2),
        }
    }

    /// Applies `DATAHARMONIZER_TEMPLATES_DIR` when set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var(TEMPLATES_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.templates_dir = PathBuf::from(dir);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"templates_dir": "/srv/templates", "header_rows": 7}"#).unwrap();
        assert_eq!(settings.templates_dir, PathBuf::from("/srv/templates"));
        assert_eq!(settings.min_rows, AppSettings::default().min_rows);
        assert_eq!(settings.grid_settings().header_rows, 2);
    }
}
