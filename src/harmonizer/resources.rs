// src/harmonizer/resources.rs
use bevy::prelude::Resource;
use std::collections::BTreeMap;

use super::state::{DataHarmonizer, GridSettings};
use crate::error::{HarmonizerError, HarmonizerResult};
use crate::template::TemplateMenu;

pub const DEFAULT_GRID: &str = "main";

/// Named grids, each an independent `DataHarmonizer`.
#[derive(Resource, Debug, Default)]
pub struct HarmonizerRegistry {
    grids: BTreeMap<String, DataHarmonizer>,
    defaults: GridSettings,
}

impl HarmonizerRegistry {
    pub fn with_defaults(defaults: GridSettings) -> Self {
        Self {
            grids: BTreeMap::new(),
            defaults,
        }
    }

    pub fn set_defaults(&mut self, defaults: GridSettings) {
        self.defaults = defaults;
    }

    pub fn get(&self, name: &str) -> Option<&DataHarmonizer> {
        self.grids.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut DataHarmonizer> {
        self.grids.get_mut(name)
    }

    pub fn require_mut(&mut self, name: &str) -> HarmonizerResult<&mut DataHarmonizer> {
        self.grids
            .get_mut(name)
            .ok_or_else(|| HarmonizerError::UnknownGrid(name.to_string()))
    }

    pub fn get_or_create(&mut self, name: &str) -> &mut DataHarmonizer {
        let defaults = self.defaults;
        self.grids
            .entry(name.to_string())
            .or_insert_with(|| DataHarmonizer::new(defaults))
    }

    pub fn remove(&mut self, name: &str) -> Option<DataHarmonizer> {
        self.grids.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.grids.keys().map(String::as_str)
    }

    /// True while any grid has a background operation running.
    pub fn is_busy(&self) -> bool {
        self.grids.values().any(|g| g.overlay().is_visible())
    }
}

/// Template menu scanned from the configured templates directory.
#[derive(Resource, Debug, Default, Clone)]
pub struct TemplateCatalog(pub TemplateMenu);
