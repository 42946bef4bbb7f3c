// src/harmonizer/mod.rs
pub mod events;
pub mod plugin;
pub mod resources;
pub mod state;
pub mod systems;

pub use plugin::{HarmonizerPlugin, HarmonizerSystemSet};
pub use resources::{HarmonizerRegistry, TemplateCatalog, DEFAULT_GRID};
pub use state::{DataHarmonizer, GridSettings, LoadingOverlay, OperationTicket};
