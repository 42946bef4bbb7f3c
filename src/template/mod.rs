// src/template/mod.rs

pub mod builder;
pub mod columns;
pub mod datatype;
pub mod definition;
pub mod export_format;
pub mod field;
pub mod loader;
pub mod menu;
pub mod schema;
#[cfg(test)]
pub(crate) mod test_support;
pub mod vocabulary;

pub use builder::build_template;
pub use columns::{column_config, column_configs, flat_headers, nested_headers, ColumnConfig, ColumnKind};
pub use datatype::{Datatype, NumericKind};
pub use definition::Template;
pub use export_format::{ExportColumn, ExportFormat};
pub use field::{Field, FieldPattern, Section};
pub use loader::{load_template, SchemaSource};
pub use menu::{TemplateEntry, TemplateMenu};
pub use schema::{resolve_interface_class, SchemaDocument, INTERFACE_MARKER};
