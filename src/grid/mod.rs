// src/grid/mod.rs

pub mod cell_meta;
pub mod data;
pub mod invalid_cells;
pub mod multivalue;
pub mod navigator;
pub mod validator;
pub mod visibility;

pub use cell_meta::CellMeta;
pub use data::GridData;
pub use invalid_cells::{CellIssue, InvalidCellMap};
pub use multivalue::{normalize_multi_value, MultiValueEdit, MultiValueOption};
pub use navigator::{next_invalid_cell, CellRange, CurrentSelection};
pub use validator::{validate_grid, CellValidator};
pub use visibility::{ColumnVisibility, RowVisibility, VisibilityState};
