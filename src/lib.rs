// src/lib.rs
pub mod cli;
pub mod error;
pub mod grid;
pub mod harmonizer;
pub mod io;
pub mod settings;
pub mod template;
