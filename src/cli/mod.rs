// src/cli/mod.rs
// Command-line front end. Every command drives the headless app.

pub mod report;
pub mod script;

use bevy::app::AppExit;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::io::JsonIndex;
use crate::settings::AppSettings;
use crate::template::SchemaSource;
use script::{run_script, ScriptStep};

#[derive(Parser)]
#[command(name = "dataharmonizer")]
#[command(about = "DataHarmonizer - schema-driven data validation and export", long_about = None)]
pub struct Cli {
    /// Directory holding <schema>/schema.json files (overrides settings)
    #[arg(long, global = true)]
    pub templates_dir: Option<PathBuf>,

    /// `schema/Template` menu path or a schema .json file; falls back to the
    /// configured default template, then the first menu entry
    #[arg(short, long, global = true)]
    pub template: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List templates found in the templates directory
    Templates {
        /// Include draft templates
        #[arg(long)]
        drafts: bool,
    },

    /// Print the sections, fields and column configuration of a template
    Fields,

    /// Validate a data file; exits with 1 when invalid cells are found
    Validate {
        /// Data file (xlsx, xls, tsv, csv or json)
        file: PathBuf,
    },

    /// Save a data file in another format (format from the output extension)
    Save {
        file: PathBuf,
        out: PathBuf,
        /// Key JSON output by this field's values
        #[arg(long, conflicts_with = "auto_index")]
        index_key: Option<String>,
        /// Key JSON output by row number
        #[arg(long)]
        auto_index: bool,
        /// Write even when invalid cells remain
        #[arg(long)]
        force: bool,
    },

    /// Export a data file through a format declared by the schema
    Export {
        file: PathBuf,
        /// Export format name, e.g. GISAID
        format: String,
        out: PathBuf,
        #[arg(long)]
        force: bool,
    },

    /// Show the effective settings and where they are stored
    Settings {
        /// Persist the effective settings
        #[arg(long)]
        write: bool,
    },
}

/// Exit code 0 on success, 1 when validation finds invalid cells, 2 on errors.
pub fn run(cli: Cli, settings: AppSettings) -> AppExit {
    let load = ScriptStep::LoadTemplate(cli.template.as_deref().map(SchemaSource::from_argument));
    let steps = match cli.command {
        Commands::Templates { drafts } => vec![ScriptStep::ListTemplates { drafts }],
        Commands::Fields => vec![load, ScriptStep::PrintFields],
        Commands::Validate { file } => vec![
            load,
            ScriptStep::OpenFile(file),
            ScriptStep::Validate,
            ScriptStep::ReportInvalidCells,
        ],
        Commands::Save {
            file,
            out,
            index_key,
            auto_index,
            force,
        } => {
            let index = match (index_key, auto_index) {
                (Some(key), _) => JsonIndex::Field(key),
                (None, true) => JsonIndex::Auto,
                (None, false) => JsonIndex::None,
            };
            vec![
                load,
                ScriptStep::OpenFile(file),
                ScriptStep::SaveAs {
                    path: out,
                    index,
                    force,
                },
            ]
        }
        Commands::Export {
            file,
            format,
            out,
            force,
        } => vec![
            load,
            ScriptStep::OpenFile(file),
            ScriptStep::ExportTo {
                path: out,
                format_name: format,
                force,
            },
        ],
        Commands::Settings { write } => return report::print_settings(&settings, write),
    };
    run_script(settings, steps)
}
