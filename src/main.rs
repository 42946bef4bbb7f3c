// src/main.rs
use bevy::app::AppExit;
use clap::Parser;
use std::process::ExitCode;

use dataharmonizer::cli::{self, Cli};
use dataharmonizer::settings::{io as settings_io, AppSettings};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut settings = settings_io::load_settings_from_file::<AppSettings>()
        .unwrap_or_else(|e| {
            eprintln!("Warning: using default settings ({})", e);
            AppSettings::default()
        })
        .with_env_overrides();
    if let Some(dir) = &cli.templates_dir {
        settings.templates_dir = dir.clone();
    }

    match cli::run(cli, settings) {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(code) => ExitCode::from(code.get()),
    }
}
