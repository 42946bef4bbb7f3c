// src/cli/report.rs
use bevy::app::AppExit;

use super::script::EXIT_FAILURE;
use crate::grid::InvalidCellMap;
use crate::settings::{io as settings_io, AppSettings};
use crate::template::{column_configs, ColumnKind, Template, TemplateMenu};

pub fn print_templates(menu: &TemplateMenu, drafts: bool) {
    let options = menu.options(drafts);
    if options.is_empty() {
        println!("No templates found.");
        return;
    }
    println!("{:<40} {:<10} {}", "Template", "Status", "Schema file");
    println!("{}", "-".repeat(80));
    for path in options {
        let Some(entry) = menu.find(&path) else {
            continue;
        };
        println!(
            "{:<40} {:<10} {}",
            path,
            if entry.published { "published" } else { "draft" },
            entry.schema_path.display()
        );
    }
}

fn kind_label(kind: &ColumnKind) -> String {
    match kind {
        ColumnKind::Plain => "text".to_string(),
        ColumnKind::Date { date_format, .. } => format!("date ({})", date_format),
        ColumnKind::Autocomplete { source, .. } => format!("dropdown ({} values)", source.len()),
        ColumnKind::MultiSelect { source, .. } => format!("multi-select ({} values)", source.len()),
    }
}

pub fn print_fields(template: &Template) {
    println!("=== {} ===\n", template.path());
    let configs = column_configs(template);
    for section in &template.sections {
        println!("{}", section.title);
        for column in section.columns.clone() {
            let (Some(field), Some(config)) = (template.field(column), configs.get(column)) else {
                continue;
            };
            println!(
                "  {:<4} {:<32} {:<12} {:<24} {}",
                column,
                field.title,
                field.requirement_label(),
                field.datatype.to_string(),
                kind_label(&config.kind)
            );
        }
    }
    let formats: Vec<&str> = template
        .applicable_export_formats()
        .map(|(name, _)| name.as_str())
        .collect();
    if !formats.is_empty() {
        println!("\nExport formats: {}", formats.join(", "));
    }
}

pub fn print_invalid_cells(template: &Template, invalid: &InvalidCellMap) {
    if invalid.is_empty() {
        println!("All cells are valid.");
        return;
    }
    println!(
        "{} invalid cell(s) in {} row(s):\n",
        invalid.cell_count(),
        invalid.row_count()
    );
    println!("{:<6} {:<32} {}", "Row", "Field", "Problem");
    println!("{}", "-".repeat(80));
    for (row, col, issue) in invalid.iter() {
        let title = template.field(col).map_or("?", |f| f.title.as_str());
        let problem = match issue.message() {
            "" => "required value missing",
            message => message,
        };
        println!("{:<6} {:<32} {}", row + 1, title, problem);
    }
}

pub fn print_settings(settings: &AppSettings, write: bool) -> AppExit {
    match settings_io::get_config_path() {
        Ok(path) => println!("Settings file: {}", path.display()),
        Err(e) => println!("Settings file: unavailable ({})", e),
    }
    match serde_json::to_string_pretty(settings) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            return AppExit::from_code(EXIT_FAILURE);
        }
    }
    if write {
        if let Err(e) = settings_io::save_settings_to_file(settings) {
            eprintln!("Error: failed to save settings: {}", e);
            return AppExit::from_code(EXIT_FAILURE);
        }
        println!("Settings saved.");
    }
    AppExit::Success
}
