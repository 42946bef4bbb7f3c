// src/harmonizer/systems/template.rs
use bevy::prelude::*;
use bevy_tokio_tasks::TokioTasksRuntime;

use super::{send_feedback, SendEvent};
use crate::harmonizer::events::{
    HarmonizerFeedback, RequestLoadTemplate, RequestRescanTemplates, TemplateInstalled,
    TemplateLoadFinished,
};
use crate::harmonizer::resources::{HarmonizerRegistry, TemplateCatalog};
use crate::settings::AppSettings;
use crate::template::{load_template, TemplateMenu};

/// Applies grid defaults and scans the template menu.
pub fn setup_harmonizer(
    mut commands: Commands,
    settings: Res<AppSettings>,
    mut registry: ResMut<HarmonizerRegistry>,
) {
    registry.set_defaults(settings.grid_settings());
    let menu = TemplateMenu::scan(&settings.templates_dir);
    info!(
        "Harmonizer ready: {} template(s) offered from '{}'.",
        menu.options(settings.view_draft_templates).len(),
        settings.templates_dir.display()
    );
    commands.insert_resource(TemplateCatalog(menu));
}

pub fn handle_rescan_templates(
    mut events: EventReader<RequestRescanTemplates>,
    settings: Res<AppSettings>,
    mut catalog: ResMut<TemplateCatalog>,
) {
    if events.read().count() > 0 {
        catalog.0 = TemplateMenu::scan(&settings.templates_dir);
    }
}

pub fn handle_load_template_request(
    mut events: EventReader<RequestLoadTemplate>,
    mut registry: ResMut<HarmonizerRegistry>,
    catalog: Res<TemplateCatalog>,
    runtime: Res<TokioTasksRuntime>,
) {
    for event in events.read() {
        let harmonizer = registry.get_or_create(&event.grid);
        let ticket = harmonizer.begin_template_switch();
        harmonizer.overlay_mut().begin();
        info!("Loading template {:?} into grid '{}'.", event.source, event.grid);

        let grid = event.grid.clone();
        let source = event.source.clone();
        let menu = catalog.0.clone();
        runtime.spawn_background_task(move |mut ctx| async move {
            let result = tokio::task::spawn_blocking(move || {
                load_template(&source, &menu).map_err(|e| e.to_string())
            })
            .await
            .unwrap_or_else(|e| Err(format!("Template load task failed: {}", e)));

            ctx.run_on_main_thread(move |world_ctx| {
                world_ctx.world.spawn(SendEvent {
                    event: TemplateLoadFinished { grid, ticket, result },
                });
            })
            .await;
        });
    }
}

pub fn handle_template_load_finished(
    mut events: EventReader<TemplateLoadFinished>,
    mut registry: ResMut<HarmonizerRegistry>,
    mut feedback_writer: EventWriter<HarmonizerFeedback>,
    mut installed_writer: EventWriter<TemplateInstalled>,
) {
    for event in events.read() {
        let Some(harmonizer) = registry.get_mut(&event.grid) else {
            warn!("Template loaded for unknown grid '{}'.", event.grid);
            continue;
        };
        harmonizer.overlay_mut().end();
        if !harmonizer.is_current_generation(event.ticket) {
            debug!(
                "Discarding superseded template load for grid '{}' ({:?}).",
                event.grid, event.ticket
            );
            continue;
        }
        match &event.result {
            Ok(template) => {
                let template_path = template.path();
                harmonizer.install_template(template.clone());
                send_feedback(
                    &mut feedback_writer,
                    &event.grid,
                    format!("Template '{}' loaded.", template_path),
                    false,
                );
                installed_writer.write(TemplateInstalled {
                    grid: event.grid.clone(),
                    template_path,
                });
            }
            Err(e) => send_feedback(
                &mut feedback_writer,
                &event.grid,
                format!("Template load failed: {}", e),
                true,
            ),
        }
    }
}
