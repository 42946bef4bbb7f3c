// src/harmonizer/plugin.rs
use bevy::prelude::*;
use bevy_tokio_tasks::TokioTasksPlugin;

use super::events::{
    FileOpenFinished, FileWritten, GridDataReplaced, HarmonizerFeedback, MultiValueEditOpened,
    RequestAddRows, RequestBeginMultiValueEdit, RequestColumnVisibility,
    RequestCommitMultiValueEdit, RequestExportTo, RequestFillColumn, RequestLoadTemplate,
    RequestNewGrid, RequestNextInvalidCell, RequestOpenFile, RequestRescanTemplates,
    RequestRowVisibility, RequestSaveAs, RequestSelectCell, RequestValidateGrid,
    SelectionChanged, TemplateInstalled, TemplateLoadFinished, UpdateCellEvent,
    ValidationCompleted, ValidationFinished,
};
use super::resources::{HarmonizerRegistry, TemplateCatalog};
use super::systems::{self, forward_events};
use crate::settings::AppSettings;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum HarmonizerSystemSet {
    /// Requests that start work (including background tasks).
    UserInput,
    /// Background results and edits applied to the registry.
    ApplyChanges,
    /// Navigation and visibility over the applied state.
    View,
    FileOperations,
}

/// Grid state, template loading, validation and file IO.
pub struct HarmonizerPlugin;

impl Plugin for HarmonizerPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<TokioTasksPlugin>() {
            app.add_plugins(TokioTasksPlugin::default());
        }

        app.configure_sets(
            Update,
            (
                HarmonizerSystemSet::UserInput,
                HarmonizerSystemSet::ApplyChanges.after(HarmonizerSystemSet::UserInput),
                HarmonizerSystemSet::View.after(HarmonizerSystemSet::ApplyChanges),
                HarmonizerSystemSet::FileOperations.after(HarmonizerSystemSet::View),
            ),
        );

        // --- Resource Initialization ---
        app.init_resource::<AppSettings>()
            .init_resource::<HarmonizerRegistry>()
            .init_resource::<TemplateCatalog>();

        // --- Event Registration ---
        app.add_event::<RequestLoadTemplate>()
            .add_event::<RequestOpenFile>()
            .add_event::<RequestNewGrid>()
            .add_event::<RequestAddRows>()
            .add_event::<UpdateCellEvent>()
            .add_event::<RequestFillColumn>()
            .add_event::<RequestValidateGrid>()
            .add_event::<RequestNextInvalidCell>()
            .add_event::<RequestSelectCell>()
            .add_event::<RequestColumnVisibility>()
            .add_event::<RequestRowVisibility>()
            .add_event::<RequestBeginMultiValueEdit>()
            .add_event::<RequestCommitMultiValueEdit>()
            .add_event::<RequestSaveAs>()
            .add_event::<RequestExportTo>()
            .add_event::<RequestRescanTemplates>()
            .add_event::<TemplateLoadFinished>()
            .add_event::<FileOpenFinished>()
            .add_event::<ValidationFinished>()
            .add_event::<HarmonizerFeedback>()
            .add_event::<TemplateInstalled>()
            .add_event::<GridDataReplaced>()
            .add_event::<ValidationCompleted>()
            .add_event::<SelectionChanged>()
            .add_event::<MultiValueEditOpened>()
            .add_event::<FileWritten>();

        app.add_systems(Startup, systems::template::setup_harmonizer);

        app.add_systems(
            Update,
            (
                systems::template::handle_rescan_templates,
                systems::template::handle_load_template_request,
                systems::files::handle_open_file_request,
                systems::validation::handle_validate_request,
            )
                .chain()
                .in_set(HarmonizerSystemSet::UserInput),
        );
        app.add_systems(
            Update,
            (
                forward_events::<TemplateLoadFinished>,
                forward_events::<FileOpenFinished>,
                forward_events::<ValidationFinished>,
                ApplyDeferred,
                systems::template::handle_template_load_finished,
                systems::files::handle_file_open_finished,
                systems::editing::handle_new_grid_request,
                systems::editing::handle_add_rows_request,
                systems::editing::handle_cell_update,
                systems::editing::handle_fill_column_request,
                systems::editing::handle_begin_multi_value_edit,
                systems::editing::handle_commit_multi_value_edit,
                systems::validation::handle_validation_finished,
            )
                .chain()
                .in_set(HarmonizerSystemSet::ApplyChanges),
        );
        app.add_systems(
            Update,
            (
                systems::navigation::handle_select_cell,
                systems::navigation::handle_next_invalid_cell,
                systems::navigation::handle_column_visibility,
                systems::navigation::handle_row_visibility,
            )
                .chain()
                .in_set(HarmonizerSystemSet::View),
        );
        app.add_systems(
            Update,
            (
                systems::files::handle_save_as_request,
                systems::files::handle_export_to_request,
            )
                .chain()
                .in_set(HarmonizerSystemSet::FileOperations),
        );

        info!("HarmonizerPlugin initialized.");
    }
}
