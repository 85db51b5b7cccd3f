use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use tabstat::data::report::report_file_name;
use tabstat::data::summary::analysis_file_name;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – file info and column list
// ---------------------------------------------------------------------------

/// Render the left panel with the session's file info.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dataset");
    ui.separator();

    // Clone what we need so we can mutate state below.
    let info = match state.session.current() {
        Some(record) => record.info.clone(),
        None => {
            ui.label("No file loaded.");
            return;
        }
    };

    ui.strong(info.filename.as_str());
    ui.label(info.shape.as_str());
    ui.separator();

    // ---- Histogram column selector ----
    ui.strong("Histogram");
    let current = state.histogram_column.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("histogram_column")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for col in info.numeric_columns() {
                if ui.selectable_label(current == col, col).clicked() {
                    state.set_histogram_column(col.to_string());
                }
            }
        });
    ui.separator();

    // ---- Column list with dtypes ----
    ui.strong("Columns");
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("column_types")
                .striped(true)
                .num_columns(2)
                .show(ui, |ui: &mut Ui| {
                    for (name, dtype) in &info.column_types {
                        let color = state
                            .column_colors
                            .as_ref()
                            .map_or(Color32::GRAY, |c| c.color_for(name));
                        ui.label(RichText::new(name.as_str()).color(color));
                        ui.label(RichText::new(dtype.as_str()).monospace().weak());
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }

            let has_file = state.session.current().is_some();
            if ui
                .add_enabled(has_file, egui::Button::new("Export analysis CSV…"))
                .clicked()
            {
                export_analysis_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_file, egui::Button::new("Export report…"))
                .clicked()
            {
                export_report_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(record) = state.session.current() {
            ui.label(format!("{}: {}", record.info.filename, record.info.shape));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg.as_str()).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let allowed: Vec<&str> = state
        .config
        .allowed_extensions
        .iter()
        .map(String::as_str)
        .collect();

    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &allowed)
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xls"])
        .pick_file();

    if let Some(path) = file {
        state.open_upload(&path);
    }
}

fn export_analysis_dialog(state: &mut AppState) {
    let Some(name) = state
        .session
        .current()
        .map(|r| analysis_file_name(&r.info.filename))
    else {
        return;
    };
    let target = rfd::FileDialog::new()
        .set_title("Save analysis")
        .set_file_name(name)
        .add_filter("CSV", &["csv"])
        .save_file();
    if let Some(path) = target {
        state.export_analysis(&path);
    }
}

fn export_report_dialog(state: &mut AppState) {
    let Some(name) = state
        .session
        .current()
        .map(|r| report_file_name(&r.info.filename))
    else {
        return;
    };
    let target = rfd::FileDialog::new()
        .set_title("Save report")
        .set_file_name(name)
        .add_filter("Markdown", &["md"])
        .save_file();
    if let Some(path) = target {
        state.export_report(&path);
    }
}
