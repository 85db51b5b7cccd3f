use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use tabstat::data::{AggregateResult, ColumnStats, Operation, Outcome};

use crate::color::ColumnColors;
use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel: command line, result, preview, histogram
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if state.session.current().is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to start  (File → Open…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            command_line(ui, state);
            ui.add_space(6.0);
            outcome_view(ui, state);
            ui.separator();
            history(ui, state);
            ui.separator();
            preview_table(ui, state);
            ui.separator();
            plot::histogram_plot(ui, state);
        });
}

fn command_line(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Command:");
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.command_input)
                .hint_text("mean of age   (empty = every numeric column)")
                .desired_width(360.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Run").clicked() || submitted {
            state.run_command();
        }
    });

    let ops: Vec<&str> = Operation::ALL.iter().map(|op| op.name()).collect();
    ui.label(RichText::new(format!("Operations: {}", ops.join(", "))).weak());
}

fn outcome_view(ui: &mut Ui, state: &AppState) {
    let Some(outcome) = &state.last_outcome else {
        return;
    };

    match outcome {
        Outcome::Failure { error } => {
            ui.label(RichText::new(error.as_str()).color(Color32::RED));
        }
        Outcome::Success { result, command } => {
            let title = if command.is_empty() {
                "All numeric columns".to_string()
            } else {
                command.clone()
            };
            ui.horizontal(|ui: &mut Ui| {
                ui.strong(title);
                if ui.small_button("Copy JSON").clicked() {
                    match serde_json::to_string_pretty(outcome) {
                        Ok(json) => ui.ctx().copy_text(json),
                        Err(e) => log::error!("Failed to serialise result: {e}"),
                    }
                }
            });
            if result.is_empty() {
                ui.label("No numeric columns.");
            } else {
                result_grid(ui, result, state.column_colors.as_ref());
            }
        }
    }
}

fn result_grid(ui: &mut Ui, result: &AggregateResult, colors: Option<&ColumnColors>) {
    egui::Grid::new("outcome_grid")
        .striped(true)
        .num_columns(3)
        .show(ui, |ui: &mut Ui| {
            ui.strong("column");
            ui.strong("statistic");
            ui.strong("value");
            ui.end_row();

            for (column, stats) in &result.entries {
                let color = colors.map_or(Color32::GRAY, |c| c.color_for(column));
                match stats {
                    ColumnStats::Stats(entries) => {
                        for (op, value) in entries {
                            ui.label(RichText::new(column.as_str()).color(color));
                            ui.label(op.name());
                            ui.label(RichText::new(value.to_string()).monospace());
                            ui.end_row();
                        }
                    }
                    ColumnStats::Error(msg) => {
                        ui.label(RichText::new(column.as_str()).color(color));
                        ui.label("error");
                        ui.label(RichText::new(msg.as_str()).color(Color32::RED));
                        ui.end_row();
                    }
                }
            }
        });
}

fn history(ui: &mut Ui, state: &mut AppState) {
    if state.history.is_empty() {
        return;
    }

    let mut rerun: Option<String> = None;
    egui::CollapsingHeader::new(format!("History ({})", state.history.len()))
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for entry in state.history.iter().rev() {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("Run again").clicked() {
                        rerun = Some(entry.command.clone());
                    }
                    let label = if entry.command.is_empty() {
                        "(every numeric column)"
                    } else {
                        entry.command.as_str()
                    };
                    let color = if entry.success {
                        Color32::LIGHT_GREEN
                    } else {
                        Color32::RED
                    };
                    ui.label(RichText::new(label).monospace().color(color));
                });
            }
        });

    if let Some(command) = rerun {
        state.command_input = command;
        state.run_command();
    }
}

fn preview_table(ui: &mut Ui, state: &AppState) {
    let Some(record) = state.session.current() else {
        return;
    };
    let info = &record.info;

    ui.strong(format!("Preview (first {} rows)", info.preview.len()));
    ui.push_id("preview_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .columns(TableColumn::auto().at_least(60.0), info.columns.len())
            .header(20.0, |mut header| {
                for name in &info.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name.as_str());
                    });
                }
            })
            .body(|mut body| {
                for row in &info.preview {
                    body.row(18.0, |mut table_row| {
                        for (_, value) in row {
                            table_row.col(|ui: &mut Ui| {
                                ui.label(value.as_str());
                            });
                        }
                    });
                }
            });
    });
}
