use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Histogram of the selected numeric column
// ---------------------------------------------------------------------------

pub fn histogram_plot(ui: &mut Ui, state: &AppState) {
    let Some(column) = state.histogram_column.as_deref() else {
        ui.label("No numeric column to plot.");
        return;
    };
    let Some(histogram) = &state.histogram else {
        ui.label(format!("'{column}' has no values to plot."));
        return;
    };

    let color = state
        .column_colors
        .as_ref()
        .map_or(Color32::LIGHT_BLUE, |c| c.color_for(column));

    let bars: Vec<Bar> = histogram
        .bars()
        .into_iter()
        .map(|(centre, width, count)| Bar::new(centre, count as f64).width(width * 0.95))
        .collect();
    let chart = BarChart::new(bars).color(color).name(column);

    ui.strong(format!("Histogram of {column}"));
    Plot::new("histogram_plot")
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label(column.to_string())
        .y_axis_label("Count")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}
