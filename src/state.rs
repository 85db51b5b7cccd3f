use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use tabstat::config::AppConfig;
use tabstat::data::histogram::{Histogram, DEFAULT_BINS};
use tabstat::data::report::write_report;
use tabstat::data::summary::describe;
use tabstat::data::{analyze_file, load_file, Dataset, Outcome};
use tabstat::session::Session;
use tabstat::upload::store_upload;

use crate::color::ColumnColors;

/// Commands kept in the history list.
const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub command: String,
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Only metadata of the upload lives here; every command, export and
/// histogram reloads the stored file.
pub struct AppState {
    pub config: AppConfig,

    /// Last uploaded file.
    pub session: Session,

    /// Text in the command line.
    pub command_input: String,

    /// Result of the most recent command.
    pub last_outcome: Option<Outcome>,

    /// Earlier commands, oldest first.
    pub history: Vec<HistoryEntry>,

    /// Numeric column shown in the histogram.
    pub histogram_column: Option<String>,
    pub histogram: Option<Histogram>,

    pub column_colors: Option<ColumnColors>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            session: Session::new(),
            command_input: String::new(),
            last_outcome: None,
            history: Vec::new(),
            histogram_column: None,
            histogram: None,
            column_colors: None,
            status_message: None,
        }
    }

    /// Store `source` as an upload, load it and record it in the session.
    pub fn open_upload(&mut self, source: &Path) {
        match self.try_open_upload(source) {
            Ok(()) => self.status_message = None,
            Err(e) => {
                log::error!("Failed to open {}: {e:#}", source.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    fn try_open_upload(&mut self, source: &Path) -> Result<()> {
        let filename = source
            .file_name()
            .and_then(|n| n.to_str())
            .context("file name is not valid UTF-8")?;
        let bytes = std::fs::read(source)
            .with_context(|| format!("reading {}", source.display()))?;
        let stored = store_upload(&self.config, filename, &bytes)?;
        let dataset = load_file(&stored)?;

        let record = self
            .session
            .record_upload(&stored, filename, &dataset, self.config.preview_rows);
        self.column_colors = Some(ColumnColors::new(&record.info.columns));
        self.histogram_column = record.info.numeric_columns().first().map(|c| c.to_string());

        self.histogram = self
            .histogram_column
            .as_deref()
            .and_then(|col| histogram_for(&dataset, col));
        self.last_outcome = None;
        self.history.clear();
        Ok(())
    }

    /// Evaluate the command line against a fresh load of the stored file.
    pub fn run_command(&mut self) {
        let Some(path) = self.session.stored_path() else {
            self.status_message = Some("Open a file first (File → Open…)".to_string());
            return;
        };
        let outcome = analyze_file(path, &self.command_input);

        let command = tabstat::data::command::normalize(&self.command_input);
        self.history.push(HistoryEntry {
            command,
            success: outcome.is_success(),
        });
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.last_outcome = Some(outcome);
    }

    /// Switch the histogram to `column`, reloading the stored file.
    pub fn set_histogram_column(&mut self, column: String) {
        let Some(path) = self.session.stored_path() else {
            return;
        };
        match load_file(path) {
            Ok(dataset) => {
                self.histogram = histogram_for(&dataset, &column);
                self.histogram_column = Some(column);
            }
            Err(e) => {
                log::error!("Failed to reload {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Write the `describe` table of the stored file to `target` as CSV.
    pub fn export_analysis(&mut self, target: &Path) {
        let result = self.loaded_dataset().and_then(|(_, ds)| describe(&ds).save(target));
        self.report_export("analysis", target, result);
    }

    /// Write the Markdown report of the stored file to `target`.
    pub fn export_report(&mut self, target: &Path) {
        let result = self.loaded_dataset().and_then(|(filename, ds)| {
            write_report(target, &describe(&ds), &filename, Local::now().naive_local())
        });
        self.report_export("report", target, result);
    }

    fn loaded_dataset(&self) -> Result<(String, Dataset)> {
        let record = self.session.current().context("no file loaded")?;
        let dataset = load_file(&record.stored_path)?;
        Ok((record.info.filename.clone(), dataset))
    }

    fn report_export(&mut self, what: &str, target: &Path, result: Result<()>) {
        match result {
            Ok(()) => {
                self.status_message = Some(format!("Saved {what} to {}", target.display()));
            }
            Err(e) => {
                log::error!("Failed to export {what}: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn histogram_for(dataset: &Dataset, column: &str) -> Option<Histogram> {
    let col = dataset.column(column)?;
    Histogram::compute(&col.numeric_values(), DEFAULT_BINS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_upload(dir: &Path) -> AppState {
        let source = dir.join("people.csv");
        std::fs::write(&source, "Name,Age\nAnn,30\nBo,40\nCy,\n").unwrap();
        let config = AppConfig {
            upload_dir: dir.join("uploads"),
            ..AppConfig::default()
        };
        let mut state = AppState::new(config);
        state.open_upload(&source);
        state
    }

    #[test]
    fn upload_then_command() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with_upload(dir.path());
        assert_eq!(state.status_message, None);
        assert!(dir.path().join("uploads/people.csv").is_file());
        assert_eq!(state.histogram_column.as_deref(), Some("Age"));

        state.command_input = "Mean of AGE".to_string();
        state.run_command();
        let json = serde_json::to_value(state.last_outcome.as_ref().unwrap()).unwrap();
        assert_eq!(json["result"]["Age"]["mean"], serde_json::json!(35.0));
        assert_eq!(state.history.last().unwrap().command, "mean of age");
    }

    #[test]
    fn exports_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with_upload(dir.path());

        let csv_path = dir.path().join("analysis_people.csv");
        state.export_analysis(&csv_path);
        assert!(std::fs::read_to_string(&csv_path).unwrap().contains("Age,float64,2"));

        let report_path = dir.path().join("report_people.md");
        state.export_report(&report_path);
        assert!(std::fs::read_to_string(&report_path).unwrap().contains("File: people.csv"));
    }

    #[test]
    fn command_without_file_sets_status() {
        let mut state = AppState::new(AppConfig::default());
        state.run_command();
        assert!(state.last_outcome.is_none());
        assert!(state.status_message.is_some());
    }
}
