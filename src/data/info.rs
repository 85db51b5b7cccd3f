use serde::Serialize;

use super::model::{ColumnType, Dataset};

/// Rows shown in the upload preview unless configured otherwise.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// What the presentation layer shows about an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub filename: String,
    pub columns: Vec<String>,
    /// First rows as `(field, value)` pairs, in column order.
    pub preview: Vec<Vec<(String, String)>>,
    /// `"<rows> rows × <cols> columns"`
    pub shape: String,
    /// `(column, dtype name)` pairs, in column order.
    pub column_types: Vec<(String, String)>,
}

impl FileInfo {
    /// Names of the `int64` / `float64` columns.
    pub fn numeric_columns(&self) -> Vec<&str> {
        let numeric = [ColumnType::Int64.name(), ColumnType::Float64.name()];
        self.column_types
            .iter()
            .filter(|(_, dtype)| numeric.contains(&dtype.as_str()))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

pub fn build_file_info(dataset: &Dataset, filename: &str, preview_rows: usize) -> FileInfo {
    let preview = (0..dataset.len().min(preview_rows))
        .filter_map(|i| dataset.row(i))
        .map(|row| {
            row.into_iter()
                .map(|(field, value)| (field.to_string(), value.to_string()))
                .collect()
        })
        .collect();

    FileInfo {
        filename: filename.to_string(),
        columns: dataset.column_names(),
        preview,
        shape: format!("{} rows × {} columns", dataset.len(), dataset.width()),
        column_types: dataset
            .columns()
            .iter()
            .map(|c| (c.name.clone(), c.dtype.name().to_string()))
            .collect(),
    }
}
