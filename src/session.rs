use std::path::{Path, PathBuf};

use crate::data::info::{build_file_info, FileInfo};
use crate::data::model::Dataset;

/// Metadata of the last file a caller uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub info: FileInfo,
    pub stored_path: PathBuf,
}

/// Per-caller session. Written once per upload, read by every later
/// request; the dataset itself is never kept here.
#[derive(Debug, Clone, Default)]
pub struct Session {
    record: Option<SessionRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record with metadata for a freshly uploaded file.
    pub fn record_upload(
        &mut self,
        stored_path: &Path,
        filename: &str,
        dataset: &Dataset,
        preview_rows: usize,
    ) -> &SessionRecord {
        let info = build_file_info(dataset, filename, preview_rows);
        log::debug!("Session now tracks {filename} ({})", info.shape);
        self.record.insert(SessionRecord {
            info,
            stored_path: stored_path.to_path_buf(),
        })
    }

    pub fn current(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }

    pub fn stored_path(&self) -> Option<&Path> {
        self.record.as_ref().map(|r| r.stored_path.as_path())
    }

    pub fn clear(&mut self) {
        self.record = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column, ColumnType};

    #[test]
    fn upload_replaces_previous_record() {
        let ds = Dataset::new(vec![Column::new("a", ColumnType::Int64, vec![CellValue::Integer(1)])]).unwrap();
        let mut session = Session::new();
        assert!(session.current().is_none());

        session.record_upload(Path::new("uploads/one.csv"), "one.csv", &ds, 5);
        session.record_upload(Path::new("uploads/two.csv"), "two.csv", &ds, 5);

        let record = session.current().unwrap();
        assert_eq!(record.info.filename, "two.csv");
        assert_eq!(record.info.shape, "1 rows × 1 columns");
        assert_eq!(session.stored_path(), Some(Path::new("uploads/two.csv")));

        session.clear();
        assert!(session.stored_path().is_none());
    }
}
