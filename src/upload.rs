use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid file name: {0:?}")]
    InvalidFilename(String),

    #[error("File type .{0} is not allowed")]
    UnsupportedExtension(String),

    #[error("File is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("Could not store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Reduce an uploaded file name to a safe, flat name: directories are
/// dropped, whitespace becomes `_`, and only ASCII alphanumerics and `._-`
/// survive.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Store uploaded bytes in the configured upload directory and return the
/// stored path.
pub fn store_upload(config: &AppConfig, filename: &str, bytes: &[u8]) -> Result<PathBuf, UploadError> {
    let safe = sanitize_filename(filename);
    let ext = Path::new(&safe)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let Some(ext) = ext.filter(|_| !safe.is_empty()) else {
        return Err(UploadError::InvalidFilename(filename.to_string()));
    };
    if !config.allows_extension(&ext) {
        return Err(UploadError::UnsupportedExtension(ext));
    }

    let size = bytes.len() as u64;
    if size > config.max_upload_bytes {
        return Err(UploadError::TooLarge {
            size,
            limit: config.max_upload_bytes,
        });
    }

    std::fs::create_dir_all(&config.upload_dir)?;
    let path = config.upload_dir.join(&safe);
    std::fs::write(&path, bytes)?;
    log::info!("Stored upload {filename:?} as {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_flattened() {
        assert_eq!(sanitize_filename("../../etc/passwd.csv"), "passwd.csv");
        assert_eq!(sanitize_filename("C:\\data\\My Sales 2024.xlsx"), "My_Sales_2024.xlsx");
        assert_eq!(sanitize_filename("..hidden.csv"), "hidden.csv");
        assert_eq!(sanitize_filename("résumé.csv"), "rsum.csv");
        assert_eq!(sanitize_filename("../"), "");
    }
}
