use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::info::DEFAULT_PREVIEW_ROWS;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TABSTAT_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "tabstat.toml";

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// Runtime settings. Every key is optional in the TOML file:
///
/// ```toml
/// upload_dir = "uploads"
/// max_upload_bytes = 16777216
/// allowed_extensions = ["csv", "xlsx", "xls"]
/// preview_rows = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where uploaded files are stored.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
    /// Lower-case extensions without the dot.
    pub allowed_extensions: Vec<String>,
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 16 * 1024 * 1024,
            allowed_extensions: ["csv", "xlsx", "xls", "json", "parquet"]
                .into_iter()
                .map(String::from)
                .collect(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl AppConfig {
    /// Resolve the config: `$TABSTAT_CONFIG`, then `./tabstat.toml`, then
    /// built-in defaults.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(text)?;
        for ext in &mut config.allowed_extensions {
            *ext = ext.trim_start_matches('.').to_ascii_lowercase();
        }
        Ok(config)
    }

    pub fn allows_extension(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|e| *e == ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = AppConfig::from_toml("preview_rows = 3\nallowed_extensions = [\".CSV\"]").unwrap();
        assert_eq!(config.preview_rows, 3);
        assert_eq!(config.allowed_extensions, vec!["csv".to_string()]);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(AppConfig::from_toml("preview_rows = \"five\"").is_err());
    }

    #[test]
    fn extension_check_ignores_case() {
        let config = AppConfig::default();
        assert!(config.allows_extension("XLSX"));
        assert!(!config.allows_extension("exe"));
    }
}
