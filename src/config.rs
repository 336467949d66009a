use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::compare::NO_ROW_LABEL;
use crate::excel::ReportOptions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// User settings for comparisons and reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Restrict comparison to these columns. Empty or absent compares all common columns.
    pub columns: Option<Vec<String>>,
    pub no_row_label: String,
    pub differences_sheet: String,
    pub summary_sheet: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            columns: None,
            no_row_label: NO_ROW_LABEL.to_string(),
            differences_sheet: "Differences".to_string(),
            summary_sheet: "Summary".to_string(),
        }
    }
}

impl AppConfig {
    /// Default config location: `<config dir>/sheet-compare/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sheet-compare").join("config.json"))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicit config file, else the default one if it exists, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => {
                log::debug!("[config] loading {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Column filter, treating an empty list as no filter
    pub fn column_filter(&self) -> Option<Vec<String>> {
        self.columns.clone().filter(|cols| !cols.is_empty())
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            differences_sheet: self.differences_sheet.clone(),
            summary_sheet: self.summary_sheet.clone(),
            no_row_label: self.no_row_label.clone(),
        }
    }
}
