use log::{debug, info};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::compare::{self, CompareOptions, ComparisonResult};
use crate::config::AppConfig;
use crate::excel::{self, ExcelError, ExcelReadOptions, Table};

/// Which of the two compared files a slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "File 1"),
            Side::B => write!(f, "File 2"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0} is not loaded")]
    NotLoaded(Side),
    #[error("No comparison has been run yet")]
    NoResult,
    #[error("Could not read {side}: {source}")]
    Load {
        side: Side,
        #[source]
        source: ExcelError,
    },
    #[error("Could not write report: {0}")]
    Report(#[source] ExcelError),
}

/// A table plus where it came from
#[derive(Debug, Clone, Serialize)]
pub struct LoadedTable {
    pub path: String,
    pub checksum: String,
    pub table: Table,
}

impl LoadedTable {
    pub fn source(&self) -> SourceInfo {
        SourceInfo {
            path: self.path.clone(),
            sheet: self.table.name.clone(),
            checksum: self.checksum.clone(),
        }
    }
}

/// Which file and sheet a slot was loaded from, and the file's SHA-256
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceInfo {
    pub path: String,
    pub sheet: String,
    pub checksum: String,
}

/// The two currently loaded tables and the most recent result.
///
/// Loading either side discards the previous result; running replaces it.
#[derive(Debug, Default)]
pub struct CompareSession {
    config: AppConfig,
    file_a: Option<LoadedTable>,
    file_b: Option<LoadedTable>,
    last_result: Option<ComparisonResult>,
}

impl CompareSession {
    pub fn new(config: AppConfig) -> Self {
        CompareSession {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Load a sheet from a workbook into one slot
    pub fn load(
        &mut self,
        side: Side,
        options: &ExcelReadOptions,
    ) -> Result<&LoadedTable, SessionError> {
        let load = || -> Result<LoadedTable, ExcelError> {
            let table = excel::load_table(options)?;
            let checksum = excel::compute_checksum(&options.path)?;
            Ok(LoadedTable {
                path: options.path.clone(),
                checksum,
                table,
            })
        };
        let loaded = load().map_err(|source| SessionError::Load { side, source })?;

        info!(
            "[load] {}: {} / {} ({} rows, {} columns)",
            side,
            loaded.path,
            loaded.table.name,
            loaded.table.row_count(),
            loaded.table.columns.len()
        );

        Ok(self.put(side, loaded))
    }

    /// Put an already built table into one slot
    pub fn set_table(&mut self, side: Side, table: Table) -> &LoadedTable {
        self.put(
            side,
            LoadedTable {
                path: String::new(),
                checksum: String::new(),
                table,
            },
        )
    }

    fn put(&mut self, side: Side, loaded: LoadedTable) -> &LoadedTable {
        self.last_result = None;
        let slot = match side {
            Side::A => &mut self.file_a,
            Side::B => &mut self.file_b,
        };
        slot.insert(loaded)
    }

    pub fn loaded(&self, side: Side) -> Option<&LoadedTable> {
        match side {
            Side::A => self.file_a.as_ref(),
            Side::B => self.file_b.as_ref(),
        }
    }

    /// Compare the two loaded tables once, replacing any previous result
    pub fn run_comparison(&mut self) -> Result<&ComparisonResult, SessionError> {
        let a = self.file_a.as_ref().ok_or(SessionError::NotLoaded(Side::A))?;
        let b = self.file_b.as_ref().ok_or(SessionError::NotLoaded(Side::B))?;

        let options = CompareOptions {
            columns: self.config.column_filter(),
            label_a: a.table.name.clone(),
            label_b: b.table.name.clone(),
        };
        let result = compare::compare_with(&a.table, &b.table, &options);

        info!(
            "[run_comparison] {} cells compared, {} differences, {:.2}% match",
            result.cells_compared,
            result.total_differences(),
            result.match_percent
        );

        Ok(&*self.last_result.insert(result))
    }

    pub fn last_result(&self) -> Option<&ComparisonResult> {
        self.last_result.as_ref()
    }

    /// Write the most recent result as a spreadsheet; returns the report checksum
    pub fn export_report(&self, output_path: &str) -> Result<String, SessionError> {
        let result = self.last_result.as_ref().ok_or(SessionError::NoResult)?;
        debug!("[export_report] {}", output_path);
        excel::write_report(result, output_path, &self.config.report_options())
            .map_err(SessionError::Report)
    }
}
