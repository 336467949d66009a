use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Information about a sheet in an Excel file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetInfo {
    pub name: String,
    pub index: u32,
    pub row_count: u32,
    pub col_count: u32,
}

/// Represents a cell value with type information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Empty,
    String(String),
    Number(f64),
    Boolean(bool),
    DateTime(String), // ISO 8601 format
    Error(String),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

/// One sheet parsed into named columns and positional rows.
///
/// Rows are aligned with `columns`: `rows[i][j]` is the value of column `j`
/// in data row `i`. A row shorter than the column list reads as `Empty` for
/// the missing trailing cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Table {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first column with exactly this name
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Map of column name to index. The first occurrence wins for repeated names.
    pub fn column_index_map(&self) -> HashMap<&str, usize> {
        let mut map = HashMap::with_capacity(self.columns.len());
        for (idx, name) in self.columns.iter().enumerate() {
            map.entry(name.as_str()).or_insert(idx);
        }
        map
    }

    /// Cell by row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        let row = self.rows.get(row)?;
        Some(row.get(col).unwrap_or(&EMPTY))
    }
}

static EMPTY: CellValue = CellValue::Empty;

/// Excel-specific errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcelError {
    pub message: String,
    pub error_type: ExcelErrorType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExcelErrorType {
    FileNotFound,
    InvalidFormat,
    SheetNotFound,
    ReadError,
    WriteError,
}

impl std::fmt::Display for ExcelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExcelError {}

impl ExcelError {
    pub fn new(message: impl Into<String>, error_type: ExcelErrorType) -> Self {
        ExcelError {
            message: message.into(),
            error_type,
        }
    }

    pub fn file_not_found(path: &str) -> Self {
        ExcelError::new(format!("File not found: {}", path), ExcelErrorType::FileNotFound)
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        ExcelError::new(message, ExcelErrorType::InvalidFormat)
    }

    pub fn sheet_not_found(sheet: &str) -> Self {
        ExcelError::new(format!("Sheet not found: {}", sheet), ExcelErrorType::SheetNotFound)
    }

    pub fn read_error(message: impl Into<String>) -> Self {
        ExcelError::new(message, ExcelErrorType::ReadError)
    }

    pub fn write_error(message: impl Into<String>) -> Self {
        ExcelError::new(message, ExcelErrorType::WriteError)
    }
}

/// Options for loading one sheet as a table
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExcelReadOptions {
    pub path: String,
    pub sheet: Option<String>,
}

impl ExcelReadOptions {
    pub fn new(path: impl Into<String>, sheet: Option<String>) -> Self {
        ExcelReadOptions {
            path: path.into(),
            sheet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_row_reads_as_empty() {
        let table = Table::new(
            "Sheet1",
            vec!["Name".to_string(), "Qty".to_string()],
            vec![vec![CellValue::from("Tea")]],
        );

        assert_eq!(table.cell(0, "Name"), Some(&CellValue::from("Tea")));
        assert_eq!(table.cell(0, "Qty"), Some(&CellValue::Empty));
        assert_eq!(table.cell(0, "Price"), None);
        assert_eq!(table.cell(1, "Name"), None);
    }

    #[test]
    fn test_cell_value_serde_tagging() {
        let json = serde_json::to_string(&CellValue::Number(5.0)).unwrap();
        assert_eq!(json, r#"{"type":"Number","value":5.0}"#);

        let back: CellValue = serde_json::from_str(r#"{"type":"Empty"}"#).unwrap();
        assert_eq!(back, CellValue::Empty);
    }
}
