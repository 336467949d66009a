use calamine::{open_workbook_auto, CellErrorType, Data, Range, Reader, Sheets};
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::types::*;
use crate::compare::canonical_number;

/// File extensions calamine can open
const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xlam", "xls", "xla", "ods"];

/// Load one sheet of a workbook as a table.
///
/// The first row of the sheet's used range is the header row; every row after
/// it is a data row, in file order. When no sheet is named the first sheet is
/// used.
pub fn load_table(options: &ExcelReadOptions) -> Result<Table, ExcelError> {
    let mut workbook = open_workbook(&options.path)?;

    let sheet_names = workbook.sheet_names().to_vec();
    let target_sheet = match &options.sheet {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                return Err(ExcelError::sheet_not_found(name));
            }
            name.clone()
        }
        None => sheet_names.first().cloned().ok_or_else(|| {
            ExcelError::invalid_format(format!("Workbook has no sheets: {}", options.path))
        })?,
    };

    let range = workbook.worksheet_range(&target_sheet).map_err(|e| {
        ExcelError::read_error(format!("Failed to read sheet '{}': {}", target_sheet, e))
    })?;

    let table = range_to_table(&target_sheet, &range);
    debug!(
        "[load_table] {} / {}: {} columns, {} rows",
        options.path,
        target_sheet,
        table.columns.len(),
        table.rows.len()
    );

    Ok(table)
}

/// Get list of sheets in a workbook, with the size of each used range
pub fn get_sheets(path: &str) -> Result<Vec<SheetInfo>, ExcelError> {
    let mut workbook = open_workbook(path)?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for (index, name) in sheet_names.iter().enumerate() {
        let (row_count, col_count) = match workbook.worksheet_range(name) {
            Ok(range) => range.get_size(),
            Err(e) => {
                debug!("[get_sheets] could not size sheet '{}': {}", name, e);
                (0, 0)
            }
        };
        sheets.push(SheetInfo {
            name: name.clone(),
            index: index as u32,
            row_count: row_count as u32,
            col_count: col_count as u32,
        });
    }

    Ok(sheets)
}

fn open_workbook(path: &str) -> Result<Sheets<BufReader<File>>, ExcelError> {
    let file_path = Path::new(path);

    if !file_path.exists() {
        return Err(ExcelError::file_not_found(path));
    }

    let extension = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ExcelError::invalid_format(format!(
            "Unsupported file type '{}': expected one of {}",
            path,
            SUPPORTED_EXTENSIONS.join(", ")
        )));
    }

    open_workbook_auto(path)
        .map_err(|e| ExcelError::read_error(format!("Failed to open workbook: {}", e)))
}

/// Split a used range into a header row and data rows
fn range_to_table(sheet: &str, range: &Range<Data>) -> Table {
    let mut rows_iter = range.rows();

    let columns = match rows_iter.next() {
        Some(header) => header_names(header),
        None => Vec::new(),
    };

    let rows = rows_iter
        .map(|row| row.iter().map(|cell| convert_cell_value(Some(cell))).collect())
        .collect();

    Table::new(sheet, columns, rows)
}

/// Turn the header row into unique column names.
///
/// Blank headers become `Unnamed: <index>`; a repeated header gets a `.1`,
/// `.2`, ... suffix so every column stays addressable by name.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(header.len());
    let mut names = Vec::with_capacity(header.len());

    for (idx, cell) in header.iter().enumerate() {
        let base = match convert_cell_value(Some(cell)) {
            CellValue::Empty => format!("Unnamed: {}", idx),
            CellValue::String(s) if s.trim().is_empty() => format!("Unnamed: {}", idx),
            CellValue::String(s) => s,
            CellValue::Number(n) => canonical_number(n),
            CellValue::Boolean(b) => {
                if b {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
            CellValue::DateTime(dt) => dt,
            CellValue::Error(e) => e,
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while used.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }

        used.insert(name.clone());
        names.push(name);
    }

    names
}

/// Convert calamine Data to our CellValue
fn convert_cell_value(cell: Option<&Data>) -> CellValue {
    match cell {
        None => CellValue::Empty,
        Some(data) => match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::String(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Boolean(*b),
            Data::DateTime(dt) => CellValue::DateTime(format_excel_datetime(dt.as_f64())),
            Data::DateTimeIso(s) => CellValue::DateTime(s.clone()),
            Data::DurationIso(s) => CellValue::String(s.clone()),
            // #N/A reads as a missing value
            Data::Error(CellErrorType::NA) => CellValue::Empty,
            Data::Error(e) => CellValue::Error(e.to_string()),
        },
    }
}

/// Format Excel datetime (days since 1899-12-30) to ISO 8601.
///
/// Serials outside chrono's date range keep their numeric text.
fn format_excel_datetime(value: f64) -> String {
    if !value.is_finite() {
        return canonical_number(value);
    }

    let add_days = |date: chrono::NaiveDate, days: i64| {
        chrono::Duration::try_days(days).and_then(|d| date.checked_add_signed(d))
    };

    let Some(epoch) = chrono::NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return canonical_number(value);
    };
    let whole_days = value.floor();
    if whole_days.abs() > i64::MAX as f64 {
        return canonical_number(value);
    }
    let Some(date) = add_days(epoch, whole_days as i64) else {
        return canonical_number(value);
    };

    let total_seconds = ((value - whole_days) * 86400.0).round() as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    // 86400 rounds up to midnight of the next day
    let (date, time) = match chrono::NaiveTime::from_hms_opt(hours, minutes, seconds) {
        Some(time) => (Some(date), time),
        None => (add_days(date, 1), chrono::NaiveTime::MIN),
    };
    let Some(date) = date else {
        return canonical_number(value);
    };

    chrono::NaiveDateTime::new(date, time)
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

/// Compute SHA-256 checksum of a file
pub fn compute_checksum(path: &str) -> Result<String, ExcelError> {
    let mut file = File::open(path).map_err(|e| {
        ExcelError::read_error(format!("Failed to open file for checksum: {}", e))
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| {
            ExcelError::read_error(format!("Failed to read file for checksum: {}", e))
        })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names_dedupe_and_blank() {
        let header = vec![
            Data::String("Name".to_string()),
            Data::Empty,
            Data::String("Name".to_string()),
            Data::Float(2024.0),
            Data::String("Name".to_string()),
        ];

        assert_eq!(
            header_names(&header),
            vec!["Name", "Unnamed: 1", "Name.1", "2024", "Name.2"]
        );
    }

    #[test]
    fn test_header_suffix_skips_taken_names() {
        let header = vec![
            Data::String("Qty".to_string()),
            Data::String("Qty.1".to_string()),
            Data::String("Qty".to_string()),
        ];

        assert_eq!(header_names(&header), vec!["Qty", "Qty.1", "Qty.2"]);
    }

    #[test]
    fn test_format_excel_datetime() {
        assert_eq!(format_excel_datetime(45292.0), "2024-01-01T00:00:00");
        assert_eq!(format_excel_datetime(45292.5), "2024-01-01T12:00:00");
    }

    #[test]
    fn test_format_excel_datetime_out_of_range() {
        assert_eq!(format_excel_datetime(1e12), "1000000000000");
        assert_eq!(format_excel_datetime(5e9), "5000000000");
        assert_eq!(format_excel_datetime(-1e12), "-1000000000000");
        assert_eq!(format_excel_datetime(f64::INFINITY), "inf");
    }

    #[test]
    fn test_format_excel_datetime_before_epoch() {
        assert_eq!(format_excel_datetime(-0.5), "1899-12-29T12:00:00");
    }

    #[test]
    fn test_error_cells() {
        assert_eq!(
            convert_cell_value(Some(&Data::Error(CellErrorType::NA))),
            CellValue::Empty
        );
        assert_eq!(
            convert_cell_value(Some(&Data::Error(CellErrorType::Div0))),
            CellValue::Error("#DIV/0!".to_string())
        );
        assert_eq!(
            convert_cell_value(Some(&Data::Error(CellErrorType::Ref))),
            CellValue::Error("#REF!".to_string())
        );
    }

    #[test]
    fn test_convert_cell_value() {
        assert_eq!(convert_cell_value(None), CellValue::Empty);
        assert_eq!(convert_cell_value(Some(&Data::Int(5))), CellValue::Number(5.0));
        assert_eq!(convert_cell_value(Some(&Data::Bool(true))), CellValue::Boolean(true));
    }

    #[test]
    fn test_missing_file() {
        let err = load_table(&ExcelReadOptions::new("/nonexistent/book.xlsx", None)).unwrap_err();
        assert_eq!(err.error_type, ExcelErrorType::FileNotFound);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = get_sheets(path.to_str().unwrap()).unwrap_err();
        assert_eq!(err.error_type, ExcelErrorType::InvalidFormat);
    }

    #[test]
    fn test_corrupt_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        let err = load_table(&ExcelReadOptions::new(path.to_str().unwrap(), None)).unwrap_err();
        assert_eq!(err.error_type, ExcelErrorType::ReadError);
    }

    #[test]
    fn test_checksum_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"abc").unwrap();

        let checksum = compute_checksum(path.to_str().unwrap()).unwrap();
        assert_eq!(
            checksum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
