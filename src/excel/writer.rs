use log::debug;
use serde::{Deserialize, Serialize};
use umya_spreadsheet::{new_file_empty_worksheet, writer, Worksheet};

use super::reader::compute_checksum;
use super::types::ExcelError;
use crate::compare::{ComparisonResult, NO_ROW_LABEL};
use crate::session::Side;

/// Header row of the differences sheet
pub const DIFFERENCE_HEADERS: [&str; 5] = [
    "Excel Row",
    "Column",
    "Value in File 1",
    "Value in File 2",
    "Row Missing In",
];

/// Layout of the written report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOptions {
    pub differences_sheet: String,
    pub summary_sheet: String,
    /// Text written in place of a value when one file has no row there.
    /// A real cell can hold the same text; the `Row Missing In` column is
    /// what marks a missing row.
    pub no_row_label: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            differences_sheet: "Differences".to_string(),
            summary_sheet: "Summary".to_string(),
            no_row_label: NO_ROW_LABEL.to_string(),
        }
    }
}

/// Write a comparison result to a new workbook.
///
/// The differences sheet holds one row per difference, in result order; the
/// summary sheet holds the headline counts. Returns the new file's checksum.
pub fn write_report(
    result: &ComparisonResult,
    output_path: &str,
    options: &ReportOptions,
) -> Result<String, ExcelError> {
    if options.differences_sheet == options.summary_sheet {
        return Err(ExcelError::write_error(format!(
            "Differences and summary sheets must have different names: '{}'",
            options.summary_sheet
        )));
    }

    let mut book = new_file_empty_worksheet();

    let sheet = book
        .new_sheet(options.differences_sheet.as_str())
        .map_err(|e| sheet_error(&options.differences_sheet, e))?;
    write_differences(sheet, result, &options.no_row_label);

    let sheet = book
        .new_sheet(options.summary_sheet.as_str())
        .map_err(|e| sheet_error(&options.summary_sheet, e))?;
    write_summary(sheet, result);

    writer::xlsx::write(&book, output_path)
        .map_err(|e| ExcelError::write_error(format!("Failed to write file: {}", e)))?;

    debug!(
        "[write_report] {}: {} differences",
        output_path,
        result.differences.len()
    );

    compute_checksum(output_path)
}

fn sheet_error(name: &str, e: &str) -> ExcelError {
    ExcelError::write_error(format!("Failed to create sheet '{}': {}", name, e))
}

fn write_differences(sheet: &mut Worksheet, result: &ComparisonResult, no_row_label: &str) {
    for (col_idx, header) in DIFFERENCE_HEADERS.iter().enumerate() {
        sheet.get_cell_mut(((col_idx + 1) as u32, 1)).set_value_string(*header);
    }

    for (idx, diff) in result.differences.iter().enumerate() {
        let row_num = (idx + 2) as u32;

        sheet.get_cell_mut((1, row_num)).set_value_number(diff.row as f64);
        sheet.get_cell_mut((2, row_num)).set_value_string(diff.column.as_str());
        sheet
            .get_cell_mut((3, row_num))
            .set_value_string(diff.value_a.display_with(no_row_label));
        sheet
            .get_cell_mut((4, row_num))
            .set_value_string(diff.value_b.display_with(no_row_label));

        let missing_in = if diff.value_a.is_no_row() {
            Some(Side::A)
        } else if diff.value_b.is_no_row() {
            Some(Side::B)
        } else {
            None
        };
        if let Some(side) = missing_in {
            sheet.get_cell_mut((5, row_num)).set_value_string(side.to_string());
        }
    }
}

fn write_summary(sheet: &mut Worksheet, result: &ComparisonResult) {
    let summary = result.summary();

    sheet.get_cell_mut((1, 1)).set_value_string("Metric");
    sheet.get_cell_mut((2, 1)).set_value_string("Value");

    let mut row_num = 2u32;
    for (label, value) in summary.entries() {
        sheet.get_cell_mut((1, row_num)).set_value_string(label);
        sheet.get_cell_mut((2, row_num)).set_value_string(value);
        row_num += 1;
    }

    let column_lists = [
        ("Columns only in File 1 (names)", &result.columns_only_in_a),
        ("Columns only in File 2 (names)", &result.columns_only_in_b),
        ("Requested columns missing in File 1", &result.requested_columns_missing_in_a),
        ("Requested columns missing in File 2", &result.requested_columns_missing_in_b),
    ];
    for (label, names) in column_lists {
        if names.is_empty() {
            continue;
        }
        sheet.get_cell_mut((1, row_num)).set_value_string(label);
        sheet.get_cell_mut((2, row_num)).set_value_string(names.join(", "));
        row_num += 1;
    }

    sheet.get_cell_mut((1, row_num)).set_value_string("Generated");
    sheet.get_cell_mut((2, row_num)).set_value_string(chrono::Utc::now().to_rfc3339());
}
