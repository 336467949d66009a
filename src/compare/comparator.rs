use log::debug;
use std::collections::HashSet;

use super::normalize::normalize;
use super::types::*;
use crate::excel::{CellValue, Table};

/// Split the columns of two tables into (common, only in A, only in B).
///
/// Names match by exact string equality. `common` and `only_a` keep A's
/// order; `only_b` keeps B's order.
pub fn compare_columns(a: &Table, b: &Table) -> (Vec<String>, Vec<String>, Vec<String>) {
    let in_a: HashSet<&str> = a.columns.iter().map(String::as_str).collect();
    let in_b: HashSet<&str> = b.columns.iter().map(String::as_str).collect();

    let (common, only_a): (Vec<String>, Vec<String>) = a
        .columns
        .iter()
        .cloned()
        .partition(|c| in_b.contains(c.as_str()));

    let only_b = b
        .columns
        .iter()
        .filter(|c| !in_a.contains(c.as_str()))
        .cloned()
        .collect();

    (common, only_a, only_b)
}

/// Compare two tables position by position over every common column
pub fn compare(a: &Table, b: &Table) -> ComparisonResult {
    let options = CompareOptions {
        label_a: a.name.clone(),
        label_b: b.name.clone(),
        ..Default::default()
    };
    compare_with(a, b, &options)
}

/// Compare two tables position by position.
///
/// Row `i` of A is compared with row `i` of B. Where only one table has a
/// row, every compared column yields a difference with `NoRow` on the other
/// side. Every visited cell counts toward `cells_compared`.
pub fn compare_with(a: &Table, b: &Table, options: &CompareOptions) -> ComparisonResult {
    let (common, only_a, only_b) = compare_columns(a, b);

    let (columns_compared, missing_in_a, missing_in_b) = match &options.columns {
        None => (common.clone(), Vec::new(), Vec::new()),
        Some(requested) => {
            let wanted: HashSet<&str> = requested.iter().map(String::as_str).collect();
            let compared = common
                .iter()
                .filter(|c| wanted.contains(c.as_str()))
                .cloned()
                .collect();
            let missing_in_a = requested
                .iter()
                .filter(|c| a.column_index(c).is_none())
                .cloned()
                .collect();
            let missing_in_b = requested
                .iter()
                .filter(|c| b.column_index(c).is_none())
                .cloned()
                .collect();
            (compared, missing_in_a, missing_in_b)
        }
    };

    let index_a = a.column_index_map();
    let index_b = b.column_index_map();
    let positions: Vec<(&str, usize, usize)> = columns_compared
        .iter()
        .filter_map(|c| {
            let ia = *index_a.get(c.as_str())?;
            let ib = *index_b.get(c.as_str())?;
            Some((c.as_str(), ia, ib))
        })
        .collect();

    let max_rows = a.row_count().max(b.row_count());
    let mut cells_compared = 0usize;
    let mut differences = Vec::new();

    for i in 0..max_rows {
        let row_a = a.rows.get(i);
        let row_b = b.rows.get(i);

        for &(column, ia, ib) in &positions {
            cells_compared += 1;

            let value_a = row_a.map(|row| normalize(row.get(ia).unwrap_or(&CellValue::Empty)));
            let value_b = row_b.map(|row| normalize(row.get(ib).unwrap_or(&CellValue::Empty)));

            let difference = match (value_a, value_b) {
                (Some(va), Some(vb)) if va == vb => None,
                (Some(va), Some(vb)) => Some((DiffValue::Value(va), DiffValue::Value(vb))),
                (Some(va), None) => Some((DiffValue::Value(va), DiffValue::NoRow)),
                (None, Some(vb)) => Some((DiffValue::NoRow, DiffValue::Value(vb))),
                (None, None) => None,
            };

            if let Some((value_a, value_b)) = difference {
                differences.push(CellDifference {
                    row: i + 1,
                    column: column.to_string(),
                    value_a,
                    value_b,
                });
            }
        }
    }

    let match_percent = if cells_compared == 0 {
        100.0
    } else {
        (cells_compared - differences.len()) as f64 / cells_compared as f64 * 100.0
    };

    debug!(
        "[compare] {} vs {}: {} rows x {} columns, {} differences",
        options.label_a,
        options.label_b,
        max_rows,
        positions.len(),
        differences.len()
    );

    ComparisonResult {
        label_a: options.label_a.clone(),
        label_b: options.label_b.clone(),
        row_count_a: a.row_count(),
        row_count_b: b.row_count(),
        common_columns: common,
        columns_only_in_a: only_a,
        columns_only_in_b: only_b,
        columns_compared,
        requested_columns_missing_in_a: missing_in_a,
        requested_columns_missing_in_b: missing_in_b,
        cells_compared,
        differences,
        match_percent,
    }
}
