use serde::{Deserialize, Serialize};
use std::fmt;

/// Label shown for the side of a difference that has no row at that position
pub const NO_ROW_LABEL: &str = "(no row)";

/// One side of a cell difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum DiffValue {
    /// Normalized cell text (may be empty for a blank cell)
    Value(String),
    /// The table has no row at this position
    NoRow,
}

impl DiffValue {
    pub fn is_no_row(&self) -> bool {
        matches!(self, DiffValue::NoRow)
    }

    /// Display text, with `no_row_label` standing in for a missing row
    pub fn display_with<'a>(&'a self, no_row_label: &'a str) -> &'a str {
        match self {
            DiffValue::Value(v) => v,
            DiffValue::NoRow => no_row_label,
        }
    }
}

impl fmt::Display for DiffValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_with(NO_ROW_LABEL))
    }
}

/// A single mismatched cell between the two tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDifference {
    /// 1-based data row position
    pub row: usize,
    pub column: String,
    pub value_a: DiffValue,
    pub value_b: DiffValue,
}

/// Knobs for a comparison run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareOptions {
    /// Compare only these columns. `None` compares every common column.
    pub columns: Option<Vec<String>>,
    pub label_a: String,
    pub label_b: String,
}

/// Outcome of comparing two tables position by position
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub label_a: String,
    pub label_b: String,
    pub row_count_a: usize,
    pub row_count_b: usize,
    pub common_columns: Vec<String>,
    pub columns_only_in_a: Vec<String>,
    pub columns_only_in_b: Vec<String>,
    /// Columns actually walked; equals `common_columns` unless a column filter was given
    pub columns_compared: Vec<String>,
    pub requested_columns_missing_in_a: Vec<String>,
    pub requested_columns_missing_in_b: Vec<String>,
    pub cells_compared: usize,
    pub differences: Vec<CellDifference>,
    pub match_percent: f64,
}

impl ComparisonResult {
    pub fn total_differences(&self) -> usize {
        self.differences.len()
    }

    pub fn is_identical(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn summary(&self) -> ComparisonSummary {
        ComparisonSummary {
            label_a: self.label_a.clone(),
            label_b: self.label_b.clone(),
            rows_a: self.row_count_a,
            rows_b: self.row_count_b,
            common_columns: self.common_columns.len(),
            columns_only_in_a: self.columns_only_in_a.len(),
            columns_only_in_b: self.columns_only_in_b.len(),
            columns_compared: self.columns_compared.len(),
            cells_compared: self.cells_compared,
            total_differences: self.total_differences(),
            match_percent: (self.match_percent * 100.0).round() / 100.0,
        }
    }
}

/// Headline counts of a comparison, rounded for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub label_a: String,
    pub label_b: String,
    pub rows_a: usize,
    pub rows_b: usize,
    pub common_columns: usize,
    pub columns_only_in_a: usize,
    pub columns_only_in_b: usize,
    pub columns_compared: usize,
    pub cells_compared: usize,
    pub total_differences: usize,
    /// Match percentage rounded to two decimals
    pub match_percent: f64,
}

impl ComparisonSummary {
    /// Label/value pairs in report order
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Sheet in File 1", self.label_a.clone()),
            ("Sheet in File 2", self.label_b.clone()),
            ("Rows in File 1", self.rows_a.to_string()),
            ("Rows in File 2", self.rows_b.to_string()),
            ("Common columns", self.common_columns.to_string()),
            ("Columns only in File 1", self.columns_only_in_a.to_string()),
            ("Columns only in File 2", self.columns_only_in_b.to_string()),
            ("Columns compared", self.columns_compared.to_string()),
            ("Cells compared", self.cells_compared.to_string()),
            ("Total differences", self.total_differences.to_string()),
            ("Match %", format!("{:.2}%", self.match_percent)),
        ]
    }
}

impl fmt::Display for ComparisonSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries();
        let width = entries.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        for (label, value) in entries {
            writeln!(f, "{:<width$}  {}", label, value, width = width)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_row_is_distinct_from_empty() {
        let empty = DiffValue::Value(String::new());
        assert_ne!(empty, DiffValue::NoRow);
        assert_eq!(empty.to_string(), "");
        assert_eq!(DiffValue::NoRow.to_string(), "(no row)");
        assert_eq!(DiffValue::NoRow.display_with("<missing>"), "<missing>");
    }

    #[test]
    fn test_summary_rounds_match_percent() {
        let result = ComparisonResult {
            label_a: "Q1".to_string(),
            label_b: "Q2".to_string(),
            cells_compared: 3,
            differences: vec![CellDifference {
                row: 1,
                column: "Qty".to_string(),
                value_a: DiffValue::Value("5".to_string()),
                value_b: DiffValue::Value("6".to_string()),
            }],
            match_percent: 200.0 / 3.0,
            ..Default::default()
        };

        let summary = result.summary();
        assert_eq!(summary.match_percent, 66.67);
        assert_eq!(summary.total_differences, 1);

        let text = summary.to_string();
        assert!(text.contains("Match %"));
        assert!(text.contains("66.67%"));
        assert!(text.contains("Sheet in File 1"));
    }
}
