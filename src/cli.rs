use clap::Parser;
use log::debug;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::compare::ComparisonResult;
use crate::config::{AppConfig, ConfigError};
use crate::excel::{self, ExcelError, ExcelReadOptions};
use crate::session::{CompareSession, SessionError, Side, SourceInfo};

#[derive(Parser, Debug, Clone)]
#[command(name = "sheet-compare")]
#[command(about = "Compare two spreadsheet sheets cell by cell, row N against row N")]
#[command(version)]
pub struct CliArgs {
    /// First workbook (File 1)
    #[arg(value_name = "FILE1")]
    pub file1: PathBuf,

    /// Second workbook (File 2)
    #[arg(value_name = "FILE2")]
    pub file2: PathBuf,

    /// Sheet to read from File 1 (default: first sheet)
    #[arg(long, value_name = "SHEET")]
    pub sheet1: Option<String>,

    /// Sheet to read from File 2 (default: first sheet)
    #[arg(long, value_name = "SHEET")]
    pub sheet2: Option<String>,

    /// Only compare these columns (overrides the config file)
    #[arg(long, value_name = "COLUMN", num_args = 1..)]
    pub columns: Vec<String>,

    /// Write the difference report to this .xlsx file
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Config file (default: <config dir>/sheet-compare/config.json if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List the sheets of both files and exit
    #[arg(long)]
    pub list_sheets: bool,

    /// Print the full result as JSON instead of the text summary
    #[arg(long)]
    pub json: bool,

    /// Maximum number of differences to print in the text summary
    #[arg(long, default_value = "20")]
    pub show: usize,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Could not list sheets of {path}: {source}")]
    Sheets {
        path: String,
        #[source]
        source: ExcelError,
    },
    #[error("Failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse arguments, run one comparison and print it
pub fn run() -> Result<(), CliError> {
    env_logger::init();
    let args = CliArgs::parse();
    execute(&args)
}

pub fn execute(args: &CliArgs) -> Result<(), CliError> {
    let file1 = args.file1.to_string_lossy().into_owned();
    let file2 = args.file2.to_string_lossy().into_owned();

    if args.list_sheets {
        for path in [&file1, &file2] {
            let sheets = excel::get_sheets(path).map_err(|source| CliError::Sheets {
                path: path.clone(),
                source,
            })?;
            println!("{}", path);
            for sheet in sheets {
                println!(
                    "  {} ({} rows x {} columns)",
                    sheet.name, sheet.row_count, sheet.col_count
                );
            }
        }
        return Ok(());
    }

    let mut config = AppConfig::load(args.config.as_deref())?;
    if !args.columns.is_empty() {
        config.columns = Some(args.columns.clone());
    }
    debug!("[execute] config: {:?}", config);

    let mut session = CompareSession::new(config);
    session.load(Side::A, &ExcelReadOptions::new(file1, args.sheet1.clone()))?;
    session.load(Side::B, &ExcelReadOptions::new(file2, args.sheet2.clone()))?;
    session.run_comparison()?;
    let result = session.last_result().ok_or(SessionError::NoResult)?;

    let mut sources = Vec::with_capacity(2);
    for side in [Side::A, Side::B] {
        let loaded = session.loaded(side).ok_or(SessionError::NotLoaded(side))?;
        sources.push((side, loaded.source()));
    }

    if args.json {
        println!("{}", render_json(&sources, result)?);
    } else {
        print!("{}", render_sources(&sources));
        print!("{}", render_text(result, args.show, &session.config().no_row_label));
    }

    if let Some(output) = &args.output {
        let output = output.to_string_lossy();
        let checksum = session.export_report(&output)?;
        eprintln!("Report written to {} (sha256 {})", output, checksum);
    }

    Ok(())
}

/// One line per compared file: label, path, sheet and SHA-256
pub fn render_sources(sources: &[(Side, SourceInfo)]) -> String {
    let mut out = String::new();
    for (side, source) in sources {
        out.push_str(&format!(
            "{}: {} [{}] sha256 {}\n",
            side, source.path, source.sheet, source.checksum
        ));
    }
    out.push('\n');
    out
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    sources: Vec<JsonSource<'a>>,
    result: &'a ComparisonResult,
}

#[derive(Serialize)]
struct JsonSource<'a> {
    file: String,
    #[serde(flatten)]
    source: &'a SourceInfo,
}

/// JSON rendering: the compared files with their checksums, then the full result
pub fn render_json(
    sources: &[(Side, SourceInfo)],
    result: &ComparisonResult,
) -> Result<String, serde_json::Error> {
    let output = JsonOutput {
        sources: sources
            .iter()
            .map(|(side, source)| JsonSource {
                file: side.to_string(),
                source,
            })
            .collect(),
        result,
    };
    serde_json::to_string_pretty(&output)
}

/// Text rendering of a result: summary, column sets, then up to `limit` differences
pub fn render_text(result: &ComparisonResult, limit: usize, no_row_label: &str) -> String {
    let mut out = result.summary().to_string();

    let column_sets = [
        ("Only in File 1", &result.columns_only_in_a),
        ("Only in File 2", &result.columns_only_in_b),
        ("Requested but missing in File 1", &result.requested_columns_missing_in_a),
        ("Requested but missing in File 2", &result.requested_columns_missing_in_b),
    ];
    for (label, columns) in column_sets {
        if !columns.is_empty() {
            out.push_str(&format!("{}: {}\n", label, columns.join(", ")));
        }
    }

    if result.is_identical() {
        out.push_str("No differences.\n");
        return out;
    }

    out.push('\n');
    for diff in result.differences.iter().take(limit) {
        out.push_str(&format!(
            "row {:>5}  {}: {:?} vs {:?}\n",
            diff.row,
            diff.column,
            diff.value_a.display_with(no_row_label),
            diff.value_b.display_with(no_row_label)
        ));
    }
    if result.differences.len() > limit {
        out.push_str(&format!("... and {} more\n", result.differences.len() - limit));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare;
    use crate::excel::{CellValue, Table};

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table::new("Sheet1", columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    #[test]
    fn test_parse_args() {
        let args = CliArgs::try_parse_from([
            "sheet-compare",
            "a.xlsx",
            "b.xlsx",
            "--sheet2",
            "Orders",
            "--columns",
            "Name",
            "Qty",
            "-o",
            "out.xlsx",
        ])
        .unwrap();

        assert_eq!(args.file1, PathBuf::from("a.xlsx"));
        assert_eq!(args.sheet1, None);
        assert_eq!(args.sheet2.as_deref(), Some("Orders"));
        assert_eq!(args.columns, vec!["Name", "Qty"]);
        assert_eq!(args.output, Some(PathBuf::from("out.xlsx")));
        assert_eq!(args.show, 20);
    }

    #[test]
    fn test_render_text_truncates() {
        let a = table(&["Name"], vec![vec!["Tea".into()]]);
        let b = table(
            &["Name"],
            vec![vec!["Coffee".into()], vec!["Milk".into()], vec!["Soda".into()]],
        );
        let result = compare(&a, &b);

        let text = render_text(&result, 2, "(no row)");
        assert!(text.contains("Total differences"));
        assert!(text.contains(r#"Name: "Tea" vs "Coffee""#));
        assert!(text.contains(r#"Name: "(no row)" vs "Milk""#));
        assert!(!text.contains("Soda"));
        assert!(text.contains("... and 1 more"));
    }

    #[test]
    fn test_render_text_identical() {
        let a = table(&["Name", "Qty"], vec![vec!["Tea".into(), 5.0.into()]]);
        let b = table(&["Name", "Extra"], vec![vec!["Tea".into(), 1.0.into()]]);
        let result = compare(&a, &b);

        let text = render_text(&result, 20, "(no row)");
        assert!(text.contains("Only in File 1: Qty"));
        assert!(text.contains("Only in File 2: Extra"));
        assert!(text.contains("No differences."));
    }

    #[test]
    fn test_execute_missing_file() {
        let args =
            CliArgs::try_parse_from(["sheet-compare", "/nonexistent/a.xlsx", "/nonexistent/b.xlsx"])
                .unwrap();
        let err = execute(&args).unwrap_err();
        assert!(matches!(
            err,
            CliError::Session(SessionError::Load { side: Side::A, .. })
        ));
    }

    fn sources() -> Vec<(Side, SourceInfo)> {
        vec![
            (
                Side::A,
                SourceInfo {
                    path: "a.xlsx".to_string(),
                    sheet: "Orders".to_string(),
                    checksum: "aaa111".to_string(),
                },
            ),
            (
                Side::B,
                SourceInfo {
                    path: "b.xlsx".to_string(),
                    sheet: "Orders 2".to_string(),
                    checksum: "bbb222".to_string(),
                },
            ),
        ]
    }

    #[test]
    fn test_render_sources_shows_checksums() {
        let text = render_sources(&sources());
        assert!(text.contains("File 1: a.xlsx [Orders] sha256 aaa111"));
        assert!(text.contains("File 2: b.xlsx [Orders 2] sha256 bbb222"));
    }

    #[test]
    fn test_render_json_includes_sources() {
        let a = table(&["Name"], vec![vec!["Tea".into()]]);
        let b = table(&["Name"], vec![vec!["Coffee".into()]]);
        let result = compare(&a, &b);

        let json = render_json(&sources(), &result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["sources"][0]["file"], "File 1");
        assert_eq!(value["sources"][0]["checksum"], "aaa111");
        assert_eq!(value["sources"][1]["sheet"], "Orders 2");
        assert_eq!(value["result"]["cells_compared"], 1);
        assert_eq!(value["result"]["differences"][0]["column"], "Name");
    }
}
