mod cli;
pub mod compare;
pub mod config;
pub mod excel;
pub mod session;

pub use cli::{execute, render_json, render_sources, render_text, CliArgs, CliError};
pub use compare::{
    compare, compare_columns, compare_with, normalize, CellDifference, ComparisonResult, DiffValue,
};
pub use excel::{CellValue, Table};
pub use session::{CompareSession, SessionError, Side};

/// Command line entry point
pub fn run() -> Result<(), CliError> {
    cli::run()
}
