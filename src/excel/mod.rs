//! Excel module for loading sheets as tables and writing difference reports.
//!
//! This module provides:
//! - Listing the sheets of a workbook
//! - Loading one sheet as a header-plus-rows table
//! - Writing a comparison result to a new workbook

pub mod types;
pub mod reader;
pub mod writer;

// Re-export commonly used types and functions
pub use types::*;
pub use reader::{load_table, get_sheets, compute_checksum};
pub use writer::{write_report, ReportOptions};
