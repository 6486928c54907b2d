//! # rowbook
//!
//! Spreadsheet workbook ingestion into ordered, structured records.
//!
//! This library takes an in-memory workbook — worksheets of rows and cells,
//! as populated by whatever opened the spreadsheet file — and turns it into
//! ordered records: field names derived from heading rows (or positional
//! column indices), rows skipped and limited on request, columns filtered by
//! an allowlist, dates and formula results coerced, and text normalized
//! between character encodings.
//!
//! ## Quick Start
//!
//! ```
//! use rowbook::{parse_workbook, Workbook, Worksheet};
//!
//! let workbook = Workbook::new().with_sheet(Worksheet::from_rows(
//!     "Signups",
//!     vec![
//!         vec!["Full Name", "Plan"],
//!         vec!["Ada Lovelace", "pro"],
//!         vec!["Grace Hopper", "free"],
//!     ],
//! ));
//!
//! let result = parse_workbook(&workbook)?;
//! let rows = result.as_single().unwrap();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(
//!     rows.get(0).unwrap().get_named("full_name").and_then(|v| v.as_str()),
//!     Some("Ada Lovelace"),
//! );
//! # Ok::<(), rowbook::Error>(())
//! ```
//!
//! ## Configured parsing
//!
//! ```
//! use rowbook::{parse_workbook_with_options, Field, ImportOptions, Workbook, Worksheet};
//!
//! let workbook = Workbook::new().with_sheet(Worksheet::from_rows(
//!     "Signups",
//!     vec![
//!         vec!["Full Name", "Sign-Up Date"],
//!         vec!["Ada Lovelace", "41000"],
//!     ],
//! ));
//!
//! let options = ImportOptions::new()
//!     .with_separator("-")
//!     .with_date_columns(["sign-up-date"])
//!     .with_date_format("%Y-%m-%d");
//!
//! let result = parse_workbook_with_options(&workbook, options, &[])?;
//! let record = &result.as_single().unwrap().records()[0];
//! assert_eq!(
//!     record.get(&Field::name("sign-up-date")).and_then(|v| v.as_str()),
//!     Some("2012-04-01"),
//! );
//! # Ok::<(), rowbook::Error>(())
//! ```
//!
//! ## Reusing a parser
//!
//! [`WorkbookParser`] caches the first completed pass: repeat `parse` calls
//! return the stored result without re-reading the workbook, and **ignore any
//! new column selection**. Construct a fresh parser to re-filter.

pub mod error;
pub mod model;
pub mod parse;

// Re-exports
pub use error::{CellCoordinates, Error, Result};
pub use model::{
    column_index_from_letter, column_letter, parse_cell_reference, Cell, CellValue, Field, Record,
    Row, RowCollection, Value, Workbook, WorkbookResult, Worksheet,
};
pub use parse::{ImportOptions, LabelMode, WorkbookParser};

/// Parse a workbook with default options and no column selection.
///
/// # Example
///
/// ```
/// use rowbook::{parse_workbook, Workbook, Worksheet};
///
/// let workbook = Workbook::new()
///     .with_sheet(Worksheet::from_rows("Data", vec![vec!["N"], vec!["1"]]));
/// let result = parse_workbook(&workbook)?;
/// assert_eq!(result.record_count(), 1);
/// # Ok::<(), rowbook::Error>(())
/// ```
pub fn parse_workbook(workbook: &Workbook) -> Result<WorkbookResult> {
    parse::parse_once(workbook, &ImportOptions::default(), &[])
}

/// Parse a workbook with options, keeping only the fields in `selection`
/// (empty = keep everything).
pub fn parse_workbook_with_options(
    workbook: &Workbook,
    options: ImportOptions,
    selection: &[Field],
) -> Result<WorkbookResult> {
    parse::parse_once(workbook, &options, selection)
}
