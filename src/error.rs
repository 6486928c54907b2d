//! Error types for the rowbook library.

use std::fmt;

use thiserror::Error;

use crate::model::column_letter;

/// Result type alias for rowbook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Location of a cell within a workbook, used for error attribution.
///
/// Displays in A1 style, e.g. `sheet 'Signups' cell B3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellCoordinates {
    /// Title of the worksheet the cell belongs to.
    pub sheet: String,
    /// 1-based row number.
    pub row: u32,
    /// 1-based column index.
    pub column: u32,
}

impl fmt::Display for CellCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sheet '{}' cell {}{}",
            self.sheet,
            column_letter(self.column),
            self.row
        )
    }
}

/// Errors that can occur while parsing a workbook.
///
/// Errors propagate upward (cell → row → worksheet → workbook) and abort the
/// current parse pass; no value is ever silently replaced by a placeholder.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration, rejected before any traversal starts.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Character-set conversion of a cell value failed.
    #[error("encoding conversion failed at {at}: {detail}")]
    Encoding {
        /// Cell the failure is attributed to.
        at: CellCoordinates,
        /// What went wrong, including the encoding name.
        detail: String,
    },

    /// A cell flagged as a date could not be converted to a calendar timestamp.
    #[error("unsupported date value at {at}: {detail}")]
    UnsupportedDateFormat {
        /// Cell the failure is attributed to.
        at: CellCoordinates,
        /// What went wrong, typically the offending serial value.
        detail: String,
    },

    /// The caller-supplied cancellation token was set mid-parse.
    #[error("parse cancelled in sheet '{sheet}' at row {row}")]
    Cancelled {
        /// Title of the worksheet being parsed when cancellation was observed.
        sheet: String,
        /// 1-based row number about to be parsed.
        row: u32,
    },
}

impl Error {
    /// Coordinates of the cell this error is attributed to, if any.
    pub fn coordinates(&self) -> Option<&CellCoordinates> {
        match self {
            Error::Encoding { at, .. } | Error::UnsupportedDateFormat { at, .. } => Some(at),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_display() {
        let at = CellCoordinates {
            sheet: "Signups".to_string(),
            row: 3,
            column: 2,
        };
        assert_eq!(at.to_string(), "sheet 'Signups' cell B3");
    }

    #[test]
    fn test_error_display() {
        let err = Error::Configuration("unknown input encoding 'UTF-9'".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: unknown input encoding 'UTF-9'"
        );

        let err = Error::Cancelled {
            sheet: "Data".to_string(),
            row: 120,
        };
        assert_eq!(err.to_string(), "parse cancelled in sheet 'Data' at row 120");
    }

    #[test]
    fn test_error_coordinates() {
        let err = Error::Encoding {
            at: CellCoordinates {
                sheet: "Data".to_string(),
                row: 2,
                column: 28,
            },
            detail: "malformed UTF-8 byte sequence".to_string(),
        };
        let at = err.coordinates().unwrap();
        assert_eq!(at.column, 28);
        assert!(err.to_string().contains("cell AB2"));

        assert!(Error::Configuration("bad".into()).coordinates().is_none());
    }
}
