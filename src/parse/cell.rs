//! Per-cell value resolution.
//!
//! Resolution is a fixed priority chain: date handling first (cell format or
//! configured date column), then calculated-vs-raw selection, then encoding
//! conversion of text values.

use std::fmt::Write as _;

use crate::model::{Cell, Field, Value};

use super::encoding::Transcoder;
use super::format;
use super::options::ImportOptions;

/// Why a single cell failed to resolve; the row parser attaches coordinates.
#[derive(Debug)]
pub(crate) enum ResolveError {
    Encoding(String),
    Date(String),
}

/// Resolves one cell into its final value under the active configuration.
pub(crate) struct CellValueResolver<'a> {
    options: &'a ImportOptions,
    transcoder: Transcoder,
}

impl<'a> CellValueResolver<'a> {
    pub(crate) fn new(options: &'a ImportOptions, transcoder: Transcoder) -> Self {
        Self {
            options,
            transcoder,
        }
    }

    /// Resolve a cell given the field it will be stored under.
    pub(crate) fn resolve(&self, cell: &Cell, field: &Field) -> Result<Value, ResolveError> {
        let value = if self.is_date_cell(cell, field) {
            self.resolve_date(cell)?
        } else if self.options.calculate {
            Value::from(cell.calculated_or_value())
        } else {
            Value::from(cell.value())
        };
        self.encode(value)
    }

    /// A cell is a date when its own format says so, or when its field is
    /// listed as a date column.
    fn is_date_cell(&self, cell: &Cell, field: &Field) -> bool {
        cell.is_date() || self.options.date_columns.contains(field)
    }

    fn resolve_date(&self, cell: &Cell) -> Result<Value, ResolveError> {
        let raw = cell.calculated_or_value();
        if raw.is_empty() {
            // an empty cell in a date column carries no serial to convert
            return Ok(Value::Empty);
        }
        let serial = raw.as_number().ok_or_else(|| {
            ResolveError::Date(format!("value '{raw}' is not a date serial"))
        })?;

        if self.options.format_dates {
            let timestamp = format::serial_to_datetime(serial).ok_or_else(|| {
                ResolveError::Date(format!("serial {serial} is out of range"))
            })?;
            match self.options.date_format.as_deref() {
                Some(fmt) => {
                    let mut rendered = String::new();
                    write!(rendered, "{}", timestamp.format(fmt)).map_err(|_| {
                        ResolveError::Date(format!("date format string '{fmt}' failed"))
                    })?;
                    Ok(Value::Text(rendered))
                }
                None => Ok(Value::DateTime(timestamp)),
            }
        } else {
            let code = cell.number_format().unwrap_or("General");
            let rendered = format::format_serial(serial, code).ok_or_else(|| {
                ResolveError::Date(format!("serial {serial} is out of range"))
            })?;
            Ok(Value::Text(rendered))
        }
    }

    fn encode(&self, value: Value) -> Result<Value, ResolveError> {
        match value {
            Value::Text(text) => match self.transcoder.transcode(&text) {
                Ok(converted) => Ok(Value::Text(converted)),
                Err(err) => Err(ResolveError::Encoding(err.to_string())),
            },
            other => Ok(other),
        }
    }
}
