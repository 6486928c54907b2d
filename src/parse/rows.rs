//! Row traversal and record assembly for one worksheet.

use std::sync::atomic::Ordering;

use crate::error::{CellCoordinates, Error, Result};
use crate::model::{Cell, Field, Record, Row, RowCollection, Worksheet};

use super::cell::{CellValueResolver, ResolveError};
use super::columns::FieldIndex;
use super::options::ImportOptions;

/// Base of both the start-row computation and the limit counter.
pub(crate) const DEFAULT_START_ROW: u32 = 1;

/// Assembles one worksheet's rows into records.
pub(crate) struct RowParser<'a> {
    options: &'a ImportOptions,
    resolver: CellValueResolver<'a>,
    index: FieldIndex,
    selection: &'a [Field],
}

impl<'a> RowParser<'a> {
    pub(crate) fn new(
        options: &'a ImportOptions,
        resolver: CellValueResolver<'a>,
        index: FieldIndex,
        selection: &'a [Field],
    ) -> Self {
        Self {
            options,
            resolver,
            index,
            selection,
        }
    }

    /// Parse the worksheet's data rows.
    ///
    /// `counter` is the pass-wide row counter the limit is measured against;
    /// it is seeded at [`DEFAULT_START_ROW`] and deliberately not reset
    /// between worksheets, so a limit is consumed across an entire pass.
    pub(crate) fn parse(&self, sheet: &Worksheet, counter: &mut u32) -> Result<RowCollection> {
        let mut rows = RowCollection::new();
        // gap synthesis spans the sheet's widest row, not just the current one
        let span = sheet.rows().iter().map(Row::max_column).max().unwrap_or(0);

        for row in sheet.rows_from(self.start_row()) {
            if self.cancelled() {
                return Err(Error::Cancelled {
                    sheet: sheet.title().to_string(),
                    row: row.number(),
                });
            }
            if self.reached_limit(*counter) {
                break;
            }
            rows.push(self.parse_cells(sheet.title(), row, span)?);
            *counter += 1;
        }

        Ok(rows)
    }

    /// First data row: 1, plus the heading row when enabled, plus the
    /// configured skip count.
    fn start_row(&self) -> u32 {
        let mut start = DEFAULT_START_ROW;
        if self.options.heading {
            start += 1;
        }
        start + self.options.skip
    }

    fn reached_limit(&self, counter: u32) -> bool {
        self.options.limit.is_some_and(|limit| counter > limit)
    }

    fn cancelled(&self) -> bool {
        self.options
            .cancel
            .as_ref()
            .is_some_and(|token| token.load(Ordering::Relaxed))
    }

    /// Assemble one row into a record.
    fn parse_cells(&self, sheet_title: &str, row: &Row, span: u32) -> Result<Record> {
        let mut record = Record::new();

        if self.options.skip_empty {
            for (ordinal, cell) in row.cells().iter().enumerate() {
                self.parse_cell(&mut record, ordinal, cell, sheet_title, row.number())?;
            }
        } else {
            // walk the full column span, synthesizing empty cells for gaps
            for (ordinal, column) in (1..=span).enumerate() {
                match row.cell(column) {
                    Some(cell) => {
                        self.parse_cell(&mut record, ordinal, cell, sheet_title, row.number())?;
                    }
                    None => {
                        let gap = Cell::empty(column);
                        self.parse_cell(&mut record, ordinal, &gap, sheet_title, row.number())?;
                    }
                }
            }
        }

        Ok(record)
    }

    fn parse_cell(
        &self,
        record: &mut Record,
        ordinal: usize,
        cell: &Cell,
        sheet_title: &str,
        row_number: u32,
    ) -> Result<()> {
        let field = self.index.field_for(ordinal, cell.column());
        if !self.selected(&field) {
            return Ok(());
        }

        let value = self.resolver.resolve(cell, &field).map_err(|err| {
            let at = CellCoordinates {
                sheet: sheet_title.to_string(),
                row: row_number,
                column: cell.column(),
            };
            match err {
                ResolveError::Encoding(detail) => Error::Encoding { at, detail },
                ResolveError::Date(detail) => Error::UnsupportedDateFormat { at, detail },
            }
        })?;
        record.insert(field, value);
        Ok(())
    }

    /// No selection means every field is kept.
    fn selected(&self, field: &Field) -> bool {
        self.selection.is_empty() || self.selection.contains(field)
    }
}
