//! Per-worksheet parsing: heading extraction and row delegation.

use log::trace;

use crate::error::Result;
use crate::model::{Field, RowCollection, Worksheet};

use super::cell::CellValueResolver;
use super::columns::FieldIndex;
use super::encoding::Transcoder;
use super::options::ImportOptions;
use super::rows::RowParser;

/// Row number the heading labels are read from.
const HEADING_ROW: u32 = 1;

/// Parses one worksheet into a row collection.
pub(crate) struct WorksheetParser<'a> {
    options: &'a ImportOptions,
    transcoder: Transcoder,
    selection: &'a [Field],
}

impl<'a> WorksheetParser<'a> {
    pub(crate) fn new(
        options: &'a ImportOptions,
        transcoder: Transcoder,
        selection: &'a [Field],
    ) -> Self {
        Self {
            options,
            transcoder,
            selection,
        }
    }

    /// Parse `sheet`, building its field index first when heading detection
    /// is on. `counter` is the pass-wide row counter (see [`RowParser`]).
    pub(crate) fn parse(&self, sheet: &Worksheet, counter: &mut u32) -> Result<RowCollection> {
        let index = if self.options.heading {
            match sheet.row(HEADING_ROW) {
                Some(row) => FieldIndex::from_heading_row(
                    row,
                    self.options.label_mode,
                    &self.options.separator,
                ),
                None => FieldIndex::empty(),
            }
        } else {
            FieldIndex::empty()
        };
        trace!(
            "sheet '{}': {} heading labels, {} stored rows",
            sheet.title(),
            index.len(),
            sheet.row_count()
        );

        let resolver = CellValueResolver::new(self.options, self.transcoder);
        RowParser::new(self.options, resolver, index, self.selection).parse(sheet, counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::parse::rows::DEFAULT_START_ROW;

    fn parse(sheet: &Worksheet, options: &ImportOptions) -> RowCollection {
        let transcoder = options.transcoder().unwrap();
        let mut counter = DEFAULT_START_ROW;
        WorksheetParser::new(options, transcoder, &[])
            .parse(sheet, &mut counter)
            .unwrap()
    }

    #[test]
    fn test_heading_labels_feed_field_names() {
        let sheet = Worksheet::from_rows(
            "People",
            vec![vec!["Full Name", "Sign-Up Date"], vec!["Ada", "x"]],
        );
        let options = ImportOptions::new().with_separator("-");
        let rows = parse(&sheet, &options);
        assert_eq!(
            rows.get(0).unwrap().get_named("full-name"),
            Some(&Value::Text("Ada".to_string()))
        );
    }

    #[test]
    fn test_no_heading_uses_positions() {
        let sheet = Worksheet::from_rows("People", vec![vec!["Ada", "x"]]);
        let options = ImportOptions::new().with_heading(false);
        let rows = parse(&sheet, &options);
        let record = rows.get(0).unwrap();
        assert_eq!(record.get_column(1), Some(&Value::Text("Ada".to_string())));
        assert_eq!(record.get_column(2), Some(&Value::Text("x".to_string())));
    }

    #[test]
    fn test_missing_heading_row_falls_back_to_positions() {
        let mut sheet = Worksheet::new("Sparse");
        sheet.set("A3", "late start");
        let options = ImportOptions::new().with_skip(1);
        // heading on, but there is no row 1 to label from
        let rows = parse(&sheet, &options);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows.get(0).unwrap().get_column(1),
            Some(&Value::Text("late start".to_string()))
        );
    }
}
