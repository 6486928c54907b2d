//! Top-level workbook parsing with an idempotent result cache.

use indexmap::IndexMap;
use log::{debug, warn};

use crate::error::Result;
use crate::model::{Field, RowCollection, Workbook, WorkbookResult};

use super::options::ImportOptions;
use super::rows::DEFAULT_START_ROW;
use super::worksheet::WorksheetParser;

/// Parses a whole workbook, caching the result of the first pass.
///
/// A parser moves from unparsed to parsed exactly once: the first call to
/// [`parse`](Self::parse) traverses the workbook, every later call returns the
/// stored result without re-reading the source. **The column selection of
/// later calls is ignored** — selection filters the first pass only. This
/// mirrors the behavior of the system this crate is modeled on; callers that
/// need a different selection must construct a new parser.
pub struct WorkbookParser<'a> {
    workbook: &'a Workbook,
    options: ImportOptions,
    result: Option<WorkbookResult>,
}

impl<'a> WorkbookParser<'a> {
    /// Create a parser over a workbook; configuration is validated eagerly.
    pub fn new(workbook: &'a Workbook, options: ImportOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            workbook,
            options,
            result: None,
        })
    }

    /// Whether a completed parse result is cached.
    pub fn is_parsed(&self) -> bool {
        self.result.is_some()
    }

    /// Parse the workbook, keeping only the fields in `selection` (empty =
    /// keep everything).
    ///
    /// The first call traverses the workbook and caches the outcome; repeat
    /// calls return the cached result and ignore `selection` (see the type
    /// docs).
    pub fn parse(&mut self, selection: &[Field]) -> Result<&WorkbookResult> {
        if self.result.is_none() {
            self.result = Some(run(self.workbook, &self.options, selection)?);
        } else if !selection.is_empty() {
            warn!(
                "workbook already parsed; column selection {:?} ignored",
                selection
            );
        }
        Ok(self
            .result
            .get_or_insert_with(|| WorkbookResult::Single(RowCollection::new())))
    }

    /// Consume the parser, returning the cached result if a pass completed.
    pub fn into_result(self) -> Option<WorkbookResult> {
        self.result
    }
}

/// One full parse pass, bypassing any cache.
pub(crate) fn parse_once(
    workbook: &Workbook,
    options: &ImportOptions,
    selection: &[Field],
) -> Result<WorkbookResult> {
    options.validate()?;
    run(workbook, options, selection)
}

fn run(
    workbook: &Workbook,
    options: &ImportOptions,
    selection: &[Field],
) -> Result<WorkbookResult> {
    let transcoder = options.transcoder()?;
    let multiple = workbook.sheet_count() > 1 || options.force_sheet_collection;
    debug!(
        "parsing workbook: {} sheets, multiple={}",
        workbook.sheet_count(),
        multiple
    );

    let sheet_parser = WorksheetParser::new(options, transcoder, selection);
    // the limit counter spans the whole pass, not one worksheet
    let mut counter = DEFAULT_START_ROW;

    if multiple || workbook.is_empty() {
        let mut sheets = IndexMap::new();
        for sheet in workbook.sheets() {
            let rows = sheet_parser.parse(sheet, &mut counter)?;
            sheets.insert(sheet.title().to_string(), rows);
        }
        Ok(WorkbookResult::Sheets(sheets))
    } else {
        // single-sheet form: the first worksheet is the whole result
        match workbook.sheets().first() {
            Some(sheet) => Ok(WorkbookResult::Single(
                sheet_parser.parse(sheet, &mut counter)?,
            )),
            None => Ok(WorkbookResult::Single(RowCollection::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Value, Worksheet};

    fn two_sheet_workbook() -> Workbook {
        Workbook::new()
            .with_sheet(Worksheet::from_rows(
                "First",
                vec![vec!["Name"], vec!["Ada"]],
            ))
            .with_sheet(Worksheet::from_rows(
                "Second",
                vec![vec!["Name"], vec!["Grace"]],
            ))
    }

    #[test]
    fn test_single_sheet_flattens() {
        let workbook = Workbook::new().with_sheet(Worksheet::from_rows(
            "Only",
            vec![vec!["Name"], vec!["Ada"]],
        ));
        let mut parser = WorkbookParser::new(&workbook, ImportOptions::new()).unwrap();
        let result = parser.parse(&[]).unwrap();
        assert!(!result.is_multi());
        assert_eq!(result.as_single().unwrap().len(), 1);
    }

    #[test]
    fn test_multiple_sheets_keyed_by_title() {
        let workbook = two_sheet_workbook();
        let mut parser = WorkbookParser::new(&workbook, ImportOptions::new()).unwrap();
        let result = parser.parse(&[]).unwrap();
        assert!(result.is_multi());
        let sheets = result.as_sheets().unwrap();
        let titles: Vec<&str> = sheets.keys().map(String::as_str).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(
            sheets["Second"].get(0).unwrap().get_named("name"),
            Some(&Value::Text("Grace".to_string()))
        );
    }

    #[test]
    fn test_force_sheet_collection_for_single_sheet() {
        let workbook = Workbook::new().with_sheet(Worksheet::from_rows(
            "Only",
            vec![vec!["Name"], vec!["Ada"]],
        ));
        let options = ImportOptions::new().with_sheet_collection(true);
        let mut parser = WorkbookParser::new(&workbook, options).unwrap();
        let result = parser.parse(&[]).unwrap();
        assert!(result.is_multi());
        assert!(result.sheet("Only").is_some());
    }

    #[test]
    fn test_empty_workbook_yields_empty_collection_form() {
        let workbook = Workbook::new();
        let mut parser = WorkbookParser::new(&workbook, ImportOptions::new()).unwrap();
        let result = parser.parse(&[]).unwrap();
        assert!(result.is_multi());
        assert_eq!(result.record_count(), 0);
    }

    #[test]
    fn test_repeat_parse_returns_cached_result() {
        let workbook = two_sheet_workbook();
        let mut parser = WorkbookParser::new(&workbook, ImportOptions::new()).unwrap();
        assert!(!parser.is_parsed());

        let first = parser.parse(&[]).unwrap().clone();
        assert!(parser.is_parsed());

        // a different selection on the second call is ignored
        let second = parser.parse(&[Field::name("name")]).unwrap();
        assert_eq!(&first, second);
        assert_eq!(second.record_count(), 2);
    }

    #[test]
    fn test_invalid_options_rejected_at_construction() {
        let workbook = two_sheet_workbook();
        let err = WorkbookParser::new(&workbook, ImportOptions::new().with_encoding("bogus", "UTF-8"));
        assert!(err.is_err());
    }

    #[test]
    fn test_into_result() {
        let workbook = two_sheet_workbook();
        let mut parser = WorkbookParser::new(&workbook, ImportOptions::new()).unwrap();
        parser.parse(&[]).unwrap();
        let result = parser.into_result().unwrap();
        assert_eq!(result.record_count(), 2);
    }
}
