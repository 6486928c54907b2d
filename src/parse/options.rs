//! Import configuration.
//!
//! One [`ImportOptions`] value is constructed up front, validated eagerly,
//! and passed down through the pipeline read-only; there is no process-wide
//! configuration state.

use std::fmt::Write as _;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::model::Field;

use super::encoding::Transcoder;

/// How heading labels are normalized into field names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelMode {
    /// ASCII slug: transliterated, lowercased, words joined by the separator.
    #[default]
    Slug,
    /// Lowercased with spaces replaced by the separator.
    Simple,
}

/// Options for parsing a workbook.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Derive field names from each worksheet's first row.
    pub heading: bool,

    /// How heading labels are normalized.
    pub label_mode: LabelMode,

    /// Word separator used by label normalization.
    pub separator: String,

    /// Extra rows to skip past the computed start row.
    pub skip: u32,

    /// Maximum number of data rows per parse pass (`None` = unlimited).
    pub limit: Option<u32>,

    /// Fields always resolved as dates, regardless of cell format.
    pub date_columns: Vec<Field>,

    /// Convert date cells to calendar timestamps. When off, date cells render
    /// through their own embedded format code instead.
    pub format_dates: bool,

    /// Render timestamps through this chrono `strftime` string; absent means
    /// the structured timestamp itself is returned.
    pub date_format: Option<String>,

    /// Use the calculated value of formula cells instead of the formula text.
    pub calculate: bool,

    /// Encoding label the reader's text is declared in.
    pub input_encoding: String,

    /// Encoding label cell text must be representable in.
    pub output_encoding: String,

    /// Skip cells with no stored value instead of including gaps as empty.
    pub skip_empty: bool,

    /// Return the worksheet-keyed result form even for a single sheet.
    pub force_sheet_collection: bool,

    /// Cooperative cancellation token, checked once per row.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            heading: true,
            label_mode: LabelMode::Slug,
            separator: "_".to_string(),
            skip: 0,
            limit: None,
            date_columns: Vec::new(),
            format_dates: true,
            date_format: None,
            calculate: true,
            input_encoding: "UTF-8".to_string(),
            output_encoding: "UTF-8".to_string(),
            skip_empty: false,
            force_sheet_collection: false,
            cancel: None,
        }
    }
}

impl ImportOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable heading detection.
    pub fn with_heading(mut self, heading: bool) -> Self {
        self.heading = heading;
        self
    }

    /// Set the label normalization mode.
    pub fn with_label_mode(mut self, mode: LabelMode) -> Self {
        self.label_mode = mode;
        self
    }

    /// Set the label word separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Skip a number of rows past the computed start row.
    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = skip;
        self
    }

    /// Cap the number of data rows per parse pass; 0 means unlimited.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    /// Mark fields that must always resolve as dates.
    pub fn with_date_columns<F: Into<Field>>(
        mut self,
        columns: impl IntoIterator<Item = F>,
    ) -> Self {
        self.date_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable timestamp conversion for date cells.
    pub fn with_date_formatting(mut self, enabled: bool) -> Self {
        self.format_dates = enabled;
        self
    }

    /// Render timestamps through a chrono `strftime` string.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// Enable or disable formula calculation mode.
    pub fn with_calculation(mut self, enabled: bool) -> Self {
        self.calculate = enabled;
        self
    }

    /// Set the input/output encoding labels.
    pub fn with_encoding(
        mut self,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        self.input_encoding = input.into();
        self.output_encoding = output.into();
        self
    }

    /// Skip cells with no stored value.
    pub fn with_skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Force the worksheet-keyed result form even for a single sheet.
    pub fn with_sheet_collection(mut self, force: bool) -> Self {
        self.force_sheet_collection = force;
        self
    }

    /// Attach a cooperative cancellation token.
    pub fn with_cancellation(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Validate the configuration, failing fast before any traversal.
    pub(crate) fn validate(&self) -> Result<()> {
        self.transcoder()?;

        if let Some(fmt) = self.date_format.as_deref() {
            // chrono only reports bad specifiers at render time, so probe
            // with a fixed timestamp
            if let Some(probe) =
                NaiveDate::from_ymd_opt(2000, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
            {
                let mut rendered = String::new();
                if write!(rendered, "{}", probe.format(fmt)).is_err() {
                    return Err(Error::Configuration(format!(
                        "invalid date format string '{fmt}'"
                    )));
                }
            }
        }

        Ok(())
    }

    /// The transcoder for the configured encoding pair.
    pub(crate) fn transcoder(&self) -> Result<Transcoder> {
        Transcoder::new(&self.input_encoding, &self.output_encoding)
    }
}
