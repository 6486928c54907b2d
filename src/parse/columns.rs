//! Field naming: heading-derived labels and positional column indices.

use unicode_normalization::UnicodeNormalization;

use crate::model::{Field, Row};

use super::options::LabelMode;

/// Positional field labels extracted from a worksheet's heading row.
///
/// Labels are indexed by 0-based encounter ordinal and reused, unchanged, for
/// every data row of the worksheet. Positions without a usable label (beyond
/// the heading, or normalizing to nothing) fall back to the cell's positional
/// column index.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    labels: Vec<Option<String>>,
}

impl FieldIndex {
    /// An index with no labels; every position resolves positionally.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the index from a heading row, normalizing each cell's text.
    ///
    /// The full column span of the row is walked, so labels stay aligned with
    /// their column positions even when the heading row is sparse.
    pub fn from_heading_row(row: &Row, mode: LabelMode, separator: &str) -> Self {
        let labels = (1..=row.max_column())
            .map(|column| {
                let cell = row.cell(column)?;
                let text = cell.value().to_string();
                let label = match mode {
                    LabelMode::Slug => slugify(&text, separator),
                    LabelMode::Simple => simple_label(&text, separator),
                };
                (!label.is_empty()).then_some(label)
            })
            .collect();
        Self { labels }
    }

    /// Number of heading positions, labeled or not.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check whether the index has no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The field for a cell at an encounter ordinal, falling back to the
    /// 1-based column index when no label is known for that position.
    pub fn field_for(&self, ordinal: usize, column: u32) -> Field {
        match self.labels.get(ordinal) {
            Some(Some(label)) => Field::Name(label.clone()),
            _ => Field::Column(column),
        }
    }
}

/// Normalize free text into an identifier-safe ASCII slug: transliterate,
/// lowercase, and join alphanumeric runs with `separator`.
pub fn slugify(text: &str, separator: &str) -> String {
    // NFKD decomposition splits accented letters into base + combining marks;
    // dropping everything non-ASCII then strips the marks.
    let ascii: String = text.nfkd().filter(char::is_ascii).collect();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push_str(separator);
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Normalize free text the simple way: lowercase, spaces replaced by
/// `separator`, everything else kept as-is.
pub fn simple_label(text: &str, separator: &str) -> String {
    text.to_lowercase().replace(' ', separator)
}
