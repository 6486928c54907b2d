//! Parsed output model: fields, resolved values, records, and result shapes.

use std::fmt;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;

use super::workbook::CellValue;

/// Key of one record entry: a heading-derived field name, or the 1-based
/// positional column index when no heading label is available.
///
/// Serializes as a string either way, so records stay valid JSON objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// A normalized heading label.
    Name(String),
    /// A 1-based column index, stably derived from the column letter.
    Column(u32),
}

impl Field {
    /// Create a named field.
    pub fn name(name: impl Into<String>) -> Self {
        Field::Name(name.into())
    }

    /// Create a positional field.
    pub fn column(index: u32) -> Self {
        Field::Column(index)
    }

    /// The field name, if this is a named field.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Field::Name(name) => Some(name),
            Field::Column(_) => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name(name) => f.write_str(name),
            Field::Column(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Field::Name(name.to_string())
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Field::Name(name)
    }
}

impl From<u32> for Field {
    fn from(index: u32) -> Self {
        Field::Column(index)
    }
}

impl Serialize for Field {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Name(name) => serializer.serialize_str(name),
            Field::Column(index) => serializer.collect_str(index),
        }
    }
}

/// A resolved cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// No value; serializes as `null`.
    Empty,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// Text, including dates rendered through a format string.
    Text(String),
    /// A calendar timestamp resolved from a date/time cell.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Check whether this is the empty value.
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// String view, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Numeric view, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean view, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Timestamp view, if this is a resolved date/time.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl From<&CellValue> for Value {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => Value::Empty,
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Number(n) => Value::Number(*n),
            CellValue::Text(t) => Value::Text(t.clone()),
        }
    }
}

/// One parsed row: an insertion-ordered map from field to resolved value.
///
/// Keys are unique; inserting a field that is already present replaces its
/// value but keeps its original position, so duplicate heading labels
/// collapse to one entry with the last cell winning.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<Field, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous value if the field was present.
    pub fn insert(&mut self, field: Field, value: Value) -> Option<Value> {
        self.fields.insert(field, value)
    }

    /// The value for a field.
    pub fn get(&self, field: &Field) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The value for a named field.
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.fields.get(&Field::Name(name.to_string()))
    }

    /// The value for a positional field.
    pub fn get_column(&self, index: u32) -> Option<&Value> {
        self.fields.get(&Field::Column(index))
    }

    /// Whether the record contains a field.
    pub fn contains(&self, field: &Field) -> bool {
        self.fields.contains_key(field)
    }

    /// The fields, in column encounter order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.keys()
    }

    /// Iterate entries in column encounter order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Field, Value> {
        self.fields.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a Field, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Field, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The ordered records produced from one worksheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RowCollection {
    records: Vec<Record>,
}

impl RowCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// The records, in row order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The record at an index.
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Iterate the records in row order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RowCollection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The outcome of parsing a workbook.
///
/// A single-sheet workbook flattens to its only row collection; a workbook
/// with more than one sheet (or a forced collection) keeps one collection per
/// worksheet, keyed by title in workbook order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WorkbookResult {
    /// The flattened single-sheet form.
    Single(RowCollection),
    /// The worksheet-keyed form.
    Sheets(IndexMap<String, RowCollection>),
}

impl WorkbookResult {
    /// The flattened collection, if this is the single-sheet form.
    pub fn as_single(&self) -> Option<&RowCollection> {
        match self {
            WorkbookResult::Single(rows) => Some(rows),
            WorkbookResult::Sheets(_) => None,
        }
    }

    /// The worksheet-keyed map, if this is the multi-sheet form.
    pub fn as_sheets(&self) -> Option<&IndexMap<String, RowCollection>> {
        match self {
            WorkbookResult::Single(_) => None,
            WorkbookResult::Sheets(sheets) => Some(sheets),
        }
    }

    /// Look up one worksheet's collection by title in the multi-sheet form.
    pub fn sheet(&self, title: &str) -> Option<&RowCollection> {
        self.as_sheets().and_then(|sheets| sheets.get(title))
    }

    /// Whether this is the worksheet-keyed form.
    pub fn is_multi(&self) -> bool {
        matches!(self, WorkbookResult::Sheets(_))
    }

    /// Total number of records across all collections.
    pub fn record_count(&self) -> usize {
        match self {
            WorkbookResult::Single(rows) => rows.len(),
            WorkbookResult::Sheets(sheets) => sheets.values().map(RowCollection::len).sum(),
        }
    }
}
