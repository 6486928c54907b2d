//! Source workbook model.
//!
//! These types describe the *input* side of a parse: a workbook of worksheets,
//! rows, and cells as handed over by whatever actually opened the spreadsheet
//! file. The parser borrows them read-only for the duration of a pass; it
//! never owns or mutates a workbook. Rows and cells are stored sparsely and
//! kept sorted by their 1-based coordinates.

use crate::parse::format;

/// A raw cell value, as stored by the workbook reader.
///
/// A formula cell's raw value is its formula text (e.g. `"=A1+B1"`); the
/// evaluated result, if the reader supplied one, lives in
/// [`Cell::calculated`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// No stored value.
    #[default]
    Empty,
    /// A boolean.
    Bool(bool),
    /// A number, including date/time serials.
    Number(f64),
    /// A string, or the formula text of a formula cell.
    Text(String),
}

impl CellValue {
    /// Create a text value.
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Create a numeric value.
    pub fn number(value: f64) -> Self {
        CellValue::Number(value)
    }

    /// Check whether this is the empty value.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view of the value.
    ///
    /// Numeric text is accepted too, matching the loose coercion of
    /// spreadsheet readers that store serials as strings.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(t) => t.trim().parse().ok(),
            _ => None,
        }
    }

    /// String view of the value, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::Number(n) => f.write_str(&format::render_number(*n)),
            CellValue::Text(t) => f.write_str(t),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// One cell of a worksheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    column: u32,
    value: CellValue,
    calculated: Option<CellValue>,
    number_format: Option<String>,
}

impl Cell {
    /// Create a cell at a 1-based column position.
    pub fn new(column: u32, value: impl Into<CellValue>) -> Self {
        Self {
            column,
            value: value.into(),
            calculated: None,
            number_format: None,
        }
    }

    /// Create a cell with no stored value.
    pub fn empty(column: u32) -> Self {
        Self::new(column, CellValue::Empty)
    }

    /// Attach the evaluated result of a formula cell.
    pub fn with_calculated(mut self, value: impl Into<CellValue>) -> Self {
        self.calculated = Some(value.into());
        self
    }

    /// Attach a number-format code (e.g. `"yyyy-mm-dd"`, `"0.00"`).
    pub fn with_number_format(mut self, code: impl Into<String>) -> Self {
        self.number_format = Some(code.into());
        self
    }

    /// Attach the format code of a built-in format id (e.g. 14 = `m/d/yyyy`).
    ///
    /// Unknown ids leave the format unset.
    pub fn with_builtin_format(mut self, id: u16) -> Self {
        self.number_format = format::builtin_format_code(id).map(str::to_string);
        self
    }

    /// 1-based column index.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Column position in letter form (1 → `A`).
    pub fn column_letter(&self) -> String {
        column_letter(self.column)
    }

    /// The raw stored value.
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// The evaluated result of a formula cell, if the reader supplied one.
    pub fn calculated(&self) -> Option<&CellValue> {
        self.calculated.as_ref()
    }

    /// The calculated value, falling back to the raw value.
    pub fn calculated_or_value(&self) -> &CellValue {
        self.calculated.as_ref().unwrap_or(&self.value)
    }

    /// The cell's number-format code, if any.
    pub fn number_format(&self) -> Option<&str> {
        self.number_format.as_deref()
    }

    /// Whether the cell's format marks it as a date/time value.
    pub fn is_date(&self) -> bool {
        self.number_format
            .as_deref()
            .is_some_and(format::is_date_format)
    }
}

/// One row of a worksheet: a 1-based row number and its cells, sparse and
/// sorted by column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    number: u32,
    cells: Vec<Cell>,
}

impl Row {
    /// Create an empty row at a 1-based row number.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            cells: Vec::new(),
        }
    }

    /// Create a row from cells; they are sorted by column position.
    pub fn with_cells(number: u32, cells: Vec<Cell>) -> Self {
        let mut row = Self::new(number);
        for cell in cells {
            row.push(cell);
        }
        row
    }

    /// Insert a cell, keeping column order; a cell already present at the
    /// same column is replaced.
    pub fn push(&mut self, cell: Cell) {
        match self.cells.binary_search_by_key(&cell.column(), Cell::column) {
            Ok(i) => self.cells[i] = cell,
            Err(i) => self.cells.insert(i, cell),
        }
    }

    /// 1-based row number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The stored cells, in column order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The stored cell at a 1-based column, if any.
    pub fn cell(&self, column: u32) -> Option<&Cell> {
        self.cells
            .binary_search_by_key(&column, Cell::column)
            .ok()
            .map(|i| &self.cells[i])
    }

    /// Highest column position with a stored cell, 0 when the row is empty.
    pub fn max_column(&self) -> u32 {
        self.cells.last().map_or(0, Cell::column)
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check whether the row has no stored cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// One named grid of rows within a workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    title: String,
    rows: Vec<Row>,
}

impl Worksheet {
    /// Create an empty worksheet with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    /// Create a dense worksheet from row data; rows are numbered from 1 and
    /// cells from column 1, in the order given.
    pub fn from_rows<V: Into<CellValue>>(title: impl Into<String>, rows: Vec<Vec<V>>) -> Self {
        let mut sheet = Self::new(title);
        for (r, values) in rows.into_iter().enumerate() {
            let cells = values
                .into_iter()
                .enumerate()
                .map(|(c, value)| Cell::new(c as u32 + 1, value))
                .collect();
            sheet.push_row(Row::with_cells(r as u32 + 1, cells));
        }
        sheet
    }

    /// The worksheet title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Insert a row, keeping row-number order; a row already present at the
    /// same number is replaced.
    pub fn push_row(&mut self, row: Row) {
        match self.rows.binary_search_by_key(&row.number(), Row::number) {
            Ok(i) => self.rows[i] = row,
            Err(i) => self.rows.insert(i, row),
        }
    }

    /// Set a single cell by A1-style reference (e.g. `"B3"`), creating the
    /// row if needed. Returns `false` when the reference does not parse.
    pub fn set(&mut self, reference: &str, value: impl Into<CellValue>) -> bool {
        let value: CellValue = value.into();
        self.set_cell(reference, |column| Cell::new(column, value))
    }

    /// Set a single cell by A1-style reference using a cell constructor,
    /// for cells that need a format or calculated value attached.
    pub fn set_cell(&mut self, reference: &str, build: impl FnOnce(u32) -> Cell) -> bool {
        let Some((column, number)) = parse_cell_reference(reference) else {
            return false;
        };
        let cell = build(column);
        match self.rows.binary_search_by_key(&number, Row::number) {
            Ok(i) => self.rows[i].push(cell),
            Err(i) => {
                let mut row = Row::new(number);
                row.push(cell);
                self.rows.insert(i, row);
            }
        }
        true
    }

    /// The stored rows, in row-number order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The stored row at a 1-based row number, if any.
    pub fn row(&self, number: u32) -> Option<&Row> {
        self.rows
            .binary_search_by_key(&number, Row::number)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Iterate the stored rows whose number is at least `start`.
    pub fn rows_from(&self, start: u32) -> impl Iterator<Item = &Row> {
        let from = self.rows.partition_point(|row| row.number() < start);
        self.rows[from..].iter()
    }

    /// Number of stored rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the worksheet has no stored rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The full spreadsheet document: an ordered sequence of worksheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a worksheet, builder style.
    pub fn with_sheet(mut self, sheet: Worksheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// Append a worksheet.
    pub fn push_sheet(&mut self, sheet: Worksheet) {
        self.sheets.push(sheet);
    }

    /// The worksheets, in workbook order.
    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    /// The worksheet at an index.
    pub fn sheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    /// Number of worksheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Worksheet titles, in workbook order.
    pub fn sheet_titles(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.title()).collect()
    }

    /// Check whether the workbook has no worksheets.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Convert a column letter to its 1-based index (`A` → 1, `AB` → 28).
pub fn column_index_from_letter(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut index: u32 = 0;
    for c in letters.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        index = index.checked_mul(26)?.checked_add(c as u32 - 'A' as u32 + 1)?;
    }
    Some(index)
}

/// Convert a 1-based column index to letter form (1 → `A`, 28 → `AB`).
pub fn column_letter(index: u32) -> String {
    let mut index = index;
    let mut letters = Vec::new();
    while index > 0 {
        index -= 1;
        letters.push(b'A' + (index % 26) as u8);
        index /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Parse an A1-style cell reference into `(column, row)` (`"B3"` → `(2, 3)`).
pub fn parse_cell_reference(reference: &str) -> Option<(u32, u32)> {
    let reference = reference.trim();
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let column = column_index_from_letter(letters)?;
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((column, row))
}
