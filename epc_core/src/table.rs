//! # Table Engine
//!
//! A [`Table`] is a fixed set of typed [`Column`]s and a list of [`Row`]s,
//! each row holding exactly one [`Cell`] per column. The calculation engine
//! reads and writes cells in place; templates render tables through the
//! helpers in [`crate::render::helpers`].
//!
//! ## Invariants
//!
//! - every row has exactly `columns.len()` cells
//! - columns never change after construction
//! - the sort column is a valid column index, or 0
//!
//! ## JSON Format
//!
//! ```json
//! {
//!   "columns": [{ "name": "Month", "kind": "Name", "headers": [] }],
//!   "rows": [["January"], ["February"]],
//!   "sortBy": 0,
//!   "title": ""
//! }
//! ```
//!
//! `null` and `{}` both read as the empty table.
//!
//! ## Example
//!
//! ```rust
//! use epc_core::cell::Kind;
//! use epc_core::table::{Column, Row, Table};
//!
//! let mut table = Table::new(vec![
//!     Column::new("Month", Kind::Name),
//!     Column::new("Energy", Kind::Energy),
//! ]);
//! table.append_row(Row::from_strs(&["January", "10.5"])).unwrap();
//! table.append_row(Row::from_strs(&["February", "4.5"])).unwrap();
//!
//! assert_eq!(table.total(1).unwrap().to_string(), "15.0");
//! assert!(table.total(0).is_err());
//! ```

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cell::{self, Cell, Kind};
use crate::errors::{EpcError, EpcResult};
use crate::l10n;

static EMPTY_CELL: Cell = Cell(String::new());

/// Column definition: localized name, kind and optional header lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Localized name (JSON language map or literal)
    pub name: String,

    /// Semantic kind of every cell in the column
    pub kind: Kind,

    /// Extra header lines above the name, outermost first
    #[serde(default)]
    pub headers: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Column {
            name: name.into(),
            kind,
            headers: Vec::new(),
        }
    }

    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn can_sum(&self) -> bool {
        self.kind.can_sum()
    }

    pub fn can_avg(&self) -> bool {
        self.kind.can_avg()
    }

    /// Copy with name and headers resolved for `lang`.
    pub fn localized(&self, lang: &str) -> Column {
        Column {
            name: l10n::localize(&self.name, lang),
            kind: self.kind,
            headers: self
                .headers
                .iter()
                .map(|header| l10n::localize(header, lang))
                .collect(),
        }
    }
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Vec<Cell>);

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Row(cells)
    }

    pub fn from_strs(cells: &[&str]) -> Self {
        Row(cells.iter().map(|cell| Cell::from(*cell)).collect())
    }

    /// Row of `len` empty cells.
    pub fn blank(len: usize) -> Self {
        Row(vec![Cell::empty(); len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    /// Cell at `index`, or an empty cell when out of range.
    pub fn cell(&self, index: usize) -> &Cell {
        self.0.get(index).unwrap_or(&EMPTY_CELL)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.0.iter()
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.0
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Row(cells)
    }
}

/// Columnar table with typed columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Option<TableRepr>", into = "TableRepr")]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
    sort_by: usize,
    title: String,
}

/// Wire form of a table; every field is optional on input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TableRepr {
    #[serde(default)]
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Row>,
    #[serde(default, rename = "sortBy")]
    sort_by: usize,
    #[serde(default)]
    title: String,
}

impl TryFrom<Option<TableRepr>> for Table {
    type Error = EpcError;

    fn try_from(repr: Option<TableRepr>) -> Result<Self, Self::Error> {
        let repr = repr.unwrap_or_default();
        let mut table = Table::new(repr.columns).with_title(repr.title);
        if repr.sort_by != 0 {
            table.set_sort_column(repr.sort_by)?;
        }
        table.extend_rows(repr.rows)?;
        Ok(table)
    }
}

impl From<Table> for TableRepr {
    fn from(table: Table) -> Self {
        TableRepr {
            columns: table.columns,
            rows: table.rows,
            sort_by: table.sort_by,
            title: table.title,
        }
    }
}

impl Table {
    /// Table with the given columns and no rows.
    pub fn new(columns: Vec<Column>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
            sort_by: 0,
            title: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Build a table, failing on the first row of the wrong length.
    pub fn from_rows(columns: Vec<Column>, rows: Vec<Row>) -> EpcResult<Self> {
        let mut table = Table::new(columns);
        table.extend_rows(rows)?;
        Ok(table)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append one row. Rejects a row whose length differs from the column count.
    pub fn append_row(&mut self, row: Row) -> EpcResult<()> {
        if row.len() != self.columns.len() {
            return Err(EpcError::wrong_cell_count(self.columns.len(), row.len()));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append rows one by one. The first bad row stops insertion; rows
    /// added before it stay in the table.
    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = Row>) -> EpcResult<()> {
        for row in rows {
            self.append_row(row)?;
        }
        Ok(())
    }

    /// Row at `index`.
    ///
    /// # Panics
    ///
    /// When `index` is out of range. Callers check [`Table::row_count`].
    pub fn row(&self, index: usize) -> &Row {
        assert!(
            index < self.rows.len(),
            "row index {index} out of range ({} rows)",
            self.rows.len()
        );
        &self.rows[index]
    }

    /// Column at `index`.
    ///
    /// # Panics
    ///
    /// When `index` is out of range.
    pub fn column(&self, index: usize) -> &Column {
        assert!(
            index < self.columns.len(),
            "column index {index} out of range ({} columns)",
            self.columns.len()
        );
        &self.columns[index]
    }

    /// Cell at (`row`, `column`); empty when either index is out of range.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .map(|r| r.cell(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Overwrite one cell.
    ///
    /// # Panics
    ///
    /// When either index is out of range.
    pub fn set_cell(&mut self, row: usize, column: usize, value: Cell) {
        assert!(
            column < self.columns.len(),
            "column index {column} out of range ({} columns)",
            self.columns.len()
        );
        let rows = self.rows.len();
        let target = self
            .rows
            .get_mut(row)
            .unwrap_or_else(|| panic!("row index {row} out of range ({rows} rows)"));
        target.0[column] = value;
    }

    fn checked_column(&self, index: usize) -> EpcResult<&Column> {
        self.columns
            .get(index)
            .ok_or_else(|| EpcError::bad_column_index(index, self.columns.len()))
    }

    /// Sum of a summable column.
    pub fn total(&self, index: usize) -> EpcResult<Decimal> {
        let column = self.checked_column(index)?;
        if !column.can_sum() {
            return Err(EpcError::invalid_action("sum", column.kind.display_name()));
        }
        self.column_sum(index)
    }

    /// Average of an averageable column, rounded to 2 decimals. Zero for an
    /// empty table.
    pub fn average(&self, index: usize) -> EpcResult<Decimal> {
        let column = self.checked_column(index)?;
        if !column.can_avg() {
            return Err(EpcError::invalid_action("average", column.kind.display_name()));
        }
        if self.rows.is_empty() {
            return Ok(Decimal::ZERO);
        }
        let count = Decimal::from(self.rows.len());
        Ok(cell::round(self.column_sum(index)? / count, cell::DISPLAY_PLACES))
    }

    /// Sum of a column regardless of its kind. A sum that leaves the decimal
    /// range is an [`EpcError::InvalidInput`].
    pub fn column_sum(&self, index: usize) -> EpcResult<Decimal> {
        self.rows.iter().try_fold(Decimal::ZERO, |sum, row| {
            sum.checked_add(row.cell(index).decimal()).ok_or_else(|| {
                EpcError::invalid_input(
                    self.column(index).name.clone(),
                    row.cell(index).as_str(),
                    "column sum overflows",
                )
            })
        })
    }

    /// Same columns and title, no rows.
    pub fn empty_clone(&self) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: Vec::new(),
            sort_by: 0,
            title: self.title.clone(),
        }
    }

    pub fn sort_column(&self) -> usize {
        self.sort_by
    }

    /// Store the column used by [`Table::sort`].
    pub fn set_sort_column(&mut self, index: usize) -> EpcResult<()> {
        self.checked_column(index)?;
        self.sort_by = index;
        Ok(())
    }

    /// Stable sort by the stored sort column.
    pub fn sort(&mut self) {
        self.order_by(self.sort_by);
    }

    /// Stable sort by `index`. Numeric columns compare by value, text columns
    /// by code point. An invalid index leaves the order untouched.
    pub fn order_by(&mut self, index: usize) {
        let Some(kind) = self.columns.get(index).map(|column| column.kind) else {
            return;
        };
        self.rows
            .sort_by(|a, b| compare_cells(kind, a.cell(index), b.cell(index)));
    }

    /// Deepest header list across columns.
    pub fn header_len(&self) -> usize {
        self.columns
            .iter()
            .map(|column| column.headers.len())
            .max()
            .unwrap_or(0)
    }

    /// Header lines as rows; shorter header lists are padded with empty
    /// cells at the top so the last header sits right above the name.
    pub fn header_rows(&self) -> Vec<Row> {
        let depth = self.header_len();
        (0..depth)
            .map(|line| {
                Row::new(
                    self.columns
                        .iter()
                        .map(|column| {
                            let pad = depth - column.headers.len();
                            if line < pad {
                                Cell::empty()
                            } else {
                                Cell::from(column.headers[line - pad].as_str())
                            }
                        })
                        .collect(),
                )
            })
            .collect()
    }

    /// Copy with column names, headers and cells resolved for `lang`.
    pub fn localized(&self, lang: &str) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.localized(lang)).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| {
                    Row::new(
                        row.iter()
                            .map(|cell| Cell(l10n::localize(cell.as_str(), lang)))
                            .collect(),
                    )
                })
                .collect(),
            sort_by: self.sort_by,
            title: l10n::localize(&self.title, lang),
        }
    }

    /// Join tables side by side.
    ///
    /// The first table is the template: its columns and row count are kept.
    /// Every following table contributes its columns without the first one
    /// (the shared name column). Missing rows are padded with empty cells,
    /// extra rows are dropped. No tables give the empty table.
    pub fn join(tables: &[Table]) -> Table {
        let Some((template, rest)) = tables.split_first() else {
            return Table::default();
        };

        let mut columns = template.columns.clone();
        for table in rest {
            columns.extend(table.columns.iter().skip(1).cloned());
        }

        let rows = template
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut cells = row.0.clone();
                for table in rest {
                    let width = table.columns.len().saturating_sub(1);
                    match table.rows.get(i) {
                        Some(other) => cells.extend(other.iter().skip(1).cloned()),
                        None => cells.extend(std::iter::repeat(Cell::empty()).take(width)),
                    }
                }
                Row(cells)
            })
            .collect();

        Table {
            columns,
            rows,
            sort_by: 0,
            title: template.title.clone(),
        }
    }
}

/// Compare two cells the way [`Table::order_by`] does for `kind`.
pub fn compare_cells(kind: Kind, a: &Cell, b: &Cell) -> Ordering {
    if kind.is_number() {
        a.decimal().cmp(&b.decimal())
    } else {
        a.as_str().cmp(b.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_columns() -> Vec<Column> {
        vec![
            Column::new("Month", Kind::Name),
            Column::new("Temperature", Kind::Temperature),
        ]
    }

    #[test]
    fn test_wrong_cell_count_keeps_earlier_rows() {
        let mut table = Table::new(two_columns());
        let err = table
            .extend_rows(vec![
                Row::from_strs(&["January", "1"]),
                Row::from_strs(&["February"]),
                Row::from_strs(&["March", "3"]),
            ])
            .unwrap_err();
        assert_eq!(err, EpcError::wrong_cell_count(2, 1));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_row_out_of_range_panics() {
        let table = Table::new(two_columns());
        table.row(0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_column_out_of_range_panics() {
        let table = Table::new(two_columns());
        table.column(2);
    }

    #[test]
    fn test_safe_cell_accessor() {
        let row = Row::from_strs(&["a", "b"]);
        assert_eq!(row.cell(5), &Cell::empty());
        assert_eq!(row.cell(usize::MAX), &Cell::empty());
    }

    #[test]
    fn test_average_of_empty_table() {
        let table = Table::new(two_columns());
        assert_eq!(table.average(1).unwrap(), Decimal::ZERO);
        assert!(matches!(
            table.average(0),
            Err(EpcError::InvalidAction { .. })
        ));
        assert!(matches!(
            table.average(7),
            Err(EpcError::BadColumnIndex { index: 7, columns: 2 })
        ));
    }

    #[test]
    fn test_average_rounds() {
        let table = Table::from_rows(
            two_columns(),
            vec![
                Row::from_strs(&["a", "1"]),
                Row::from_strs(&["b", "1"]),
                Row::from_strs(&["c", "2"]),
            ],
        )
        .unwrap();
        assert_eq!(table.average(1).unwrap().to_string(), "1.33");
    }

    #[test]
    fn test_set_sort_column_validates() {
        let mut table = Table::new(two_columns());
        assert!(table.set_sort_column(1).is_ok());
        assert_eq!(table.sort_column(), 1);
        assert!(table.set_sort_column(9).is_err());
        assert_eq!(table.sort_column(), 1);
    }

    #[test]
    fn test_numeric_sort_is_by_value_and_stable() {
        let mut table = Table::from_rows(
            two_columns(),
            vec![
                Row::from_strs(&["a", "10"]),
                Row::from_strs(&["b", "9"]),
                Row::from_strs(&["c", "10"]),
                Row::from_strs(&["d", "x"]),
            ],
        )
        .unwrap();
        table.order_by(1);
        let names: Vec<&str> = table.rows().iter().map(|r| r.cell(0).as_str()).collect();
        assert_eq!(names, vec!["d", "b", "a", "c"]);

        let before = table.clone();
        table.order_by(1);
        assert_eq!(table, before);

        table.order_by(42);
        assert_eq!(table, before);
    }

    #[test]
    fn test_empty_clone() {
        let table =
            Table::from_rows(two_columns(), vec![Row::from_strs(&["a", "1"])]).unwrap();
        let clone = table.empty_clone();
        assert_eq!(clone.columns(), table.columns());
        assert!(clone.is_empty());
    }

    #[test]
    fn test_header_rows_pad_from_top() {
        let table = Table::new(vec![
            Column::new("A", Kind::Name).with_headers(vec!["top".into(), "mid".into()]),
            Column::new("B", Kind::Decimal).with_headers(vec!["only".into()]),
            Column::new("C", Kind::Decimal),
        ]);
        assert_eq!(table.header_len(), 2);
        let rows = table.header_rows();
        assert_eq!(rows[0], Row::from_strs(&["top", "", ""]));
        assert_eq!(rows[1], Row::from_strs(&["mid", "only", ""]));
    }

    #[test]
    fn test_join() {
        let template = Table::from_rows(
            two_columns(),
            vec![Row::from_strs(&["a", "1"]), Row::from_strs(&["b", "2"])],
        )
        .unwrap();
        let longer = Table::from_rows(
            vec![
                Column::new("Name", Kind::Name),
                Column::new("X", Kind::Decimal),
                Column::new("Y", Kind::Decimal),
            ],
            vec![
                Row::from_strs(&["a", "x1", "y1"]),
                Row::from_strs(&["b", "x2", "y2"]),
                Row::from_strs(&["c", "x3", "y3"]),
            ],
        )
        .unwrap();
        let shorter =
            Table::from_rows(two_columns(), vec![Row::from_strs(&["a", "s1"])]).unwrap();

        let joined = Table::join(&[template, longer, shorter]);
        assert_eq!(joined.column_count(), 5);
        assert_eq!(joined.row_count(), 2);
        assert_eq!(joined.row(0), &Row::from_strs(&["a", "1", "x1", "y1", "s1"]));
        assert_eq!(joined.row(1), &Row::from_strs(&["b", "2", "x2", "y2", ""]));
    }

    #[test]
    fn test_join_of_nothing() {
        let joined = Table::join(&[]);
        assert_eq!(joined.column_count(), 0);
        assert_eq!(joined.row_count(), 0);
    }

    #[test]
    fn test_json_roundtrip() {
        let table = Table::from_rows(two_columns(), vec![Row::from_strs(&["a", "1"])])
            .unwrap()
            .with_title("Indoor");
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("\"title\":\"Indoor\""));
        let roundtrip: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, table);
    }

    #[test]
    fn test_json_roundtrip_keeps_sort_column() {
        let mut table = Table::from_rows(two_columns(), vec![Row::from_strs(&["a", "1"])]).unwrap();
        table.set_sort_column(1).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("\"sortBy\":1"));
        let roundtrip: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.sort_column(), 1);
        assert_eq!(roundtrip, table);
    }

    #[test]
    fn test_json_rejects_bad_sort_column() {
        let json = r#"{"columns":[{"name":"Month","kind":"Name"}],"rows":[],"sortBy":3}"#;
        assert!(serde_json::from_str::<Table>(json).is_err());
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        let max = Decimal::MAX.to_string();
        let table = Table::from_rows(
            vec![Column::new("Item", Kind::Name), Column::new("Cost", Kind::Money)],
            vec![Row::from_strs(&["a", &max]), Row::from_strs(&["b", &max])],
        )
        .unwrap();
        assert!(matches!(table.total(1), Err(EpcError::InvalidInput { .. })));
        assert!(matches!(table.column_sum(1), Err(EpcError::InvalidInput { .. })));
    }

    #[test]
    fn test_null_and_empty_object_are_empty_tables() {
        let from_null: Table = serde_json::from_str("null").unwrap();
        let from_object: Table = serde_json::from_str("{}").unwrap();
        assert_eq!(from_null, Table::default());
        assert_eq!(from_object, Table::default());
    }

    #[test]
    fn test_json_rejects_ragged_rows() {
        let json = r#"{"columns":[{"name":"A","kind":"Name"}],"rows":[["a","b"]]}"#;
        assert!(serde_json::from_str::<Table>(json).is_err());
    }

    #[test]
    fn test_localized_table() {
        let table = Table::from_rows(
            vec![Column::new(r#"{"en":"Month","lv":"Mēnesis"}"#, Kind::Name)],
            vec![Row::from_strs(&[r#"{"en":"May","lv":"Maijs"}"#])],
        )
        .unwrap();
        let lv = table.localized("lv");
        assert_eq!(lv.column(0).name, "Mēnesis");
        assert_eq!(lv.row(0).cell(0).as_str(), "Maijs");
    }
}
