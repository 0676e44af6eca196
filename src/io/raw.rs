//! Untyped tables as loaded from CSV.
//!
//! A `RawTable` is the source of truth before any semantic interpretation: the
//! pipeline only reads it and derives new values from it. Cells keep the text
//! they were loaded with; numeric/date coercion happens in `normalize`.

use std::fmt;
use std::io::Read;

/// A single untyped cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Build a cell from a raw CSV field. Blank fields become `Empty`.
    pub fn from_field(field: &str) -> Self {
        let field = field.trim().trim_start_matches('\u{feff}');
        if field.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(field.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::from_field(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::from_field(&value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Empty, Into::into)
    }
}

/// One column: an optional header name plus its cells in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    name: Option<String>,
    cells: Vec<Cell>,
}

impl RawColumn {
    /// Header name as loaded (untrimmed); `None` for headerless tables.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// An ordered set of named or positional columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<RawColumn>,
    row_count: usize,
}

impl RawTable {
    /// Build a table from row-major data.
    ///
    /// The table is as wide as the header or the widest row, whichever is
    /// larger; short rows are padded with `Cell::Empty`.
    pub fn from_rows(header: Option<Vec<String>>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(header.as_ref().map(Vec::len))
            .max()
            .unwrap_or(0);
        let row_count = rows.len();

        let mut names = header.unwrap_or_default().into_iter();
        let mut columns: Vec<RawColumn> = (0..width)
            .map(|_| RawColumn {
                name: names.next(),
                cells: Vec::with_capacity(row_count),
            })
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for column in &mut columns {
                column.cells.push(cells.next().unwrap_or(Cell::Empty));
            }
        }

        Self { columns, row_count }
    }

    /// Convenience constructor for a table with a header row.
    pub fn headed<H, S, R, C>(header: H, rows: R) -> Self
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = Vec<C>>,
        C: Into<Cell>,
    {
        let header = header.into_iter().map(Into::into).collect();
        Self::from_rows(Some(header), collect_rows(rows))
    }

    /// Convenience constructor for a positional (headerless) table.
    pub fn headerless<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = Vec<C>>,
        C: Into<Cell>,
    {
        Self::from_rows(None, collect_rows(rows))
    }

    /// Read a CSV stream.
    ///
    /// Row lengths may vary and fields are trimmed. When `has_header` is set,
    /// the first record becomes the column names.
    pub fn read_csv<R: Read>(reader: R, has_header: bool) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let header = if has_header {
            Some(reader.headers()?.iter().map(str::to_string).collect())
        } else {
            None
        };

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::from_field).collect());
        }

        Ok(Self::from_rows(header, rows))
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&RawColumn> {
        self.columns.get(index)
    }

    /// Cell at `(column, row)`; out-of-range positions read as empty.
    pub fn cell(&self, column: usize, row: usize) -> &Cell {
        self.columns
            .get(column)
            .and_then(|c| c.cells.get(row))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Trimmed header names, skipping positional columns.
    pub fn column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(RawColumn::name)
            .map(|n| n.trim().trim_start_matches('\u{feff}').to_string())
            .collect()
    }
}

fn collect_rows<R, C>(rows: R) -> Vec<Vec<Cell>>
where
    R: IntoIterator<Item = Vec<C>>,
    C: Into<Cell>,
{
    rows.into_iter()
        .map(|row| row.into_iter().map(Into::into).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_padded() {
        let table = RawTable::headerless(vec![vec!["2000-01", "0.5", "0.7"], vec!["2000-02"]]);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(2, 1), &Cell::Empty);
        assert_eq!(table.cell(7, 0), &Cell::Empty);
    }

    #[test]
    fn read_csv_with_header_trims_fields() {
        let data = " Year , Country,CO2_EMISSIONS\n2000, US ,10\n2001,CN,\n";
        let table = RawTable::read_csv(data.as_bytes(), true).unwrap();
        assert_eq!(table.column_names(), vec!["Year", "Country", "CO2_EMISSIONS"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, 0), &Cell::Text("US".to_string()));
        assert_eq!(table.cell(2, 1), &Cell::Empty);
    }

    #[test]
    fn read_csv_headerless_keeps_first_row() {
        let data = "2000-01,0.5,0.7\n2000-02,,0.9\n";
        let table = RawTable::read_csv(data.as_bytes(), false).unwrap();
        assert_eq!(table.row_count(), 2);
        assert!(table.column(0).unwrap().name().is_none());
        assert_eq!(table.cell(0, 0), &Cell::Text("2000-01".to_string()));
        assert!(table.cell(1, 1).is_empty());
    }

    #[test]
    fn header_wider_than_rows() {
        let table = RawTable::headed(["a", "b", "c"], vec![vec![1]]);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.cell(0, 0), &Cell::Number(1.0));
        assert_eq!(table.cell(2, 0), &Cell::Empty);
    }
}
