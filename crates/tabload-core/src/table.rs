//! Table type - ordered rows of uniformly named columns

use std::collections::HashSet;

use crate::cell::CellValue;
use crate::error::{Error, Result};

/// A rectangular table
///
/// Every row holds exactly one cell per column, in column order. All
/// mutating operations preserve that invariant, so a `Table` is always safe
/// to serialize or render without further checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with the given column names
    ///
    /// Fails if there are no columns or a name repeats.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(Error::NoColumns);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(Error::DuplicateColumn(name.clone()));
            }
        }

        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Create a table from column names and rows
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<CellValue>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows (the header is not counted)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get a row view by index
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Iterate over all rows
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Raw row cells, in column order
    pub fn records(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Get a cell by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|cells| &cells[col])
    }

    /// Iterate over one column's values
    pub fn column_values(&self, column: &str) -> Result<impl Iterator<Item = &CellValue> + '_> {
        let col = self
            .column_index(column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;
        Ok(self.rows.iter().map(move |cells| &cells[col]))
    }

    /// Append a row
    pub fn push_row(&mut self, cells: Vec<CellValue>) -> Result<()> {
        self.check_len(&cells)?;
        self.rows.push(cells);
        Ok(())
    }

    /// Insert a row before `index` (`index == row_count()` appends)
    pub fn insert_row(&mut self, index: usize, cells: Vec<CellValue>) -> Result<()> {
        if index > self.rows.len() {
            return Err(Error::RowOutOfBounds(index, self.rows.len()));
        }
        self.check_len(&cells)?;
        self.rows.insert(index, cells);
        Ok(())
    }

    /// Remove a row, returning its cells
    pub fn remove_row(&mut self, index: usize) -> Result<Vec<CellValue>> {
        if index >= self.rows.len() {
            return Err(Error::RowOutOfBounds(index, self.rows.len()));
        }
        Ok(self.rows.remove(index))
    }

    /// Replace a single cell
    pub fn set<V: Into<CellValue>>(&mut self, row: usize, column: &str, value: V) -> Result<()> {
        let col = self
            .column_index(column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;
        let len = self.rows.len();
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(Error::RowOutOfBounds(row, len))?;
        cells[col] = value.into();
        Ok(())
    }

    /// Append a column, filling every existing row with `fill`
    pub fn add_column<S: Into<String>>(&mut self, name: S, fill: CellValue) -> Result<()> {
        let values = vec![fill; self.rows.len()];
        self.add_column_with(name, values)
    }

    /// Append a column with one value per existing row
    pub fn add_column_with<S: Into<String>>(&mut self, name: S, values: Vec<CellValue>) -> Result<()> {
        let name = name.into();
        if self.column_index(&name).is_some() {
            return Err(Error::DuplicateColumn(name));
        }
        if values.len() != self.rows.len() {
            return Err(Error::other(format!(
                "Column '{}' has {} values but the table has {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        self.columns.push(name);
        for (cells, value) in self.rows.iter_mut().zip(values) {
            cells.push(value);
        }
        Ok(())
    }

    /// Rename a column
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        let col = self
            .column_index(from)
            .ok_or_else(|| Error::ColumnNotFound(from.to_string()))?;
        if from != to && self.column_index(to).is_some() {
            return Err(Error::DuplicateColumn(to.to_string()));
        }
        self.columns[col] = to.to_string();
        Ok(())
    }

    /// Split into column names and rows
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<CellValue>>) {
        (self.columns, self.rows)
    }

    fn check_len(&self, cells: &[CellValue]) -> Result<()> {
        if cells.len() != self.columns.len() {
            return Err(Error::RowLength {
                expected: self.columns.len(),
                found: cells.len(),
            });
        }
        Ok(())
    }
}

/// Borrowed view of one table row as a column-name → value mapping
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [CellValue],
}

impl<'a> Row<'a> {
    /// Get a cell by column name
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.cells.get(col)
    }

    /// Cells in column order
    pub fn cells(&self) -> &'a [CellValue] {
        self.cells
    }

    /// Iterate `(column, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter())
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Row<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Serializes as an array of row objects, keys in column order
#[cfg(feature = "serde")]
impl serde::Serialize for Table {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        Table::from_rows(
            ["a", "b"],
            vec![
                vec!["1".into(), "2".into()],
                vec!["3".into(), "4".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_duplicates_and_empty() {
        assert_eq!(Table::new(Vec::<String>::new()), Err(Error::NoColumns));
        assert_eq!(
            Table::new(["a", "a"]),
            Err(Error::DuplicateColumn("a".into()))
        );
    }

    #[test]
    fn test_push_row_enforces_width() {
        let mut table = sample();
        assert_eq!(
            table.push_row(vec!["x".into()]),
            Err(Error::RowLength {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_row_mapping() {
        let table = sample();
        let row = table.row(1).unwrap();
        assert_eq!(row.get("a"), Some(&CellValue::string("3")));
        assert_eq!(row.get("missing"), None);

        let pairs: Vec<(&str, String)> = row.iter().map(|(k, v)| (k, v.to_string())).collect();
        assert_eq!(pairs, vec![("a", "3".to_string()), ("b", "4".to_string())]);
    }

    #[test]
    fn test_edits_keep_shape() {
        let mut table = sample();
        table.set(0, "b", 20.0).unwrap();
        table.insert_row(0, vec![CellValue::Empty, true.into()]).unwrap();
        table.add_column("c", CellValue::Empty).unwrap();
        let removed = table.remove_row(2).unwrap();

        assert_eq!(removed, vec!["3".into(), "4".into(), CellValue::Empty]);
        assert_eq!(table.columns(), &["a", "b", "c"]);
        assert_eq!(table.get(1, "b"), Some(&CellValue::Number(20.0)));
        assert!(table.records().iter().all(|r| r.len() == 3));
    }

    #[test]
    fn test_rename_column() {
        let mut table = sample();
        table.rename_column("a", "alpha").unwrap();
        assert_eq!(table.column_index("alpha"), Some(0));
        assert_eq!(
            table.rename_column("alpha", "b"),
            Err(Error::DuplicateColumn("b".into()))
        );
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut table = sample();
        assert_eq!(table.set(5, "a", 1.0), Err(Error::RowOutOfBounds(5, 2)));
        assert_eq!(
            table.set(0, "zz", 1.0),
            Err(Error::ColumnNotFound("zz".into()))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_rows_as_objects() {
        let mut table = sample();
        table.set(1, "b", CellValue::Empty).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[{"a":"1","b":"2"},{"a":"3","b":null}]"#);
    }
}
