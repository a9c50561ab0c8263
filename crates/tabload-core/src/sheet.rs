//! Raw worksheet grid

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::header::{is_blank_header, normalize_headers};
use crate::table::Table;

/// A worksheet as read from a workbook: named, possibly ragged rows of cells
///
/// Workbook readers fill the grid sparsely with [`Sheet::set`]; the grid
/// only grows as far as the last non-empty cell, so trailing blank rows and
/// columns never appear.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create an empty sheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows read so far (0-based, ragged)
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of rows up to the last non-empty one
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get a cell value (Empty outside the grid)
    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Set a cell value; empty values never grow the grid
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if value.is_empty() {
            if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
                *cell = CellValue::Empty;
            }
            return;
        }

        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }

    /// Turn the grid into a [`Table`]
    ///
    /// The first `skip_rows` rows are discarded, the next row becomes the
    /// header and the remaining rows become data. Short rows are padded with
    /// [`CellValue::Empty`]; data wider than the header gets `Unnamed: i`
    /// columns.
    pub fn into_table(self, skip_rows: usize) -> Result<Table> {
        let mut rows = self.rows.into_iter().skip(skip_rows);
        let header = rows.next().ok_or(Error::MissingHeader)?;
        let data: Vec<Vec<CellValue>> = rows.collect();

        let raw_header: Vec<String> = header.iter().map(ToString::to_string).collect();
        if is_blank_header(&raw_header) {
            return Err(Error::MissingHeader);
        }

        let width = data
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(raw_header.len()))
            .max()
            .unwrap_or(0);

        let mut padded_header = raw_header;
        padded_header.resize(width, String::new());
        let columns = normalize_headers(&padded_header);

        let rows = data
            .into_iter()
            .map(|mut cells| {
                cells.resize(width, CellValue::Empty);
                cells
            })
            .collect();

        Table::from_rows(columns, rows)
    }
}
