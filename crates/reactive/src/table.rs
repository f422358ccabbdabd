//! Table storage abstraction.
//!
//! `TableModel` is the minimal rectangular, row-ordered storage contract the
//! relation engine reads and writes. It carries no notification logic; wrap a
//! model in a `SharedTable` to make it observable.

use alloc::vec;
use alloc::vec::Vec;
use tether_core::{Error, Result, Value};

/// Rectangular, row-ordered cell storage.
pub trait TableModel {
    /// Returns the number of rows.
    fn row_count(&self) -> usize;

    /// Returns the number of columns.
    fn column_count(&self) -> usize;

    /// Returns the value at `(row, column)`, or `None` if out of range.
    fn value(&self, row: usize, column: usize) -> Option<&Value>;

    /// Stores `value` at `(row, column)`.
    ///
    /// Returns `Ok(true)` if the stored value changed.
    fn set_value(&mut self, row: usize, column: usize, value: Value) -> Result<bool>;

    /// Inserts `count` empty rows before `pos` (`pos == row_count()` appends).
    fn insert_rows(&mut self, pos: usize, count: usize) -> Result<()>;

    /// Removes the rows `[pos, pos + count)`.
    fn remove_rows(&mut self, pos: usize, count: usize) -> Result<()>;
}

/// An in-memory table of `Value` cells.
///
/// New cells hold `Value::Null`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariantTable {
    rows: Vec<Vec<Value>>,
    column_count: usize,
}

impl VariantTable {
    /// Creates a table of `rows` x `columns` Null cells.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows: vec![vec![Value::Null; columns]; rows],
            column_count: columns,
        }
    }

    /// Creates a table from row data.
    ///
    /// The column count is the longest row; shorter rows are padded with Null.
    pub fn from_rows<R, V>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut rows: Vec<Vec<Value>> = rows
            .into_iter()
            .map(|r| r.into_iter().map(Into::into).collect())
            .collect();
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(column_count, Value::Null);
        }
        Self { rows, column_count }
    }

    /// Resizes the table, keeping existing cells that remain in range.
    pub fn resize(&mut self, rows: usize, columns: usize) {
        self.rows.resize(rows, vec![Value::Null; columns]);
        for row in &mut self.rows {
            row.resize(columns, Value::Null);
        }
        self.column_count = columns;
    }

    /// Writes `values` down `column`, starting at row 0.
    pub fn populate_column<V: Into<Value>>(
        &mut self,
        column: usize,
        values: impl IntoIterator<Item = V>,
    ) -> Result<()> {
        if column >= self.column_count {
            return Err(Error::column_out_of_range(column, self.column_count));
        }
        for (row, value) in values.into_iter().enumerate() {
            match self.rows.get_mut(row) {
                Some(cells) => cells[column] = value.into(),
                None => return Err(Error::row_out_of_range(row, self.rows.len())),
            }
        }
        Ok(())
    }

    /// Returns the cells of `row`.
    pub fn row(&self, row: usize) -> Option<&[Value]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    fn check_cell(&self, row: usize, column: usize) -> Result<()> {
        if row >= self.rows.len() {
            return Err(Error::row_out_of_range(row, self.rows.len()));
        }
        if column >= self.column_count {
            return Err(Error::column_out_of_range(column, self.column_count));
        }
        Ok(())
    }
}

impl TableModel for VariantTable {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn value(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    fn set_value(&mut self, row: usize, column: usize, value: Value) -> Result<bool> {
        self.check_cell(row, column)?;
        let cell = &mut self.rows[row][column];
        if *cell == value {
            return Ok(false);
        }
        *cell = value;
        Ok(true)
    }

    fn insert_rows(&mut self, pos: usize, count: usize) -> Result<()> {
        if pos > self.rows.len() {
            return Err(Error::row_out_of_range(pos, self.rows.len()));
        }
        let empty = vec![Value::Null; self.column_count];
        self.rows
            .splice(pos..pos, core::iter::repeat(empty).take(count));
        Ok(())
    }

    fn remove_rows(&mut self, pos: usize, count: usize) -> Result<()> {
        let end = pos.saturating_add(count);
        if end > self.rows.len() {
            return Err(Error::row_out_of_range(end.saturating_sub(1), self.rows.len()));
        }
        self.rows.drain(pos..end);
        Ok(())
    }
}
