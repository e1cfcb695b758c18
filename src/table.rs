use std::fmt;
use std::sync::Arc;

use allocative::Allocative;
use tracing::{debug, trace};

use crate::column::{Column, ColumnDescriptor, validate_name};
use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::value::{Timestamp, Value};

/// A typed, mutable columnar table.
///
/// Columns and rows are addressed by zero-based index. Removing a column or a row
/// shifts every later column or row down by one. Every operation validates its
/// arguments (column index first, then row index) before touching any state.
///
/// # Example
/// ```
/// use tablecore::{DataType, Table};
///
/// let mut table = Table::new();
/// table.add_column(DataType::Text, "name").unwrap();
/// table.add_column(DataType::Int, "age").unwrap();
///
/// table.add(vec!["Alice".into(), 30.into()]).unwrap();
/// table.add(vec!["Bob".into(), 25.into()]).unwrap();
///
/// assert_eq!(table.find_first_long(1, 25).unwrap(), Some(1));
/// assert_eq!(table.get_string(0, 0).unwrap().as_deref(), Some("Alice"));
/// ```
#[derive(Debug, Clone, Default, Allocative)]
pub struct Table {
    name: Option<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Creates an empty, unnamed table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table carrying `name`. Table names have no length limit.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Heap bytes owned by the table's columns and indexes.
    pub fn memory_usage(&self) -> usize {
        allocative::size_of_unique_allocated_data(self)
    }

    fn column(&self, index: usize) -> Result<&Column> {
        self.columns
            .get(index)
            .ok_or_else(|| Error::column_out_of_range(index, self.columns.len()))
    }

    fn column_mut(&mut self, index: usize) -> Result<&mut Column> {
        let count = self.columns.len();
        self.columns
            .get_mut(index)
            .ok_or_else(|| Error::column_out_of_range(index, count))
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.row_count {
            return Err(Error::row_out_of_range(row, self.row_count));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Schema
    // ─────────────────────────────────────────────────────────────

    /// Appends a non-nullable column and returns its index.
    pub fn add_column(&mut self, data_type: DataType, name: &str) -> Result<usize> {
        self.add_column_with_nullability(data_type, name, false)
    }

    /// Appends a column and returns its index.
    ///
    /// Existing rows are backfilled with null if the column is nullable and with the
    /// type's default value otherwise.
    ///
    /// # Errors
    /// Returns [Error::InvalidName] if `name` is longer than
    /// [crate::MAX_COLUMN_NAME_LEN] bytes.
    pub fn add_column_with_nullability(
        &mut self,
        data_type: DataType,
        name: &str,
        nullable: bool,
    ) -> Result<usize> {
        let mut column = Column::new(ColumnDescriptor::new(name, data_type, nullable)?);
        column.push_empty(self.row_count);
        self.columns.push(column);
        debug!(name, %data_type, nullable, "column added");
        Ok(self.columns.len() - 1)
    }

    /// Removes a column together with its search index.
    pub fn remove_column(&mut self, index: usize) -> Result<()> {
        self.column(index)?;
        let column = self.columns.remove(index);
        debug!(index, name = column.name(), "column removed");
        Ok(())
    }

    pub fn rename_column(&mut self, index: usize, new_name: &str) -> Result<()> {
        self.column(index)?;
        validate_name(new_name)?;
        let column = self.column_mut(index)?;
        debug!(index, from = column.name(), to = new_name, "column renamed");
        column.descriptor.name = new_name.to_owned();
        Ok(())
    }

    pub fn column_name(&self, index: usize) -> Result<&str> {
        Ok(self.column(index)?.name())
    }

    pub fn column_type(&self, index: usize) -> Result<DataType> {
        Ok(self.column(index)?.data_type())
    }

    pub fn column_descriptor(&self, index: usize) -> Result<&ColumnDescriptor> {
        Ok(&self.column(index)?.descriptor)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Index of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name() == name)
    }

    pub fn is_column_nullable(&self, index: usize) -> Result<bool> {
        Ok(self.column(index)?.is_nullable())
    }

    /// Allows null in a column. Existing values are untouched; idempotent.
    pub fn convert_column_to_nullable(&mut self, index: usize) -> Result<()> {
        let column = self.column_mut(index)?;
        if !column.is_nullable() {
            debug!(index, name = column.name(), "column converted to nullable");
        }
        column.set_nullable(true);
        Ok(())
    }

    /// Forbids null in a column.
    ///
    /// Every null cell is replaced with the type's default first: `""` for strings,
    /// empty bytes for binary, the epoch for dates, zero for numbers and `false` for
    /// booleans. This cannot be undone.
    pub fn convert_column_to_not_nullable(&mut self, index: usize) -> Result<()> {
        let column = self.column_mut(index)?;
        if column.is_nullable() {
            debug!(index, name = column.name(), "column converted to not nullable");
        }
        column.set_nullable(false);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Search index
    // ─────────────────────────────────────────────────────────────

    /// Builds a search index over a column. Idempotent.
    ///
    /// # Errors
    /// Returns [Error::InvalidArgument] unless the column is of type
    /// [DataType::Text], [DataType::Int], [DataType::Bool] or [DataType::Date].
    pub fn add_search_index(&mut self, index: usize) -> Result<()> {
        self.column_mut(index)?.add_search_index()
    }

    /// Drops a column's search index. Not an error if there is none.
    pub fn remove_search_index(&mut self, index: usize) -> Result<()> {
        self.column_mut(index)?.remove_search_index();
        Ok(())
    }

    pub fn has_search_index(&self, index: usize) -> Result<bool> {
        Ok(self.column(index)?.has_search_index())
    }

    // ─────────────────────────────────────────────────────────────
    // Rows
    // ─────────────────────────────────────────────────────────────

    /// Appends one row of empty cells and returns its index.
    pub fn add_empty_row(&mut self) -> Result<usize> {
        self.add_empty_rows(1)
    }

    /// Appends `n` rows of empty cells (null or default, per column) and returns the
    /// index of the first one.
    ///
    /// # Errors
    /// Returns [Error::IndexOutOfRange] if the table has no columns.
    pub fn add_empty_rows(&mut self, n: usize) -> Result<usize> {
        if self.columns.is_empty() {
            return Err(Error::column_out_of_range(0, 0));
        }
        let first = self.row_count;
        for column in &mut self.columns {
            column.push_empty(n);
        }
        self.row_count += n;
        trace!(first, n, "empty rows added");
        Ok(first)
    }

    /// Appends a row given one value per column and returns its index.
    ///
    /// # Errors
    /// - [Error::IndexOutOfRange] if the table has no columns.
    /// - [Error::InvalidArgument] if the number of values differs from the number of
    ///   columns, or a value is null in a non-nullable column.
    /// - [Error::TypeMismatch] if a value does not match its column's type.
    pub fn add(&mut self, values: Vec<Value>) -> Result<usize> {
        if self.columns.is_empty() {
            return Err(Error::column_out_of_range(0, 0));
        }
        if values.len() != self.columns.len() {
            return Err(Error::InvalidArgument(format!(
                "row has {} values but the table has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        // validate everything before writing anything
        for (column, value) in self.columns.iter().zip(&values) {
            column.check(value)?;
        }
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(value)?;
        }
        self.row_count += 1;
        trace!(row = self.row_count - 1, "row added");
        Ok(self.row_count - 1)
    }

    /// Removes a row. Every later row shifts down by one.
    pub fn remove(&mut self, row: usize) -> Result<()> {
        self.check_row(row)?;
        for column in &mut self.columns {
            column.remove(row)?;
        }
        self.row_count -= 1;
        trace!(row, "row removed");
        Ok(())
    }

    pub fn remove_last(&mut self) -> Result<()> {
        match self.row_count.checked_sub(1) {
            Some(last) => self.remove(last),
            None => Err(Error::row_out_of_range(0, 0)),
        }
    }

    /// Removes every row, keeping the columns and their search indexes.
    pub fn clear(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
        self.row_count = 0;
        debug!("table cleared");
    }

    /// Returns all the values of a row, in column order.
    pub fn get_row(&self, row_idx: usize) -> Result<Vec<Value>> {
        self.check_row(row_idx)?;
        self.columns
            .iter()
            .map(|col| {
                col.get(row_idx)
                    .ok_or_else(|| Error::row_out_of_range(row_idx, self.row_count))
            })
            .collect()
    }

    // ─────────────────────────────────────────────────────────────
    // Cells
    // ─────────────────────────────────────────────────────────────

    pub fn get(&self, column: usize, row: usize) -> Result<Value> {
        let col = self.column(column)?;
        self.check_row(row)?;
        col.get(row)
            .ok_or_else(|| Error::row_out_of_range(row, self.row_count))
    }

    /// Writes a cell.
    ///
    /// # Errors
    /// - [Error::IndexOutOfRange] for a bad column, then for a bad row.
    /// - [Error::InvalidArgument] for null in a non-nullable column.
    /// - [Error::TypeMismatch] if the value does not match the column type.
    pub fn set(&mut self, column: usize, row: usize, value: Value) -> Result<()> {
        self.column(column)?;
        self.check_row(row)?;
        self.column_mut(column)?.set(row, value)
    }

    pub fn is_null(&self, column: usize, row: usize) -> Result<bool> {
        let col = self.column(column)?;
        self.check_row(row)?;
        col.is_null(row)
    }

    pub fn set_null(&mut self, column: usize, row: usize) -> Result<()> {
        self.set(column, row, Value::Null)
    }

    /// Reads a boolean cell; null reads as `false`.
    pub fn get_bool(&self, column: usize, row: usize) -> Result<bool> {
        Ok(self.column(column)?.get_bool(row)?.unwrap_or_default())
    }

    /// Reads an integer cell; null reads as `0`.
    pub fn get_long(&self, column: usize, row: usize) -> Result<i64> {
        Ok(self.column(column)?.get_long(row)?.unwrap_or_default())
    }

    /// Reads a float cell; null reads as `0.0`.
    pub fn get_float(&self, column: usize, row: usize) -> Result<f32> {
        Ok(self.column(column)?.get_float(row)?.unwrap_or_default())
    }

    /// Reads a double cell; null reads as `0.0`.
    pub fn get_double(&self, column: usize, row: usize) -> Result<f64> {
        Ok(self.column(column)?.get_double(row)?.unwrap_or_default())
    }

    pub fn get_string(&self, column: usize, row: usize) -> Result<Option<Arc<str>>> {
        self.column(column)?.get_string(row)
    }

    pub fn get_binary(&self, column: usize, row: usize) -> Result<Option<Arc<[u8]>>> {
        self.column(column)?.get_binary(row)
    }

    pub fn get_date(&self, column: usize, row: usize) -> Result<Option<Timestamp>> {
        self.column(column)?.get_date(row)
    }

    pub fn set_bool(&mut self, column: usize, row: usize, value: bool) -> Result<()> {
        self.set(column, row, Value::Bool(value))
    }

    pub fn set_long(&mut self, column: usize, row: usize, value: i64) -> Result<()> {
        self.set(column, row, Value::Int(value))
    }

    pub fn set_float(&mut self, column: usize, row: usize, value: f32) -> Result<()> {
        self.set(column, row, Value::Float(value))
    }

    pub fn set_double(&mut self, column: usize, row: usize, value: f64) -> Result<()> {
        self.set(column, row, Value::Double(value))
    }

    /// Writes a string cell; `None` writes null.
    pub fn set_string(&mut self, column: usize, row: usize, value: Option<&str>) -> Result<()> {
        self.set(column, row, value.into())
    }

    /// Writes a binary cell; `None` writes null.
    pub fn set_binary(&mut self, column: usize, row: usize, value: Option<&[u8]>) -> Result<()> {
        self.set(column, row, value.into())
    }

    /// Writes a date cell; `None` writes null.
    pub fn set_date(
        &mut self,
        column: usize,
        row: usize,
        value: Option<Timestamp>,
    ) -> Result<()> {
        self.set(column, row, value.into())
    }

    // ─────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────

    /// Returns the lowest row whose cell equals `key`, using the column's search
    /// index when it has one.
    ///
    /// # Errors
    /// Returns [Error::InvalidArgument] for a null key, even on a nullable column;
    /// use [Table::find_all_null] to look for null cells.
    pub fn find_first(&self, column: usize, key: &Value) -> Result<Option<usize>> {
        self.column(column)?.find_first(key)
    }

    /// Returns every row whose cell equals `key`, ascending.
    pub fn find_all(&self, column: usize, key: &Value) -> Result<Vec<usize>> {
        self.column(column)?.find_all(key)
    }

    pub fn count(&self, column: usize, key: &Value) -> Result<usize> {
        self.column(column)?.count(key)
    }

    pub fn find_all_null(&self, column: usize) -> Result<Vec<usize>> {
        Ok(self.column(column)?.find_all_null())
    }

    pub fn find_first_bool(&self, column: usize, value: bool) -> Result<Option<usize>> {
        self.find_first(column, &Value::Bool(value))
    }

    pub fn find_first_long(&self, column: usize, value: i64) -> Result<Option<usize>> {
        self.find_first(column, &Value::Int(value))
    }

    pub fn find_first_float(&self, column: usize, value: f32) -> Result<Option<usize>> {
        self.find_first(column, &Value::Float(value))
    }

    pub fn find_first_double(&self, column: usize, value: f64) -> Result<Option<usize>> {
        self.find_first(column, &Value::Double(value))
    }

    pub fn find_first_string(&self, column: usize, value: &str) -> Result<Option<usize>> {
        self.find_first(column, &Value::from(value))
    }

    pub fn find_first_date(&self, column: usize, value: Timestamp) -> Result<Option<usize>> {
        self.find_first(column, &Value::Date(value))
    }

    pub fn find_all_bool(&self, column: usize, value: bool) -> Result<Vec<usize>> {
        self.find_all(column, &Value::Bool(value))
    }

    pub fn find_all_long(&self, column: usize, value: i64) -> Result<Vec<usize>> {
        self.find_all(column, &Value::Int(value))
    }

    pub fn find_all_float(&self, column: usize, value: f32) -> Result<Vec<usize>> {
        self.find_all(column, &Value::Float(value))
    }

    pub fn find_all_double(&self, column: usize, value: f64) -> Result<Vec<usize>> {
        self.find_all(column, &Value::Double(value))
    }

    pub fn find_all_string(&self, column: usize, value: &str) -> Result<Vec<usize>> {
        self.find_all(column, &Value::from(value))
    }

    pub fn find_all_date(&self, column: usize, value: Timestamp) -> Result<Vec<usize>> {
        self.find_all(column, &Value::Date(value))
    }

    // ─────────────────────────────────────────────────────────────
    // Aggregates. Null cells are skipped; `None` means no non-null cell.
    // ─────────────────────────────────────────────────────────────

    pub fn maximum_long(&self, column: usize) -> Result<Option<i64>> {
        Ok(self.column(column)?.longs()?.max())
    }

    pub fn minimum_long(&self, column: usize) -> Result<Option<i64>> {
        Ok(self.column(column)?.longs()?.min())
    }

    pub fn maximum_float(&self, column: usize) -> Result<Option<f32>> {
        Ok(self.column(column)?.floats()?.reduce(f32::max))
    }

    pub fn minimum_float(&self, column: usize) -> Result<Option<f32>> {
        Ok(self.column(column)?.floats()?.reduce(f32::min))
    }

    pub fn maximum_double(&self, column: usize) -> Result<Option<f64>> {
        Ok(self.column(column)?.doubles()?.reduce(f64::max))
    }

    pub fn minimum_double(&self, column: usize) -> Result<Option<f64>> {
        Ok(self.column(column)?.doubles()?.reduce(f64::min))
    }

    pub fn maximum_date(&self, column: usize) -> Result<Option<Timestamp>> {
        Ok(self.column(column)?.dates()?.max())
    }

    pub fn minimum_date(&self, column: usize) -> Result<Option<Timestamp>> {
        Ok(self.column(column)?.dates()?.min())
    }

    /// Sum of an integer column, wrapping on overflow.
    pub fn sum_long(&self, column: usize) -> Result<i64> {
        Ok(self.column(column)?.longs()?.fold(0, i64::wrapping_add))
    }

    pub fn sum_float(&self, column: usize) -> Result<f64> {
        Ok(self.column(column)?.floats()?.map(f64::from).sum())
    }

    pub fn sum_double(&self, column: usize) -> Result<f64> {
        Ok(self.column(column)?.doubles()?.sum())
    }

    pub fn average_long(&self, column: usize) -> Result<Option<f64>> {
        Ok(average(self.column(column)?.longs()?.map(|v| v as f64)))
    }

    pub fn average_float(&self, column: usize) -> Result<Option<f64>> {
        Ok(average(self.column(column)?.floats()?.map(f64::from)))
    }

    pub fn average_double(&self, column: usize) -> Result<Option<f64>> {
        Ok(average(self.column(column)?.doubles()?))
    }
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("The Table ")?;
        if let Some(name) = self.name().filter(|n| !n.is_empty()) {
            write!(f, "{name} ")?;
        }
        write!(
            f,
            "contains {} columns: {}. And {} rows.",
            self.column_count(),
            self.column_names().join(", "),
            self.row_count
        )
    }
}
