use std::mem;
use std::sync::Arc;

use allocative::{Allocative, Key, Visitor};
use bitvec::prelude::*;
use tracing::debug;

use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::search_index::{IndexKey, SearchIndex};
use crate::value::{Timestamp, Value};

/// Longest accepted column name, in bytes.
pub const MAX_COLUMN_NAME_LEN: usize = 63;

/// Column metadata: everything about a column except its cells.
#[derive(Debug, Clone, PartialEq, Eq, Allocative)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    /// Mirrors whether the owning [Column] currently carries a search index.
    pub indexed: bool,
}

impl ColumnDescriptor {
    /// # Errors
    /// Returns [Error::InvalidName] if `name` is longer than [MAX_COLUMN_NAME_LEN] bytes.
    pub fn new(name: &str, data_type: DataType, nullable: bool) -> Result<Self> {
        validate_name(name)?;
        Ok(Self {
            name: name.to_owned(),
            data_type,
            nullable,
            indexed: false,
        })
    }
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.len() > MAX_COLUMN_NAME_LEN {
        return Err(Error::InvalidName {
            name: name.to_owned(),
            max: MAX_COLUMN_NAME_LEN,
        });
    }
    Ok(())
}

/// Physical storage for column data.
/// Each variant wraps a collection of a specific type to ensure contiguous memory
/// allocation (columnar storage).
#[derive(Debug, Clone)]
pub enum ColumnData {
    /// Compact bit-vector for boolean values.
    Bool(BitVec),
    Int(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    /// Reference-counted strings, cheap to hand out as [Value::Text].
    Text(Vec<Arc<str>>),
    Binary(Vec<Arc<[u8]>>),
    Date(Vec<Timestamp>),
}

impl ColumnData {
    pub fn new(data_type: DataType) -> Self {
        match data_type {
            DataType::Bool => ColumnData::Bool(bitvec!()),
            DataType::Int => ColumnData::Int(vec![]),
            DataType::Float => ColumnData::Float(vec![]),
            DataType::Double => ColumnData::Double(vec![]),
            DataType::Text => ColumnData::Text(vec![]),
            DataType::Binary => ColumnData::Binary(vec![]),
            DataType::Date => ColumnData::Date(vec![]),
        }
    }

    /// Appends `n` default values.
    fn extend_default(&mut self, n: usize) {
        match self {
            ColumnData::Bool(v) => v.resize(v.len() + n, false),
            ColumnData::Int(v) => v.resize(v.len() + n, 0),
            ColumnData::Float(v) => v.resize(v.len() + n, 0.0),
            ColumnData::Double(v) => v.resize(v.len() + n, 0.0),
            ColumnData::Text(v) => v.resize(v.len() + n, Arc::from("")),
            ColumnData::Binary(v) => v.resize(v.len() + n, Arc::from(&[][..])),
            ColumnData::Date(v) => v.resize(v.len() + n, Timestamp::EPOCH),
        }
    }

    /// Overwrites a cell with the variant's default value.
    fn reset(&mut self, row: usize) {
        match self {
            ColumnData::Bool(col) => col.set(row, false),
            ColumnData::Int(col) => col[row] = 0,
            ColumnData::Float(col) => col[row] = 0.0,
            ColumnData::Double(col) => col[row] = 0.0,
            ColumnData::Text(col) => col[row] = Arc::from(""),
            ColumnData::Binary(col) => col[row] = Arc::from(&[][..]),
            ColumnData::Date(col) => col[row] = Timestamp::EPOCH,
        }
    }

    /// Appends a non-null value. Hands the value back if its type does not fit.
    fn push(&mut self, value: Value) -> std::result::Result<(), Value> {
        match (self, value) {
            (ColumnData::Bool(col), Value::Bool(v)) => col.push(v),
            (ColumnData::Int(col), Value::Int(v)) => col.push(v),
            (ColumnData::Float(col), Value::Float(v)) => col.push(v),
            (ColumnData::Double(col), Value::Double(v)) => col.push(v),
            (ColumnData::Text(col), Value::Text(v)) => col.push(v),
            (ColumnData::Binary(col), Value::Binary(v)) => col.push(v),
            (ColumnData::Date(col), Value::Date(v)) => col.push(v),
            (_, value) => return Err(value),
        }
        Ok(())
    }

    /// Overwrites a cell with a non-null value. Hands the value back if its type does
    /// not fit.
    fn set(&mut self, row: usize, value: Value) -> std::result::Result<(), Value> {
        match (self, value) {
            (ColumnData::Bool(col), Value::Bool(v)) => col.set(row, v),
            (ColumnData::Int(col), Value::Int(v)) => col[row] = v,
            (ColumnData::Float(col), Value::Float(v)) => col[row] = v,
            (ColumnData::Double(col), Value::Double(v)) => col[row] = v,
            (ColumnData::Text(col), Value::Text(v)) => col[row] = v,
            (ColumnData::Binary(col), Value::Binary(v)) => col[row] = v,
            (ColumnData::Date(col), Value::Date(v)) => col[row] = v,
            (_, value) => return Err(value),
        }
        Ok(())
    }

    fn get(&self, row: usize) -> Value {
        match self {
            ColumnData::Bool(col) => Value::Bool(col[row]),
            ColumnData::Int(col) => Value::Int(col[row]),
            ColumnData::Float(col) => Value::Float(col[row]),
            ColumnData::Double(col) => Value::Double(col[row]),
            ColumnData::Text(col) => Value::Text(Arc::clone(&col[row])),
            ColumnData::Binary(col) => Value::Binary(Arc::clone(&col[row])),
            ColumnData::Date(col) => Value::Date(col[row]),
        }
    }

    fn remove(&mut self, row: usize) {
        match self {
            ColumnData::Bool(col) => {
                col.remove(row);
            }
            ColumnData::Int(col) => {
                col.remove(row);
            }
            ColumnData::Float(col) => {
                col.remove(row);
            }
            ColumnData::Double(col) => {
                col.remove(row);
            }
            ColumnData::Text(col) => {
                col.remove(row);
            }
            ColumnData::Binary(col) => {
                col.remove(row);
            }
            ColumnData::Date(col) => {
                col.remove(row);
            }
        }
    }

    fn clear(&mut self) {
        match self {
            ColumnData::Bool(col) => col.clear(),
            ColumnData::Int(col) => col.clear(),
            ColumnData::Float(col) => col.clear(),
            ColumnData::Double(col) => col.clear(),
            ColumnData::Text(col) => col.clear(),
            ColumnData::Binary(col) => col.clear(),
            ColumnData::Date(col) => col.clear(),
        }
    }
}

fn visit_bits(bits: &BitVec, name: &'static str, visitor: &mut Visitor<'_>) {
    let mut heap = visitor.enter_unique(Key::new(name), mem::size_of::<usize>());
    heap.visit_simple(Key::new("words"), mem::size_of_val(bits.as_raw_slice()));
    heap.exit();
}

impl Allocative for ColumnData {
    fn visit<'a, 'b: 'a>(&self, visitor: &'a mut Visitor<'b>) {
        let mut visitor = visitor.enter_self_sized::<Self>();
        match self {
            ColumnData::Bool(col) => visit_bits(col, "Bool", &mut visitor),
            ColumnData::Int(col) => visitor.visit_field(Key::new("Int"), col),
            ColumnData::Float(col) => visitor.visit_field(Key::new("Float"), col),
            ColumnData::Double(col) => visitor.visit_field(Key::new("Double"), col),
            ColumnData::Text(col) => visitor.visit_field(Key::new("Text"), col),
            ColumnData::Binary(col) => visitor.visit_field(Key::new("Binary"), col),
            ColumnData::Date(col) => visitor.visit_field(Key::new("Date"), col),
        }
        visitor.exit();
    }
}

/// Keeps the rows of `values` that are non-null and equal to `key`.
fn matching<'a, T: PartialEq + 'a>(
    values: impl Iterator<Item = T> + 'a,
    nulls: &'a BitSlice,
    key: T,
) -> impl Iterator<Item = usize> + 'a {
    values
        .zip(nulls.iter().by_vals())
        .enumerate()
        .filter_map(move |(row, (value, is_null))| (!is_null && value == key).then_some(row))
}

fn non_null<'a, T: 'a>(
    values: impl Iterator<Item = T> + 'a,
    nulls: &'a BitSlice,
) -> impl Iterator<Item = T> + 'a {
    values
        .zip(nulls.iter().by_vals())
        .filter_map(|(value, is_null)| (!is_null).then_some(value))
}

/// A single column of a table: its descriptor, its cells, a nullability tracker and
/// an optional search index.
#[derive(Debug, Clone)]
pub struct Column {
    pub descriptor: ColumnDescriptor,
    /// The actual values stored in the column.
    pub data: ColumnData,
    /// A bitmap where a `true` bit indicates that the value at that index is `NULL`.
    pub null_bitmap: BitVec,
    index: Option<SearchIndex>,
}

impl Allocative for Column {
    fn visit<'a, 'b: 'a>(&self, visitor: &'a mut Visitor<'b>) {
        let mut visitor = visitor.enter_self_sized::<Self>();
        visitor.visit_field(Key::new("descriptor"), &self.descriptor);
        visitor.visit_field(Key::new("data"), &self.data);
        visit_bits(&self.null_bitmap, "null_bitmap", &mut visitor);
        visitor.visit_field(Key::new("index"), &self.index);
        visitor.exit();
    }
}

impl Column {
    /// Creates a new, empty column from its descriptor.
    pub fn new(descriptor: ColumnDescriptor) -> Self {
        let data = ColumnData::new(descriptor.data_type);
        Self {
            descriptor,
            data,
            null_bitmap: bitvec!(),
            index: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn data_type(&self) -> DataType {
        self.descriptor.data_type
    }

    pub fn is_nullable(&self) -> bool {
        self.descriptor.nullable
    }

    /// Returns the number of rows currently stored in the column.
    pub fn len(&self) -> usize {
        self.null_bitmap.len()
    }

    /// Returns true if there is no row in the column, else false.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn mismatch(&self, actual: DataType) -> Error {
        Error::TypeMismatch {
            column: self.descriptor.name.clone(),
            expected: self.data_type(),
            actual,
        }
    }

    fn expect_type(&self, actual: DataType) -> Result<()> {
        if self.data_type() != actual {
            return Err(self.mismatch(actual));
        }
        Ok(())
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.len() {
            return Err(Error::row_out_of_range(row, self.len()));
        }
        Ok(())
    }

    /// Checks that `value` may be written into this column.
    ///
    /// # Errors
    /// - [Error::InvalidArgument] for [Value::Null] on a non-nullable column.
    /// - [Error::TypeMismatch] if the value's type differs from the column's type.
    pub fn check(&self, value: &Value) -> Result<()> {
        match value.data_type() {
            None if !self.is_nullable() => Err(Error::InvalidArgument(format!(
                "column {:?} is not nullable",
                self.descriptor.name
            ))),
            None => Ok(()),
            Some(actual) => self.expect_type(actual),
        }
    }

    fn key_at(&self, row: usize) -> Option<IndexKey> {
        if self.null_bitmap[row] {
            return None;
        }
        IndexKey::from_value(&self.data.get(row))
    }

    /// Appends a new value to the end of the column.
    ///
    /// # Errors
    /// See [Column::check].
    ///
    /// # Example
    /// ```
    /// # use tablecore::column::{Column, ColumnDescriptor};
    /// # use tablecore::{DataType, Value};
    /// let descriptor = ColumnDescriptor::new("age", DataType::Int, true).unwrap();
    /// let mut col = Column::new(descriptor);
    /// col.push(Value::Int(30)).unwrap();
    /// col.push(Value::Null).unwrap();
    ///
    /// assert_eq!(col.len(), 2);
    /// assert!(col.get(1).unwrap().is_null());
    /// ```
    pub fn push(&mut self, value: Value) -> Result<()> {
        self.check(&value)?;
        let row = self.len();
        if value.is_null() {
            // placeholder keeps the data vector aligned with the bitmap
            self.data.extend_default(1);
            self.null_bitmap.push(true);
            return Ok(());
        }

        let key = self.index.as_ref().and_then(|_| IndexKey::from_value(&value));
        self.data
            .push(value)
            .map_err(|value| self.mismatch(value.data_type().unwrap_or(self.data_type())))?;
        self.null_bitmap.push(false);
        if let (Some(index), Some(key)) = (self.index.as_mut(), key) {
            index.insert(key, row);
        }
        Ok(())
    }

    /// Appends `n` empty cells: null if the column is nullable, the type's default
    /// otherwise.
    pub fn push_empty(&mut self, n: usize) {
        let start = self.len();
        let nullable = self.is_nullable();
        self.data.extend_default(n);
        self.null_bitmap.resize(start + n, nullable);

        if nullable {
            return;
        }
        let Some(key) = IndexKey::from_value(&Value::default_for(self.data_type())) else {
            return;
        };
        if let Some(index) = self.index.as_mut() {
            for row in start..start + n {
                index.insert(key.clone(), row);
            }
        }
    }

    /// Retrieves the value at the specified row index.
    ///
    /// Returns `None` if the index is out of bounds and `Some(Value::Null)` for a null
    /// cell.
    pub fn get(&self, row: usize) -> Option<Value> {
        if row >= self.len() {
            return None;
        }
        if self.null_bitmap[row] {
            return Some(Value::Null);
        }
        Some(self.data.get(row))
    }

    pub fn is_null(&self, row: usize) -> Result<bool> {
        self.check_row(row)?;
        Ok(self.null_bitmap[row])
    }

    /// Reads a cell through a typed accessor. Null cells yield `None`.
    fn get_typed<T>(
        &self,
        data_type: DataType,
        row: usize,
        read: impl FnOnce(&ColumnData) -> Option<T>,
    ) -> Result<Option<T>> {
        self.expect_type(data_type)?;
        self.check_row(row)?;
        if self.null_bitmap[row] {
            return Ok(None);
        }
        read(&self.data).ok_or_else(|| self.mismatch(data_type)).map(Some)
    }

    pub fn get_bool(&self, row: usize) -> Result<Option<bool>> {
        self.get_typed(DataType::Bool, row, |data| match data {
            ColumnData::Bool(col) => Some(col[row]),
            _ => None,
        })
    }

    pub fn get_long(&self, row: usize) -> Result<Option<i64>> {
        self.get_typed(DataType::Int, row, |data| match data {
            ColumnData::Int(col) => Some(col[row]),
            _ => None,
        })
    }

    pub fn get_float(&self, row: usize) -> Result<Option<f32>> {
        self.get_typed(DataType::Float, row, |data| match data {
            ColumnData::Float(col) => Some(col[row]),
            _ => None,
        })
    }

    pub fn get_double(&self, row: usize) -> Result<Option<f64>> {
        self.get_typed(DataType::Double, row, |data| match data {
            ColumnData::Double(col) => Some(col[row]),
            _ => None,
        })
    }

    pub fn get_string(&self, row: usize) -> Result<Option<Arc<str>>> {
        self.get_typed(DataType::Text, row, |data| match data {
            ColumnData::Text(col) => Some(Arc::clone(&col[row])),
            _ => None,
        })
    }

    pub fn get_binary(&self, row: usize) -> Result<Option<Arc<[u8]>>> {
        self.get_typed(DataType::Binary, row, |data| match data {
            ColumnData::Binary(col) => Some(Arc::clone(&col[row])),
            _ => None,
        })
    }

    pub fn get_date(&self, row: usize) -> Result<Option<Timestamp>> {
        self.get_typed(DataType::Date, row, |data| match data {
            ColumnData::Date(col) => Some(col[row]),
            _ => None,
        })
    }

    /// Replace a value in the column by a new value.
    ///
    /// # Errors
    /// Returns an error if the value does not pass [Column::check] or if `row_idx` is
    /// out of bounds. The value is checked first.
    ///
    /// # Behavior
    /// Writing `Null` only flips the bitmap; the stored placeholder is left as is since
    /// the bitmap is checked first on every read.
    pub fn set(&mut self, row_idx: usize, value: Value) -> Result<()> {
        self.check(&value)?;
        self.check_row(row_idx)?;

        let old_key = self.index.as_ref().and_then(|_| self.key_at(row_idx));
        let new_key = self.index.as_ref().and_then(|_| IndexKey::from_value(&value));

        if value.is_null() {
            self.null_bitmap.set(row_idx, true);
        } else {
            self.data
                .set(row_idx, value)
                .map_err(|value| self.mismatch(value.data_type().unwrap_or(self.data_type())))?;
            self.null_bitmap.set(row_idx, false);
        }

        if let Some(index) = self.index.as_mut() {
            if let Some(old) = old_key {
                index.remove(&old, row_idx);
            }
            if let Some(new) = new_key {
                index.insert(new, row_idx);
            }
        }
        Ok(())
    }

    /// Remove the value at the specified row index. Later rows shift down by one.
    pub fn remove(&mut self, row_idx: usize) -> Result<()> {
        self.check_row(row_idx)?;
        if self.index.is_some() {
            let key = self.key_at(row_idx);
            if let Some(index) = self.index.as_mut() {
                index.remove_row(key.as_ref(), row_idx);
            }
        }
        self.data.remove(row_idx);
        self.null_bitmap.remove(row_idx);
        Ok(())
    }

    /// Removes every row, keeping the descriptor and an empty search index if one was
    /// present.
    pub fn clear(&mut self) {
        self.data.clear();
        self.null_bitmap.clear();
        if let Some(index) = self.index.as_mut() {
            index.clear();
        }
    }

    /// Flips the nullability flag.
    ///
    /// Turning nullability off replaces every null cell with the type's default value
    /// first. A no-op if the column already has the requested nullability.
    pub fn set_nullable(&mut self, nullable: bool) {
        if self.descriptor.nullable == nullable {
            return;
        }
        if !nullable {
            let null_rows: Vec<usize> = self.null_bitmap.iter_ones().collect();
            debug!(
                column = %self.descriptor.name,
                nulls = null_rows.len(),
                "replacing nulls with defaults"
            );
            for row in null_rows {
                self.data.reset(row);
                self.null_bitmap.set(row, false);
            }
            if self.index.is_some() {
                self.index = Some(self.build_index());
            }
        }
        self.descriptor.nullable = nullable;
    }

    fn build_index(&self) -> SearchIndex {
        SearchIndex::build((0..self.len()).map(|row| (row, self.key_at(row))))
    }

    pub fn has_search_index(&self) -> bool {
        self.index.is_some()
    }

    /// Builds a search index over the current cells. Idempotent.
    ///
    /// # Errors
    /// Returns [Error::InvalidArgument] if the column type cannot be indexed.
    pub fn add_search_index(&mut self) -> Result<()> {
        if !self.data_type().supports_search_index() {
            return Err(Error::InvalidArgument(format!(
                "a search index cannot be added to {} column {:?}",
                self.data_type(),
                self.descriptor.name
            )));
        }
        if self.index.is_none() {
            let index = self.build_index();
            debug!(column = %self.descriptor.name, keys = index.len(), "search index built");
            self.index = Some(index);
            self.descriptor.indexed = true;
        }
        Ok(())
    }

    /// Drops the search index if there is one.
    pub fn remove_search_index(&mut self) {
        self.descriptor.indexed = false;
        if self.index.take().is_some() {
            debug!(column = %self.descriptor.name, "search index dropped");
        }
    }

    fn check_key(&self, key: &Value) -> Result<()> {
        match key.data_type() {
            None => Err(Error::InvalidArgument(format!(
                "null is not a valid search key for column {:?}",
                self.descriptor.name
            ))),
            Some(actual) => self.expect_type(actual),
        }
    }

    /// Scans for `key`, ascending.
    fn scan<'a>(&'a self, key: &'a Value) -> Box<dyn Iterator<Item = usize> + 'a> {
        let nulls = self.null_bitmap.as_bitslice();
        match (&self.data, key) {
            (ColumnData::Bool(col), Value::Bool(k)) => {
                Box::new(matching(col.iter().by_vals(), nulls, *k))
            }
            (ColumnData::Int(col), Value::Int(k)) => {
                Box::new(matching(col.iter().copied(), nulls, *k))
            }
            (ColumnData::Float(col), Value::Float(k)) => {
                Box::new(matching(col.iter().copied(), nulls, *k))
            }
            (ColumnData::Double(col), Value::Double(k)) => {
                Box::new(matching(col.iter().copied(), nulls, *k))
            }
            (ColumnData::Text(col), Value::Text(k)) => {
                Box::new(matching(col.iter().map(|s| &**s), nulls, &**k))
            }
            (ColumnData::Binary(col), Value::Binary(k)) => {
                Box::new(matching(col.iter().map(|b| &**b), nulls, &**k))
            }
            (ColumnData::Date(col), Value::Date(k)) => {
                Box::new(matching(col.iter().copied(), nulls, *k))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Rows holding `key` according to the search index, if there is one.
    fn indexed(&self, key: &Value) -> Option<&[usize]> {
        let index = self.index.as_ref()?;
        let key = IndexKey::from_value(key)?;
        Some(index.rows(&key))
    }

    /// Returns the lowest row holding `key`.
    ///
    /// # Errors
    /// [Error::InvalidArgument] for a null key, [Error::TypeMismatch] for a key of the
    /// wrong type.
    pub fn find_first(&self, key: &Value) -> Result<Option<usize>> {
        self.check_key(key)?;
        if let Some(rows) = self.indexed(key) {
            return Ok(rows.first().copied());
        }
        Ok(self.scan(key).next())
    }

    pub fn find_all(&self, key: &Value) -> Result<Vec<usize>> {
        self.check_key(key)?;
        if let Some(rows) = self.indexed(key) {
            return Ok(rows.to_vec());
        }
        Ok(self.scan(key).collect())
    }

    pub fn count(&self, key: &Value) -> Result<usize> {
        self.check_key(key)?;
        if let Some(rows) = self.indexed(key) {
            return Ok(rows.len());
        }
        Ok(self.scan(key).count())
    }

    /// Rows whose cell is null, ascending.
    pub fn find_all_null(&self) -> Vec<usize> {
        self.null_bitmap.iter_ones().collect()
    }

    /// Non-null cells of an integer column.
    pub fn longs(&self) -> Result<impl Iterator<Item = i64> + '_> {
        match &self.data {
            ColumnData::Int(col) => Ok(non_null(col.iter().copied(), &self.null_bitmap)),
            _ => Err(self.mismatch(DataType::Int)),
        }
    }

    /// Non-null cells of a float column.
    pub fn floats(&self) -> Result<impl Iterator<Item = f32> + '_> {
        match &self.data {
            ColumnData::Float(col) => Ok(non_null(col.iter().copied(), &self.null_bitmap)),
            _ => Err(self.mismatch(DataType::Float)),
        }
    }

    /// Non-null cells of a double column.
    pub fn doubles(&self) -> Result<impl Iterator<Item = f64> + '_> {
        match &self.data {
            ColumnData::Double(col) => Ok(non_null(col.iter().copied(), &self.null_bitmap)),
            _ => Err(self.mismatch(DataType::Double)),
        }
    }

    /// Non-null cells of a date column.
    pub fn dates(&self) -> Result<impl Iterator<Item = Timestamp> + '_> {
        match &self.data {
            ColumnData::Date(col) => Ok(non_null(col.iter().copied(), &self.null_bitmap)),
            _ => Err(self.mismatch(DataType::Date)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(data_type: DataType, nullable: bool) -> Column {
        Column::new(ColumnDescriptor::new("col", data_type, nullable).unwrap())
    }

    // ─────────────────────────────────────────────────────────────
    // Test 1 : Creation
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_column_new() {
        let col = column(DataType::Int, false);

        assert_eq!(col.name(), "col");
        assert_eq!(col.data_type(), DataType::Int);
        assert!(!col.is_nullable());
        assert!(col.is_empty());
        assert_eq!(col.null_bitmap.len(), 0);
        assert!(!col.has_search_index());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : Name length limit
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_descriptor_name_limit() {
        assert!(ColumnDescriptor::new(&"a".repeat(63), DataType::Text, false).is_ok());
        let err = ColumnDescriptor::new(&"a".repeat(64), DataType::Text, false).unwrap_err();
        assert!(matches!(err, Error::InvalidName { max: 63, .. }));

        // the limit is in bytes, not characters
        assert!(ColumnDescriptor::new(&"é".repeat(32), DataType::Text, false).is_err());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : NULL
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_null_handling() {
        let mut col = column(DataType::Int, true);

        col.push(Value::Int(10)).unwrap();
        col.push(Value::Null).unwrap();
        col.push(Value::Int(20)).unwrap();

        assert_eq!(col.len(), 3);
        assert_eq!(col.get(0), Some(Value::Int(10)));
        assert_eq!(col.get(1), Some(Value::Null));
        assert_eq!(col.get(2), Some(Value::Int(20)));
        assert_eq!(col.get_long(1).unwrap(), None);
        assert!(col.null_bitmap[1]);
    }

    #[test]
    fn test_null_rejected_when_not_nullable() {
        let mut col = column(DataType::Text, false);

        let err = col.push(Value::Null).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(col.len(), 0);

        col.push(Value::Text("a".into())).unwrap();
        assert!(col.set(0, Value::Null).unwrap_err().is_invalid_argument());
        assert_eq!(col.get(0), Some(Value::Text("a".into())));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : Type mismatch
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_type_mismatch() {
        let mut col = column(DataType::Int, false);

        let err = col.push(Value::Text("hello".into())).unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                column: "col".into(),
                expected: DataType::Int,
                actual: DataType::Text,
            }
        );
        assert_eq!(col.len(), 0);

        col.push(Value::Int(1)).unwrap();
        assert!(matches!(col.get_double(0), Err(Error::TypeMismatch { .. })));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 5 : Out of bounds
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_out_of_bounds() {
        let mut col = column(DataType::Int, false);

        assert_eq!(col.get(0), None);
        assert!(col.get_long(0).unwrap_err().is_index_out_of_range());
        assert!(col.remove(0).unwrap_err().is_index_out_of_range());
        assert!(col.set(3, Value::Int(1)).unwrap_err().is_index_out_of_range());
    }

    #[test]
    fn test_type_checked_before_row() {
        let col = column(DataType::Int, false);
        assert!(matches!(col.get_bool(5), Err(Error::TypeMismatch { .. })));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 6 : remove a value
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_remove() {
        let mut col = column(DataType::Int, true);

        col.push(Value::Int(42)).unwrap();
        col.push(Value::Int(59)).unwrap();
        col.push(Value::Null).unwrap();

        col.remove(1).unwrap();
        assert_eq!(col.len(), 2);
        assert_eq!(col.get(0), Some(Value::Int(42)));
        assert_eq!(col.get(1), Some(Value::Null));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 7 : change a value
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_column_set() {
        let mut col = column(DataType::Int, true);
        col.push(Value::Int(30)).unwrap();
        col.push(Value::Null).unwrap();

        col.set(0, Value::Int(31)).unwrap();
        assert_eq!(col.get(0), Some(Value::Int(31)));

        col.set(1, Value::Int(25)).unwrap();
        assert_eq!(col.get(1), Some(Value::Int(25)));
        assert!(!col.null_bitmap[1]);

        col.set(0, Value::Null).unwrap();
        assert_eq!(col.get(0), Some(Value::Null));
    }

    #[test]
    fn test_push_empty() {
        let mut nullable = column(DataType::Text, true);
        nullable.push_empty(2);
        assert_eq!(nullable.get(1), Some(Value::Null));

        let mut required = column(DataType::Binary, false);
        required.push_empty(2);
        assert_eq!(required.get_binary(1).unwrap().as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_set_not_nullable_fills_defaults() {
        let mut col = column(DataType::Text, true);
        col.push(Value::Text("Foo".into())).unwrap();
        col.push(Value::Null).unwrap();

        col.set_nullable(false);
        assert!(!col.is_nullable());
        assert_eq!(col.get_string(1).unwrap().as_deref(), Some(""));
        assert_eq!(col.get_string(0).unwrap().as_deref(), Some("Foo"));
        assert!(col.find_all_null().is_empty());
    }

    #[test]
    fn test_stale_placeholder_not_leaked() {
        // setting a cell to null keeps the old value as placeholder
        let mut col = column(DataType::Int, true);
        col.push(Value::Int(7)).unwrap();
        col.set(0, Value::Null).unwrap();

        assert_eq!(col.find_first(&Value::Int(7)).unwrap(), None);
        assert_eq!(col.longs().unwrap().count(), 0);

        col.set_nullable(false);
        assert_eq!(col.get_long(0).unwrap(), Some(0));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 8 : search
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_find() {
        let mut col = column(DataType::Double, true);
        for v in [1.0, 2.0, 1.0, f64::NAN] {
            col.push(Value::Double(v)).unwrap();
        }
        col.push(Value::Null).unwrap();

        assert_eq!(col.find_first(&Value::Double(1.0)).unwrap(), Some(0));
        assert_eq!(col.find_all(&Value::Double(1.0)).unwrap(), vec![0, 2]);
        assert_eq!(col.count(&Value::Double(2.0)).unwrap(), 1);
        assert_eq!(col.find_first(&Value::Double(f64::NAN)).unwrap(), None);
        assert_eq!(col.find_all_null(), vec![4]);

        assert!(col.find_first(&Value::Null).unwrap_err().is_invalid_argument());
        assert!(matches!(
            col.count(&Value::Int(1)),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_search_index_follows_mutations() {
        let mut col = column(DataType::Text, true);
        for s in ["a", "b", "a"] {
            col.push(Value::Text(s.into())).unwrap();
        }
        col.add_search_index().unwrap();
        assert!(col.has_search_index());

        col.push(Value::Text("a".into())).unwrap();
        assert_eq!(col.find_all(&Value::Text("a".into())).unwrap(), vec![0, 2, 3]);

        col.set(0, Value::Text("b".into())).unwrap();
        col.remove(1).unwrap();
        col.set(2, Value::Null).unwrap();
        assert_eq!(col.find_all(&Value::Text("a".into())).unwrap(), vec![1]);
        assert_eq!(col.find_all(&Value::Text("b".into())).unwrap(), vec![0]);

        col.set_nullable(false);
        assert_eq!(col.find_all(&Value::Text("".into())).unwrap(), vec![2]);

        col.remove_search_index();
        col.remove_search_index();
        assert!(!col.has_search_index());
        assert_eq!(col.find_all(&Value::Text("".into())).unwrap(), vec![2]);
    }

    #[test]
    fn test_descriptor_tracks_search_index() {
        let mut col = column(DataType::Int, false);
        assert!(!col.descriptor.indexed);

        col.add_search_index().unwrap();
        assert!(col.descriptor.indexed);
        col.add_search_index().unwrap();
        assert!(col.descriptor.indexed);

        col.remove_search_index();
        assert!(!col.descriptor.indexed);
        assert!(!col.has_search_index());

        let mut col = column(DataType::Double, false);
        assert!(col.add_search_index().is_err());
        assert!(!col.descriptor.indexed);
    }

    #[test]
    fn test_not_nullable_conversion_resets_every_type() {
        for data_type in DataType::ALL {
            let mut col = column(data_type, true);
            col.push(Value::Null).unwrap();
            col.set_nullable(false);
            assert!(!col.is_null(0).unwrap(), "{data_type}");
            assert_eq!(col.get(0), Some(Value::default_for(data_type)), "{data_type}");
        }
    }

    #[test]
    fn test_search_index_rejected_types() {
        for data_type in [DataType::Float, DataType::Double, DataType::Binary] {
            let mut col = column(data_type, false);
            assert!(col.add_search_index().unwrap_err().is_invalid_argument());
            assert!(!col.has_search_index());
        }
    }

    #[test]
    fn test_typed_iterators_skip_nulls() {
        let mut col = column(DataType::Date, true);
        col.push(Value::Date(Timestamp::from_millis(5))).unwrap();
        col.push(Value::Null).unwrap();
        col.push(Value::Date(Timestamp::from_millis(3))).unwrap();

        let dates: Vec<Timestamp> = col.dates().unwrap().collect();
        assert_eq!(dates, vec![Timestamp::from_millis(5), Timestamp::from_millis(3)]);
        assert!(col.longs().is_err());
    }
}
