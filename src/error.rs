use std::fmt;

use thiserror::Error;

use crate::data_type::DataType;

/// Which kind of index an [`Error::IndexOutOfRange`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Column,
    Row,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Column => f.write_str("column"),
            IndexKind::Row => f.write_str("row"),
        }
    }
}

/// Errors raised by table, column and registry operations.
///
/// Every error is returned before the failing operation has touched any state, so a
/// table is always left exactly as it was when an `Err` comes back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A column or row index is not smaller than the current count.
    #[error("{kind} index {index} is out of range (count: {count})")]
    IndexOutOfRange {
        kind: IndexKind,
        index: usize,
        count: usize,
    },
    /// The call is well-typed but its arguments are not acceptable in the current state.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A column name exceeds [`crate::MAX_COLUMN_NAME_LEN`] bytes.
    #[error("column name {name:?} is {} bytes long, the limit is {max}", .name.len())]
    InvalidName { name: String, max: usize },
    /// A value's type does not match the declared type of its column.
    #[error("type mismatch in column {column:?}: expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },
}

impl Error {
    pub(crate) fn column_out_of_range(index: usize, count: usize) -> Self {
        Error::IndexOutOfRange {
            kind: IndexKind::Column,
            index,
            count,
        }
    }

    pub(crate) fn row_out_of_range(index: usize, count: usize) -> Self {
        Error::IndexOutOfRange {
            kind: IndexKind::Row,
            index,
            count,
        }
    }

    /// Returns `true` for [`Error::IndexOutOfRange`].
    pub fn is_index_out_of_range(&self) -> bool {
        matches!(self, Error::IndexOutOfRange { .. })
    }

    /// Returns `true` for [`Error::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
