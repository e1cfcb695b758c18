use std::fmt;

use allocative::Allocative;

/// Represents the supported column types.
/// Every column holds values of exactly one of these types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Allocative)]
pub enum DataType {
    /// A boolean value (true or false).
    Bool,
    /// A 64-bit signed integer.
    Int,
    /// A 32-bit floating-point number.
    Float,
    /// A 64-bit floating-point number.
    Double,
    /// A variable-length UTF-8 character string.
    Text,
    /// An arbitrary byte sequence.
    Binary,
    /// A point in time with millisecond precision, see [crate::Timestamp].
    Date,
}

impl DataType {
    /// All types, in declaration order.
    pub const ALL: [DataType; 7] = [
        DataType::Bool,
        DataType::Int,
        DataType::Float,
        DataType::Double,
        DataType::Text,
        DataType::Binary,
        DataType::Date,
    ];

    /// Returns `true` if a search index may be built over a column of this type.
    pub fn supports_search_index(self) -> bool {
        matches!(
            self,
            DataType::Text | DataType::Int | DataType::Bool | DataType::Date
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Bool => "BOOLEAN",
            DataType::Int => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Text => "STRING",
            DataType::Binary => "BINARY",
            DataType::Date => "DATE",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_index_support() {
        let supported: Vec<DataType> = DataType::ALL
            .into_iter()
            .filter(|t| t.supports_search_index())
            .collect();
        assert_eq!(
            supported,
            vec![DataType::Bool, DataType::Int, DataType::Text, DataType::Date]
        );
    }
}
