pub mod column;
pub mod data_type;
pub mod database;
pub mod error;
pub mod search_index;
pub mod table;
pub mod value;

pub use column::{ColumnDescriptor, MAX_COLUMN_NAME_LEN};
pub use data_type::DataType;
pub use database::{Database, Transaction};
pub use error::{Error, IndexKind, Result};
pub use search_index::SearchIndex;
pub use table::Table;
pub use value::{Timestamp, Value};
