use std::collections::HashMap;

use tracing::debug;

use crate::table::Table;

/// An in-memory registry of named tables.
///
/// Tables can be read at any time through [Database::table]. Creating or changing a
/// table requires a write [Transaction]: the transaction borrows the database mutably,
/// so no reader can observe a table while it is being modified.
///
/// # Example
/// ```
/// use tablecore::{Database, DataType};
///
/// let mut db = Database::new();
///
/// let mut tx = db.begin_transaction();
/// let users = tx.get_table("users");
/// users.add_column(DataType::Text, "name").unwrap();
/// users.add(vec!["Alice".into()]).unwrap();
/// tx.commit();
///
/// let users = db.table("users").unwrap();
/// assert_eq!(users.name(), Some("users"));
/// assert_eq!(users.size(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Database {
    /// A map of table names to their respective [Table] structures.
    tables: HashMap<String, Table>,
}

impl Database {
    /// Creates a new, empty database instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves a reference to a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns the names of all tables, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Opens a write transaction.
    ///
    /// Changes made through the transaction become visible only once
    /// [Transaction::commit] is called; dropping or cancelling it discards them.
    pub fn begin_transaction(&mut self) -> Transaction<'_> {
        debug!(tables = self.tables.len(), "transaction started");
        let staged = self.tables.clone();
        Transaction {
            db: self,
            staged,
            committed: false,
        }
    }
}

/// A write window over a [Database].
///
/// The transaction works on a private copy of every table and swaps it in on commit.
pub struct Transaction<'db> {
    db: &'db mut Database,
    staged: HashMap<String, Table>,
    committed: bool,
}

impl Transaction<'_> {
    /// Returns the table called `name`, creating an empty one if it does not exist.
    pub fn get_table(&mut self, name: &str) -> &mut Table {
        self.staged.entry(name.to_owned()).or_insert_with(|| {
            debug!(name, "table created");
            Table::named(name)
        })
    }

    /// Looks a table up without creating it.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.staged.get(name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.staged.contains_key(name)
    }

    /// Removes a table. Returns `false` if there was no table called `name`.
    pub fn remove_table(&mut self, name: &str) -> bool {
        let removed = self.staged.remove(name).is_some();
        if removed {
            debug!(name, "table removed");
        }
        removed
    }

    /// Publishes every change made in this transaction.
    pub fn commit(mut self) {
        self.db.tables = std::mem::take(&mut self.staged);
        self.committed = true;
        debug!(tables = self.db.tables.len(), "transaction committed");
    }

    /// Discards every change made in this transaction.
    pub fn cancel(self) {}
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            debug!("transaction cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::DataType;
    use crate::value::Value;

    #[test]
    fn test_get_name() {
        const TABLE_NAME: &str = "tableName";
        let mut db = Database::new();

        let mut tx = db.begin_transaction();
        tx.get_table(TABLE_NAME);
        tx.commit();

        let table = db.table(TABLE_NAME).unwrap();
        assert_eq!(table.name(), Some(TABLE_NAME));
    }

    #[test]
    fn test_get_table_returns_existing() {
        let mut db = Database::new();

        let mut tx = db.begin_transaction();
        tx.get_table("users").add_column(DataType::Int, "id").unwrap();
        tx.get_table("users").add(vec![Value::Int(1)]).unwrap();
        assert_eq!(tx.table("users").unwrap().size(), 1);
        tx.commit();

        let mut tx = db.begin_transaction();
        assert_eq!(tx.get_table("users").column_count(), 1);
        tx.commit();
    }

    #[test]
    fn test_uncommitted_changes_are_discarded() {
        let mut db = Database::new();

        {
            let mut tx = db.begin_transaction();
            tx.get_table("dropped");
        }
        assert!(!db.has_table("dropped"));

        let mut tx = db.begin_transaction();
        tx.get_table("kept").add_column(DataType::Text, "s").unwrap();
        tx.commit();

        let mut tx = db.begin_transaction();
        tx.get_table("kept").add_empty_row().unwrap();
        tx.get_table("other");
        tx.cancel();

        assert_eq!(db.table("kept").unwrap().size(), 0);
        assert_eq!(db.table_names(), vec!["kept"]);
    }

    #[test]
    fn test_remove_table() {
        let mut db = Database::new();
        let mut tx = db.begin_transaction();
        tx.get_table("posts");
        tx.get_table("users");
        tx.commit();
        assert_eq!(db.table_names(), vec!["posts", "users"]);

        let mut tx = db.begin_transaction();
        assert!(tx.remove_table("posts"));
        assert!(!tx.remove_table("unknown"));
        assert!(!tx.has_table("posts"));
        tx.commit();
        assert_eq!(db.table_names(), vec!["users"]);
    }

    #[test]
    fn test_table_names_are_not_length_limited() {
        let name = "t".repeat(200);
        let mut db = Database::new();
        let mut tx = db.begin_transaction();
        tx.get_table(&name);
        tx.commit();
        assert!(db.has_table(&name));
    }
}
