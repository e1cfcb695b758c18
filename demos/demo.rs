use tablecore::*;

fn main() -> Result<()> {
    println!("In-Memory Table Demo\n");

    // Create DB
    let mut db = Database::new();

    // Create table "users"
    let mut tx = db.begin_transaction();
    let users = tx.get_table("users");
    users.add_column(DataType::Int, "id")?;
    users.add_column(DataType::Text, "name")?;
    users.add_column_with_nullability(DataType::Int, "age", true)?;
    println!("Created table 'users'");

    // Insert data
    println!("Inserting data...");
    users.add(vec![Value::Int(1), "Alice".into(), Value::Int(30)])?;
    users.add(vec![Value::Int(2), "Bob".into(), Value::Null])?;
    users.add(vec![Value::Int(3), "Charlie".into(), Value::Int(25)])?;
    users.add_search_index(1)?;
    tx.commit();

    let users = db.table("users").expect("table was just committed");
    println!("{users}");

    // Lookups
    if let Some(row) = users.find_first_string(1, "Charlie")? {
        println!("Charlie is at row {row}: {:?}", users.get_row(row)?);
    }
    println!("Rows with unknown age: {:?}", users.find_all_null(2)?);
    println!("Oldest: {:?}", users.maximum_long(2)?);
    println!("Average age: {:?}", users.average_long(2)?);

    // Schema change
    let mut tx = db.begin_transaction();
    let users = tx.get_table("users");
    users.convert_column_to_not_nullable(2)?;
    users.rename_column(2, "age_years")?;
    tx.commit();

    let users = db.table("users").expect("table exists");
    println!("After conversion: {:?}", users.get_row(1)?);
    println!("{users}");
    println!("Memory used: {} bytes", users.memory_usage());

    Ok(())
}
