//! Database initialization.

use rusqlite::Connection;

use crate::{
    Error, bill::create_bill_table, budget::create_budget_table, category::create_category_table,
    shopping::create_shopping_tables, transaction::create_transaction_table,
};

/// Create the tables for all the domain models.
///
/// Safe to call on an existing database, every statement is `IF NOT EXISTS`.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Foreign keys are enforced per-connection in SQLite.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    create_category_table(connection)?;
    create_transaction_table(connection)?;
    create_bill_table(connection)?;
    create_shopping_tables(connection)?;
    create_budget_table(connection)?;

    Ok(())
}
