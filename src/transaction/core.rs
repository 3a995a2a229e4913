//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, ops::Range};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, category::CategoryId, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction brought money in or spent it.
///
/// Amounts are always non-negative; the kind carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned: salary, gifts, refunds.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The lowercase text form used in the database and in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Parse the lowercase text form.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|text| TransactionKind::parse(text).ok_or(FromSqlError::InvalidType))
    }
}

/// An event where money was either earned or spent.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money earned or spent, always non-negative.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: f64,
        kind: TransactionKind,
        date: Date,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            kind,
            date,
            description: description.to_owned(),
            category_id: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The monetary amount of the transaction, always non-negative.
    ///
    /// The direction of the money flow is carried by `kind`, not by the
    /// sign of the amount.
    pub amount: f64,

    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,

    /// The date when the transaction occurred.
    ///
    /// This represents the actual transaction date (when money moved), not
    /// when it was recorded in the system.
    pub date: Date,

    /// A human-readable description of the transaction.
    pub description: String,

    /// The category of the transaction, e.g. "Groceries", "Rent".
    pub category_id: Option<CategoryId>,
}

impl TransactionBuilder {
    /// Set the category id for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative,
/// - or [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if builder.amount < 0.0 {
        return Err(Error::NegativeAmount(builder.amount));
    }

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, kind, date, description, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, amount, kind, date, description, category_id",
        )?
        .query_row(
            (
                builder.amount,
                builder.kind,
                builder.date,
                builder.description,
                builder.category_id,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(builder.category_id),
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, amount, kind, date, description, category_id
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve the transactions whose date falls in `date_range`, newest first.
///
/// The range is half-open: a transaction dated exactly on `date_range.end`
/// is excluded.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_transactions_in_range(
    date_range: Range<Date>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, amount, kind, date, description, category_id
             FROM \"transaction\"
             WHERE date >= ?1 AND date < ?2
             ORDER BY date DESC, id DESC",
        )?
        .query_map((date_range.start, date_range.end), map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// The all-time balance: the sum of income minus the sum of expenses.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn total_balance(connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(CASE WHEN kind = 'income' THEN amount ELSE -amount END), 0.0)
             FROM \"transaction\";",
            [],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Delete a transaction by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction in the database,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL CHECK (amount >= 0),
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                category_id INTEGER,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Composite index used by the dashboard and report pages.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_category
         ON \"transaction\"(date, category_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let kind = row.get(2)?;
    let date = row.get(3)?;
    let description = row.get(4)?;
    let category_id = row.get(5)?;

    Ok(Transaction {
        id,
        amount,
        kind,
        date,
        description,
        category_id,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        transaction::{
            Transaction, TransactionKind, count_transactions, create_transaction,
            delete_transaction, get_transactions_in_range, total_balance,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let amount = 12.3;

        let result = create_transaction(
            Transaction::build(amount, TransactionKind::Expense, date!(2025 - 07 - 05), ""),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.kind, TransactionKind::Expense);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_fails_on_negative_amount() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(-1.0, TransactionKind::Expense, date!(2025 - 07 - 05), ""),
            &conn,
        );

        assert_eq!(result, Err(Error::NegativeAmount(-1.0)));
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let conn = get_test_connection();
        let category_id = Some(42);

        let result = create_transaction(
            Transaction::build(123.45, TransactionKind::Income, date!(2025 - 07 - 04), "")
                .category_id(category_id),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category_id)));
    }

    #[test]
    fn range_query_is_half_open() {
        let conn = get_test_connection();
        let in_range = [date!(2025 - 07 - 01), date!(2025 - 07 - 31)];
        let out_of_range = [date!(2025 - 06 - 30), date!(2025 - 08 - 01)];

        for date in in_range.iter().chain(out_of_range.iter()) {
            create_transaction(
                Transaction::build(10.0, TransactionKind::Expense, *date, ""),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got = get_transactions_in_range(date!(2025 - 07 - 01)..date!(2025 - 08 - 01), &conn)
            .expect("Could not query range");

        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|t| in_range.contains(&t.date)));
    }

    #[test]
    fn range_query_returns_newest_first() {
        let conn = get_test_connection();
        create_transaction(
            Transaction::build(1.0, TransactionKind::Expense, date!(2025 - 07 - 02), ""),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(2.0, TransactionKind::Expense, date!(2025 - 07 - 20), ""),
            &conn,
        )
        .unwrap();

        let got = get_transactions_in_range(date!(2025 - 07 - 01)..date!(2025 - 08 - 01), &conn)
            .unwrap();

        assert_eq!(got[0].date, date!(2025 - 07 - 20));
        assert_eq!(got[1].date, date!(2025 - 07 - 02));
    }

    #[test]
    fn total_balance_subtracts_expenses_from_income() {
        let conn = get_test_connection();
        let today = date!(2025 - 07 - 05);

        create_transaction(
            Transaction::build(1000.0, TransactionKind::Income, today, "Salary"),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(350.5, TransactionKind::Expense, today, "Rent"),
            &conn,
        )
        .unwrap();

        let balance = total_balance(&conn).expect("Could not get balance");

        assert_eq!(balance, 649.5);
    }

    #[test]
    fn total_balance_is_zero_for_empty_table() {
        let conn = get_test_connection();

        assert_eq!(total_balance(&conn), Ok(0.0));
    }

    #[test]
    fn delete_fails_on_missing_transaction() {
        let conn = get_test_connection();

        let result = delete_transaction(999, &conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let today = date!(2025 - 07 - 05);
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                Transaction::build(i as f64, TransactionKind::Income, today, ""),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}
