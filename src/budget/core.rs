//! Defines the core data model and database queries for budgets.
//!
//! A budget is a spending limit for one category in one calendar month.
//! Setting a budget for a (category, month) pair that already has one
//! replaces the amount.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Month;

use crate::{Error, category::CategoryId, database_id::BudgetId};

/// A spending limit for one category in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The category the limit applies to.
    pub category_id: CategoryId,
    /// The calendar year.
    pub year: i32,
    /// The calendar month.
    pub month: Month,
    /// The limit, non-negative.
    pub amount: f64,
}

/// Create or replace the budget for a category and month.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative,
/// - or [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_budget(
    category_id: CategoryId,
    year: i32,
    month: Month,
    amount: f64,
    connection: &Connection,
) -> Result<Budget, Error> {
    if amount < 0.0 {
        return Err(Error::NegativeAmount(amount));
    }

    let budget = connection
        .prepare(
            "INSERT INTO budget (category_id, year, month, amount)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(category_id, year, month) DO UPDATE SET amount = excluded.amount
             RETURNING id, category_id, year, month, amount",
        )?
        .query_row(
            (category_id, year, u8::from(month), amount),
            map_budget_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(Some(category_id)),
            error => error.into(),
        })?;

    Ok(budget)
}

/// Retrieve a budget by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid budget,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_budget(id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    let budget = connection
        .prepare("SELECT id, category_id, year, month, amount FROM budget WHERE id = :id")?
        .query_one(&[(":id", &id)], map_budget_row)?;

    Ok(budget)
}

/// Retrieve all budgets for one calendar month.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_budgets_for_month(
    year: i32,
    month: Month,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, category_id, year, month, amount
             FROM budget
             WHERE year = ?1 AND month = ?2",
        )?
        .query_map((year, u8::from(month)), map_budget_row)?
        .collect::<Result<Vec<Budget>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Delete a budget by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBudget] if `id` does not refer to a budget in the database,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM budget WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            amount REAL NOT NULL CHECK (amount >= 0),
            UNIQUE(category_id, year, month),
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE CASCADE
        );

        INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('budget', 0);",
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let month_number: u8 = row.get(3)?;
    let month = Month::try_from(month_number).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Integer,
            Box::new(error),
        )
    })?;

    Ok(Budget {
        id: row.get(0)?,
        category_id: row.get(1)?,
        year: row.get(2)?,
        month,
        amount: row.get(4)?,
    })
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::Month;

    use crate::{
        Error,
        category::{CategoryName, create_category},
        db::initialize,
    };

    use super::{delete_budget, get_budgets_for_month, set_budget};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn set_creates_a_budget() {
        let conn = get_test_connection();
        let category = create_category(CategoryName::new_unchecked("Mercado"), &conn).unwrap();

        let budget = set_budget(category.id, 2025, Month::July, 800.0, &conn)
            .expect("Could not set budget");

        assert_eq!(budget.category_id, category.id);
        assert_eq!(budget.month, Month::July);
        assert_eq!(budget.amount, 800.0);
    }

    #[test]
    fn set_replaces_an_existing_budget() {
        let conn = get_test_connection();
        let category = create_category(CategoryName::new_unchecked("Mercado"), &conn).unwrap();
        let original = set_budget(category.id, 2025, Month::July, 800.0, &conn).unwrap();

        let replaced = set_budget(category.id, 2025, Month::July, 650.0, &conn).unwrap();

        assert_eq!(replaced.id, original.id);
        assert_eq!(replaced.amount, 650.0);

        let budgets = get_budgets_for_month(2025, Month::July, &conn).unwrap();
        assert_eq!(budgets.len(), 1);
    }

    #[test]
    fn set_rejects_negative_amount() {
        let conn = get_test_connection();
        let category = create_category(CategoryName::new_unchecked("Mercado"), &conn).unwrap();

        let result = set_budget(category.id, 2025, Month::July, -1.0, &conn);

        assert_eq!(result, Err(Error::NegativeAmount(-1.0)));
    }

    #[test]
    fn set_rejects_unknown_category() {
        let conn = get_test_connection();

        let result = set_budget(42, 2025, Month::July, 100.0, &conn);

        assert_eq!(result, Err(Error::InvalidCategory(Some(42))));
    }

    #[test]
    fn budgets_are_scoped_to_their_month() {
        let conn = get_test_connection();
        let category = create_category(CategoryName::new_unchecked("Mercado"), &conn).unwrap();
        set_budget(category.id, 2025, Month::July, 800.0, &conn).unwrap();
        set_budget(category.id, 2025, Month::August, 900.0, &conn).unwrap();

        let july = get_budgets_for_month(2025, Month::July, &conn).unwrap();
        let june = get_budgets_for_month(2025, Month::June, &conn).unwrap();

        assert_eq!(july.len(), 1);
        assert_eq!(july[0].amount, 800.0);
        assert!(june.is_empty());
    }

    #[test]
    fn deleting_a_category_removes_its_budgets() {
        let conn = get_test_connection();
        let category = create_category(CategoryName::new_unchecked("Mercado"), &conn).unwrap();
        set_budget(category.id, 2025, Month::July, 800.0, &conn).unwrap();

        crate::category::delete_category(category.id, &conn).unwrap();

        let budgets = get_budgets_for_month(2025, Month::July, &conn).unwrap();
        assert!(budgets.is_empty());
    }

    #[test]
    fn delete_fails_on_missing_budget() {
        let conn = get_test_connection();

        assert_eq!(delete_budget(999, &conn), Err(Error::DeleteMissingBudget));
    }
}
