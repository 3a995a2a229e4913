//! Defines the core data models and database queries for bills.
//!
//! A bill is an obligation with a due date: rent, electricity, the
//! internet plan. Bills are created as pending and become paid when the
//! couple records a payment. Whether an unpaid bill is overdue is derived
//! at read time from its due date (see [crate::aggregation::is_overdue]);
//! no background process ever writes an overdue status.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::BillId};

// ============================================================================
// MODELS
// ============================================================================

/// The stored payment status of a bill.
///
/// The stored status alone is not authoritative for "is this bill
/// overdue": a pending bill past its due date is logically overdue even
/// though the row still says pending. Always classify through
/// [crate::aggregation::is_overdue].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    /// Not paid yet, due date in the future or past.
    Pending,
    /// Explicitly marked overdue. The app no longer writes this value, but
    /// historical rows may carry it.
    Overdue,
    /// Paid; `paid_at` records when. No transition leaves this state.
    Paid,
}

impl BillStatus {
    /// The lowercase text form used in the database and in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Overdue => "overdue",
            BillStatus::Paid => "paid",
        }
    }

    /// Parse the lowercase text form.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "pending" => Some(BillStatus::Pending),
            "overdue" => Some(BillStatus::Overdue),
            "paid" => Some(BillStatus::Paid),
            _ => None,
        }
    }
}

impl Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for BillStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BillStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|text| BillStatus::parse(text).ok_or(FromSqlError::InvalidType))
    }
}

/// An obligation with a due date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    /// The ID of the bill.
    pub id: BillId,
    /// What the bill is for.
    pub description: String,
    /// The amount owed, always non-negative.
    pub amount: f64,
    /// When the bill must be paid by.
    pub due_date: Date,
    /// The stored payment status.
    pub status: BillStatus,
    /// When the bill was paid. Present exactly when `status` is [BillStatus::Paid].
    pub paid_at: Option<Date>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new pending bill in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_bill(
    description: &str,
    amount: f64,
    due_date: Date,
    connection: &Connection,
) -> Result<Bill, Error> {
    if amount < 0.0 {
        return Err(Error::NegativeAmount(amount));
    }

    let bill = connection
        .prepare(
            "INSERT INTO bill (description, amount, due_date, status, paid_at)
             VALUES (?1, ?2, ?3, ?4, NULL)
             RETURNING id, description, amount, due_date, status, paid_at",
        )?
        .query_row(
            (description, amount, due_date, BillStatus::Pending),
            map_bill_row,
        )?;

    Ok(bill)
}

/// Retrieve a bill from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid bill,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_bill(id: BillId, connection: &Connection) -> Result<Bill, Error> {
    let bill = connection
        .prepare(
            "SELECT id, description, amount, due_date, status, paid_at
             FROM bill WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_bill_row)?;

    Ok(bill)
}

/// Retrieve every bill, soonest due date first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_all_bills(connection: &Connection) -> Result<Vec<Bill>, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, due_date, status, paid_at
             FROM bill
             ORDER BY due_date ASC, id ASC",
        )?
        .query_map([], map_bill_row)?
        .collect::<Result<Vec<Bill>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Mark a bill as paid on `paid_on`.
///
/// Late payments are allowed: a pending bill past its due date (logically
/// overdue) transitions to paid the same way. Paying an already-paid bill
/// is rejected, no transition leaves the paid state.
///
/// # Errors
/// This function will return a:
/// - [Error::PayMissingBill] if `id` does not refer to a bill in the database,
/// - or [Error::BillAlreadyPaid] if the bill was already paid,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn pay_bill(id: BillId, paid_on: Date, connection: &Connection) -> Result<Bill, Error> {
    let bill = match get_bill(id, connection) {
        Ok(bill) => bill,
        Err(Error::NotFound) => return Err(Error::PayMissingBill),
        Err(error) => return Err(error),
    };

    if let Some(paid_at) = bill.paid_at {
        return Err(Error::BillAlreadyPaid(paid_at));
    }

    connection.execute(
        "UPDATE bill SET status = ?1, paid_at = ?2 WHERE id = ?3",
        (BillStatus::Paid, paid_on, id),
    )?;

    get_bill(id, connection)
}

/// Delete a bill by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBill] if `id` does not refer to a bill in the database,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_bill(id: BillId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM bill WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBill);
    }

    Ok(())
}

/// Create the bill table in the database.
///
/// The table-level CHECK enforces the invariant that `paid_at` is set
/// exactly when the status is 'paid'.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_bill_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS bill (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            due_date TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('pending', 'overdue', 'paid')),
            paid_at TEXT CHECK ((status = 'paid') = (paid_at IS NOT NULL))
        );

        INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('bill', 0);

        CREATE INDEX IF NOT EXISTS idx_bill_due_date ON bill(due_date);",
    )?;

    Ok(())
}

/// Map a database row to a Bill.
pub fn map_bill_row(row: &Row) -> Result<Bill, rusqlite::Error> {
    let id = row.get(0)?;
    let description = row.get(1)?;
    let amount = row.get(2)?;
    let due_date = row.get(3)?;
    let status = row.get(4)?;
    let paid_at = row.get(5)?;

    Ok(Bill {
        id,
        description,
        amount,
        due_date,
        status,
        paid_at,
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
        bill::{BillStatus, create_bill, delete_bill, get_all_bills, get_bill, pay_bill},
        db::initialize,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_starts_pending_with_no_paid_date() {
        let conn = get_test_connection();

        let bill = create_bill("Rent", 1200.0, date!(2025 - 08 - 05), &conn)
            .expect("Could not create bill");

        assert_eq!(bill.status, BillStatus::Pending);
        assert_eq!(bill.paid_at, None);
        assert_eq!(bill.amount, 1200.0);
    }

    #[test]
    fn create_fails_on_negative_amount() {
        let conn = get_test_connection();

        let result = create_bill("Rent", -5.0, date!(2025 - 08 - 05), &conn);

        assert_eq!(result, Err(Error::NegativeAmount(-5.0)));
    }

    #[test]
    fn pay_sets_status_and_paid_date() {
        let conn = get_test_connection();
        let bill = create_bill("Internet", 99.9, date!(2025 - 07 - 20), &conn).unwrap();

        let paid = pay_bill(bill.id, date!(2025 - 07 - 18), &conn).expect("Could not pay bill");

        assert_eq!(paid.status, BillStatus::Paid);
        assert_eq!(paid.paid_at, Some(date!(2025 - 07 - 18)));
    }

    #[test]
    fn late_payment_is_allowed() {
        let conn = get_test_connection();
        let bill = create_bill("Electricity", 210.0, date!(2025 - 06 - 25), &conn).unwrap();

        // Paid a month after the due date.
        let paid = pay_bill(bill.id, date!(2025 - 07 - 25), &conn).expect("Could not pay bill");

        assert_eq!(paid.status, BillStatus::Paid);
        assert_eq!(paid.paid_at, Some(date!(2025 - 07 - 25)));
    }

    #[test]
    fn pay_twice_is_rejected() {
        let conn = get_test_connection();
        let bill = create_bill("Water", 80.0, date!(2025 - 07 - 20), &conn).unwrap();
        pay_bill(bill.id, date!(2025 - 07 - 10), &conn).unwrap();

        let result = pay_bill(bill.id, date!(2025 - 07 - 11), &conn);

        assert_eq!(result, Err(Error::BillAlreadyPaid(date!(2025 - 07 - 10))));
    }

    #[test]
    fn pay_missing_bill_is_rejected() {
        let conn = get_test_connection();

        let result = pay_bill(999, date!(2025 - 07 - 10), &conn);

        assert_eq!(result, Err(Error::PayMissingBill));
    }

    #[test]
    fn delete_fails_on_missing_bill() {
        let conn = get_test_connection();

        let result = delete_bill(999, &conn);

        assert_eq!(result, Err(Error::DeleteMissingBill));
    }

    #[test]
    fn historical_overdue_status_rows_can_be_read() {
        let conn = get_test_connection();

        // Rows written before the derived-overdue change stored the status
        // directly; they must still load.
        conn.execute(
            "INSERT INTO bill (description, amount, due_date, status, paid_at)
             VALUES ('Old bill', 50.0, '2024-01-10', 'overdue', NULL)",
            (),
        )
        .unwrap();

        let bill = get_bill(1, &conn).expect("Could not read historical row");

        assert_eq!(bill.status, BillStatus::Overdue);
        assert_eq!(bill.paid_at, None);
    }

    #[test]
    fn get_all_orders_by_due_date() {
        let conn = get_test_connection();
        create_bill("B", 1.0, date!(2025 - 08 - 10), &conn).unwrap();
        create_bill("A", 1.0, date!(2025 - 07 - 10), &conn).unwrap();

        let bills = get_all_bills(&conn).unwrap();

        assert_eq!(bills.len(), 2);
        assert_eq!(bills[0].due_date, date!(2025 - 07 - 10));
        assert_eq!(bills[1].due_date, date!(2025 - 08 - 10));
    }
}
