//! Defines the core data models and database queries for shopping lists.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{ShoppingItemId, ShoppingListId},
};

// ============================================================================
// MODELS
// ============================================================================

/// A named shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    /// The ID of the list.
    pub id: ShoppingListId,
    /// The list's name, e.g. "Groceries".
    pub name: String,
    /// The date the list was created.
    pub created_on: Date,
}

/// One entry on a shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    /// The ID of the item.
    pub id: ShoppingItemId,
    /// The list this item belongs to.
    pub list_id: ShoppingListId,
    /// What to buy.
    pub name: String,
    /// How many to buy, at least 1.
    pub quantity: u32,
    /// The expected unit price, non-negative.
    pub estimated_price: f64,
    /// Whether the item has been bought.
    pub purchased: bool,
}

impl ShoppingItem {
    /// The expected cost of this entry: quantity times unit price.
    pub fn estimated_subtotal(&self) -> f64 {
        self.quantity as f64 * self.estimated_price
    }
}

/// A shopping list with progress figures, for the lists overview page.
#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingListSummary {
    /// The list itself.
    pub list: ShoppingList,
    /// The number of items on the list.
    pub item_count: u32,
    /// How many of those items have been bought.
    pub purchased_count: u32,
    /// The sum of the items' estimated subtotals.
    pub estimated_total: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new shopping list.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyName] if the name is empty or just whitespace,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_shopping_list(
    name: &str,
    created_on: Date,
    connection: &Connection,
) -> Result<ShoppingList, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    connection.execute(
        "INSERT INTO shopping_list (name, created_on) VALUES (?1, ?2)",
        (name, created_on),
    )?;

    Ok(ShoppingList {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
        created_on,
    })
}

/// Retrieve a shopping list by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid list,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_shopping_list(
    id: ShoppingListId,
    connection: &Connection,
) -> Result<ShoppingList, Error> {
    let list = connection
        .prepare("SELECT id, name, created_on FROM shopping_list WHERE id = :id")?
        .query_one(&[(":id", &id)], map_list_row)?;

    Ok(list)
}

/// Retrieve every shopping list with its progress figures, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_all_list_summaries(
    connection: &Connection,
) -> Result<Vec<ShoppingListSummary>, Error> {
    connection
        .prepare(
            "SELECT
                l.id,
                l.name,
                l.created_on,
                COUNT(i.id),
                COALESCE(SUM(i.purchased), 0),
                COALESCE(SUM(i.quantity * i.estimated_price), 0.0)
            FROM shopping_list l
            LEFT JOIN shopping_item i ON i.list_id = l.id
            GROUP BY l.id
            ORDER BY l.created_on DESC, l.id DESC",
        )?
        .query_map([], |row| {
            Ok(ShoppingListSummary {
                list: ShoppingList {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_on: row.get(2)?,
                },
                item_count: row.get(3)?,
                purchased_count: row.get(4)?,
                estimated_total: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<ShoppingListSummary>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Delete a shopping list and, via the cascading foreign key, its items.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingShoppingList] if `id` does not refer to a list in the database,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_shopping_list(id: ShoppingListId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM shopping_list WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingShoppingList);
    }

    Ok(())
}

/// Add an item to a shopping list.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyName] if the name is empty or just whitespace,
/// - or [Error::NegativeAmount] if the estimated price is negative,
/// - or [Error::NotFound] if the list does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_item(
    list_id: ShoppingListId,
    name: &str,
    quantity: u32,
    estimated_price: f64,
    connection: &Connection,
) -> Result<ShoppingItem, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    if estimated_price < 0.0 {
        return Err(Error::NegativeAmount(estimated_price));
    }

    let quantity = quantity.max(1);

    connection
        .execute(
            "INSERT INTO shopping_item (list_id, name, quantity, estimated_price, purchased)
             VALUES (?1, ?2, ?3, ?4, 0)",
            (list_id, name, quantity, estimated_price),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    Ok(ShoppingItem {
        id: connection.last_insert_rowid(),
        list_id,
        name: name.to_owned(),
        quantity,
        estimated_price,
        purchased: false,
    })
}

/// Retrieve the items of a shopping list in the order they were added.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_items(
    list_id: ShoppingListId,
    connection: &Connection,
) -> Result<Vec<ShoppingItem>, Error> {
    connection
        .prepare(
            "SELECT id, list_id, name, quantity, estimated_price, purchased
             FROM shopping_item
             WHERE list_id = :list_id
             ORDER BY id ASC",
        )?
        .query_map(&[(":list_id", &list_id)], map_item_row)?
        .collect::<Result<Vec<ShoppingItem>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Flip an item's purchased flag and return the updated item.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingShoppingItem] if `id` does not refer to an item in the database,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn toggle_item(id: ShoppingItemId, connection: &Connection) -> Result<ShoppingItem, Error> {
    let rows_affected = connection.execute(
        "UPDATE shopping_item SET purchased = NOT purchased WHERE id = ?1",
        [id],
    )?;

    if rows_affected == 0 {
        return Err(Error::MissingShoppingItem);
    }

    let item = connection
        .prepare(
            "SELECT id, list_id, name, quantity, estimated_price, purchased
             FROM shopping_item WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_item_row)?;

    Ok(item)
}

/// Delete an item by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingShoppingItem] if `id` does not refer to an item in the database,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_item(id: ShoppingItemId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM shopping_item WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::MissingShoppingItem);
    }

    Ok(())
}

/// Create the shopping list and shopping item tables in the database.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_shopping_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS shopping_list (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            created_on TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS shopping_item (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            list_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            estimated_price REAL NOT NULL CHECK (estimated_price >= 0),
            purchased INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(list_id) REFERENCES shopping_list(id) ON DELETE CASCADE
        );

        INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('shopping_list', 0);
        INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('shopping_item', 0);

        CREATE INDEX IF NOT EXISTS idx_shopping_item_list ON shopping_item(list_id);",
    )?;

    Ok(())
}

fn map_list_row(row: &Row) -> Result<ShoppingList, rusqlite::Error> {
    Ok(ShoppingList {
        id: row.get(0)?,
        name: row.get(1)?,
        created_on: row.get(2)?,
    })
}

fn map_item_row(row: &Row) -> Result<ShoppingItem, rusqlite::Error> {
    Ok(ShoppingItem {
        id: row.get(0)?,
        list_id: row.get(1)?,
        name: row.get(2)?,
        quantity: row.get(3)?,
        estimated_price: row.get(4)?,
        purchased: row.get(5)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
