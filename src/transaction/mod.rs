//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - View handlers for transaction-related web pages

mod core;
mod create;
mod delete;
mod list;

pub use core::{
    Transaction, TransactionBuilder, TransactionKind, create_transaction,
    create_transaction_table, get_transaction, get_transactions_in_range, map_transaction_row,
    total_balance,
};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use list::{MonthQuery, get_transactions_page};

pub(crate) use list::{adjacent_months, resolve_month_query};

#[cfg(test)]
pub use core::{count_transactions, delete_transaction};
