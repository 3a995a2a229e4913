//! TwoCents is a web app for couples managing their money together:
//! shared transactions, bills, shopping lists, budgets and a reporting
//! dashboard.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod aggregation;
mod alert;
mod app_state;
mod bill;
mod budget;
mod category;
mod dashboard;
mod database_id;
mod dates;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod report;
mod routing;
mod shopping;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;

use crate::{
    alert::AlertView,
    category::CategoryId,
    html::render,
    internal_server_error::{InternalServerErrorPage, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A date string could not be parsed as a calendar date.
    ///
    /// Carries the offending input. Unparseable dates are always surfaced
    /// instead of being coerced to some arbitrary date, since downstream
    /// comparisons and aggregation would otherwise fail silently.
    #[error("\"{0}\" is not a valid calendar date")]
    InvalidDate(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used to create a shopping list or item name.
    #[error("Name cannot be empty")]
    EmptyName,

    /// The category ID attached to a record did not match a valid category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// A negative amount was used where only non-negative amounts make sense
    /// (transaction amounts, bill amounts, budget limits).
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(f64),

    /// A month number outside 1..=12.
    #[error("{0} is not a valid month number")]
    InvalidMonth(u8),

    /// A bill that is already paid cannot be paid again.
    ///
    /// No transition leaves the paid state.
    #[error("the bill was already paid on {0}")]
    BillAlreadyPaid(Date),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a bill that does not exist
    #[error("tried to delete a bill that is not in the database")]
    DeleteMissingBill,

    /// Tried to pay a bill that does not exist
    #[error("tried to pay a bill that is not in the database")]
    PayMissingBill,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to delete a shopping list that does not exist
    #[error("tried to delete a shopping list that is not in the database")]
    DeleteMissingShoppingList,

    /// Tried to modify a shopping item that does not exist
    #[error("tried to modify a shopping item that is not in the database")]
    MissingShoppingItem,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => {
                render_internal_server_error(InternalServerErrorPage {
                    description: "Invalid Timezone Settings",
                    fix: &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                    ),
                })
            }
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertView::error(
                    "Invalid Timezone Settings",
                    &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                    ),
                ),
            ),
            Error::InvalidDate(text) => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Invalid date",
                    &format!(
                        "\"{text}\" could not be read as a calendar date. \
                        Use the date picker or the YYYY-MM-DD format."
                    ),
                ),
            ),
            Error::EmptyName | Error::EmptyCategoryName => render(
                StatusCode::BAD_REQUEST,
                AlertView::error("Invalid name", "The name cannot be empty."),
            ),
            Error::NegativeAmount(amount) => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Invalid amount",
                    &format!("{amount} is negative. Amounts must be zero or more."),
                ),
            ),
            Error::InvalidCategory(category_id) => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Invalid category ID",
                    &format!("Could not find a category with the ID {category_id:?}"),
                ),
            ),
            Error::BillAlreadyPaid(paid_at) => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Bill already paid",
                    &format!("This bill was already paid on {paid_at}."),
                ),
            ),
            Error::DeleteMissingTransaction => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete transaction",
                    "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted.",
                ),
            ),
            Error::DeleteMissingBill => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete bill",
                    "The bill could not be found. \
                    Try refreshing the page to see if the bill has already been deleted.",
                ),
            ),
            Error::PayMissingBill => render(
                StatusCode::NOT_FOUND,
                AlertView::error("Could not pay bill", "The bill could not be found."),
            ),
            Error::UpdateMissingCategory => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not update category",
                    "The category could not be found.",
                ),
            ),
            Error::DeleteMissingCategory => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete category",
                    "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted.",
                ),
            ),
            Error::DeleteMissingShoppingList => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete shopping list",
                    "The shopping list could not be found. \
                    Try refreshing the page to see if the list has already been deleted.",
                ),
            ),
            Error::MissingShoppingItem => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not update shopping item",
                    "The shopping item could not be found. \
                    Try refreshing the page to see if the item has already been deleted.",
                ),
            ),
            Error::DeleteMissingBudget => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete budget",
                    "The budget could not be found. \
                    Try refreshing the page to see if the budget has already been deleted.",
                ),
            ),
            _ => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertView::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        }
    }
}
