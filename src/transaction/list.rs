//! The transactions page: one calendar month at a time.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, Month};

use crate::{
    AppState, Error,
    aggregation::{month_window, sum_by_kind},
    category::{CategoryId, get_all_categories},
    dates::{self, DateLocale},
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    timezone::today_in,
    transaction::core::{Transaction, TransactionKind, get_transactions_in_range},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Query parameters selecting the displayed month. Defaults to the current
/// month in the configured timezone.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// The calendar year, e.g. 2025.
    pub year: Option<i32>,
    /// The month number, 1-12.
    pub month: Option<u8>,
}

/// Resolve a [MonthQuery] against today's date.
///
/// # Errors
/// Returns [Error::InvalidMonth] for month numbers outside 1..=12 and
/// [Error::InvalidDate] for years the calendar cannot represent.
pub(crate) fn resolve_month_query(query: &MonthQuery, today: Date) -> Result<(Month, i32), Error> {
    let month = match query.month {
        Some(number) => Month::try_from(number).map_err(|_| Error::InvalidMonth(number))?,
        None => today.month(),
    };

    let year = query.year.unwrap_or_else(|| today.year());

    if !(1970..=9999).contains(&year) {
        return Err(Error::InvalidDate(year.to_string()));
    }

    Ok((month, year))
}

/// The month before and after the given one, for navigation links.
pub(crate) fn adjacent_months(month: Month, year: i32) -> ((Month, i32), (Month, i32)) {
    let previous = match month {
        Month::January => (Month::December, year - 1),
        other => (other.previous(), year),
    };
    let next = match month {
        Month::December => (Month::January, year + 1),
        other => (other.next(), year),
    };

    (previous, next)
}

fn month_url(month: Month, year: i32) -> String {
    format!(
        "{}?year={year}&month={}",
        endpoints::TRANSACTIONS_VIEW,
        u8::from(month)
    )
}

/// Display the transactions for one month.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, Error> {
    let today = today_in(&state.local_timezone)?;
    let (month, year) = resolve_month_query(&query, today)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_in_range(month_window(month, year), &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let category_names: HashMap<CategoryId, String> = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?
        .into_iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();

    Ok(transactions_view(&transactions, &category_names, month, year).into_response())
}

fn transactions_view(
    transactions: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
    month: Month,
    year: i32,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let income = sum_by_kind(transactions, TransactionKind::Income);
    let expenses = sum_by_kind(transactions, TransactionKind::Expense);
    let ((previous_month, previous_year), (next_month, next_year)) =
        adjacent_months(month, year);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Record Transaction"
                    }
                }

                nav class="flex items-center justify-between" aria-label="Month"
                {
                    a href=(month_url(previous_month, previous_year)) class=(LINK_STYLE)
                    {
                        "← " (previous_month) " " (previous_year)
                    }

                    h2 class="text-lg font-semibold" { (month) " " (year) }

                    a href=(month_url(next_month, next_year)) class=(LINK_STYLE)
                    {
                        (next_month) " " (next_year) " →"
                    }
                }

                div class="flex gap-8"
                {
                    p
                    {
                        "Income: "
                        span class="text-green-600 dark:text-green-400 font-semibold"
                        {
                            (format_currency(income))
                        }
                    }

                    p
                    {
                        "Expenses: "
                        span class="text-red-600 dark:text-red-400 font-semibold"
                        {
                            (format_currency(expenses))
                        }
                    }
                }

                section class="dark:bg-gray-800 overflow-x-auto rounded-lg shadow"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction, category_names))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions this month. "
                                        a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                                        {
                                            "Record the first one"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

fn transaction_row(
    transaction: &Transaction,
    category_names: &HashMap<CategoryId, String>,
) -> Markup {
    let delete_url =
        endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);
    let amount_style = match transaction.kind {
        TransactionKind::Income => "text-green-600 dark:text-green-400",
        TransactionKind::Expense => "text-red-600 dark:text-red-400",
    };
    let signed_amount = match transaction.kind {
        TransactionKind::Income => transaction.amount,
        TransactionKind::Expense => -transaction.amount,
    };
    let category_name = transaction
        .category_id
        .and_then(|id| category_names.get(&id));

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                (dates::format_display(transaction.date, DateLocale::PtBr))
            }

            td class=(TABLE_CELL_STYLE) { (transaction.description) }

            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(name) = category_name {
                    span class=(CATEGORY_BADGE_STYLE) { (name) }
                }
            }

            td class={(TABLE_CELL_STYLE) " " (amount_style)}
            {
                (format_currency(signed_amount))
            }

            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    class=(LINK_STYLE)
                    hx-delete=(delete_url)
                    hx-confirm="Are you sure you want to delete this transaction?"
                    hx-target="closest tr"
                    hx-swap="delete"
                    hx-target-error="#alert-container"
                {
                    "Delete"
                }
            }
        }
    )
}
