//! The bills page: unpaid bills with derived overdue highlighting, then
//! paid bills.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    aggregation::{is_overdue, overdue_total},
    bill::core::{Bill, get_all_bills},
    dates::{self, DateLocale},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency,
    },
    navigation::NavBar,
    timezone::today_in,
};

const OVERDUE_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-red-800 bg-red-100 rounded-full \
    dark:bg-red-900 dark:text-red-300";

const PENDING_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-yellow-800 bg-yellow-100 rounded-full \
    dark:bg-yellow-900 dark:text-yellow-300";

/// The state needed for the bills page.
#[derive(Debug, Clone)]
pub struct BillsPageState {
    /// The database connection for managing bills.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for BillsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display all bills.
///
/// Overdue is derived from the due date at request time, never read from
/// the stored status alone.
pub async fn get_bills_page(State(state): State<BillsPageState>) -> Result<Response, Error> {
    let today = today_in(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let bills = get_all_bills(&connection)
        .inspect_err(|error| tracing::error!("could not get bills: {error}"))?;

    Ok(bills_view(&bills, today).into_response())
}

fn bills_view(bills: &[Bill], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::BILLS_VIEW).into_html();
    let (unpaid, paid): (Vec<&Bill>, Vec<&Bill>) =
        bills.iter().partition(|bill| bill.paid_at.is_none());
    let overdue_amount = overdue_total(bills, today);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Bills" }

                    a href=(endpoints::NEW_BILL_VIEW) class=(LINK_STYLE)
                    {
                        "Register Bill"
                    }
                }

                @if overdue_amount > 0.0 {
                    p class="text-red-600 dark:text-red-400 font-semibold"
                    {
                        "Overdue: " (format_currency(overdue_amount))
                    }
                }

                h2 class="text-lg font-semibold" { "Unpaid" }
                (unpaid_table(&unpaid, today))

                h2 class="text-lg font-semibold" { "Paid" }
                (paid_table(&paid))
            }
        }
    );

    base("Bills", &[], &content)
}

fn unpaid_table(bills: &[&Bill], today: Date) -> Markup {
    html!(
        section class="dark:bg-gray-800 overflow-x-auto rounded-lg shadow"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Due" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for bill in bills {
                        (unpaid_row(bill, today))
                    }

                    @if bills.is_empty() {
                        tr
                        {
                            td
                                colspan="5"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "Nothing to pay. Nice."
                            }
                        }
                    }
                }
            }
        }
    )
}

fn unpaid_row(bill: &Bill, today: Date) -> Markup {
    let pay_url = endpoints::format_endpoint(endpoints::PAY_BILL, bill.id);
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_BILL, bill.id);
    let overdue = is_overdue(bill, today);

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (bill.description) }

            td class=(TABLE_CELL_STYLE)
            {
                (dates::format_display(bill.due_date, DateLocale::PtBr))
            }

            td class=(TABLE_CELL_STYLE) { (format_currency(bill.amount)) }

            td class=(TABLE_CELL_STYLE)
            {
                @if overdue {
                    span class=(OVERDUE_BADGE_STYLE) { "Overdue" }
                } @else {
                    span class=(PENDING_BADGE_STYLE) { "Pending" }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    button
                        type="button"
                        class=(LINK_STYLE)
                        hx-post=(pay_url)
                        hx-target-error="#alert-container"
                    {
                        "Mark paid"
                    }

                    button
                        type="button"
                        class=(LINK_STYLE)
                        hx-delete=(delete_url)
                        hx-confirm="Are you sure you want to delete this bill?"
                        hx-target="closest tr"
                        hx-swap="delete"
                        hx-target-error="#alert-container"
                    {
                        "Delete"
                    }
                }
            }
        }
    )
}

fn paid_table(bills: &[&Bill]) -> Markup {
    html!(
        section class="dark:bg-gray-800 overflow-x-auto rounded-lg shadow"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Due" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Paid on" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    }
                }

                tbody
                {
                    @for bill in bills {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (bill.description) }

                            td class=(TABLE_CELL_STYLE)
                            {
                                (dates::format_display(bill.due_date, DateLocale::PtBr))
                            }

                            td class=(TABLE_CELL_STYLE)
                            {
                                @if let Some(paid_at) = bill.paid_at {
                                    (dates::format_display(paid_at, DateLocale::PtBr))
                                }
                            }

                            td class=(TABLE_CELL_STYLE) { (format_currency(bill.amount)) }
                        }
                    }

                    @if bills.is_empty() {
                        tr
                        {
                            td
                                colspan="4"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No bills paid yet."
                            }
                        }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod bills_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        bill::{create_bill, get_bills_page, pay_bill},
        db::initialize,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
    };

    use super::BillsPageState;

    fn get_page_state() -> BillsPageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        BillsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn pending_bill_past_due_shows_as_overdue() {
        let state = get_page_state();
        let last_week = OffsetDateTime::now_utc().date() - Duration::days(7);
        create_bill(
            "Electricity",
            210.0,
            last_week,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_bills_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("Overdue"));
    }

    #[tokio::test]
    async fn pending_bill_due_next_week_shows_as_pending() {
        let state = get_page_state();
        let next_week = OffsetDateTime::now_utc().date() + Duration::days(7);
        create_bill(
            "Internet",
            99.9,
            next_week,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_bills_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        assert!(html.html().contains("Pending"));
        assert!(!html.html().contains("Overdue:"));
    }

    #[tokio::test]
    async fn paid_bill_is_listed_in_the_paid_section() {
        let state = get_page_state();
        let today = OffsetDateTime::now_utc().date();
        {
            let connection = state.db_connection.lock().unwrap();
            let bill = create_bill("Water", 80.0, today - Duration::days(3), &connection).unwrap();
            pay_bill(bill.id, today, &connection).unwrap();
        }

        let response = get_bills_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        // A paid bill past its due date must not be classified as overdue.
        assert!(!html.html().contains("Overdue:"));
        assert!(html.html().contains("Water"));
    }
}
