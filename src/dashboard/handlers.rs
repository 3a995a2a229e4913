//! Dashboard HTTP handler and view rendering.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, Error,
    aggregation::{
        expenses_by_category, month_window, monthly_expense_total, overdue_total,
        percentage_change, sum_by_kind,
    },
    bill::get_all_bills,
    category::{CategoryId, get_all_categories},
    dashboard::{
        cards::{CardAccent, SummaryCard, summary_cards_view},
        charts::{DashboardChart, charts_script, expenses_chart, net_income_chart},
        tables::monthly_summary_table,
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    timezone::today_in,
    transaction::{
        Transaction, TransactionKind, adjacent_months, get_transactions_in_range, total_balance,
    },
};

/// Number of days to look back for the dashboard's charts and table
const YEARLY_PERIOD_DAYS: i64 = 365;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and bills.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the couple's finances.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let today = today_in(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    let month = today.month();
    let year = today.year();
    let current_window = month_window(month, year);

    // The last year of transactions feeds the charts and the table; the
    // current and previous month windows feed the cards.
    let range = (today - Duration::days(YEARLY_PERIOD_DAYS))..current_window.end;
    let transactions = get_transactions_in_range(range, &connection)
        .inspect_err(|error| tracing::error!("Could not get transactions for last year: {error}"))?;

    let bills = get_all_bills(&connection)
        .inspect_err(|error| tracing::error!("Could not get bills: {error}"))?;

    if transactions.is_empty() && bills.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let category_names: HashMap<CategoryId, String> = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Could not get categories: {error}"))?
        .into_iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();

    let balance = total_balance(&connection)
        .inspect_err(|error| tracing::error!("Could not calculate balance: {error}"))?;

    let ((previous_month, previous_year), _) = adjacent_months(month, year);
    let previous_window = month_window(previous_month, previous_year);

    let current: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| current_window.contains(&transaction.date))
        .cloned()
        .collect();
    let previous: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| previous_window.contains(&transaction.date))
        .cloned()
        .collect();

    let month_income = sum_by_kind(&current, TransactionKind::Income);
    let previous_income = sum_by_kind(&previous, TransactionKind::Income);
    let month_expenses = monthly_expense_total(&transactions, &bills, month, year);
    let previous_expenses =
        monthly_expense_total(&transactions, &bills, previous_month, previous_year);

    let cards = [
        SummaryCard {
            title: "Income this month",
            amount: month_income,
            delta: Some(percentage_change(previous_income, month_income)),
            accent: CardAccent::Positive,
        },
        SummaryCard {
            title: "Expenses this month",
            amount: month_expenses,
            delta: Some(percentage_change(previous_expenses, month_expenses)),
            accent: CardAccent::Negative,
        },
        SummaryCard {
            title: "Balance",
            amount: balance,
            delta: None,
            accent: CardAccent::Signed,
        },
        SummaryCard {
            title: "Overdue bills",
            amount: overdue_total(&bills, today),
            delta: None,
            accent: CardAccent::Negative,
        },
    ];

    let charts = [
        DashboardChart {
            id: "net-income-chart",
            options: net_income_chart(&transactions).to_string(),
        },
        DashboardChart {
            id: "expenses-chart",
            options: expenses_chart(&expenses_by_category(&transactions, &category_names))
                .to_string(),
        },
    ];

    let table = monthly_summary_table(&transactions);

    Ok(dashboard_view(nav_bar, &cards, &charts, &table).into_response())
}

/// Renders the dashboard page when there is no data yet.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "recording a transaction");
    let new_bill_link = link(endpoints::NEW_BILL_VIEW, "registering a bill");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Cards and charts will show up here once there is some data.
                Start by " (new_transaction_link) " or
                by " (new_bill_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with cards, charts and the monthly table.
fn dashboard_view(
    nav_bar: NavBar<'_>,
    cards: &[SummaryCard],
    charts: &[DashboardChart],
    table: &Markup,
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (summary_cards_view(cards))

            section
                id="charts"
                class="w-full mx-auto mb-4"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    @for chart in charts {
                        div
                            id=(chart.id)
                            class="min-h-[380px] rounded dark:bg-gray-100"
                        {}
                    }
                }
            }

            (table)
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{Duration, OffsetDateTime};

    use crate::{
        bill::create_bill,
        db::initialize,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::{Transaction, TransactionKind, create_transaction},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_test_state() -> DashboardState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn dashboard_page_loads_successfully() {
        let state = get_test_state();
        let today = OffsetDateTime::now_utc().date();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(100.0, TransactionKind::Income, today, ""),
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build(
                    50.0,
                    TransactionKind::Expense,
                    today - Duration::days(15),
                    "",
                ),
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state)).await.unwrap();

        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_chart_exists(&html, "net-income-chart");
        assert_chart_exists(&html, "expenses-chart");
        assert_table_exists(&html);
    }

    #[tokio::test]
    async fn displays_prompt_text_on_no_data() {
        let state = get_test_state();

        let response = get_dashboard_page(State(state)).await.unwrap();
        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert!(html.html().contains("Nothing here yet"));
    }

    #[tokio::test]
    async fn overdue_bills_are_counted_on_their_card() {
        let state = get_test_state();
        let last_month = OffsetDateTime::now_utc().date() - Duration::days(30);
        create_bill(
            "Electricity",
            210.0,
            last_month,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_dashboard_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        assert!(html.html().contains("Overdue bills"));
        assert!(html.html().contains("R$210.00"));
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{}' not found",
            chart_id
        );
    }

    #[track_caller]
    fn assert_table_exists(html: &Html) {
        let selector = Selector::parse("table").unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Monthly summary table not found"
        );
    }
}
