//! Monthly report: income, the full expense total (transactions plus
//! bills), and the expense breakdown by category.

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
use time::Month;

use crate::{
    AppState, Error,
    aggregation::{expenses_by_category, month_window, monthly_expense_total, sum_by_kind},
    bill::get_all_bills,
    category::{CategoryId, get_all_categories},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency,
    },
    navigation::NavBar,
    timezone::today_in,
    transaction::{
        MonthQuery, TransactionKind, adjacent_months, get_transactions_in_range,
        resolve_month_query,
    },
};

/// The state needed for the report page.
#[derive(Debug, Clone)]
pub struct ReportPageState {
    /// The database connection for reading transactions and bills.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The figures shown on the report page.
struct MonthlyReport {
    month: Month,
    year: i32,
    income: f64,
    /// Expense transactions plus bills paid or falling due in the month.
    expense_total: f64,
    /// The bills' share of `expense_total`.
    bills_total: f64,
    by_category: Vec<(String, f64)>,
}

/// Display the report for one month.
pub async fn get_report_page(
    State(state): State<ReportPageState>,
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

    let bills = get_all_bills(&connection)
        .inspect_err(|error| tracing::error!("could not get bills: {error}"))?;

    let category_names: HashMap<CategoryId, String> = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?
        .into_iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();

    let income = sum_by_kind(&transactions, TransactionKind::Income);
    let transaction_expenses = sum_by_kind(&transactions, TransactionKind::Expense);
    let expense_total = monthly_expense_total(&transactions, &bills, month, year);

    let report = MonthlyReport {
        month,
        year,
        income,
        expense_total,
        bills_total: expense_total - transaction_expenses,
        by_category: expenses_by_category(&transactions, &category_names),
    };

    Ok(report_view(&report).into_response())
}

fn report_url(month: Month, year: i32) -> String {
    format!(
        "{}?year={year}&month={}",
        endpoints::REPORT_VIEW,
        u8::from(month)
    )
}

fn report_view(report: &MonthlyReport) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORT_VIEW).into_html();
    let net = report.income - report.expense_total;
    let net_style = if net >= 0.0 {
        "text-green-600 dark:text-green-400"
    } else {
        "text-red-600 dark:text-red-400"
    };
    let ((previous_month, previous_year), (next_month, next_year)) =
        adjacent_months(report.month, report.year);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-3xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Monthly Report" }
                }

                nav class="flex items-center justify-between" aria-label="Month"
                {
                    a href=(report_url(previous_month, previous_year)) class=(LINK_STYLE)
                    {
                        "← " (previous_month) " " (previous_year)
                    }

                    h2 class="text-lg font-semibold" { (report.month) " " (report.year) }

                    a href=(report_url(next_month, next_year)) class=(LINK_STYLE)
                    {
                        (next_month) " " (next_year) " →"
                    }
                }

                dl class="grid grid-cols-1 sm:grid-cols-3 gap-4"
                {
                    div class="bg-white dark:bg-gray-800 rounded-lg p-4 shadow"
                    {
                        dt class="text-sm text-gray-600 dark:text-gray-400" { "Income" }
                        dd class="text-2xl font-bold text-green-600 dark:text-green-400"
                        {
                            (format_currency(report.income))
                        }
                    }

                    div class="bg-white dark:bg-gray-800 rounded-lg p-4 shadow"
                    {
                        dt class="text-sm text-gray-600 dark:text-gray-400" { "Expenses" }
                        dd class="text-2xl font-bold text-red-600 dark:text-red-400"
                        {
                            (format_currency(report.expense_total))
                        }
                    }

                    div class="bg-white dark:bg-gray-800 rounded-lg p-4 shadow"
                    {
                        dt class="text-sm text-gray-600 dark:text-gray-400" { "Net" }
                        dd class={"text-2xl font-bold " (net_style)}
                        {
                            (format_currency(net))
                        }
                    }
                }

                h3 class="text-lg font-semibold" { "Expenses by category" }

                section class="dark:bg-gray-800 overflow-x-auto rounded-lg shadow"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                            }
                        }

                        tbody
                        {
                            @for (label, amount) in &report.by_category {
                                (category_row(label, *amount, report.expense_total))
                            }

                            @if report.bills_total > 0.0 {
                                (category_row("Bills", report.bills_total, report.expense_total))
                            }

                            @if report.by_category.is_empty() && report.bills_total <= 0.0 {
                                tr
                                {
                                    td
                                        colspan="3"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No expenses this month."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Monthly Report", &[], &content)
}

fn category_row(label: &str, amount: f64, expense_total: f64) -> Markup {
    let share = if expense_total > 0.0 {
        amount / expense_total * 100.0
    } else {
        0.0
    };

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (label) }
            td class=(TABLE_CELL_STYLE) { (format_currency(amount)) }
            td class=(TABLE_CELL_STYLE) { (format!("{share:.1}%")) }
        }
    )
}

#[cfg(test)]
mod report_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        bill::{create_bill, pay_bill},
        category::{CategoryName, create_category},
        db::initialize,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::{MonthQuery, Transaction, TransactionKind, create_transaction},
    };

    use super::{ReportPageState, get_report_page};

    fn get_page_state() -> ReportPageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        ReportPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn july_query() -> MonthQuery {
        MonthQuery {
            year: Some(2025),
            month: Some(7),
        }
    }

    #[tokio::test]
    async fn expense_total_combines_transactions_and_bills() {
        let state = get_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(200.0, TransactionKind::Expense, date!(2025 - 07 - 10), ""),
                &connection,
            )
            .unwrap();
            let paid = create_bill("Internet", 150.0, date!(2025 - 07 - 03), &connection).unwrap();
            pay_bill(paid.id, date!(2025 - 07 - 05), &connection).unwrap();
            create_bill("Electricity", 93.76, date!(2025 - 07 - 25), &connection).unwrap();
        }

        let response = get_report_page(State(state), Query(july_query()))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("R$443.76"), "got: {}", html.html());
    }

    #[tokio::test]
    async fn overdue_bill_from_june_is_excluded_from_july() {
        let state = get_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            // Due in June, never paid. It belongs to June's report.
            create_bill("Old bill", 75.0, date!(2025 - 06 - 25), &connection).unwrap();
        }

        let response = get_report_page(State(state), Query(july_query()))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert!(html.html().contains("No expenses this month"));
    }

    #[tokio::test]
    async fn breakdown_lists_categories_with_shares() {
        let state = get_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let category =
                create_category(CategoryName::new_unchecked("Mercado"), &connection).unwrap();
            create_transaction(
                Transaction::build(75.0, TransactionKind::Expense, date!(2025 - 07 - 10), "")
                    .category_id(Some(category.id)),
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build(25.0, TransactionKind::Expense, date!(2025 - 07 - 11), ""),
                &connection,
            )
            .unwrap();
        }

        let response = get_report_page(State(state), Query(july_query()))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let body = html.html();
        assert!(body.contains("Mercado"));
        assert!(body.contains("75.0%"));
        assert!(body.contains("25.0%"));
    }
}
