//! The budgets page: limit vs. actual spending per category, one month at
//! a time.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Month;

use crate::{
    AppState, Error,
    aggregation::month_window,
    alert::AlertView,
    budget::core::{Budget, delete_budget, get_budget, get_budgets_for_month, set_budget},
    category::{Category, CategoryId, get_all_categories},
    database_id::BudgetId,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
    timezone::today_in,
    transaction::{
        MonthQuery, TransactionKind, adjacent_months, get_transactions_in_range,
        resolve_month_query,
    },
};

/// The state needed for the budgets page and endpoints.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Form data for setting a category's monthly budget.
#[derive(Debug, Deserialize)]
pub struct BudgetFormData {
    /// The category the limit applies to.
    pub category_id: CategoryId,
    /// The calendar year.
    pub year: i32,
    /// The month number, 1-12.
    pub month: u8,
    /// The limit.
    pub amount: f64,
}

/// One row of the budgets table.
struct BudgetRow<'a> {
    category: &'a Category,
    budget: Option<&'a Budget>,
    spent: f64,
}

/// Display budget vs. actual spending for one month.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, Error> {
    let today = today_in(&state.local_timezone)?;
    let (month, year) = resolve_month_query(&query, today)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let budgets = get_budgets_for_month(year, month, &connection)
        .inspect_err(|error| tracing::error!("could not get budgets: {error}"))?;

    let transactions = get_transactions_in_range(month_window(month, year), &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    // Actual spending per category for the month.
    let mut spent_by_category: HashMap<CategoryId, f64> = HashMap::new();
    for transaction in &transactions {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }

        if let Some(category_id) = transaction.category_id {
            *spent_by_category.entry(category_id).or_insert(0.0) += transaction.amount;
        }
    }

    let budgets_by_category: HashMap<CategoryId, &Budget> = budgets
        .iter()
        .map(|budget| (budget.category_id, budget))
        .collect();

    let rows: Vec<BudgetRow> = categories
        .iter()
        .map(|category| BudgetRow {
            category,
            budget: budgets_by_category.get(&category.id).copied(),
            spent: *spent_by_category.get(&category.id).unwrap_or(&0.0),
        })
        .collect();

    Ok(budgets_view(&rows, &categories, month, year).into_response())
}

/// Handle setting a category's monthly budget.
pub async fn set_budget_endpoint(
    State(state): State<BudgetsPageState>,
    Form(form): Form<BudgetFormData>,
) -> Response {
    let month = match Month::try_from(form.month) {
        Ok(month) => month,
        Err(_) => {
            return render_invalid_month(form.month);
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_budget(form.category_id, form.year, month, form.amount, &connection) {
        Ok(budget) => (
            HxRedirect(budgets_url(budget.month, budget.year)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while setting a budget: {error}");

            error.into_alert_response()
        }
    }
}

fn render_invalid_month(month: u8) -> Response {
    let error = Error::InvalidMonth(month);
    tracing::warn!("rejected budget form: {error}");
    (
        StatusCode::BAD_REQUEST,
        AlertView::error("Invalid month", &format!("{month} is not a month number.")),
    )
        .into_response()
}

/// Handle budget deletion.
pub async fn delete_budget_endpoint(
    Path(budget_id): Path<BudgetId>,
    State(state): State<BudgetsPageState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let budget = match get_budget(budget_id, &connection) {
        Ok(budget) => budget,
        Err(Error::NotFound) => return Error::DeleteMissingBudget.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    match delete_budget(budget_id, &connection) {
        Ok(_) => (
            HxRedirect(budgets_url(budget.month, budget.year)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn budgets_url(month: Month, year: i32) -> String {
    format!(
        "{}?year={year}&month={}",
        endpoints::BUDGETS_VIEW,
        u8::from(month)
    )
}

fn budgets_view(
    rows: &[BudgetRow],
    categories: &[Category],
    month: Month,
    year: i32,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let ((previous_month, previous_year), (next_month, next_year)) = adjacent_months(month, year);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Budgets" }
                }

                nav class="flex items-center justify-between" aria-label="Month"
                {
                    a href=(budgets_url(previous_month, previous_year)) class=(LINK_STYLE)
                    {
                        "← " (previous_month) " " (previous_year)
                    }

                    h2 class="text-lg font-semibold" { (month) " " (year) }

                    a href=(budgets_url(next_month, next_year)) class=(LINK_STYLE)
                    {
                        (next_month) " " (next_year) " →"
                    }
                }

                @if categories.is_empty() {
                    p
                    {
                        "Budgets are set per category. "
                        a href=(endpoints::NEW_CATEGORY_VIEW) class=(LINK_STYLE)
                        {
                            "Create a category first"
                        }
                    }
                } @else {
                    (set_budget_form(categories, month, year))
                    (budgets_table(rows))
                }
            }
        }
    );

    base("Budgets", &[], &content)
}

fn set_budget_form(categories: &[Category], month: Month, year: i32) -> Markup {
    html!(
        form
            hx-put=(endpoints::PUT_BUDGET)
            hx-target-error="#alert-container"
            class="flex flex-wrap gap-2 items-center"
        {
            select name="category_id" required class={(FORM_SELECT_STYLE) " max-w-xs"}
            {
                @for category in categories {
                    option value=(category.id) { (category.name) }
                }
            }

            input
                type="number"
                name="amount"
                step="0.01"
                min="0"
                placeholder="Limit"
                required
                class={(FORM_TEXT_INPUT_STYLE) " max-w-36"};

            input type="hidden" name="year" value=(year);
            input type="hidden" name="month" value=(u8::from(month));

            button type="submit" class={(BUTTON_PRIMARY_STYLE) " max-w-36"} { "Set Budget" }
        }
    )
}

fn budgets_table(rows: &[BudgetRow]) -> Markup {
    html!(
        section class="dark:bg-gray-800 overflow-x-auto rounded-lg shadow"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Budget" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Spent" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Progress" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for row in rows {
                        (budget_row(row))
                    }
                }
            }
        }
    )
}

fn budget_row(row: &BudgetRow) -> Markup {
    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (row.category.name) }

            td class=(TABLE_CELL_STYLE)
            {
                @match row.budget {
                    Some(budget) => { (format_currency(budget.amount)) }
                    None => { "—" }
                }
            }

            td class=(TABLE_CELL_STYLE) { (format_currency(row.spent)) }

            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(budget) = row.budget {
                    (budget_progress_bar(row.spent, budget.amount))
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(budget) = row.budget {
                    button
                        type="button"
                        class=(LINK_STYLE)
                        hx-delete=(endpoints::format_endpoint(endpoints::DELETE_BUDGET, budget.id))
                        hx-confirm="Remove this budget?"
                        hx-target-error="#alert-container"
                    {
                        "Remove"
                    }
                }
            }
        }
    )
}

fn budget_progress_bar(spent: f64, limit: f64) -> Markup {
    let percentage = if limit > 0.0 {
        (spent / limit * 100.0).clamp(0.0, 100.0)
    } else if spent > 0.0 {
        100.0
    } else {
        0.0
    };
    let over_budget = spent > limit;
    let bar_color = if over_budget {
        "bg-red-600 dark:bg-red-500"
    } else {
        "bg-emerald-600 dark:bg-emerald-500"
    };

    html!(
        div
            class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5"
            role="progressbar"
            aria-valuenow=(format!("{percentage:.0}"))
            aria-valuemin="0"
            aria-valuemax="100"
        {
            @if percentage > 0.0 {
                div
                    class={(bar_color) " h-2.5 rounded-full"}
                    style=(format!("width: {percentage:.1}%"))
                {}
            }
        }

        @if over_budget {
            span class="text-xs text-red-600 dark:text-red-400"
            {
                "Over by " (format_currency(spent - limit))
            }
        }
    )
}
