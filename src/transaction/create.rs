//! New-transaction page and creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Deserializer};
use time::Date;

use crate::{
    AppState, Error,
    alert::AlertView,
    category::{Category, CategoryId, get_all_categories},
    dates::{self, DateLocale},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, base, render,
    },
    navigation::NavBar,
    timezone::today_in,
    transaction::core::{Transaction, TransactionKind, create_transaction},
};

/// The state needed for the new-transaction page and endpoint.
#[derive(Debug, Clone)]
pub struct TransactionFormState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionFormState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Form data for recording a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionFormData {
    /// The amount of money, non-negative.
    pub amount: f64,
    /// "income" or "expense".
    pub kind: String,
    /// The transaction date as entered in the form.
    pub date: String,
    /// What the transaction was for.
    #[serde(default)]
    pub description: String,
    /// The selected category, empty for none.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category_id: Option<CategoryId>,
}

/// The `<select>` element submits an empty string when no category is chosen.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<CategoryId>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;

    match text.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<CategoryId>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Render the new-transaction page.
pub async fn get_new_transaction_page(
    State(state): State<TransactionFormState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let today = today_in(&state.local_timezone)?;

    Ok(new_transaction_view(today, &categories).into_response())
}

/// Handle new-transaction form submission.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionFormState>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let kind = match TransactionKind::parse(&form.kind) {
        Some(kind) => kind,
        None => {
            return render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Invalid transaction type",
                    &format!("\"{}\" is not income or expense.", form.kind),
                ),
            );
        }
    };

    let date = match dates::canonicalize(&form.date, DateLocale::PtBr) {
        Ok(date) => date,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let builder = Transaction::build(form.amount, kind, date, &form.description)
        .category_id(form.category_id);

    match create_transaction(builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");

            error.into_alert_response()
        }
    }
}

fn new_transaction_view(today: Date, categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let create_endpoint = endpoints::POST_TRANSACTION;

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Transaction" }

            form
                hx-post=(create_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                fieldset class="flex gap-6"
                {
                    legend class=(FORM_LABEL_STYLE) { "Type" }

                    label class="flex items-center gap-2"
                    {
                        input
                            type="radio"
                            name="kind"
                            value="expense"
                            checked
                            required;
                        "Expense"
                    }

                    label class="flex items-center gap-2"
                    {
                        input
                            type="radio"
                            name="kind"
                            value="income"
                            required;
                        "Income"
                    }
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        id="date"
                        type="date"
                        name="date"
                        value=(dates::to_canonical_string(today))
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        id="description"
                        type="text"
                        name="description"
                        placeholder="Description"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                    select id="category_id" name="category_id" class=(FORM_SELECT_STYLE)
                    {
                        option value="" { "No category" }

                        @for category in categories {
                            option value=(category.id) { (category.name) }
                        }
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Record Transaction" }
            }
        }
    };

    base("New Transaction", &[], &content)
}

#[cfg(test)]
mod new_transaction_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_status_ok,
            assert_valid_html, must_get_form, parse_html_document,
        },
        transaction::get_new_transaction_page,
    };

    use super::TransactionFormState;

    fn get_form_state() -> TransactionFormState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        TransactionFormState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn render_page() {
        let response = get_new_transaction_page(State(get_form_state()))
            .await
            .unwrap();

        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_TRANSACTION, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "date", "date");
        assert_form_submit_button(&form);
    }
}
