//! New-bill page and creation endpoint.

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
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    bill::core::create_bill,
    dates::{self, DateLocale},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    timezone::today_in,
};

/// The state needed for the new-bill page and endpoint.
#[derive(Debug, Clone)]
pub struct BillFormState {
    /// The database connection for managing bills.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for BillFormState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Form data for registering a bill.
#[derive(Debug, Deserialize)]
pub struct BillFormData {
    /// What the bill is for.
    pub description: String,
    /// The amount owed.
    pub amount: f64,
    /// The due date as entered in the form.
    pub due_date: String,
}

/// Render the new-bill page.
pub async fn get_new_bill_page(State(state): State<BillFormState>) -> Result<Response, Error> {
    let today = today_in(&state.local_timezone)?;

    Ok(new_bill_view(today).into_response())
}

/// Handle new-bill form submission.
pub async fn create_bill_endpoint(
    State(state): State<BillFormState>,
    Form(form): Form<BillFormData>,
) -> Response {
    let due_date = match dates::canonicalize(&form.due_date, DateLocale::PtBr) {
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

    match create_bill(&form.description, form.amount, due_date, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BILLS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a bill: {error}");

            error.into_alert_response()
        }
    }
}

fn new_bill_view(today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_BILL_VIEW).into_html();
    let create_endpoint = endpoints::POST_BILL;

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Bill" }

            form
                hx-post=(create_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        id="description"
                        type="text"
                        name="description"
                        placeholder="Rent, electricity, internet..."
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
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
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="due_date" class=(FORM_LABEL_STYLE) { "Due date" }

                    input
                        id="due_date"
                        type="date"
                        name="due_date"
                        value=(dates::to_canonical_string(today))
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Register Bill" }
            }
        }
    };

    base("New Bill", &[], &content)
}

#[cfg(test)]
mod new_bill_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;

    use crate::{
        bill::get_new_bill_page,
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_status_ok,
            assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::BillFormState;

    fn get_form_state() -> BillFormState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        BillFormState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn render_page() {
        let response = get_new_bill_page(State(get_form_state())).await.unwrap();

        assert_status_ok(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_BILL, "hx-post");
        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "due_date", "date");
        assert_form_submit_button(&form);
    }
}
