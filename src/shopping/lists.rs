//! The shopping lists overview page and list-level endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::AlertView,
    dates::{self, DateLocale},
    database_id::ShoppingListId,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    shopping::core::{
        ShoppingListSummary, create_shopping_list, delete_shopping_list, get_all_list_summaries,
    },
    timezone::today_in,
};

/// The state needed for the shopping lists page and endpoints.
#[derive(Debug, Clone)]
pub struct ShoppingListsState {
    /// The database connection for managing shopping lists.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for ShoppingListsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Form data for creating a shopping list.
#[derive(Debug, Deserialize)]
pub struct ShoppingListFormData {
    /// The list's name.
    pub name: String,
}

/// Display every shopping list with its progress.
pub async fn get_shopping_lists_page(
    State(state): State<ShoppingListsState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let summaries = get_all_list_summaries(&connection)
        .inspect_err(|error| tracing::error!("could not get shopping lists: {error}"))?;

    Ok(shopping_lists_view(&summaries).into_response())
}

/// Handle shopping list creation.
pub async fn create_shopping_list_endpoint(
    State(state): State<ShoppingListsState>,
    Form(form): Form<ShoppingListFormData>,
) -> Response {
    let today = match today_in(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_shopping_list(&form.name, today, &connection) {
        Ok(list) => (
            HxRedirect(endpoints::format_endpoint(
                endpoints::SHOPPING_LIST_VIEW,
                list.id,
            )),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a shopping list: {error}");

            error.into_alert_response()
        }
    }
}

/// Handle shopping list deletion. Items are removed with the list.
pub async fn delete_shopping_list_endpoint(
    Path(list_id): Path<ShoppingListId>,
    State(state): State<ShoppingListsState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_shopping_list(list_id, &connection) {
        Ok(_) => AlertView::success("Shopping list deleted successfully").into_response(),
        Err(Error::DeleteMissingShoppingList) => {
            Error::DeleteMissingShoppingList.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting shopping list {list_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn shopping_lists_view(summaries: &[ShoppingListSummary]) -> Markup {
    let nav_bar = NavBar::new(endpoints::SHOPPING_LISTS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Shopping Lists" }
                }

                form
                    hx-post=(endpoints::POST_SHOPPING_LIST)
                    hx-target-error="#alert-container"
                    class="flex gap-2 max-w-md"
                {
                    input
                        type="text"
                        name="name"
                        placeholder="New list name"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create" }
                }

                section class="dark:bg-gray-800 overflow-x-auto rounded-lg shadow"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Items" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Estimated" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for summary in summaries {
                                (summary_row(summary))
                            }

                            @if summaries.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No shopping lists yet. Create one above."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Shopping Lists", &[], &content)
}

fn summary_row(summary: &ShoppingListSummary) -> Markup {
    let open_url = endpoints::format_endpoint(endpoints::SHOPPING_LIST_VIEW, summary.list.id);
    let delete_url =
        endpoints::format_endpoint(endpoints::DELETE_SHOPPING_LIST, summary.list.id);
    let confirm_message = format!(
        "Are you sure you want to delete '{}' and its {} item(s)?",
        summary.list.name, summary.item_count
    );

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                a href=(open_url) class=(LINK_STYLE) { (summary.list.name) }
            }

            td class=(TABLE_CELL_STYLE)
            {
                (dates::format_display(summary.list.created_on, DateLocale::PtBr))
            }

            td class=(TABLE_CELL_STYLE)
            {
                (summary.purchased_count) " / " (summary.item_count)
            }

            td class=(TABLE_CELL_STYLE) { (format_currency(summary.estimated_total)) }

            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    class=(LINK_STYLE)
                    hx-delete=(delete_url)
                    hx-confirm=(confirm_message)
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

#[cfg(test)]
mod shopping_lists_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        shopping::{create_shopping_list, get_shopping_lists_page},
        test_utils::{assert_status_ok, assert_valid_html, get_header, parse_html_document},
    };

    use super::{ShoppingListFormData, ShoppingListsState, create_shopping_list_endpoint};

    fn get_page_state() -> ShoppingListsState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        ShoppingListsState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn lists_existing_shopping_lists() {
        let state = get_page_state();
        create_shopping_list(
            "Groceries",
            date!(2025 - 07 - 05),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_shopping_lists_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("Groceries"));
    }

    #[tokio::test]
    async fn create_list_redirects_to_the_new_list() {
        let state = get_page_state();
        let form = ShoppingListFormData {
            name: "Farmacia".to_owned(),
        };

        let response = create_shopping_list_endpoint(State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "hx-redirect"), "/shopping/1");
    }

    #[tokio::test]
    async fn create_list_rejects_empty_name() {
        let state = get_page_state();
        let form = ShoppingListFormData {
            name: "   ".to_owned(),
        };

        let response = create_shopping_list_endpoint(State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
