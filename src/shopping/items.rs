//! A single shopping list's page and item-level endpoints.
//!
//! Toggling an item swaps just its table row via htmx rather than
//! reloading the whole page.

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
    database_id::{ShoppingItemId, ShoppingListId},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    shopping::core::{
        ShoppingItem, ShoppingList, add_item, delete_item, get_items, get_shopping_list,
        toggle_item,
    },
};

/// The state needed for the shopping list page and item endpoints.
#[derive(Debug, Clone)]
pub struct ShoppingItemsState {
    /// The database connection for managing shopping items.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ShoppingItemsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Form data for adding an item to a list.
#[derive(Debug, Deserialize)]
pub struct ShoppingItemFormData {
    /// What to buy.
    pub name: String,
    /// How many to buy.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// The expected unit price.
    #[serde(default)]
    pub estimated_price: f64,
}

fn default_quantity() -> u32 {
    1
}

/// Display one shopping list and its items.
pub async fn get_shopping_list_page(
    Path(list_id): Path<ShoppingListId>,
    State(state): State<ShoppingItemsState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let list = get_shopping_list(list_id, &connection)?;
    let items = get_items(list_id, &connection)
        .inspect_err(|error| tracing::error!("could not get shopping items: {error}"))?;

    Ok(shopping_list_view(&list, &items).into_response())
}

/// Handle adding an item to a list.
pub async fn add_shopping_item_endpoint(
    Path(list_id): Path<ShoppingListId>,
    State(state): State<ShoppingItemsState>,
    Form(form): Form<ShoppingItemFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match add_item(
        list_id,
        &form.name,
        form.quantity,
        form.estimated_price,
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(endpoints::format_endpoint(
                endpoints::SHOPPING_LIST_VIEW,
                list_id,
            )),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while adding a shopping item: {error}");

            error.into_alert_response()
        }
    }
}

/// Flip an item's purchased flag and return its updated table row.
pub async fn toggle_shopping_item_endpoint(
    Path(item_id): Path<ShoppingItemId>,
    State(state): State<ShoppingItemsState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match toggle_item(item_id, &connection) {
        Ok(item) => item_row(&item).into_response(),
        Err(Error::MissingShoppingItem) => Error::MissingShoppingItem.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while toggling shopping item {item_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// Handle item deletion.
pub async fn delete_shopping_item_endpoint(
    Path(item_id): Path<ShoppingItemId>,
    State(state): State<ShoppingItemsState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_item(item_id, &connection) {
        Ok(_) => AlertView::success("Item removed").into_response(),
        Err(Error::MissingShoppingItem) => Error::MissingShoppingItem.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting shopping item {item_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn shopping_list_view(list: &ShoppingList, items: &[ShoppingItem]) -> Markup {
    let nav_bar = NavBar::new(endpoints::SHOPPING_LISTS_VIEW).into_html();
    let add_item_endpoint = endpoints::format_endpoint(endpoints::POST_SHOPPING_ITEM, list.id);
    let estimated_total: f64 = items.iter().map(ShoppingItem::estimated_subtotal).sum();
    let purchased_total: f64 = items
        .iter()
        .filter(|item| item.purchased)
        .map(ShoppingItem::estimated_subtotal)
        .sum();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { (list.name) }

                    a href=(endpoints::SHOPPING_LISTS_VIEW) class=(LINK_STYLE)
                    {
                        "All lists"
                    }
                }

                div class="flex gap-8"
                {
                    p
                    {
                        "Estimated: "
                        span class="font-semibold" { (format_currency(estimated_total)) }
                    }

                    p
                    {
                        "In the cart: "
                        span class="font-semibold" { (format_currency(purchased_total)) }
                    }
                }

                form
                    hx-post=(add_item_endpoint)
                    hx-target-error="#alert-container"
                    class="flex flex-wrap gap-2"
                {
                    input
                        type="text"
                        name="name"
                        placeholder="Item"
                        required
                        class={(FORM_TEXT_INPUT_STYLE) " max-w-xs"};

                    input
                        type="number"
                        name="quantity"
                        min="1"
                        value="1"
                        required
                        class={(FORM_TEXT_INPUT_STYLE) " max-w-24"};

                    input
                        type="number"
                        name="estimated_price"
                        step="0.01"
                        min="0"
                        placeholder="Unit price"
                        class={(FORM_TEXT_INPUT_STYLE) " max-w-36"};

                    button type="submit" class={(BUTTON_PRIMARY_STYLE) " max-w-32"} { "Add" }
                }

                section class="dark:bg-gray-800 overflow-x-auto rounded-lg shadow"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Bought" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Item" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Qty" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Unit price" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Subtotal" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for item in items {
                                (item_row(item))
                            }

                            @if items.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "Nothing on this list yet."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base(&list.name, &[], &content)
}

fn item_row(item: &ShoppingItem) -> Markup {
    let toggle_url = endpoints::format_endpoint(endpoints::TOGGLE_SHOPPING_ITEM, item.id);
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_SHOPPING_ITEM, item.id);
    let name_style = if item.purchased {
        "line-through text-gray-400 dark:text-gray-500"
    } else {
        ""
    };

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                input
                    type="checkbox"
                    checked[item.purchased]
                    hx-post=(toggle_url)
                    hx-target="closest tr"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container";
            }

            td class={(TABLE_CELL_STYLE) " " (name_style)} { (item.name) }

            td class=(TABLE_CELL_STYLE) { (item.quantity) }

            td class=(TABLE_CELL_STYLE) { (format_currency(item.estimated_price)) }

            td class=(TABLE_CELL_STYLE) { (format_currency(item.estimated_subtotal())) }

            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    class=(LINK_STYLE)
                    hx-delete=(delete_url)
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
mod shopping_list_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        shopping::{add_item, create_shopping_list, get_items, get_shopping_list_page},
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
    };

    use super::{ShoppingItemsState, toggle_shopping_item_endpoint};

    fn get_page_state() -> ShoppingItemsState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        ShoppingItemsState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn shows_items_and_totals() {
        let state = get_page_state();
        let list_id = {
            let connection = state.db_connection.lock().unwrap();
            let list = create_shopping_list("Groceries", date!(2025 - 07 - 05), &connection)
                .unwrap();
            add_item(list.id, "Rice", 2, 8.5, &connection).unwrap();
            list.id
        };

        let response = get_shopping_list_page(Path(list_id), State(state))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("Rice"));
        assert!(html.html().contains("R$17.00"));
    }

    #[tokio::test]
    async fn missing_list_returns_not_found() {
        let state = get_page_state();

        let result = get_shopping_list_page(Path(999), State(state)).await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }

    #[tokio::test]
    async fn toggling_an_item_returns_its_updated_row() {
        let state = get_page_state();
        let item_id = {
            let connection = state.db_connection.lock().unwrap();
            let list = create_shopping_list("Groceries", date!(2025 - 07 - 05), &connection)
                .unwrap();
            add_item(list.id, "Beans", 1, 6.0, &connection).unwrap().id
        };

        let response = toggle_shopping_item_endpoint(Path(item_id), State(state.clone()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let items = get_items(1, &state.db_connection.lock().unwrap()).unwrap();
        assert!(items[0].purchased);
    }
}
