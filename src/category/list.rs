//! Categories listing page.

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

use crate::{
    AppState, Error, endpoints,
    category::{Category, CategoryId, get_all_categories},
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links,
    },
    navigation::NavBar,
};

/// The state needed for the categories listing page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A category with its usage count and formatted URLs for rendering.
#[derive(Debug, Clone)]
struct CategoryRow {
    category: Category,
    edit_url: String,
    delete_url: String,
    transaction_count: u32,
}

/// Render the categories listing page with transaction counts.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let transactions_per_category = count_transactions_per_category(&connection).inspect_err(
        |error| tracing::error!("Could not count transactions per category: {error}"),
    )?;

    let rows = categories
        .into_iter()
        .map(|category| {
            let transaction_count = *transactions_per_category.get(&category.id).unwrap_or(&0);

            CategoryRow {
                edit_url: endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id),
                delete_url: endpoints::format_endpoint(endpoints::DELETE_CATEGORY, category.id),
                category,
                transaction_count,
            }
        })
        .collect::<Vec<_>>();

    Ok(categories_view(&rows).into_response())
}

fn count_transactions_per_category(
    connection: &Connection,
) -> Result<HashMap<CategoryId, u32>, Error> {
    let result: Result<HashMap<CategoryId, u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT category_id, COUNT(1) FROM \"transaction\"
             WHERE category_id IS NOT NULL GROUP BY category_id",
        )?
        .query_map((), |row| {
            let category_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((category_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

fn categories_view(rows: &[CategoryRow]) -> Markup {
    let new_category_route = endpoints::NEW_CATEGORY_VIEW;
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Categories" }

                    a href=(new_category_route) class=(LINK_STYLE)
                    {
                        "Create Category"
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (category_row(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="3"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No categories created yet. "
                                        a href=(new_category_route) class=(LINK_STYLE)
                                        {
                                            "Create your first category"
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

    base("Categories", &[], &content)
}

fn category_row(row: &CategoryRow) -> Markup {
    let confirm_message = format!(
        "Are you sure you want to delete '{}'? {} transaction(s) will become uncategorized.",
        row.category.name, row.transaction_count
    );

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE)
                {
                    (row.category.name)
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                (row.transaction_count)
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &row.edit_url,
                        &row.delete_url,
                        &confirm_message,
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    )
}
