//! Category editing page and endpoint.

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

use crate::{
    AppState, Error, endpoints,
    category::{CategoryId, CategoryName, domain::CategoryFormData, get_category, update_category},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for the edit category page and update endpoint.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category editing page.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, category_id);

    match get_category(category_id, &connection) {
        Ok(category) => {
            Ok(edit_category_view(&update_endpoint, category.name.as_ref(), "").into_response())
        }
        Err(error) => {
            let error_message = match error {
                Error::NotFound => "Category not found",
                _ => {
                    tracing::error!("Failed to retrieve category {category_id}: {error}");
                    "Failed to load category"
                }
            };

            Ok(edit_category_view(&update_endpoint, "", error_message).into_response())
        }
    }
}

/// Handle category update form submission.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, category_id);

    let name = match CategoryName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return edit_category_form_view(
                &update_endpoint,
                &form_data.name,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    match update_category(category_id, name, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingCategory) => Error::UpdateMissingCategory.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_category_view(update_endpoint: &str, category_name: &str, error_message: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let form = edit_category_form_view(update_endpoint, category_name, error_message);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Category", &[], &content)
}

fn edit_category_form_view(
    update_endpoint: &str,
    category_name: &str,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    value=(category_name)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Category" }
        }
    }
}
