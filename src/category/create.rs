//! Category creation page and endpoint.

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

use crate::{
    AppState, Error, endpoints,
    category::{CategoryName, create_category, domain::CategoryFormData},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryEndpointState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category creation page.
pub async fn get_new_category_page() -> Response {
    new_category_view().into_response()
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    Form(new_category): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&new_category.name) {
        Ok(name) => name,
        Err(error) => {
            return new_category_form_view(&format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(name, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

fn new_category_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();
    let form = new_category_form_view("");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Category", &[], &content)
}

fn new_category_form_view(error_message: &str) -> Markup {
    let create_category_endpoint = endpoints::POST_CATEGORY;

    html! {
        form
            hx-post=(create_category_endpoint)
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
                    placeholder="Category Name"
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

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Category" }
        }
    }
}

#[cfg(test)]
mod new_category_page_tests {
    use axum::http::StatusCode;

    use crate::{
        category::get_new_category_page,
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_new_category_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .expect("content-type header missing"),
            "text/html; charset=utf-8"
        );

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_CATEGORY, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_submit_button(&form);
    }
}

#[cfg(test)]
mod create_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::State,
        http::{StatusCode, header::CONTENT_TYPE},
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        category::{
            Category, CategoryName, create_category_endpoint, create_category_table,
            domain::CategoryFormData, get_category,
        },
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, get_header,
            must_get_form, parse_html_fragment,
        },
    };

    use super::CreateCategoryEndpointState;

    fn get_category_state() -> CreateCategoryEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_category_table(&connection).expect("Could not create category table");

        CreateCategoryEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn can_create_category() {
        let state = get_category_state();
        let name = CategoryName::new_unchecked("Mercado");
        let want = Category {
            id: 1,
            name: name.clone(),
        };
        let form = CategoryFormData {
            name: name.to_string(),
        };

        let response = create_category_endpoint(State(state.clone()), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        assert_eq!(
            Ok(want),
            get_category(1, &state.db_connection.lock().unwrap())
        );
    }

    #[tokio::test]
    async fn create_category_fails_on_empty_name() {
        let state = get_category_state();
        let form = CategoryFormData {
            name: "".to_string(),
        };

        let response = create_category_endpoint(State(state), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_header(&response, CONTENT_TYPE.as_str()),
            "text/html; charset=utf-8"
        );
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Category name cannot be empty");
    }
}
