//! The 404 page.

use axum::{http::StatusCode, response::Response};
use maud::Markup;

use crate::{
    html::render,
    internal_server_error::{error_page_view, home_link},
};

/// Route handler for unknown paths.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

/// Build the 404 response directly, for use outside a route handler.
pub fn get_404_not_found_response() -> Response {
    render(StatusCode::NOT_FOUND, not_found_view())
}

fn not_found_view() -> Markup {
    error_page_view(
        "Page Not Found",
        "404",
        "Whoops! That page does not exist.",
        "Check the address, or head back home.",
        home_link(),
    )
}
