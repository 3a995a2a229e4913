//! The 500 page, shown when a handler fails in a way the user cannot fix.

use axum::{http::StatusCode, response::Response};
use maud::{Markup, html};

use crate::html::{base, render};

/// The text content of the internal server error page.
pub struct InternalServerErrorPage<'a> {
    /// A short description of what went wrong.
    pub description: &'a str,
    /// What the user can do about it.
    pub fix: &'a str,
}

impl Default for InternalServerErrorPage<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

/// Route handler for the internal server error page.
pub async fn get_internal_server_error_page() -> Response {
    render_internal_server_error(Default::default())
}

/// Render the 500 page with the given text content.
pub fn render_internal_server_error(page: InternalServerErrorPage) -> Response {
    render(
        StatusCode::INTERNAL_SERVER_ERROR,
        error_page_view(
            "Internal Server Error",
            "500",
            page.description,
            page.fix,
            home_link(),
        ),
    )
}

/// The "Back to Homepage" button shared by the error pages.
pub fn home_link() -> Markup {
    html!(
        a
            href="/"
            class="inline-flex text-white bg-emerald-600 hover:bg-emerald-800
                font-medium rounded text-sm px-5 py-2.5 text-center my-4"
        {
            "Back to Homepage"
        }
    )
}

/// The shared layout for full-page error views (404, 500).
pub fn error_page_view(
    title: &str,
    header: &str,
    description: &str,
    fix: &str,
    action: Markup,
) -> Markup {
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-emerald-600 dark:text-emerald-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    (action)
                }
            }
        }
    );

    base(title, &[], &content)
}
