//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are rendered as HTML fragments that htmx swaps into the fixed
//! `#alert-container` element at the bottom of every page.

use maud::{Markup, html};

const ERROR_ALERT_STYLE: &str = "flex flex-col gap-1 p-4 text-sm text-red-800 \
    rounded-lg bg-red-50 shadow-lg dark:bg-gray-800 dark:text-red-400";

const SUCCESS_ALERT_STYLE: &str = "flex flex-col gap-1 p-4 text-sm text-green-800 \
    rounded-lg bg-green-50 shadow-lg dark:bg-gray-800 dark:text-green-400";

/// Builds alert markup.
pub struct AlertView;

impl AlertView {
    /// An error alert with a headline and details.
    pub fn error(message: &str, details: &str) -> Markup {
        alert_view(ERROR_ALERT_STYLE, message, details)
    }

    /// A success alert with just a headline.
    pub fn success(message: &str) -> Markup {
        alert_view(SUCCESS_ALERT_STYLE, message, "")
    }
}

fn alert_view(style: &str, message: &str, details: &str) -> Markup {
    html!(
        div class=(style) role="alert"
        {
            div class="flex items-center justify-between gap-4"
            {
                span class="font-medium" { (message) }

                button
                    type="button"
                    class="font-bold cursor-pointer"
                    onclick="this.closest('[role=alert]').remove(); \
                        document.getElementById('alert-container').classList.add('hidden');"
                    aria-label="Dismiss"
                {
                    "✕"
                }
            }

            @if !details.is_empty() {
                p { (details) }
            }
        }

        // The container starts hidden so an empty container takes no space.
        script
        {
            "document.getElementById('alert-container').classList.remove('hidden');"
        }
    )
}

#[cfg(test)]
mod alert_tests {
    use super::AlertView;

    #[test]
    fn error_alert_contains_message_and_details() {
        let markup = AlertView::error("Could not delete bill", "The bill could not be found.");
        let rendered = markup.into_string();

        assert!(rendered.contains("Could not delete bill"));
        assert!(rendered.contains("The bill could not be found."));
        assert!(rendered.contains("role=\"alert\""));
    }

    #[test]
    fn success_alert_has_no_details_paragraph() {
        let rendered = AlertView::success("Bill deleted successfully").into_string();

        assert!(rendered.contains("Bill deleted successfully"));
        assert!(!rendered.contains("<p>"));
    }
}
