//! The navigation bar shown at the top of every page.

use maud::{Markup, html};

use crate::endpoints;

/// A link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-emerald-700 rounded-sm lg:bg-transparent
        lg:text-emerald-700 lg:p-0 dark:text-white lg:dark:text-emerald-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        lg:hover:bg-transparent lg:border-0 lg:hover:text-emerald-700 lg:p-0
        dark:text-white lg:dark:hover:text-emerald-500 dark:hover:bg-gray-700
        dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!( a href=(self.url) class=(style) { (self.title) } )
    }
}

/// The navigation bar component.
pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
}

impl NavBar<'_> {
    /// Get the navigation bar.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        let entries = [
            (endpoints::DASHBOARD_VIEW, "Dashboard"),
            (endpoints::TRANSACTIONS_VIEW, "Transactions"),
            (endpoints::BILLS_VIEW, "Bills"),
            (endpoints::SHOPPING_LISTS_VIEW, "Shopping"),
            (endpoints::BUDGETS_VIEW, "Budgets"),
            (endpoints::CATEGORIES_VIEW, "Categories"),
            (endpoints::REPORT_VIEW, "Report"),
        ];

        let links = entries
            .into_iter()
            .map(|(url, title)| Link {
                url,
                title,
                is_current: active_endpoint == url,
            })
            .collect();

        NavBar { links }
    }

    /// Render the navigation bar.
    pub fn into_html(self) -> Markup {
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href="/"
                        class="flex items-center space-x-3"
                    {
                        img
                            src="/static/favicon-32x32.png"
                            alt="TwoCents Logo"
                            class="h-8"
                        ;

                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "TwoCents"
                        }
                    }

                    ul
                        class="font-medium flex flex-wrap gap-x-6 gap-y-2 p-4 lg:p-0 mt-4
                        lg:mt-0 dark:text-white"
                    {
                        @for link in self.links.into_iter() {
                            li { (link.into_html()) }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use std::collections::HashMap;

    use crate::{endpoints, navigation::NavBar};

    #[test]
    fn set_active_endpoint() {
        let mut cases = HashMap::new();
        cases.insert(endpoints::DASHBOARD_VIEW, true);
        cases.insert(endpoints::TRANSACTIONS_VIEW, true);
        cases.insert(endpoints::BILLS_VIEW, true);
        cases.insert(endpoints::SHOPPING_LISTS_VIEW, true);
        cases.insert(endpoints::BUDGETS_VIEW, true);
        cases.insert(endpoints::CATEGORIES_VIEW, true);
        cases.insert(endpoints::REPORT_VIEW, true);

        cases.insert(endpoints::ROOT, false);
        cases.insert(endpoints::POST_BILL, false);
        cases.insert(endpoints::POST_CATEGORY, false);
        cases.insert(endpoints::INTERNAL_ERROR_VIEW, false);
        cases.insert(endpoints::NEW_TRANSACTION_VIEW, false);

        for (endpoint, should_be_active) in cases {
            let nav_bar = NavBar::new(endpoint);

            assert_link_active(nav_bar, endpoint, should_be_active);
        }
    }

    #[track_caller]
    fn assert_link_active(nav_bar: NavBar<'_>, endpoint: &str, should_be_active: bool) {
        let get_active_string = |is_active: bool| -> &str {
            if is_active {
                "active (true)"
            } else {
                "inactive (false)"
            }
        };

        for link in nav_bar.links {
            if link.url == endpoint {
                assert_eq!(
                    link.is_current,
                    should_be_active,
                    "Link for current page should be {} but got {}",
                    get_active_string(should_be_active),
                    get_active_string(link.is_current),
                )
            } else {
                assert!(
                    !link.is_current,
                    "Link for inactive page should {} but got {}",
                    get_active_string(false),
                    get_active_string(link.is_current)
                )
            }
        }
    }
}
