//! Application router configuration.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    bill::{
        create_bill_endpoint, delete_bill_endpoint, get_bills_page, get_new_bill_page,
        pay_bill_endpoint,
    },
    budget::{delete_budget_endpoint, get_budgets_page, set_budget_endpoint},
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_edit_category_page, get_new_category_page, update_category_endpoint,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    logging::logging_middleware,
    not_found::get_404_not_found,
    report::get_report_page,
    shopping::{
        add_shopping_item_endpoint, create_shopping_list_endpoint,
        delete_shopping_item_endpoint, delete_shopping_list_endpoint, get_shopping_list_page,
        get_shopping_lists_page, toggle_shopping_item_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_new_transaction_page,
        get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page),
        )
        .route(endpoints::BILLS_VIEW, get(get_bills_page))
        .route(endpoints::NEW_BILL_VIEW, get(get_new_bill_page))
        .route(endpoints::SHOPPING_LISTS_VIEW, get(get_shopping_lists_page))
        .route(endpoints::SHOPPING_LIST_VIEW, get(get_shopping_list_page))
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::NEW_CATEGORY_VIEW, get(get_new_category_page))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(endpoints::REPORT_VIEW, get(get_report_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(endpoints::POST_TRANSACTION, post(create_transaction_endpoint))
        .route(
            endpoints::DELETE_TRANSACTION,
            delete(delete_transaction_endpoint),
        )
        .route(endpoints::POST_BILL, post(create_bill_endpoint))
        .route(endpoints::PAY_BILL, post(pay_bill_endpoint))
        .route(endpoints::DELETE_BILL, delete(delete_bill_endpoint))
        .route(
            endpoints::POST_SHOPPING_LIST,
            post(create_shopping_list_endpoint),
        )
        .route(
            endpoints::DELETE_SHOPPING_LIST,
            delete(delete_shopping_list_endpoint),
        )
        .route(
            endpoints::POST_SHOPPING_ITEM,
            post(add_shopping_item_endpoint),
        )
        .route(
            endpoints::TOGGLE_SHOPPING_ITEM,
            post(toggle_shopping_item_endpoint),
        )
        .route(
            endpoints::DELETE_SHOPPING_ITEM,
            delete(delete_shopping_item_endpoint),
        )
        .route(endpoints::PUT_BUDGET, put(set_budget_endpoint))
        .route(endpoints::DELETE_BUDGET, delete(delete_budget_endpoint))
        .route(endpoints::POST_CATEGORY, post(create_category_endpoint))
        .route(endpoints::PUT_CATEGORY, put(update_category_endpoint))
        .route(endpoints::DELETE_CATEGORY, delete(delete_category_endpoint));

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}
