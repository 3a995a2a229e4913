//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/bills/{bill_id}', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page with summary cards, charts and tables.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying the couple's transactions, one month at a time.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for recording a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for displaying bills, split into unpaid and paid.
pub const BILLS_VIEW: &str = "/bills";
/// The page for registering a new bill.
pub const NEW_BILL_VIEW: &str = "/bills/new";
/// The page listing all shopping lists.
pub const SHOPPING_LISTS_VIEW: &str = "/shopping";
/// The page for a single shopping list and its items.
pub const SHOPPING_LIST_VIEW: &str = "/shopping/{list_id}";
/// The page for monthly budgets per category.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for listing all categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for creating a new category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page for editing an existing category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The monthly report page.
pub const REPORT_VIEW: &str = "/report";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create a transaction.
pub const POST_TRANSACTION: &str = "/api/transactions";
/// The route to delete a transaction.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to create a bill.
pub const POST_BILL: &str = "/api/bills";
/// The route to mark a bill as paid.
pub const PAY_BILL: &str = "/api/bills/{bill_id}/pay";
/// The route to delete a bill.
pub const DELETE_BILL: &str = "/api/bills/{bill_id}";
/// The route to create a shopping list.
pub const POST_SHOPPING_LIST: &str = "/api/shopping";
/// The route to delete a shopping list.
pub const DELETE_SHOPPING_LIST: &str = "/api/shopping/{list_id}";
/// The route to add an item to a shopping list.
pub const POST_SHOPPING_ITEM: &str = "/api/shopping/{list_id}/items";
/// The route to toggle a shopping item's purchased flag.
pub const TOGGLE_SHOPPING_ITEM: &str = "/api/shopping/items/{item_id}/toggle";
/// The route to delete a shopping item.
pub const DELETE_SHOPPING_ITEM: &str = "/api/shopping/items/{item_id}";
/// The route to create or replace a monthly budget.
pub const PUT_BUDGET: &str = "/api/budgets";
/// The route to delete a budget.
pub const DELETE_BUDGET: &str = "/api/budgets/{budget_id}";
/// The route to create a category.
pub const POST_CATEGORY: &str = "/api/categories";
/// The route to update a category.
pub const PUT_CATEGORY: &str = "/api/categories/{category_id}";
/// The route to delete a category.
pub const DELETE_CATEGORY: &str = "/api/categories/{category_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/bills/{bill_id}', '{bill_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
