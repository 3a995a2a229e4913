//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// Database identifier for a bill.
pub type BillId = i64;

/// Database identifier for a shopping list.
pub type ShoppingListId = i64;

/// Database identifier for a shopping item.
pub type ShoppingItemId = i64;

/// Database identifier for a budget.
pub type BudgetId = i64;
