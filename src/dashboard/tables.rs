//! The monthly summary table for the dashboard.

use maud::{Markup, html};
use time::Date;

use crate::{
    aggregation::{format_month_labels, net_by_month, sorted_months, totals_by_month},
    html::{TABLE_CELL_STYLE, TABLE_ROW_STYLE, format_currency},
    transaction::{Transaction, TransactionKind},
};

const TABLE_HEADER_CELL_STYLE: &str = "px-3 py-3 text-center min-w-[100px]";
const TABLE_HEADER_FIRST_CELL_STYLE: &str =
    "px-3 py-3 sticky left-0 bg-gray-100 dark:bg-gray-700 z-10 font-semibold";
const TABLE_STICKY_CELL_STYLE: &str = "px-3 py-4 font-medium text-gray-900 dark:text-white sticky left-0 bg-white dark:bg-gray-800 z-10";
const TABLE_DATA_CELL_STYLE: &str = "text-center whitespace-nowrap";
const TABLE_CELL_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const TABLE_CELL_RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// Gets the CSS class for coloring amounts (green for non-negative, red for negative).
fn amount_color_class(amount: f64) -> &'static str {
    if amount >= 0.0 {
        TABLE_CELL_GREEN_STYLE
    } else {
        TABLE_CELL_RED_STYLE
    }
}

/// Renders a table showing income, expenses and net for each month.
///
/// Renders nothing when there are no transactions.
pub(super) fn monthly_summary_table(transactions: &[Transaction]) -> Markup {
    let months: Vec<Date> = sorted_months(transactions);

    if months.is_empty() {
        return html! {};
    }

    let labels = format_month_labels(&months);
    let income = totals_by_month(transactions, TransactionKind::Income);
    let expenses = totals_by_month(transactions, TransactionKind::Expense);
    let net = net_by_month(transactions);

    html! {
        div {
            h3 class="text-xl font-semibold mb-4" { "Monthly Summary" }

            div
                id="monthly-summary-table"
                class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class="text-xs text-gray-900 uppercase bg-gray-100 dark:bg-gray-700 dark:text-gray-400" {
                        tr {
                            th scope="col" class=(TABLE_HEADER_FIRST_CELL_STYLE) {
                                ""
                            }
                            @for label in &labels {
                                th scope="col" class={(TABLE_HEADER_CELL_STYLE) " font-semibold"} {
                                    (label)
                                }
                            }
                        }
                    }
                    tbody {
                        tr class=(TABLE_ROW_STYLE) {
                            th scope="row" class=(TABLE_STICKY_CELL_STYLE) {
                                "Income"
                            }
                            @for month in &months {
                                td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE) " " (TABLE_CELL_GREEN_STYLE)} {
                                    (format_currency(income.get(month).copied().unwrap_or(0.0)))
                                }
                            }
                        }

                        tr class=(TABLE_ROW_STYLE) {
                            th scope="row" class=(TABLE_STICKY_CELL_STYLE) {
                                "Expenses"
                            }
                            @for month in &months {
                                td class={(TABLE_CELL_STYLE) " " (TABLE_DATA_CELL_STYLE) " " (TABLE_CELL_RED_STYLE)} {
                                    (format_currency(expenses.get(month).copied().unwrap_or(0.0)))
                                }
                            }
                        }

                        tr class=(TABLE_ROW_STYLE) {
                            th scope="row" class=(TABLE_STICKY_CELL_STYLE) {
                                "Net"
                            }
                            @for month in &months {
                                td class=(TABLE_CELL_STYLE) {
                                    @let amount = net.get(month).copied().unwrap_or(0.0);
                                    div class={(TABLE_DATA_CELL_STYLE) " " (amount_color_class(amount))} {
                                        (format_currency(amount))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod monthly_summary_table_tests {
    use time::macros::date;

    use crate::transaction::{Transaction, TransactionKind};

    use super::monthly_summary_table;

    fn transaction(amount: f64, kind: TransactionKind, date: time::Date) -> Transaction {
        Transaction {
            id: 0,
            amount,
            kind,
            date,
            description: String::new(),
            category_id: None,
        }
    }

    #[test]
    fn renders_nothing_without_transactions() {
        assert_eq!(monthly_summary_table(&[]).into_string(), "");
    }

    #[test]
    fn renders_one_column_per_month() {
        let transactions = vec![
            transaction(100.0, TransactionKind::Income, date!(2025 - 06 - 15)),
            transaction(40.0, TransactionKind::Expense, date!(2025 - 07 - 02)),
        ];

        let rendered = monthly_summary_table(&transactions).into_string();

        assert!(rendered.contains("Jun"));
        assert!(rendered.contains("Jul"));
        assert!(rendered.contains("R$100.00"));
        assert!(rendered.contains("R$40.00"));
    }
}
