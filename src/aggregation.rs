//! Pure aggregation over already-fetched transactions and bills.
//!
//! Every function here is a synchronous computation over in-memory slices:
//! no I/O, no shared state, and no ambient clock. "Today" and month windows
//! are always parameters so the dashboard, report and bills pages stay
//! deterministic and unit-testable.

use std::{
    collections::{HashMap, HashSet},
    ops::Range,
};

use time::{Date, Month};

use crate::{
    bill::{Bill, BillStatus},
    category::CategoryId,
    transaction::{Transaction, TransactionKind},
};

/// The label rows fall under when they have no category.
pub(crate) const UNCATEGORIZED_LABEL: &str = "Other";

/// Sum the amounts of the transactions matching `kind`.
///
/// An empty slice sums to 0.
pub(crate) fn sum_by_kind(transactions: &[Transaction], kind: TransactionKind) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.kind == kind)
        .map(|transaction| transaction.amount)
        .sum()
}

/// The percentage change from `previous` to `current`, rounded to 2 decimal
/// places.
///
/// A zero `previous` means there is no baseline to compare against, so the
/// change is reported as 0 rather than +infinity. Dropping from a non-zero
/// `previous` to zero is -100.
pub(crate) fn percentage_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }

    if current == 0.0 {
        return -100.0;
    }

    round2((current - previous) / previous.abs() * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whether `bill` is logically overdue on `today`.
///
/// A bill is overdue if its stored status says so, or if it is still
/// pending past its due date. The stored status alone is not authoritative;
/// callers must classify through this function rather than comparing
/// against [BillStatus::Overdue].
pub(crate) fn is_overdue(bill: &Bill, today: Date) -> bool {
    match bill.status {
        BillStatus::Overdue => true,
        BillStatus::Pending => bill.due_date < today,
        BillStatus::Paid => false,
    }
}

/// Sum the amounts of the bills that are logically overdue on `today`.
pub(crate) fn overdue_total(bills: &[Bill], today: Date) -> f64 {
    bills
        .iter()
        .filter(|bill| is_overdue(bill, today))
        .map(|bill| bill.amount)
        .sum()
}

/// The half-open date window covering one calendar month:
/// `[month start, next month start)`.
pub(crate) fn month_window(month: Month, year: i32) -> Range<Date> {
    let start = Date::from_calendar_date(year, month, 1)
        .expect("the first of a month is always a valid date");

    let end = match month {
        Month::December => Date::from_calendar_date(year + 1, Month::January, 1),
        other => Date::from_calendar_date(year, other.next(), 1),
    }
    .expect("the first of a month is always a valid date");

    start..end
}

/// The total spent in one calendar month.
///
/// Three kinds of rows contribute: expense transactions dated in the month,
/// bills paid in the month, and unpaid bills due in the month. A bill counts
/// either through its payment date or, while unpaid, through its due date,
/// never both, because paid and pending/overdue are mutually exclusive.
pub(crate) fn monthly_expense_total(
    transactions: &[Transaction],
    bills: &[Bill],
    month: Month,
    year: i32,
) -> f64 {
    let window = month_window(month, year);

    let transaction_total: f64 = transactions
        .iter()
        .filter(|transaction| {
            transaction.kind == TransactionKind::Expense && window.contains(&transaction.date)
        })
        .map(|transaction| transaction.amount)
        .sum();

    let bill_total: f64 = bills
        .iter()
        .filter(|bill| match bill.status {
            BillStatus::Paid => bill
                .paid_at
                .map(|paid_at| window.contains(&paid_at))
                .unwrap_or(false),
            BillStatus::Pending | BillStatus::Overdue => window.contains(&bill.due_date),
        })
        .map(|bill| bill.amount)
        .sum();

    transaction_total + bill_total
}

/// Net transaction amounts by month: income adds, expenses subtract.
///
/// # Returns
/// HashMap mapping each month (as Date with day=1) to the net amount.
pub(crate) fn net_by_month(transactions: &[Transaction]) -> HashMap<Date, f64> {
    let mut totals = HashMap::new();

    for transaction in transactions {
        let month = transaction.date.replace_day(1).unwrap();
        let signed = match transaction.kind {
            TransactionKind::Income => transaction.amount,
            TransactionKind::Expense => -transaction.amount,
        };
        *totals.entry(month).or_insert(0.0) += signed;
    }

    totals
}

/// Transaction amounts of one kind by month.
///
/// # Returns
/// HashMap mapping each month (as Date with day=1) to the summed amount.
pub(crate) fn totals_by_month(
    transactions: &[Transaction],
    kind: TransactionKind,
) -> HashMap<Date, f64> {
    let mut totals = HashMap::new();

    for transaction in transactions {
        if transaction.kind != kind {
            continue;
        }

        let month = transaction.date.replace_day(1).unwrap();
        *totals.entry(month).or_insert(0.0) += transaction.amount;
    }

    totals
}

/// Extracts unique months from transactions and returns them in chronological order.
///
/// # Returns
/// Vector of unique months (as Dates with day=1) sorted chronologically.
pub(crate) fn sorted_months(transactions: &[Transaction]) -> Vec<Date> {
    let mut months = HashSet::new();

    for transaction in transactions {
        let month = transaction.date.replace_day(1).unwrap();
        months.insert(month);
    }

    let mut sorted: Vec<_> = months.into_iter().collect();
    sorted.sort();
    sorted
}

/// Formats month dates as three-letter abbreviations, e.g. "Jan", "Feb".
pub(crate) fn format_month_labels(months: &[Date]) -> Vec<String> {
    let month_to_str = |date: &Date| {
        match date.month() {
            Month::January => "Jan",
            Month::February => "Feb",
            Month::March => "Mar",
            Month::April => "Apr",
            Month::May => "May",
            Month::June => "Jun",
            Month::July => "Jul",
            Month::August => "Aug",
            Month::September => "Sep",
            Month::October => "Oct",
            Month::November => "Nov",
            Month::December => "Dec",
        }
        .to_string()
    };

    months.iter().map(month_to_str).collect()
}

/// Per-category expense totals, for the report table and expenses chart.
///
/// Transactions without a category (or whose category has since been
/// deleted) are grouped under [UNCATEGORIZED_LABEL]. Categories are sorted
/// alphabetically with the uncategorized group last.
pub(crate) fn expenses_by_category(
    transactions: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
) -> Vec<(String, f64)> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }

        let label = transaction
            .category_id
            .and_then(|id| category_names.get(&id))
            .map(String::as_str)
            .unwrap_or(UNCATEGORIZED_LABEL);

        *totals.entry(label).or_insert(0.0) += transaction.amount;
    }

    let mut labels: Vec<&str> = totals
        .keys()
        .copied()
        .filter(|&label| label != UNCATEGORIZED_LABEL)
        .collect();
    labels.sort_unstable();

    if totals.contains_key(UNCATEGORIZED_LABEL) {
        labels.push(UNCATEGORIZED_LABEL);
    }

    labels
        .into_iter()
        .map(|label| (label.to_owned(), totals[label]))
        .collect()
}
