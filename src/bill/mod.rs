//! Bill management: recurring obligations, payment, and the derived
//! overdue classification.

mod core;
mod create;
mod delete;
mod list;
mod pay;

pub use core::{
    Bill, BillStatus, create_bill, create_bill_table, delete_bill, get_all_bills, get_bill,
    map_bill_row, pay_bill,
};
pub use create::{create_bill_endpoint, get_new_bill_page};
pub use delete::delete_bill_endpoint;
pub use list::get_bills_page;
pub use pay::pay_bill_endpoint;
