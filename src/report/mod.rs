//! The monthly report page.

mod handlers;

pub use handlers::get_report_page;
