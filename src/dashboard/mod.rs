//! Dashboard module
//!
//! Provides an overview page showing summary cards, charts and a monthly
//! summary table.

mod cards;
mod charts;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;
