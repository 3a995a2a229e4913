//! Bill payment endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, bill::core::pay_bill, database_id::BillId, endpoints, timezone::today_in,
};

/// The state needed for paying a bill.
#[derive(Debug, Clone)]
pub struct PayBillEndpointState {
    /// The database connection for managing bills.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for PayBillEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Mark a bill as paid today.
///
/// The payment date is today in the configured timezone; a pending bill
/// past its due date transitions to paid the same way (late payment).
pub async fn pay_bill_endpoint(
    Path(bill_id): Path<BillId>,
    State(state): State<PayBillEndpointState>,
) -> Response {
    let today = match today_in(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match pay_bill(bill_id, today, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BILLS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::PayMissingBill | Error::BillAlreadyPaid(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while paying bill {bill_id}: {error}");
            error.into_alert_response()
        }
    }
}
