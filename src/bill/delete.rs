//! Bill deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::AlertView, bill::core::delete_bill, database_id::BillId};

/// The state needed for deleting a bill.
#[derive(Debug, Clone)]
pub struct DeleteBillEndpointState {
    /// The database connection for managing bills.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteBillEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle bill deletion. Returns a success alert or an error.
pub async fn delete_bill_endpoint(
    Path(bill_id): Path<BillId>,
    State(state): State<DeleteBillEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_bill(bill_id, &connection) {
        Ok(_) => AlertView::success("Bill deleted successfully").into_response(),
        Err(Error::DeleteMissingBill) => Error::DeleteMissingBill.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting bill {bill_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_bill_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        bill::{create_bill, delete_bill_endpoint, get_bill},
        db::initialize,
    };

    use super::DeleteBillEndpointState;

    fn get_delete_state() -> DeleteBillEndpointState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        DeleteBillEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn delete_bill_endpoint_succeeds() {
        let state = get_delete_state();
        let bill = create_bill(
            "Rent",
            1200.0,
            date!(2025 - 08 - 05),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test bill");

        let response = delete_bill_endpoint(Path(bill.id), State(state.clone()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_bill(bill.id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_bill_endpoint_with_invalid_id_returns_error_html() {
        let state = get_delete_state();

        let response = delete_bill_endpoint(Path(999999), State(state))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
