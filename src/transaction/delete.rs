//! Transaction deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::AlertView,
    database_id::TransactionId,
    transaction::core::delete_transaction,
};

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionEndpointState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle transaction deletion. Returns a success alert or an error.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<DeleteTransactionEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, &connection) {
        Ok(_) => AlertView::success("Transaction deleted successfully").into_response(),
        Err(Error::DeleteMissingTransaction) => {
            Error::DeleteMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        test_utils::{assert_valid_html, get_header, parse_html_fragment},
        transaction::{
            Transaction, TransactionKind, count_transactions, create_transaction,
            delete_transaction_endpoint,
        },
    };

    use super::DeleteTransactionEndpointState;

    fn get_delete_state() -> DeleteTransactionEndpointState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        DeleteTransactionEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn delete_transaction_endpoint_succeeds() {
        let state = get_delete_state();
        let transaction = create_transaction(
            Transaction::build(10.0, TransactionKind::Expense, date!(2025 - 07 - 01), ""),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test transaction");

        let response = delete_transaction_endpoint(Path(transaction.id), State(state.clone()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            count_transactions(&state.db_connection.lock().unwrap()),
            Ok(0)
        );
    }

    #[tokio::test]
    async fn delete_transaction_endpoint_with_invalid_id_returns_error_html() {
        let state = get_delete_state();
        let invalid_id = 999999;

        let response = delete_transaction_endpoint(Path(invalid_id), State(state))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_header(&response, "content-type"),
            "text/html; charset=utf-8"
        );

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
    }
}
