//! Defines the endpoints for listing a user's income and expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    transaction::core::{OwnerScope, Transaction, TransactionKind, get_transactions},
    user::User,
};

/// The state needed to read or delete a user's transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for the current user's income, newest first.
pub async fn get_income_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Transaction>>, Error> {
    list(&state, &user, TransactionKind::Income).map(Json)
}

/// A route handler for the current user's expenses, newest first.
pub async fn get_expenses_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Transaction>>, Error> {
    list(&state, &user, TransactionKind::Expense).map(Json)
}

/// Get all of `user`'s records of `kind`.
pub(super) fn list(
    state: &TransactionState,
    user: &User,
    kind: TransactionKind,
) -> Result<Vec<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transactions(kind, OwnerScope::User(user.id), None, &connection)
        .inspect_err(|error| tracing::error!("could not get {kind} for user {}: {error}", user.id))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::{
        USER_ID_HEADER, endpoints,
        test_utils::{create_test_transaction, create_test_user, get_test_server, get_test_state},
        transaction::TransactionKind,
    };

    #[tokio::test]
    async fn lists_own_income_newest_first() {
        let state = get_test_state();
        let user = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user(&connection);
            let other = create_test_user(&connection);
            create_test_transaction(user.id, TransactionKind::Income, 100, "2024-01-01", &connection);
            create_test_transaction(user.id, TransactionKind::Income, 200, "2024-03-01", &connection);
            create_test_transaction(user.id, TransactionKind::Expense, 300, "2024-02-01", &connection);
            create_test_transaction(other.id, TransactionKind::Income, 400, "2024-02-01", &connection);
            user
        };
        let server = get_test_server(state);

        let response = server
            .get(endpoints::GET_INCOME)
            .add_header(USER_ID_HEADER, user.id.to_string())
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let dates: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|income| income["date"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-01-01"]);
    }

    #[tokio::test]
    async fn lists_own_expenses() {
        let state = get_test_state();
        let user = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user(&connection);
            create_test_transaction(user.id, TransactionKind::Expense, 300, "2024-02-01", &connection);
            user
        };
        let server = get_test_server(state);

        let response = server
            .get(endpoints::GET_EXPENSES)
            .add_header(USER_ID_HEADER, user.id.to_string())
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["type"], "expense");
        assert_eq!(body[0]["amount"], 3.0);
    }
}
