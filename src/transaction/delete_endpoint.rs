//! Defines the endpoints for deleting a user's own income and expenses.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    Error,
    db::lock_connection,
    message_response,
    transaction::{
        core::{OwnerScope, TransactionId, TransactionKind, delete_transaction},
        list_endpoint::TransactionState,
    },
    user::User,
};

/// A route handler for deleting one of the current user's income records.
pub async fn delete_income_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
    Path(income_id): Path<TransactionId>,
) -> Result<Response, Error> {
    delete(&state, &user, TransactionKind::Income, income_id)
}

/// A route handler for deleting one of the current user's expense records.
pub async fn delete_expense_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
    Path(expense_id): Path<TransactionId>,
) -> Result<Response, Error> {
    delete(&state, &user, TransactionKind::Expense, expense_id)
}

fn delete(
    state: &TransactionState,
    user: &User,
    kind: TransactionKind,
    id: TransactionId,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    // Records of other users are reported as missing.
    match delete_transaction(kind, id, OwnerScope::User(user.id), &connection)? {
        0 => Err(Error::DeleteMissingTransaction),
        _ => {
            tracing::info!("User {} deleted {kind} {id}", user.id);
            Ok(message_response(
                StatusCode::OK,
                format!("{} deleted successfully", capitalize(kind.as_str())),
            ))
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::{
        USER_ID_HEADER,
        endpoints::{self, format_endpoint},
        test_utils::{create_test_transaction, create_test_user, get_test_server, get_test_state},
        transaction::{OwnerScope, TransactionKind, get_transactions},
    };

    #[tokio::test]
    async fn can_delete_own_income() {
        let state = get_test_state();
        let (user, income) = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user(&connection);
            let income = create_test_transaction(
                user.id,
                TransactionKind::Income,
                100,
                "2024-01-01",
                &connection,
            );
            (user, income)
        };
        let server = get_test_server(state.clone());

        let response = server
            .delete(&format_endpoint(endpoints::DELETE_INCOME, income.id))
            .add_header(USER_ID_HEADER, user.id.to_string())
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Income deleted successfully");
        let remaining = get_transactions(
            TransactionKind::Income,
            OwnerScope::User(user.id),
            None,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn cannot_delete_other_users_expense() {
        let state = get_test_state();
        let (intruder, expense) = {
            let connection = state.db_connection.lock().unwrap();
            let owner = create_test_user(&connection);
            let intruder = create_test_user(&connection);
            let expense = create_test_transaction(
                owner.id,
                TransactionKind::Expense,
                100,
                "2024-01-01",
                &connection,
            );
            (intruder, expense)
        };
        let server = get_test_server(state.clone());

        server
            .delete(&format_endpoint(endpoints::DELETE_EXPENSE, expense.id))
            .add_header(USER_ID_HEADER, intruder.id.to_string())
            .await
            .assert_status_not_found();

        let remaining = get_transactions(
            TransactionKind::Expense,
            OwnerScope::AllUsers,
            None,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(remaining.len(), 1);
    }

    #[tokio::test]
    async fn deleting_missing_record_is_not_found() {
        let state = get_test_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        let server = get_test_server(state);

        let response = server
            .delete(&format_endpoint(endpoints::DELETE_INCOME, 1337))
            .add_header(USER_ID_HEADER, user.id.to_string())
            .await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["message"], "Transaction not found");
    }
}
