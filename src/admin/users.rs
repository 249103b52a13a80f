//! Listing and deleting users.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    Error,
    admin::AdminState,
    db::lock_connection,
    message_response,
    user::{User, UserID, delete_user, get_all_users},
};

/// A route handler for listing every user.
pub async fn get_users(State(state): State<AdminState>) -> Result<Json<Vec<User>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_users(&connection)
        .inspect_err(|error| tracing::error!("could not get users: {error}"))
        .map(Json)
}

/// A route handler for deleting a user together with their income and expenses.
pub async fn delete_user_endpoint(
    State(state): State<AdminState>,
    Path(user_id): Path<UserID>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_user(user_id, &connection)?;

    Ok(message_response(
        StatusCode::OK,
        "User and all associated data deleted successfully",
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::{
        USER_ID_HEADER,
        endpoints::{self, format_endpoint},
        test_utils::{
            create_test_admin, create_test_transaction, create_test_user, get_test_server,
            get_test_state,
        },
        transaction::{OwnerScope, TransactionKind, get_transactions},
        user::get_all_users,
    };

    #[tokio::test]
    async fn lists_all_users() {
        let state = get_test_state();
        let (admin, user) = {
            let connection = state.db_connection.lock().unwrap();
            (create_test_admin(&connection), create_test_user(&connection))
        };
        let server = get_test_server(state);

        let response = server
            .get(endpoints::ADMIN_USERS)
            .add_header(USER_ID_HEADER, admin.id.to_string())
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let emails: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|user| user["email"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(emails, vec![admin.email, user.email]);
        assert_eq!(body[0]["role"], "admin");
        assert!(body[0].get("fullName").is_some());
    }

    #[tokio::test]
    async fn regular_users_cannot_list_users() {
        let state = get_test_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        let server = get_test_server(state);

        server
            .get(endpoints::ADMIN_USERS)
            .add_header(USER_ID_HEADER, user.id.to_string())
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn deleting_user_removes_their_records() {
        let state = get_test_state();
        let (admin, user) = {
            let connection = state.db_connection.lock().unwrap();
            let admin = create_test_admin(&connection);
            let user = create_test_user(&connection);
            create_test_transaction(user.id, TransactionKind::Income, 100, "2024-01-01", &connection);
            create_test_transaction(user.id, TransactionKind::Expense, 50, "2024-01-02", &connection);
            create_test_transaction(admin.id, TransactionKind::Expense, 10, "2024-01-02", &connection);
            (admin, user)
        };
        let server = get_test_server(state.clone());

        server
            .delete(&format_endpoint(endpoints::ADMIN_USER, user.id))
            .add_header(USER_ID_HEADER, admin.id.to_string())
            .await
            .assert_status_ok();

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_users(&connection).unwrap(), vec![admin.clone()]);
        let income =
            get_transactions(TransactionKind::Income, OwnerScope::AllUsers, None, &connection)
                .unwrap();
        let expenses =
            get_transactions(TransactionKind::Expense, OwnerScope::AllUsers, None, &connection)
                .unwrap();
        assert!(income.is_empty());
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].owner_id, admin.id);
    }

    #[tokio::test]
    async fn deleting_missing_user_is_not_found() {
        let state = get_test_state();
        let admin = create_test_admin(&state.db_connection.lock().unwrap());
        let server = get_test_server(state);

        let response = server
            .delete(&format_endpoint(endpoints::ADMIN_USER, 4242))
            .add_header(USER_ID_HEADER, admin.id.to_string())
            .await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["message"], "User not found");
    }
}
