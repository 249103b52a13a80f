//! Application wide statistics.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::{
    Error,
    admin::AdminState,
    amount::Amount,
    dashboard::totals,
    db::lock_connection,
    transaction::{OwnerScope, TransactionKind, get_transactions},
    user::count_users,
};

/// Totals across all users.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStats {
    /// The number of registered users.
    pub total_users: usize,
    /// The sum of everyone's income.
    pub total_income: Amount,
    /// The sum of everyone's expenses.
    pub total_expense: Amount,
}

/// A route handler for the number of users and their combined income and expenses.
pub async fn get_app_stats(State(state): State<AdminState>) -> Result<Json<AppStats>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let total_users = count_users(&connection)?;
    let income = get_transactions(TransactionKind::Income, OwnerScope::AllUsers, None, &connection)?;
    let expenses =
        get_transactions(TransactionKind::Expense, OwnerScope::AllUsers, None, &connection)?;
    drop(connection);

    let totals = totals(&income, &expenses);

    Ok(Json(AppStats {
        total_users,
        total_income: totals.total_income,
        total_expense: totals.total_expense,
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::{
        USER_ID_HEADER, endpoints,
        test_utils::{
            create_test_admin, create_test_transaction, create_test_user, get_test_server,
            get_test_state,
        },
        transaction::TransactionKind,
    };

    #[tokio::test]
    async fn sums_over_all_users() {
        let state = get_test_state();
        let admin = {
            let connection = state.db_connection.lock().unwrap();
            let admin = create_test_admin(&connection);
            let user = create_test_user(&connection);
            create_test_transaction(user.id, TransactionKind::Income, 10_000, "2024-01-01", &connection);
            create_test_transaction(admin.id, TransactionKind::Income, 2_550, "2024-01-02", &connection);
            create_test_transaction(user.id, TransactionKind::Expense, 1_000, "2024-01-03", &connection);
            admin
        };
        let server = get_test_server(state);

        let response = server
            .get(endpoints::ADMIN_STATS)
            .add_header(USER_ID_HEADER, admin.id.to_string())
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            body,
            json!({"totalUsers": 2, "totalIncome": 125.5, "totalExpense": 10.0})
        );
    }

    #[tokio::test]
    async fn empty_database_has_zero_totals() {
        let state = get_test_state();
        let admin = create_test_admin(&state.db_connection.lock().unwrap());
        let server = get_test_server(state);

        let body: Value = server
            .get(endpoints::ADMIN_STATS)
            .add_header(USER_ID_HEADER, admin.id.to_string())
            .await
            .json();

        assert_eq!(
            body,
            json!({"totalUsers": 1, "totalIncome": 0.0, "totalExpense": 0.0})
        );
    }
}
