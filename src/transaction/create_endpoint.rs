//! Defines the endpoints for recording income and expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    amount::Amount,
    db::lock_connection,
    timezone::{get_timezone, local_date},
    transaction::core::{NewTransaction, Transaction, TransactionKind, create_transaction},
    user::User,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The request body for recording income.
#[derive(Debug, Deserialize)]
pub struct IncomeForm {
    /// Where the money came from, e.g. "Salary".
    pub source: String,
    /// The amount in dollars.
    pub amount: Amount,
    /// The day the income was received.
    pub date: Date,
    /// An optional emoji or image URL shown next to the record.
    pub icon: Option<String>,
}

/// The request body for recording an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseForm {
    /// What the money was spent on, e.g. "Groceries".
    pub category: String,
    /// The amount in dollars.
    pub amount: Amount,
    /// The day the money was spent.
    pub date: Date,
    /// An optional emoji or image URL shown next to the record.
    pub icon: Option<String>,
}

/// A route handler for recording income, responds with the new record.
pub async fn create_income_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user): Extension<User>,
    Json(form): Json<IncomeForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let new_income = NewTransaction {
        owner_id: user.id,
        kind: TransactionKind::Income,
        amount: form.amount,
        label: form.source,
        date: form.date,
        icon: form.icon,
    };

    create(&state, new_income)
}

/// A route handler for recording an expense, responds with the new record.
pub async fn create_expense_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user): Extension<User>,
    Json(form): Json<ExpenseForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let new_expense = NewTransaction {
        owner_id: user.id,
        kind: TransactionKind::Expense,
        amount: form.amount,
        label: form.category,
        date: form.date,
        icon: form.icon,
    };

    create(&state, new_expense)
}

fn create(
    state: &CreateTransactionState,
    mut new_transaction: NewTransaction,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let kind = new_transaction.kind;
    let label = new_transaction.label.trim();

    if label.is_empty() {
        return Err(Error::EmptyLabel(kind.label_name()));
    }

    new_transaction.label = label.to_owned();
    new_transaction.icon = new_transaction
        .icon
        .filter(|icon| !icon.trim().is_empty());

    let timezone = get_timezone(&state.local_timezone)?;
    let today = local_date(OffsetDateTime::now_utc(), timezone);

    if new_transaction.date > today {
        tracing::error!("Tried to record {kind} with the future date {}", new_transaction.date);
        return Err(Error::FutureDate(new_transaction.date));
    }

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(new_transaction, &connection)
        .inspect_err(|error| tracing::error!("could not create {kind}: {error}"))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use time::{Duration, OffsetDateTime};

    use crate::{
        USER_ID_HEADER, endpoints,
        test_utils::{create_test_user, get_test_server, get_test_state},
        transaction::{OwnerScope, TransactionKind, get_transactions},
    };

    #[tokio::test]
    async fn can_create_income() {
        let state = get_test_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        let server = get_test_server(state.clone());
        let today = OffsetDateTime::now_utc().date();

        let response = server
            .post(endpoints::ADD_INCOME)
            .add_header(USER_ID_HEADER, user.id.to_string())
            .json(&json!({
                "source": " Salary ",
                "amount": "1234.50",
                "date": today.to_string(),
                "icon": "💰",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["type"], "income");
        assert_eq!(body["source"], "Salary");
        assert_eq!(body["amount"], 1234.5);
        assert_eq!(body["userId"], user.id.as_i64());
        let stored = get_transactions(
            TransactionKind::Income,
            OwnerScope::User(user.id),
            None,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amount.cents(), 123_450);
    }

    #[tokio::test]
    async fn can_create_expense_with_numeric_amount() {
        let state = get_test_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        let server = get_test_server(state);
        let today = OffsetDateTime::now_utc().date();

        let response = server
            .post(endpoints::ADD_EXPENSE)
            .add_header(USER_ID_HEADER, user.id.to_string())
            .json(&json!({
                "category": "Groceries",
                "amount": 45.99,
                "date": today.to_string(),
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["type"], "expense");
        assert_eq!(body["category"], "Groceries");
        assert_eq!(body["amount"], 45.99);
        assert_eq!(body["icon"], Value::Null);
    }

    #[tokio::test]
    async fn rejects_empty_label() {
        let state = get_test_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        let server = get_test_server(state);

        let response = server
            .post(endpoints::ADD_EXPENSE)
            .add_header(USER_ID_HEADER, user.id.to_string())
            .json(&json!({
                "category": "   ",
                "amount": 10,
                "date": "2024-01-01",
            }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["message"], "category is required");
    }

    #[tokio::test]
    async fn rejects_future_date() {
        let state = get_test_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        let server = get_test_server(state);
        let next_week = OffsetDateTime::now_utc().date() + Duration::weeks(1);

        server
            .post(endpoints::ADD_INCOME)
            .add_header(USER_ID_HEADER, user.id.to_string())
            .json(&json!({
                "source": "Lottery",
                "amount": 10,
                "date": next_week.to_string(),
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn rejects_negative_amount() {
        let state = get_test_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        let server = get_test_server(state);

        let response = server
            .post(endpoints::ADD_INCOME)
            .add_header(USER_ID_HEADER, user.id.to_string())
            .json(&json!({
                "source": "Refund",
                "amount": -10,
                "date": "2024-01-01",
            }))
            .await;

        assert!(response.status_code().is_client_error());
    }

    #[tokio::test]
    async fn rejects_amount_above_maximum() {
        let state = get_test_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        let server = get_test_server(state);

        for amount in ["100000000000.01", "92233720368547758.07"] {
            let response = server
                .post(endpoints::ADD_INCOME)
                .add_header(USER_ID_HEADER, user.id.to_string())
                .json(&json!({
                    "source": "Lottery",
                    "amount": amount,
                    "date": "2024-01-01",
                }))
                .await;

            assert!(
                response.status_code().is_client_error(),
                "want {amount} to be rejected, got {}",
                response.status_code()
            );
        }
    }

    #[tokio::test]
    async fn requires_user() {
        let server = get_test_server(get_test_state());

        server
            .post(endpoints::ADD_INCOME)
            .json(&json!({
                "source": "Salary",
                "amount": 10,
                "date": "2024-01-01",
            }))
            .await
            .assert_status_unauthorized();
    }
}
