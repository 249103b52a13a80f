//! Dashboard HTTP handler for a single user.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    amount::{Amount, Balance},
    dashboard::{
        aggregation::{DailyBucket, combined_feed, daily_series, totals},
        window::{Window, WindowQuery},
    },
    db::lock_connection,
    timezone::{get_timezone, local_date},
    transaction::{OwnerScope, Transaction, TransactionKind, get_transactions},
    user::User,
};

/// How many of the latest transactions the dashboard shows.
const RECENT_TRANSACTION_COUNT: usize = 5;

/// The state needed for displaying the dashboard.
///
/// Contains the database connection and timezone information required
/// by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The window used when the client does not ask for one.
    pub default_window_days: u32,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            default_window_days: state.default_window_days,
        }
    }
}

/// A summary of one user's finances.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    /// All income minus all expenses.
    pub total_balance: Balance,
    /// The sum of all income.
    pub total_income: Amount,
    /// The sum of all expenses.
    pub total_expense: Amount,
    /// The number of days covered by `daily_series`.
    pub window_days: u32,
    /// Income and expenses per day within the window.
    pub daily_series: Vec<DailyBucket>,
    /// The latest transactions of either kind, newest first.
    pub recent_transactions: Vec<Transaction>,
}

/// Get the dashboard summary for the current user.
pub async fn get_dashboard_data(
    State(state): State<DashboardState>,
    Extension(user): Extension<User>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<DashboardData>, Error> {
    let window_days = query.days_or(state.default_window_days)?;
    let timezone = get_timezone(&state.local_timezone)?;
    let now = OffsetDateTime::now_utc();
    let window = Window::trailing(now, local_date(now, timezone), window_days);

    let connection = lock_connection(&state.db_connection)?;
    let scope = OwnerScope::User(user.id);
    let income = get_transactions(TransactionKind::Income, scope, None, &connection)
        .inspect_err(|error| tracing::error!("could not get income for {}: {error}", user.id))?;
    let expenses = get_transactions(TransactionKind::Expense, scope, None, &connection)
        .inspect_err(|error| tracing::error!("could not get expenses for {}: {error}", user.id))?;
    drop(connection);

    Ok(Json(build_dashboard_data(income, expenses, window, window_days)))
}

/// Summarise a user's complete transaction history.
fn build_dashboard_data(
    income: Vec<Transaction>,
    expenses: Vec<Transaction>,
    window: Window,
    window_days: u32,
) -> DashboardData {
    let totals = totals(&income, &expenses);
    let daily_series = daily_series(
        income.iter().filter(|t| window.contains(t.date)),
        expenses.iter().filter(|t| window.contains(t.date)),
    );

    let mut recent_transactions = combined_feed(income, expenses);
    recent_transactions.truncate(RECENT_TRANSACTION_COUNT);

    DashboardData {
        total_balance: Balance::net(totals.total_income, totals.total_expense),
        total_income: totals.total_income,
        total_expense: totals.total_expense,
        window_days,
        daily_series,
        recent_transactions,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use time::{
        Date, OffsetDateTime,
        macros::{date, datetime},
    };

    use crate::{
        USER_ID_HEADER,
        amount::{Amount, MAX_CENTS},
        dashboard::{
            handlers::{RECENT_TRANSACTION_COUNT, build_dashboard_data},
            window::Window,
        },
        endpoints,
        test_utils::{create_test_transaction, create_test_user, get_test_server, get_test_state},
        transaction::{Transaction, TransactionKind},
        user::UserID,
    };

    fn transaction(kind: TransactionKind, id: i64, cents: i64, date: Date) -> Transaction {
        Transaction {
            id,
            owner_id: UserID::new(1),
            kind,
            amount: Amount::from_cents(cents).unwrap(),
            label: "Test".to_owned(),
            date,
            icon: None,
        }
    }

    #[test]
    fn totals_cover_full_history_but_series_only_the_window() {
        let income = vec![
            transaction(TransactionKind::Income, 1, 100_000, date!(2023 - 06 - 01)),
            transaction(TransactionKind::Income, 2, 20_000, date!(2024 - 01 - 20)),
        ];
        let expenses = vec![transaction(
            TransactionKind::Expense,
            1,
            5_000,
            date!(2024 - 01 - 25),
        )];
        let window = Window::trailing(datetime!(2024-01-31 12:00 UTC), date!(2024 - 01 - 31), 30);

        let data = build_dashboard_data(income, expenses, window, 30);

        assert_eq!(data.total_income.cents(), 120_000);
        assert_eq!(data.total_expense.cents(), 5_000);
        assert_eq!(data.total_balance.cents(), 115_000);
        let series_dates: Vec<_> = data.daily_series.iter().map(|bucket| bucket.date).collect();
        assert_eq!(series_dates, vec![date!(2024 - 01 - 20), date!(2024 - 01 - 25)]);
    }

    #[test]
    fn recent_transactions_are_the_newest_few() {
        let income: Vec<_> = (1..=4)
            .map(|day| {
                transaction(
                    TransactionKind::Income,
                    day,
                    100,
                    date!(2024 - 01 - 01).replace_day(day as u8).unwrap(),
                )
            })
            .collect();
        let expenses: Vec<_> = (5..=8)
            .map(|day| {
                transaction(
                    TransactionKind::Expense,
                    day,
                    100,
                    date!(2024 - 01 - 01).replace_day(day as u8).unwrap(),
                )
            })
            .collect();
        let window = Window::trailing(datetime!(2024-01-31 12:00 UTC), date!(2024 - 01 - 31), 30);

        let data = build_dashboard_data(income, expenses, window, 30);

        assert_eq!(data.recent_transactions.len(), RECENT_TRANSACTION_COUNT);
        assert_eq!(data.recent_transactions[0].date, date!(2024 - 01 - 08));
        assert_eq!(data.recent_transactions[4].date, date!(2024 - 01 - 04));
    }

    #[tokio::test]
    async fn dashboard_only_includes_own_transactions() {
        let state = get_test_state();
        let today = OffsetDateTime::now_utc().date();
        let (user, other) = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user(&connection);
            let other = create_test_user(&connection);
            let today = today.to_string();
            create_test_transaction(user.id, TransactionKind::Income, 10_000, &today, &connection);
            create_test_transaction(user.id, TransactionKind::Expense, 2_550, &today, &connection);
            create_test_transaction(other.id, TransactionKind::Income, 99_900, &today, &connection);
            (user, other)
        };
        let server = get_test_server(state);

        let response = server
            .get(endpoints::DASHBOARD)
            .add_header(USER_ID_HEADER, user.id.to_string())
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["totalIncome"], 100.0);
        assert_eq!(body["totalExpense"], 25.5);
        assert_eq!(body["totalBalance"], 74.5);
        assert_eq!(body["windowDays"], 30);
        assert_eq!(body["dailySeries"].as_array().unwrap().len(), 1);
        assert_eq!(body["recentTransactions"].as_array().unwrap().len(), 2);
        assert_ne!(user.id, other.id);
    }

    #[tokio::test]
    async fn dashboard_sums_largest_amounts() {
        let state = get_test_state();
        let today = OffsetDateTime::now_utc().date().to_string();
        let user = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user(&connection);
            for _ in 0..2 {
                create_test_transaction(user.id, TransactionKind::Income, MAX_CENTS, &today, &connection);
            }
            user
        };
        let server = get_test_server(state);

        let response = server
            .get(endpoints::DASHBOARD)
            .add_header(USER_ID_HEADER, user.id.to_string())
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["totalIncome"], 200_000_000_000.0);
        assert_eq!(body["totalBalance"], 200_000_000_000.0);
        assert_eq!(body["dailySeries"][0]["income"], 200_000_000_000.0);
    }

    #[tokio::test]
    async fn dashboard_rejects_invalid_window() {
        let state = get_test_state();
        let user = create_test_user(&state.db_connection.lock().unwrap());
        let server = get_test_server(state);

        server
            .get(endpoints::DASHBOARD)
            .add_query_param("windowDays", 0)
            .add_header(USER_ID_HEADER, user.id.to_string())
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn dashboard_requires_user() {
        let server = get_test_server(get_test_state());

        server.get(endpoints::DASHBOARD).await.assert_status_unauthorized();
    }
}
