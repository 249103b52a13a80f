//! Chart data for the admin dashboard.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    admin::AdminState,
    dashboard::{DailyBucket, SignupBucket, Window, WindowQuery, daily_series, signup_series},
    db::lock_connection,
    timezone::{get_timezone, local_date},
    transaction::{OwnerScope, TransactionKind, get_transactions},
    user::get_signup_times_since,
};

/// Daily sign ups and transaction totals over a trailing window.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// The number of new users per day.
    pub user_signups: Vec<SignupBucket>,
    /// Income and expenses of all users per day.
    pub transaction_chart_data: Vec<DailyBucket>,
}

/// A route handler for the admin charts over the requested window.
pub async fn get_chart_data(
    State(state): State<AdminState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ChartData>, Error> {
    let window_days = query.days_or(state.default_window_days)?;
    let timezone = get_timezone(&state.local_timezone)?;
    let now = OffsetDateTime::now_utc();
    let window = Window::trailing(now, local_date(now, timezone), window_days);

    let connection = lock_connection(&state.db_connection)?;
    let signup_times = get_signup_times_since(window.start_time(), &connection)?;
    let since = Some(window.start_date());
    let income = get_transactions(TransactionKind::Income, OwnerScope::AllUsers, since, &connection)?;
    let expenses =
        get_transactions(TransactionKind::Expense, OwnerScope::AllUsers, since, &connection)?;
    drop(connection);

    Ok(Json(ChartData {
        user_signups: signup_series(signup_times, window.start_time(), timezone),
        transaction_chart_data: daily_series(
            income.iter().filter(|t| window.contains(t.date)),
            expenses.iter().filter(|t| window.contains(t.date)),
        ),
    }))
}
