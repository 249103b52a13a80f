//! The API endpoints URIs.
//!
//! For endpoints that take parameters, e.g., '/admin/users/{user_id}', use [format_endpoint].

use std::fmt::Display;

/// The prefix shared by all API routes.
pub const API_PREFIX: &str = "/api/v1";

/// The route for getting the current user.
pub const GET_USER: &str = "/api/v1/auth/getUser";
/// The route for a user's dashboard summary.
pub const DASHBOARD: &str = "/api/v1/dashboard";

/// The route for recording income.
pub const ADD_INCOME: &str = "/api/v1/income/add";
/// The route for listing a user's income.
pub const GET_INCOME: &str = "/api/v1/income/get";
/// The route for deleting an income record.
pub const DELETE_INCOME: &str = "/api/v1/income/{income_id}";
/// The route for downloading a user's income as CSV.
pub const DOWNLOAD_INCOME: &str = "/api/v1/income/download";

/// The route for recording an expense.
pub const ADD_EXPENSE: &str = "/api/v1/expense/add";
/// The route for listing a user's expenses.
pub const GET_EXPENSES: &str = "/api/v1/expense/get";
/// The route for deleting an expense record.
pub const DELETE_EXPENSE: &str = "/api/v1/expense/{expense_id}";
/// The route for downloading a user's expenses as CSV.
pub const DOWNLOAD_EXPENSES: &str = "/api/v1/expense/download";

/// The route for listing all users.
pub const ADMIN_USERS: &str = "/api/v1/admin/users";
/// The route for deleting a user and their records.
pub const ADMIN_USER: &str = "/api/v1/admin/users/{user_id}";
/// The route for statistics across all users.
pub const ADMIN_STATS: &str = "/api/v1/admin/stats";
/// The route for the transactions of all users.
pub const ADMIN_TRANSACTIONS: &str = "/api/v1/admin/transactions";
/// The route for deleting any user's transaction.
pub const ADMIN_TRANSACTION: &str = "/api/v1/admin/transactions/{transaction_type}/{transaction_id}";
/// The route for the admin chart data.
pub const ADMIN_CHARTS: &str = "/api/v1/admin/charts";

/// Replace the first parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace and ends with a
/// right brace. For example, in the endpoint path '/users/{user_id}',
/// '{user_id}' is the parameter. Call this function once per parameter to
/// fill in paths with more than one.
///
/// If no parameter is found in `endpoint_path`, the function returns
/// `endpoint_path` unchanged.
pub fn format_endpoint(endpoint_path: &str, value: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}
