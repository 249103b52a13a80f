//! Application router configuration with user and admin route definitions.

use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware,
    response::Response,
    routing::{any, delete, get, post},
};

use crate::{
    AppState,
    admin::{
        delete_any_transaction, delete_user_endpoint, get_all_transactions, get_app_stats,
        get_chart_data, get_users,
    },
    auth::{admin_guard, auth_guard, get_user_endpoint},
    dashboard::get_dashboard_data,
    endpoints, message_response,
    transaction::{
        create_expense_endpoint, create_income_endpoint, delete_expense_endpoint,
        delete_income_endpoint, download_expenses_endpoint, download_income_endpoint,
        get_expenses_endpoint, get_income_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every route requires the [crate::USER_ID_HEADER] header and the admin
/// routes additionally require the admin role. Unknown paths under the API
/// prefix get a JSON 404 response.
pub fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route(endpoints::GET_USER, get(get_user_endpoint))
        .route(endpoints::DASHBOARD, get(get_dashboard_data))
        .route(endpoints::ADD_INCOME, post(create_income_endpoint))
        .route(endpoints::GET_INCOME, get(get_income_endpoint))
        .route(endpoints::DELETE_INCOME, delete(delete_income_endpoint))
        .route(endpoints::DOWNLOAD_INCOME, get(download_income_endpoint))
        .route(endpoints::ADD_EXPENSE, post(create_expense_endpoint))
        .route(endpoints::GET_EXPENSES, get(get_expenses_endpoint))
        .route(endpoints::DELETE_EXPENSE, delete(delete_expense_endpoint))
        .route(endpoints::DOWNLOAD_EXPENSES, get(download_expenses_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let admin_routes = Router::new()
        .route(endpoints::ADMIN_USERS, get(get_users))
        .route(endpoints::ADMIN_USER, delete(delete_user_endpoint))
        .route(endpoints::ADMIN_STATS, get(get_app_stats))
        .route(endpoints::ADMIN_TRANSACTIONS, get(get_all_transactions))
        .route(endpoints::ADMIN_TRANSACTION, delete(delete_any_transaction))
        .route(endpoints::ADMIN_CHARTS, get(get_chart_data))
        .layer(middleware::from_fn_with_state(state.clone(), admin_guard));

    user_routes
        .merge(admin_routes)
        .route(
            &format!("{}/{{*rest}}", endpoints::API_PREFIX),
            any(get_404_not_found),
        )
        .with_state(state)
}

async fn get_404_not_found(request: Request) -> Response {
    tracing::debug!("No route for {} {}", request.method(), request.uri());
    message_response(StatusCode::NOT_FOUND, "Not found")
}
