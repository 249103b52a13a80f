//! Authorization middleware for the API routes.
//!
//! Logging in is handled by an authenticating proxy in front of the server.
//! The proxy asserts who the caller is with the [USER_ID_HEADER] header and
//! these guards turn that into a [User] for the route handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    user::{Role, User, UserID, get_user_by_id},
};

/// The request header holding the ID of the authenticated user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Middleware function that checks the request identifies a registered user.
///
/// The user is placed into the request extensions and the request executed
/// normally, otherwise a 401 response is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<User>` to receive the user.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let user = authenticate(request.headers(), &state.db_connection);

    match user {
        Ok(user) => run_as(user, request, next).await,
        Err(error) => error.into_response(),
    }
}

/// Middleware function that checks the request identifies an administrator.
///
/// Like [auth_guard], but users without the admin role get a 403 response.
pub async fn admin_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let user = authenticate(request.headers(), &state.db_connection);

    match user {
        Ok(user) if user.role == Role::Admin => run_as(user, request, next).await,
        Ok(user) => {
            tracing::warn!(
                "User {} tried to access {} without admin rights",
                user.id,
                request.uri()
            );
            Error::Forbidden.into_response()
        }
        Err(error) => error.into_response(),
    }
}

/// A route handler that responds with the current user.
pub async fn get_user_endpoint(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

async fn run_as(user: User, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}

fn authenticate(headers: &HeaderMap, db_connection: &Mutex<Connection>) -> Result<User, Error> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .map(UserID::new)
        .ok_or(Error::Unauthorized)?;

    let connection = lock_connection(db_connection)?;

    get_user_by_id(user_id, &connection).map_err(|error| match error {
        Error::NotFound => {
            tracing::debug!("Rejecting request for unknown user {user_id}");
            Error::Unauthorized
        }
        error => error,
    })
}
