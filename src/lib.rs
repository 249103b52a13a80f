//! Dinero is a personal finance tracker.
//!
//! Users record income and expenses and view a dashboard summarising them,
//! while administrators manage users and see statistics across everyone.
//!
//! This library provides a JSON REST API. The summaries are computed by a
//! pure aggregation engine from transactions fetched out of a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use time::Date;
use tokio::signal;

mod admin;
mod amount;
mod app_state;
mod auth;
mod dashboard;
mod db;
pub mod endpoints;
mod logging;
mod routing;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use amount::{Amount, Balance};
pub use app_state::AppState;
pub use auth::USER_ID_HEADER;
pub use dashboard::{
    DailyBucket, SignupBucket, Totals, Window, combined_feed, daily_series, signup_series, totals,
};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::get_timezone;
pub use transaction::{
    NewTransaction, OwnerScope, Transaction, TransactionId, TransactionKind, create_transaction,
};
pub use user::{NewUser, Role, User, UserID, create_user, get_user_by_id};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not identify a known user.
    ///
    /// Identity is asserted by an upstream authenticating proxy through the
    /// [USER_ID_HEADER] header, so this means the header is missing, malformed
    /// or refers to a user that no longer exists.
    #[error("not authenticated")]
    Unauthorized,

    /// The user is known but is not allowed to access the resource.
    #[error("access denied, admins only")]
    Forbidden,

    /// The amount of a transaction is negative or not a valid decimal number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The source of an income or the category of an expense was empty.
    ///
    /// The string is the name of the missing field, e.g. "source".
    #[error("{0} is required")]
    EmptyLabel(&'static str),

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A transaction type other than "income" or "expense" was requested.
    #[error("invalid transaction type \"{0}\"")]
    InvalidTransactionType(String),

    /// A reporting window of zero days or longer than the maximum window.
    #[error("window must be between 1 and {max} days, got {0}", max = dashboard::MAX_WINDOW_DAYS)]
    InvalidWindow(u32),

    /// A transaction was created for a user that does not exist.
    #[error("user {0} does not exist")]
    InvalidOwner(UserID),

    /// The email address already belongs to another user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a user that does not exist
    #[error("tried to delete a user that is not in the database")]
    DeleteMissingUser,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while writing transactions as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to clients for errors and simple confirmations.
#[derive(Debug, Serialize)]
struct MessageBody {
    message: String,
}

/// Respond with `status` and a JSON body of the form `{"message": "..."}`.
pub(crate) fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(MessageBody {
            message: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::InvalidAmount(_)
            | Error::EmptyLabel(_)
            | Error::FutureDate(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidWindow(_)
            | Error::InvalidOwner(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DeleteMissingTransaction => {
                return message_response(StatusCode::NOT_FOUND, "Transaction not found");
            }
            Error::DeleteMissingUser => {
                return message_response(StatusCode::NOT_FOUND, "User not found");
            }
            Error::InvalidTimezoneError(timezone) => {
                tracing::error!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                );
                return message_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error");
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                return message_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error");
            }
        };

        message_response(status, self.to_string())
    }
}
