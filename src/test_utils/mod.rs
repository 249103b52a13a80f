#![allow(missing_docs)]

use std::sync::atomic::{AtomicUsize, Ordering};

use axum_test::TestServer;
use rusqlite::Connection;
use time::{Date, OffsetDateTime, format_description::well_known::Iso8601};

use crate::{
    AppState, build_router,
    amount::Amount,
    transaction::{NewTransaction, Transaction, TransactionKind, create_transaction},
    user::{NewUser, Role, User, UserID, create_user},
};

static NEXT_EMAIL_ID: AtomicUsize = AtomicUsize::new(1);

/// An app state backed by a fresh in-memory database in UTC with a 30 day window.
pub(crate) fn get_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");

    AppState::new(connection, "Etc/UTC", 30).expect("Could not create app state")
}

/// A test server for the full app router.
pub(crate) fn get_test_server(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

fn insert_user(role: Role, created_at: OffsetDateTime, connection: &Connection) -> User {
    let id = NEXT_EMAIL_ID.fetch_add(1, Ordering::Relaxed);

    create_user(
        NewUser {
            full_name: format!("Test User {id}"),
            email: format!("test{id}@example.com"),
            role,
            created_at,
        },
        connection,
    )
    .expect("Could not create test user")
}

pub(crate) fn create_test_user(connection: &Connection) -> User {
    insert_user(Role::User, OffsetDateTime::now_utc(), connection)
}

pub(crate) fn create_test_admin(connection: &Connection) -> User {
    insert_user(Role::Admin, OffsetDateTime::now_utc(), connection)
}

pub(crate) fn create_test_user_at(created_at: OffsetDateTime, connection: &Connection) -> User {
    insert_user(Role::User, created_at, connection)
}

/// Record a transaction labelled "Test" on `date`, given as "YYYY-MM-DD".
pub(crate) fn create_test_transaction(
    owner_id: UserID,
    kind: TransactionKind,
    cents: i64,
    date: &str,
    connection: &Connection,
) -> Transaction {
    let date = Date::parse(date, &Iso8601::DATE).expect("Could not parse test date");

    create_transaction(
        NewTransaction {
            owner_id,
            kind,
            amount: Amount::from_cents(cents).expect("Test amounts must be valid"),
            label: "Test".to_owned(),
            date,
            icon: None,
        },
        connection,
    )
    .expect("Could not create test transaction")
}
