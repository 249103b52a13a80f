//! Code for creating the user table and fetching users from the database.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for UserID {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for UserID {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(UserID)
    }
}

/// What a user is allowed to see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular user that can only see their own transactions.
    #[default]
    User,
    /// An administrator that can see and delete everyone's data.
    Admin,
}

impl Role {
    /// The role as it is stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role \"{other}\"")),
        }
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// A user of the application.
///
/// The caller should ensure that `id` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name shown to administrators.
    pub full_name: String,
    /// The user's email address, unique across all users.
    pub email: String,
    /// Whether the user is a regular user or an administrator.
    pub role: Role,
    /// When the user signed up.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data needed to insert a user into the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The name shown to administrators.
    pub full_name: String,
    /// The user's email address, must not belong to an existing user.
    pub email: String,
    /// Whether the user is a regular user or an administrator.
    pub role: Role,
    /// When the user signed up.
    pub created_at: OffsetDateTime,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL DEFAULT 'user',
                created_at INTEGER NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_user_created_at ON user(created_at)",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// `created_at` is stored with second precision.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if a user with the same email already exists,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "INSERT INTO user (full_name, email, role, created_at) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, full_name, email, role, created_at",
        )?
        .query_row(
            (
                &new_user.full_name,
                &new_user.email,
                new_user.role,
                new_user.created_at.unix_timestamp(),
            ),
            map_user_row,
        )
        .map_err(|error| error.into())
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, full_name, email, role, created_at FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id)], map_user_row)
        .map_err(|error| error.into())
}

/// Get every user in the order they signed up.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_all_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare("SELECT id, full_name, email, role, created_at FROM user ORDER BY id")?
        .query_map([], map_user_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Get the sign up times of users that signed up at or after `since`.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_signup_times_since(
    since: OffsetDateTime,
    connection: &Connection,
) -> Result<Vec<OffsetDateTime>, Error> {
    connection
        .prepare("SELECT created_at FROM user WHERE created_at >= :since ORDER BY created_at")?
        .query_map(&[(":since", &since.unix_timestamp())], |row| {
            timestamp_from_row(row, 0)
        })?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| error.into())
}

/// Delete a user along with all of their income and expense records.
///
/// The deletions happen in a single SQL transaction, so either everything
/// belonging to the user is removed or nothing is.
///
/// # Errors
///
/// Returns a:
/// - [Error::DeleteMissingUser] if no user has the ID `user_id`,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn delete_user(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    let income_deleted = transaction.execute("DELETE FROM income WHERE user_id = ?1", [user_id])?;
    let expenses_deleted =
        transaction.execute("DELETE FROM expense WHERE user_id = ?1", [user_id])?;
    let users_deleted = transaction.execute("DELETE FROM user WHERE id = ?1", [user_id])?;

    if users_deleted == 0 {
        // Nothing else can have been deleted without a user to own it.
        return Err(Error::DeleteMissingUser);
    }

    transaction.commit()?;

    tracing::info!(
        "Deleted user {user_id} with {income_deleted} income and {expenses_deleted} expense records"
    );

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        created_at: timestamp_from_row(row, 4)?,
    })
}

fn timestamp_from_row(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let timestamp: i64 = row.get(index)?;

    OffsetDateTime::from_unix_timestamp(timestamp).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}
