//! Defines the core data models and database queries for income and expense records.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, ToSql, params_from_iter};
use serde::{Serialize, Serializer, ser::SerializeStruct};
use time::{Date, macros::format_description};

use crate::{Error, amount::Amount, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// Alias for the integer type used for income and expense IDs.
pub type TransactionId = i64;

/// Whether a transaction is money earned or money spent.
///
/// Income and expenses live in separate tables, each kind has its own name
/// for the text describing where the money came from or went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, described by its source, e.g. "Salary".
    Income,
    /// Money spent, described by its category, e.g. "Groceries".
    Expense,
}

impl TransactionKind {
    /// The kind as it appears in URLs and JSON, e.g. "income".
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// The field name of the text label for this kind of transaction.
    pub fn label_name(&self) -> &'static str {
        match self {
            TransactionKind::Income => "source",
            TransactionKind::Expense => "category",
        }
    }

    fn table(&self) -> &'static str {
        // Both names double as the table name and the label column.
        self.as_str()
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

/// An income or expense record owned by a single user.
///
/// Transactions are never edited, only created and deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the record, unique within its kind.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub owner_id: UserID,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// How much money was earned or spent.
    pub amount: Amount,
    /// The source of income or the category of an expense.
    pub label: String,
    /// The calendar day the transaction happened on.
    pub date: Date,
    /// An optional emoji shown next to the transaction.
    pub icon: Option<String>,
}

impl Serialize for Transaction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Transaction", 7)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("userId", &self.owner_id)?;
        state.serialize_field("type", &self.kind)?;
        state.serialize_field("amount", &self.amount)?;
        state.serialize_field(self.kind.label_name(), &self.label)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("icon", &self.icon)?;
        state.end()
    }
}

/// The data needed to record a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The user recording the transaction.
    pub owner_id: UserID,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// How much money was earned or spent.
    pub amount: Amount,
    /// The source of income or the category of an expense.
    pub label: String,
    /// The calendar day the transaction happened on.
    pub date: Date,
    /// An optional emoji shown next to the transaction.
    pub icon: Option<String>,
}

/// Whose transactions a query should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// Only the transactions of one user.
    User(UserID),
    /// Everyone's transactions, only for administrators.
    AllUsers,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the income and expense tables in the database.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_transaction_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    for kind in [TransactionKind::Income, TransactionKind::Expense] {
        let table = kind.table();
        let label = kind.label_name();

        connection.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL,
                    {label} TEXT NOT NULL,
                    amount INTEGER NOT NULL,
                    date TEXT NOT NULL,
                    icon TEXT,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )"
            ),
            (),
        )?;

        // Used by the dashboard queries which filter by owner and date.
        connection.execute(
            &format!("CREATE INDEX IF NOT EXISTS idx_{table}_user_date ON {table}(user_id, date)"),
            (),
        )?;
    }

    Ok(())
}

/// Record a new income or expense.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidOwner] if the owner ID does not refer to a user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let table = new_transaction.kind.table();
    let label = new_transaction.kind.label_name();

    let row = connection
        .prepare(&format!(
            "INSERT INTO {table} (user_id, {label}, amount, date, icon)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, {label}, amount, date, icon"
        ))?
        .query_row(
            (
                new_transaction.owner_id,
                &new_transaction.label,
                new_transaction.amount.cents(),
                new_transaction.date,
                &new_transaction.icon,
            ),
            map_raw_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidOwner(new_transaction.owner_id),
            error => error.into(),
        })?;

    // The row was written from already validated values.
    row.into_transaction(new_transaction.kind)
        .map_err(Error::InvalidAmount)
}

/// Retrieve a single income or expense record by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid record of `kind`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    kind: TransactionKind,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let table = kind.table();
    let label = kind.label_name();

    let row = connection
        .prepare(&format!(
            "SELECT id, user_id, {label}, amount, date, icon FROM {table} WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_raw_row)?;

    row.into_transaction(kind).map_err(|reason| {
        tracing::warn!("{kind} record {id} is malformed: {reason}");
        Error::NotFound
    })
}

/// Get the income or expense records in `scope`, newest first.
///
/// If `since` is given, only records dated on or after that day are included.
///
/// Records that cannot be read back as a valid transaction, e.g. a negative
/// amount or a malformed date, are skipped and logged as warnings so that a
/// single bad record does not break a whole report.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    kind: TransactionKind,
    scope: OwnerScope,
    since: Option<Date>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let table = kind.table();
    let label = kind.label_name();

    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let OwnerScope::User(user_id) = scope {
        conditions.push("user_id = ?");
        params.push(Box::new(user_id));
    }

    if let Some(since) = since {
        conditions.push("date >= ?");
        params.push(Box::new(since));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let rows = connection
        .prepare(&format!(
            "SELECT id, user_id, {label}, amount, date, icon FROM {table}
             {where_clause}
             ORDER BY date DESC, id DESC"
        ))?
        .query_map(params_from_iter(params), map_raw_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let transactions = rows
        .into_iter()
        .filter_map(|row| {
            let id = row.id;
            row.into_transaction(kind)
                .inspect_err(|reason| tracing::warn!("Skipping {kind} record {id}: {reason}"))
                .ok()
        })
        .collect();

    Ok(transactions)
}

type RowsAffected = usize;

/// Delete an income or expense record.
///
/// With [OwnerScope::User] only a record belonging to that user is deleted.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    kind: TransactionKind,
    id: TransactionId,
    scope: OwnerScope,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    let table = kind.table();

    let rows_affected = match scope {
        OwnerScope::User(user_id) => connection.execute(
            &format!("DELETE FROM {table} WHERE id = ?1 AND user_id = ?2"),
            (id, user_id),
        )?,
        OwnerScope::AllUsers => {
            connection.execute(&format!("DELETE FROM {table} WHERE id = ?1"), (id,))?
        }
    };

    Ok(rows_affected)
}

/// A record as it is stored, before checking the stored values are valid.
struct RawRow {
    id: TransactionId,
    owner_id: UserID,
    label: String,
    amount_cents: i64,
    date: String,
    icon: Option<String>,
}

impl RawRow {
    fn into_transaction(self, kind: TransactionKind) -> Result<Transaction, String> {
        let amount = Amount::from_cents(self.amount_cents).map_err(|error| error.to_string())?;
        let date = Date::parse(&self.date, format_description!("[year]-[month]-[day]"))
            .map_err(|error| format!("invalid date \"{}\": {error}", self.date))?;

        Ok(Transaction {
            id: self.id,
            owner_id: self.owner_id,
            kind,
            amount,
            label: self.label,
            date,
            icon: self.icon,
        })
    }
}

fn map_raw_row(row: &Row) -> Result<RawRow, rusqlite::Error> {
    Ok(RawRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        label: row.get(2)?,
        amount_cents: row.get(3)?,
        date: row.get(4)?,
        icon: row.get(5)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
