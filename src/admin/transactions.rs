//! The transactions of all users.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;

use crate::{
    Error,
    admin::AdminState,
    dashboard::combined_feed,
    db::lock_connection,
    message_response,
    transaction::{
        OwnerScope, Transaction, TransactionId, TransactionKind, delete_transaction,
        get_transaction, get_transactions,
    },
    user::{User, UserID, get_all_users},
};

/// Who a transaction belongs to.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    /// The owner's ID.
    pub id: UserID,
    /// The owner's full name.
    pub full_name: String,
    /// The owner's email address.
    pub email: String,
}

impl From<&User> for Owner {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// A transaction together with its owner.
#[derive(Debug, PartialEq, Serialize)]
pub struct OwnedTransaction {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The user the transaction belongs to.
    pub user: Option<Owner>,
}

/// A route handler for everyone's income and expenses, newest first.
pub async fn get_all_transactions(
    State(state): State<AdminState>,
) -> Result<Json<Vec<OwnedTransaction>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let users = get_all_users(&connection)?;
    let income = get_transactions(TransactionKind::Income, OwnerScope::AllUsers, None, &connection)?;
    let expenses =
        get_transactions(TransactionKind::Expense, OwnerScope::AllUsers, None, &connection)?;
    drop(connection);

    Ok(Json(attach_owners(combined_feed(income, expenses), &users)))
}

fn attach_owners(transactions: Vec<Transaction>, users: &[User]) -> Vec<OwnedTransaction> {
    let owners: HashMap<UserID, &User> = users.iter().map(|user| (user.id, user)).collect();

    transactions
        .into_iter()
        .map(|transaction| {
            let user = owners.get(&transaction.owner_id).map(|user| Owner::from(*user));

            if user.is_none() {
                tracing::warn!(
                    "{} {} belongs to missing user {}",
                    transaction.kind,
                    transaction.id,
                    transaction.owner_id
                );
            }

            OwnedTransaction { transaction, user }
        })
        .collect()
}

/// A route handler for deleting any user's income or expense record.
///
/// `transaction_type` must be either "income" or "expense".
pub async fn delete_any_transaction(
    State(state): State<AdminState>,
    Path((transaction_type, transaction_id)): Path<(String, TransactionId)>,
) -> Result<Response, Error> {
    let kind: TransactionKind = transaction_type.parse()?;
    let connection = lock_connection(&state.db_connection)?;

    let transaction = get_transaction(kind, transaction_id, &connection).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingTransaction,
        error => error,
    })?;

    match delete_transaction(kind, transaction.id, OwnerScope::AllUsers, &connection)? {
        0 => Err(Error::DeleteMissingTransaction),
        _ => {
            tracing::info!(
                "Deleted {kind} {} belonging to user {}",
                transaction.id,
                transaction.owner_id
            );
            Ok(message_response(StatusCode::OK, "Transaction deleted successfully"))
        }
    }
}
