//! Income and expense records.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and its income/expense kinds
//! - Database functions for storing, querying, and deleting transactions
//! - Route handlers for a user's own transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod export_endpoint;
mod list_endpoint;

pub use core::{
    NewTransaction, OwnerScope, Transaction, TransactionId, TransactionKind,
    create_transaction, create_transaction_tables, delete_transaction, get_transaction,
    get_transactions,
};
pub use create_endpoint::{create_expense_endpoint, create_income_endpoint};
pub use delete_endpoint::{delete_expense_endpoint, delete_income_endpoint};
pub use export_endpoint::{download_expenses_endpoint, download_income_endpoint};
pub use list_endpoint::{TransactionState, get_expenses_endpoint, get_income_endpoint};
