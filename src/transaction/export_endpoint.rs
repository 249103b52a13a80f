//! Defines the endpoints for downloading a user's income and expenses as CSV.

use axum::{
    Extension,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use csv::Writer;

use crate::{
    Error,
    transaction::{
        core::{Transaction, TransactionKind},
        list_endpoint::{TransactionState, list},
    },
    user::User,
};

/// A route handler for downloading the current user's income as a CSV file.
pub async fn download_income_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
) -> Result<Response, Error> {
    download(&state, &user, TransactionKind::Income)
}

/// A route handler for downloading the current user's expenses as a CSV file.
pub async fn download_expenses_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
) -> Result<Response, Error> {
    download(&state, &user, TransactionKind::Expense)
}

fn download(
    state: &TransactionState,
    user: &User,
    kind: TransactionKind,
) -> Result<Response, Error> {
    let transactions = list(state, user, kind)?;
    let csv = write_csv(kind, &transactions)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{kind}_details.csv\""),
            ),
        ],
        csv,
    )
        .into_response())
}

/// Write `transactions` as CSV with the columns label, amount and date.
fn write_csv(kind: TransactionKind, transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let label_header = match kind {
        TransactionKind::Income => "Source",
        TransactionKind::Expense => "Category",
    };

    let mut writer = Writer::from_writer(vec![]);
    writer
        .write_record([label_header, "Amount", "Date"])
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for transaction in transactions {
        writer
            .write_record([
                transaction.label.clone(),
                transaction.amount.to_string(),
                transaction.date.to_string(),
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}
