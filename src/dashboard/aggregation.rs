//! Transaction data aggregation for the dashboards.
//!
//! Provides functions to total income and expenses, merge them into a daily
//! series, interleave them into a single feed, and count sign ups per day.
//!
//! Everything here is a pure function of already fetched records. The caller
//! decides which owner and which window the records belong to and passes in
//! the reference time, so the results never depend on the system clock.

use std::{cmp::Ordering, collections::BTreeMap, iter::Peekable};

use serde::Serialize;
use time::{Date, OffsetDateTime};
use time_tz::Tz;

use crate::{amount::Amount, timezone::local_date, transaction::Transaction};

/// The total income and expenses of an owner scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// The sum of all income amounts.
    pub total_income: Amount,
    /// The sum of all expense amounts.
    pub total_expense: Amount,
}

/// The income and expense totals of a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    /// The calendar day, serialized as `YYYY-MM-DD`.
    pub date: Date,
    /// The sum of income amounts on `date`.
    pub income: Amount,
    /// The sum of expense amounts on `date`.
    pub expense: Amount,
}

/// The number of users that signed up on a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignupBucket {
    /// The calendar day, serialized as `YYYY-MM-DD`.
    pub date: Date,
    /// How many users signed up on `date`.
    pub count: usize,
}

/// Sums the amounts of `transactions`, zero if there are none.
pub fn total_amount<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Amount {
    transactions
        .into_iter()
        .map(|transaction| transaction.amount)
        .sum()
}

/// Calculates the total income and expenses.
pub fn totals(income: &[Transaction], expenses: &[Transaction]) -> Totals {
    Totals {
        total_income: total_amount(income),
        total_expense: total_amount(expenses),
    }
}

/// Sums transaction amounts by calendar day.
fn sum_by_day<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> BTreeMap<Date, Amount> {
    let mut totals = BTreeMap::new();

    for transaction in transactions {
        *totals.entry(transaction.date).or_insert(Amount::ZERO) += transaction.amount;
    }

    totals
}

/// Merges income and expenses into one series of daily totals.
///
/// Income and expenses are grouped by day separately and the two groupings
/// merged by walking their sorted days together. A day with only income or
/// only expenses gets zero for the other total. Days without any transactions
/// are left out rather than filled with zeros.
///
/// # Returns
/// Buckets sorted by date in ascending order, with at most one bucket per day.
pub fn daily_series<'a>(
    income: impl IntoIterator<Item = &'a Transaction>,
    expenses: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<DailyBucket> {
    let income_by_day = sum_by_day(income);
    let expenses_by_day = sum_by_day(expenses);

    let mut buckets = Vec::with_capacity(income_by_day.len().max(expenses_by_day.len()));
    let mut income_days = income_by_day.into_iter().peekable();
    let mut expense_days = expenses_by_day.into_iter().peekable();

    while let Some(bucket) = next_bucket(&mut income_days, &mut expense_days) {
        buckets.push(bucket);
    }

    buckets
}

/// Takes the earliest day from the front of either series.
fn next_bucket<I>(income: &mut Peekable<I>, expenses: &mut Peekable<I>) -> Option<DailyBucket>
where
    I: Iterator<Item = (Date, Amount)>,
{
    let order = match (income.peek(), expenses.peek()) {
        (None, None) => return None,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some((income_day, _)), Some((expense_day, _))) => income_day.cmp(expense_day),
    };

    match order {
        Ordering::Less => income.next().map(|(date, income)| DailyBucket {
            date,
            income,
            expense: Amount::ZERO,
        }),
        Ordering::Greater => expenses.next().map(|(date, expense)| DailyBucket {
            date,
            income: Amount::ZERO,
            expense,
        }),
        Ordering::Equal => income
            .next()
            .zip(expenses.next())
            .map(|((date, income), (_, expense))| DailyBucket {
                date,
                income,
                expense,
            }),
    }
}

/// Interleaves income and expenses into a single feed, newest first.
///
/// Transactions on the same day keep their relative order, income before
/// expenses.
///
/// # Returns
/// All of `income` and `expenses`, sorted by date in descending order.
pub fn combined_feed(income: Vec<Transaction>, expenses: Vec<Transaction>) -> Vec<Transaction> {
    let mut feed = income;
    feed.extend(expenses);
    // `sort_by` is stable, ties keep the order of concatenation.
    feed.sort_by(|a, b| b.date.cmp(&a.date));

    feed
}

/// Counts the users that signed up on each day since `since`.
///
/// Sign up times are converted to calendar days in `timezone`. Sign ups
/// before `since` are ignored and days without sign ups are left out.
///
/// # Returns
/// Buckets sorted by date in ascending order, each with a count of at least one.
pub fn signup_series(
    signup_times: impl IntoIterator<Item = OffsetDateTime>,
    since: OffsetDateTime,
    timezone: &Tz,
) -> Vec<SignupBucket> {
    let mut counts: BTreeMap<Date, usize> = BTreeMap::new();

    for signed_up_at in signup_times.into_iter().filter(|time| *time >= since) {
        *counts.entry(local_date(signed_up_at, timezone)).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(date, count)| SignupBucket { date, count })
        .collect()
}
