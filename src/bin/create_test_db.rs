use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use dinero::{
    Amount, NewTransaction, NewUser, Role, TransactionKind, UserID, create_transaction,
    create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of Dinero.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Income as (source, dollars, days ago) and expenses as (category, dollars, days ago).
const SAMPLE_INCOME: [(&str, i64, i64); 4] = [
    ("Salary", 4_200, 3),
    ("Freelance", 650, 12),
    ("Salary", 4_200, 33),
    ("Dividends", 120, 45),
];
const SAMPLE_EXPENSES: [(&str, i64, i64); 6] = [
    ("Rent", 1_800, 1),
    ("Groceries", 145, 2),
    ("Transport", 60, 5),
    ("Groceries", 132, 9),
    ("Rent", 1_800, 31),
    ("Entertainment", 85, 40),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let now = OffsetDateTime::now_utc();

    println!("Creating test users...");
    let admin = create_user(
        NewUser {
            full_name: "Test Admin".to_owned(),
            email: "admin@example.com".to_owned(),
            role: Role::Admin,
            created_at: now - Duration::days(60),
        },
        &conn,
    )?;
    let user = create_user(
        NewUser {
            full_name: "Test User".to_owned(),
            email: "user@example.com".to_owned(),
            role: Role::User,
            created_at: now - Duration::days(10),
        },
        &conn,
    )?;

    println!("Creating sample transactions...");
    for (kind, samples) in [
        (TransactionKind::Income, SAMPLE_INCOME.as_slice()),
        (TransactionKind::Expense, SAMPLE_EXPENSES.as_slice()),
    ] {
        for &(label, dollars, days_ago) in samples {
            insert_sample(&conn, user.id, kind, label, dollars, days_ago, now)?;
        }
    }

    println!(
        "Success! Use the header 'X-User-Id: {}' for the admin and 'X-User-Id: {}' for the user.",
        admin.id, user.id
    );

    Ok(())
}

fn insert_sample(
    conn: &Connection,
    owner_id: UserID,
    kind: TransactionKind,
    label: &str,
    dollars: i64,
    days_ago: i64,
    now: OffsetDateTime,
) -> Result<(), Box<dyn Error>> {
    create_transaction(
        NewTransaction {
            owner_id,
            kind,
            amount: Amount::from_cents(dollars * 100)?,
            label: label.to_owned(),
            date: (now - Duration::days(days_ago)).date(),
            icon: None,
        },
        conn,
    )?;

    Ok(())
}
