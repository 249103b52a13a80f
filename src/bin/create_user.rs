use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::OffsetDateTime;

use dinero::{NewUser, Role, create_user, initialize_db};

/// A utility for registering a user in the database of the Dinero server.
///
/// Logging in is handled by the authenticating proxy, so this only records
/// who the user is. Pass the printed ID in the `X-User-Id` header.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The user's full name.
    #[arg(long)]
    full_name: String,

    /// The user's email address, must not already be registered.
    #[arg(long)]
    email: String,

    /// Give the user access to the admin routes.
    #[arg(long)]
    admin: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if !Path::new(&args.db_path).is_file() {
        eprintln!("No database found at {:#?}.", args.db_path);
        exit(1);
    }

    let full_name = args.full_name.trim();
    let email = args.email.trim();

    if full_name.is_empty() || email.is_empty() {
        eprintln!("The full name and email must not be empty.");
        exit(1);
    }

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let user = create_user(
        NewUser {
            full_name: full_name.to_owned(),
            email: email.to_owned(),
            role: if args.admin { Role::Admin } else { Role::User },
            created_at: OffsetDateTime::now_utc(),
        },
        &conn,
    )?;

    println!("Created {} user {} with ID {}.", user.role.as_str(), user.email, user.id);

    Ok(())
}
