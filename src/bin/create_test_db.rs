use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use pocketbook_rs::{
    BankName, CategoryName, NewExpense, PasswordHash, ValidatedPassword, create_bank,
    create_expense, create_user, get_or_create_category_by_name, initialize_db,
    set_bank_tracking,
};

/// A utility for creating a test database for pocketbook_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// (days ago, amount, category, note)
const SAMPLE_EXPENSES: [(i64, f64, &str, &str); 12] = [
    (0, 250.0, "Food", "Lunch"),
    (1, 60.0, "Transport", "Auto rickshaw"),
    (2, 1_499.0, "Shopping", "Shoes"),
    (5, 85_000.0, "Income", "Salary"),
    (9, 2_340.5, "Bills", "Electricity"),
    (14, 499.0, "Entertainment", "Movie tickets"),
    (21, 780.0, "Health", "Pharmacy"),
    (35, 85_000.0, "Income", "Salary"),
    (38, 3_200.0, "Food", "Groceries"),
    (45, 1_100.0, "Transport", "Fuel"),
    (70, 12_000.0, "Shopping", "Phone"),
    (95, 640.0, "Snacks", "Chai and samosas"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating test user test@example.com...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("test@example.com", password_hash, &connection)?;

    set_bank_tracking(user.id, true, &connection)?;
    let bank = create_bank(user.id, BankName::new_unchecked("Savings"), &connection)?;

    println!("Adding sample expenses...");

    let now = OffsetDateTime::now_utc();
    for (days_ago, amount, category, note) in SAMPLE_EXPENSES {
        let category = get_or_create_category_by_name(
            user.id,
            CategoryName::new_unchecked(category),
            &connection,
        )?;
        let bank_id = (days_ago % 2 == 0).then_some(bank.id);
        let expense = NewExpense::new(
            amount,
            category.id,
            bank_id,
            note,
            now - Duration::days(days_ago),
            now.date(),
        )?;
        create_expense(user.id, &expense, &connection)?;
    }

    println!("Success!");

    Ok(())
}
