use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

use pennywise::{Budget, Category, ExpenseInput, create_expense, initialize_db, set_budgets};

/// A utility for creating a database with sample data for pennywise.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Description, amount, category and how many days ago the expense happened.
const SAMPLE_EXPENSES: [(&str, f64, &str, i64); 12] = [
    ("Flat white", 5.5, "Food", 0),
    ("Bus fare", 3.2, "Transport", 1),
    ("Weekly groceries", 142.35, "Groceries", 2),
    ("Movie tickets", 38.0, "Entertainment", 3),
    ("Dinner with friends", 64.9, "Food", 5),
    ("Power bill", 118.4, "Utilities", 9),
    ("Rent", 650.0, "Rent", 12),
    ("Petrol", 84.1, "Transport", 16),
    ("Weekly groceries", 131.8, "Groceries", 20),
    ("Birthday present", 45.0, "Other", 27),
    ("Internet", 79.99, "Utilities", 38),
    ("Concert", 120.0, "Entertainment", 45),
];

const SAMPLE_BUDGETS: [(Category, f64); 5] = [
    (Category::Food, 200.0),
    (Category::Transport, 120.0),
    (Category::Groceries, 500.0),
    (Category::Entertainment, 100.0),
    (Category::Rent, 2600.0),
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

    println!("Creating sample expenses...");

    let now = OffsetDateTime::now_utc();
    for (description, amount, category, days_ago) in SAMPLE_EXPENSES {
        let input = ExpenseInput {
            description: description.to_owned(),
            amount: amount.to_string(),
            category: category.to_owned(),
            date: (now - Duration::days(days_ago)).format(&Rfc3339)?,
        };

        create_expense(&input, UtcOffset::UTC, &conn)?;
    }

    println!("Creating sample budgets...");

    let budgets = SAMPLE_BUDGETS
        .map(|(category, amount)| Budget { category, amount });
    set_budgets(&budgets, &conn)?;

    println!("Success!");

    Ok(())
}
