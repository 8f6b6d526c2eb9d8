//! # Seed Data Generator
//!
//! Prepares a development database for the cash counter.
//!
//! ## Usage
//! ```bash
//! # Owner "owner" / password "owner", 12 cash sales for today
//! cargo run -p till-db --bin seed
//!
//! # Custom owner password and number of sales
//! cargo run -p till-db --bin seed -- --password s3cret --sales 40
//!
//! # Specify database path
//! cargo run -p till-db --bin seed -- --db ./data/till.db
//! ```
//!
//! Sales are spread over the last hours before now so an open counter
//! sees them when it closes.

use chrono::{Duration, Utc};
use std::env;
use till_core::Money;
use till_db::{CashPayment, Database, DbConfig, DbError};

/// Cash ticket sizes in major units, cycled through.
const TICKETS: &[i64] = &[120, 85, 240, 60, 310, 45, 150, 95, 500, 75];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./till_dev.db");
    let mut username = String::from("owner");
    let mut password = String::from("owner");
    let mut sales: usize = 12;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--owner" | "-o" => {
                if i + 1 < args.len() {
                    username = args[i + 1].clone();
                    i += 1;
                }
            }
            "--password" | "-p" => {
                if i + 1 < args.len() {
                    password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(12);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Till Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>         Database file path (default: ./till_dev.db)");
                println!("  -o, --owner <NAME>      Owner username (default: owner)");
                println!("  -p, --password <PASS>   Owner password (default: owner)");
                println!("  -s, --sales <N>         Cash sales to record (default: 12)");
                println!("  -h, --help              Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    match db.owners().create(&username, &password).await {
        Ok(_) => println!("✓ Owner credential '{}' created", username),
        Err(DbError::UniqueViolation { .. }) => {
            println!("⚠ Owner '{}' already exists, keeping its password", username)
        }
        Err(e) => return Err(e.into()),
    }

    let payments = db.payments();
    let now = Utc::now();
    let mut total = Money::zero();

    for n in 0..sales {
        let amount = Money::from_major(TICKETS[n % TICKETS.len()]);
        let created_at = now - Duration::minutes(((sales - n) * 7) as i64);
        let payment = CashPayment::completed_cash(&format!("seed-order-{}", n + 1), amount, created_at);

        payments.insert(&payment).await?;
        total += amount;
    }

    println!("✓ {} cash sales recorded ({})", sales, total);
    println!();
    println!("Done.");

    db.close().await;
    Ok(())
}
