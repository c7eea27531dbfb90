//! # Catalog Seeder
//!
//! Populates an empty database with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./sweetshop.db (default)
//! cargo run -p sweetshop-db --bin seed
//!
//! # Specify database path
//! cargo run -p sweetshop-db --bin seed -- --db ./data/shop.db
//! ```
//!
//! Accounts are not seeded. Create the first admin through
//! `POST /api/auth/admin/setup` once the API is running.

use anyhow::Context;
use std::env;
use sweetshop_core::{Money, NewCategory, NewSweet};
use sweetshop_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (category, description, [(sweet, price in cents, stock)])
const CATALOG: &[(&str, &str, &[(&str, i64, i64)])] = &[
    (
        "Chocolate",
        "Bars, truffles and everything cocoa",
        &[
            ("Dark Chocolate Bar", 299, 40),
            ("Milk Chocolate Buttons", 149, 60),
            ("Hazelnut Truffles", 549, 20),
            ("White Chocolate Mice", 199, 35),
        ],
    ),
    (
        "Gummies",
        "Chewy, fruity and sometimes sour",
        &[
            ("Gummy Bears", 250, 80),
            ("Sour Worms", 200, 75),
            ("Cola Bottles", 180, 90),
        ],
    ),
    (
        "Hard Candy",
        "Boiled sweets and lollipops",
        &[
            ("Rainbow Lollipop", 99, 120),
            ("Pear Drops", 175, 50),
            ("Sherbet Lemons", 175, 0),
        ],
    ),
    (
        "Fudge & Toffee",
        "Slow-cooked butter and sugar",
        &[
            ("Vanilla Fudge", 350, 25),
            ("Salted Caramel Toffee", 399, 15),
        ],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./sweetshop.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Sweet Shop Catalog Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./sweetshop.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("failed to open database at {db_path}"))?;

    info!(path = %db_path, "Connected, migrations applied");

    let existing = db.sweets().count().await?;
    if existing > 0 {
        warn!(existing, "Catalog already has sweets, skipping seed");
        db.close().await;
        return Ok(());
    }

    let mut categories = 0;
    let mut sweets = 0;

    for (category_name, description, items) in CATALOG {
        let category = match db.categories().find_by_name(category_name).await? {
            Some(existing) => existing,
            None => {
                categories += 1;
                db.categories()
                    .insert(&NewCategory {
                        name: category_name.to_string(),
                        description: Some(description.to_string()),
                        image_url: None,
                    })
                    .await
                    .with_context(|| format!("failed to insert category {category_name}"))?
            }
        };

        for (name, price_cents, quantity) in items.iter() {
            db.sweets()
                .insert(&NewSweet {
                    name: name.to_string(),
                    description: None,
                    category_id: Some(category.id.clone()),
                    price: Money::from_cents(*price_cents),
                    quantity: *quantity,
                    image_url: None,
                })
                .await
                .with_context(|| format!("failed to insert sweet {name}"))?;
            sweets += 1;
        }
    }

    info!(categories, sweets, "Seed complete");

    db.close().await;
    Ok(())
}
