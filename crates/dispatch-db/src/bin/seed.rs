//! # Seed Data Generator
//!
//! Populates the database with demo records for development.
//!
//! ## Usage
//! ```bash
//! # 50 orders over demo users, customers, couriers and products (default)
//! cargo run -p dispatch-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p dispatch-db --bin seed -- --orders 500
//!
//! # Specify database path (otherwise DISPATCH_DATABASE_PATH or ./dispatch.db)
//! cargo run -p dispatch-db --bin seed -- --db ./data/dispatch.db
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info,dispatch_db=debug,sqlx=warn`).

use std::env;

use dispatch_core::{
    CreateCategory, CreateCourier, CreateCustomer, CreateOrder, CreateProduct, CreateUser,
    ListRequest,
};
use dispatch_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Categories and the products in each, with unit prices.
const CATALOG: &[(&str, &[(&str, f64)])] = &[
    (
        "Hot Meals",
        &[("Plov", 4.5), ("Lagman", 3.9), ("Shashlik", 6.0), ("Manti", 4.2)],
    ),
    (
        "Bakery",
        &[("Non", 0.5), ("Samsa", 1.2), ("Patir", 0.9)],
    ),
    (
        "Drinks",
        &[("Green Tea", 0.8), ("Ayran", 1.0), ("Compote", 1.1), ("Water", 0.4)],
    ),
];

const USERS: &[(&str, &str)] = &[("Operator One", "+1 555-0101"), ("Operator Two", "+1 555-0102")];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Kamola Yusupova", "+1 555-0201"),
    ("Jasur Karimov", "+1 555-0202"),
    ("Nodira Aliyeva", "+1 555-0203"),
    ("O'Brien Catering", "+1 555-0204"),
    ("Timur Rashidov", "+1 555-0205"),
];

const COURIERS: &[(&str, &str)] = &[
    ("Sardor", "+1 555-0301"),
    ("Bekzod", "+1 555-0302"),
    ("Dilshod", "+1 555-0303"),
];

const DEFAULT_ORDERS: usize = 50;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut orders = DEFAULT_ORDERS;
    let mut config = DbConfig::from_env()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-n" => {
                if i + 1 < args.len() {
                    orders = args[i + 1].parse().unwrap_or(DEFAULT_ORDERS);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Dispatch Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --orders <N>   Number of orders to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./dispatch.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Dispatch Seed Data Generator");
    println!("==============================");
    println!("Database: {}", config.database_path.display());
    println!("Orders:   {}", orders);
    println!();

    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.orders().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} orders", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    let mut user_ids = Vec::new();
    for (name, phone) in USERS {
        user_ids.push(
            db.users()
                .create(&CreateUser {
                    name: name.to_string(),
                    phone: phone.to_string(),
                })
                .await?,
        );
    }

    let mut customer_ids = Vec::new();
    for (name, phone) in CUSTOMERS {
        customer_ids.push(
            db.customers()
                .create(&CreateCustomer {
                    name: name.to_string(),
                    phone: phone.to_string(),
                })
                .await?,
        );
    }

    let mut courier_ids = Vec::new();
    for (name, phone) in COURIERS {
        courier_ids.push(
            db.couriers()
                .create(&CreateCourier {
                    name: name.to_string(),
                    phone: phone.to_string(),
                })
                .await?,
        );
    }

    let mut product_ids = Vec::new();
    for (category, products) in CATALOG {
        let category_id = db
            .categories()
            .create(&CreateCategory {
                name: category.to_string(),
            })
            .await?;

        for (name, price) in products.iter() {
            product_ids.push(
                db.products()
                    .create(&CreateProduct {
                        name: name.to_string(),
                        price: *price,
                        category_id: category_id.clone(),
                    })
                    .await?,
            );
        }
    }

    info!(
        users = user_ids.len(),
        customers = customer_ids.len(),
        couriers = courier_ids.len(),
        products = product_ids.len(),
        "Reference data created"
    );

    let mut generated = 0;
    for seed in 0..orders {
        let order = generate_order(seed, &user_ids, &customer_ids, &product_ids, &courier_ids);

        if let Err(e) = db.orders().create(&order).await {
            eprintln!("Failed to insert {}: {}", order.name, e);
            continue;
        }
        generated += 1;
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} orders in {:?}", generated, elapsed);

    // Spot-check the read side
    let page = db.orders().get_list(&ListRequest::new(0, 5)).await?;
    println!("  Orders in store: {}", page.count);
    if let Some(order) = page.items.first() {
        println!(
            "  First: {} × {} = {:.2}",
            order.product.as_ref().map(|p| p.name.as_str()).unwrap_or("-"),
            order.quantity,
            order.total_price.unwrap_or_default()
        );
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Initializes tracing with `RUST_LOG`, falling back to a sensible default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dispatch_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds one order, spreading references deterministically over `seed`.
///
/// Every seventh order has no courier yet.
fn generate_order(
    seed: usize,
    users: &[String],
    customers: &[String],
    products: &[String],
    couriers: &[String],
) -> CreateOrder {
    let pick = |ids: &[String], step: usize| -> String {
        if ids.is_empty() {
            String::new()
        } else {
            ids[(seed * step) % ids.len()].clone()
        }
    };

    let courier_id = if seed % 7 == 6 {
        String::new()
    } else {
        pick(couriers, 1)
    };

    CreateOrder {
        name: format!("Order #{:04}", seed + 1),
        quantity: (seed % 5) as i64 + 1,
        user_id: pick(users, 1),
        customer_id: pick(customers, 3),
        product_id: pick(products, 7),
        courier_id,
    }
}
