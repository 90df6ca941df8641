//! # Seed Data Generator
//!
//! Fills a development database with delivery zones around a city centre and
//! a few coupons.
//!
//! ## Usage
//! ```bash
//! cargo run -p hornada-db --bin seed
//! cargo run -p hornada-db --bin seed -- --db ./data/hornada.db
//! ```
//!
//! ## Generated Zones
//! Concentric square rings around the centre point. Inner rings have a lower
//! `order`, so a point inside several rings resolves to the innermost (and
//! cheapest) one.

use chrono::{Duration, Utc};
use std::env;

use hornada_core::{Coupon, CouponKind, DeliveryZone, GeoPoint, Money};
use hornada_db::{Database, DbConfig};

/// Default centre (lat, lng).
const CENTRE: (f64, f64) = (-34.6037, -58.3816);

/// (id, name, half-width in degrees, price cents, ETA)
const RINGS: &[(&str, &str, f64, i64, &str)] = &[
    ("centro", "Centro", 0.02, 500, "30-45 min"),
    ("cercana", "Zona cercana", 0.05, 900, "45-60 min"),
    ("ampliada", "Zona ampliada", 0.10, 1500, "60-90 min"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./hornada_dev.db");

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
                println!("Hornada Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./hornada_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Hornada Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.zones().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} zones, skipping", existing);
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (order, (id, name, half, price, eta)) in RINGS.iter().enumerate() {
        let zone = square_zone(id, name, *half, *price, eta, order as i32);
        db.zones().upsert(&zone).await?;
        println!("  + zone {:<10} {} ({})", id, Money::from_cents(*price), eta);
    }

    let coupons = [
        Coupon {
            code: "BIENVENIDA".to_string(),
            kind: CouponKind::Percentage(1000),
            min_subtotal: Money::from_cents(2000),
            active: true,
            expires_at: Some(Utc::now() + Duration::days(90)),
        },
        Coupon {
            code: "ENVIOGRATIS".to_string(),
            kind: CouponKind::Fixed(Money::from_cents(900)),
            min_subtotal: Money::from_cents(5000),
            active: true,
            expires_at: None,
        },
    ];

    for coupon in &coupons {
        db.coupons().upsert(coupon).await?;
        println!("  + coupon {}", coupon.code);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn square_zone(id: &str, name: &str, half: f64, price: i64, eta: &str, order: i32) -> DeliveryZone {
    let (lat, lng) = CENTRE;
    let (min_lat, max_lat) = (lat - half, lat + half);
    let (min_lng, max_lng) = (lng - half, lng + half);

    DeliveryZone {
        id: id.to_string(),
        name: name.to_string(),
        polygon: vec![
            GeoPoint::new(min_lat, min_lng),
            GeoPoint::new(min_lat, max_lng),
            GeoPoint::new(max_lat, max_lng),
            GeoPoint::new(max_lat, min_lng),
            GeoPoint::new(min_lat, min_lng),
        ],
        price: Money::from_cents(price),
        estimated_time: eta.to_string(),
        active: true,
        order,
    }
}
