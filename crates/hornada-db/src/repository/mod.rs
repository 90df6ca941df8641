//! # Repository Module
//!
//! One repository per table, each holding a clone of the pool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.zones()    ZoneRepository     list_active_ordered, list_all, upsert │
//! │  db.carts()    CartRepository     load, load_or_reset, save, delete     │
//! │  db.coupons()  CouponRepository   get_by_code, upsert                   │
//! │  db.orders()   OrderRepository    create, get_by_id,                    │
//! │                                   update_payment_status                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! JSON columns (zone polygons, cart payloads, order lines) are decoded here,
//! so callers only ever see hornada-core types.

pub mod cart;
pub mod coupon;
pub mod order;
pub mod zone;

pub use cart::CartRepository;
pub use coupon::CouponRepository;
pub use order::OrderRepository;
pub use zone::ZoneRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use hornada_core::{DeliveryZone, GeoPoint, Money};

    use crate::pool::{Database, DbConfig};

    pub async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn square_zone(id: &str, min: f64, max: f64, order: i32) -> DeliveryZone {
        DeliveryZone {
            id: id.to_string(),
            name: format!("Zona {}", id),
            polygon: vec![
                GeoPoint::new(min, min),
                GeoPoint::new(min, max),
                GeoPoint::new(max, max),
                GeoPoint::new(max, min),
                GeoPoint::new(min, min),
            ],
            price: Money::from_cents(700),
            estimated_time: "40 min".to_string(),
            active: true,
            order,
        }
    }
}
