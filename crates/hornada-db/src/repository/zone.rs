//! # Zone Repository
//!
//! Delivery zones as stored rows. Lookup order is decided here: ascending
//! `sort_order`, then insertion order. `hornada_core::zone::locate` honours
//! whatever order it is handed, so this query defines which overlapping zone
//! wins.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;
use hornada_core::{DeliveryZone, GeoPoint, Money};

#[derive(Debug, sqlx::FromRow)]
struct ZoneRow {
    id: String,
    name: String,
    polygon: String,
    price_cents: i64,
    estimated_time: String,
    active: bool,
    sort_order: i32,
}

impl ZoneRow {
    /// An unreadable polygon becomes an empty ring, which matches nothing.
    fn into_zone(self) -> DeliveryZone {
        let polygon = match serde_json::from_str::<Vec<GeoPoint>>(&self.polygon) {
            Ok(ring) => ring,
            Err(e) => {
                warn!(zone_id = %self.id, error = %e, "Zone polygon is unreadable, zone will never match");
                Vec::new()
            }
        };

        DeliveryZone {
            id: self.id,
            name: self.name,
            polygon,
            price: Money::from_cents(self.price_cents),
            estimated_time: self.estimated_time,
            active: self.active,
            order: self.sort_order,
        }
    }
}

/// Repository for delivery zones.
#[derive(Debug, Clone)]
pub struct ZoneRepository {
    pool: SqlitePool,
}

impl ZoneRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ZoneRepository { pool }
    }

    /// Active zones in lookup order.
    pub async fn list_active_ordered(&self) -> DbResult<Vec<DeliveryZone>> {
        let rows: Vec<ZoneRow> = sqlx::query_as(
            r#"
            SELECT id, name, polygon, price_cents, estimated_time, active, sort_order
            FROM delivery_zones
            WHERE active = 1
            ORDER BY sort_order ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded active zones");
        Ok(rows.into_iter().map(ZoneRow::into_zone).collect())
    }

    /// Every zone, inactive ones included, in lookup order.
    pub async fn list_all(&self) -> DbResult<Vec<DeliveryZone>> {
        let rows: Vec<ZoneRow> = sqlx::query_as(
            r#"
            SELECT id, name, polygon, price_cents, estimated_time, active, sort_order
            FROM delivery_zones
            ORDER BY sort_order ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ZoneRow::into_zone).collect())
    }

    /// Inserts a zone or replaces the stored one with the same id.
    ///
    /// Replacing keeps the original insertion position for tie-breaking.
    pub async fn upsert(&self, zone: &DeliveryZone) -> DbResult<()> {
        debug!(zone_id = %zone.id, order = zone.order, "Upserting zone");

        let polygon = serde_json::to_string(&zone.polygon)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO delivery_zones (
                id, name, polygon, price_cents, estimated_time,
                active, sort_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                polygon = excluded.polygon,
                price_cents = excluded.price_cents,
                estimated_time = excluded.estimated_time,
                active = excluded.active,
                sort_order = excluded.sort_order,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&zone.id)
        .bind(&zone.name)
        .bind(polygon)
        .bind(zone.price.cents())
        .bind(&zone.estimated_time)
        .bind(zone.active)
        .bind(zone.order)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM delivery_zones")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
