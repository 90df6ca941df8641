//! # Coupon Repository

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use hornada_core::{Coupon, CouponKind, Money};

#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    code: String,
    kind: String,
    value: i64,
    min_subtotal_cents: i64,
    active: bool,
    expires_at: Option<DateTime<Utc>>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = DbError;

    fn try_from(row: CouponRow) -> DbResult<Self> {
        let kind = match row.kind.as_str() {
            "percentage" => {
                let bps = u32::try_from(row.value).map_err(|_| {
                    DbError::InvalidData(format!("coupon {} has percentage {}", row.code, row.value))
                })?;
                CouponKind::Percentage(bps)
            }
            "fixed" => CouponKind::Fixed(Money::from_cents(row.value)),
            other => {
                return Err(DbError::InvalidData(format!(
                    "coupon {} has unknown kind {}",
                    row.code, other
                )))
            }
        };

        Ok(Coupon {
            code: row.code,
            kind,
            min_subtotal: Money::from_cents(row.min_subtotal_cents),
            active: row.active,
            expires_at: row.expires_at,
        })
    }
}

/// Repository for discount codes.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Looks up a coupon by its normalized (upper-case) code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let row: Option<CouponRow> = sqlx::query_as(
            r#"
            SELECT code, kind, value, min_subtotal_cents, active, expires_at
            FROM coupons
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Coupon::try_from).transpose()
    }

    pub async fn upsert(&self, coupon: &Coupon) -> DbResult<()> {
        debug!(code = %coupon.code, "Upserting coupon");

        let (kind, value) = match coupon.kind {
            CouponKind::Percentage(bps) => ("percentage", i64::from(bps)),
            CouponKind::Fixed(amount) => ("fixed", amount.cents()),
        };

        sqlx::query(
            r#"
            INSERT INTO coupons (
                code, kind, value, min_subtotal_cents, active, expires_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(code) DO UPDATE SET
                kind = excluded.kind,
                value = excluded.value,
                min_subtotal_cents = excluded.min_subtotal_cents,
                active = excluded.active,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(&coupon.code)
        .bind(kind)
        .bind(value)
        .bind(coupon.min_subtotal.cents())
        .bind(coupon.active)
        .bind(coupon.expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
