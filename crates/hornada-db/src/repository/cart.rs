//! # Cart Repository
//!
//! Server-side cart snapshots. One row per cart, holding the whole line list
//! as a JSON array.
//!
//! ## Snapshot Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load_or_reset(cart_id)                                                 │
//! │       │                                                                 │
//! │       ├── no row          → empty ledger                                │
//! │       ├── readable row    → CartLedger::from_json                       │
//! │       └── corrupt row     → warn!, delete row, empty ledger             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  mutate in memory (add / update / remove / clear)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  save(cart_id, &ledger) → whole payload rewritten                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Corrupt data is never patched back together.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use hornada_core::{CartLedger, CoreError};

/// Repository for cart snapshots.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Loads a cart. A cart that was never saved is empty.
    ///
    /// ## Errors
    /// `CorruptSnapshot` when the stored payload cannot be read.
    pub async fn load(&self, cart_id: &str) -> DbResult<CartLedger> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM cart_snapshots WHERE cart_id = ?1")
                .bind(cart_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(payload) = payload else {
            return Ok(CartLedger::new());
        };

        CartLedger::from_json(&payload).map_err(|e| match e {
            CoreError::CorruptSnapshot(reason) => DbError::CorruptSnapshot {
                cart_id: cart_id.to_string(),
                reason,
            },
            other => DbError::Core(other),
        })
    }

    /// Loads a cart, discarding it if the stored payload is corrupt.
    pub async fn load_or_reset(&self, cart_id: &str) -> DbResult<CartLedger> {
        match self.load(cart_id).await {
            Err(DbError::CorruptSnapshot { reason, .. }) => {
                warn!(cart_id = %cart_id, reason = %reason, "Discarding corrupt cart snapshot");
                self.delete(cart_id).await?;
                Ok(CartLedger::new())
            }
            other => other,
        }
    }

    /// Writes the full line list, replacing any previous snapshot.
    pub async fn save(&self, cart_id: &str, ledger: &CartLedger) -> DbResult<()> {
        let payload = ledger.to_json()?;

        debug!(cart_id = %cart_id, lines = ledger.line_count(), "Saving cart snapshot");

        sqlx::query(
            r#"
            INSERT INTO cart_snapshots (cart_id, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(cart_id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(cart_id)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes the snapshot. Returns true if a row existed.
    pub async fn delete(&self, cart_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM cart_snapshots WHERE cart_id = ?1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
