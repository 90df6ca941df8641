//! # hornada-db: Database Layer for Hornada
//!
//! SQLite storage for the storefront, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hornada Data Flow                                │
//! │                                                                         │
//! │  axum handler (POST /carts/{id}/lines)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     hornada-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ ZoneRepository │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CartRepository │    │ 001_initial_ │  │   │
//! │  │   │ WAL, FKs on   │    │ CouponRepo...  │    │ schema.sql   │  │   │
//! │  │   │               │    │ OrderRepo...   │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  hornada.db (SQLite file)                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hornada_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./hornada.db")).await?;
//! let zones = db.zones().list_active_ordered().await?;
//! let cart = db.carts().load_or_reset(&cart_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::{CartRepository, CouponRepository, OrderRepository, ZoneRepository};
