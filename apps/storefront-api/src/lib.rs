//! # hornada-api: Storefront JSON Service
//!
//! axum server in front of the bakery's cart, zones and orders.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP request                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  routes/*      extract State, Path, Json                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  services/*    validate, lock cart, load, apply hornada-core rules      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  hornada-db    repositories over SQLite                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Json<T> or ApiError { code, message }                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tracing_subscriber::EnvFilter;

pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};
pub use state::{AppState, CartLocks};

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    routes::router(state)
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=hornada=trace` - Trace for hornada crates only
/// - Default: `info,hornada=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hornada=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
