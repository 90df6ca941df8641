//! # Application State
//!
//! Shared state handed to every axum handler.
//!
//! ## Per-Cart Serialization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /carts/A/lines ──┐                                                │
//! │  PUT  /carts/A/lines/x ┼──► CartLocks["A"] ──► one at a time:           │
//! │                        │                       load → mutate → save     │
//! │  POST /carts/B/lines ──┴──► CartLocks["B"] ──► runs in parallel with A  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Without the lock two requests could both pass the stock check against the
//! same snapshot and together exceed the ceiling.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use hornada_db::Database;

use crate::config::ApiConfig;

/// Idle lock entries are pruned once the registry grows past this.
const PRUNE_THRESHOLD: usize = 1024;

/// Registry of per-cart async mutexes.
#[derive(Debug, Clone, Default)]
pub struct CartLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl CartLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `cart_id`. Released when the guard drops.
    pub async fn lock(&self, cart_id: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self
                .inner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            if map.len() > PRUNE_THRESHOLD {
                // Only the map holds these, nobody is waiting
                map.retain(|_, m| Arc::strong_count(m) > 1);
            }

            let mutex = Arc::clone(map.entry(cart_id.to_string()).or_default());
            mutex
        };

        mutex.lock_owned().await
    }

    /// Number of carts with a registered lock.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// State shared by all handlers. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
    pub cart_locks: CartLocks,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
            cart_locks: CartLocks::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_cart_is_exclusive() {
        let locks = CartLocks::new();
        let guard = locks.lock("a").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock("a").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_carts_do_not_block() {
        let locks = CartLocks::new();
        let _a = locks.lock("a").await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.lock("b"))
            .await
            .unwrap();
        assert_eq!(locks.len(), 2);
    }
}
