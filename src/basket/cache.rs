use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::errors::BasketError;
use super::models::ShoppingCart;
use super::store::BasketStore;
use crate::metrics::Metrics;

// ============================================================================
// Cached Basket Repository - cache-aside decorator over a BasketStore
// ============================================================================
//
// Reads consult a process-local TTL-bounded cache first and fall back to the
// authoritative store on miss. Writes and deletes go to the store FIRST; the
// cache entry is only touched once the authoritative write is confirmed.
// Invalidating before the write would let a racing reader observe
// stale-then-correct-then-stale data.
//
// ============================================================================

struct CacheEntry {
    cart: ShoppingCart,
    inserted_at: Instant,
}

/// Cache-aside decorator. Constructed by explicit composition: build the base
/// store, then wrap it.
pub struct CachedBasketRepository {
    inner: Arc<dyn BasketStore>,
    cache: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    metrics: Arc<Metrics>,
}

impl CachedBasketRepository {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(120);

    pub fn new(inner: Arc<dyn BasketStore>, ttl: Duration, metrics: Arc<Metrics>) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            ttl,
            metrics,
        }
    }

    async fn cached(&self, user_name: &str) -> Option<ShoppingCart> {
        let cache = self.cache.read().await;
        let entry = cache.get(user_name)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.cart.clone())
    }

    async fn refresh(&self, cart: ShoppingCart) {
        let mut cache = self.cache.write().await;
        cache.insert(
            cart.user_name.clone(),
            CacheEntry {
                cart,
                inserted_at: Instant::now(),
            },
        );
    }

    async fn evict(&self, user_name: &str) {
        let mut cache = self.cache.write().await;
        cache.remove(user_name);
    }
}

#[async_trait]
impl BasketStore for CachedBasketRepository {
    async fn get_basket(&self, user_name: &str) -> Result<ShoppingCart, BasketError> {
        if let Some(cart) = self.cached(user_name).await {
            self.metrics.basket_cache_hits.inc();
            tracing::debug!(user_name = %user_name, "Basket cache hit");
            return Ok(cart);
        }

        self.metrics.basket_cache_misses.inc();
        let cart = self.inner.get_basket(user_name).await?;
        self.refresh(cart.clone()).await;
        Ok(cart)
    }

    async fn store_basket(&self, cart: ShoppingCart) -> Result<String, BasketError> {
        // Authoritative write first. A failed store must leave any existing
        // cache entry untouched.
        let user_name = self.inner.store_basket(cart.clone()).await?;
        self.refresh(cart).await;
        Ok(user_name)
    }

    async fn delete_basket(&self, user_name: &str) -> Result<bool, BasketError> {
        let deleted = self.inner.delete_basket(user_name).await?;
        self.evict(user_name).await;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basket::models::ShoppingCartItem;
    use crate::basket::store::InMemoryBasketStore;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    /// Store double that rejects every write, for cache-discipline tests.
    struct FailingBasketStore;

    #[async_trait]
    impl BasketStore for FailingBasketStore {
        async fn get_basket(&self, user_name: &str) -> Result<ShoppingCart, BasketError> {
            Err(BasketError::NotFound(user_name.to_string()))
        }

        async fn store_basket(&self, _cart: ShoppingCart) -> Result<String, BasketError> {
            Err(BasketError::store(anyhow::anyhow!("store unavailable")))
        }

        async fn delete_basket(&self, _user_name: &str) -> Result<bool, BasketError> {
            Err(BasketError::store(anyhow::anyhow!("store unavailable")))
        }
    }

    fn cart(user_name: &str, price: rust_decimal::Decimal) -> ShoppingCart {
        let mut cart = ShoppingCart::new(user_name);
        cart.items.push(ShoppingCartItem {
            product_id: Uuid::new_v4(),
            product_name: "Shirt".to_string(),
            price,
            quantity: 1,
            size: "M".to_string(),
            color: "Blue".to_string(),
        });
        cart
    }

    fn metrics() -> Arc<Metrics> {
        Arc::new(Metrics::new().unwrap())
    }

    #[tokio::test]
    async fn test_get_after_store_returns_cart() {
        let inner = Arc::new(InMemoryBasketStore::new());
        let repo = CachedBasketRepository::new(inner, Duration::from_secs(60), metrics());

        repo.store_basket(cart("alice", dec!(10.00))).await.unwrap();

        // Served from cache.
        let cached = repo.get_basket("alice").await.unwrap();
        assert_eq!(cached.total_price(), dec!(10.00));
    }

    #[tokio::test]
    async fn test_miss_populates_cache_from_store() {
        let inner = Arc::new(InMemoryBasketStore::new());
        inner.store_basket(cart("alice", dec!(5.00))).await.unwrap();

        let m = metrics();
        let repo = CachedBasketRepository::new(inner, Duration::from_secs(60), m.clone());

        repo.get_basket("alice").await.unwrap();
        repo.get_basket("alice").await.unwrap();

        assert_eq!(m.basket_cache_misses.get(), 1);
        assert_eq!(m.basket_cache_hits.get(), 1);
    }

    #[tokio::test]
    async fn test_failed_store_leaves_cache_entry_unchanged() {
        let repo = Arc::new(CachedBasketRepository::new(
            Arc::new(FailingBasketStore),
            Duration::from_secs(60),
            metrics(),
        ));

        // Seed the cache directly, simulating an earlier successful read.
        repo.refresh(cart("alice", dec!(10.00))).await;

        let result = repo.store_basket(cart("alice", dec!(99.00))).await;
        assert!(result.is_err());

        // Previous entry still served; the failed write did not clobber it.
        let cached = repo.cached("alice").await.unwrap();
        assert_eq!(cached.total_price(), dec!(10.00));
    }

    #[tokio::test]
    async fn test_ttl_expiry_falls_back_to_store() {
        let inner = Arc::new(InMemoryBasketStore::new());
        let m = metrics();
        let repo = CachedBasketRepository::new(inner.clone(), Duration::from_millis(20), m.clone());

        repo.store_basket(cart("alice", dec!(10.00))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        // Entry expired; the read must hit the store again.
        repo.get_basket("alice").await.unwrap();
        assert_eq!(m.basket_cache_misses.get(), 1);
    }

    #[tokio::test]
    async fn test_delete_evicts_cache_entry() {
        let inner = Arc::new(InMemoryBasketStore::new());
        let repo = CachedBasketRepository::new(inner, Duration::from_secs(60), metrics());

        repo.store_basket(cart("alice", dec!(10.00))).await.unwrap();
        repo.delete_basket("alice").await.unwrap();

        assert!(repo.cached("alice").await.is_none());
        assert!(matches!(
            repo.get_basket("alice").await,
            Err(BasketError::NotFound(_))
        ));
    }
}
