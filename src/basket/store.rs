use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::RwLock;

use super::errors::BasketError;
use super::models::ShoppingCart;

// ============================================================================
// Basket Store - document-style persistence keyed by user name
// ============================================================================

/// Contract for the authoritative basket store.
///
/// Semantics are last-write-wins per key. `get_basket` signals absence with
/// [`BasketError::NotFound`] rather than returning an empty cart.
#[async_trait]
pub trait BasketStore: Send + Sync {
    async fn get_basket(&self, user_name: &str) -> Result<ShoppingCart, BasketError>;

    /// Stores (creates or replaces) the cart and returns its key.
    async fn store_basket(&self, cart: ShoppingCart) -> Result<String, BasketError>;

    /// Returns `true` once the cart is gone. Deleting a missing cart succeeds.
    async fn delete_basket(&self, user_name: &str) -> Result<bool, BasketError>;
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// Process-local basket store, used by the demo wiring and tests.
#[derive(Default)]
pub struct InMemoryBasketStore {
    carts: RwLock<HashMap<String, ShoppingCart>>,
}

impl InMemoryBasketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BasketStore for InMemoryBasketStore {
    async fn get_basket(&self, user_name: &str) -> Result<ShoppingCart, BasketError> {
        let carts = self.carts.read().await;
        carts
            .get(user_name)
            .cloned()
            .ok_or_else(|| BasketError::NotFound(user_name.to_string()))
    }

    async fn store_basket(&self, cart: ShoppingCart) -> Result<String, BasketError> {
        let user_name = cart.user_name.clone();
        let mut carts = self.carts.write().await;
        carts.insert(user_name.clone(), cart);
        Ok(user_name)
    }

    async fn delete_basket(&self, user_name: &str) -> Result<bool, BasketError> {
        let mut carts = self.carts.write().await;
        carts.remove(user_name);
        Ok(true)
    }
}

// ============================================================================
// Redis Store
// ============================================================================

/// Redis-backed basket store. Carts are stored as JSON documents under
/// `basket:{user_name}`.
pub struct RedisBasketStore {
    client: Arc<redis::Client>,
}

impl RedisBasketStore {
    pub fn new(redis_url: &str) -> Result<Self, BasketError> {
        let client = redis::Client::open(redis_url).map_err(BasketError::store)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    fn key(user_name: &str) -> String {
        format!("basket:{}", user_name)
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, BasketError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(BasketError::store)
    }
}

#[async_trait]
impl BasketStore for RedisBasketStore {
    async fn get_basket(&self, user_name: &str) -> Result<ShoppingCart, BasketError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(Self::key(user_name))
            .await
            .map_err(BasketError::store)?;

        match raw {
            Some(json) => serde_json::from_str(&json).map_err(BasketError::store),
            None => Err(BasketError::NotFound(user_name.to_string())),
        }
    }

    async fn store_basket(&self, cart: ShoppingCart) -> Result<String, BasketError> {
        let user_name = cart.user_name.clone();
        let json = serde_json::to_string(&cart).map_err(BasketError::store)?;

        let mut conn = self.connection().await?;
        let _: () = conn
            .set(Self::key(&user_name), json)
            .await
            .map_err(BasketError::store)?;

        tracing::debug!(user_name = %user_name, "Basket stored in Redis");
        Ok(user_name)
    }

    async fn delete_basket(&self, user_name: &str) -> Result<bool, BasketError> {
        let mut conn = self.connection().await?;
        let _: i64 = conn
            .del(Self::key(user_name))
            .await
            .map_err(BasketError::store)?;
        Ok(true)
    }
}
