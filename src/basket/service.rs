use std::sync::Arc;

use rust_decimal::Decimal;

use super::errors::BasketError;
use super::models::ShoppingCart;
use super::store::BasketStore;
use crate::discount::DiscountClient;
use crate::metrics::Metrics;

// ============================================================================
// Basket Service - store with per-line discount deduction
// ============================================================================

/// Applies discounts and writes the cart through the (cached) store.
pub struct BasketService {
    store: Arc<dyn BasketStore>,
    discounts: Arc<dyn DiscountClient>,
    metrics: Arc<Metrics>,
}

impl BasketService {
    pub fn new(
        store: Arc<dyn BasketStore>,
        discounts: Arc<dyn DiscountClient>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            discounts,
            metrics,
        }
    }

    /// Deducts the current discount from every cart line, then stores the
    /// cart. A failed lookup is logged and treated as a zero discount for
    /// that line; storing must never fail because the discount subsystem is
    /// degraded.
    pub async fn store_basket(&self, mut cart: ShoppingCart) -> Result<String, BasketError> {
        for item in &mut cart.items {
            match self.discounts.get_discount(&item.product_name).await {
                Ok(amount) => {
                    item.price = (item.price - amount).max(Decimal::ZERO);
                }
                Err(err) => {
                    self.metrics.discount_fallbacks.inc();
                    tracing::warn!(
                        product = %item.product_name,
                        error = %err,
                        "Discount lookup failed, charging undiscounted price"
                    );
                }
            }
        }

        self.store.store_basket(cart).await
    }

    pub async fn get_basket(&self, user_name: &str) -> Result<ShoppingCart, BasketError> {
        self.store.get_basket(user_name).await
    }

    pub async fn delete_basket(&self, user_name: &str) -> Result<bool, BasketError> {
        self.store.delete_basket(user_name).await
    }
}
