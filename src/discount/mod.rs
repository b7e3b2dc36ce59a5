use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

// ============================================================================
// Discount Lookup Client - remote per-product price adjustment
// ============================================================================
//
// The discount service is an external collaborator; only the contract lives
// here. Callers apply an availability-over-accuracy policy: any lookup
// failure is treated as a zero discount for that line (see BasketService).
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DiscountError {
    #[error("no discount configured for product: {0}")]
    NotFound(String),

    #[error("discount lookup timed out for product: {0}")]
    Timeout(String),

    #[error("discount service unavailable: {0}")]
    Unavailable(String),
}

/// Remote discount lookup, invoked once per cart line during basket store.
#[async_trait]
pub trait DiscountClient: Send + Sync {
    /// Returns the per-unit discount amount for the product.
    async fn get_discount(&self, product_name: &str) -> Result<Decimal, DiscountError>;
}

/// Table-backed discount client for the demo wiring and tests.
pub struct StaticDiscountClient {
    coupons: HashMap<String, Decimal>,
}

impl StaticDiscountClient {
    pub fn new(coupons: HashMap<String, Decimal>) -> Self {
        Self { coupons }
    }

    pub fn empty() -> Self {
        Self {
            coupons: HashMap::new(),
        }
    }
}

#[async_trait]
impl DiscountClient for StaticDiscountClient {
    async fn get_discount(&self, product_name: &str) -> Result<Decimal, DiscountError> {
        self.coupons
            .get(product_name)
            .copied()
            .ok_or_else(|| DiscountError::NotFound(product_name.to_string()))
    }
}
