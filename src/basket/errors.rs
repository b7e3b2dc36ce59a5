use crate::payments::GatewayError;

// ============================================================================
// Basket & Checkout Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BasketError {
    /// No cart exists for the given user. This is a signal, not a null: callers
    /// distinguish "no cart" from "empty cart" through this variant.
    #[error("basket not found for user: {0}")]
    NotFound(String),

    #[error("basket store failure: {0}")]
    Store(#[source] anyhow::Error),
}

impl BasketError {
    pub fn store(err: impl Into<anyhow::Error>) -> Self {
        Self::Store(err.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("basket not found for user: {0}")]
    BasketNotFound(String),

    #[error("basket for user {0} has no items")]
    EmptyBasket(String),

    #[error("payment session {0} is not in a paid state")]
    PaymentIncomplete(String),

    #[error("payment session metadata is missing or malformed: {0}")]
    MalformedSession(String),

    #[error("price not representable in minor currency units: {0}")]
    InvalidPrice(rust_decimal::Decimal),

    #[error("failed to serialize checkout payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("failed to publish checkout event: {0}")]
    Publish(#[source] anyhow::Error),

    /// The order-side hand-off already happened; only the basket cleanup failed.
    #[error("basket delete failed after checkout event was published: {0}")]
    CleanupFailed(#[source] anyhow::Error),

    #[error("basket store failure: {0}")]
    Store(#[source] anyhow::Error),
}
