use rust_decimal::Decimal;
use uuid::Uuid;

// ============================================================================
// Order Validation Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order name must not be empty")]
    EmptyOrderName,

    #[error("Address is missing required field: {0}")]
    MissingAddressField(&'static str),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Payment requires card name, card number and expiration")]
    InvalidPayment,

    #[error("CVV must be 3 or 4 digits")]
    InvalidCvv,

    #[error("Order items must not be empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(u32),

    #[error("Item price must not be negative: {0}")]
    NegativePrice(Decimal),

    #[error("Order not found: {0}")]
    NotFound(Uuid),
}
