use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::OrderStatus;

// ============================================================================
// Order Commands & DTOs
// ============================================================================
//
// The DTO shapes double as the wire format of the checkout metadata blobs:
// the basket side serializes AddressDto / PaymentDto into the payment
// session, and the order consumer deserializes the same shapes back out of
// the integration event. Unknown fields in the item snapshot (name, size,
// color from the cart) are ignored on the order side.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub address_line: String,
    pub country: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    pub card_name: String,
    pub card_number: String,
    pub expiration: String,
    pub cvv: String,
    pub payment_method: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub product_id: Uuid,
    pub quantity: u32,
    pub price: Decimal,
}

/// Flat order snapshot used by commands, queries and domain events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub order_name: String,
    pub shipping_address: AddressDto,
    pub billing_address: AddressDto,
    pub payment: PaymentDto,
    pub status: OrderStatus,
    pub items: Vec<OrderItemDto>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub order: OrderDto,
}

#[derive(Debug, Clone)]
pub struct UpdateOrderCommand {
    pub order: OrderDto,
}

#[derive(Debug, Clone)]
pub struct DeleteOrderCommand {
    pub order_id: Uuid,
}
