use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::OrderDto;

// ============================================================================
// Integration Events - cross-service message contracts
// ============================================================================
//
// These are the only shapes that cross the service boundary. Delivery is
// at-least-once; consumers must tolerate duplicates. The address, payment
// and item payloads of the checkout event are opaque serialized blobs as far
// as the bus is concerned.
//
// ============================================================================

/// Produced once per successful payment confirmation, consumed by the order
/// service. Versionless and immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketCheckoutEvent {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub user_name: String,
    pub customer_id: Uuid,
    pub total_price: Decimal,
    pub serialized_shipping_address: String,
    pub serialized_billing_address: String,
    pub serialized_payment: String,
    pub serialized_order_items: String,
}

/// Published by the order-created domain-event handler when fulfilment
/// publishing is enabled; downstream fulfilment consumes the full snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedIntegrationEvent {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub order: OrderDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum IntegrationEvent {
    BasketCheckout(BasketCheckoutEvent),
    OrderCreated(OrderCreatedIntegrationEvent),
}

impl IntegrationEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            IntegrationEvent::BasketCheckout(_) => "BasketCheckoutEvent",
            IntegrationEvent::OrderCreated(_) => "OrderCreatedIntegrationEvent",
        }
    }

    /// Topic the event is routed to on a brokered transport.
    pub fn topic(&self) -> &'static str {
        match self {
            IntegrationEvent::BasketCheckout(_) => "basket-checkout",
            IntegrationEvent::OrderCreated(_) => "order-created",
        }
    }

    /// Partition key: one customer's events stay on one partition. No
    /// ordering guarantee is required across customers.
    pub fn key(&self) -> String {
        match self {
            IntegrationEvent::BasketCheckout(e) => e.customer_id.to_string(),
            IntegrationEvent::OrderCreated(e) => e.order.customer_id.to_string(),
        }
    }
}
