use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::commands::OrderDto;

// ============================================================================
// Order Domain Events
// ============================================================================
//
// Raised by the aggregate at creation and update time, captured on its
// pending-event list, and drained only by the unit of work after the storage
// commit succeeds. Until then they are invisible to the rest of the system.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderDomainEvent {
    Created(OrderCreated),
    Updated(OrderUpdated),
}

impl OrderDomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderDomainEvent::Created(_) => "OrderCreated",
            OrderDomainEvent::Updated(_) => "OrderUpdated",
        }
    }

    pub fn order_id(&self) -> Uuid {
        match self {
            OrderDomainEvent::Created(e) => e.order.id,
            OrderDomainEvent::Updated(e) => e.order.id,
        }
    }
}

/// Initial event in the order lifecycle; carries the full order snapshot so
/// downstream handlers can publish it without re-loading the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order: OrderDto,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdated {
    pub order: OrderDto,
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::commands::{AddressDto, OrderItemDto, PaymentDto};
    use crate::domain::order::value_objects::OrderStatus;
    use rust_decimal_macros::dec;

    fn dto() -> OrderDto {
        OrderDto {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            order_name: "alice".to_string(),
            shipping_address: AddressDto {
                first_name: "Alice".to_string(),
                last_name: "Smith".to_string(),
                email_address: "alice@example.com".to_string(),
                address_line: "1 Main St".to_string(),
                country: "US".to_string(),
                state: "WA".to_string(),
                zip_code: "98101".to_string(),
            },
            billing_address: AddressDto {
                first_name: "Alice".to_string(),
                last_name: "Smith".to_string(),
                email_address: "alice@example.com".to_string(),
                address_line: "1 Main St".to_string(),
                country: "US".to_string(),
                state: "WA".to_string(),
                zip_code: "98101".to_string(),
            },
            payment: PaymentDto {
                card_name: "Alice Smith".to_string(),
                card_number: "4111111111111111".to_string(),
                expiration: "12/27".to_string(),
                cvv: "123".to_string(),
                payment_method: 1,
            },
            status: OrderStatus::Pending,
            items: vec![OrderItemDto {
                product_id: Uuid::new_v4(),
                quantity: 2,
                price: dec!(75.00),
            }],
        }
    }

    #[test]
    fn test_event_type_tags() {
        let created = OrderDomainEvent::Created(OrderCreated {
            order: dto(),
            occurred_at: Utc::now(),
        });
        assert_eq!(created.event_type(), "OrderCreated");

        let updated = OrderDomainEvent::Updated(OrderUpdated {
            order: dto(),
            occurred_at: Utc::now(),
        });
        assert_eq!(updated.event_type(), "OrderUpdated");
    }

    #[test]
    fn test_event_serialization_round_trip() {
        let event = OrderDomainEvent::Created(OrderCreated {
            order: dto(),
            occurred_at: Utc::now(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let back: OrderDomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.order_id(), event.order_id());
    }
}
