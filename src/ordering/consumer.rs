use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use super::errors::OrderingError;
use super::handler::OrderCommandHandler;
use crate::domain::order::{
    AddressDto, CreateOrderCommand, OrderDto, OrderItemDto, OrderStatus, PaymentDto,
};
use crate::messaging::{BasketCheckoutEvent, IntegrationEvent, IntegrationEventHandler};
use crate::metrics::Metrics;

// ============================================================================
// Basket Checkout Consumer
// ============================================================================

/// Turns BasketCheckout integration events into new orders.
///
/// Delivery is at-least-once and there is no deduplication key on the event,
/// so a redelivered checkout produces a second order with a fresh id.
pub struct BasketCheckoutConsumer {
    handler: Arc<OrderCommandHandler>,
    metrics: Arc<Metrics>,
}

impl BasketCheckoutConsumer {
    pub fn new(handler: Arc<OrderCommandHandler>, metrics: Arc<Metrics>) -> Self {
        Self { handler, metrics }
    }

    pub async fn consume(&self, event: &BasketCheckoutEvent) -> Result<Uuid, OrderingError> {
        tracing::info!(
            customer_id = %event.customer_id,
            user_name = %event.user_name,
            total_price = %event.total_price,
            "Consuming basket checkout event"
        );

        let shipping_address: AddressDto =
            serde_json::from_str(&event.serialized_shipping_address)?;
        let billing_address: AddressDto = serde_json::from_str(&event.serialized_billing_address)?;
        let payment: PaymentDto = serde_json::from_str(&event.serialized_payment)?;
        let items: Vec<OrderItemDto> = serde_json::from_str(&event.serialized_order_items)?;

        let order_id = self
            .handler
            .create_order(CreateOrderCommand {
                order: OrderDto {
                    id: Uuid::new_v4(),
                    customer_id: event.customer_id,
                    order_name: event.user_name.clone(),
                    shipping_address,
                    billing_address,
                    payment,
                    status: OrderStatus::Pending,
                    items,
                },
            })
            .await?;

        self.metrics
            .events_consumed
            .with_label_values(&["BasketCheckoutEvent"])
            .inc();
        Ok(order_id)
    }
}

#[async_trait]
impl IntegrationEventHandler for BasketCheckoutConsumer {
    async fn handle(&self, event: &IntegrationEvent) -> Result<()> {
        if let IntegrationEvent::BasketCheckout(checkout) = event {
            self.consume(checkout).await?;
        }
        Ok(())
    }
}
