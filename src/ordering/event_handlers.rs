use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::unit_of_work::DomainEventHandler;
use crate::domain::order::OrderDomainEvent;
use crate::messaging::{EventBus, IntegrationEvent, OrderCreatedIntegrationEvent};
use crate::metrics::Metrics;

// ============================================================================
// Domain Event Handlers
// ============================================================================

/// Reacts to committed OrderCreated events. When fulfilment publishing is
/// enabled the full order snapshot goes out on the bus for downstream
/// services.
pub struct OrderCreatedHandler {
    bus: Arc<dyn EventBus>,
    fulfilment_enabled: bool,
    metrics: Arc<Metrics>,
}

impl OrderCreatedHandler {
    pub fn new(bus: Arc<dyn EventBus>, fulfilment_enabled: bool, metrics: Arc<Metrics>) -> Self {
        Self {
            bus,
            fulfilment_enabled,
            metrics,
        }
    }
}

#[async_trait]
impl DomainEventHandler for OrderCreatedHandler {
    async fn handle(&self, event: &OrderDomainEvent) -> Result<()> {
        let OrderDomainEvent::Created(created) = event else {
            return Ok(());
        };

        tracing::info!(order_id = %created.order.id, "Domain event handled: OrderCreated");

        if !self.fulfilment_enabled {
            return Ok(());
        }

        self.bus
            .publish(IntegrationEvent::OrderCreated(OrderCreatedIntegrationEvent {
                id: Uuid::new_v4(),
                occurred_at: Utc::now(),
                order: created.order.clone(),
            }))
            .await?;

        self.metrics
            .events_published
            .with_label_values(&["OrderCreatedIntegrationEvent"])
            .inc();
        Ok(())
    }
}

/// Log-only observer for committed OrderUpdated events.
pub struct OrderUpdatedHandler;

#[async_trait]
impl DomainEventHandler for OrderUpdatedHandler {
    async fn handle(&self, event: &OrderDomainEvent) -> Result<()> {
        if let OrderDomainEvent::Updated(updated) = event {
            tracing::info!(
                order_id = %updated.order.id,
                occurred_at = %updated.occurred_at,
                "Domain event handled: OrderUpdated"
            );
        }
        Ok(())
    }
}
