use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use super::events::IntegrationEvent;

// ============================================================================
// Integration Event Bus
// ============================================================================

/// At-least-once publish channel. A publish error means the event may or may
/// not have reached the transport; callers treat it as not delivered and
/// abort the surrounding operation.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: IntegrationEvent) -> Result<()>;
}

/// Consumer-side contract for in-process subscription.
#[async_trait]
pub trait IntegrationEventHandler: Send + Sync {
    async fn handle(&self, event: &IntegrationEvent) -> Result<()>;
}

// ============================================================================
// In-Memory Bus
// ============================================================================

/// Process-local bus: publish delivers synchronously to every subscriber.
/// Handler failures are logged and do not fail the publish, matching the
/// brokered transport where consumption happens after the broker ack.
#[derive(Default)]
pub struct InMemoryEventBus {
    subscribers: RwLock<Vec<Arc<dyn IntegrationEventHandler>>>,
    published: Mutex<Vec<IntegrationEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, handler: Arc<dyn IntegrationEventHandler>) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.push(handler);
    }

    /// Every event published so far, in order. Used by the demo and tests.
    pub async fn published(&self) -> Vec<IntegrationEvent> {
        let published = self.published.lock().await;
        published.clone()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: IntegrationEvent) -> Result<()> {
        tracing::info!(
            event_type = event.event_type(),
            topic = event.topic(),
            "Publishing integration event"
        );

        {
            let mut published = self.published.lock().await;
            published.push(event.clone());
        }

        let subscribers = self.subscribers.read().await;
        for handler in subscribers.iter() {
            if let Err(err) = handler.handle(&event).await {
                tracing::error!(
                    event_type = event.event_type(),
                    error = %err,
                    "Integration event handler failed"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::events::BasketCheckoutEvent;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct CountingHandler {
        seen: AtomicUsize,
    }

    #[async_trait]
    impl IntegrationEventHandler for CountingHandler {
        async fn handle(&self, _event: &IntegrationEvent) -> Result<()> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl IntegrationEventHandler for FailingHandler {
        async fn handle(&self, _event: &IntegrationEvent) -> Result<()> {
            anyhow::bail!("consumer exploded")
        }
    }

    fn event() -> IntegrationEvent {
        IntegrationEvent::BasketCheckout(BasketCheckoutEvent {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            user_name: "alice".to_string(),
            customer_id: Uuid::new_v4(),
            total_price: dec!(10.00),
            serialized_shipping_address: "{}".to_string(),
            serialized_billing_address: "{}".to_string(),
            serialized_payment: "{}".to_string(),
            serialized_order_items: "[]".to_string(),
        })
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let bus = InMemoryEventBus::new();
        let first = Arc::new(CountingHandler {
            seen: AtomicUsize::new(0),
        });
        let second = Arc::new(CountingHandler {
            seen: AtomicUsize::new(0),
        });
        bus.subscribe(first.clone()).await;
        bus.subscribe(second.clone()).await;

        bus.publish(event()).await.unwrap();

        assert_eq!(first.seen.load(Ordering::SeqCst), 1);
        assert_eq!(second.seen.load(Ordering::SeqCst), 1);
        assert_eq!(bus.published().await.len(), 1);
    }

    #[tokio::test]
    async fn test_handler_failure_does_not_fail_publish() {
        let bus = InMemoryEventBus::new();
        let counting = Arc::new(CountingHandler {
            seen: AtomicUsize::new(0),
        });
        bus.subscribe(Arc::new(FailingHandler)).await;
        bus.subscribe(counting.clone()).await;

        bus.publish(event()).await.unwrap();

        // The failing subscriber did not block delivery to the next one.
        assert_eq!(counting.seen.load(Ordering::SeqCst), 1);
    }
}
