use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::StreamExt;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::Message;

use super::bus::{EventBus, IntegrationEventHandler};
use super::events::IntegrationEvent;
use crate::utils::{retry_with_backoff, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, RetryConfig};

// ============================================================================
// Kafka Event Bus
// ============================================================================

/// Kafka-backed producer for integration events, guarded by a circuit
/// breaker so a dead broker fails fast instead of queueing timeouts.
pub struct KafkaEventBus {
    producer: FutureProducer,
    circuit_breaker: CircuitBreaker,
}

impl KafkaEventBus {
    pub fn new(brokers: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        let cb_config = CircuitBreakerConfig {
            failure_threshold: 5,
            timeout: Duration::from_secs(30),
            success_threshold: 3,
        };

        Ok(Self {
            producer,
            circuit_breaker: CircuitBreaker::new(cb_config),
        })
    }
}

#[async_trait]
impl EventBus for KafkaEventBus {
    async fn publish(&self, event: IntegrationEvent) -> Result<()> {
        let topic = event.topic();
        let key = event.key();
        let payload = serde_json::to_string(&event)?;

        let result = self
            .circuit_breaker
            .call(async {
                let record = FutureRecord::to(topic).key(&key).payload(&payload);
                self.producer
                    .send(record, rdkafka::util::Timeout::After(Duration::from_secs(5)))
                    .await
                    .map_err(|(e, _)| anyhow::anyhow!("Kafka send error: {}", e))?;
                Ok::<(), anyhow::Error>(())
            })
            .await;

        match result {
            Ok(()) => {
                tracing::info!(
                    topic = %topic,
                    key = %key,
                    event_type = event.event_type(),
                    "Published integration event to Kafka"
                );
                Ok(())
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::error!(topic = %topic, "Circuit breaker open - Kafka unavailable");
                Err(anyhow::anyhow!("circuit breaker open for Kafka"))
            }
            Err(CircuitBreakerError::OperationFailed(e)) => {
                tracing::error!(error = %e, topic = %topic, "Failed to publish to Kafka");
                Err(e)
            }
        }
    }
}

// ============================================================================
// Kafka Consumer Loop
// ============================================================================

pub fn checkout_consumer(brokers: &str, group_id: &str) -> Result<StreamConsumer> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .set("group.id", group_id)
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "earliest")
        .create()?;

    consumer.subscribe(&["basket-checkout"])?;
    Ok(consumer)
}

/// Drives the inbound side of the bus: every message on the checkout topic is
/// decoded and handed to the order-service handler, with bounded retry. A
/// message that still fails after retries is logged and skipped; the
/// transport redelivers on the next rebalance if the offset was not
/// committed.
pub async fn run_checkout_consumer(
    consumer: StreamConsumer,
    handler: Arc<dyn IntegrationEventHandler>,
) {
    let mut stream = consumer.stream();

    while let Some(message) = stream.next().await {
        let message = match message {
            Ok(m) => m,
            Err(err) => {
                tracing::error!(error = %err, "Kafka consumer error");
                continue;
            }
        };

        let payload = match message.payload().map(std::str::from_utf8) {
            Some(Ok(p)) => p,
            _ => {
                tracing::warn!("Skipping Kafka message without a UTF-8 payload");
                continue;
            }
        };

        let event: IntegrationEvent = match serde_json::from_str(payload) {
            Ok(e) => e,
            Err(err) => {
                tracing::error!(error = %err, "Skipping undecodable integration event");
                continue;
            }
        };

        let delivery = retry_with_backoff(RetryConfig::default(), |_attempt| {
            let handler = handler.clone();
            let event = event.clone();
            async move { handler.handle(&event).await }
        })
        .await;

        if let Err(err) = delivery {
            tracing::error!(
                event_type = event.event_type(),
                error = %err,
                "Integration event handling failed after retries"
            );
        }
    }
}
