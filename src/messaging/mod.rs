// ============================================================================
// Messaging - integration-event contracts and transports
// ============================================================================

pub mod bus;
pub mod events;
pub mod kafka;

pub use bus::{EventBus, InMemoryEventBus, IntegrationEventHandler};
pub use events::{BasketCheckoutEvent, IntegrationEvent, OrderCreatedIntegrationEvent};
pub use kafka::{checkout_consumer, run_checkout_consumer, KafkaEventBus};
