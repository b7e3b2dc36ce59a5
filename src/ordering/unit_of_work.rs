use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::store::{OrderStore, StorageOp};
use crate::domain::order::{Order, OrderDomainEvent, OrderId};
use crate::metrics::Metrics;

// ============================================================================
// Unit of Work - commit-gated domain-event dispatch
// ============================================================================
//
// Sequence on commit:
//   1. scan the registered aggregates and collect their pending events into
//      one ordered batch (aggregate-touch order);
//   2. apply the storage batch;
//   3. only if the commit succeeded, clear each aggregate's pending list and
//      dispatch the batch to the in-process handlers.
//
// If the commit fails the batch is discarded and no handler runs: no domain
// event is ever visible before its causing state change is durable. A
// handler failure after a successful commit is a lost notification, not a
// data-consistency problem; it is logged and counted, never unwound.
//
// ============================================================================

/// In-process subscriber to committed domain events.
#[async_trait]
pub trait DomainEventHandler: Send + Sync {
    async fn handle(&self, event: &OrderDomainEvent) -> Result<()>;
}

pub struct EventDispatcher {
    handlers: Vec<Arc<dyn DomainEventHandler>>,
    metrics: Arc<Metrics>,
}

impl EventDispatcher {
    pub fn new(handlers: Vec<Arc<dyn DomainEventHandler>>, metrics: Arc<Metrics>) -> Self {
        Self { handlers, metrics }
    }

    async fn dispatch(&self, batch: Vec<OrderDomainEvent>) {
        for event in batch {
            self.metrics
                .domain_events_dispatched
                .with_label_values(&[event.event_type()])
                .inc();

            for handler in &self.handlers {
                if let Err(err) = handler.handle(&event).await {
                    self.metrics
                        .dispatch_failures
                        .with_label_values(&[event.event_type()])
                        .inc();
                    tracing::error!(
                        event_type = event.event_type(),
                        order_id = %event.order_id(),
                        error = %err,
                        "Domain event handler failed after commit (notification lost)"
                    );
                }
            }
        }
    }
}

/// Collects the storage mutations of one business operation and commits them
/// as a unit.
#[derive(Default)]
pub struct UnitOfWork {
    ops: Vec<StorageOp>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_new(&mut self, order: Order) {
        self.ops.push(StorageOp::Insert(order));
    }

    pub fn register_dirty(&mut self, order: Order) {
        self.ops.push(StorageOp::Update(order));
    }

    pub fn register_removed(&mut self, id: OrderId) {
        self.ops.push(StorageOp::Delete(id));
    }

    pub async fn commit(self, store: &dyn OrderStore, dispatcher: &EventDispatcher) -> Result<()> {
        let mut ops = self.ops;

        let batch: Vec<OrderDomainEvent> = ops
            .iter()
            .flat_map(|op| op.pending_events().iter().cloned())
            .collect();

        store.apply(&ops).await?;

        for op in &mut ops {
            op.clear_pending_events();
        }

        dispatcher.dispatch(batch).await;
        Ok(())
    }
}
