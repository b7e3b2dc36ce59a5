// ============================================================================
// Ordering Application Layer
// ============================================================================
//
// Everything between the order domain and the outside world:
// - Store contract + implementations (in-memory, Postgres)
// - Unit of work with post-commit domain-event dispatch
// - Command handler (create / update / delete / queries)
// - Domain event handlers (logging, fulfilment publishing)
// - Integration-event consumer (BasketCheckoutEvent -> CreateOrder)
//
// ============================================================================

pub mod consumer;
pub mod errors;
pub mod event_handlers;
pub mod handler;
pub mod store;
pub mod unit_of_work;

pub use consumer::BasketCheckoutConsumer;
pub use errors::OrderingError;
pub use event_handlers::{OrderCreatedHandler, OrderUpdatedHandler};
pub use handler::OrderCommandHandler;
pub use store::{InMemoryOrderStore, OrderStore, PostgresOrderStore, StorageOp};
pub use unit_of_work::{DomainEventHandler, EventDispatcher, UnitOfWork};
