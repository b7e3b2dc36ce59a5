// ============================================================================
// Order Domain - Business Logic for the Order Aggregate
// ============================================================================
//
// This module contains ALL Order-specific domain code:
// - Value objects (OrderId, CustomerId, OrderName, Address, Payment, ...)
// - Domain events (OrderCreated, OrderUpdated)
// - Commands and DTO shapes (CreateOrder, UpdateOrder, DeleteOrder)
// - Errors (OrderError)
// - Aggregate (Order with validating factories)
//
// Persistence and dispatch live in the `ordering` application layer.
//
// ============================================================================

pub mod aggregate;
pub mod commands;
pub mod errors;
pub mod events;
pub mod value_objects;

pub use aggregate::Order;
pub use commands::*;
pub use errors::OrderError;
pub use events::*;
pub use value_objects::*;
