//! Core of a multi-service online store: basket persistence with cache-aside
//! reads, tolerant discount pricing, a two-phase checkout against an external
//! payment gateway, at-least-once integration events between the basket and
//! order services, and an order aggregate whose domain events are dispatched
//! only after the causing state change has been durably committed.

pub mod basket;
pub mod config;
pub mod discount;
pub mod domain;
pub mod messaging;
pub mod metrics;
pub mod ordering;
pub mod payments;
pub mod utils;
