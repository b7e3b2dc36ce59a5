// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate gets its own subdirectory with value objects, events,
// commands, errors and the aggregate implementation. This layer knows
// nothing about storage, messaging or the payment gateway.
//
// ============================================================================

pub mod order;
