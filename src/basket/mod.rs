// ============================================================================
// Basket Service - Cart persistence, pricing, and checkout orchestration
// ============================================================================
//
// This module contains everything the basket side of the store owns:
// - Models (ShoppingCart, ShoppingCartItem)
// - Store contract + implementations (in-memory, Redis)
// - Cache-aside decorator over the store
// - Basket service (discount deduction on store)
// - Checkout orchestrator (initiate / confirm two-phase flow)
// - Errors (BasketError, CheckoutError)
//
// ============================================================================

pub mod cache;
pub mod checkout;
pub mod errors;
pub mod models;
pub mod service;
pub mod store;

pub use cache::CachedBasketRepository;
pub use checkout::{CheckoutService, CheckoutBasketDto, CheckoutStarted, CheckoutUrls};
pub use errors::{BasketError, CheckoutError};
pub use models::{ShoppingCart, ShoppingCartItem};
pub use service::BasketService;
pub use store::{BasketStore, InMemoryBasketStore, RedisBasketStore};
