mod server;

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Basket cache effectiveness (hits, misses)
// - Discount lookup degradation
// - Checkout funnel (initiated, confirmed, rejected)
// - Integration events published and consumed
// - Order command outcomes and domain event dispatch
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Basket Metrics
    pub basket_cache_hits: IntCounter,
    pub basket_cache_misses: IntCounter,
    pub discount_fallbacks: IntCounter,

    // Checkout Metrics
    pub checkouts_initiated: IntCounter,
    pub checkouts_confirmed: IntCounter,
    pub checkouts_rejected: IntCounterVec,

    // Integration Event Metrics
    pub events_published: IntCounterVec,
    pub events_consumed: IntCounterVec,

    // Ordering Metrics
    pub orders_created: IntCounter,
    pub orders_updated: IntCounter,
    pub domain_events_dispatched: IntCounterVec,
    pub dispatch_failures: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Basket Metrics
        let basket_cache_hits = IntCounter::new(
            "basket_cache_hits_total",
            "Basket reads served from the in-process cache",
        )?;
        registry.register(Box::new(basket_cache_hits.clone()))?;

        let basket_cache_misses = IntCounter::new(
            "basket_cache_misses_total",
            "Basket reads that fell through to the backing store",
        )?;
        registry.register(Box::new(basket_cache_misses.clone()))?;

        let discount_fallbacks = IntCounter::new(
            "discount_fallbacks_total",
            "Basket lines stored at full price because the discount lookup failed",
        )?;
        registry.register(Box::new(discount_fallbacks.clone()))?;

        // Checkout Metrics
        let checkouts_initiated = IntCounter::new(
            "checkouts_initiated_total",
            "Payment sessions created for baskets",
        )?;
        registry.register(Box::new(checkouts_initiated.clone()))?;

        let checkouts_confirmed = IntCounter::new(
            "checkouts_confirmed_total",
            "Checkouts confirmed end to end",
        )?;
        registry.register(Box::new(checkouts_confirmed.clone()))?;

        let checkouts_rejected = IntCounterVec::new(
            Opts::new("checkouts_rejected_total", "Checkout confirmations rejected"),
            &["reason"],
        )?;
        registry.register(Box::new(checkouts_rejected.clone()))?;

        // Integration Event Metrics
        let events_published = IntCounterVec::new(
            Opts::new("integration_events_published_total", "Integration events published"),
            &["event_type"],
        )?;
        registry.register(Box::new(events_published.clone()))?;

        let events_consumed = IntCounterVec::new(
            Opts::new("integration_events_consumed_total", "Integration events consumed"),
            &["event_type"],
        )?;
        registry.register(Box::new(events_consumed.clone()))?;

        // Ordering Metrics
        let orders_created = IntCounter::new("orders_created_total", "Orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_updated = IntCounter::new("orders_updated_total", "Orders updated")?;
        registry.register(Box::new(orders_updated.clone()))?;

        let domain_events_dispatched = IntCounterVec::new(
            Opts::new("domain_events_dispatched_total", "Domain events dispatched after commit"),
            &["event_type"],
        )?;
        registry.register(Box::new(domain_events_dispatched.clone()))?;

        let dispatch_failures = IntCounterVec::new(
            Opts::new("domain_event_dispatch_failures_total", "Domain event handler failures"),
            &["event_type"],
        )?;
        registry.register(Box::new(dispatch_failures.clone()))?;

        Ok(Self {
            registry,
            basket_cache_hits,
            basket_cache_misses,
            discount_fallbacks,
            checkouts_initiated,
            checkouts_confirmed,
            checkouts_rejected,
            events_published,
            events_consumed,
            orders_created,
            orders_updated,
            domain_events_dispatched,
            dispatch_failures,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
