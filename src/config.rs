use std::env;

// ============================================================================
// Configuration - environment-driven wiring
// ============================================================================
//
// Every backend is optional: when a connection string is absent the process
// runs fully in-memory, which is how the demo and the test suite operate.
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection string for the basket store. None = in-memory store.
    pub redis_url: Option<String>,
    /// Kafka bootstrap servers for the integration event bus. None = in-memory bus.
    pub kafka_brokers: Option<String>,
    /// Postgres connection string for the order store. None = in-memory store.
    pub database_url: Option<String>,
    /// Where the payment gateway redirects the shopper after paying.
    pub checkout_success_url: String,
    /// Where the payment gateway redirects on cancel.
    pub checkout_cancel_url: String,
    /// Port for the /metrics and /health HTTP server.
    pub metrics_port: u16,
    /// Whether committed orders are announced on the event bus.
    pub order_fulfilment_enabled: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL").ok(),
            kafka_brokers: env::var("KAFKA_BROKERS").ok(),
            database_url: env::var("DATABASE_URL").ok(),
            checkout_success_url: env::var("CHECKOUT_SUCCESS_URL")
                .unwrap_or_else(|_| "https://shop.local/checkout/success".to_string()),
            checkout_cancel_url: env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|_| "https://shop.local/checkout/cancel".to_string()),
            metrics_port: env::var("METRICS_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(9090),
            order_fulfilment_enabled: env::var("ORDER_FULFILMENT_ENABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(true),
        }
    }
}
