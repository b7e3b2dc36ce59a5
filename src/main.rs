use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use storefront::basket::{
    BasketService, BasketStore, CachedBasketRepository, CheckoutBasketDto, CheckoutService,
    CheckoutUrls, InMemoryBasketStore, RedisBasketStore, ShoppingCart, ShoppingCartItem,
};
use storefront::config::Config;
use storefront::discount::StaticDiscountClient;
use storefront::domain::order::{AddressDto, OrderStatus, PaymentDto, UpdateOrderCommand};
use storefront::messaging::{
    checkout_consumer, run_checkout_consumer, EventBus, InMemoryEventBus, KafkaEventBus,
};
use storefront::metrics::{start_metrics_server, Metrics};
use storefront::ordering::{
    BasketCheckoutConsumer, EventDispatcher, InMemoryOrderStore, OrderCommandHandler,
    OrderCreatedHandler, OrderStore, OrderUpdatedHandler, PostgresOrderStore,
};
use storefront::payments::SandboxGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug")),
        )
        .init();

    tracing::info!("🚀 Starting storefront");

    let config = Config::from_env();

    // === 1. Initialize Prometheus metrics ===
    tracing::info!("Initializing metrics");
    let metrics = Arc::new(Metrics::new()?);

    // Start metrics HTTP server in background thread
    let metrics_registry = Arc::new(metrics.registry().clone());
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to start metrics runtime: {}", e);
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) = start_metrics_server(metrics_registry, metrics_port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 2. Basket store (Redis when configured, in-memory otherwise) ===
    let backing_store: Arc<dyn BasketStore> = match &config.redis_url {
        Some(url) => {
            tracing::info!("Using Redis basket store at {}", url);
            Arc::new(RedisBasketStore::new(url)?)
        }
        None => {
            tracing::info!("Using in-memory basket store");
            Arc::new(InMemoryBasketStore::new())
        }
    };
    let baskets: Arc<dyn BasketStore> = Arc::new(CachedBasketRepository::new(
        backing_store,
        Duration::from_secs(120),
        metrics.clone(),
    ));

    // === 3. Integration event bus ===
    let in_memory_bus = Arc::new(InMemoryEventBus::new());
    let bus: Arc<dyn EventBus> = match &config.kafka_brokers {
        Some(brokers) => {
            tracing::info!("Using Kafka event bus at {}", brokers);
            Arc::new(KafkaEventBus::new(brokers)?)
        }
        None => {
            tracing::info!("Using in-memory event bus");
            in_memory_bus.clone()
        }
    };

    // === 4. Order store ===
    let order_store: Arc<dyn OrderStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Using Postgres order store");
            let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
            PostgresOrderStore::ensure_schema(&pool).await?;
            Arc::new(PostgresOrderStore::new(pool))
        }
        None => {
            tracing::info!("Using in-memory order store");
            Arc::new(InMemoryOrderStore::new())
        }
    };

    // === 5. Ordering pipeline: dispatcher, command handler, checkout consumer ===
    let dispatcher = Arc::new(EventDispatcher::new(
        vec![
            Arc::new(OrderCreatedHandler::new(
                bus.clone(),
                config.order_fulfilment_enabled,
                metrics.clone(),
            )),
            Arc::new(OrderUpdatedHandler),
        ],
        metrics.clone(),
    ));
    let order_handler = Arc::new(OrderCommandHandler::new(
        order_store,
        dispatcher,
        metrics.clone(),
    ));
    let consumer = Arc::new(BasketCheckoutConsumer::new(
        order_handler.clone(),
        metrics.clone(),
    ));

    match &config.kafka_brokers {
        Some(brokers) => {
            let stream = checkout_consumer(brokers, "storefront-ordering")?;
            let handler = consumer.clone();
            tokio::spawn(async move {
                run_checkout_consumer(stream, handler).await;
            });
        }
        None => in_memory_bus.subscribe(consumer.clone()).await,
    }

    // === 6. Basket and checkout services ===
    let coupons = HashMap::from([
        ("Running Shoes".to_string(), Decimal::new(1000, 2)),
        ("Wool Socks".to_string(), Decimal::new(150, 2)),
    ]);
    let discounts = Arc::new(StaticDiscountClient::new(coupons));
    let basket_service = BasketService::new(baskets.clone(), discounts, metrics.clone());

    let gateway = Arc::new(SandboxGateway::new());
    let checkout = CheckoutService::new(
        baskets.clone(),
        gateway.clone(),
        bus.clone(),
        CheckoutUrls {
            success_url: config.checkout_success_url.clone(),
            cancel_url: config.checkout_cancel_url.clone(),
        },
        metrics.clone(),
    );

    // === 7. Demonstrate the full checkout lifecycle ===
    tracing::info!("📝 Demonstrating basket-to-order lifecycle");

    let mut cart = ShoppingCart::new("alice");
    cart.items.push(ShoppingCartItem {
        product_id: Uuid::new_v4(),
        product_name: "Running Shoes".to_string(),
        price: Decimal::new(8500, 2),
        quantity: 1,
        size: "10".to_string(),
        color: "black".to_string(),
    });
    cart.items.push(ShoppingCartItem {
        product_id: Uuid::new_v4(),
        product_name: "Wool Socks".to_string(),
        price: Decimal::new(900, 2),
        quantity: 2,
        size: "M".to_string(),
        color: "grey".to_string(),
    });
    let user = basket_service.store_basket(cart).await?;
    let stored = basket_service.get_basket(&user).await?;
    tracing::info!("✅ Basket stored for {}, total {}", user, stored.total_price());

    let customer_id = Uuid::new_v4();
    let started = checkout
        .initiate(CheckoutBasketDto {
            user_name: "alice".to_string(),
            customer_id,
            shipping_address: demo_address(),
            billing_address: demo_address(),
            payment: demo_payment(),
        })
        .await?;
    tracing::info!("✅ Checkout session {} at {}", started.session_id, started.redirect_url);

    // The sandbox gateway stands in for the shopper completing payment.
    gateway.mark_paid(&started.session_id).await?;
    checkout.confirm(&started.session_id).await?;
    tracing::info!("✅ Checkout confirmed");

    let orders = order_handler.get_orders_by_name("alice").await?;
    for order in &orders {
        tracing::info!("✅ Order {} created with status {:?}", order.id, order.status);
    }

    if let Some(order) = orders.into_iter().next() {
        let mut updated = order;
        updated.status = OrderStatus::Confirmed;
        order_handler
            .update_order(UpdateOrderCommand { order: updated })
            .await?;
        tracing::info!("✅ Order confirmed");
    }

    tracing::info!("🎉 Demo complete!");
    Ok(())
}

fn demo_address() -> AddressDto {
    AddressDto {
        first_name: "Alice".to_string(),
        last_name: "Smith".to_string(),
        email_address: "alice@example.com".to_string(),
        address_line: "1 Main St".to_string(),
        country: "US".to_string(),
        state: "WA".to_string(),
        zip_code: "98101".to_string(),
    }
}

fn demo_payment() -> PaymentDto {
    PaymentDto {
        card_name: "Alice Smith".to_string(),
        card_number: "4111111111111111".to_string(),
        expiration: "12/27".to_string(),
        cvv: "123".to_string(),
        payment_method: 1,
    }
}
