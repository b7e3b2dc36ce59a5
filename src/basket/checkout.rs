use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::errors::{BasketError, CheckoutError};
use super::models::ShoppingCart;
use super::store::BasketStore;
use crate::domain::order::{AddressDto, PaymentDto};
use crate::messaging::{BasketCheckoutEvent, EventBus, IntegrationEvent};
use crate::metrics::Metrics;
use crate::payments::{CreateSessionRequest, PaymentGateway, PaymentStatus, PriceLine};

// ============================================================================
// Checkout Orchestrator - two-phase basket checkout
// ============================================================================
//
// Phase 1 (initiate): price the basket into gateway line items and open a
// payment session whose metadata carries everything confirmation will need.
// The basket is NOT mutated.
//
// Phase 2 (confirm): arbitrary time later. Verify the session is paid,
// RE-LOAD the basket (it may have changed or vanished), publish the checkout
// integration event, then delete the basket. Publish failure aborts before
// the delete; a delete failure after publish leaves a lingering basket that
// is cleaned up out of band.
//
// ============================================================================

/// Metadata keys embedded in the gateway session.
const META_CUSTOMER_ID: &str = "customerId";
const META_USER_NAME: &str = "userName";
const META_SHIPPING_ADDRESS: &str = "shippingAddress";
const META_BILLING_ADDRESS: &str = "billingAddress";
const META_PAYMENT: &str = "payment";

/// Checkout request: who is paying, where it ships, how it is paid.
#[derive(Debug, Clone)]
pub struct CheckoutBasketDto {
    pub user_name: String,
    pub customer_id: Uuid,
    pub shipping_address: AddressDto,
    pub billing_address: AddressDto,
    pub payment: PaymentDto,
}

#[derive(Debug, Clone)]
pub struct CheckoutStarted {
    pub session_id: String,
    pub redirect_url: String,
}

/// Success and cancel callback targets handed to the gateway.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

pub struct CheckoutService {
    baskets: Arc<dyn BasketStore>,
    gateway: Arc<dyn PaymentGateway>,
    bus: Arc<dyn EventBus>,
    urls: CheckoutUrls,
    metrics: Arc<Metrics>,
}

impl CheckoutService {
    pub fn new(
        baskets: Arc<dyn BasketStore>,
        gateway: Arc<dyn PaymentGateway>,
        bus: Arc<dyn EventBus>,
        urls: CheckoutUrls,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            baskets,
            gateway,
            bus,
            urls,
            metrics,
        }
    }

    /// Opens a payment session for the user's current basket and returns the
    /// redirect target. Fails if the basket is absent or empty.
    pub async fn initiate(&self, dto: CheckoutBasketDto) -> Result<CheckoutStarted, CheckoutError> {
        let basket = self.load_basket(&dto.user_name).await?;
        if basket.items.is_empty() {
            return Err(CheckoutError::EmptyBasket(dto.user_name));
        }

        let line_items = basket
            .items
            .iter()
            .map(|item| {
                Ok(PriceLine {
                    product_id: item.product_id,
                    product_name: item.product_name.clone(),
                    unit_amount: minor_units(item.price)?,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>, CheckoutError>>()?;

        let metadata = HashMap::from([
            (META_CUSTOMER_ID.to_string(), dto.customer_id.to_string()),
            (META_USER_NAME.to_string(), dto.user_name.clone()),
            (
                META_SHIPPING_ADDRESS.to_string(),
                serde_json::to_string(&dto.shipping_address)?,
            ),
            (
                META_BILLING_ADDRESS.to_string(),
                serde_json::to_string(&dto.billing_address)?,
            ),
            (
                META_PAYMENT.to_string(),
                serde_json::to_string(&dto.payment)?,
            ),
        ]);

        let session = self
            .gateway
            .create_session(CreateSessionRequest {
                line_items,
                success_url: self.urls.success_url.clone(),
                cancel_url: self.urls.cancel_url.clone(),
                metadata,
            })
            .await?;

        self.metrics.checkouts_initiated.inc();
        tracing::info!(
            user_name = %dto.user_name,
            session_id = %session.session_id,
            "Checkout session created"
        );

        Ok(CheckoutStarted {
            session_id: session.session_id,
            redirect_url: session.redirect_url,
        })
    }

    /// Confirms a paid session: publishes the checkout integration event
    /// from the session metadata and the freshly re-loaded basket, then
    /// deletes the basket.
    pub async fn confirm(&self, session_id: &str) -> Result<(), CheckoutError> {
        let session = self.gateway.get_session(session_id).await?;

        if session.payment_status != PaymentStatus::Paid {
            self.metrics
                .checkouts_rejected
                .with_label_values(&["unpaid"])
                .inc();
            return Err(CheckoutError::PaymentIncomplete(session_id.to_string()));
        }

        let user_name = metadata_value(&session.metadata, META_USER_NAME)?;
        let customer_id = Uuid::parse_str(&metadata_value(&session.metadata, META_CUSTOMER_ID)?)
            .map_err(|e| CheckoutError::MalformedSession(format!("customerId: {}", e)))?;

        // Arbitrary time has passed since initiation; the basket must be
        // re-read, never reused from phase 1.
        let basket = match self.load_basket(&user_name).await {
            Ok(basket) => basket,
            Err(err) => {
                self.metrics
                    .checkouts_rejected
                    .with_label_values(&["basket_missing"])
                    .inc();
                return Err(err);
            }
        };

        let event = BasketCheckoutEvent {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            user_name: user_name.clone(),
            customer_id,
            total_price: basket.total_price(),
            serialized_shipping_address: metadata_value(&session.metadata, META_SHIPPING_ADDRESS)?,
            serialized_billing_address: metadata_value(&session.metadata, META_BILLING_ADDRESS)?,
            serialized_payment: metadata_value(&session.metadata, META_PAYMENT)?,
            serialized_order_items: serde_json::to_string(&basket.items)?,
        };

        self.bus
            .publish(IntegrationEvent::BasketCheckout(event))
            .await
            .map_err(CheckoutError::Publish)?;
        self.metrics
            .events_published
            .with_label_values(&["BasketCheckoutEvent"])
            .inc();

        if let Err(err) = self.baskets.delete_basket(&user_name).await {
            // The order side already has the event; only the basket cleanup
            // failed. The cart lingers until TTL or manual cleanup.
            tracing::error!(
                user_name = %user_name,
                session_id = %session_id,
                error = %err,
                "Basket delete failed after checkout event was published"
            );
            return Err(CheckoutError::CleanupFailed(err.into()));
        }

        self.metrics.checkouts_confirmed.inc();
        tracing::info!(
            user_name = %user_name,
            session_id = %session_id,
            "Checkout confirmed"
        );

        Ok(())
    }

    async fn load_basket(&self, user_name: &str) -> Result<ShoppingCart, CheckoutError> {
        match self.baskets.get_basket(user_name).await {
            Ok(basket) => Ok(basket),
            Err(BasketError::NotFound(user)) => Err(CheckoutError::BasketNotFound(user)),
            Err(err) => Err(CheckoutError::Store(err.into())),
        }
    }
}

fn metadata_value(
    metadata: &HashMap<String, String>,
    key: &'static str,
) -> Result<String, CheckoutError> {
    metadata
        .get(key)
        .cloned()
        .ok_or_else(|| CheckoutError::MalformedSession(format!("missing key: {}", key)))
}

fn minor_units(price: Decimal) -> Result<i64, CheckoutError> {
    (price * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or(CheckoutError::InvalidPrice(price))
}
