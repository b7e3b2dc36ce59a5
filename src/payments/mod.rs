use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod sandbox;

pub use sandbox::SandboxGateway;

// ============================================================================
// Payment Gateway - external collaborator boundary
// ============================================================================
//
// The gateway is consumed only through "create session" / "get session".
// Between checkout initiation and confirmation all checkout state lives in
// the gateway's session metadata; nothing is persisted locally.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("payment session not found: {0}")]
    SessionNotFound(String),

    #[error("payment gateway unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

/// One price line of a checkout session. `unit_amount` is in minor currency
/// units (cents).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_amount: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub line_items: Vec<PriceLine>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,
}

/// Result of opening a session: an opaque id plus the URL the customer is
/// redirected to for payment.
#[derive(Debug, Clone)]
pub struct CreatedSession {
    pub session_id: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Expired,
}

/// Session state as reported by the gateway at confirmation time.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub payment_status: PaymentStatus,
    pub metadata: HashMap<String, String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CreatedSession, GatewayError>;

    async fn get_session(&self, session_id: &str) -> Result<SessionState, GatewayError>;
}
