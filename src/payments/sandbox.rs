use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    CreateSessionRequest, CreatedSession, GatewayError, PaymentGateway, PaymentStatus, SessionState,
};

// ============================================================================
// Sandbox Gateway - in-process payment sessions
// ============================================================================

struct SandboxSession {
    status: PaymentStatus,
    metadata: HashMap<String, String>,
}

/// In-process gateway holding sessions in memory. Payment completion is
/// driven externally through [`SandboxGateway::mark_paid`], mirroring the
/// customer finishing the hosted payment page.
#[derive(Default)]
pub struct SandboxGateway {
    sessions: Mutex<HashMap<String, SandboxSession>>,
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the session into the paid state.
    pub async fn mark_paid(&self, session_id: &str) -> Result<(), GatewayError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| GatewayError::SessionNotFound(session_id.to_string()))?;
        session.status = PaymentStatus::Paid;
        Ok(())
    }

    /// Expires the session, as the gateway does for abandoned checkouts.
    pub async fn expire(&self, session_id: &str) -> Result<(), GatewayError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| GatewayError::SessionNotFound(session_id.to_string()))?;
        session.status = PaymentStatus::Expired;
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CreatedSession, GatewayError> {
        let session_id = format!("cs_sandbox_{}", Uuid::new_v4().simple());
        let redirect_url = format!("https://pay.sandbox.local/session/{}", session_id);

        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            session_id.clone(),
            SandboxSession {
                status: PaymentStatus::Unpaid,
                metadata: request.metadata,
            },
        );

        tracing::debug!(session_id = %session_id, lines = request.line_items.len(), "Sandbox session created");

        Ok(CreatedSession {
            session_id,
            redirect_url,
        })
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionState, GatewayError> {
        let sessions = self.sessions.lock().await;
        let session = sessions
            .get(session_id)
            .ok_or_else(|| GatewayError::SessionNotFound(session_id.to_string()))?;

        Ok(SessionState {
            payment_status: session.status,
            metadata: session.metadata.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateSessionRequest {
        CreateSessionRequest {
            line_items: vec![],
            success_url: "https://shop.local/success".to_string(),
            cancel_url: "https://shop.local/cancel".to_string(),
            metadata: HashMap::from([("userName".to_string(), "alice".to_string())]),
        }
    }

    #[tokio::test]
    async fn test_new_session_starts_unpaid_with_metadata() {
        let gateway = SandboxGateway::new();
        let created = gateway.create_session(request()).await.unwrap();

        let state = gateway.get_session(&created.session_id).await.unwrap();
        assert_eq!(state.payment_status, PaymentStatus::Unpaid);
        assert_eq!(state.metadata.get("userName").unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_mark_paid_transitions_session() {
        let gateway = SandboxGateway::new();
        let created = gateway.create_session(request()).await.unwrap();

        gateway.mark_paid(&created.session_id).await.unwrap();

        let state = gateway.get_session(&created.session_id).await.unwrap();
        assert_eq!(state.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let gateway = SandboxGateway::new();
        assert!(matches!(
            gateway.get_session("cs_missing").await,
            Err(GatewayError::SessionNotFound(_))
        ));
    }
}
