pub mod client;
pub mod error;
pub mod types;

pub use client::AgentRuntimeClient;
pub use error::AgentError;
pub use types::*;

use async_trait::async_trait;

use crate::chat::RequestPayload;

/// Identifies a conversation inside the agent runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRef {
    pub user_id: String,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub summary: String,
}

/// The hosted agent as seen from the UI server.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Register a session with the runtime before sending turns on it.
    async fn create_session(&self, session: &SessionRef) -> Result<(), AgentError>;

    /// Send one turn and return the summary. Never retried.
    async fn send_request(
        &self,
        session: &SessionRef,
        payload: &RequestPayload,
    ) -> Result<AgentReply, AgentError>;

    async fn health_check(&self) -> bool;
}
