use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::AgentError;
use super::types::{extract_summary, RunRequest};
use super::{AgentBackend, AgentReply, SessionRef};
use crate::chat::RequestPayload;
use crate::config::RuntimeConfig;

/// HTTP client for the agent runtime's REST API.
#[derive(Debug, Clone)]
pub struct AgentRuntimeClient {
    client: Client,
    base_url: String,
    app_name: String,
}

impl AgentRuntimeClient {
    pub fn new(config: &RuntimeConfig, app_name: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_name: app_name.into(),
        })
    }

    /// POST a JSON body and return the raw response text on success.
    async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<String, AgentError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AgentError::from_transport(url, &e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::from_transport(url, &e))?;

        if !status.is_success() {
            warn!("Agent runtime returned {} for {}", status, url);
            return Err(AgentError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl AgentBackend for AgentRuntimeClient {
    async fn create_session(&self, session: &SessionRef) -> Result<(), AgentError> {
        let url = format!(
            "{}/apps/{}/users/{}/sessions/{}",
            self.base_url, self.app_name, session.user_id, session.session_id
        );
        debug!("Creating runtime session {}", session.session_id);
        self.post_json(&url, &serde_json::json!({})).await?;
        Ok(())
    }

    async fn send_request(
        &self,
        session: &SessionRef,
        payload: &RequestPayload,
    ) -> Result<AgentReply, AgentError> {
        let url = format!("{}/run", self.base_url);
        let request = RunRequest::new(
            &self.app_name,
            &session.user_id,
            &session.session_id,
            payload,
        );

        debug!(
            "Sending turn to {} (session={}, image={})",
            url,
            session.session_id,
            payload.inline_data.is_some()
        );

        let text = self.post_json(&url, &request).await?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| AgentError::Format(format!("body is not JSON ({})", e)))?;

        let summary = extract_summary(&body)?;
        Ok(AgentReply { summary })
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/list-apps", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Agent runtime health check failed: {}", e);
                false
            }
        }
    }
}
