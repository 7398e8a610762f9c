use thiserror::Error;

/// Failures talking to the agent runtime. Every variant is shown to the user
/// in place of the summary; none is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    /// Connection refused, DNS failure or timeout.
    #[error("could not reach the agent runtime at {url}: {reason}")]
    Network { url: String, reason: String },

    /// Body was not JSON or carried no summary text.
    #[error("the agent runtime returned an unexpected response: {0}")]
    Format(String),

    /// Runtime answered with a non-success status.
    #[error("the agent runtime rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl AgentError {
    pub fn from_transport(url: &str, err: &reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed ({})", err)
        } else {
            err.to_string()
        };
        AgentError::Network {
            url: url.to_string(),
            reason,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Network { .. } => "network",
            AgentError::Format(_) => "format",
            AgentError::Rejected { .. } => "rejected",
        }
    }
}
