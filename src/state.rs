use std::path::Path;
use std::sync::Arc;

use crate::agent::AgentConfig;
use crate::chat::{Renderer, SessionStore};
use crate::config::Config;
use crate::runtime::{AgentBackend, AgentRuntimeClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub agent: Arc<AgentConfig>,
    pub backend: Arc<dyn AgentBackend>,
    pub sessions: Arc<SessionStore>,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    /// Load the agent definition and connect to the runtime named in `config`.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let agent = AgentConfig::load_or_default(
            Path::new(&config.agent.definition_path),
            config.agent.is_configured(),
        )?;
        let backend = Arc::new(AgentRuntimeClient::new(&config.runtime, agent.name.clone())?);
        Self::with_backend(config, agent, backend)
    }

    pub fn with_backend(
        config: Config,
        agent: AgentConfig,
        backend: Arc<dyn AgentBackend>,
    ) -> anyhow::Result<Self> {
        let sessions = Arc::new(SessionStore::new(
            config.ui.history_limit,
            config.ui.session_idle_secs,
        ));
        let renderer = Arc::new(Renderer::new()?);

        Ok(Self {
            config: Arc::new(config),
            agent: Arc::new(agent),
            backend,
            sessions,
            renderer,
        })
    }
}
