//! Turns an [`AgentConfig`] into a wired [`Agent`].
//!
//! Every environment read goes through the factory's [`Environment`], and
//! nothing is constructed until the agent type, the environment and the tool
//! ids have all been checked.

use crate::agent::{Agent, AgentKind, AgentOptions};
use crate::config::{AgentConfig, DEFAULT_MAX_ITERATIONS};
use crate::env::{Environment, OPENAI_CHAT_MODEL, OPENROUTER_CHAT_MODEL};
use crate::error::{EnvironmentError, Error, MissingRequirement, Result};
use crate::llm::{DEFAULT_CHAT_MODEL, ModelClient, ModelRoute, Provider};
use crate::memory::Memory;
use crate::tools::ToolRegistry;
use tracing::{debug, info};

#[derive(Debug)]
pub struct AgentFactory<E> {
    env: E,
    tools: ToolRegistry,
}

impl<E: Environment> AgentFactory<E> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            tools: ToolRegistry::new(),
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Build the memory strategy named by `memory_type`, forwarding
    /// `memory_config` as its options.
    pub fn create_memory(config: &AgentConfig) -> Result<Box<dyn Memory>> {
        let memory = config.memory_type.constructor()(&config.memory_config)?;
        debug!(memory = %config.memory_type, "memory created");
        Ok(memory)
    }

    pub fn create_model_client(&self, config: &AgentConfig) -> Result<ModelClient> {
        let route = ModelRoute::select(&config.model_provider, config.provider_url());
        let api_key = match &route {
            ModelRoute::Endpoint { .. } => self.resolve_api_key(&config.model_provider)?,
            _ => self.require_key(&config.model_provider, route.api_key_env())?,
        };
        let model = self.model_name(config, route.provider());
        info!(
            provider = ?route.provider(),
            base_url = route.base_url(),
            model = %model,
            "model client configured"
        );
        ModelClient::new(&route, api_key, model)
    }

    /// API key for `provider`, looked up case-insensitively. Unknown providers
    /// use the OpenAI key.
    pub fn resolve_api_key(&self, provider: &str) -> Result<String> {
        self.require_key(provider, Provider::parse(provider).api_key_env())
    }

    /// Check `env_vars`, the provider credential and the key of the route the
    /// model client will use, reporting every gap.
    pub fn validate_environment(&self, config: &AgentConfig) -> Result<()> {
        let mut missing: Vec<MissingRequirement> = config
            .env_vars
            .iter()
            .filter(|(name, default)| self.env.non_empty(name).is_none() && default.is_empty())
            .map(|(name, _)| MissingRequirement::Variable(name.clone()))
            .collect();

        let route = ModelRoute::select(&config.model_provider, config.provider_url());
        let provider_key = Provider::parse(&config.model_provider).api_key_env();
        for variable in [provider_key, route.api_key_env()] {
            if self.env.non_empty(variable).is_none()
                && !missing.iter().any(|m| m.variable() == variable)
            {
                missing.push(MissingRequirement::Credential {
                    provider: config.model_provider.clone(),
                    variable: variable.to_string(),
                });
            }
        }

        if missing.is_empty() {
            return Ok(());
        }
        debug!(count = missing.len(), "environment validation failed");
        Err(EnvironmentError { missing }.into())
    }

    /// Build an agent of the named kind. Fails before reading the environment
    /// when `agent_type` is not registered.
    pub async fn create_agent(&self, agent_type: &str, config: AgentConfig) -> Result<Agent> {
        let kind: AgentKind = agent_type.parse()?;
        config.validate()?;
        self.validate_environment(&config)?;
        let tools = self.tools.resolve(&config.tools)?;

        let memory = Self::create_memory(&config)?;
        let model = self.create_model_client(&config)?;

        let options = AgentOptions {
            role: config.role().map(str::to_string),
            instructions: config.instructions().map(str::to_string),
            max_iterations: Some(config.max_iterations)
                .filter(|&n| n != DEFAULT_MAX_ITERATIONS),
        };
        info!(
            kind = %kind,
            tools = tools.len(),
            memory = %config.memory_type,
            "agent created"
        );
        Ok(Agent::new(kind, model, memory, tools, options))
    }

    /// [`AgentFactory::create_agent`] with the `ReAct` kind.
    pub async fn create_default_agent(&self, config: AgentConfig) -> Result<Agent> {
        self.create_agent(AgentKind::ReAct.as_str(), config).await
    }

    fn require_key(&self, provider: &str, variable: &str) -> Result<String> {
        self.env
            .non_empty(variable)
            .ok_or_else(|| Error::missing_credential(provider, variable))
    }

    fn model_name(&self, config: &AgentConfig, provider: Provider) -> String {
        if let Some(name) = config.model_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        let from_openrouter = match provider {
            Provider::OpenRouter => self.env.non_empty(OPENROUTER_CHAT_MODEL),
            _ => None,
        };
        from_openrouter
            .or_else(|| self.env.non_empty(OPENAI_CHAT_MODEL))
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.into())
    }
}
