use crate::error::{Error, Result};
use crate::memory::{MemoryOptions, MemoryType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Declarative shape of an agent. Serializable end to end: tools and input
/// schemas are referenced by id and resolved by the factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Unset means the factory picks a model from the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub model_provider: String,
    /// Overrides the provider's endpoint. Credentials still follow `model_provider`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub instructions: String,

    /// Tool ids, in the order the agent should see them.
    pub tools: Vec<String>,

    pub memory_type: MemoryType,
    pub memory_config: MemoryOptions,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,

    /// Required variable name to fallback value. An empty fallback means the
    /// environment must provide it.
    pub env_vars: BTreeMap<String, String>,
    pub max_iterations: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model_name: None,
            model_provider: DEFAULT_PROVIDER.into(),
            provider_url: None,
            role: None,
            instructions: String::new(),
            tools: Vec::new(),
            memory_type: MemoryType::default(),
            memory_config: MemoryOptions::new(),
            input_schema: None,
            prompt_template: None,
            env_vars: BTreeMap::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl AgentConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::validation(format!("Failed to parse agent config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize agent config: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::validation("max_iterations must be a positive integer"));
        }
        if self.model_provider.trim().is_empty() {
            return Err(Error::validation("model_provider must not be empty"));
        }
        if let Some(url) = self.provider_url.as_deref().filter(|u| !u.trim().is_empty()) {
            let parsed = reqwest::Url::parse(url)
                .map_err(|e| Error::validation(format!("provider_url {url:?}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::validation(format!(
                    "provider_url {url:?} must use http or https"
                )));
            }
        }
        if self.tools.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::validation("tool ids must not be empty"));
        }
        if self.env_vars.keys().any(|k| k.trim().is_empty()) {
            return Err(Error::validation("env_vars names must not be empty"));
        }
        self.memory_type.check_options(&self.memory_config)
    }

    /// The role, if set and non-blank.
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref().filter(|r| !r.trim().is_empty())
    }

    /// The instructions, if non-blank.
    pub fn instructions(&self) -> Option<&str> {
        Some(self.instructions.as_str()).filter(|i| !i.trim().is_empty())
    }

    pub fn provider_url(&self) -> Option<&str> {
        self.provider_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = AgentConfig::from_toml_str("").unwrap();
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.model_provider, "openai");
        assert_eq!(config.memory_type, MemoryType::Unconstrained);
        assert_eq!(config.max_iterations, 10);
        assert!(config.model_name.is_none());
    }

    #[test]
    fn full_config_parses() {
        let toml = r#"
model_name = "anthropic/claude-3.5-sonnet"
model_provider = "openrouter"
provider_url = "https://openrouter.ai/api/v1"
role = "A careful analyst"
instructions = "Explain every step."
tools = ["wikipedia", "duckduckgo"]
memory_type = "sliding_window"
input_schema = "ResearchQuery"
max_iterations = 5

[memory_config]
size = 8

[env_vars]
SERPAPI_KEY = ""
REGION = "eu"
"#;
        let config = AgentConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.model_provider, "openrouter");
        assert_eq!(config.tools, vec!["wikipedia", "duckduckgo"]);
        assert_eq!(config.memory_type, MemoryType::SlidingWindow);
        assert_eq!(config.memory_config.get("size"), Some(&json!(8)));
        assert_eq!(config.env_vars.len(), 2);
        assert_eq!(config.input_schema.as_deref(), Some("ResearchQuery"));
        assert_eq!(config.max_iterations, 5);
    }

    #[test]
    fn unknown_memory_type_parses_as_unconstrained() {
        let config = AgentConfig::from_toml_str(r#"memory_type = "vector""#).unwrap();
        assert_eq!(config.memory_type, MemoryType::Unconstrained);
    }

    #[test]
    fn zero_or_negative_iterations_are_rejected() {
        let err = AgentConfig::from_toml_str("max_iterations = 0").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let err = AgentConfig::from_toml_str("max_iterations = -3").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let err = AgentConfig::from_toml_str(r#"max_iterations = "ten""#).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn provider_url_must_be_http() {
        let config = AgentConfig {
            provider_url: Some("ftp://models.example".into()),
            ..AgentConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
        let config = AgentConfig {
            provider_url: Some("not a url".into()),
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());
        let config = AgentConfig {
            provider_url: Some(String::new()),
            ..AgentConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.provider_url(), None);
    }

    #[test]
    fn memory_options_must_fit_memory_type() {
        let toml = r#"
memory_type = "token"
[memory_config]
window = 3
"#;
        assert!(matches!(
            AgentConfig::from_toml_str(toml),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn huge_window_size_validates_without_allocating() {
        let toml = r#"
memory_type = "sliding_window"
[memory_config]
size = 1000000000000000
"#;
        let config = AgentConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.memory_type, MemoryType::SlidingWindow);
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut config = AgentConfig::default();
        config.tools.push(" ".into());
        assert!(config.validate().is_err());

        let mut config = AgentConfig::default();
        config.env_vars.insert(String::new(), "x".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_json_and_toml() {
        let mut config = AgentConfig {
            model_name: Some("gpt-4".into()),
            model_provider: "anthropic".into(),
            provider_url: Some("http://localhost:8080/v1".into()),
            role: Some("A analytical thinker".into()),
            instructions: "Analyze data.".into(),
            tools: vec!["wikipedia".into()],
            memory_type: MemoryType::Token,
            input_schema: Some("Dataset".into()),
            prompt_template: Some("{{input}}".into()),
            max_iterations: 3,
            ..AgentConfig::default()
        };
        config.memory_config.insert("max_tokens".into(), json!(4000));
        config.env_vars.insert("OPENAI_API_KEY".into(), String::new());

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<AgentConfig>(&json).unwrap(), config);

        let toml = config.to_toml_string().unwrap();
        assert_eq!(AgentConfig::from_toml_str(&toml).unwrap(), config);
    }

    #[test]
    fn blank_role_and_instructions_read_as_absent() {
        let config = AgentConfig {
            role: Some("  ".into()),
            instructions: "\n".into(),
            ..AgentConfig::default()
        };
        assert_eq!(config.role(), None);
        assert_eq!(config.instructions(), None);
    }
}
