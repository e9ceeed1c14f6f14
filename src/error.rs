use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Unknown agent type: {requested}. Available types: {}", available.join(", "))]
    UnknownAgentType {
        requested: String,
        available: Vec<&'static str>,
    },

    #[error("Missing API key for provider '{provider}'. Set environment variable: {variable}")]
    MissingCredential { provider: String, variable: String },

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("Unknown tool: {0}. Register it with the factory's tool registry")]
    UnknownTool(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({platform}): {message}")]
    Api {
        platform: String,
        message: String,
        status_code: Option<u16>,
    },

    #[error("Rate limited by {platform}")]
    RateLimit {
        platform: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_credential(provider: impl Into<String>, variable: impl Into<String>) -> Self {
        Self::MissingCredential {
            provider: provider.into(),
            variable: variable.into(),
        }
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn api_with_status(
        platform: impl Into<String>,
        message: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self::Api {
            platform: platform.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// One unmet environment requirement found while validating a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingRequirement {
    /// A name from `env_vars` with no environment value and an empty fallback.
    Variable(String),
    /// The provider's API key variable is absent or empty.
    Credential { provider: String, variable: String },
}

impl MissingRequirement {
    /// The environment variable that has to be set to satisfy this requirement.
    pub fn variable(&self) -> &str {
        match self {
            Self::Variable(name) => name,
            Self::Credential { variable, .. } => variable,
        }
    }
}

impl fmt::Display for MissingRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => write!(f, "{name}"),
            Self::Credential { provider, variable } => {
                write!(f, "{variable} (API key for provider '{provider}')")
            }
        }
    }
}

/// Every missing requirement of a configuration, reported at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentError {
    pub missing: Vec<MissingRequirement>,
}

impl EnvironmentError {
    pub fn variables(&self) -> Vec<&str> {
        self.missing.iter().map(MissingRequirement::variable).collect()
    }
}

impl fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = self
            .missing
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Missing required environment variables: {list}")
    }
}

impl std::error::Error for EnvironmentError {}

pub type Result<T> = std::result::Result<T, Error>;
