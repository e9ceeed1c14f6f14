//! Ready-made configurations for common agent archetypes.

use crate::config::AgentConfig;
use crate::env::{Environment, OPENAI_API_KEY, OPENAI_CHAT_MODEL};
use crate::error::Error;
use crate::memory::MemoryType;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tool id the researcher preset uses for encyclopedia lookups.
pub const WIKIPEDIA: &str = "wikipedia";
/// Tool id the researcher preset uses for web search.
pub const DUCKDUCKGO: &str = "duckduckgo";

fn chat_model(env: &impl Environment, fallback: &str) -> Option<String> {
    Some(env.non_empty(OPENAI_CHAT_MODEL).unwrap_or_else(|| fallback.into()))
}

fn requires_openai_key() -> BTreeMap<String, String> {
    BTreeMap::from([(OPENAI_API_KEY.to_string(), String::new())])
}

pub fn researcher(env: &impl Environment) -> AgentConfig {
    AgentConfig {
        model_name: chat_model(env, "gpt-3.5-turbo"),
        tools: vec![WIKIPEDIA.into(), DUCKDUCKGO.into()],
        instructions: "Find accurate information and provide factual data back.".into(),
        role: Some("A diligent researcher".into()),
        env_vars: requires_openai_key(),
        max_iterations: 15,
        ..AgentConfig::default()
    }
}

pub fn analyst(env: &impl Environment) -> AgentConfig {
    let mut config = AgentConfig {
        model_name: chat_model(env, "gpt-4"),
        instructions: "Analyze data and provide insights with clear reasoning.".into(),
        role: Some("A analytical thinker".into()),
        memory_type: MemoryType::Token,
        ..AgentConfig::default()
    };
    config
        .memory_config
        .insert("max_tokens".into(), json!(4000));
    config
}

pub fn recruiter(env: &impl Environment) -> AgentConfig {
    AgentConfig {
        model_name: chat_model(env, "gpt-3.5-turbo"),
        instructions: "Help identify requirements and qualifications for roles.".into(),
        role: Some("An experienced recruiter".into()),
        env_vars: requires_openai_key(),
        ..AgentConfig::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Researcher,
    Analyst,
    Recruiter,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Self::Researcher, Self::Analyst, Self::Recruiter];

    pub fn name(self) -> &'static str {
        match self {
            Self::Researcher => "researcher",
            Self::Analyst => "analyst",
            Self::Recruiter => "recruiter",
        }
    }

    pub fn build(self, env: &impl Environment) -> AgentConfig {
        match self {
            Self::Researcher => researcher(env),
            Self::Analyst => analyst(env),
            Self::Recruiter => recruiter(env),
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|p| p.name()).collect();
                Error::config(format!(
                    "unknown preset '{s}'. Available presets: {}",
                    names.join(", ")
                ))
            })
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
