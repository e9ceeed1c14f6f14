use crate::env::{ANTHROPIC_API_KEY, CUSTOM_API_KEY, OPENAI_API_KEY, OPENROUTER_API_KEY};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Provider key from `model_provider`, matched case-insensitively.
/// Anything unrecognized is treated as OpenAI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    OpenAi,
    OpenRouter,
    Anthropic,
    /// Any OpenAI-compatible endpoint reached through `provider_url`.
    Custom,
}

impl Provider {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Self::OpenRouter,
            "anthropic" => Self::Anthropic,
            "custom" => Self::Custom,
            _ => Self::OpenAi,
        }
    }

    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::OpenAi => OPENAI_API_KEY,
            Self::OpenRouter => OPENROUTER_API_KEY,
            Self::Anthropic => ANTHROPIC_API_KEY,
            Self::Custom => CUSTOM_API_KEY,
        }
    }

    fn wire_format(self) -> WireFormat {
        match self {
            Self::Anthropic => WireFormat::Anthropic,
            Self::OpenAi | Self::OpenRouter | Self::Custom => WireFormat::OpenAi,
        }
    }
}

/// Where a model client connects and which variable holds its key.
/// Built from a configuration by the factory; first matching route wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRoute {
    /// `provider_url` is set; the key still follows the provider.
    Endpoint { url: String, provider: Provider },
    OpenRouter,
    Anthropic,
    OpenAi,
}

impl ModelRoute {
    pub fn select(provider_name: &str, provider_url: Option<&str>) -> Self {
        let provider = Provider::parse(provider_name);
        if let Some(url) = provider_url.filter(|u| !u.trim().is_empty()) {
            return Self::Endpoint {
                url: url.trim_end_matches('/').to_string(),
                provider,
            };
        }
        match provider {
            Provider::OpenRouter => Self::OpenRouter,
            Provider::Anthropic => Self::Anthropic,
            Provider::OpenAi | Provider::Custom => Self::OpenAi,
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Self::Endpoint { provider, .. } => *provider,
            Self::OpenRouter => Provider::OpenRouter,
            Self::Anthropic => Provider::Anthropic,
            Self::OpenAi => Provider::OpenAi,
        }
    }

    pub fn base_url(&self) -> &str {
        match self {
            Self::Endpoint { url, .. } => url,
            Self::OpenRouter => OPENROUTER_BASE_URL,
            Self::Anthropic => ANTHROPIC_BASE_URL,
            Self::OpenAi => OPENAI_BASE_URL,
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        self.provider().api_key_env()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireFormat {
    Anthropic,
    OpenAi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

pub struct ModelClient {
    provider: Provider,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
    http: HttpClient,
}

impl fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

// -- Anthropic format --

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    text: Option<String>,
}

// -- OpenAI-compatible format --

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

impl ModelClient {
    pub fn new(route: &ModelRoute, api_key: String, model: String) -> Result<Self> {
        let http = HttpClient::new(concat!("agent-forge/", env!("CARGO_PKG_VERSION")))?;
        Ok(Self {
            provider: route.provider(),
            api_key,
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: route.base_url().to_string(),
            http,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send the conversation with a system prompt and return the reply text.
    pub async fn complete(&self, system: &str, messages: &[Message]) -> Result<String> {
        debug!(provider = ?self.provider, model = %self.model, turns = messages.len(), "sending LLM request");
        match self.provider.wire_format() {
            WireFormat::Anthropic => self.complete_anthropic(system, messages).await,
            WireFormat::OpenAi => self.complete_openai(system, messages).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, messages: &[Message]) -> Result<String> {
        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: to_wire(messages),
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| Error::parse(format!("serialize request: {e}")))?;

        let url = format!("{}/messages", self.base_url);
        let response_text = self
            .http
            .post_json_raw(
                &url,
                &body,
                &[
                    ("x-api-key", &self.api_key),
                    ("anthropic-version", "2023-06-01"),
                ],
            )
            .await
            .inspect_err(|e| warn!("Anthropic API error: {e}"))?;

        let resp: AnthropicResponse = serde_json::from_str(&response_text)
            .map_err(|e| Error::parse(format!("parse Anthropic response: {e}")))?;

        Ok(resp
            .content
            .into_iter()
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn complete_openai(&self, system: &str, messages: &[Message]) -> Result<String> {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        if !system.is_empty() {
            wire.push(Msg {
                role: "system",
                content: system,
            });
        }
        wire.extend(to_wire(messages));
        let request = OpenAiRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: wire,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| Error::parse(format!("serialize request: {e}")))?;

        let url = format!("{}/chat/completions", self.base_url);
        let response_text = self
            .http
            .post_json_raw(
                &url,
                &body,
                &[("Authorization", &format!("Bearer {}", self.api_key))],
            )
            .await
            .inspect_err(|e| warn!("LLM API error: {e}"))?;

        parse_openai_reply(&response_text)
    }
}

fn to_wire(messages: &[Message]) -> Vec<Msg<'_>> {
    messages
        .iter()
        .map(|m| Msg {
            role: m.role.as_str(),
            content: &m.content,
        })
        .collect()
}

fn parse_openai_reply(text: &str) -> Result<String> {
    let resp: OpenAiResponse = serde_json::from_str(text)
        .map_err(|e| Error::parse(format!("parse LLM response: {e}")))?;
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| Error::parse("empty response from LLM"))
}
