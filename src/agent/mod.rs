//! Agent kinds and the agent instance the factory hands back.

mod prompt;

use crate::error::{Error, Result};
use crate::llm::{Message, ModelClient};
use crate::memory::Memory;
use crate::tools::Tool;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    /// Interleaves reasoning with tool calls.
    ReAct,
    /// Plans against explicit requirements before acting.
    Requirement,
}

const REGISTRY: &[(&str, AgentKind)] = &[
    ("ReAct", AgentKind::ReAct),
    ("Requirement", AgentKind::Requirement),
];

impl AgentKind {
    pub fn names() -> Vec<&'static str> {
        REGISTRY.iter().map(|(name, _)| *name).collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReAct => "ReAct",
            Self::Requirement => "Requirement",
        }
    }
}

impl FromStr for AgentKind {
    type Err = Error;

    /// Names are matched exactly.
    fn from_str(s: &str) -> Result<Self> {
        REGISTRY
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| Error::UnknownAgentType {
                requested: s.to_string(),
                available: Self::names(),
            })
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional constructor arguments. `None` leaves the agent's own default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentOptions {
    pub role: Option<String>,
    pub instructions: Option<String>,
    pub max_iterations: Option<u32>,
}

#[derive(Debug)]
pub struct Agent {
    kind: AgentKind,
    model: ModelClient,
    memory: Box<dyn Memory>,
    tools: Vec<Arc<dyn Tool>>,
    options: AgentOptions,
}

impl Agent {
    pub fn new(
        kind: AgentKind,
        model: ModelClient,
        memory: Box<dyn Memory>,
        tools: Vec<Arc<dyn Tool>>,
        options: AgentOptions,
    ) -> Self {
        Self {
            kind,
            model,
            memory,
            tools,
            options,
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn model(&self) -> &ModelClient {
        &self.model
    }

    pub fn memory(&self) -> &dyn Memory {
        self.memory.as_ref()
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn system_prompt(&self) -> String {
        prompt::system_prompt(self.kind, &self.options, &self.tools)
    }

    /// One model turn: record the input, send the remembered conversation,
    /// record and return the reply. Memory is left untouched on failure.
    pub async fn run(&mut self, input: &str) -> Result<String> {
        let mut transcript = self.memory.messages().to_vec();
        transcript.push(Message::user(input));

        let reply = self.model.complete(&self.system_prompt(), &transcript).await?;
        info!(kind = %self.kind, model = %self.model.model(), chars = reply.len(), "agent turn complete");

        self.memory.add(Message::user(input));
        self.memory.add(Message::assistant(reply.clone()));
        Ok(reply)
    }
}
