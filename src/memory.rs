//! Conversation memory strategies built by the agent factory.
//!
//! Each [`MemoryType`] maps to one construction function that deserializes the
//! configuration's `memory_config` map into that strategy's options.

use crate::error::{Error, Result};
use crate::llm::Message;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub type MemoryOptions = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    Token,
    SlidingWindow,
    /// Also the landing spot for unrecognized strings.
    #[default]
    #[serde(other)]
    Unconstrained,
}

impl MemoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unconstrained => "unconstrained",
            Self::Token => "token",
            Self::SlidingWindow => "sliding_window",
        }
    }

    /// Construction function for this strategy.
    pub fn constructor(self) -> fn(&MemoryOptions) -> Result<Box<dyn Memory>> {
        match self {
            Self::Unconstrained => build_unconstrained,
            Self::Token => build_token,
            Self::SlidingWindow => build_sliding_window,
        }
    }

    /// Check that `options` are accepted by this strategy without building it.
    pub fn check_options(self, options: &MemoryOptions) -> Result<()> {
        match self {
            Self::Unconstrained => parse_options::<NoOptions>(self, options).map(|_| ()),
            Self::Token => token_options(options).map(|_| ()),
            Self::SlidingWindow => window_options(options).map(|_| ()),
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Memory: Send + Sync + fmt::Debug {
    fn kind(&self) -> MemoryType;
    fn add(&mut self, message: Message);
    fn messages(&self) -> &[Message];
    fn clear(&mut self);

    fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }
}

/// Rough token estimate: four characters per token, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

#[derive(Debug, Default)]
pub struct UnconstrainedMemory {
    messages: Vec<Message>,
}

impl UnconstrainedMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Memory for UnconstrainedMemory {
    fn kind(&self) -> MemoryType {
        MemoryType::Unconstrained
    }

    fn add(&mut self, message: Message) {
        self.messages.push(message);
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn clear(&mut self) {
        self.messages.clear();
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenOptions {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_max_tokens() -> usize {
    4096
}

/// Drops the oldest messages once the estimated token total exceeds the budget.
/// The newest message is always kept, even when it alone is over budget.
#[derive(Debug)]
pub struct TokenMemory {
    messages: Vec<Message>,
    max_tokens: usize,
    used_tokens: usize,
}

impl TokenMemory {
    pub fn new(max_tokens: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_tokens,
            used_tokens: 0,
        }
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn used_tokens(&self) -> usize {
        self.used_tokens
    }
}

impl Memory for TokenMemory {
    fn kind(&self) -> MemoryType {
        MemoryType::Token
    }

    fn add(&mut self, message: Message) {
        self.used_tokens += estimate_tokens(&message.content);
        self.messages.push(message);
        while self.used_tokens > self.max_tokens && self.messages.len() > 1 {
            let evicted = self.messages.remove(0);
            self.used_tokens -= estimate_tokens(&evicted.content);
        }
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn clear(&mut self) {
        self.messages.clear();
        self.used_tokens = 0;
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlidingWindowOptions {
    #[serde(default = "default_window_size")]
    pub size: usize,
}

fn default_window_size() -> usize {
    20
}

/// Keeps only the newest `size` messages.
#[derive(Debug)]
pub struct SlidingWindowMemory {
    messages: Vec<Message>,
    size: usize,
}

impl SlidingWindowMemory {
    pub fn new(size: usize) -> Self {
        Self {
            messages: Vec::new(),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Memory for SlidingWindowMemory {
    fn kind(&self) -> MemoryType {
        MemoryType::SlidingWindow
    }

    fn add(&mut self, message: Message) {
        if self.messages.len() >= self.size {
            let excess = self.messages.len() + 1 - self.size;
            self.messages.drain(..excess);
        }
        self.messages.push(message);
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn clear(&mut self) {
        self.messages.clear();
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoOptions {}

fn parse_options<T: DeserializeOwned>(kind: MemoryType, options: &MemoryOptions) -> Result<T> {
    let map: Map<String, Value> = options
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    serde_json::from_value(Value::Object(map))
        .map_err(|e| Error::validation(format!("memory_config for {kind} memory: {e}")))
}

fn build_unconstrained(options: &MemoryOptions) -> Result<Box<dyn Memory>> {
    parse_options::<NoOptions>(MemoryType::Unconstrained, options)?;
    Ok(Box::new(UnconstrainedMemory::new()))
}

fn token_options(options: &MemoryOptions) -> Result<TokenOptions> {
    let opts: TokenOptions = parse_options(MemoryType::Token, options)?;
    if opts.max_tokens == 0 {
        return Err(Error::validation("memory_config.max_tokens must be at least 1"));
    }
    Ok(opts)
}

fn window_options(options: &MemoryOptions) -> Result<SlidingWindowOptions> {
    let opts: SlidingWindowOptions = parse_options(MemoryType::SlidingWindow, options)?;
    if opts.size == 0 {
        return Err(Error::validation("memory_config.size must be at least 1"));
    }
    Ok(opts)
}

fn build_token(options: &MemoryOptions) -> Result<Box<dyn Memory>> {
    let opts = token_options(options)?;
    Ok(Box::new(TokenMemory::new(opts.max_tokens)))
}

fn build_sliding_window(options: &MemoryOptions) -> Result<Box<dyn Memory>> {
    let opts = window_options(options)?;
    Ok(Box::new(SlidingWindowMemory::new(opts.size)))
}
