//! Opaque tool handles.
//!
//! Configurations name tools by id. The caller registers a handle for each id
//! it can serve, and the factory resolves the configured ids in order when it
//! builds an agent. Tool behavior lives outside this crate.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }
}

impl fmt::Debug for dyn Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool").field("name", &self.name()).finish()
    }
}

/// A tool known only by name and description, for callers that hand the
/// actual implementation to another runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTool {
    name: String,
    description: String,
}

impl NamedTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl Tool for NamedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tool` under `id`, replacing any previous handle.
    pub fn register(&mut self, id: impl Into<String>, tool: Arc<dyn Tool>) -> &mut Self {
        self.tools.insert(id.into(), tool);
        self
    }

    pub fn with(mut self, id: impl Into<String>, tool: Arc<dyn Tool>) -> Self {
        self.register(id, tool);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tools.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve ids in the given order. Fails on the first unregistered id.
    pub fn resolve(&self, ids: &[String]) -> Result<Vec<Arc<dyn Tool>>> {
        ids.iter()
            .map(|id| {
                self.tools
                    .get(id)
                    .cloned()
                    .ok_or_else(|| Error::UnknownTool(id.clone()))
            })
            .collect()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.tools.keys().collect();
        ids.sort();
        f.debug_struct("ToolRegistry").field("ids", &ids).finish()
    }
}
