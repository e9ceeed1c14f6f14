pub mod agent;
pub mod config;
pub mod env;
pub mod error;
pub mod factory;
pub mod http;
pub mod llm;
pub mod memory;
pub mod presets;
pub mod tools;

pub use agent::{Agent, AgentKind, AgentOptions};
pub use config::AgentConfig;
pub use env::{Environment, MapEnv, ProcessEnv};
pub use error::{EnvironmentError, Error, MissingRequirement, Result};
pub use factory::AgentFactory;
pub use memory::{Memory, MemoryType};
pub use presets::Preset;
pub use tools::{NamedTool, Tool, ToolRegistry};
