use super::{AgentKind, AgentOptions};
use crate::tools::Tool;
use std::fmt::Write;
use std::sync::Arc;

const REACT_PREAMBLE: &str = "Work step by step. Think about what is needed, use a tool when it \
                              helps, observe the result, and answer once you are confident.";

const REQUIREMENT_PREAMBLE: &str = "Before answering, list the requirements the answer must meet. \
                                    Then produce an answer that satisfies every one of them.";

pub(super) fn system_prompt(
    kind: AgentKind,
    options: &AgentOptions,
    tools: &[Arc<dyn Tool>],
) -> String {
    let mut prompt = String::new();
    if let Some(role) = &options.role {
        let _ = writeln!(prompt, "You are {role}.");
    }
    prompt.push_str(match kind {
        AgentKind::ReAct => REACT_PREAMBLE,
        AgentKind::Requirement => REQUIREMENT_PREAMBLE,
    });
    prompt.push('\n');
    if let Some(max) = options.max_iterations {
        let _ = writeln!(prompt, "Use at most {max} reasoning steps.");
    }
    if !tools.is_empty() {
        prompt.push_str("\nAvailable tools:\n");
        for tool in tools {
            match tool.description() {
                "" => {
                    let _ = writeln!(prompt, "- {}", tool.name());
                }
                desc => {
                    let _ = writeln!(prompt, "- {}: {desc}", tool.name());
                }
            }
        }
    }
    if let Some(instructions) = &options.instructions {
        let _ = write!(prompt, "\n{instructions}\n");
    }
    prompt
}
