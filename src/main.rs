use agent_forge::presets::{DUCKDUCKGO, WIKIPEDIA};
use agent_forge::{AgentConfig, AgentFactory, Error, NamedTool, Preset, ProcessEnv, ToolRegistry};
use anyhow::{Result, bail};
use clap::{Args, Parser};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "agent-forge",
    about = "Build LLM agents from declarative configuration and presets"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Where the agent configuration comes from.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct Source {
    /// Built-in preset: researcher, analyst, recruiter
    #[arg(short, long)]
    preset: Option<String>,

    /// Path to a TOML agent configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// List the built-in presets
    Presets,

    /// Print the resolved configuration as TOML
    Show {
        #[command(flatten)]
        source: Source,
    },

    /// Check that the environment satisfies the configuration
    Check {
        #[command(flatten)]
        source: Source,
    },

    /// Build an agent and send it a single prompt
    Ask {
        #[command(flatten)]
        source: Source,

        /// Agent type: ReAct or Requirement
        #[arg(short = 't', long, default_value = "ReAct")]
        agent_type: String,

        /// Prompt to send
        prompt: String,
    },
}

fn load_config(source: &Source, env: &ProcessEnv) -> Result<AgentConfig> {
    match (&source.preset, &source.config) {
        (Some(name), _) => Ok(name.parse::<Preset>()?.build(env)),
        (None, Some(path)) => Ok(AgentConfig::load(path)?),
        (None, None) => bail!("either --preset or --config is required"),
    }
}

/// Handles for the tool ids the presets reference. Execution of these tools
/// belongs to the runtime that consumes the agent.
fn default_tools() -> ToolRegistry {
    ToolRegistry::new()
        .with(
            WIKIPEDIA,
            Arc::new(NamedTool::new(WIKIPEDIA, "Look up encyclopedia articles")),
        )
        .with(
            DUCKDUCKGO,
            Arc::new(NamedTool::new(DUCKDUCKGO, "Search the web")),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agent_forge=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let env = ProcessEnv::with_dotenv();
    let cli = Cli::parse();

    match cli.command {
        Command::Presets => {
            for preset in Preset::ALL {
                println!("{preset}");
            }
            Ok(())
        }
        Command::Show { source } => {
            let config = load_config(&source, &env)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        Command::Check { source } => {
            let config = load_config(&source, &env)?;
            config.validate()?;
            let factory = AgentFactory::new(env);
            match factory.validate_environment(&config) {
                Ok(()) => {
                    println!("environment OK");
                    Ok(())
                }
                Err(Error::Environment(e)) => {
                    for missing in &e.missing {
                        println!("missing: {missing}");
                    }
                    bail!("{} requirement(s) missing", e.missing.len())
                }
                Err(e) => Err(e.into()),
            }
        }
        Command::Ask {
            source,
            agent_type,
            prompt,
        } => {
            let config = load_config(&source, &env)?;
            let factory = AgentFactory::new(env).with_tools(default_tools());
            let mut agent = factory.create_agent(&agent_type, config).await?;
            let reply = agent.run(&prompt).await?;
            println!("{reply}");
            Ok(())
        }
    }
}
