use agent_forge::env::{ANTHROPIC_API_KEY, CUSTOM_API_KEY, OPENAI_API_KEY};
use agent_forge::presets::{self, DUCKDUCKGO, WIKIPEDIA};
use agent_forge::{
    AgentConfig, AgentFactory, AgentKind, Environment, Error, MapEnv, MemoryType,
    MissingRequirement, NamedTool, ToolRegistry,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts every lookup so tests can assert when the environment is touched.
#[derive(Default)]
struct CountingEnv {
    inner: MapEnv,
    reads: AtomicUsize,
}

impl Environment for CountingEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.var(name)
    }
}

fn search_tools() -> ToolRegistry {
    ToolRegistry::new()
        .with(WIKIPEDIA, Arc::new(NamedTool::new("Wikipedia", "")))
        .with(DUCKDUCKGO, Arc::new(NamedTool::new("DuckDuckGo", "")))
}

#[test]
fn unknown_providers_fall_back_to_openai_key() {
    let factory = AgentFactory::new(MapEnv::new().with(OPENAI_API_KEY, "sk-openai"));
    for provider in ["mistral", "Groq", "OLLAMA", "together.ai"] {
        assert_eq!(factory.resolve_api_key(provider).unwrap(), "sk-openai");
    }
    let factory = AgentFactory::new(MapEnv::new());
    let err = factory.resolve_api_key("mistral").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing API key for provider 'mistral'. Set environment variable: OPENAI_API_KEY"
    );
}

#[test]
fn provider_url_keeps_provider_credential() {
    let config = AgentConfig {
        model_provider: "anthropic".into(),
        provider_url: Some("http://localhost:9000/v1".into()),
        ..AgentConfig::default()
    };

    let only_openai = AgentFactory::new(MapEnv::new().with(OPENAI_API_KEY, "sk-openai"));
    let err = only_openai.create_model_client(&config).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingCredential { ref variable, .. } if variable == ANTHROPIC_API_KEY
    ));

    let with_anthropic = AgentFactory::new(MapEnv::new().with(ANTHROPIC_API_KEY, "sk-ant"));
    let client = with_anthropic.create_model_client(&config).unwrap();
    assert_eq!(client.base_url(), "http://localhost:9000/v1");
}

#[test]
fn custom_provider_with_url_uses_custom_key() {
    let config = AgentConfig {
        model_provider: "custom".into(),
        provider_url: Some("https://llm.internal.example/v1".into()),
        model_name: Some("local-model".into()),
        ..AgentConfig::default()
    };
    let factory = AgentFactory::new(MapEnv::new().with(CUSTOM_API_KEY, "sk-custom"));
    factory.validate_environment(&config).unwrap();
    let client = factory.create_model_client(&config).unwrap();
    assert_eq!(client.model(), "local-model");
}

#[tokio::test]
async fn unknown_agent_type_reads_no_environment() {
    let env = Arc::new(CountingEnv::default());
    let factory = AgentFactory::new(env.clone());
    let err = factory
        .create_agent("Bogus", AgentConfig::default())
        .await
        .unwrap_err();
    match err {
        Error::UnknownAgentType {
            requested,
            available,
        } => {
            assert_eq!(requested, "Bogus");
            assert_eq!(available, vec!["ReAct", "Requirement"]);
        }
        other => panic!("expected UnknownAgentType, got {other:?}"),
    }
    assert_eq!(env.reads.load(Ordering::SeqCst), 0);
}

#[test]
fn every_missing_variable_is_reported() {
    let mut config = AgentConfig {
        model_provider: "openrouter".into(),
        ..AgentConfig::default()
    };
    config.env_vars.insert("SERPAPI_KEY".into(), String::new());
    config.env_vars.insert("WEATHER_API_KEY".into(), String::new());
    config.env_vars.insert("REGION".into(), "eu-west-1".into());

    let factory = AgentFactory::new(MapEnv::new().with("WEATHER_API_KEY", ""));
    let err = factory.validate_environment(&config).unwrap_err();
    let Error::Environment(env_err) = &err else {
        panic!("expected Environment error, got {err:?}");
    };
    assert_eq!(
        env_err.missing,
        vec![
            MissingRequirement::Variable("SERPAPI_KEY".into()),
            MissingRequirement::Variable("WEATHER_API_KEY".into()),
            MissingRequirement::Credential {
                provider: "openrouter".into(),
                variable: "OPENROUTER_API_KEY".into(),
            },
        ]
    );
    let msg = err.to_string();
    assert!(msg.contains("SERPAPI_KEY") && msg.contains("WEATHER_API_KEY"));
}

#[tokio::test]
async fn environment_is_checked_before_tools_are_resolved() {
    // No tools registered: an environment check that ran later would surface
    // as UnknownTool instead.
    let factory = AgentFactory::new(MapEnv::new());
    let err = factory
        .create_agent("ReAct", presets::researcher(&MapEnv::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Environment(_)), "got {err:?}");

    let factory = AgentFactory::new(MapEnv::new().with(OPENAI_API_KEY, "sk"));
    let err = factory
        .create_agent("ReAct", presets::researcher(&MapEnv::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownTool(ref id) if id == WIKIPEDIA));
}

#[tokio::test]
async fn sliding_window_builds_window_memory() {
    let mut config = AgentConfig {
        memory_type: MemoryType::SlidingWindow,
        ..AgentConfig::default()
    };
    config
        .memory_config
        .insert("size".into(), serde_json::json!(6));
    let factory = AgentFactory::new(MapEnv::new().with(OPENAI_API_KEY, "sk"));
    let agent = factory.create_agent("Requirement", config).await.unwrap();
    assert_eq!(agent.kind(), AgentKind::Requirement);
    assert_eq!(agent.memory().kind(), MemoryType::SlidingWindow);
}

#[tokio::test]
async fn researcher_preset_forwards_two_tools_in_order() {
    let env = MapEnv::new().with(OPENAI_API_KEY, "sk-openai");
    let config = presets::researcher(&env);
    let factory = AgentFactory::new(env).with_tools(search_tools());

    let agent = factory.create_agent("ReAct", config).await.unwrap();
    let names: Vec<&str> = agent.tools().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["Wikipedia", "DuckDuckGo"]);
    assert_eq!(agent.options().role.as_deref(), Some("A diligent researcher"));
    assert_eq!(agent.options().max_iterations, Some(15));
    assert_eq!(agent.model().model(), "gpt-3.5-turbo");
    assert_eq!(agent.memory().kind(), MemoryType::Unconstrained);
}

#[tokio::test]
async fn analyst_preset_gets_token_memory() {
    let env = MapEnv::new().with(OPENAI_API_KEY, "sk-openai");
    let factory = AgentFactory::new(env);
    let agent = factory
        .create_default_agent(presets::analyst(factory.environment()))
        .await
        .unwrap();
    assert_eq!(agent.memory().kind(), MemoryType::Token);
    assert!(agent.tools().is_empty());
    assert_eq!(agent.options().max_iterations, None);
}

#[test]
fn config_round_trips_through_toml_file() {
    let config = presets::analyst(&MapEnv::new());
    let dir = std::env::temp_dir().join(format!("agent-forge-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("analyst.toml");
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    let loaded = AgentConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_config_file_is_a_config_error() {
    let err = AgentConfig::load(std::path::Path::new("does/not/exist.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
