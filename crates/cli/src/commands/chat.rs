//! `palaver chat` — interactive or single-message chat mode.

use std::io::Write;
use std::path::Path;

use palaver_agent::Agent;
use palaver_backends::backend_for;
use palaver_config::AgentConfig;
use palaver_core::{BackendConfig, BackendKind};
use palaver_tools::ToolRegistry;
use tracing::debug;

pub async fn run(
    message: Option<String>,
    config_path: &Path,
    tools_dir: &Path,
    backend_name: &str,
    model: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Missing or malformed agent config aborts here — the one fatal path.
    let config = AgentConfig::load(config_path)
        .map_err(|e| format!("{e}\nRun 'palaver init' to scaffold a starter configuration."))?;

    let kind: BackendKind = backend_name.parse()?;

    // Credentials are read from the environment here, once, and handed to
    // the adapter as an explicit value. A missing key does not abort: the
    // session runs and every reply explains what is missing.
    let backend_config = BackendConfig {
        kind,
        model: model.unwrap_or_else(|| default_model(kind)),
        api_key: credential_for(kind),
    };
    debug!(backend = %kind, model = %backend_config.model, "configured backend");

    let specs = palaver_config::load_descriptors(tools_dir, &config.config.tools);
    let registry = ToolRegistry::from_specs(specs.into_values());

    let mut agent = Agent::new(config, registry, backend_for(&backend_config));

    if let Some(message) = message {
        let response = agent.process_query(&message).await;
        println!("{response}");
        return Ok(());
    }

    println!("Agent {} initialized. Type 'exit' to quit.", agent.name());
    println!("{}", "=".repeat(50));

    let stdin = std::io::stdin();
    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "exit" | "quit" | "bye") {
            println!("Goodbye!");
            break;
        }

        let response = agent.process_query(query).await;
        println!("\n{}: {response}", agent.name());
    }

    Ok(())
}

fn credential_for(kind: BackendKind) -> Option<String> {
    match kind {
        BackendKind::OpenAi => std::env::var("OPENAI_API_KEY").ok(),
        BackendKind::Anthropic => std::env::var("ANTHROPIC_API_KEY").ok(),
    }
}

fn default_model(kind: BackendKind) -> String {
    match kind {
        BackendKind::OpenAi => "gpt-4o".into(),
        BackendKind::Anthropic => "claude-sonnet-4-20250514".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_models_per_backend() {
        assert_eq!(default_model(BackendKind::OpenAi), "gpt-4o");
        assert!(default_model(BackendKind::Anthropic).starts_with("claude"));
    }
}
