//! `palaver init` — scaffold a starter configuration.
//!
//! Writes `agent.json` plus one descriptor file per built-in tool, the
//! shape `palaver chat` expects to find in its working directory.

use std::fs;
use std::path::Path;

use palaver_config::{AgentConfig, AgentSettings};

pub fn run(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let tools_dir = dir.join("tools");
    fs::create_dir_all(&tools_dir)?;

    let mut tool_names = Vec::new();
    for spec in palaver_tools::builtin_specs() {
        let path = tools_dir.join(format!("{}.json", spec.name));
        fs::write(&path, serde_json::to_string_pretty(&spec)?)?;
        println!("Wrote tool descriptor: {}", path.display());
        tool_names.push(spec.name);
    }

    let config = AgentConfig {
        agent_name: "MathAssistant".into(),
        config: AgentSettings {
            backstory: "I am a helpful assistant with math skills.".into(),
            task: "help users solve mathematical problems using my calculator tool when needed"
                .into(),
            tools: tool_names,
            memory: true,
            prompt_template: None,
            think: None,
        },
    };

    let config_path = dir.join("agent.json");
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("Wrote agent configuration: {}", config_path.display());

    Ok(())
}
