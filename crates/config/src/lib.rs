//! Configuration loading for Palaver agents.
//!
//! Two JSON surfaces, both consumed (never produced) by the core:
//!
//! - the agent configuration file — persona fields, tool roster, memory
//!   flag, optional prompt template;
//! - per-tool descriptor files — one `<tools_dir>/<name>.json` per tool,
//!   deserialized straight into `palaver_core::ToolSpec`.
//!
//! A missing or malformed *agent* config is fatal. A missing or malformed
//! *tool descriptor* is only a warning: the tool is left out of the
//! registry and the session runs without it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use palaver_core::ToolSpec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The agent configuration file: `{"agent_name": ..., "config": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Display name, also substituted into prompt templates
    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// The nested settings object
    #[serde(default)]
    pub config: AgentSettings,
}

fn default_agent_name() -> String {
    "Assistant".into()
}

/// The `config` object inside an agent configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Persona sentence woven into the system prompt
    #[serde(default)]
    pub backstory: String,

    /// What the agent is for ("help users solve mathematical problems…")
    #[serde(default)]
    pub task: String,

    /// Names of tools to load from the descriptor directory
    #[serde(default)]
    pub tools: Vec<String>,

    /// Whether short-term conversation memory accumulates
    #[serde(default)]
    pub memory: bool,

    /// Optional custom system-prompt template with `{agent_name}`,
    /// `{backstory}`, and `{task}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,

    /// Optional "thinking process" hint appended to the default prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub think: Option<String>,
}

impl AgentConfig {
    /// Load the agent configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!(
            agent = %config.agent_name,
            tools = config.config.tools.len(),
            memory = config.config.memory,
            "loaded agent configuration"
        );

        Ok(config)
    }
}

/// Load tool descriptors for the requested names from `<tools_dir>/<name>.json`.
///
/// Missing or unreadable descriptors are logged and skipped — the agent
/// still constructs, just without that tool.
pub fn load_descriptors(tools_dir: &Path, names: &[String]) -> BTreeMap<String, ToolSpec> {
    let mut specs = BTreeMap::new();

    for name in names {
        let path = tools_dir.join(format!("{name}.json"));

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => {
                warn!(tool = %name, path = %path.display(), "tool descriptor not found, skipping");
                continue;
            }
        };

        match serde_json::from_str::<ToolSpec>(&content) {
            Ok(spec) => {
                debug!(tool = %name, "loaded tool descriptor");
                specs.insert(name.clone(), spec);
            }
            Err(e) => {
                warn!(tool = %name, path = %path.display(), error = %e, "invalid tool descriptor, skipping");
            }
        }
    }

    specs
}

/// Configuration errors. Both variants are fatal at agent construction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("invalid config file at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}
