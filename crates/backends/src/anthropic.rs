//! Anthropic backend — the prompt-only variant.
//!
//! Talks to the Messages API (`/v1/messages`, `x-api-key` header,
//! `anthropic-version` header). This adapter does not use the API's native
//! tool-calling: `format_tools` returns nothing, and the tool roster
//! reaches the model through the system prompt instead.
//!
//! Role mapping quirk: the Messages API accepts exactly one top-level
//! `system` field, so the first system turn becomes that field and any
//! later system turn (the engine's `Tool result: …` injection) is carried
//! as an assistant turn prefixed `"System message: "`.

use async_trait::async_trait;
use palaver_core::error::BackendError;
use palaver_core::tool::ToolSpec;
use palaver_core::turn::{Role, Turn};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Anthropic Messages API backend.
pub struct AnthropicBackend {
    model: String,
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl AnthropicBackend {
    /// Create a new Anthropic backend. A `None` credential degrades
    /// requests instead of failing construction.
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            warn!("ANTHROPIC_API_KEY not provided; requests will degrade to an error reply");
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("failed to create HTTP client");

        Self {
            model: model.into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key,
            client,
        }
    }

    /// Create with a custom base URL (e.g., for proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Split a turn list into the top-level system field and the wire
    /// message list, applying the one-system-message workaround.
    fn to_api_parts(turns: &[Turn]) -> (Option<String>, Vec<WireMessage>) {
        let mut system: Option<String> = None;
        let mut messages = Vec::with_capacity(turns.len());

        for turn in turns {
            match turn.role {
                Role::System => {
                    if system.is_none() && messages.is_empty() {
                        system = Some(turn.content.clone());
                    } else {
                        messages.push(WireMessage {
                            role: "assistant",
                            content: format!("System message: {}", turn.content),
                        });
                    }
                }
                Role::User => messages.push(WireMessage {
                    role: "user",
                    content: turn.content.clone(),
                }),
                Role::Assistant => messages.push(WireMessage {
                    role: "assistant",
                    content: turn.content.clone(),
                }),
            }
        }

        (system, messages)
    }
}

#[async_trait]
impl palaver_core::Backend for AnthropicBackend {
    fn name(&self) -> &str {
        "anthropic"
    }

    /// No native tool list — tool descriptions live in the system prompt.
    fn format_tools(&self, _specs: &[ToolSpec]) -> Vec<serde_json::Value> {
        Vec::new()
    }

    async fn get_response(
        &self,
        turns: &[Turn],
        _tools: &[serde_json::Value],
    ) -> Result<String, BackendError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(BackendError::CredentialMissing {
                backend: "anthropic".into(),
                env_hint: "ANTHROPIC_API_KEY".into(),
            });
        };

        let url = format!("{}/v1/messages", self.base_url);
        let (system, messages) = Self::to_api_parts(turns);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": DEFAULT_MAX_TOKENS,
            "temperature": DEFAULT_TEMPERATURE,
        });

        if let Some(ref system) = system {
            body["system"] = serde_json::json!(system);
        }

        debug!(model = %self.model, turns = turns.len(), "sending messages request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable {
                backend: "anthropic".into(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            warn!(status, body = %message, "Anthropic API error");
            return Err(BackendError::Api {
                backend: "anthropic".into(),
                status,
                message,
            });
        }

        let api_response: MessagesResponse =
            response.json().await.map_err(|e| BackendError::Malformed {
                backend: "anthropic".into(),
                reason: e.to_string(),
            })?;

        let text = api_response
            .content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }
}

// --- Anthropic API types ---

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}
