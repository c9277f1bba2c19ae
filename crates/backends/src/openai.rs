//! OpenAI backend — the structured-tool-call variant.
//!
//! Talks to `/v1/chat/completions`. Tool specs are forwarded in the native
//! function-calling form, but only the reply's textual content is returned:
//! the negotiation protocol parses tool calls out of text, so the
//! structured `tool_calls` field is never surfaced.

use async_trait::async_trait;
use palaver_core::error::BackendError;
use palaver_core::tool::ToolSpec;
use palaver_core::turn::Turn;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// OpenAI chat-completions backend.
pub struct OpenAiBackend {
    model: String,
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiBackend {
    /// Create a new OpenAI backend.
    ///
    /// A `None` credential is tolerated: construction succeeds with a
    /// warning and every request returns a credential-missing error for
    /// the engine to fold into the conversation.
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            warn!("OPENAI_API_KEY not provided; requests will degrade to an error reply");
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

    /// Create with a custom base URL (proxies, OpenAI-compatible servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl palaver_core::Backend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn format_tools(&self, specs: &[ToolSpec]) -> Vec<serde_json::Value> {
        specs
            .iter()
            .map(|spec| {
                json!({
                    "type": "function",
                    "function": {
                        "name": spec.name,
                        "description": spec.description,
                        "parameters": spec.parameters,
                    }
                })
            })
            .collect()
    }

    async fn get_response(
        &self,
        turns: &[Turn],
        tools: &[serde_json::Value],
    ) -> Result<String, BackendError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(BackendError::CredentialMissing {
                backend: "openai".into(),
                env_hint: "OPENAI_API_KEY".into(),
            });
        };

        let url = format!("{}/chat/completions", self.base_url);

        // A Turn's serde form is already the chat-completions message shape.
        let mut body = json!({
            "model": self.model,
            "messages": turns,
            "temperature": DEFAULT_TEMPERATURE,
        });

        if !tools.is_empty() {
            body["tools"] = json!(tools);
            body["tool_choice"] = json!("auto");
        }

        debug!(model = %self.model, turns = turns.len(), tools = tools.len(), "sending chat completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable {
                backend: "openai".into(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            warn!(status, body = %message, "OpenAI API error");
            return Err(BackendError::Api {
                backend: "openai".into(),
                status,
                message,
            });
        }

        let api_response: ChatCompletionResponse =
            response.json().await.map_err(|e| BackendError::Malformed {
                backend: "openai".into(),
                reason: e.to_string(),
            })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Malformed {
                backend: "openai".into(),
                reason: "no choices in response".into(),
            })?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

// --- OpenAI API response types ---

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
