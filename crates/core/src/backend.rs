//! Backend trait — the abstraction over model services.
//!
//! A backend knows how to translate a turn list into its provider's wire
//! conventions, send it, and hand back the reply text. Tool-call extraction
//! is not per-backend: whatever the provider's native tool-calling story,
//! the negotiation protocol only ever inspects reply text, so the parsing
//! contract lives here as a provided method.

use async_trait::async_trait;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::BackendError;
use crate::tool::{Action, ToolSpec};
use crate::turn::Turn;

/// The closed set of supported backend variants.
///
/// New providers are added as new variants with their own `Backend` impl,
/// not by modifying callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    OpenAi,
    Anthropic,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(BackendKind::OpenAi),
            "anthropic" => Ok(BackendKind::Anthropic),
            other => Err(format!("unsupported backend: {other}")),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BackendKind::OpenAi => "openai",
            BackendKind::Anthropic => "anthropic",
        };
        write!(f, "{s}")
    }
}

/// Configuration for one backend instance.
///
/// The credential is an explicit value: whoever constructs the config reads
/// the environment (or a secrets store) and passes the key in. Backends
/// never consult process-wide state themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Which provider variant to talk to
    pub kind: BackendKind,

    /// Model identifier, e.g. `"gpt-4o"` or `"claude-sonnet-4-20250514"`
    pub model: String,

    /// API credential. `None` is allowed at construction; every request
    /// then degrades to a credential-missing reply instead of failing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// The core Backend trait.
///
/// One query turn performs at most two `get_response` calls: the first with
/// the formatted tool list, the second with an empty one.
#[async_trait]
pub trait Backend: Send + Sync {
    /// A human-readable name for this backend (e.g. "openai", "anthropic").
    fn name(&self) -> &str;

    /// Map tool specs to this provider's tool-list wire form.
    ///
    /// Backends without a native tool-calling primitive return an empty
    /// list; the tool roster then reaches the model through the system
    /// prompt instead.
    fn format_tools(&self, specs: &[ToolSpec]) -> Vec<serde_json::Value>;

    /// Send the full turn list (plus formatted tools) and return the text
    /// of the model's reply.
    async fn get_response(
        &self,
        turns: &[Turn],
        tools: &[serde_json::Value],
    ) -> std::result::Result<String, BackendError>;

    /// Parse a reply for a tool invocation. Backend-agnostic; see
    /// [`extract_tool_call`].
    fn extract_tool_call(&self, response: &str) -> Option<Action> {
        extract_tool_call(response)
    }
}

fn fenced_json() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Lazy body + trailing fence anchor: the match extends to the last '}'
    // before the closing backticks.
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced-json regex"))
}

/// Search reply text for a tool invocation of the form
/// `{"tool": "<name>", "parameters": {...}}`.
///
/// The object may sit inside a fenced code block (optionally labeled
/// `json`) or be the entire trimmed reply. Anything that does not parse to
/// an object carrying both keys yields `None` — that is the ordinary
/// "model answered in prose" case, not an error.
pub fn extract_tool_call(response: &str) -> Option<Action> {
    let candidate = match fenced_json().captures(response) {
        Some(caps) => caps.get(1)?.as_str(),
        None => {
            let trimmed = response.trim();
            if trimmed.starts_with('{') && trimmed.ends_with('}') {
                trimmed
            } else {
                return None;
            }
        }
    };

    let parsed: serde_json::Value = serde_json::from_str(candidate).ok()?;
    let object = parsed.as_object()?;
    let tool = object.get("tool")?.as_str()?.to_string();
    let parameters = object.get("parameters")?.as_object()?.clone();

    Some(Action { tool, parameters })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_labeled_fence() {
        let reply = concat!(
            "I'll calculate that for you.\n",
            "```json\n",
            r#"{"tool": "calculator", "parameters": {"expression": "2+2"}}"#,
            "\n```\n",
        );
        let action = extract_tool_call(reply).unwrap();
        assert_eq!(action.tool, "calculator");
        assert_eq!(action.parameters["expression"], "2+2");
    }

    #[test]
    fn extracts_from_unlabeled_fence() {
        let reply = "```\n{\"tool\": \"echo\", \"parameters\": {\"text\": \"hi\"}}\n```";
        let action = extract_tool_call(reply).unwrap();
        assert_eq!(action.tool, "echo");
    }

    #[test]
    fn extracts_bare_object() {
        let reply = r#"  {"tool": "calculator", "parameters": {"expression": "1/3"}}  "#;
        let action = extract_tool_call(reply).unwrap();
        assert_eq!(action.tool, "calculator");
    }

    #[test]
    fn nested_parameters_survive_the_fence_scan() {
        let reply = concat!(
            "```json\n",
            r#"{"tool": "t", "parameters": {"outer": {"inner": [1, 2, 3]}}}"#,
            "\n```",
        );
        let action = extract_tool_call(reply).unwrap();
        assert_eq!(action.parameters["outer"]["inner"][1], 2);
    }

    #[test]
    fn roundtrip_through_serialization() {
        let original = Action {
            tool: "calculator".into(),
            parameters: serde_json::from_str(r#"{"a": 1, "b": "two"}"#).unwrap(),
        };
        let fenced = format!("```json\n{}\n```", serde_json::to_string(&original).unwrap());
        let extracted = extract_tool_call(&fenced).unwrap();
        assert_eq!(extracted, original);
    }

    #[test]
    fn missing_parameters_key_yields_none() {
        assert!(extract_tool_call(r#"{"tool": "t"}"#).is_none());
    }

    #[test]
    fn missing_tool_key_yields_none() {
        assert!(extract_tool_call(r#"{"parameters": {}}"#).is_none());
    }

    #[test]
    fn prose_yields_none() {
        assert!(extract_tool_call("Hello, how can I help?").is_none());
        assert!(extract_tool_call("").is_none());
    }

    #[test]
    fn malformed_json_yields_none() {
        assert!(extract_tool_call("```json\n{\"tool\": \n```").is_none());
        assert!(extract_tool_call("{not json}").is_none());
    }

    #[test]
    fn non_object_parameters_yields_none() {
        assert!(extract_tool_call(r#"{"tool": "t", "parameters": "text"}"#).is_none());
    }

    #[test]
    fn first_fenced_block_wins() {
        let reply = concat!(
            "```json\n",
            r#"{"tool": "first", "parameters": {}}"#,
            "\n```\nand also\n```json\n",
            r#"{"tool": "second", "parameters": {}}"#,
            "\n```",
        );
        assert_eq!(extract_tool_call(reply).unwrap().tool, "first");
    }

    #[test]
    fn backend_kind_parses() {
        assert_eq!("openai".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
        assert_eq!(
            "Anthropic".parse::<BackendKind>().unwrap(),
            BackendKind::Anthropic
        );
        assert!("mistral".parse::<BackendKind>().is_err());
    }

    #[test]
    fn backend_config_roundtrip() {
        let config = BackendConfig {
            kind: BackendKind::Anthropic,
            model: "claude-sonnet-4-20250514".into(),
            api_key: None,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("anthropic"));
        assert!(!json.contains("api_key"));
        let back: BackendConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, BackendKind::Anthropic);
    }
}
