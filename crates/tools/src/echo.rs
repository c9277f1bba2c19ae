//! Echo tool — returns its input unchanged.
//!
//! Mostly useful for smoke-testing a backend's tool negotiation without
//! side effects, and as the smallest possible example of the callable
//! contract.

use palaver_core::ToolSpec;
use serde_json::{Map, Value, json};

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: "echo".into(),
        description: "Repeat the given text back verbatim.".into(),
        function: Some("builtin.echo.repeat".into()),
        parameters: json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The text to repeat"
                }
            },
            "required": ["text"]
        }),
        keywords: vec!["echo".into(), "repeat".into()],
    }
}

/// The callable behind `builtin.echo.repeat`.
///
/// Whatever JSON value arrives under `text` goes back out unchanged — the
/// dispatcher's polymorphic-return contract in miniature.
pub fn repeat(parameters: &Map<String, Value>) -> Result<Value, String> {
    parameters
        .get("text")
        .cloned()
        .ok_or_else(|| "missing 'text' parameter".into())
}
