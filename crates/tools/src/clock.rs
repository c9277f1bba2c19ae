//! Clock tool — reports the current UTC date and time.

use chrono::Utc;
use palaver_core::ToolSpec;
use serde_json::{Map, Value, json};

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: "clock".into(),
        description: "Get the current date and time in UTC.".into(),
        function: Some("builtin.clock.now".into()),
        parameters: json!({
            "type": "object",
            "properties": {},
            "required": []
        }),
        keywords: vec!["time".into(), "date".into(), "now".into()],
    }
}

/// The callable behind `builtin.clock.now`.
pub fn now(_parameters: &Map<String, Value>) -> Result<Value, String> {
    Ok(json!(Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()))
}
