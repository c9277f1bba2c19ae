//! Tool descriptors and actions.
//!
//! A `ToolSpec` is the static half of a tool: name, description, parameter
//! schema, and an opaque function reference string that the tools crate
//! resolves to an executable callable. An `Action` is the transient half:
//! one parsed invocation request, consumed immediately by dispatch.

use serde::{Deserialize, Serialize};

/// The signature of an executable tool callable.
///
/// Callables take the model-supplied parameter map and return either a JSON
/// value (numeric, text, or structured — the dispatcher preserves whatever
/// comes back) or a human-readable failure reason.
pub type ToolCallable =
    fn(&serde_json::Map<String, serde_json::Value>) -> std::result::Result<serde_json::Value, String>;

/// Static descriptor for one tool, loaded from a per-tool JSON file.
/// Immutable after registry load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique tool name (the registry key)
    pub name: String,

    /// What this tool does (enumerated in the system prompt and sent to
    /// backends that take structured tool lists)
    pub description: String,

    /// Opaque reference resolved to a callable at dispatch time,
    /// e.g. `"builtin.calculator.evaluate"`. A descriptor without one is
    /// registered but fails dispatch with `ToolError::Misconfigured`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// JSON-schema-like parameter object: `{"type": "object", "properties":
    /// {...}, "required": [...]}`
    pub parameters: serde_json::Value,

    /// Free-form routing hints (carried through from descriptors, unused by
    /// the core protocol)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

/// A parsed tool invocation request.
///
/// Constructed by `extract_tool_call`, consumed by dispatch, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Name of the tool the model wants to invoke
    pub tool: String,

    /// Arguments keyed by parameter name
    pub parameters: serde_json::Map<String, serde_json::Value>,
}
