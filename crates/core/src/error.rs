//! Error types for the Palaver domain.
//!
//! Uses `thiserror` for ergonomic error definitions, one enum per bounded
//! context. Per-turn errors are recovered inside the negotiation engine and
//! rendered as conversation text; only the outermost turn boundary converts
//! an error into a user-visible message.

use thiserror::Error;

/// The top-level error type for a negotiation turn.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Tool(#[from] ToolError),

    #[error("{0}")]
    Backend(#[from] BackendError),

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while dispatching a tool call.
///
/// All four variants are fed back to the model as dispatch-result text;
/// none of them aborts the turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("tool '{0}' not found")]
    NotFound(String),

    #[error("no function reference defined for tool '{0}'")]
    Misconfigured(String),

    #[error("failed to load function '{function}' for tool '{tool}'")]
    LoadFailed { tool: String, function: String },

    #[error("tool '{tool}' failed: {reason}")]
    ExecutionFailed { tool: String, reason: String },
}

/// Errors raised by a model backend.
///
/// The engine treats these as degraded replies, not faults: the error text
/// becomes the model's "response" for the turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("{backend} API credential not set ({env_hint} is empty)")]
    CredentialMissing { backend: String, env_hint: String },

    #[error("{backend} service unreachable: {reason}")]
    Unavailable { backend: String, reason: String },

    #[error("{backend} API request failed (status {status}): {message}")]
    Api {
        backend: String,
        status: u16,
        message: String,
    },

    #[error("{backend} returned an unreadable response: {reason}")]
    Malformed { backend: String, reason: String },
}

/// Errors raised while rendering a custom prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder '{{{0}}}' in prompt template")]
    UnknownPlaceholder(String),

    #[error("unbalanced '{{' in prompt template")]
    UnbalancedBrace,
}
