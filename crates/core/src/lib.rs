//! # Palaver Core
//!
//! Domain types, traits, and error definitions for the Palaver agent runtime.
//! This crate has **zero framework dependencies** — it defines the contracts
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The negotiation protocol is defined here as data (turns, actions, tool
//! specs) plus one trait per seam (`Backend` for model services). Concrete
//! implementations live in their own crates and depend inward on core.

pub mod backend;
pub mod error;
pub mod tool;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use backend::{Backend, BackendConfig, BackendKind, extract_tool_call};
pub use error::{BackendError, Error, Result, TemplateError, ToolError};
pub use tool::{Action, ToolCallable, ToolSpec};
pub use turn::{Role, Turn};
