//! Tool registry and built-in callables for Palaver.
//!
//! Descriptors (name, description, parameter schema) come from per-tool
//! JSON files; the executable half is resolved here, through a static
//! table keyed by the descriptor's opaque `function` string. Resolution
//! happens at dispatch time, so a descriptor pointing at a function this
//! build does not carry degrades to a dispatch error instead of poisoning
//! registry construction.

pub mod calculator;
pub mod clock;
pub mod echo;
pub mod registry;

pub use registry::ToolRegistry;

use palaver_core::{ToolCallable, ToolSpec};

/// Resolve a descriptor's function reference to an executable callable.
pub fn resolve_builtin(reference: &str) -> Option<ToolCallable> {
    match reference {
        "builtin.calculator.evaluate" => Some(calculator::evaluate),
        "builtin.echo.repeat" => Some(echo::repeat),
        "builtin.clock.now" => Some(clock::now),
        _ => None,
    }
}

/// Descriptors for every tool this build ships, as written by `init`
/// scaffolding.
pub fn builtin_specs() -> Vec<ToolSpec> {
    vec![calculator::spec(), echo::spec(), clock::spec()]
}
