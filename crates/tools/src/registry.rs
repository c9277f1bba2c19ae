//! The tool registry — static name → descriptor mapping plus dispatch.

use std::collections::BTreeMap;

use palaver_core::{ToolError, ToolSpec};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::resolve_builtin;

/// A registry of available tools, built once at agent construction.
///
/// Backed by a `BTreeMap` so iteration order (prompt enumeration, tool-list
/// formatting) is deterministic. Registering a duplicate name replaces the
/// earlier descriptor; the replacement is logged.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    specs: BTreeMap<String, ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            specs: BTreeMap::new(),
        }
    }

    /// Build a registry from an iterator of descriptors.
    pub fn from_specs(specs: impl IntoIterator<Item = ToolSpec>) -> Self {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec);
        }
        registry
    }

    /// Register a descriptor. Last registration wins on a name collision.
    pub fn register(&mut self, spec: ToolSpec) {
        if self.specs.contains_key(&spec.name) {
            warn!(tool = %spec.name, "replacing previously registered tool");
        }
        debug!(tool = %spec.name, "registered tool");
        self.specs.insert(spec.name.clone(), spec);
    }

    /// Look up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.specs.get(name)
    }

    /// All descriptors in name order.
    pub fn specs(&self) -> impl Iterator<Item = &ToolSpec> {
        self.specs.values()
    }

    /// Registered tool names in order.
    pub fn names(&self) -> Vec<&str> {
        self.specs.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Execute a tool by name with the given parameters.
    ///
    /// Every failure mode comes back as a typed `ToolError` value — the
    /// caller decides how to render it. The success value is whatever the
    /// callable returned: number, string, or structured JSON.
    pub fn dispatch(&self, name: &str, parameters: &Map<String, Value>) -> Result<Value, ToolError> {
        let spec = self
            .specs
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let reference = spec
            .function
            .as_deref()
            .ok_or_else(|| ToolError::Misconfigured(name.to_string()))?;

        let callable = resolve_builtin(reference).ok_or_else(|| ToolError::LoadFailed {
            tool: name.to_string(),
            function: reference.to_string(),
        })?;

        callable(parameters).map_err(|reason| ToolError::ExecutionFailed {
            tool: name.to_string(),
            reason,
        })
    }
}
