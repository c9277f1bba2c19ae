//! Model backend adapters for Palaver.
//!
//! Each adapter implements the `palaver_core::Backend` trait and owns its
//! provider's wire conventions end to end: message-role mapping, tool-list
//! formatting, authentication headers, and error normalization. The
//! factory below is the only place that knows the full variant set.

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicBackend;
pub use openai::OpenAiBackend;

use palaver_core::{Backend, BackendConfig, BackendKind};

/// Build the backend described by a config.
///
/// Construction never fails: a missing credential produces a working
/// adapter whose requests degrade to credential-missing replies.
pub fn backend_for(config: &BackendConfig) -> Box<dyn Backend> {
    match config.kind {
        BackendKind::OpenAi => Box::new(OpenAiBackend::new(&config.model, config.api_key.clone())),
        BackendKind::Anthropic => {
            Box::new(AnthropicBackend::new(&config.model, config.api_key.clone()))
        }
    }
}
