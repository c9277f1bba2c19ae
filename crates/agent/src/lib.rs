//! # Palaver Agent
//!
//! The negotiation engine: orchestrates one query turn through the
//! two-call protocol (model → tool → model) and keeps bounded memory
//! up to date.

pub mod engine;
pub mod prompt;

pub use engine::Agent;
