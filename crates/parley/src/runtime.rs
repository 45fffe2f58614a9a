//! The language-model runtime boundary. The orchestrator only ever sees the
//! `GenerationRuntime` trait and the `StreamEvent` sequence it yields; the
//! OpenAI-compatible streaming implementation (and the tool loop it owns)
//! lives behind it.

pub mod base;
pub mod ollama;
pub mod wire;

#[cfg(test)]
pub mod mock;

pub use base::{EventStream, GenerationRequest, GenerationRuntime};
pub use ollama::{OllamaConfig, OllamaRuntime};
