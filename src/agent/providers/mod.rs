//! Concrete [`LlmProvider`](super::provider::LlmProvider) implementations.

#[cfg(feature = "openai")]
pub mod openai;
pub mod scripted;

#[cfg(feature = "openai")]
pub use openai::OpenAiProvider;
pub use scripted::ScriptedProvider;
