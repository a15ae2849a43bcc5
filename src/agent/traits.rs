//! Agent trait definition.
//!
//! Every stage that talks to the text-generation service (planner,
//! action selector, capability providers, continuation evaluator,
//! synthesizer) implements this trait, which provides the single
//! request/response round-trip each stage builds on.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse, TokenUsage, system_message, user_message};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's raw text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Trait implemented by all agent stages.
///
/// Stages encapsulate a specific role with optional fixed system
/// instructions and an output-size limit. [`Agent::execute`] performs one
/// round-trip and returns the unparsed text; interpretation is left to
/// [`interpret`](super::structured::interpret) at the call site.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System instructions, if this stage sends any.
    fn system_prompt(&self) -> Option<&str> {
        None
    }

    /// Whether to request JSON-formatted output.
    fn json_mode(&self) -> bool {
        false
    }

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Builds the request for one round-trip.
    fn build_request(&self, user_msg: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system_prompt() {
            messages.push(system_message(system));
        }
        messages.push(user_message(user_msg));

        ChatRequest {
            model: self.model().to_string(),
            messages,
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
            json_mode: self.json_mode(),
        }
    }

    /// Executes the agent with the given user message.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] only for transport-level failures. The
    /// response text is returned as-is, whatever its shape.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, AgentError> {
        let request = self.build_request(user_msg);
        let response: ChatResponse = provider.chat(&request).await?;

        Ok(AgentResponse {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::Role;

    struct Bare;

    #[async_trait]
    impl Agent for Bare {
        fn name(&self) -> &'static str {
            "bare"
        }

        fn model(&self) -> &str {
            "m"
        }
    }

    struct Instructed;

    #[async_trait]
    impl Agent for Instructed {
        fn name(&self) -> &'static str {
            "instructed"
        }

        fn model(&self) -> &str {
            "m"
        }

        fn system_prompt(&self) -> Option<&str> {
            Some("be terse")
        }

        fn max_tokens(&self) -> u32 {
            77
        }
    }

    #[test]
    fn test_request_without_system_prompt() {
        let request = Bare.build_request("hello");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(request.max_tokens, Some(2048));
    }

    #[test]
    fn test_request_with_system_prompt() {
        let request = Instructed.build_request("hello");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.system_prompt(), Some("be terse"));
        assert_eq!(request.max_tokens, Some(77));
    }
}
