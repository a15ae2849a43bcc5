//! Direct replies outside the analysis loop.
//!
//! [`SimpleResponder`] answers a message in one round-trip, optionally
//! seeded with an earlier assistant turn. It also derives short
//! conversation titles from an opening message.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::config::AgentConfig;
use super::message::assistant_message;
use super::prompt::{RESPONDER_SYSTEM_PROMPT, build_title_prompt};
use super::provider::LlmProvider;
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Title used when no usable title can be generated.
pub const FALLBACK_TITLE: &str = "New Analysis Chat";
/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// Agent for non-analytical queries.
pub struct SimpleResponder {
    model: String,
    max_tokens: u32,
}

impl SimpleResponder {
    /// Creates a responder with the given configuration.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.response_max_tokens,
        }
    }

    /// Replies to `message`.
    ///
    /// When `context` is given it is sent as a prior assistant turn ahead of
    /// the message.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on transport failure.
    pub async fn respond(
        &self,
        provider: &dyn LlmProvider,
        message: &str,
        context: Option<&str>,
    ) -> Result<AgentResponse, AgentError> {
        let mut request = self.build_request(message);
        if let Some(context) = context {
            let at = request.messages.len().saturating_sub(1);
            request.messages.insert(at, assistant_message(context));
        }

        let response = provider.chat(&request).await?;
        debug!(
            chars = response.content.len(),
            with_context = context.is_some(),
            "direct reply generated"
        );

        Ok(AgentResponse {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }

    /// Generates a short title for a conversation opening with `first_message`.
    ///
    /// Never fails: transport errors and empty output yield [`FALLBACK_TITLE`].
    pub async fn title(&self, provider: &dyn LlmProvider, first_message: &str) -> String {
        match self
            .respond(provider, &build_title_prompt(first_message), None)
            .await
        {
            Ok(response) => clean_title(&response.content),
            Err(e) => {
                warn!(error = %e, "title generation failed, using fallback");
                FALLBACK_TITLE.to_string()
            }
        }
    }
}

/// Strips whitespace and surrounding quotes, then caps the length.
fn clean_title(raw: &str) -> String {
    let title: String = raw
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'')
        .trim()
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();

    if title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title
    }
}

#[async_trait]
impl Agent for SimpleResponder {
    fn name(&self) -> &'static str {
        "responder"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> Option<&str> {
        Some(RESPONDER_SYSTEM_PROMPT)
    }

    fn temperature(&self) -> f32 {
        0.7
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
