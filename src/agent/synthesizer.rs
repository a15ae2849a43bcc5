//! Synthesizer agent for the final report.
//!
//! Takes the full reasoning trace, findings, and tool-usage log and
//! produces a markdown report. The output is prose and is returned as-is.

use async_trait::async_trait;
use tracing::info;

use super::config::AgentConfig;
use super::finding::{Findings, TraceEntry};
use super::prompt::build_synthesizer_prompt;
use super::provider::LlmProvider;
use super::query::Query;
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Agent that synthesizes findings into the final report.
pub struct SynthesizerAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl SynthesizerAgent {
    /// Creates a new synthesizer agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.synthesis_max_tokens,
            system_prompt,
        }
    }

    /// Writes the report.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on transport failure.
    pub async fn synthesize(
        &self,
        provider: &dyn LlmProvider,
        query: &Query,
        trace: &[TraceEntry],
        findings: &Findings,
        tools_used: &[String],
    ) -> Result<AgentResponse, AgentError> {
        let user_msg = build_synthesizer_prompt(query, trace, findings, tools_used);
        let response = self.execute(provider, &user_msg).await?;
        info!(
            chars = response.content.len(),
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "report synthesized"
        );
        Ok(response)
    }
}

#[async_trait]
impl Agent for SynthesizerAgent {
    fn name(&self) -> &'static str {
        "synthesizer"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> Option<&str> {
        Some(&self.system_prompt)
    }

    fn temperature(&self) -> f32 {
        0.1
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
