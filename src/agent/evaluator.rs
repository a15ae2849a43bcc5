//! Continuation evaluator.
//!
//! Decides after each executed action whether to keep investigating.
//! The iteration ceiling is checked before any call out, so the loop is
//! bounded no matter what the model answers.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::config::AgentConfig;
use super::finding::{ActionResult, Findings};
use super::message::TokenUsage;
use super::prompt::build_evaluation_prompt;
use super::provider::LlmProvider;
use super::query::Query;
use super::structured::interpret;
use super::traits::Agent;
use crate::error::AgentError;

/// Decoded continuation answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContinuationDecision {
    /// Whether to investigate further. Missing means stop.
    #[serde(rename = "continue", default)]
    pub proceed: bool,
    /// The model's justification.
    #[serde(default)]
    pub reasoning: String,
}

/// Returns `true` when `iteration` has reached the last investigation slot.
#[must_use]
pub const fn at_ceiling(iteration: u32, max_iterations: u32) -> bool {
    iteration.saturating_add(1) >= max_iterations
}

/// Agent that decides whether the query is answered yet.
pub struct ContinuationEvaluator {
    model: String,
    max_tokens: u32,
}

impl ContinuationEvaluator {
    /// Creates a new evaluator with the given configuration.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.evaluation_max_tokens,
        }
    }

    /// Decides whether to continue after `iteration`.
    ///
    /// Returns `false` without calling out once `iteration >= max_iterations - 1`.
    /// Undecodable answers also mean `false`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] only on transport failure.
    pub async fn should_continue(
        &self,
        provider: &dyn LlmProvider,
        query: &Query,
        result: &ActionResult,
        findings: &Findings,
        iteration: u32,
        max_iterations: u32,
    ) -> Result<(bool, TokenUsage), AgentError> {
        if at_ceiling(iteration, max_iterations) {
            info!(iteration, max_iterations, "iteration ceiling reached");
            return Ok((false, TokenUsage::default()));
        }

        let user_msg = build_evaluation_prompt(query, result, findings);
        let response = self.execute(provider, &user_msg).await?;
        let decision = Self::parse_decision(&response.content);

        debug!(
            iteration,
            proceed = decision.proceed,
            reasoning = %decision.reasoning,
            "continuation decided"
        );

        Ok((decision.proceed, response.usage))
    }

    fn parse_decision(content: &str) -> ContinuationDecision {
        interpret::<ContinuationDecision>(content).unwrap_or_else(|_| ContinuationDecision::default())
    }
}

#[async_trait]
impl Agent for ContinuationEvaluator {
    fn name(&self) -> &'static str {
        "evaluator"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::action::ActionKind;
    use crate::agent::providers::ScriptedProvider;
    use test_case::test_case;

    fn evaluator() -> ContinuationEvaluator {
        let config = AgentConfig::builder()
            .evaluation_max_tokens(50)
            .build()
            .unwrap_or_else(|_| unreachable!());
        ContinuationEvaluator::new(&config)
    }

    async fn decide(provider: &ScriptedProvider, iteration: u32, max_iterations: u32) -> bool {
        let result = ActionResult::unknown_action(ActionKind::Analyze);
        evaluator()
            .should_continue(
                provider,
                &Query::new("q"),
                &result,
                &Findings::default(),
                iteration,
                max_iterations,
            )
            .await
            .map(|(proceed, _)| proceed)
            .unwrap_or_else(|e| panic!("should_continue failed: {e}"))
    }

    #[test_case(0, 1, true ; "no slots")]
    #[test_case(1, 2, true ; "one slot used")]
    #[test_case(9, 10, true ; "one before ceiling")]
    #[test_case(10, 10, true ; "at ceiling")]
    #[test_case(8, 10, false ; "two before ceiling")]
    #[test_case(1, 10, false ; "first iteration")]
    fn test_at_ceiling(iteration: u32, max: u32, expected: bool) {
        assert_eq!(at_ceiling(iteration, max), expected);
    }

    #[tokio::test]
    async fn test_ceiling_skips_external_call() {
        let provider = ScriptedProvider::new([r#"{"continue": true, "reasoning": "more"}"#]);
        assert!(!decide(&provider, 4, 5).await);
        assert!(provider.requests().is_empty());
        assert_eq!(provider.remaining(), 1);
    }

    #[tokio::test]
    async fn test_continue_true() {
        let provider = ScriptedProvider::new([r#"{"continue": true, "reasoning": "gaps remain"}"#]);
        assert!(decide(&provider, 1, 10).await);

        let requests = provider.requests();
        assert!(requests[0].system_prompt().is_none());
        assert_eq!(requests[0].max_tokens, Some(50));
    }

    #[test_case(r#"{"continue": false, "reasoning": "answered"}"# ; "explicit false")]
    #[test_case(r#"{"reasoning": "no verdict"}"# ; "missing field")]
    #[test_case("Yes, keep going!" ; "prose")]
    #[test_case(r#"{"continue": "yes"}"# ; "wrong type")]
    fn test_parse_decision_stops(raw: &str) {
        assert!(!ContinuationEvaluator::parse_decision(raw).proceed);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let provider = ScriptedProvider::new(Vec::<String>::new());
        let result = evaluator()
            .should_continue(
                &provider,
                &Query::new("q"),
                &ActionResult::unknown_action(ActionKind::Analyze),
                &Findings::default(),
                1,
                10,
            )
            .await;
        assert!(matches!(result, Err(AgentError::ApiRequest { .. })));
    }
}
