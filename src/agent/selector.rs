//! Action selector.
//!
//! Decides the next investigative step from the plan, the iteration
//! number, and the findings so far. Output that does not decode as an
//! [`Action`] resolves to [`Action::unparseable`], which is `complete`.

use async_trait::async_trait;
use tracing::info;

use super::action::Action;
use super::config::AgentConfig;
use super::finding::Findings;
use super::planner::Plan;
use super::prompt::build_selector_prompt;
use super::provider::LlmProvider;
use super::query::Query;
use super::structured::interpret;
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Agent that picks the next action.
pub struct ActionSelector {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl ActionSelector {
    /// Creates a new selector with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.action_max_tokens,
            system_prompt,
        }
    }

    /// Decides the action for `iteration`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] only on transport failure.
    pub async fn decide(
        &self,
        provider: &dyn LlmProvider,
        query: &Query,
        plan: &Plan,
        iteration: u32,
        findings: &Findings,
    ) -> Result<(Action, AgentResponse), AgentError> {
        let user_msg = build_selector_prompt(query, plan, iteration, findings);
        let response = self.execute(provider, &user_msg).await?;
        let action = Self::parse_action(&response.content);

        info!(
            iteration,
            kind = %action.kind,
            target = %action.target,
            "action decided"
        );

        Ok((action, response))
    }

    fn parse_action(content: &str) -> Action {
        interpret::<Action>(content).unwrap_or_else(|_| Action::unparseable())
    }
}

#[async_trait]
impl Agent for ActionSelector {
    fn name(&self) -> &'static str {
        "selector"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> Option<&str> {
        Some(&self.system_prompt)
    }

    fn json_mode(&self) -> bool {
        true
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::action::{ActionKind, UNPARSEABLE_ACTION_RATIONALE};
    use crate::agent::prompt::SELECTOR_SYSTEM_PROMPT;
    use crate::agent::providers::ScriptedProvider;
    use test_case::test_case;

    #[test_case("not json at all" ; "prose")]
    #[test_case(r#"{"target": "revenue"}"# ; "missing kind")]
    #[test_case("[]" ; "array")]
    #[test_case("" ; "empty")]
    fn test_undecodable_output_completes(raw: &str) {
        let action = ActionSelector::parse_action(raw);
        assert_eq!(action.kind, ActionKind::Complete);
        assert_eq!(action.rationale, UNPARSEABLE_ACTION_RATIONALE);
    }

    #[test]
    fn test_parse_action_fenced() {
        let action = ActionSelector::parse_action(
            "```json\n{\"kind\": \"investigate_anomaly\", \"target\": \"week 32\"}\n```",
        );
        assert_eq!(action.kind, ActionKind::InvestigateAnomaly);
        assert_eq!(action.target, "week 32");
    }

    #[test]
    fn test_parse_action_unknown_kind_is_kept() {
        let action = ActionSelector::parse_action(r#"{"kind": "forecast"}"#);
        assert_eq!(action.kind, ActionKind::Unknown("forecast".to_string()));
    }

    #[tokio::test]
    async fn test_decide_sends_iteration_and_plan() {
        let config = AgentConfig::builder()
            .action_max_tokens(99)
            .build()
            .unwrap_or_else(|_| unreachable!());
        let selector = ActionSelector::new(&config, SELECTOR_SYSTEM_PROMPT.to_string());
        let provider = ScriptedProvider::new([r#"{"kind": "compare", "target": "regions"}"#]);
        let plan = Plan::Raw {
            raw_plan: "look at regions".to_string(),
        };

        let (action, _) = selector
            .decide(&provider, &Query::new("q"), &plan, 4, &Findings::default())
            .await
            .unwrap_or_else(|e| panic!("decide failed: {e}"));

        assert_eq!(action.kind, ActionKind::Compare);
        let requests = provider.requests();
        assert_eq!(requests[0].max_tokens, Some(99));
        assert!(requests[0].json_mode);
        let content = requests[0].user_content().unwrap_or_default();
        assert!(content.contains("<iteration>4</iteration>"));
        assert!(content.contains("look at regions"));
    }

    #[tokio::test]
    async fn test_decide_propagates_transport_failure() {
        let config = AgentConfig::builder()
            .build()
            .unwrap_or_else(|_| unreachable!());
        let selector = ActionSelector::new(&config, SELECTOR_SYSTEM_PROMPT.to_string());
        let provider = ScriptedProvider::new(Vec::<String>::new());
        let plan = Plan::Raw {
            raw_plan: String::new(),
        };

        let result = selector
            .decide(&provider, &Query::new("q"), &plan, 1, &Findings::default())
            .await;
        assert!(matches!(result, Err(AgentError::ApiRequest { .. })));
    }
}
