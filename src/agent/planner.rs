//! Planning agent.
//!
//! Analyzes the user query and dataset context to produce a [`Plan`]
//! that guides action selection. Planning never aborts a run: output
//! that does not decode becomes [`Plan::Raw`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::config::AgentConfig;
use super::prompt::build_planner_prompt;
use super::provider::LlmProvider;
use super::query::Query;
use super::structured::{Interpreted, interpret};
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Structured analysis plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPlan {
    /// What the user wants to know.
    #[serde(default, alias = "objective")]
    pub main_objective: String,
    /// Specific questions to answer, in priority order.
    #[serde(default, alias = "questions")]
    pub key_questions: Vec<String>,
    /// High-level strategy.
    #[serde(default, alias = "strategy", alias = "approach")]
    pub analysis_approach: String,
    /// Capabilities the agent expects to use.
    #[serde(default, alias = "candidate_capabilities", alias = "tools")]
    pub potential_tools: Vec<String>,
    /// Keys outside the schema, kept so their content reaches later stages.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Plan produced by the planning stage.
///
/// Both forms are valid downstream; they serialize as either the plan
/// object or `{"raw_plan": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Plan {
    /// The response decoded as an [`AnalysisPlan`].
    Structured(AnalysisPlan),
    /// The response text, kept verbatim.
    Raw {
        /// Undecoded planning response.
        raw_plan: String,
    },
}

impl Plan {
    /// Returns `true` if this is the raw-text fallback.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw { .. })
    }
}

impl From<Interpreted<AnalysisPlan>> for Plan {
    fn from(interpreted: Interpreted<AnalysisPlan>) -> Self {
        match interpreted {
            Interpreted::Structured(plan) => Self::Structured(plan),
            Interpreted::RawFallback(raw_plan) => Self::Raw { raw_plan },
        }
    }
}

/// Agent that plans the analysis for a query.
pub struct PlanningAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl PlanningAgent {
    /// Creates a new planning agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.plan_max_tokens,
            system_prompt,
        }
    }

    /// Produces a plan for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] only on transport failure. Malformed output
    /// yields [`Plan::Raw`].
    pub async fn plan(
        &self,
        provider: &dyn LlmProvider,
        query: &Query,
    ) -> Result<(Plan, AgentResponse), AgentError> {
        let user_msg = build_planner_prompt(query);
        let response = self.execute(provider, &user_msg).await?;
        let plan = Self::parse_plan(&response.content);

        match &plan {
            Plan::Structured(p) => info!(
                objective = %p.main_objective,
                questions = p.key_questions.len(),
                extra_keys = p.extra.len(),
                "analysis plan created"
            ),
            Plan::Raw { raw_plan } => debug!(chars = raw_plan.len(), "using raw-text plan"),
        }

        Ok((plan, response))
    }

    /// Interprets the planning response.
    fn parse_plan(content: &str) -> Plan {
        interpret::<AnalysisPlan>(content).into()
    }
}

#[async_trait]
impl Agent for PlanningAgent {
    fn name(&self) -> &'static str {
        "planner"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> Option<&str> {
        Some(&self.system_prompt)
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
