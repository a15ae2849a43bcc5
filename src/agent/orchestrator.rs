//! Orchestrator for a single agent run.
//!
//! Drives the state machine: plan, then select → execute → record →
//! evaluate until the selector says `complete`, the evaluator says stop,
//! or the investigation budget runs out, then synthesize.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::config::AgentConfig;
use super::evaluator::ContinuationEvaluator;
use super::executor::{ActionExecutor, CapabilityContext, CapabilityTable};
use super::finding::{AgentRunResult, RunState};
use super::planner::PlanningAgent;
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::query::{MAX_QUERY_LEN, Query};
use super::retry::RetryPolicy;
use super::selector::ActionSelector;
use super::synthesizer::SynthesizerAgent;
use crate::error::AgentError;

/// Runs the analysis workflow for one query at a time.
///
/// Holds only read-only collaborators. Every run owns its own plan, trace,
/// and findings, so one `AgentRun` may serve concurrent runs.
pub struct AgentRun {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    prompts: PromptSet,
    capabilities: CapabilityTable,
}

impl AgentRun {
    /// Creates a run driver with the standard capability table.
    ///
    /// Loads prompt templates from [`AgentConfig::prompt_dir`], falling
    /// back to compiled-in defaults. No environment lookup happens here.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::PromptTemplate`] if a template exists but
    /// cannot be read.
    pub fn new(provider: Arc<dyn LlmProvider>, config: AgentConfig) -> Result<Self, AgentError> {
        let prompts = PromptSet::load(config.prompt_dir.as_deref())?;
        Ok(Self {
            provider,
            config,
            prompts,
            capabilities: CapabilityTable::standard(),
        })
    }

    /// Replaces the system prompts.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Replaces the capability table.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: CapabilityTable) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// The configuration this driver runs with.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Executes one complete run.
    ///
    /// # Steps
    ///
    /// 1. Plan via [`PlanningAgent`]; the plan is the first trace entry
    /// 2. For each iteration within the budget, select an action; stop on `complete`
    /// 3. Execute it, then record the tool name, finding, and trace entry
    /// 4. Ask [`ContinuationEvaluator`] whether to go on
    /// 5. Synthesize the report
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidQuery`] for an empty or oversized query.
    /// Any transport failure aborts the run and is returned unchanged; no
    /// partial result is produced.
    pub async fn run_once(&self, query: &Query) -> Result<AgentRunResult, AgentError> {
        validate(query)?;

        let start = Instant::now();
        let provider = self.provider.as_ref();
        let max_iterations = self.config.max_iterations;
        let budget = self.config.investigation_budget();

        let planner = PlanningAgent::new(&self.config, self.prompts.planner.clone());
        let selector = ActionSelector::new(&self.config, self.prompts.selector.clone());
        let evaluator = ContinuationEvaluator::new(&self.config);
        let synthesizer = SynthesizerAgent::new(&self.config, self.prompts.synthesizer.clone());
        let executor = ActionExecutor::new(&self.capabilities);

        info!(
            provider = provider.name(),
            model = %self.config.model,
            max_iterations,
            "agent run started"
        );

        let (plan, plan_response) = planner.plan(provider, query).await?;
        let mut state = RunState::planned(plan.clone(), plan_response.usage);

        let mut iteration = 0;
        while iteration < budget {
            iteration += 1;

            let (action, response) = selector
                .decide(provider, query, &plan, iteration, state.findings())
                .await?;
            state = state.with_usage(response.usage);

            if action.kind.is_complete() {
                debug!(iteration, rationale = %action.rationale, "investigation complete");
                state = state.record_completion(iteration, action);
                break;
            }

            let ctx = CapabilityContext {
                provider,
                config: &self.config,
                query,
                findings: state.findings(),
            };
            let execution = executor.execute(&action, &ctx).await?;
            let latest = execution.result.clone();
            state = state.with_usage(execution.usage).record_investigation(
                iteration,
                action,
                execution.tool,
                execution.result,
            );

            let (proceed, usage) = evaluator
                .should_continue(
                    provider,
                    query,
                    &latest,
                    state.findings(),
                    iteration,
                    max_iterations,
                )
                .await?;
            state = state.with_usage(usage);
            if !proceed {
                break;
            }
        }

        let report = synthesizer
            .synthesize(
                provider,
                query,
                state.trace(),
                state.findings(),
                state.tools_used(),
            )
            .await?;
        let state = state.with_usage(report.usage);
        let result = state.finish(report.content, start.elapsed());

        info!(
            iterations = result.iterations,
            tools = result.tools_used.len(),
            total_tokens = result.total_tokens,
            elapsed_ms = result.elapsed.as_millis(),
            "agent run finished"
        );

        Ok(result)
    }

    /// Executes [`AgentRun::run_once`] under `policy`.
    ///
    /// Each attempt starts from scratch. Only retryable errors (see
    /// [`AgentError::is_retryable`]) trigger another attempt.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable error, or the last error once
    /// attempts are exhausted.
    pub async fn run_with_retry(
        &self,
        query: &Query,
        policy: &RetryPolicy,
    ) -> Result<AgentRunResult, AgentError> {
        let mut retry = 0;
        loop {
            match self.run_once(query).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && retry < policy.max_retries => {
                    retry += 1;
                    let delay = policy.delay_for(retry);
                    warn!(
                        error = %e,
                        attempt = retry,
                        max_retries = policy.max_retries,
                        delay_secs = delay.as_secs_f64(),
                        "run failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn validate(query: &Query) -> Result<(), AgentError> {
    if query.text.trim().is_empty() {
        return Err(AgentError::InvalidQuery {
            message: "query cannot be empty".to_string(),
        });
    }
    if query.text.len() > MAX_QUERY_LEN {
        return Err(AgentError::InvalidQuery {
            message: format!(
                "query exceeds maximum length ({} bytes, max {MAX_QUERY_LEN})",
                query.text.len()
            ),
        });
    }
    Ok(())
}
