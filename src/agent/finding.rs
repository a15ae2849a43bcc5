//! Data types for findings, the reasoning trace, and run results.
//!
//! A run threads one owned [`RunState`] forward through its stages. Each
//! step consumes the state and returns the extended one, so findings,
//! trace, and tool usage only ever grow by appending.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::action::{Action, ActionKind};
use super::message::TokenUsage;
use super::planner::Plan;

/// Output of one capability provider for one action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    /// Kind of the action that produced this result.
    pub produced_by: ActionKind,
    /// Provider-specific payload.
    pub payload: Value,
}

impl ActionResult {
    /// Result for an action no provider is registered for.
    #[must_use]
    pub fn unknown_action(kind: ActionKind) -> Self {
        Self {
            produced_by: kind,
            payload: serde_json::json!({ "status": "unknown_action" }),
        }
    }
}

/// Action results keyed by iteration index, in iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Findings(BTreeMap<u32, ActionResult>);

impl Findings {
    /// Returns the number of recorded findings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the finding for `iteration`.
    #[must_use]
    pub fn get(&self, iteration: u32) -> Option<&ActionResult> {
        self.0.get(&iteration)
    }

    /// Iterates findings in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &ActionResult)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Appends a finding. Iterations are recorded once and never replaced.
    fn append(&mut self, iteration: u32, result: ActionResult) {
        debug_assert!(
            self.0.last_key_value().is_none_or(|(last, _)| *last < iteration),
            "finding for iteration {iteration} recorded out of order"
        );
        self.0.entry(iteration).or_insert(result);
    }

    /// Findings serialized for prompt building.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
    }
}

/// One entry of the reasoning trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TraceEntry {
    /// The plan produced before investigating.
    Planning {
        /// Structured or raw plan.
        plan: Plan,
    },
    /// One decided step and, unless it was `complete`, its result.
    Investigation {
        /// 1-based iteration index.
        iteration: u32,
        /// The decided action.
        action: Action,
        /// Provider output; `None` for the terminal `complete` action.
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<ActionResult>,
    },
}

impl TraceEntry {
    /// Returns the iteration index for investigation entries.
    #[must_use]
    pub const fn iteration(&self) -> Option<u32> {
        match self {
            Self::Planning { .. } => None,
            Self::Investigation { iteration, .. } => Some(*iteration),
        }
    }
}

/// Owned accumulator threaded through one run.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    trace: Vec<TraceEntry>,
    findings: Findings,
    tools_used: Vec<String>,
    iterations: u32,
    usage: TokenUsage,
}

impl RunState {
    /// Starts a run from its plan; the plan is always the first trace entry.
    #[must_use]
    pub fn planned(plan: Plan, usage: TokenUsage) -> Self {
        Self {
            trace: vec![TraceEntry::Planning { plan }],
            usage,
            ..Self::default()
        }
    }

    /// The plan recorded at the start of the run.
    #[must_use]
    pub fn plan(&self) -> Option<&Plan> {
        match self.trace.first() {
            Some(TraceEntry::Planning { plan }) => Some(plan),
            _ => None,
        }
    }

    /// Records a `complete` decision, which ends investigation.
    #[must_use]
    pub fn record_completion(mut self, iteration: u32, action: Action) -> Self {
        self.iterations = iteration;
        self.trace.push(TraceEntry::Investigation {
            iteration,
            action,
            result: None,
        });
        self
    }

    /// Records an executed step: tool usage, finding, and trace entry.
    #[must_use]
    pub fn record_investigation(
        mut self,
        iteration: u32,
        action: Action,
        tool: String,
        result: ActionResult,
    ) -> Self {
        self.iterations = iteration;
        self.tools_used.push(tool);
        self.findings.append(iteration, result.clone());
        self.trace.push(TraceEntry::Investigation {
            iteration,
            action,
            result: Some(result),
        });
        self
    }

    /// Adds token usage from one call.
    #[must_use]
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage.prompt_tokens = self.usage.prompt_tokens.saturating_add(usage.prompt_tokens);
        self.usage.completion_tokens = self
            .usage
            .completion_tokens
            .saturating_add(usage.completion_tokens);
        self.usage.total_tokens = self.usage.total_tokens.saturating_add(usage.total_tokens);
        self
    }

    /// Reasoning trace so far.
    #[must_use]
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Findings so far.
    #[must_use]
    pub const fn findings(&self) -> &Findings {
        &self.findings
    }

    /// Capability names invoked so far, in order.
    #[must_use]
    pub fn tools_used(&self) -> &[String] {
        &self.tools_used
    }

    /// Investigation iterations performed so far.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Finishes the run with the synthesized report.
    #[must_use]
    pub fn finish(self, report: String, elapsed: Duration) -> AgentRunResult {
        AgentRunResult {
            report,
            trace: self.trace,
            tools_used: self.tools_used,
            findings: self.findings,
            iterations: self.iterations,
            total_tokens: self.usage.total_tokens,
            elapsed,
        }
    }
}

/// Final output of a completed run. Owned by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRunResult {
    /// Synthesized report text.
    pub report: String,
    /// Ordered reasoning trace: planning first, then each investigation step.
    #[serde(rename = "reasoning_trace")]
    pub trace: Vec<TraceEntry>,
    /// Capability names invoked, in order.
    pub tools_used: Vec<String>,
    /// Action results keyed by iteration.
    pub findings: Findings,
    /// Investigation iterations performed.
    pub iterations: u32,
    /// Total tokens consumed across all calls.
    pub total_tokens: u32,
    /// Wall-clock time of the run.
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_duration<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(d.as_secs_f64())
}
